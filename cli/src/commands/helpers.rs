use chrono::{DateTime, Local};
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use pantry_core::models::{HistorySnapshot, IngredientItem, RecognizedIngredient};

pub(crate) fn print_item_table(items: &[IngredientItem]) {
    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Quantity")]
        quantity: String,
        #[tabled(rename = "Weight")]
        weight: String,
        #[tabled(rename = "Updated")]
        updated: String,
    }

    let rows: Vec<ItemRow> = items
        .iter()
        .map(|item| ItemRow {
            id: item.id.clone(),
            name: truncate(&item.name, 20),
            quantity: or_dash(&item.quantity),
            weight: or_dash(&item.weight),
            updated: format_timestamp(&item.created_at),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

pub(crate) fn print_history(history: &[HistorySnapshot]) {
    #[derive(Tabled)]
    struct HistoryRow {
        #[tabled(rename = "Recorded")]
        recorded: String,
        #[tabled(rename = "Quantity")]
        quantity: String,
        #[tabled(rename = "Weight")]
        weight: String,
    }

    let rows: Vec<HistoryRow> = history
        .iter()
        .map(|snap| HistoryRow {
            recorded: format_timestamp(&snap.created_at),
            quantity: or_dash(&snap.quantity),
            weight: or_dash(&snap.weight),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

pub(crate) fn print_recognized(entries: &[RecognizedIngredient]) {
    #[derive(Tabled)]
    struct RecognizedRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Quantity")]
        quantity: String,
        #[tabled(rename = "Weight")]
        weight: String,
        #[tabled(rename = "Addable")]
        addable: String,
    }

    let rows: Vec<RecognizedRow> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| RecognizedRow {
            idx: i + 1,
            name: truncate(&e.name, 20),
            quantity: or_dash(&e.quantity),
            weight: or_dash(&e.weight),
            addable: if e.is_addable() { "yes" } else { "no" }.to_string(),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

/// RFC 3339 timestamps in local time; anything else is shown as stored.
pub(crate) fn format_timestamp(raw: &str) -> String {
    if raw.is_empty() {
        return "-".to_string();
    }
    DateTime::parse_from_rfc3339(raw).map_or_else(
        |_| raw.to_string(),
        |dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
    )
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

fn or_dash(s: &str) -> String {
    if s.trim().is_empty() {
        "-".to_string()
    } else {
        s.to_string()
    }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("番茄", 20), "番茄");
        assert_eq!(truncate("abcdefghij", 6), "abc...");
        assert_eq!(truncate("一二三四五六七八", 6), "一二三...");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(""), "-");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
        let formatted = format_timestamp("2024-06-15T08:00:00Z");
        assert_eq!(formatted.len(), "2024-06-15 08:00".len());
        assert!(formatted.starts_with("2024-06-1"));
    }

    #[test]
    fn test_json_error() {
        let out = json_error("Item not found");
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["error"], "Item not found");
    }
}
