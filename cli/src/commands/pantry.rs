use anyhow::Result;
use std::process;

use pantry_core::models::CommitSummary;
use pantry_core::service::PantryService;

use super::helpers::{json_error, print_history, print_item_table};

pub(crate) fn cmd_list(svc: &PantryService, json: bool) -> Result<()> {
    let items = svc.list_items();

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if items.is_empty() {
        eprintln!("Pantry is empty");
    } else {
        print_item_table(&items);
    }

    Ok(())
}

pub(crate) fn cmd_show(svc: &PantryService, name: &str, json: bool) -> Result<()> {
    let Some(item) = svc.find_item(name) else {
        if json {
            println!("{}", json_error(&format!("'{name}' is not in the pantry")));
        } else {
            eprintln!("'{name}' is not in the pantry");
        }
        process::exit(2);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        print_item_table(std::slice::from_ref(&item));
        if item.history.is_empty() {
            println!("No earlier amounts recorded");
        } else {
            println!("\nEarlier amounts:");
            print_history(&item.history);
        }
    }

    Ok(())
}

pub(crate) fn cmd_add(
    svc: &PantryService,
    name: &str,
    quantity: Option<&str>,
    weight: Option<&str>,
    json: bool,
) -> Result<()> {
    let summary = svc.add_manual(name, quantity.unwrap_or_default(), weight.unwrap_or_default())?;
    print_commit_summary(&summary, json)
}

pub(crate) fn cmd_delete(svc: &PantryService, id: &str, json: bool) -> Result<()> {
    let summary = svc.delete_item(id);

    if !summary.removed {
        if json {
            println!("{}", json_error(&format!("Item {id} not found")));
        } else {
            eprintln!("Item {id} not found");
        }
        process::exit(2);
    }

    if json {
        println!(
            "{}",
            serde_json::json!({ "deleted": id, "persisted": summary.persisted })
        );
    } else {
        println!("Deleted item {id}");
        if !summary.persisted {
            eprintln!("Warning: the change could not be saved");
        }
    }

    Ok(())
}

pub(crate) fn print_commit_summary(summary: &CommitSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    let added = summary.added;
    let merged = summary.merged;
    println!("Added {added}, merged {merged}");
    print_item_table(&summary.items);
    if !summary.persisted {
        eprintln!("Warning: the pantry could not be saved; changes above are not stored");
    }
    Ok(())
}
