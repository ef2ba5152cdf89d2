use tracing::debug;

use crate::history::push_snapshot;
use crate::merge::{merge_quantity, merge_weight};
use crate::models::{IngredientItem, normalize_name};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub added: usize,
    pub merged: usize,
}

/// Fold `incoming` into `existing` by case- and whitespace-insensitive name.
///
/// A match keeps the existing `id` and `name`, pushes the old
/// `(createdAt, quantity, weight)` onto its history, merges the amounts and
/// takes the incoming `createdAt`. Anything unmatched is appended with an
/// empty history. The first match wins, and items merged or appended earlier
/// in the same call are matched against too.
#[must_use]
pub fn reconcile(existing: &[IngredientItem], incoming: &[IngredientItem]) -> Vec<IngredientItem> {
    reconcile_with_stats(existing, incoming).0
}

#[must_use]
pub fn reconcile_with_stats(
    existing: &[IngredientItem],
    incoming: &[IngredientItem],
) -> (Vec<IngredientItem>, ReconcileStats) {
    let mut items = existing.to_vec();
    let mut stats = ReconcileStats::default();

    for new_item in incoming {
        let key = normalize_name(&new_item.name);
        if let Some(current) = items.iter_mut().find(|item| item.merge_key() == key) {
            let merged = IngredientItem {
                quantity: merge_quantity(&current.quantity, &new_item.quantity),
                weight: merge_weight(&current.weight, &new_item.weight),
                created_at: new_item.created_at.clone(),
                history: push_snapshot(&current.history, current.snapshot()),
                ..current.clone()
            };
            *current = merged;
            stats.merged += 1;
        } else {
            items.push(IngredientItem {
                history: Vec::new(),
                ..new_item.clone()
            });
            stats.added += 1;
        }
    }

    debug!(
        added = stats.added,
        merged = stats.merged,
        total = items.len(),
        "reconciled pantry"
    );
    (items, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HistorySnapshot;

    fn item(id: &str, name: &str, quantity: &str, weight: &str, at: &str) -> IngredientItem {
        IngredientItem {
            id: id.to_string(),
            name: name.to_string(),
            quantity: quantity.to_string(),
            weight: weight.to_string(),
            created_at: at.to_string(),
            history: Vec::new(),
        }
    }

    #[test]
    fn test_empty_incoming_returns_existing() {
        let existing = vec![
            item("a", "番茄", "2个", "300克", "t1"),
            item("b", "洋葱", "1个", "150克", "t1"),
        ];
        assert_eq!(reconcile(&existing, &[]), existing);
    }

    #[test]
    fn test_merges_matching_name() {
        let existing = vec![item("a", "番茄", "2个", "300克", "2024-06-01T08:00:00Z")];
        let incoming = vec![item("new", "番茄", "1个", "150克", "2024-06-02T08:00:00Z")];

        let result = reconcile(&existing, &incoming);
        assert_eq!(result.len(), 1);
        let merged = &result[0];
        assert_eq!(merged.id, "a");
        assert_eq!(merged.name, "番茄");
        assert_eq!(merged.quantity, "3个");
        assert_eq!(merged.weight, "450克");
        assert_eq!(merged.created_at, "2024-06-02T08:00:00Z");
        assert_eq!(
            merged.history,
            vec![HistorySnapshot {
                created_at: "2024-06-01T08:00:00Z".to_string(),
                quantity: "2个".to_string(),
                weight: "300克".to_string(),
            }]
        );
    }

    #[test]
    fn test_name_match_ignores_case_and_whitespace() {
        let existing = vec![item("a", " 番茄 ", "2个", "300克", "t1")];
        let incoming = vec![item("new", "番茄", "1个", "100克", "t2")];
        let result = reconcile(&existing, &incoming);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, " 番茄 ");

        let existing = vec![item("a", "Tomato", "2", "", "t1")];
        let incoming = vec![item("new", "  TOMATO", "1", "", "t2")];
        let result = reconcile(&existing, &incoming);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].quantity, "3");
    }

    #[test]
    fn test_unmatched_items_append_with_empty_history() {
        let existing = vec![item("a", "番茄", "2个", "300克", "t1")];
        let mut stray = item("b", "鸡蛋", "6个", "", "t2");
        stray.history = vec![HistorySnapshot {
            created_at: "t0".to_string(),
            quantity: "1个".to_string(),
            weight: String::new(),
        }];

        let result = reconcile(&existing, &[stray]);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0], existing[0]);
        assert_eq!(result[1].id, "b");
        assert_eq!(result[1].created_at, "t2");
        assert!(result[1].history.is_empty());
    }

    #[test]
    fn test_duplicates_within_one_call_fold_together() {
        let incoming = vec![
            item("x", "土豆", "1个", "200克", "t1"),
            item("y", "土豆", "2个", "300克", "t2"),
        ];
        let (result, stats) = reconcile_with_stats(&[], &incoming);
        assert_eq!(stats, ReconcileStats { added: 1, merged: 1 });
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "x");
        assert_eq!(result[0].quantity, "3个");
        assert_eq!(result[0].weight, "500克");
        assert_eq!(result[0].created_at, "t2");
        assert_eq!(result[0].history.len(), 1);
    }

    #[test]
    fn test_first_match_wins() {
        let existing = vec![
            item("a", "番茄", "2个", "", "t1"),
            item("b", "番茄 ", "5个", "", "t1"),
        ];
        let result = reconcile(&existing, &[item("n", "番茄", "1个", "", "t2")]);
        assert_eq!(result[0].quantity, "3个");
        assert_eq!(result[1], existing[1]);
    }

    #[test]
    fn test_history_bounded_over_repeated_merges() {
        let mut pantry = vec![item("a", "牛奶", "1盒", "250克", "t0")];
        for n in 1..=4 {
            let at = format!("t{n}");
            pantry = reconcile(&pantry, &[item("n", "牛奶", "1盒", "250克", &at)]);
        }
        let milk = &pantry[0];
        assert_eq!(milk.quantity, "5盒");
        // Once promoted to kilograms the weight no longer folds with grams.
        assert_eq!(milk.weight, "1千克+250克");
        assert_eq!(milk.history.len(), 2);
        assert_eq!(milk.history[0].created_at, "t3");
        assert_eq!(milk.history[1].created_at, "t2");
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let existing = vec![item("a", "番茄", "2个", "300克", "t1")];
        let incoming = vec![item("n", "番茄", "1个", "150克", "t2")];
        let before = existing.clone();
        let _ = reconcile(&existing, &incoming);
        assert_eq!(existing, before);
    }

    #[test]
    fn test_mismatched_quantity_marks_sentinel() {
        let existing = vec![item("a", "鸡胸肉", "1块", "200克", "t1")];
        let result = reconcile(&existing, &[item("n", "鸡胸肉", "2片", "1斤", "t2")]);
        assert_eq!(result[0].quantity, "/");
        assert_eq!(result[0].weight, "200克+1斤");
    }
}
