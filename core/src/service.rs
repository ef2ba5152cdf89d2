use std::path::Path;

use anyhow::{Result, bail};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::db::Database;
use crate::models::{
    CommitSummary, IngredientItem, ProfileUpdate, RecipeCoverage, RecognizedIngredient,
    UserProfile, normalize_name, validate_profile_update,
};
use crate::recipes;
use crate::reconcile::reconcile_with_stats;

/// Where the pantry collection lives.
///
/// The whole collection is read and rewritten at once. `Database` is the
/// on-disk implementation; tests plug in their own.
pub trait PantryStore {
    fn load(&self) -> Result<Vec<IngredientItem>>;
    fn save(&self, items: &[IngredientItem]) -> Result<()>;
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteSummary {
    pub items: Vec<IngredientItem>,
    pub removed: bool,
    pub persisted: bool,
}

/// Stored items, or an empty pantry if they cannot be read.
pub fn load_or_empty(store: &dyn PantryStore) -> Vec<IngredientItem> {
    match store.load() {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "failed to load pantry, showing it empty");
            Vec::new()
        }
    }
}

/// Load, reconcile `incoming` and save.
///
/// Never fails. If the stored pantry cannot be read, `incoming` is reconciled
/// against an empty one and nothing is written, so unreadable data survives.
/// A failed write still returns the reconciled items with `persisted` unset.
pub fn commit_to_store(store: &dyn PantryStore, incoming: &[IngredientItem]) -> CommitSummary {
    let (existing, readable) = match store.load() {
        Ok(items) => (items, true),
        Err(e) => {
            warn!(error = %format!("{e:#}"), "failed to load pantry, reconciling against empty");
            (Vec::new(), false)
        }
    };

    let (items, stats) = reconcile_with_stats(&existing, incoming);

    let persisted = readable
        && match store.save(&items) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %format!("{e:#}"), "failed to save pantry");
                false
            }
        };

    CommitSummary {
        items,
        added: stats.added,
        merged: stats.merged,
        persisted,
    }
}

/// Remove the item with `id`. Same recovery rules as [`commit_to_store`].
pub fn delete_from_store(store: &dyn PantryStore, id: &str) -> DeleteSummary {
    let existing = match store.load() {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "failed to load pantry, nothing deleted");
            return DeleteSummary {
                items: Vec::new(),
                removed: false,
                persisted: false,
            };
        }
    };

    let before = existing.len();
    let items: Vec<IngredientItem> = existing.into_iter().filter(|i| i.id != id).collect();
    if items.len() == before {
        return DeleteSummary {
            items,
            removed: false,
            persisted: true,
        };
    }

    let persisted = match store.save(&items) {
        Ok(()) => true,
        Err(e) => {
            error!(error = %format!("{e:#}"), id, "failed to save pantry after delete");
            false
        }
    };

    DeleteSummary {
        items,
        removed: true,
        persisted,
    }
}

pub struct PantryService {
    db: Database,
}

impl PantryService {
    pub fn new(db_path: &str) -> Result<Self> {
        let db = Database::open(Path::new(db_path))?;
        Ok(Self { db })
    }

    pub fn new_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self { db })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    // --- Pantry ---

    pub fn list_items(&self) -> Vec<IngredientItem> {
        load_or_empty(&self.db)
    }

    /// First item whose name matches, ignoring case and surrounding whitespace.
    pub fn find_item(&self, name: &str) -> Option<IngredientItem> {
        let key = normalize_name(name);
        self.list_items()
            .into_iter()
            .find(|item| item.merge_key() == key)
    }

    pub fn commit_items(&self, incoming: &[IngredientItem]) -> CommitSummary {
        commit_to_store(&self.db, incoming)
    }

    /// Commit recognized entries, skipping those without a name or any amount.
    pub fn commit_recognized(&self, recognized: Vec<RecognizedIngredient>) -> CommitSummary {
        let total = recognized.len();
        let incoming: Vec<IngredientItem> = recognized
            .into_iter()
            .filter(RecognizedIngredient::is_addable)
            .map(RecognizedIngredient::into_item)
            .collect();
        if incoming.len() < total {
            info!(
                skipped = total - incoming.len(),
                "skipped recognized entries without name or amount"
            );
        }
        self.commit_items(&incoming)
    }

    pub fn add_manual(&self, name: &str, quantity: &str, weight: &str) -> Result<CommitSummary> {
        let entry = RecognizedIngredient {
            name: name.trim().to_string(),
            quantity: quantity.trim().to_string(),
            weight: weight.trim().to_string(),
        };
        if entry.name.is_empty() {
            bail!("Ingredient name must not be empty");
        }
        if !entry.is_addable() {
            bail!("Give a quantity or a weight for '{}'", entry.name);
        }
        Ok(self.commit_items(&[entry.into_item()]))
    }

    pub fn delete_item(&self, id: &str) -> DeleteSummary {
        delete_from_store(&self.db, id)
    }

    // --- Profile ---

    pub fn get_profile(&self) -> UserProfile {
        match self.db.load_profile() {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "failed to load profile, using default");
                UserProfile::default()
            }
        }
    }

    pub fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        validate_profile_update(update)?;
        let profile = update.apply(&self.get_profile());
        self.db.save_profile(&profile)?;
        Ok(profile)
    }

    // --- Recipes ---

    pub fn recipe_coverage(&self, query: &str) -> Vec<RecipeCoverage> {
        let pantry = self.list_items();
        recipes::search_recipes(query)
            .iter()
            .map(|r| recipes::coverage(r, &pantry))
            .collect()
    }

    pub fn recipe_detail(&self, name: &str) -> Option<RecipeCoverage> {
        let recipe = recipes::find_recipe(name)?;
        Some(recipes::coverage(&recipe, &self.list_items()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::models::PROFILE_KEY;

    #[derive(Default)]
    struct MockStore {
        items: Mutex<Vec<IngredientItem>>,
        fail_load: bool,
        fail_save: bool,
        saves: Mutex<usize>,
    }

    impl PantryStore for MockStore {
        fn load(&self) -> Result<Vec<IngredientItem>> {
            if self.fail_load {
                bail!("disk on fire");
            }
            Ok(self.items.lock().unwrap().clone())
        }

        fn save(&self, items: &[IngredientItem]) -> Result<()> {
            *self.saves.lock().unwrap() += 1;
            if self.fail_save {
                bail!("read-only");
            }
            *self.items.lock().unwrap() = items.to_vec();
            Ok(())
        }
    }

    fn recognized(name: &str, quantity: &str, weight: &str) -> RecognizedIngredient {
        RecognizedIngredient {
            name: name.to_string(),
            quantity: quantity.to_string(),
            weight: weight.to_string(),
        }
    }

    #[test]
    fn test_commit_saves_reconciled_pantry() {
        let store = MockStore {
            items: Mutex::new(vec![IngredientItem::new("番茄", "2个", "300克")]),
            ..MockStore::default()
        };
        let summary = commit_to_store(
            &store,
            &[
                IngredientItem::new("番茄", "1个", "150克"),
                IngredientItem::new("洋葱", "1个", ""),
            ],
        );
        assert!(summary.persisted);
        assert_eq!(summary.added, 1);
        assert_eq!(summary.merged, 1);
        let stored = store.items.lock().unwrap().clone();
        assert_eq!(stored, summary.items);
        assert_eq!(stored[0].quantity, "3个");
        assert_eq!(stored[0].weight, "450克");
    }

    #[test]
    fn test_commit_with_unreadable_store_does_not_overwrite() {
        let store = MockStore {
            fail_load: true,
            ..MockStore::default()
        };
        let summary = commit_to_store(&store, &[IngredientItem::new("番茄", "1个", "")]);
        assert!(!summary.persisted);
        assert_eq!(summary.items.len(), 1);
        assert_eq!(*store.saves.lock().unwrap(), 0);
    }

    #[test]
    fn test_commit_with_failing_save_returns_items() {
        let store = MockStore {
            fail_save: true,
            ..MockStore::default()
        };
        let summary = commit_to_store(&store, &[IngredientItem::new("鸡蛋", "6个", "")]);
        assert!(!summary.persisted);
        assert_eq!(summary.items[0].name, "鸡蛋");
        assert_eq!(*store.saves.lock().unwrap(), 1);
    }

    #[test]
    fn test_load_or_empty_swallows_errors() {
        let store = MockStore {
            fail_load: true,
            ..MockStore::default()
        };
        assert!(load_or_empty(&store).is_empty());
    }

    #[test]
    fn test_delete_from_store() {
        let tomato = IngredientItem::new("番茄", "2个", "");
        let onion = IngredientItem::new("洋葱", "1个", "");
        let store = MockStore {
            items: Mutex::new(vec![tomato.clone(), onion.clone()]),
            ..MockStore::default()
        };

        let summary = delete_from_store(&store, &tomato.id);
        assert!(summary.removed);
        assert!(summary.persisted);
        assert_eq!(*store.items.lock().unwrap(), vec![onion]);

        let missing = delete_from_store(&store, "ingredient-nope");
        assert!(!missing.removed);
        assert_eq!(*store.saves.lock().unwrap(), 1);
    }

    #[test]
    fn test_delete_with_failing_save() {
        let tomato = IngredientItem::new("番茄", "2个", "");
        let store = MockStore {
            items: Mutex::new(vec![tomato.clone()]),
            fail_save: true,
            ..MockStore::default()
        };
        let summary = delete_from_store(&store, &tomato.id);
        assert!(summary.removed);
        assert!(!summary.persisted);
        assert!(summary.items.is_empty());
        assert_eq!(store.items.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_with_unreadable_store() {
        let store = MockStore {
            fail_load: true,
            ..MockStore::default()
        };
        let summary = delete_from_store(&store, "ingredient-1");
        assert!(!summary.removed);
        assert!(!summary.persisted);
        assert_eq!(*store.saves.lock().unwrap(), 0);
    }

    #[test]
    fn test_commit_recognized_skips_unaddable() {
        let svc = PantryService::new_in_memory().unwrap();
        let summary = svc.commit_recognized(vec![
            recognized("番茄", "2个", "300克"),
            recognized("盐", "", ""),
            recognized("", "1个", ""),
            recognized("洋葱", "", "150克"),
        ]);
        assert!(summary.persisted);
        assert_eq!(summary.added, 2);
        let names: Vec<_> = svc.list_items().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["番茄", "洋葱"]);
    }

    #[test]
    fn test_scan_twice_merges() {
        let svc = PantryService::new_in_memory().unwrap();
        svc.commit_recognized(vec![recognized("番茄", "2个", "300克")]);
        let summary = svc.commit_recognized(vec![recognized(" 番茄", "1个", "150克")]);
        assert_eq!(summary.merged, 1);

        let tomato = svc.find_item("番茄").unwrap();
        assert_eq!(tomato.quantity, "3个");
        assert_eq!(tomato.weight, "450克");
        assert_eq!(tomato.history.len(), 1);
        assert_eq!(tomato.history[0].quantity, "2个");
    }

    #[test]
    fn test_add_manual_validates() {
        let svc = PantryService::new_in_memory().unwrap();
        assert!(svc.add_manual("  ", "1个", "").is_err());
        assert!(svc.add_manual("鸡蛋", "", " ").is_err());

        let summary = svc.add_manual(" 鸡蛋 ", "6个", "").unwrap();
        assert_eq!(summary.items[0].name, "鸡蛋");
        assert!(svc.find_item("鸡蛋").is_some());
    }

    #[test]
    fn test_delete_item_through_service() {
        let svc = PantryService::new_in_memory().unwrap();
        let summary = svc.add_manual("鸡蛋", "6个", "").unwrap();
        let id = summary.items[0].id.clone();

        assert!(svc.delete_item(&id).removed);
        assert!(svc.list_items().is_empty());
        assert!(!svc.delete_item(&id).removed);
    }

    #[test]
    fn test_profile_defaults_and_updates() {
        let svc = PantryService::new_in_memory().unwrap();
        assert_eq!(svc.get_profile(), UserProfile::default());

        let updated = svc
            .update_profile(&ProfileUpdate {
                name: Some("阿明".to_string()),
                favorites: Some(3),
                ..ProfileUpdate::default()
            })
            .unwrap();
        assert_eq!(updated.name, "阿明");
        assert_eq!(updated.level, 1);
        assert_eq!(svc.get_profile(), updated);

        assert!(
            svc.update_profile(&ProfileUpdate {
                points: Some(-5),
                ..ProfileUpdate::default()
            })
            .is_err()
        );
        assert_eq!(svc.get_profile(), updated);
    }

    #[test]
    fn test_corrupt_profile_falls_back_to_default() {
        let svc = PantryService::new_in_memory().unwrap();
        svc.database().set_value(PROFILE_KEY, "nope").unwrap();
        assert_eq!(svc.get_profile(), UserProfile::default());
    }

    #[test]
    fn test_recipe_coverage_uses_pantry() {
        let svc = PantryService::new_in_memory().unwrap();
        svc.add_manual("鲈鱼", "1条", "500克").unwrap();
        svc.add_manual("姜", "", "20克").unwrap();

        let fish = svc.recipe_detail("清蒸鱼").unwrap();
        assert_eq!(fish.on_hand, vec!["鲈鱼", "姜"]);
        assert_eq!(fish.missing.len(), 4);

        let all = svc.recipe_coverage("");
        assert_eq!(all.len(), 3);
        assert!(svc.recipe_detail("佛跳墙").is_none());
    }
}
