use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Storage key for the pantry collection.
pub const PANTRY_KEY: &str = "pantryItems";
/// Storage key for the user profile.
pub const PROFILE_KEY: &str = "userInfo";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub created_at: String,
    /// Most recent first, at most [`crate::history::HISTORY_LIMIT`] entries.
    #[serde(default)]
    pub history: Vec<HistorySnapshot>,
}

impl IngredientItem {
    /// Build a fresh item with a generated id and the current time.
    #[must_use]
    pub fn new(name: &str, quantity: &str, weight: &str) -> Self {
        Self {
            id: format!("ingredient-{}", Uuid::new_v4()),
            name: name.trim().to_string(),
            quantity: quantity.trim().to_string(),
            weight: weight.trim().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            history: Vec::new(),
        }
    }

    /// Name as used for merge matching.
    #[must_use]
    pub fn merge_key(&self) -> String {
        normalize_name(&self.name)
    }

    #[must_use]
    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            created_at: self.created_at.clone(),
            quantity: self.quantity.clone(),
            weight: self.weight.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySnapshot {
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub weight: String,
}

/// One line of a recognition reply, before it gets an id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedIngredient {
    pub name: String,
    pub quantity: String,
    pub weight: String,
}

impl RecognizedIngredient {
    /// A name plus at least one of quantity or weight.
    #[must_use]
    pub fn is_addable(&self) -> bool {
        !self.name.trim().is_empty()
            && (!self.quantity.trim().is_empty() || !self.weight.trim().is_empty())
    }

    #[must_use]
    pub fn into_item(self) -> IngredientItem {
        IngredientItem::new(&self.name, &self.quantity, &self.weight)
    }
}

/// Result of folding recognized items into the stored pantry.
#[derive(Debug, Clone, Serialize)]
pub struct CommitSummary {
    pub items: Vec<IngredientItem>,
    pub added: usize,
    pub merged: usize,
    pub persisted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub avatar: String,
    pub level: i64,
    pub points: i64,
    pub favorites: i64,
    pub recipes: i64,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "小黄".to_string(),
            avatar: "https://randomuser.me/api/portraits/men/32.jpg".to_string(),
            level: 1,
            points: 0,
            favorites: 0,
            recipes: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub level: Option<i64>,
    pub points: Option<i64>,
    pub favorites: Option<i64>,
    pub recipes: Option<i64>,
}

impl ProfileUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.avatar.is_none()
            && self.level.is_none()
            && self.points.is_none()
            && self.favorites.is_none()
            && self.recipes.is_none()
    }

    /// Shallow merge onto `profile`; unset fields keep their current value.
    #[must_use]
    pub fn apply(&self, profile: &UserProfile) -> UserProfile {
        UserProfile {
            name: self.name.clone().unwrap_or_else(|| profile.name.clone()),
            avatar: self.avatar.clone().unwrap_or_else(|| profile.avatar.clone()),
            level: self.level.unwrap_or(profile.level),
            points: self.points.unwrap_or(profile.points),
            favorites: self.favorites.unwrap_or(profile.favorites),
            recipes: self.recipes.unwrap_or(profile.recipes),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub ingredients: Vec<String>,
    pub time: String,
    pub difficulty: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeCoverage {
    pub recipe: Recipe,
    pub on_hand: Vec<String>,
    pub missing: Vec<String>,
}

#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Validate an item before it is written: non-empty name and id, bounded history.
pub fn validate_item(item: &IngredientItem) -> Result<()> {
    if item.name.trim().is_empty() {
        bail!("Ingredient name must not be empty");
    }
    if item.id.trim().is_empty() {
        bail!("Ingredient id must not be empty");
    }
    if item.history.len() > crate::history::HISTORY_LIMIT {
        bail!(
            "Ingredient '{}' has {} history entries (max {})",
            item.name,
            item.history.len(),
            crate::history::HISTORY_LIMIT
        );
    }
    Ok(())
}

pub fn validate_profile_update(update: &ProfileUpdate) -> Result<()> {
    if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        bail!("Profile name must not be empty");
    }
    for (field, value) in [
        ("level", update.level),
        ("points", update.points),
        ("favorites", update.favorites),
        ("recipes", update.recipes),
    ] {
        if value.is_some_and(|v| v < 0) {
            bail!("Profile {field} must not be negative");
        }
    }
    if update.level == Some(0) {
        bail!("Profile level starts at 1");
    }
    Ok(())
}
