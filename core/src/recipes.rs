use crate::models::{IngredientItem, Recipe, RecipeCoverage, normalize_name};

fn recipe(id: i64, name: &str, ingredients: &[&str], time: &str, difficulty: &str) -> Recipe {
    Recipe {
        id,
        name: name.to_string(),
        ingredients: ingredients.iter().map(ToString::to_string).collect(),
        time: time.to_string(),
        difficulty: difficulty.to_string(),
    }
}

/// Built-in recipes shipped with the app.
#[must_use]
pub fn catalog() -> Vec<Recipe> {
    vec![
        recipe(
            1,
            "番茄炒蛋",
            &["番茄", "鸡蛋", "葱花", "盐", "糖"],
            "15分钟",
            "简单",
        ),
        recipe(
            2,
            "红烧肉",
            &["五花肉", "酱油", "料酒", "冰糖", "八角", "桂皮"],
            "90分钟",
            "中等",
        ),
        recipe(
            3,
            "清蒸鱼",
            &["鲈鱼", "姜", "蒜", "葱", "酱油", "料酒"],
            "30分钟",
            "中等",
        ),
    ]
}

/// Recipes whose name or any ingredient contains `query`, ignoring case.
/// A blank query matches everything.
#[must_use]
pub fn search_recipes(query: &str) -> Vec<Recipe> {
    let needle = normalize_name(query);
    catalog()
        .into_iter()
        .filter(|r| {
            needle.is_empty()
                || r.name.to_lowercase().contains(&needle)
                || r.ingredients
                    .iter()
                    .any(|i| i.to_lowercase().contains(&needle))
        })
        .collect()
}

#[must_use]
pub fn find_recipe(name: &str) -> Option<Recipe> {
    let key = normalize_name(name);
    catalog()
        .into_iter()
        .find(|r| normalize_name(&r.name) == key)
}

/// Split a recipe's ingredients into those already in the pantry and those missing.
#[must_use]
pub fn coverage(recipe: &Recipe, pantry: &[IngredientItem]) -> RecipeCoverage {
    let (on_hand, missing): (Vec<String>, Vec<String>) = recipe
        .ingredients
        .iter()
        .cloned()
        .partition(|ingredient| {
            let key = normalize_name(ingredient);
            pantry.iter().any(|item| item.merge_key() == key)
        });

    RecipeCoverage {
        recipe: recipe.clone(),
        on_hand,
        missing,
    }
}
