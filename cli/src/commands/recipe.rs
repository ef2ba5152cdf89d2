use anyhow::Result;
use std::process;
use tabled::{Table, Tabled, settings::Style};

use pantry_core::models::RecipeCoverage;
use pantry_core::service::PantryService;

use super::helpers::json_error;

pub(crate) fn cmd_recipe_list(svc: &PantryService, json: bool) -> Result<()> {
    print_recipes(&svc.recipe_coverage(""), json)
}

pub(crate) fn cmd_recipe_search(svc: &PantryService, query: &str, json: bool) -> Result<()> {
    let results = svc.recipe_coverage(query);

    if results.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No recipes found for '{query}'");
        }
        process::exit(2);
    }

    print_recipes(&results, json)
}

pub(crate) fn cmd_recipe_show(svc: &PantryService, name: &str, json: bool) -> Result<()> {
    let Some(detail) = svc.recipe_detail(name) else {
        if json {
            println!("{}", json_error(&format!("Recipe '{name}' not found")));
        } else {
            eprintln!("Recipe '{name}' not found");
        }
        process::exit(2);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    let recipe = &detail.recipe;
    println!("{} ({}, {})", recipe.name, recipe.time, recipe.difficulty);
    println!("  On hand: {}", join_or_dash(&detail.on_hand));
    println!("  Missing: {}", join_or_dash(&detail.missing));
    Ok(())
}

fn print_recipes(results: &[RecipeCoverage], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    #[derive(Tabled)]
    struct RecipeRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Time")]
        time: String,
        #[tabled(rename = "Difficulty")]
        difficulty: String,
        #[tabled(rename = "Have")]
        have: String,
        #[tabled(rename = "Missing")]
        missing: String,
    }

    let rows: Vec<RecipeRow> = results
        .iter()
        .map(|c| RecipeRow {
            id: c.recipe.id,
            name: c.recipe.name.clone(),
            time: c.recipe.time.clone(),
            difficulty: c.recipe.difficulty.clone(),
            have: format!("{}/{}", c.on_hand.len(), c.recipe.ingredients.len()),
            missing: join_or_dash(&c.missing),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}

fn join_or_dash(names: &[String]) -> String {
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join("、")
    }
}
