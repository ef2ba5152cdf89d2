use anyhow::{Result, bail};

use pantry_core::models::{ProfileUpdate, UserProfile};
use pantry_core::service::PantryService;

pub(crate) fn cmd_profile_show(svc: &PantryService, json: bool) -> Result<()> {
    print_profile(&svc.get_profile(), json)
}

pub(crate) fn cmd_profile_set(svc: &PantryService, update: &ProfileUpdate, json: bool) -> Result<()> {
    if update.is_empty() {
        bail!(
            "Nothing to update. Provide at least one of --name, --avatar, --level, --points, --favorites, or --recipes"
        );
    }
    let profile = svc.update_profile(update)?;
    print_profile(&profile, json)
}

fn print_profile(profile: &UserProfile, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(profile)?);
        return Ok(());
    }

    let name = &profile.name;
    let level = profile.level;
    println!("{name} (Lv.{level})");
    println!("  Avatar:    {}", profile.avatar);
    println!("  Points:    {}", profile.points);
    println!("  Favorites: {}", profile.favorites);
    println!("  Recipes:   {}", profile.recipes);
    Ok(())
}
