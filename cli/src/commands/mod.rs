mod helpers;
mod pantry;
mod profile;
mod recipe;
mod scan;

pub(crate) use pantry::{cmd_add, cmd_delete, cmd_list, cmd_show};
pub(crate) use profile::{cmd_profile_set, cmd_profile_show};
pub(crate) use recipe::{cmd_recipe_list, cmd_recipe_search, cmd_recipe_show};
pub(crate) use scan::{cmd_import, cmd_scan, cmd_voice};
