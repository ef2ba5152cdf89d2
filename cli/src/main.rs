mod commands;
mod config;
mod siliconflow;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::commands::{
    cmd_add, cmd_delete, cmd_import, cmd_list, cmd_profile_set, cmd_profile_show,
    cmd_recipe_list, cmd_recipe_search, cmd_recipe_show, cmd_scan, cmd_show, cmd_voice,
};
use crate::config::Config;
use crate::siliconflow::SiliconFlowClient;
use pantry_core::models::ProfileUpdate;
use pantry_core::service::PantryService;

#[derive(Parser)]
#[command(
    name = "pantry",
    version,
    about = "A local pantry tracker with photo and voice ingredient recognition",
    long_about = "Keep track of what is in your kitchen. Photograph or dictate your \
groceries and matching ingredients are merged into the pantry you already have."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List everything in the pantry
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one ingredient with its earlier amounts
    Show {
        /// Ingredient name (case-insensitive)
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add an ingredient by hand, merging with an existing one of the same name
    Add {
        /// Ingredient name
        name: String,
        /// Count with unit (e.g. "2个", "1盒")
        #[arg(short, long)]
        quantity: Option<String>,
        /// Weight with unit (e.g. "300克", "1斤")
        #[arg(short, long)]
        weight: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an ingredient by ID
    Delete {
        /// Ingredient ID (see `pantry list`)
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Recognize ingredients in a photo and add them
    Scan {
        /// Path to the image
        image: PathBuf,
        /// Show what was recognized without saving
        #[arg(long)]
        dry_run: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Recognize ingredients from transcribed speech and add them
    Voice {
        /// Transcribed text (e.g. "土豆三个，猪肉一斤")
        text: String,
        /// Show what was recognized without saving
        #[arg(long)]
        dry_run: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add ingredients from a saved recognition reply
    Import {
        /// Reply file, or "-" for stdin
        file: String,
        /// Show what was recognized without saving
        #[arg(long)]
        dry_run: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Browse recipes against what is in the pantry
    Recipe {
        #[command(subcommand)]
        command: RecipeCommands,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show the profile
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update one or more profile fields
    Set {
        /// Display name
        #[arg(long)]
        name: Option<String>,
        /// Avatar URL
        #[arg(long)]
        avatar: Option<String>,
        /// Level (starts at 1)
        #[arg(long)]
        level: Option<i64>,
        /// Points
        #[arg(long)]
        points: Option<i64>,
        /// Favorite count
        #[arg(long)]
        favorites: Option<i64>,
        /// Recipe count
        #[arg(long)]
        recipes: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum RecipeCommands {
    /// List all recipes
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search recipes by name or ingredient
    Search {
        /// Search query
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a recipe with what is on hand and what is missing
    Show {
        /// Recipe name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pantry=info,pantry_core=info".into()),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let svc = PantryService::new(&config.db_path.to_string_lossy())?;

    match cli.command {
        Commands::List { json } => cmd_list(&svc, json),
        Commands::Show { name, json } => cmd_show(&svc, &name, json),
        Commands::Add {
            name,
            quantity,
            weight,
            json,
        } => cmd_add(&svc, &name, quantity.as_deref(), weight.as_deref(), json),
        Commands::Delete { id, json } => cmd_delete(&svc, &id, json),
        Commands::Scan {
            image,
            dry_run,
            json,
        } => {
            let client = SiliconFlowClient::new(&config)?;
            cmd_scan(&svc, &client, &image, dry_run, json).await
        }
        Commands::Voice {
            text,
            dry_run,
            json,
        } => {
            let client = SiliconFlowClient::new(&config)?;
            cmd_voice(&svc, &client, &text, dry_run, json).await
        }
        Commands::Import {
            file,
            dry_run,
            json,
        } => cmd_import(&svc, &file, dry_run, json),
        Commands::Profile { command } => match command {
            ProfileCommands::Show { json } => cmd_profile_show(&svc, json),
            ProfileCommands::Set {
                name,
                avatar,
                level,
                points,
                favorites,
                recipes,
                json,
            } => {
                let update = ProfileUpdate {
                    name,
                    avatar,
                    level,
                    points,
                    favorites,
                    recipes,
                };
                cmd_profile_set(&svc, &update, json)
            }
        },
        Commands::Recipe { command } => match command {
            RecipeCommands::List { json } => cmd_recipe_list(&svc, json),
            RecipeCommands::Search { query, json } => cmd_recipe_search(&svc, &query, json),
            RecipeCommands::Show { name, json } => cmd_recipe_show(&svc, &name, json),
        },
    }
}
