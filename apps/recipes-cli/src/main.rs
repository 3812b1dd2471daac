use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use recipes::config::RecipesConfig;
use recipes::contract::client::RecipesApi;
use recipes::contract::model::Recipe;
use recipes::Recipes;
use runtime::{AppConfig, AppConfigProvider, CliArgs};
use std::path::{Path, PathBuf};

mod session;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Recipes CLI - browse recipes, favorites and your profile
#[derive(Parser)]
#[command(name = "recipes-cli")]
#[command(about = "Recipes CLI - browse recipes, favorites and your profile")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session (default)
    Run,
    /// Check configuration
    Check,
    /// List all recipes
    List,
    /// Show one recipe by id
    Show {
        /// Recipe id (its storage key)
        id: String,
    },
    /// Show a random recipe
    Random,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config
        .logging
        .clone()
        .unwrap_or_else(runtime::default_logging_config);
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.app.home_dir));
    tracing::info!("Recipes CLI starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let provider = AppConfigProvider::new(config.clone());
    let module_cfg: RecipesConfig = provider.module_config("recipes")?;
    // Relative seed paths are resolved next to the config file.
    let base_dir = cli
        .config
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf);

    let command = cli.command.unwrap_or(Commands::Run);
    if let Commands::Check = command {
        return check_config(&config, &module_cfg);
    }

    let (module, _backends) = Recipes::in_memory(&module_cfg, base_dir.as_deref()).await?;
    match command {
        Commands::Run | Commands::Check => session::run(module).await,
        Commands::List => list_recipes(&module).await,
        Commands::Show { id } => show_recipe(&module, &id).await,
        Commands::Random => random_recipe(&module).await,
    }
}

fn check_config(config: &AppConfig, module_cfg: &RecipesConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    recipes::domain::paths::StoreLayout::from_config(module_cfg)
        .map_err(|e| anyhow!("invalid recipes store layout: {e}"))?;
    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn list_recipes(module: &Recipes) -> Result<()> {
    let recipes = module.client().list_recipes().await;
    if recipes.is_empty() {
        println!("No recipes available");
    }
    for recipe in &recipes {
        println!("{:<24} {} ({} kcal)", recipe.id, recipe.title, recipe.calories);
    }
    Ok(())
}

async fn show_recipe(module: &Recipes, id: &str) -> Result<()> {
    let recipe = module.client().get_recipe(id).await?;
    print_recipe(&recipe, None);
    Ok(())
}

async fn random_recipe(module: &Recipes) -> Result<()> {
    match module.client().random_recipe().await {
        Some(recipe) => print_recipe(&recipe, None),
        None => println!("No recipes available"),
    }
    Ok(())
}

pub(crate) fn print_recipe(recipe: &Recipe, favorite: Option<bool>) {
    let marker = match favorite {
        Some(true) => " [favorite]",
        _ => "",
    };
    println!("{}{} ({})", recipe.title, marker, recipe.id);
    if !recipe.image_url.is_empty() {
        println!("  image: {}", recipe.image_url);
    }
    println!("  calories: {}", recipe.calories);
    if !recipe.ingredients.is_empty() {
        println!("  ingredients:");
        for ingredient in &recipe.ingredients {
            println!("    - {ingredient}");
        }
    }
    if !recipe.steps.is_empty() {
        println!("  steps:");
        for (n, step) in recipe.steps.iter().enumerate() {
            println!("    {}. {}", n + 1, step);
        }
    }
}
