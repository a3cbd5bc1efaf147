use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lst_cli::{apply, load_sources, CliConfig, RecipeEntry};
use lst_recipe::{RecipeCatalog, RecipeInfo, RecipeScheduler};
use lst_tree::{ExecutionContext, ParserRegistry, PrinterRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "lst", version, about = "Run lossless tree rewriting recipes over a project")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run recipes over every file in a directory
    Run {
        /// Project directory
        dir: PathBuf,

        /// Config file with [run] settings and [[recipes]]
        #[arg(long)]
        config: Option<PathBuf>,

        /// Recipe to run instead of the configured ones
        #[arg(long)]
        recipe: Option<String>,

        /// Recipe option as key=value; repeatable
        #[arg(long = "option", value_name = "KEY=VALUE", requires = "recipe")]
        options: Vec<String>,

        /// Override the configured parallelism
        #[arg(long)]
        parallelism: Option<usize>,

        /// Write results back to the directory
        #[arg(long)]
        apply: bool,
    },

    /// Print the recipe catalog as JSON
    Recipes,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let catalog = RecipeCatalog::with_defaults();

    match cli.command {
        Command::Recipes => {
            let descriptors: Vec<_> = catalog.descriptors().collect();
            println!("{}", serde_json::to_string_pretty(&descriptors)?);
        }
        Command::Run {
            dir,
            config,
            recipe,
            options,
            parallelism,
            apply: write,
        } => {
            let mut config = match &config {
                Some(path) => CliConfig::load(path)?,
                None => CliConfig::default(),
            };
            if let Some(name) = recipe {
                config.recipes = vec![RecipeEntry::from_args(&name, &options)?];
            }
            if let Some(parallelism) = parallelism {
                config.run = config.run.with_max_parallelism(parallelism);
            }

            let recipe = config.recipe(&catalog)?;
            let sources = load_sources(&dir, &ParserRegistry::with_defaults())?;
            let printers = Arc::new(PrinterRegistry::with_defaults());
            let marker_printer = config.run.marker_printer;
            let scheduler = RecipeScheduler::new(printers.clone(), config.run);
            let run = scheduler
                .run(recipe.clone(), sources, &ExecutionContext::new())
                .with_context(|| format!("running {}", recipe.name()))?;

            for result in &run.changeset {
                print!("{}", result.diff_with(&printers, marker_printer)?);
            }
            for (table, rows) in &run.data_tables {
                tracing::info!(table = %table, rows = rows.len(), "data table");
            }

            if write {
                let written = apply(&dir, &run, &printers)?;
                tracing::info!(files = written, dir = %dir.display(), "applied changes");
            } else if !run.is_empty() {
                tracing::info!(files = run.changeset.len(), "dry run; pass --apply to write changes");
            }
        }
    }
    Ok(())
}
