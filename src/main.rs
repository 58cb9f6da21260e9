//! bakeoff - command line entry point
//!
//! Loads a CSV file, runs the model bake-off for the chosen target column and
//! offers to save the winning model.

use anyhow::Context;
use clap::Parser;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use std::path::PathBuf;

use bakeoff::{read_csv, ModelPersistence, Pipeline, SelectionConfig, TaskKind};

const DEFAULT_MODEL_FILE: &str = "best_model.json";

#[derive(Debug, Parser)]
#[command(name = "bakeoff", version, about = "Fit a fixed catalogue of models and keep the best")]
struct Cli {
    /// CSV file with a header row
    #[arg(short, long)]
    data: PathBuf,

    /// Target column; prompted for when omitted
    #[arg(short, long)]
    target: Option<String>,

    /// "regressor" or "classifier"; prompted for when omitted
    #[arg(long)]
    task: Option<String>,

    /// TOML, YAML or JSON file overriding the default configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the best model
    #[arg(short, long)]
    save: Option<PathBuf>,

    /// Save without asking for confirmation
    #[arg(short, long)]
    yes: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bakeoff=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let theme = ColorfulTheme::default();

    let config = match &cli.config {
        Some(path) => SelectionConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => SelectionConfig::default(),
    };

    let dataset = read_csv(&cli.data, true)?;
    println!(
        "Loaded {} rows and {} columns from {}",
        dataset.row_count(),
        dataset.column_count(),
        cli.data.display()
    );

    let target = match cli.target {
        Some(target) => target,
        None => {
            let columns = dataset.column_names();
            let index = Select::with_theme(&theme)
                .with_prompt("Target column")
                .items(columns)
                .default(columns.len().saturating_sub(1))
                .interact()?;
            columns[index].clone()
        }
    };

    let task: TaskKind = match cli.task {
        Some(task) => task.parse()?,
        None => {
            let kinds = [TaskKind::Regressor, TaskKind::Classifier];
            let index = Select::with_theme(&theme)
                .with_prompt("Task")
                .items(&kinds)
                .default(0)
                .interact()?;
            kinds[index]
        }
    };

    let outcome = Pipeline::new(config).run(&dataset, &target, task)?;

    println!();
    println!("{:<28} {:>10}", "Model", "Score");
    for entry in &outcome.leaderboard {
        println!("{:<28} {:>10.4}", entry.name, entry.score);
    }
    println!();
    println!("{}", outcome.report);
    println!();
    println!("Best model: {}", outcome.best_name());
    println!("Best score: {:.4}", outcome.best_score);

    let save_to = if cli.yes {
        Some(cli.save.unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_FILE)))
    } else if Confirm::with_theme(&theme)
        .with_prompt("Save the best model?")
        .default(false)
        .interact()?
    {
        match cli.save {
            Some(path) => Some(path),
            None => {
                let name: String = Input::with_theme(&theme)
                    .with_prompt("File name")
                    .default(DEFAULT_MODEL_FILE.to_string())
                    .interact_text()?;
                Some(PathBuf::from(name))
            }
        }
    } else {
        None
    };

    if let Some(path) = save_to {
        outcome
            .saved_model()
            .save_model(&path)
            .with_context(|| format!("saving model to {}", path.display()))?;
        println!("Model saved to {}", path.display());
    }

    Ok(())
}
