mod browser;
mod catalog;
mod error;
mod export;
mod extract;
mod pipeline;
mod storage;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use catalog::Category;

#[derive(Parser)]
#[command(name = "bestof_scraper", about = "Storefront best-of-the-year scraper")]
struct Cli {
    /// Directory holding the intermediate document and the CSV output
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
    /// Run the browser with a visible window
    #[arg(long)]
    with_head: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape (or reuse the cached dataset) and write the CSV files
    Run,
    /// Force a fresh scrape and rewrite the intermediate document
    Scrape,
    /// Write the CSV files from the existing intermediate document
    Export,
    /// Show dataset statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let dataset_path = storage::dataset_path(&cli.data_dir);

    let result = match cli.command {
        Commands::Run => {
            let dataset = if dataset_path.exists() {
                println!("Using cached dataset at {}", dataset_path.display());
                storage::load_dataset(&dataset_path)?
            } else {
                let dataset = pipeline::run_scrape(!cli.with_head).await?;
                storage::save_dataset(&dataset_path, &dataset)?;
                dataset
            };
            export::write_csv_files(&dataset, &cli.data_dir)?;
            println!("Wrote 3 CSV files to {}", cli.data_dir.display());
            Ok(())
        }
        Commands::Scrape => {
            let dataset = pipeline::run_scrape(!cli.with_head).await?;
            storage::save_dataset(&dataset_path, &dataset)?;
            println!("Dataset written to {}", dataset_path.display());
            Ok(())
        }
        Commands::Export => {
            if !dataset_path.exists() {
                println!(
                    "No dataset at {}. Run 'scrape' first.",
                    dataset_path.display()
                );
                return Ok(());
            }
            let dataset = storage::load_dataset(&dataset_path)?;
            export::write_csv_files(&dataset, &cli.data_dir)?;
            println!("Wrote 3 CSV files to {}", cli.data_dir.display());
            Ok(())
        }
        Commands::Stats => {
            if !dataset_path.exists() {
                println!(
                    "No dataset at {}. Run 'scrape' first.",
                    dataset_path.display()
                );
                return Ok(());
            }
            let dataset = storage::load_dataset(&dataset_path)?;
            println!(
                "{:<14} | {:>5} | {:>6} | {:>5} | {:>11}",
                "Category", "Years", "Groups", "Games", "With genres"
            );
            println!("{}", "-".repeat(56));
            for category in Category::ALL {
                let snapshot = dataset.snapshot(category);
                let groups: usize = snapshot.values().map(|g| g.len()).sum();
                let games: usize = snapshot
                    .values()
                    .flat_map(|g| g.values())
                    .map(|games| games.len())
                    .sum();
                let with_genres: usize = snapshot
                    .values()
                    .flat_map(|g| g.values())
                    .flat_map(|games| games.values())
                    .filter(|entry| !entry.genre.is_empty())
                    .count();
                println!(
                    "{:<14} | {:>5} | {:>6} | {:>5} | {:>11}",
                    category.key(),
                    snapshot.len(),
                    groups,
                    games,
                    with_genres
                );
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}
