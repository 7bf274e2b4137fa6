use anyhow::Result;
use clap::Parser;
use flapper_lib::app::{App, RunMode};
use flapper_lib::model::config::AppConfig;
use flapper_lib::model::metrics::init_logging;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Number of generations to run (overrides config)
    #[arg(short, long)]
    generations: Option<u64>,

    /// Agents per generation (overrides config)
    #[arg(short, long)]
    population: Option<usize>,

    /// RNG seed for obstacles and policies (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Mode to run the simulation in
    #[arg(short, long, value_enum, default_value = "headless")]
    mode: Mode,

    /// Directory for the generation history log
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum Mode {
    Headless,
    Paced,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut config = AppConfig::load(&args.config)?;
    if let Some(generations) = args.generations {
        config.population.generations = generations;
    }
    if let Some(size) = args.population {
        config.population.size = size;
    }
    if args.seed.is_some() {
        config.world.seed = args.seed;
    }
    config.validate()?;

    let mode = match args.mode {
        Mode::Headless => RunMode::Headless,
        Mode::Paced => RunMode::Paced,
    };
    let generations = config.population.generations;
    let mut app = App::new(config, mode, Some(args.log_dir.as_path()))?;
    app.shutdown().listen_for_ctrl_c();

    if mode == RunMode::Paced {
        let mut rx = app.subscribe();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let line = rx
                    .borrow_and_update()
                    .as_ref()
                    .and_then(|s| serde_json::to_string(s).ok());
                if let Some(line) = line {
                    tracing::trace!(target: "flapper::snapshot", "{line}");
                }
            }
        });
    }

    let records = app.run(generations).await?;
    let best = records.iter().map(|r| r.score).max().unwrap_or(0);
    println!(
        "Finished {} generation(s), best score {best}. History: {}",
        records.len(),
        app.history_path().display()
    );

    Ok(())
}
