//! # Disease Index CLI (`dxi`)
//!
//! ## Usage
//!
//! ```bash
//! dxi --config ./config/dxi.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dxi run` | Enrich the input collection, build the index, write all artifacts |
//! | `dxi ids <list.json>` | Assign identifiers to a disease list |
//! | `dxi unify` | Rebuild the unified artifact from the enriched collection and index |
//! | `dxi stats` | Summarize the unified artifact |
//! | `dxi lookup <category>` | List the diseases of a symptom category |
//! | `dxi get <id>` | Show one disease |
//! | `dxi export` | Write symptom text as JSON Lines for the embedding stage |
//! | `dxi analyze "<text>"` | Categorize and profile free text |
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`
//! (default `disease_index=info,dxi=info`).

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use disease_index::config::{self, Config};
use disease_index::lookup::PatientFilter;
use disease_index::progress::ProgressMode;
use disease_index::{analyze, export, get, ids, lookup, pipeline, stats, unify};
use disease_index_core::models::Gender;

/// Disease Index: symptom categories and demographic hints for scraped
/// disease descriptions.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/dxi.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "dxi",
    about = "Disease Index: enrich scraped disease descriptions and index them by symptom category",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/dxi.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich the input collection and publish the enriched collection,
    /// the symptom index and the unified artifact.
    ///
    /// Artifacts are written all together or not at all; Ctrl-C before
    /// publishing leaves existing artifacts untouched.
    Run {
        /// Progress on stderr: `off`, `human` or `json`. Defaults to human on a TTY.
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,
    },

    /// Assign identifiers to a disease list (derived from each `url`).
    Ids {
        /// JSON array of diseases, or a collection with a `diseases` array.
        input: PathBuf,

        /// Write here instead of rewriting the input in place.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Rebuild the unified artifact from the enriched collection and index.
    Unify,

    /// Summarize the unified artifact.
    Stats,

    /// List the diseases indexed under a symptom category.
    Lookup {
        /// Category name; case and accents are ignored if no exact match exists.
        category: String,

        /// Only diseases whose age range covers this age.
        #[arg(long)]
        age: Option<u32>,

        /// Only diseases relevant to this gender.
        #[arg(long, value_enum)]
        gender: Option<GenderArg>,
    },

    /// Show one disease by identifier.
    Get {
        id: String,
    },

    /// Write symptom-section text as JSON Lines for the embedding stage.
    Export {
        /// Output file, or `-` for stdout. Defaults to `[paths].embedding_input`.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Categorize and profile free text. Runs without a config file.
    Analyze {
        text: String,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum GenderArg {
    Male,
    Female,
}

impl From<GenderArg> for Gender {
    fn from(g: GenderArg) -> Self {
        match g {
            GenderArg::Male => Gender::Male,
            GenderArg::Female => Gender::Female,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("disease_index=info,dxi=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Analyze { text, json } = &cli.command {
        let cfg = config::load_config(&cli.config).unwrap_or_else(|_| Config::minimal());
        analyze::run_analyze(&cfg, text, *json)?;
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Run { progress } => {
            let mode = progress.unwrap_or_else(ProgressMode::default_for_tty);
            pipeline::run_and_report(&cfg, mode).await?;
        }
        Commands::Ids { input, output } => {
            ids::run_ids(&cfg, &input, output.as_deref()).await?;
        }
        Commands::Unify => {
            unify::run_unify(&cfg).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Lookup {
            category,
            age,
            gender,
        } => {
            let filter = PatientFilter {
                age,
                gender: gender.map(Gender::from),
            };
            lookup::run_lookup(&cfg, &category, filter).await?;
        }
        Commands::Get { id } => {
            get::run_get(&cfg, &id).await?;
        }
        Commands::Export { output } => {
            export::run_export(&cfg, output.as_deref()).await?;
        }
        Commands::Analyze { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
