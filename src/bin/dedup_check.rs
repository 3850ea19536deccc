//! Check a proposed opportunity name against a JSON candidate file
//!
//! The candidate file is a JSON array of records in the CRM wire format:
//!
//! ```text
//! [
//!   {"id": 1, "name": "ABC Corp - Widget Deal", "stage": "new_lead"},
//!   {"id": 2, "name": "XYZ Industries - Gadget", "stage": "demo_scheduled"}
//! ]
//! ```
//!
//! Run with:
//!   cargo run --features cli --bin dedup-check -- \
//!     --candidates opportunities.json --name "ABC Corp - Widget Deals"
//!
//! Exit status is 0 when no similar names exist and 2 when a warning applies.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use opportunity_dedup::{
    CandidateId, DedupConfig, DuplicateCheckSession, NamedCandidate, StaticCandidates,
};

/// Exit status when similar names were found
const EXIT_SIMILAR: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "dedup-check")]
#[command(about = "Warn about near-duplicate opportunity names")]
struct Args {
    /// JSON file holding the existing opportunities
    #[arg(long, short = 'c')]
    candidates: PathBuf,

    /// Proposed opportunity name
    #[arg(long, short = 'n')]
    name: String,

    /// Maximum edit distance reported as similar (overrides config)
    #[arg(long, short = 't')]
    threshold: Option<usize>,

    /// Id of the opportunity being edited, excluded from matching
    #[arg(long)]
    exclude_id: Option<String>,

    /// YAML configuration file
    #[arg(long, env = "DEDUP_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', default_value = "pretty", value_enum)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "opportunity_dedup=info,dedup_check=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let path = path.to_string_lossy();
            info!(path = %path, "Loading configuration");
            DedupConfig::from_file(&path)?
        }
        None => DedupConfig::default(),
    };
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }

    let content = std::fs::read_to_string(&args.candidates)
        .with_context(|| format!("Failed to read {}", args.candidates.display()))?;
    let candidates: Vec<NamedCandidate> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid candidate file {}", args.candidates.display()))?;

    // Input bounds are the caller's policy; the matcher itself is unbounded
    config.limits.check_name(&args.name)?;
    config.limits.check_candidates(&candidates)?;

    info!(
        candidates = candidates.len(),
        threshold = config.threshold,
        "Checking proposed name"
    );

    let mut session =
        DuplicateCheckSession::from_config(StaticCandidates::new(candidates), &config);
    if let Some(id) = &args.exclude_id {
        let id: CandidateId = id.parse()?;
        session = session.excluding(id);
    }

    let result = session.check(&args.name).await;

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string(&result)?,
        OutputFormat::Pretty => serde_json::to_string_pretty(&result)?,
    };
    println!("{}", output);

    if result.has_similar {
        std::process::exit(EXIT_SIMILAR);
    }
    Ok(())
}
