//! Chronicle Engine - command line entry point.
//!
//! ```text
//! chronicle-engine apply <save.json> <payload.json> [out.json]
//! chronicle-engine rate <difficulty> <level>
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chronicle_engine::infrastructure::clock::{RandomIds, SystemClock};
use chronicle_engine::infrastructure::persistence;
use chronicle_engine::infrastructure::settings::EngineSettings;
use chronicle_engine::use_cases::scaling::rate_challenge;
use chronicle_engine::use_cases::TurnReconciler;

const USAGE: &str = "usage:
  chronicle-engine apply <save.json> <payload.json> [out.json]
  chronicle-engine rate <difficulty> <level>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();
    let settings = EngineSettings::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["apply", save, payload] => apply(&settings, Path::new(save), Path::new(payload), None).await,
        ["apply", save, payload, out] => {
            apply(&settings, Path::new(save), Path::new(payload), Some(PathBuf::from(out))).await
        }
        ["rate", difficulty, level] => rate(difficulty, level),
        _ => bail!("{USAGE}"),
    }
}

/// Apply one game-master turn to a save file. The result overwrites the save
/// unless an output path is given.
async fn apply(
    settings: &EngineSettings,
    save: &Path,
    payload: &Path,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(save)
        .await
        .with_context(|| format!("reading save {}", save.display()))?;
    let raw = tokio::fs::read_to_string(payload)
        .await
        .with_context(|| format!("reading payload {}", payload.display()))?;

    let reconciler = TurnReconciler::new(
        Arc::new(RandomIds::new()),
        Arc::new(SystemClock::new()),
        settings.max_turn_history,
    );
    let mut world = persistence::deserialize(&bytes)?;
    let repaired = reconciler.repair_missing_ids(&mut world);
    if !repaired.is_empty() {
        tracing::info!(count = repaired.len(), "Assigned IDs to entities saved without one");
    }

    let turn = TurnReconciler::parse_payload(&raw)?;
    let (next, log) = reconciler.apply_turn(&world, &turn)?;

    let out = out.unwrap_or_else(|| save.to_path_buf());
    tokio::fs::write(&out, persistence::serialize(&next, Utc::now())?)
        .await
        .with_context(|| format!("writing save {}", out.display()))?;

    println!("{}", serde_json::to_string_pretty(&log)?);
    Ok(())
}

fn rate(difficulty: &str, level: &str) -> anyhow::Result<()> {
    let difficulty: i32 = difficulty
        .parse()
        .with_context(|| format!("difficulty must be an integer, got {difficulty:?}"))?;
    let level: u32 = level
        .parse()
        .with_context(|| format!("level must be a non-negative integer, got {level:?}"))?;

    let rating = rate_challenge(difficulty, level);
    println!(
        "{} (effective difficulty {}, weight {})",
        rating.tier,
        rating.effective_difficulty,
        rating.tier.weight()
    );
    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
