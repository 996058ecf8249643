use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use handwatch_archive::{
    append_rows, rotate_if_stale, synthetic_rows, ArchiveSettings, RotateOutcome,
};

#[derive(Parser, Debug)]
#[command(name = "handwatch-archive", version)]
#[command(about = "Rotate and seed handwatch sensor documents stored in a GitHub repository")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Repository in owner/name form
    #[arg(long, global = true)]
    repo: Option<String>,

    /// Branch to read and write
    #[arg(long, global = true)]
    branch: Option<String>,

    /// Path of the main document in the repository
    #[arg(long, global = true)]
    path: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Archive the main document if its rows are from an earlier day
    Rotate {
        /// Directory for archived copies
        #[arg(long)]
        archive_dir: Option<String>,
    },
    /// Append one synthetic reading per sensor to the main document
    Append {
        /// Seed for the generated values
        #[arg(long)]
        seed: Option<u64>,
    },
}

impl Cli {
    fn apply(&self, settings: &mut ArchiveSettings) {
        if let Some(repo) = &self.repo {
            settings.repo = Some(repo.clone());
        }
        if let Some(branch) = &self.branch {
            settings.branch = Some(branch.clone());
        }
        if let Some(path) = &self.path {
            settings.path = path.clone();
        }
        if let Command::Rotate {
            archive_dir: Some(dir),
        } = &self.command
        {
            settings.archive_dir = dir.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = ArchiveSettings::load(cli.config.as_deref())?;
    cli.apply(&mut settings);
    if settings.token.is_none() {
        settings.token = std::env::var("GITHUB_TOKEN").ok();
    }

    let store = settings.store()?;
    let now = settings.now()?;

    match cli.command {
        Command::Rotate { .. } => {
            let outcome = rotate_if_stale(
                &store,
                &settings.path,
                &settings.archive_dir,
                now.date_naive(),
            )
            .await
            .with_context(|| format!("Failed to rotate {}", settings.path))?;

            match outcome {
                RotateOutcome::Missing => info!(path = %settings.path, "document does not exist"),
                RotateOutcome::Empty => info!(path = %settings.path, "document is empty, nothing to archive"),
                RotateOutcome::Current => info!(path = %settings.path, "rows are from today, nothing to archive"),
                RotateOutcome::Archived { date, archive_path } => {
                    info!(path = %settings.path, %date, archive = %archive_path, "archived and reset")
                }
            }
        }
        Command::Append { seed } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let rows = synthetic_rows(now, &mut rng);
            let message = format!("Test data update: {}", now.format("%H:%M:%S"));

            let total = append_rows(&store, &settings.path, rows, &message)
                .await
                .with_context(|| format!("Failed to append to {}", settings.path))?;
            info!(path = %settings.path, total, "appended test rows");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_settings() {
        let cli = Cli::parse_from([
            "handwatch-archive",
            "rotate",
            "--repo",
            "lab/glove",
            "--archive-dir",
            "old",
        ]);
        let mut settings = ArchiveSettings::default();
        cli.apply(&mut settings);

        assert_eq!(settings.repo.as_deref(), Some("lab/glove"));
        assert_eq!(settings.archive_dir, "old");
        assert_eq!(settings.path, "sensor_data.json");
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["handwatch-archive"]).is_err());
    }
}
