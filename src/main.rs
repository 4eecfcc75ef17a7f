mod cli;

use crate::cli::{Cli, Command};
use clap::Parser;
use exn::ResultExt;
use filmsync::Pipeline;
use filmsync::error::{ErrorKind, Result};
use filmsync_config::Config;
use filmsync_session::{ArchiveFile, BrowserSession, SourceHandle};
use filmsync_store::{Database, FilmStore, Repository, StoreHandle};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }
    let mut config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    if let Some(database) = cli.database.clone() {
        config.database = database;
    }

    let db = Database::connect(&config.database).await.or_raise(|| ErrorKind::Persistence)?;
    let repo = Repository::new(db.pool().clone(), cli.dry_run).with_atomic_replace(config.atomic_replace);
    if cli.dry_run {
        tracing::info!("Dry run; the database will not be changed");
    }

    let result = match cli.effective_command() {
        Command::Status => status(&repo).await,
        Command::Sync => {
            let source = BrowserSession::new(config.browser_options(), config.auth_probe.clone());
            sync(Arc::new(source), Arc::new(repo), &config).await
        },
        Command::Import { archive } => sync(Arc::new(ArchiveFile::new(archive)), Arc::new(repo), &config).await,
    };
    db.close().await;
    result
}

async fn sync(source: SourceHandle, store: StoreHandle, config: &Config) -> Result<()> {
    let pipeline = Pipeline::new(source, store, config.credential());
    let summary = pipeline.run().await?;
    println!(
        "Synced {} watched and {} to-watch films ({} rows skipped, {} written)",
        summary.watched, summary.towatch, summary.dropped, summary.inserted
    );
    Ok(())
}

async fn status(repo: &Repository) -> Result<()> {
    let counts = repo.count_by_status().await.or_raise(|| ErrorKind::Persistence)?;
    println!("watched: {}", counts.watched);
    println!("towatch: {}", counts.towatch);
    println!("total:   {}", counts.total());
    Ok(())
}
