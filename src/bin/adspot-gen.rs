use std::sync::Arc;
use std::time::Duration;

use adspot::config::Config;
use adspot::db::Database;
use adspot::error::{AdspotError, Result};
use adspot::events::PersonEventStore;
use adspot::generator::{
    load_locations_csv, BaseLocation, EventGenerator, GeneratorJob, Jitter, ProfileCatalog,
};
use adspot::inventory::InventoryStore;
use adspot::scheduler::Scheduler;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "adspot-gen")]
#[command(about = "Writes synthetic person-location events on a fixed interval")]
struct Cli {
    #[arg(long, env = "ADSPOT_CONFIG")]
    config: Option<String>,

    /// Overrides the configured database path.
    #[arg(long)]
    db: Option<String>,

    /// CSV of base locations; defaults to the inventory table.
    #[arg(long)]
    locations: Option<String>,

    #[arg(long)]
    frequency_seconds: Option<u64>,

    #[arg(long)]
    profiles: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,adspot=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database.get_or_insert_with(Default::default).url = Some(db);
    }
    let mut settings = config.generator();
    if cli.locations.is_some() {
        settings.locations_csv = cli.locations;
    }
    if cli.frequency_seconds.is_some() {
        settings.frequency_seconds = cli.frequency_seconds;
    }
    if cli.profiles.is_some() {
        settings.profile_count = cli.profiles;
    }

    let db = Database::open(config.database_url()).await?;
    let locations: Vec<BaseLocation> = match settings.locations_csv.as_deref() {
        Some(path) => load_locations_csv(path)?,
        None => InventoryStore::new(db.clone())
            .map_points()
            .await?
            .iter()
            .map(BaseLocation::from)
            .collect(),
    };
    tracing::info!(locations = locations.len(), "loaded base locations");

    let profile_count = settings.profile_count();
    let catalog = tokio::task::spawn_blocking(move || {
        ProfileCatalog::generate(profile_count, &mut rand::thread_rng())
    })
    .await
    .map_err(|e| AdspotError::Runtime(e.to_string()))?;
    tracing::info!(profiles = catalog.len(), "generated profile catalog");

    let generator = EventGenerator::new(
        catalog,
        locations,
        Jitter::new(settings.jitter_std_dev())?,
        PersonEventStore::new(db),
    )?;
    let interval = Duration::from_secs(settings.frequency_seconds());

    let mut scheduler = Scheduler::new();
    scheduler.register_job(Arc::new(GeneratorJob::new(generator, interval)));
    scheduler.start();
    tracing::info!(every_seconds = interval.as_secs(), "generator running; Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| AdspotError::Runtime(e.to_string()))?;
    scheduler.stop().await;
    tracing::info!("generator stopped");
    Ok(())
}
