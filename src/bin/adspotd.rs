use adspot::config::Config;
use adspot::daemon;
use adspot::error::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "adspotd")]
#[command(about = "Ad spot dashboard daemon")]
struct Cli {
    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    #[arg(long, env = "ADSPOT_CONFIG")]
    config: Option<String>,

    /// Overrides the configured database path.
    #[arg(long)]
    db: Option<String>,

    #[arg(long, env = "ADSPOT_TOKEN")]
    token: Option<String>,
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
    let server = config.server.clone().unwrap_or_default();
    let host = cli
        .host
        .or(server.host)
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let port = cli.port.or(server.port).unwrap_or(7979);
    let token = cli.token.or(server.token).unwrap_or_default();

    daemon::run_with_shutdown(&host, port, &config, &token, async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutting down");
    })
    .await
}
