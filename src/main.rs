use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use adspot::config::Config;
use adspot::db::Database;
use adspot::domains::chat::ChatSession;
use adspot::error::Result;
use adspot::inventory::InventoryStore;
use adspot::services::map::MapView;
use adspot::services::queries::{render_province_counts, QueryService};
use adspot::Dashboard;

#[derive(Parser, Debug)]
#[command(name = "adspot")]
#[command(about = "Ad spot inventory queries from the terminal")]
struct Cli {
    #[arg(long, env = "ADSPOT_CONFIG")]
    config: Option<String>,

    /// Overrides the configured database path.
    #[arg(long)]
    db: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List user tables.
    Tables,
    /// Row count of the table whose name best matches `--table`.
    Count {
        #[arg(long)]
        table: String,
    },
    /// Inventory rows per province.
    Provinces,
    /// Inventory locations with coordinates.
    Map,
    /// One chat turn through the model.
    Ask {
        #[arg(long)]
        text: String,
    },
    /// Append rows from an inventory CSV.
    ImportInventory {
        #[arg(long)]
        csv: String,
    },
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

    run(cli.command, &config).await
}

async fn run(command: Commands, config: &Config) -> Result<()> {
    if let Commands::Ask { text } = &command {
        let dashboard = Dashboard::from_config(config).await?;
        let mut session = ChatSession::new();
        let reply = dashboard.chat(&mut session, text).await;
        println!("{} {}", style("✦").color256(214).bold(), reply);
        return Ok(());
    }

    let db = Database::open(config.database_url()).await?;
    let queries = QueryService::new(db.clone());
    match command {
        Commands::Tables => {
            for table in queries.list_tables().await? {
                println!("{table}");
            }
        }
        Commands::Count { table } => {
            println!("{}", queries.table_count(&table).await);
        }
        Commands::Provinces => {
            let counts = queries.province_counts().await?;
            println!("{}", render_province_counts(&counts).trim_end());
        }
        Commands::Map => {
            let view = MapView::from_points(InventoryStore::new(db).map_points().await?);
            print_map(&view);
        }
        Commands::ImportInventory { csv } => {
            let inserted = InventoryStore::new(db).import_csv(&csv).await?;
            println!(
                "{} {inserted} rows from {csv}",
                style("Imported").color256(81).bold()
            );
        }
        Commands::Ask { .. } => {}
    }
    Ok(())
}

fn print_map(view: &MapView) {
    let Some(state) = view.view_state else {
        println!(
            "{}",
            style(view.message.as_deref().unwrap_or_default()).color256(245)
        );
        return;
    };
    println!(
        "{} {:.4}, {:.4} (zoom {})",
        style("Centre").color256(81).bold(),
        state.latitude,
        state.longitude,
        state.zoom
    );
    for point in &view.points {
        println!(
            "{:>10.5} {:>11.5}  {}",
            point.latitude,
            point.longitude,
            point.location_name.as_deref().unwrap_or("")
        );
    }
}
