use tracing_subscriber::EnvFilter;

fn main() {
    let _ = dotenvy::dotenv();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,adspot=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    adspot::ui::launch_ui();
}
