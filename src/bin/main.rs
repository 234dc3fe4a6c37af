use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "recsrv-server")]
#[command(about = "CRUD service for the recommendations table", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "recsrv.yaml")]
    config: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recsrv=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    if let Err(e) = recsrv::run(&args.config).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
