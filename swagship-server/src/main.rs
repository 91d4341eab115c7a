// File: swagship-server/src/main.rs

use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

mod admin;
mod context;
mod handlers;
mod server;

use context::ServerContext;

#[derive(Parser, Debug, Clone)]
#[command(name = "swagship")]
#[command(author, version, about = "swagship - single-use promo code redemption and shipping")]
pub struct Args {
    /// Address to which the HTTP server will bind
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub bind_addr: String,

    /// Store connection URL: postgres://... for the networked store,
    /// sqlite://<path> for the file-based one
    #[arg(long, default_value = "sqlite://swagship.db")]
    pub database_url: String,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("swagship=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!(
        "swagship starting. bind_addr={}, database_url={}",
        args.bind_addr, args.database_url
    );

    let ctx = Arc::new(ServerContext::build(&args).await?);
    server::run(ctx, &args.bind_addr).await?;

    info!("Main finished. Goodbye!");
    Ok(())
}
