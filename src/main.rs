use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use devtrack::{api, db};

#[derive(Parser)]
#[command(name = "devtrack")]
#[command(about = "Personal project tracker with a tool bridge for AI agents")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Devtrack gateway server
    Serve {
        /// Port for the HTTP gateway
        #[arg(short, long, default_value = "3100")]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "devtrack=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let port = match cli.command {
        Some(Commands::Serve { port }) => port,
        // Default: serve on the standard port
        None => 3100,
    };

    let db = db::Database::open_default()?;
    db.migrate()?;

    let app = api::create_router(db);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Devtrack gateway listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}
