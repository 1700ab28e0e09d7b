//! `cedica`: runs the admin API and the database maintenance commands.
//!
//! Run from repo root: `cargo run -p cedica-server -- serve`

use cedica_admin::service::{seeds, users};
use cedica_admin::{app, apply_schema, ensure_database_exists, reset, storage, AppState, Settings};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "cedica", version, about = "CEDICA administration backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API (default).
    Serve {
        /// Overrides BIND_ADDR.
        #[arg(long, env = "BIND_ADDR")]
        bind: Option<String>,
    },
    /// Drop every table and recreate the schema.
    ResetDb,
    /// Load permissions, roles and sample data.
    SeedsDb,
    /// Create only the permissions and roles.
    CreateRoles,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cedica_admin=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::from_env();

    ensure_database_exists(&settings.database_url).await?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&settings.database_url)
        .await?;

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::ResetDb => {
            reset(&pool).await?;
            tracing::info!("database reset");
        }
        Command::SeedsDb => {
            apply_schema(&pool).await?;
            seeds::run(&pool).await?;
            tracing::info!("database seeded");
        }
        Command::CreateRoles => {
            apply_schema(&pool).await?;
            users::create_permissions(&pool).await?;
            users::create_roles(&pool).await?;
            tracing::info!("permissions and roles created");
        }
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                settings.bind_addr = bind;
            }
            apply_schema(&pool).await?;
            let store = storage::from_settings(&settings.storage).await;
            let listener = TcpListener::bind(&settings.bind_addr).await?;
            let state = AppState::new(pool, settings, store);
            tracing::info!("listening on http://{}", listener.local_addr()?);
            axum::serve(listener, app(state)).await?;
        }
    }
    Ok(())
}
