use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use userbase::infrastructure::AppState;
use userbase::{config, db, seed};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "userbase=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();
    tracing::info!(profile = %config.profile, "starting userbase");

    // Initialize database
    let db = match db::init_db_with(config.connect_options()).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    if config.seed_demo {
        tracing::info!("Seeding demo data...");
        if let Err(e) = seed::seed_demo_data(&db).await {
            tracing::error!("Failed to seed data: {}", e);
        } else {
            tracing::info!("Demo data seeded successfully.");
        }
    }

    let state = AppState::new(db);
    match state.user_service().list_users(0, 0).await {
        Ok(page) => tracing::info!(live_users = page.total, "schema ready"),
        Err(e) => {
            tracing::error!("Failed to read users: {}", e);
            std::process::exit(1);
        }
    }
}
