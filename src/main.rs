use anyhow::Result;
use clap::{Parser, Subcommand};
use plateful::routes::AppState;
use serde::Deserialize;
use sqlx::migrate::MigrateDatabase;
use sqlx_migrator::{Migrate, Plan};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

/// plateful - Recipe sharing backend
#[derive(Parser)]
#[command(name = "plateful")]
#[command(about = "Recipe sharing and shopping list backend", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run database migrations
    Migrate,
    /// Drop database if exists and recreate with migrations
    Reset,
    /// Bulk-load the ingredient catalog from a JSON file
    ImportIngredients {
        /// Path to a JSON array of {"name", "measurement_unit"} objects
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = plateful::config::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    // Initialize observability (tracing + logging)
    plateful::observability::init_observability(
        "plateful",
        env!("CARGO_PKG_VERSION"),
        &config.observability.log_level,
    )?;

    match cli.command {
        Commands::Serve { host, port } => serve_command(config, host, port).await,
        Commands::Migrate => migrate_command(config).await,
        Commands::Reset => reset_command(config).await,
        Commands::ImportIngredients { file } => import_ingredients_command(config, file).await,
    }
}

#[tracing::instrument(skip(config))]
async fn serve_command(
    config: plateful::config::Config,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<()> {
    tracing::info!("Starting plateful server...");

    // Use CLI overrides if provided, otherwise use config
    let host = host_override.unwrap_or(config.server.host.clone());
    let port = port_override.unwrap_or(config.server.port);

    // Set up database connection pool
    let pool = plateful::db::create_pool(&config.database.url, config.database.max_connections)
        .await?;

    let state = AppState {
        config,
        pool,
    };

    let app = plateful::routes::router(state)
        .layer(CompressionLayer::new().br(true).gzip(true))
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

#[tracing::instrument(skip(config))]
async fn migrate_command(config: plateful::config::Config) -> Result<()> {
    tracing::info!("Running database migrations...");

    // Create database if it doesn't exist
    if !sqlx::Sqlite::database_exists(&config.database.url).await? {
        tracing::info!("Database does not exist, creating: {}", config.database.url);
        sqlx::Sqlite::create_database(&config.database.url).await?;
    }

    let pool = plateful::db::create_pool(&config.database.url, 1).await?;

    let mut conn = pool.acquire().await?;
    plateful_db::migrator()?
        .run(&mut conn, &Plan::apply_all())
        .await?;
    drop(conn);

    tracing::info!("Migrations completed successfully");

    Ok(())
}

#[tracing::instrument(skip(config))]
async fn reset_command(config: plateful::config::Config) -> Result<()> {
    tracing::info!("Resetting database...");

    // Drop database if it exists
    if sqlx::Sqlite::database_exists(&config.database.url).await? {
        tracing::warn!("Dropping existing database: {}", config.database.url);
        sqlx::Sqlite::drop_database(&config.database.url).await?;
        tracing::info!("Database dropped successfully");
    } else {
        tracing::info!("Database does not exist, nothing to drop");
    }

    // Run migrate command to recreate and apply migrations
    migrate_command(config).await?;

    tracing::info!("Database reset completed successfully");

    Ok(())
}

#[derive(Debug, Deserialize)]
struct IngredientSeed {
    name: String,
    measurement_unit: String,
}

#[tracing::instrument(skip(config))]
async fn import_ingredients_command(config: plateful::config::Config, file: String) -> Result<()> {
    tracing::info!("Importing ingredients from {}", file);

    let raw = std::fs::read_to_string(&file)?;
    let seeds: Vec<IngredientSeed> = serde_json::from_str(&raw)?;

    let pool = plateful::db::create_pool(&config.database.url, 1).await?;

    let mut imported = 0usize;
    let mut skipped = 0usize;

    for seed in seeds {
        let existing =
            sqlx::query("SELECT id FROM ingredient WHERE name = ?1 AND measurement_unit = ?2")
                .bind(&seed.name)
                .bind(&seed.measurement_unit)
                .fetch_optional(&pool)
                .await?;

        if existing.is_some() {
            skipped += 1;
            continue;
        }

        sqlx::query("INSERT INTO ingredient (id, name, measurement_unit) VALUES (?1, ?2, ?3)")
            .bind(ulid::Ulid::new().to_string())
            .bind(&seed.name)
            .bind(&seed.measurement_unit)
            .execute(&pool)
            .await?;
        imported += 1;
    }

    tracing::info!(imported, skipped, "Ingredient import finished");

    Ok(())
}
