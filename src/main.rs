use anyhow::{Context, Result};
use blobwar::api::{create_router, WsAppState};
use blobwar::config::{load_config, BlobwarConfig};
use blobwar::engine::{spawn_simulation, SimEngine};
use blobwar::world::{Arena, Population, World};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blobwar=info".into()),
        )
        .init();

    info!("Blobwar starting...");

    let config_path = PathBuf::from(
        std::env::var("BLOBWAR_CONFIG").unwrap_or_else(|_| "blobwar.toml".to_string()),
    );
    let mut config = if config_path.exists() {
        info!(path = %config_path.display(), "Loading configuration");
        load_config(&config_path)?
    } else {
        info!(path = %config_path.display(), "No config file, using defaults");
        BlobwarConfig::default()
    };
    config.apply_env();

    let arena = Arena::new(config.world.arena_width, config.world.arena_height)
        .context("Invalid arena in configuration")?;
    let population = Population::new(
        config.world.population,
        config.world.team_count,
        config.world.food_count,
    )
    .context("Invalid world counts in configuration")?;

    let mut world = match config.world.seed {
        Some(seed) => World::with_seed(config.sim, arena, seed),
        None => World::new(config.sim, arena),
    };
    world
        .reinitialize(population)
        .context("Invalid simulation tunables in configuration")?;

    let engine = Arc::new(SimEngine::new(world));
    let _tasks = spawn_simulation(Arc::clone(&engine), config.ticker.period());

    tokio::spawn(listen_for_restart(Arc::clone(&engine)));

    let state = Arc::new(WsAppState {
        engine: Arc::clone(&engine),
    });
    let app = create_router(state, config.server.static_dir.as_deref());

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    info!(addr = %config.server.bind_addr, "Server listening");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Restart the simulation each time Enter is pressed on stdin
async fn listen_for_restart(engine: Arc<SimEngine>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!("Press Enter to restart the simulation");

    loop {
        match lines.next_line().await {
            Ok(Some(_)) => match engine.restart().await {
                Ok(()) => info!("Simulation restarted"),
                Err(e) => error!(error = %e, "Restart failed"),
            },
            Ok(None) => {
                info!("Stdin closed, console restart disabled");
                break;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stdin, console restart disabled");
                break;
            }
        }
    }
}
