pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod services;
pub mod state;

#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
pub use config::Config;
use services::{NewUser, SessionSweeper};
use state::SharedState;

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    if matches!(cli.command, Some(Commands::Init)) {
        if Config::create_default_if_missing()? {
            println!("✓ Config file created. Edit config.toml and run again.");
        } else {
            println!("config.toml already exists; leaving it untouched.");
        }
        return Ok(());
    }

    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        Some(handle)
    } else {
        None
    };

    init_tracing(&config)?;

    if prometheus_handle.is_some() {
        info!("Prometheus metrics recorder initialized");
    }

    match cli.command {
        None | Some(Commands::Serve) => serve(config, prometheus_handle).await,
        Some(Commands::CreateUser {
            username,
            role,
            password,
            email,
            full_name,
        }) => {
            cmd_create_user(
                config,
                NewUser {
                    username,
                    password,
                    role,
                    email,
                    full_name,
                },
            )
            .await
        }
        Some(Commands::SweepSessions) => cmd_sweep_sessions(config).await,
        Some(Commands::Init) => Ok(()),
    }
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let json = config.general.log_format.eq_ignore_ascii_case("json");
    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json());
    let pretty_layer = (!json).then(tracing_subscriber::fmt::layer);

    let (loki_layer, loki_task) = if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "fleetgate")?
            .extra_field("env", "production")?
            .build_url(url)?;

        (Some(layer), Some(task))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .with(loki_layer)
        .init();

    if let Some(task) = loki_task {
        tokio::spawn(task);
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    }

    Ok(())
}

async fn serve(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!(
        "fleetgate v{} starting (auth mode: {:?})",
        env!("CARGO_PKG_VERSION"),
        config.security.auth_mode
    );

    let shared = Arc::new(SharedState::new(config.clone()).await?);
    shared.bootstrap_admin().await?;

    let sweeper = SessionSweeper::start(shared.sessions.clone(), config.sessions.sweep_interval());

    let app = api::router(api::AppState::new(shared, prometheus_handle));
    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Web server running at http://{}", addr);

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    sweeper.stop().await;
    served.context("Web server error")?;

    info!("fleetgate stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

async fn cmd_create_user(config: Config, new_user: NewUser) -> anyhow::Result<()> {
    let shared = SharedState::new(config).await?;
    let user = shared.credentials.create_user(new_user, None).await?;

    println!(
        "✓ Created {} user '{}' (id {})",
        user.role, user.username, user.id
    );
    Ok(())
}

async fn cmd_sweep_sessions(config: Config) -> anyhow::Result<()> {
    let shared = SharedState::new(config).await?;
    let removed = shared.sessions.sweep_expired().await?;

    println!("✓ Removed {removed} expired session(s)");
    Ok(())
}
