use std::{net::SocketAddr, sync::Arc};

use axum::{body::Body, http::Request, ServiceExt};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yatube_api::{
    build_app,
    config::Config,
    services::{Database, MemoryStore, Repository},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    // 初始化日志
    init_tracing(&config);

    info!("Starting yatube-api service ({})...", config.environment);

    // 初始化存储
    let db: Arc<dyn Repository> = if config.uses_memory_store() {
        info!("Using in-memory store");
        Arc::new(MemoryStore::new())
    } else {
        let db = match Database::new(&config).await {
            Ok(db) => db,
            Err(e) => {
                error!("Failed to create database connection: {}", e);
                return Err(anyhow::anyhow!("Database initialization failed"));
            }
        };
        db.verify_connection().await?;
        db.define_schema().await?;
        info!("Database connection established successfully");
        Arc::new(db)
    };

    // 创建应用状态
    let app_state = Arc::new(AppState::new(config.clone(), db)?);
    if app_state.is_production() && config.uses_memory_store() {
        warn!("Running in production with the in-memory store; data is lost on restart");
    }

    // 载入分组数据
    if let Some(path) = &config.groups_fixture {
        let json = tokio::fs::read_to_string(path).await?;
        let loaded = app_state.group_service.load_fixture(&json).await?;
        info!("Loaded {} groups from {}", loaded, path);
    }

    let app = build_app(app_state);

    // 启动主服务器
    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;
    info!("Starting server on http://{}", addr);

    axum::Server::bind(&addr)
        .serve(ServiceExt::<Request<Body>>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::new(&config.log_level);
    let registry = tracing_subscriber::registry().with(filter);

    if config.log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
