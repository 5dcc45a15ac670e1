//! 媒体请求路由服务入口

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use router_shared::{AppConfig, RoutingConfig, observability};
use tokio::net::TcpListener;
use tracing::{error, info};
use webhook_service::{AppState, MediaServerClient, OverseerrClient, create_router};

const SERVICE_NAME: &str = "request-router";

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "request-router")]
#[command(version, about = "按过滤规则把媒体请求路由到目标实例")]
struct Cli {
    /// 路由配置文件路径（覆盖服务配置中的 routing_config_path）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别（覆盖服务配置）
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(SERVICE_NAME).with_routing_config_path(cli.config);
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }

    let _guard = observability::init(&config.observability).await?;

    let routing = match RoutingConfig::load(&config.routing_config_path) {
        Ok(routing) => routing,
        Err(e) => {
            error!("Error loading config: {}", e);
            return Err(e.into());
        }
    };
    info!(
        path = %config.routing_config_path.display(),
        filters = routing.filters.len(),
        instances = routing.instances.len(),
        "Routing config loaded"
    );

    let client = OverseerrClient::new(&routing.overseerr_url, routing.overseerr_api_token.clone())?;

    match client.test_connection().await {
        Ok(_) => info!("Successfully connected to Overseerr API"),
        Err(e) => error!("Could not reach Overseerr: {}", e),
    }

    let app = create_router(AppState::new(routing, Arc::new(client)));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Request router listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号
///
/// 收到 SIGTERM 或 Ctrl+C 后返回，触发 axum 的优雅关闭流程。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("注册 Ctrl+C 处理器失败: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("注册 SIGTERM 处理器失败: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
