//! 应用状态定义

use router_shared::RoutingConfig;
use std::sync::Arc;

use crate::client::MediaServerClient;

/// Axum 应用共享状态
///
/// 路由配置在启动时加载后只读，客户端通过 trait 对象注入，便于测试替换。
#[derive(Clone)]
pub struct AppState {
    pub routing: Arc<RoutingConfig>,
    pub client: Arc<dyn MediaServerClient>,
}

impl AppState {
    pub fn new(routing: RoutingConfig, client: Arc<dyn MediaServerClient>) -> Self {
        Self {
            routing: Arc::new(routing),
            client,
        }
    }
}
