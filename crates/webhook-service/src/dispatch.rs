//! 请求分发
//!
//! 把命中规则的目标实例配置写回媒体服务器，并按实例设置决定是否审批。
//! 单个实例失败只记录日志，不影响其余实例。

use filter_engine::{MediaKind, NotificationEvent, Target};
use router_shared::observability::metrics;
use router_shared::{InstanceConfig, RoutingConfig};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::client::MediaServerClient;

/// 写回媒体服务器的请求配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostData {
    pub media_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seasons: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_folder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<u64>,
}

impl PostData {
    /// 从通知构造基础数据；剧集附带请求的季（非空时）
    pub fn from_event(event: &NotificationEvent) -> Self {
        let seasons = match event.media_kind() {
            Some(MediaKind::Tv) => event.requested_seasons().filter(|s| !s.is_empty()),
            _ => None,
        };

        Self {
            media_type: event.media.media_type.clone(),
            seasons,
            root_folder: None,
            server_id: None,
            profile_id: None,
        }
    }

    /// 叠加实例配置
    pub fn for_instance(&self, instance: &InstanceConfig) -> Self {
        Self {
            root_folder: Some(instance.root_folder.clone()),
            server_id: Some(instance.server_id),
            profile_id: instance.quality_profile_id,
            ..self.clone()
        }
    }
}

/// 单个实例的分发结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchResult {
    /// 配置已写入并已审批
    Approved,
    /// 配置已写入，实例设置为不审批
    Applied,
    /// 配置已写入但审批失败
    ApproveFailed,
    /// 写入配置失败，未审批
    ApplyFailed,
    /// 实例不在配置中
    UnknownInstance,
}

impl DispatchResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Applied => "applied",
            Self::ApproveFailed => "approve_failed",
            Self::ApplyFailed => "apply_failed",
            Self::UnknownInstance => "unknown_instance",
        }
    }
}

/// 按声明顺序把请求分发到目标实例
pub async fn send_to_instances(
    client: &dyn MediaServerClient,
    config: &RoutingConfig,
    target: &Target,
    request_id: &str,
    data: &PostData,
) -> Vec<(String, DispatchResult)> {
    let mut results = Vec::new();

    for name in target.instances() {
        let result = dispatch_one(client, config, name, request_id, data).await;
        metrics::record_dispatch(name, result.as_str());
        results.push((name.to_string(), result));
    }

    results
}

async fn dispatch_one(
    client: &dyn MediaServerClient,
    config: &RoutingConfig,
    name: &str,
    request_id: &str,
    data: &PostData,
) -> DispatchResult {
    let Some(instance) = config.instance(name) else {
        warn!("Instance \"{}\" not found in config", name);
        return DispatchResult::UnknownInstance;
    };

    let post_data = data.for_instance(instance);
    debug!(instance = %name, post_data = ?post_data, "Sending configuration to instance");

    if let Err(e) = client.apply_config(request_id, &post_data).await {
        warn!(
            "Failed to process request ID {} for instance \"{}\": {}",
            request_id, name, e
        );
        return DispatchResult::ApplyFailed;
    }
    info!("Configuration applied for request ID {} on instance \"{}\"", request_id, name);

    if !instance.approve {
        return DispatchResult::Applied;
    }

    match client.approve_request(request_id).await {
        Ok(()) => {
            info!("Request ID {} approved for instance \"{}\"", request_id, name);
            DispatchResult::Approved
        }
        Err(e) => {
            warn!(
                "Failed to approve request ID {} for instance \"{}\": {}",
                request_id, name, e
            );
            DispatchResult::ApproveFailed
        }
    }
}
