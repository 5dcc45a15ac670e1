//! Webhook 处理器
//!
//! 处理流程：
//! 1. 测试通知直接返回
//! 2. 音乐请求直接审批
//! 3. 拉取媒体元数据并用过滤规则解析目标实例
//! 4. 命中则分发；未命中按配置审批或不处理

use axum::{Json, body::Bytes, extract::State};
use filter_engine::{FilterResolver, NotificationEvent};
use router_shared::observability::metrics;
use serde_json::Value;
use tracing::{Level, debug, enabled, info, warn};

use super::ApiMessage;
use crate::dispatch::{PostData, send_to_instances};
use crate::error::{Result, WebhookError};
use crate::state::AppState;

pub const TEST_NOTIFICATION: &str = "TEST_NOTIFICATION";
const MUSIC_MEDIA_TYPE: &str = "music";

/// 调试日志中省略的大体积元数据字段
const VERBOSE_METADATA_FIELDS: [&str; 4] = ["credits", "relatedVideos", "networks", "watchProviders"];

pub const MSG_TEST_RECEIVED: &str = "Test notification received";
pub const MSG_MUSIC_APPROVED: &str = "Music request approved";
pub const MSG_SENT_TO_INSTANCES: &str = "Request processed and sent to instances";
pub const MSG_APPROVED_NO_MATCH: &str = "Request approved (no matching filter)";
pub const MSG_NO_ACTION: &str = "Request processed (no action taken)";

/// POST /webhook
pub async fn receive_webhook(State(state): State<AppState>, body: Bytes) -> Result<Json<ApiMessage>> {
    let payload: Value = serde_json::from_slice(&body)?;

    if !is_object(&payload, "media") || !is_object(&payload, "request") {
        return Err(WebhookError::InvalidStructure);
    }

    if enabled!(Level::DEBUG) {
        debug!("Received webhook event:\n{}", pretty(&payload));
    }

    if payload.get("notification_type").and_then(Value::as_str) == Some(TEST_NOTIFICATION) {
        return Ok(Json(ApiMessage::success(MSG_TEST_RECEIVED)));
    }

    let event: NotificationEvent = serde_json::from_value(payload)?;
    let message = handle_event(&state, &event).await?;

    Ok(Json(ApiMessage::success(message)))
}

async fn handle_event(state: &AppState, event: &NotificationEvent) -> Result<&'static str> {
    let media_type = event.media.media_type.as_str();
    metrics::record_webhook_received(media_type);

    let request_id = event.request_id().ok_or(WebhookError::MissingRequestId)?;

    if media_type == MUSIC_MEDIA_TYPE {
        approve(state, &request_id).await;
        return Ok(MSG_MUSIC_APPROVED);
    }

    let record = state.client.fetch_media(media_type, &event.media.tmdb_id).await?;

    info!(
        "Received request ID {} for {} \"{}\"",
        request_id,
        media_type,
        display_title(&record)
    );

    if enabled!(Level::DEBUG) {
        debug!(
            "Request details:\nwebhook: {}\nmetadata: {}",
            pretty(&serde_json::to_value(event)?),
            pretty(&without_verbose_fields(&record))
        );
    }

    let outcome = FilterResolver::resolve(event, &record, &state.routing.filters);
    metrics::record_filter_resolution(outcome.label());

    match outcome.into_target() {
        Some(target) => {
            let data = PostData::from_event(event);
            send_to_instances(state.client.as_ref(), &state.routing, &target, &request_id, &data).await;
            Ok(MSG_SENT_TO_INSTANCES)
        }
        None if state.routing.approve_on_no_match => {
            info!("Approving unmatched request ID {}", request_id);
            approve(state, &request_id).await;
            Ok(MSG_APPROVED_NO_MATCH)
        }
        None => Ok(MSG_NO_ACTION),
    }
}

/// 审批失败只记录日志，不改变响应
async fn approve(state: &AppState, request_id: &str) {
    match state.client.approve_request(request_id).await {
        Ok(()) => info!("Request ID {} approved successfully", request_id),
        Err(e) => warn!("Error approving request: {}", e),
    }
}

fn is_object(payload: &Value, key: &str) -> bool {
    payload.get(key).is_some_and(Value::is_object)
}

fn display_title(record: &Value) -> &str {
    ["originalTitle", "originalName"]
        .iter()
        .filter_map(|key| record.get(*key).and_then(Value::as_str))
        .find(|title| !title.is_empty())
        .unwrap_or("undefined")
}

fn without_verbose_fields(record: &Value) -> Value {
    match record {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !VERBOSE_METADATA_FIELDS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}
