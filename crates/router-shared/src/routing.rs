//! 路由配置
//!
//! 从 YAML 文件加载媒体服务器连接信息、目标实例表和有序的过滤规则。
//! 加载时完成全部结构校验，运行期不再检查配置形状。

use filter_engine::{FilterError, Rule, RuleSetValidator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, enabled, warn, Level};

use crate::error::{Result, RouterError};

const REDACTED: &str = "REDACTED";

/// 目标实例配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceConfig {
    pub server_id: u64,
    pub root_folder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_profile_id: Option<u64>,
    /// 写入配置后是否同时审批请求
    #[serde(default = "default_approve")]
    pub approve: bool,
}

fn default_approve() -> bool {
    true
}

/// 路由配置文件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub overseerr_url: String,
    pub overseerr_api_token: String,
    /// 没有规则命中时是否直接审批
    #[serde(default)]
    pub approve_on_no_match: bool,
    pub instances: BTreeMap<String, InstanceConfig>,
    pub filters: Vec<Rule>,
}

impl RoutingConfig {
    /// 从文件加载并校验
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(RouterError::RoutingFileNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path).map_err(|source| RouterError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config = Self::from_yaml_str(&contents)?;

        if enabled!(Level::DEBUG) {
            debug!("Debug mode enabled");
            debug!("Loaded config:\n{}", config.redacted_json());
        }

        Ok(config)
    }

    /// 解析 YAML 文本并校验
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;

        for (index, instance) in config.unknown_instances() {
            warn!(
                filter = index,
                instance = %instance,
                "Filter at index {} applies unknown instance \"{}\"", index, instance
            );
        }

        Ok(config)
    }

    /// 结构校验，一次性报告所有问题
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.overseerr_url.trim().is_empty() {
            errors.push(format_error("overseerr_url", "must not be empty"));
        } else {
            match url::Url::parse(&self.overseerr_url) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                Ok(url) => errors.push(format_error(
                    "overseerr_url",
                    &format!("unsupported scheme '{}'", url.scheme()),
                )),
                Err(e) => errors.push(format_error(
                    "overseerr_url",
                    &format!("must be a valid URL ({})", e),
                )),
            }
        }

        if self.overseerr_api_token.trim().is_empty() {
            errors.push(format_error("overseerr_api_token", "must not be empty"));
        }

        for (name, instance) in &self.instances {
            if instance.root_folder.trim().is_empty() {
                errors.push(format_error(
                    &format!("instances.{}.root_folder", name),
                    "must not be empty",
                ));
            }
        }

        match RuleSetValidator::validate(&self.filters) {
            Ok(()) => {}
            Err(FilterError::InvalidRuleSet(message)) => errors.push(message),
            Err(e) => errors.push(e.to_string()),
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RouterError::InvalidRoutingConfig(errors.join("\n")))
        }
    }

    /// 规则引用了但实例表中不存在的实例：(规则下标, 实例名)
    pub fn unknown_instances(&self) -> Vec<(usize, &str)> {
        let known = &self.instances;

        self.filters
            .iter()
            .enumerate()
            .flat_map(|(index, rule)| {
                rule.apply
                    .instances()
                    .into_iter()
                    .filter(move |name| !known.contains_key(*name))
                    .map(move |name| (index, name))
            })
            .collect()
    }

    pub fn instance(&self, name: &str) -> Option<&InstanceConfig> {
        self.instances.get(name)
    }

    /// 隐去 API token 后的 JSON 表示，用于日志
    pub fn redacted_json(&self) -> String {
        let mut value = match serde_json::to_value(self) {
            Ok(value) => value,
            Err(e) => return format!("<unserializable config: {}>", e),
        };

        if let Some(token) = value.get_mut("overseerr_api_token") {
            *token = serde_json::Value::String(REDACTED.to_string());
        }

        serde_json::to_string_pretty(&value).unwrap_or_default()
    }
}

fn format_error(path: &str, message: &str) -> String {
    format!("Error at \"{}\": {}", path, message)
}
