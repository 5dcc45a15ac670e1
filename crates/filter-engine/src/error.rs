//! 过滤引擎错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("媒体数据格式错误: 字段 {field} - {reason}")]
    MalformedData { field: String, reason: String },

    #[error("过滤条件格式错误: 字段 {field} - {reason}")]
    MalformedCondition { field: String, reason: String },

    #[error("过滤规则校验失败:\n{0}")]
    InvalidRuleSet(String),
}

impl FilterError {
    pub(crate) fn malformed_data(field: &str, reason: impl Into<String>) -> Self {
        Self::MalformedData {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_condition(field: &str, reason: impl Into<String>) -> Self {
        Self::MalformedCondition {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedData { .. } => "MALFORMED_DATA",
            Self::MalformedCondition { .. } => "MALFORMED_CONDITION",
            Self::InvalidRuleSet(_) => "INVALID_RULE_SET",
        }
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;
