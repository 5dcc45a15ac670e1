//! 请求路由过滤引擎
//!
//! 根据有序的声明式过滤规则，为一次媒体请求通知挑选目标实例：
//! - 过滤值归一化（标量或列表 -> 小写字符串集合）
//! - 通用嵌套值匹配（require 精确全量匹配 / include 子串任意匹配）
//! - 关键词与内容分级的专用匹配（require/include/exclude 组合）
//! - 按声明顺序求值，首个完全满足的规则胜出
//!
//! 引擎不做任何 I/O，所有输入均为只读，可在多个请求间并发调用。

pub mod error;
pub mod labels;
pub mod matcher;
pub mod models;
pub mod normalizer;
pub mod resolver;
pub mod validator;

pub use error::{FilterError, Result};
pub use labels::{match_content_ratings, match_keywords};
pub use matcher::{match_condition, match_value};
pub use models::{
    Condition, ExtraEntry, FilterValues, MatchMode, MediaInfo, MediaKind, Modifiers,
    NotificationEvent, Rule, Target, VariantFlag,
};
pub use normalizer::normalize;
pub use resolver::{FilterResolver, MatchOutcome, RuleMatch};
pub use validator::RuleSetValidator;
