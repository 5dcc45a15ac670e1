//! 过滤规则解析器
//!
//! 按声明顺序逐条评估规则，首个完全满足的规则即为结果，之后不再评估。
//! 单条规则的评估顺序：
//! 1. 媒体类型门控
//! 2. 4K 变体门控（对应的待审批状态必须为 PENDING）
//! 3. 无条件规则直接命中
//! 4. 优先字段：keywords、contentRatings、max_seasons（开销小，先短路）
//! 5. 其余字段：先查媒体数据，缺失时回退到请求元数据，两处都没有则规则失败
//!
//! 字段顺序只影响性能，不影响结果：规则命中等价于所有门控与字段条件的合取。

use crate::error::{FilterError, Result};
use crate::labels::{CONTENT_RATINGS_FIELD, KEYWORDS_FIELD, match_content_ratings, match_keywords};
use crate::matcher::match_condition;
use crate::models::{Condition, NotificationEvent, Rule, Target, VariantFlag};
use serde_json::Value;
use tracing::{debug, error, info};

pub const MAX_SEASONS_FIELD: &str = "max_seasons";

const PRIORITY_FIELDS: [&str; 3] = [KEYWORDS_FIELD, CONTENT_RATINGS_FIELD, MAX_SEASONS_FIELD];

/// 命中的规则
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    /// 规则在列表中的下标
    pub index: usize,
    pub target: Target,
}

/// 解析结果
///
/// 外部调用方通常只关心 [`MatchOutcome::into_target`]：`NoMatch` 与 `Fault` 都映射为 None，
/// 但两者在这里可区分，便于记录日志和指标。
#[derive(Debug)]
pub enum MatchOutcome {
    Matched(RuleMatch),
    NoMatch,
    /// 评估过程中遇到格式错误的数据或条件，整个解析按未命中处理
    Fault(FilterError),
}

impl MatchOutcome {
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    pub fn target(&self) -> Option<&Target> {
        match self {
            Self::Matched(m) => Some(&m.target),
            _ => None,
        }
    }

    pub fn into_target(self) -> Option<Target> {
        match self {
            Self::Matched(m) => Some(m.target),
            _ => None,
        }
    }

    /// 结果标签（用于指标）
    pub fn label(&self) -> &'static str {
        match self {
            Self::Matched(_) => "matched",
            Self::NoMatch => "no_match",
            Self::Fault(_) => "fault",
        }
    }
}

/// 过滤规则解析器
pub struct FilterResolver;

impl FilterResolver {
    /// 找到第一条命中的规则并返回其目标
    ///
    /// 永不向外抛错：评估错误被捕获并记录，结果为 [`MatchOutcome::Fault`]。
    pub fn resolve(event: &NotificationEvent, record: &Value, rules: &[Rule]) -> MatchOutcome {
        for (index, rule) in rules.iter().enumerate() {
            match Self::rule_matches(rule, event, record) {
                Ok(true) => {
                    info!(index, target = %rule.apply, "Found matching filter at index {}", index);
                    return MatchOutcome::Matched(RuleMatch {
                        index,
                        target: rule.apply.clone(),
                    });
                }
                Ok(false) => continue,
                Err(e) => {
                    error!(index, error = %e, "Error finding matching filter");
                    return MatchOutcome::Fault(e);
                }
            }
        }

        info!("No matching filter found for the current webhook");
        MatchOutcome::NoMatch
    }

    /// 评估单条规则
    pub fn rule_matches(rule: &Rule, event: &NotificationEvent, record: &Value) -> Result<bool> {
        if !Self::passes_gates(rule, event) {
            return Ok(false);
        }

        if rule.conditions.is_empty() {
            return Ok(true);
        }

        if let Some(condition) = rule.conditions.get(KEYWORDS_FIELD) {
            let Some(keywords) = Self::present(record.get(KEYWORDS_FIELD)) else {
                debug!(field = KEYWORDS_FIELD, "Filter check failed - field not found in metadata");
                return Ok(false);
            };
            if !match_keywords(keywords, condition)? {
                debug!(field = KEYWORDS_FIELD, filter = %condition, "Filter check failed");
                return Ok(false);
            }
            debug!(field = KEYWORDS_FIELD, filter = %condition, "Filter check passed");
        }

        if let Some(condition) = rule.conditions.get(CONTENT_RATINGS_FIELD) {
            let Some(ratings) = Self::present(record.get(CONTENT_RATINGS_FIELD)) else {
                debug!(
                    field = CONTENT_RATINGS_FIELD,
                    "Filter check failed - field not found in metadata"
                );
                return Ok(false);
            };
            if !match_content_ratings(ratings, condition)? {
                debug!(field = CONTENT_RATINGS_FIELD, filter = %condition, "Filter check failed");
                return Ok(false);
            }
            debug!(field = CONTENT_RATINGS_FIELD, filter = %condition, "Filter check passed");
        }

        if let Some(condition) = rule.conditions.get(MAX_SEASONS_FIELD) {
            if !Self::within_season_limit(condition, event)? {
                debug!(field = MAX_SEASONS_FIELD, filter = %condition, "Filter check failed");
                return Ok(false);
            }
        }

        for (field, condition) in &rule.conditions {
            if PRIORITY_FIELDS.contains(&field.as_str()) {
                continue;
            }

            let Some(value) = Self::lookup(field, event, record) else {
                debug!(field = %field, "Filter check skipped - field not found in webhook or data");
                return Ok(false);
            };

            let passed = match_condition(condition, value);
            debug!(
                field = %field,
                filter = %condition,
                request_value = %value,
                passed,
                "Filter check"
            );
            if !passed {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn passes_gates(rule: &Rule, event: &NotificationEvent) -> bool {
        if event.media_kind() != Some(rule.media_type) {
            return false;
        }

        match rule.variant {
            Some(VariantFlag::IsNot4k) => event.media.is_pending(),
            Some(VariantFlag::Is4k) => event.media.is_4k_pending(),
            None => true,
        }
    }

    /// 请求季数超过阈值时失败；通知里没有季数信息时视为通过
    fn within_season_limit(condition: &Condition, event: &NotificationEvent) -> Result<bool> {
        let limit = Self::season_limit(condition)?;

        Ok(match event.requested_seasons() {
            Some(seasons) => seasons.len() <= limit,
            None => true,
        })
    }

    pub(crate) fn season_limit(condition: &Condition) -> Result<usize> {
        let Condition::Literal(values) = condition else {
            return Err(FilterError::malformed_condition(
                MAX_SEASONS_FIELD,
                "expected a single integer",
            ));
        };

        match values.as_slice() {
            [single] => single.trim().parse().map_err(|_| {
                FilterError::malformed_condition(
                    MAX_SEASONS_FIELD,
                    format!("'{}' is not a non-negative integer", single),
                )
            }),
            _ => Err(FilterError::malformed_condition(
                MAX_SEASONS_FIELD,
                "expected a single integer",
            )),
        }
    }

    /// 先查媒体数据，再回退到请求元数据；null 视同缺失
    fn lookup<'a>(field: &str, event: &'a NotificationEvent, record: &'a Value) -> Option<&'a Value> {
        Self::present(record.get(field)).or_else(|| Self::present(event.request.get(field)))
    }

    fn present(value: Option<&Value>) -> Option<&Value> {
        value.filter(|v| !v.is_null())
    }
}
