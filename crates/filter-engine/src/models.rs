//! 过滤引擎领域模型
//!
//! 规则在加载时一次性解析为封闭的类型（条件是字面量还是修饰符对象，
//! 目标是单个实例还是实例列表），求值阶段不再重新检查原始形状。

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// 通知中表示“等待审批”的状态值
pub const PENDING_STATUS: &str = "PENDING";

/// 通知 extra 列表中携带请求季数的条目名
pub const REQUESTED_SEASONS: &str = "Requested Seasons";

/// 规则适用的媒体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 4K 变体门控
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantFlag {
    /// 仅当 4K 版本处于待审批状态时适用
    Is4k,
    /// 仅当普通版本处于待审批状态时适用
    IsNot4k,
}

/// 匹配模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// 精确匹配：每个过滤值都必须等于某个数据叶子值
    Exact,
    /// 子串匹配：任意叶子值包含任意过滤值即可
    Substring,
}

// ============================================================================
// 过滤值与条件
// ============================================================================

/// 过滤值（单个标量或标量列表）
///
/// 配置文件中的数字与布尔值会被转成字符串，例如 `max_seasons: 3`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OneOrMany")]
pub struct FilterValues(Vec<String>);

impl FilterValues {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(values.into_iter().map(Into::into).collect())
    }

    pub fn one(value: impl Into<String>) -> Self {
        Self(vec![value.into()])
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FilterValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(ScalarText),
    Many(Vec<ScalarText>),
}

impl From<OneOrMany> for FilterValues {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(v) => Self(vec![v.into_string()]),
            OneOrMany::Many(vs) => Self(vs.into_iter().map(ScalarText::into_string).collect()),
        }
    }
}

/// 可被当作文本的标量
#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarText {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

impl ScalarText {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Flag(b) => b.to_string(),
        }
    }
}

/// 修饰符对象：所有出现的修饰符之间为 AND 关系
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Modifiers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require: Option<FilterValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<FilterValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<FilterValues>,
}

impl Modifiers {
    pub fn with_require(mut self, values: FilterValues) -> Self {
        self.require = Some(values);
        self
    }

    pub fn with_include(mut self, values: FilterValues) -> Self {
        self.include = Some(values);
        self
    }

    pub fn with_exclude(mut self, values: FilterValues) -> Self {
        self.exclude = Some(values);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.require.is_none() && self.include.is_none() && self.exclude.is_none()
    }
}

/// 单个字段的过滤条件
///
/// 字面量必须排在前面：派生的结构体反序列化也接受序列，
/// 列表若先尝试 `Modifiers` 会被按位置误解析。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    /// 字符串或字符串列表，按 include（子串）语义匹配
    Literal(FilterValues),
    /// `{ require?, include?, exclude? }`
    Modifiers(Modifiers),
}

impl Condition {
    pub fn literal(values: FilterValues) -> Self {
        Self::Literal(values)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(values) => write!(f, "{}", values),
            Self::Modifiers(m) => {
                let mut parts = Vec::new();
                if let Some(v) = &m.require {
                    parts.push(format!("require: [{}]", v));
                }
                if let Some(v) = &m.include {
                    parts.push(format!("include: [{}]", v));
                }
                if let Some(v) = &m.exclude {
                    parts.push(format!("exclude: [{}]", v));
                }
                f.write_str(&parts.join(", "))
            }
        }
    }
}

/// 规则命中后的目标实例（配置中的 `apply`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Target {
    One(String),
    Many(Vec<String>),
}

impl Target {
    /// 按声明顺序返回实例名
    pub fn instances(&self) -> Vec<&str> {
        match self {
            Self::One(name) => vec![name.as_str()],
            Self::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.instances().join(", "))
    }
}

// ============================================================================
// 规则
// ============================================================================

/// 过滤规则
///
/// 配置文件中的 4K 门控写作布尔值 `is_4k` / `is_not_4k`，加载时折叠为 [`VariantFlag`]。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRule", into = "RawRule")]
pub struct Rule {
    pub media_type: MediaKind,
    pub variant: Option<VariantFlag>,
    pub conditions: BTreeMap<String, Condition>,
    pub apply: Target,
}

impl Rule {
    pub fn new(media_type: MediaKind, apply: Target) -> Self {
        Self {
            media_type,
            variant: None,
            conditions: BTreeMap::new(),
            apply,
        }
    }

    pub fn with_variant(mut self, variant: VariantFlag) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn with_condition(mut self, field: impl Into<String>, condition: Condition) -> Self {
        self.conditions.insert(field.into(), condition);
        self
    }
}

#[derive(Serialize, Deserialize)]
struct RawRule {
    media_type: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_4k: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_not_4k: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    conditions: Option<BTreeMap<String, Condition>>,
    apply: Target,
}

impl TryFrom<RawRule> for Rule {
    type Error = String;

    fn try_from(raw: RawRule) -> std::result::Result<Self, Self::Error> {
        let variant = match (raw.is_4k, raw.is_not_4k) {
            (Some(true), Some(true)) => {
                return Err("is_4k and is_not_4k cannot both be true".to_string());
            }
            (Some(true), _) => Some(VariantFlag::Is4k),
            (Some(false), _) | (_, Some(true)) => Some(VariantFlag::IsNot4k),
            _ => None,
        };

        Ok(Self {
            media_type: raw.media_type,
            variant,
            conditions: raw.conditions.unwrap_or_default(),
            apply: raw.apply,
        })
    }
}

impl From<Rule> for RawRule {
    fn from(rule: Rule) -> Self {
        let (is_4k, is_not_4k) = match rule.variant {
            Some(VariantFlag::Is4k) => (Some(true), None),
            Some(VariantFlag::IsNot4k) => (None, Some(true)),
            None => (None, None),
        };

        Self {
            media_type: rule.media_type,
            is_4k,
            is_not_4k,
            conditions: (!rule.conditions.is_empty()).then_some(rule.conditions),
            apply: rule.apply,
        }
    }
}

// ============================================================================
// 通知事件
// ============================================================================

/// 入站通知（webhook 负载）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    #[serde(default)]
    pub notification_type: String,
    pub media: MediaInfo,
    /// 请求元数据，字段在媒体数据中缺失时作为回退来源
    #[serde(default, deserialize_with = "null_as_default")]
    pub request: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub extra: Vec<ExtraEntry>,
}

impl NotificationEvent {
    /// 通知中的媒体类型；`music` 等规则无法表达的类型返回 None
    pub fn media_kind(&self) -> Option<MediaKind> {
        match self.media.media_type.as_str() {
            "movie" => Some(MediaKind::Movie),
            "tv" => Some(MediaKind::Tv),
            _ => None,
        }
    }

    /// 请求 ID（字符串或数字）
    pub fn request_id(&self) -> Option<String> {
        match self.request.get("request_id")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// 解析 extra 中的 "Requested Seasons"（逗号分隔的整数列表）
    ///
    /// 不存在该条目时返回 None；无法解析为整数的项被丢弃。
    pub fn requested_seasons(&self) -> Option<Vec<u32>> {
        let entry = self.extra.iter().find(|e| e.name == REQUESTED_SEASONS)?;

        Some(
            entry
                .value
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect(),
        )
    }
}

/// 通知中的媒体信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaInfo {
    pub media_type: String,
    #[serde(rename = "tmdbId", default, deserialize_with = "scalar_as_string")]
    pub tmdb_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "status4k", default)]
    pub status_4k: String,
}

impl MediaInfo {
    pub fn is_pending(&self) -> bool {
        self.status == PENDING_STATUS
    }

    pub fn is_4k_pending(&self) -> bool {
        self.status_4k == PENDING_STATUS
    }
}

/// extra 列表中的一项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraEntry {
    pub name: String,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub value: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn scalar_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<ScalarText>::deserialize(deserializer)?
        .map(ScalarText::into_string)
        .unwrap_or_default())
}
