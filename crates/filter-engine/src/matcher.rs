//! 通用值匹配器
//!
//! 把任意嵌套的 JSON 数据展开为小写叶子字符串，再按匹配模式与归一化后的过滤值比较。

use crate::models::{Condition, FilterValues, MatchMode};
use crate::normalizer::normalize;
use serde_json::Value;
use std::collections::HashSet;

/// 数据值展开后的叶子字符串（均已转小写）
#[derive(Debug, Clone, Default)]
pub struct Leaves(Vec<String>);

impl Leaves {
    /// 递归展开：对象取所有成员值，数组取所有元素，其余视为叶子
    pub fn collect(value: &Value) -> Self {
        let mut leaves = Vec::new();
        Self::walk(value, &mut leaves);
        Self(leaves)
    }

    /// 直接使用一组标签作为叶子（关键词名、分级字符串）
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(labels.into_iter().map(|s| s.as_ref().to_lowercase()).collect())
    }

    fn walk(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::Object(map) => map.values().for_each(|v| Self::walk(v, out)),
            Value::Array(items) => items.iter().for_each(|v| Self::walk(v, out)),
            leaf => out.push(leaf_text(leaf)),
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// 按给定模式匹配过滤值
    ///
    /// - `Exact`：每个过滤值都必须等于某个叶子（全称）
    /// - `Substring`：任一叶子包含任一过滤值（存在）
    ///
    /// 过滤值为空集时两种模式都返回 false。
    pub fn matches(&self, filter: &FilterValues, mode: MatchMode) -> bool {
        let wanted = normalize(filter);
        if wanted.is_empty() {
            return false;
        }

        match mode {
            MatchMode::Exact => {
                let observed: HashSet<&str> = self.0.iter().map(String::as_str).collect();
                wanted.iter().all(|w| observed.contains(w.as_str()))
            }
            MatchMode::Substring => self
                .0
                .iter()
                .any(|leaf| wanted.iter().any(|w| leaf.contains(w.as_str()))),
        }
    }

    /// 判断叶子是否满足一个完整条件
    ///
    /// 字面量按 include 语义；修饰符对象中 require 精确全量、include 子串任意、
    /// exclude 命中任意子串即失败，各修饰符之间为 AND。
    pub fn satisfies(&self, condition: &Condition) -> bool {
        match condition {
            Condition::Literal(values) => self.matches(values, MatchMode::Substring),
            Condition::Modifiers(modifiers) => {
                if let Some(required) = &modifiers.require {
                    if !self.matches(required, MatchMode::Exact) {
                        return false;
                    }
                }

                if let Some(included) = &modifiers.include {
                    if !self.matches(included, MatchMode::Substring) {
                        return false;
                    }
                }

                if let Some(excluded) = &modifiers.exclude {
                    if self.matches(excluded, MatchMode::Substring) {
                        return false;
                    }
                }

                true
            }
        }
    }
}

/// 叶子值的文本形式：字符串取原文，其余标量取 JSON 表示，统一小写
///
/// 浮点数按最短形式输出，整值浮点不带小数部分（`8.0` -> `"8"`）。
pub(crate) fn leaf_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_lowercase(),
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) => f.to_string(),
            None => n.to_string(),
        },
        other => other.to_string().to_lowercase(),
    }
}

/// 用过滤值匹配任意数据值
pub fn match_value(filter: &FilterValues, data: &Value, mode: MatchMode) -> bool {
    Leaves::collect(data).matches(filter, mode)
}

/// 用完整条件（字面量或修饰符对象）匹配任意数据值
pub fn match_condition(condition: &Condition, data: &Value) -> bool {
    Leaves::collect(data).satisfies(condition)
}
