//! 关键词与内容分级匹配器
//!
//! 这两个字段形状固定（记录列表），只比较其中的名称/分级字符串，
//! 避免通用匹配器把 id 等无关字段也当成候选值。

use crate::error::{FilterError, Result};
use crate::matcher::{Leaves, leaf_text};
use crate::models::Condition;
use serde_json::Value;

pub const KEYWORDS_FIELD: &str = "keywords";
pub const CONTENT_RATINGS_FIELD: &str = "contentRatings";

/// 匹配关键词列表 `[{ "name": ... }]`
///
/// 空列表总是不匹配（包括仅含 exclude 的条件）。
pub fn match_keywords(keywords: &Value, condition: &Condition) -> Result<bool> {
    let entries = keywords.as_array().ok_or_else(|| {
        FilterError::malformed_data(KEYWORDS_FIELD, "expected an array of keyword records")
    })?;

    if entries.is_empty() {
        return Ok(false);
    }

    let names = entries
        .iter()
        .map(|entry| {
            entry.get("name").and_then(Value::as_str).ok_or_else(|| {
                FilterError::malformed_data(KEYWORDS_FIELD, "keyword record without a string name")
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Leaves::from_labels(names).satisfies(condition))
}

/// 匹配内容分级 `{ "results": [{ "rating": ... }] }`
///
/// `results` 缺失或为空时总是不匹配。
pub fn match_content_ratings(content_ratings: &Value, condition: &Condition) -> Result<bool> {
    let results = match content_ratings.get("results") {
        None | Some(Value::Null) => return Ok(false),
        Some(Value::Array(results)) => results,
        Some(_) => {
            return Err(FilterError::malformed_data(
                CONTENT_RATINGS_FIELD,
                "results must be an array",
            ));
        }
    };

    let ratings: Vec<String> = results
        .iter()
        .filter_map(|r| r.get("rating"))
        .map(leaf_text)
        .collect();

    if ratings.is_empty() {
        return Ok(false);
    }

    Ok(Leaves::from_labels(ratings).satisfies(condition))
}
