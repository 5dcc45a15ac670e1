//! 过滤值归一化

use crate::models::FilterValues;
use std::collections::HashSet;

/// 将标量或列表形式的过滤值统一为小写字符串集合
///
/// 空输入得到空集合，空集合在任何匹配模式下都视为不匹配。
pub fn normalize(values: &FilterValues) -> HashSet<String> {
    values.as_slice().iter().map(|v| v.to_lowercase()).collect()
}
