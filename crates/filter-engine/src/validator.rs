//! 规则集校验器
//!
//! 在加载时检查规则集的结构，运行期的解析器因此可以假设条件形状合法。
//! 所有问题一次性收集，每条形如 `Error at "<path>": <message>`。

use crate::error::{FilterError, Result};
use crate::models::{Condition, FilterValues, Rule, Target};
use crate::resolver::{FilterResolver, MAX_SEASONS_FIELD};

/// 规则集校验器
pub struct RuleSetValidator;

impl RuleSetValidator {
    /// 校验完整的规则列表
    pub fn validate(rules: &[Rule]) -> Result<()> {
        let mut errors = Vec::new();

        for (i, rule) in rules.iter().enumerate() {
            Self::validate_rule(rule, &format!("filters[{}]", i), &mut errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(FilterError::InvalidRuleSet(errors.join("\n")))
        }
    }

    fn validate_rule(rule: &Rule, path: &str, errors: &mut Vec<String>) {
        match &rule.apply {
            Target::One(name) if name.trim().is_empty() => {
                errors.push(Self::format_error(&format!("{}.apply", path), "must not be empty"));
            }
            Target::Many(names) if names.is_empty() => {
                errors.push(Self::format_error(
                    &format!("{}.apply", path),
                    "must contain at least one instance",
                ));
            }
            Target::Many(names) => {
                for (i, name) in names.iter().enumerate() {
                    if name.trim().is_empty() {
                        errors.push(Self::format_error(
                            &format!("{}.apply[{}]", path, i),
                            "must not be empty",
                        ));
                    }
                }
            }
            Target::One(_) => {}
        }

        for (field, condition) in &rule.conditions {
            let field_path = format!("{}.conditions.{}", path, field);

            if field.is_empty() {
                errors.push(Self::format_error(&field_path, "field name must not be empty"));
                continue;
            }

            if field == MAX_SEASONS_FIELD {
                if let Err(e) = FilterResolver::season_limit(condition) {
                    errors.push(Self::format_error(&field_path, &e.to_string()));
                }
                continue;
            }

            Self::validate_condition(condition, &field_path, errors);
        }
    }

    fn validate_condition(condition: &Condition, path: &str, errors: &mut Vec<String>) {
        match condition {
            Condition::Literal(values) => Self::validate_values(values, path, errors),
            Condition::Modifiers(modifiers) => {
                if modifiers.is_empty() {
                    errors.push(Self::format_error(
                        path,
                        "must contain at least one of require, include, exclude",
                    ));
                }

                let named = [
                    ("require", &modifiers.require),
                    ("include", &modifiers.include),
                    ("exclude", &modifiers.exclude),
                ];
                for (name, values) in named {
                    if let Some(values) = values {
                        Self::validate_values(values, &format!("{}.{}", path, name), errors);
                    }
                }
            }
        }
    }

    fn validate_values(values: &FilterValues, path: &str, errors: &mut Vec<String>) {
        if values.is_empty() {
            errors.push(Self::format_error(path, "must not be an empty list"));
        }
    }

    fn format_error(path: &str, message: &str) -> String {
        format!("Error at \"{}\": {}", path, message)
    }
}
