use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::spec::rule::ValidationRule;

/// Definition of a single form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub rule: ValidationRule,
    /// Raw value the field starts with and returns to on reset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// Missing or empty raw values skip the rule and produce no output value.
    #[serde(default)]
    pub optional: bool,
    /// Field-level disabled override; wins over the form-wide flag when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, rule: ValidationRule) -> Self {
        Self {
            name: name.into(),
            label: None,
            rule,
            default_value: None,
            optional: false,
            disabled: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(disabled);
        self
    }
}
