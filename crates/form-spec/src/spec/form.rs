use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::field::FieldSpec;

/// Events that trigger validation of a single field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    #[default]
    OnSubmit,
    OnChange,
    OnBlur,
    All,
}

impl ValidationMode {
    pub fn on_change(&self) -> bool {
        matches!(self, ValidationMode::OnChange | ValidationMode::All)
    }

    pub fn on_blur(&self) -> bool {
        matches!(self, ValidationMode::OnBlur | ValidationMode::All)
    }
}

/// When fields are validated before and after the first submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ValidationPolicy {
    pub mode: ValidationMode,
    pub revalidate_mode: ValidationMode,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            mode: ValidationMode::OnSubmit,
            revalidate_mode: ValidationMode::OnChange,
        }
    }
}

impl ValidationPolicy {
    /// Mode in effect given whether the form has been submitted yet.
    pub fn active_mode(&self, submitted: bool) -> ValidationMode {
        if submitted {
            self.revalidate_mode
        } else {
            self.mode
        }
    }
}

/// Top-level form definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormSpec {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<ValidationPolicy>,
    pub fields: Vec<FieldSpec>,
}

impl FormSpec {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            policy: None,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = Some(policy);
        self
    }
}
