use form_spec::{FieldError, TransformedValues};
use serde::Serialize;
use serde_json::Value;

/// Per-field view handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSnapshot {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FieldError>,
    pub disabled: bool,
    pub touched: bool,
    pub dirty: bool,
}

/// Everything the rendering layer needs after an event has been applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSnapshot {
    pub form_id: String,
    pub title: String,
    pub disabled: bool,
    pub submit_count: u32,
    pub has_errors: bool,
    pub dirty: bool,
    pub fields: Vec<FieldSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TransformedValues>,
}

impl FormSnapshot {
    pub fn field(&self, name: &str) -> Option<&FieldSnapshot> {
        self.fields.iter().find(|field| field.name == name)
    }
}
