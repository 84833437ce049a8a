use thiserror::Error;

pub mod controller;
pub mod driver;
pub mod snapshot;

pub use controller::{FieldHandle, FormController, FormEvent, FormState, SubmitOutcome};
pub use driver::{FormDriver, FormRunConfig, SubmitResponse};
pub use snapshot::{FieldSnapshot, FormSnapshot};

pub use form_spec;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid form spec: {0}")]
    Schema(#[from] form_spec::SchemaError),
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("invalid values: {0}")]
    InvalidValues(String),
}
