#![allow(missing_docs)]

pub mod disabled;
pub mod examples;
pub mod schema;
pub mod spec;
pub mod validate;
pub mod values;
pub mod values_schema;

pub use disabled::{DisabledMap, effective, resolve_disabled};
pub use examples::generate as example_values;
pub use schema::{FormSchema, SchemaError};
pub use spec::{
    FieldSpec, FormSpec, RuleStage, StageClass, ValidationMode, ValidationPolicy, ValidationRule,
    ValueKind,
};
pub use validate::{validate_and_transform, validate_field, validate_values};
pub use values::{ErrorKind, FieldError, FieldErrors, RawValues, TransformedValues};
pub use values_schema::{input_schema, output_schema};
