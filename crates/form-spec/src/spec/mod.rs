pub mod field;
pub mod form;
pub mod rule;

pub use field::FieldSpec;
pub use form::{FormSpec, ValidationMode, ValidationPolicy};
pub use rule::{RuleStage, StageClass, ValidationRule, ValueKind};
