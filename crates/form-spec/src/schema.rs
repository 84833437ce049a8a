use std::collections::BTreeSet;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::spec::field::FieldSpec;
use crate::spec::form::{FormSpec, ValidationPolicy};
use crate::spec::rule::{RuleStage, StageClass, ValueKind};

/// Errors raised while compiling a form spec.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("form spec parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("field name must not be empty")]
    EmptyFieldName,
    #[error("duplicate field name '{name}'")]
    DuplicateField { name: String },
    #[error("field '{field}' cannot take raw input of kind '{kind}'")]
    UnsupportedInput { field: String, kind: ValueKind },
    #[error("field '{field}' stage {index} ({stage}) expects {expected} but receives {found}")]
    StageKindMismatch {
        field: String,
        index: usize,
        stage: &'static str,
        expected: String,
        found: ValueKind,
    },
    #[error("field '{field}' declares more than one transform")]
    MultipleTransforms { field: String },
    #[error("field '{field}' transform at stage {index} must be the last stage")]
    TransformNotLast { field: String, index: usize },
    #[error("field '{field}' has invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("field '{field}' default value must be a {expected}")]
    DefaultKindMismatch { field: String, expected: ValueKind },
}

/// Stage ready for execution; patterns are compiled once.
#[derive(Debug, Clone)]
pub(crate) struct CompiledStage {
    pub(crate) stage: RuleStage,
    pub(crate) regex: Option<Regex>,
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledField {
    pub(crate) spec: FieldSpec,
    pub(crate) stages: Vec<CompiledStage>,
}

/// A type-checked form spec.
///
/// Every rule has been walked stage by stage, so the pipeline never meets a stage applied
/// to a kind it cannot handle.
#[derive(Debug, Clone)]
pub struct FormSchema {
    spec: FormSpec,
    fields: Vec<CompiledField>,
}

impl FormSchema {
    pub fn compile(spec: FormSpec) -> Result<Self, SchemaError> {
        let mut seen = BTreeSet::new();
        let mut fields = Vec::with_capacity(spec.fields.len());

        for field in &spec.fields {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyFieldName);
            }
            if !seen.insert(field.name.clone()) {
                return Err(SchemaError::DuplicateField {
                    name: field.name.clone(),
                });
            }
            fields.push(compile_field(field)?);
        }

        debug!(form = %spec.id, fields = fields.len(), "compiled form schema");
        Ok(Self { spec, fields })
    }

    pub fn from_json(raw: &str) -> Result<Self, SchemaError> {
        let spec: FormSpec = serde_json::from_str(raw)?;
        Self::compile(spec)
    }

    pub fn spec(&self) -> &FormSpec {
        &self.spec
    }

    pub fn id(&self) -> &str {
        &self.spec.id
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.spec.policy.unwrap_or_default()
    }

    /// Field specs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().map(|field| &field.spec)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields().find(|field| field.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Raw values the form starts with. Fields without a default are absent.
    pub fn default_values(&self) -> Map<String, Value> {
        self.fields()
            .filter_map(|field| {
                field
                    .default_value
                    .as_ref()
                    .map(|value| (field.name.clone(), value.clone()))
            })
            .collect()
    }

    pub(crate) fn compiled_fields(&self) -> &[CompiledField] {
        &self.fields
    }

    pub(crate) fn compiled_field(&self, name: &str) -> Option<&CompiledField> {
        self.fields.iter().find(|field| field.spec.name == name)
    }
}

impl TryFrom<FormSpec> for FormSchema {
    type Error = SchemaError;

    fn try_from(spec: FormSpec) -> Result<Self, Self::Error> {
        Self::compile(spec)
    }
}

fn compile_field(field: &FieldSpec) -> Result<CompiledField, SchemaError> {
    let rule = &field.rule;
    if rule.input == ValueKind::List {
        return Err(SchemaError::UnsupportedInput {
            field: field.name.clone(),
            kind: rule.input,
        });
    }

    if let Some(default) = &field.default_value
        && !default.is_null()
        && ValueKind::of(default) != Some(rule.input)
    {
        return Err(SchemaError::DefaultKindMismatch {
            field: field.name.clone(),
            expected: rule.input,
        });
    }

    let mut current = rule.input;
    let mut transform_at = None;
    let mut stages = Vec::with_capacity(rule.stages.len());

    for (index, stage) in rule.stages.iter().enumerate() {
        if let Some(at) = transform_at {
            if stage.class() == StageClass::Transform {
                return Err(SchemaError::MultipleTransforms {
                    field: field.name.clone(),
                });
            }
            return Err(SchemaError::TransformNotLast {
                field: field.name.clone(),
                index: at,
            });
        }

        if !stage.accepts().contains(&current) {
            return Err(SchemaError::StageKindMismatch {
                field: field.name.clone(),
                index,
                stage: stage.name(),
                expected: describe_kinds(stage.accepts()),
                found: current,
            });
        }

        if stage.class() == StageClass::Transform {
            transform_at = Some(index);
        }

        let regex = match stage {
            RuleStage::Pattern { pattern, .. } => {
                Some(
                    Regex::new(pattern).map_err(|source| SchemaError::InvalidPattern {
                        field: field.name.clone(),
                        pattern: pattern.clone(),
                        source,
                    })?,
                )
            }
            _ => None,
        };

        current = stage.produces(current);
        stages.push(CompiledStage {
            stage: stage.clone(),
            regex,
        });
    }

    Ok(CompiledField {
        spec: field.clone(),
        stages,
    })
}

fn describe_kinds(kinds: &[ValueKind]) -> String {
    kinds
        .iter()
        .map(ValueKind::as_str)
        .collect::<Vec<_>>()
        .join(" or ")
}
