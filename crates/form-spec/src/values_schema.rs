use serde_json::{Map, Value};

use crate::schema::FormSchema;
use crate::spec::field::FieldSpec;
use crate::spec::rule::{RuleStage, StageClass, ValueKind};

/// JSON schema describing the raw values a form accepts.
///
/// String constraints are only reported while they still apply to the raw text, that is
/// before the first coercion or transform.
pub fn input_schema(schema: &FormSchema) -> Value {
    object_schema(schema, |field| {
        let mut out = Map::new();
        out.insert("type".into(), kind_type(field.rule.input));
        for stage in &field.rule.stages {
            if stage.class() != StageClass::Predicate {
                break;
            }
            constrain(&mut out, stage);
        }
        if let Some(default) = &field.default_value {
            out.insert("default".into(), default.clone());
        }
        if let Some(disabled) = field.disabled {
            out.insert("readOnly".into(), Value::Bool(disabled));
        }
        out
    })
}

/// JSON schema describing the transformed values produced on a successful submit.
pub fn output_schema(schema: &FormSchema) -> Value {
    object_schema(schema, output_field_schema)
}

fn object_schema(
    schema: &FormSchema,
    field_schema: impl Fn(&FieldSpec) -> Map<String, Value>,
) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in schema.fields() {
        let mut property = field_schema(field);
        if let Some(label) = &field.label {
            property.insert("title".into(), Value::String(label.clone()));
        }
        properties.insert(field.name.clone(), Value::Object(property));
        if !field.optional {
            required.push(Value::String(field.name.clone()));
        }
    }

    let mut root = Map::new();
    root.insert("type".into(), Value::String("object".into()));
    if !schema.spec().title.is_empty() {
        root.insert("title".into(), Value::String(schema.spec().title.clone()));
    }
    root.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        root.insert("required".into(), Value::Array(required));
    }
    Value::Object(root)
}

fn output_field_schema(field: &FieldSpec) -> Map<String, Value> {
    let rule = &field.rule;
    let mut out = Map::new();
    let mut kind = rule.input;
    let mut integer = false;

    for stage in &rule.stages {
        if stage.class() != StageClass::Predicate {
            // constraints seen so far described the previous kind
            out.clear();
            integer = false;
        }
        match stage {
            RuleStage::ToInteger | RuleStage::Integer { .. } => integer = true,
            RuleStage::MapBool {
                when_true,
                when_false,
            } => {
                out.insert(
                    "enum".into(),
                    Value::Array(vec![
                        Value::String(when_true.clone()),
                        Value::String(when_false.clone()),
                    ]),
                );
            }
            RuleStage::Split { .. } => {
                let mut items = Map::new();
                items.insert("type".into(), Value::String("string".into()));
                out.insert("items".into(), Value::Object(items));
            }
            _ => constrain(&mut out, stage),
        }
        kind = stage.produces(kind);
    }

    let type_name = if integer && kind == ValueKind::Number {
        Value::String("integer".into())
    } else {
        kind_type(kind)
    };
    out.insert("type".into(), type_name);
    out
}

fn constrain(out: &mut Map<String, Value>, stage: &RuleStage) {
    match stage {
        RuleStage::MinLen { len, .. } => {
            out.insert("minLength".into(), Value::Number((*len).into()));
        }
        RuleStage::MaxLen { len, .. } => {
            out.insert("maxLength".into(), Value::Number((*len).into()));
        }
        RuleStage::Pattern { pattern, .. } => {
            out.insert("pattern".into(), Value::String(pattern.clone()));
        }
        RuleStage::Min { value, .. } => {
            if let Some(num) = number_from_f64(*value) {
                out.insert("minimum".into(), num);
            }
        }
        RuleStage::Max { value, .. } => {
            if let Some(num) = number_from_f64(*value) {
                out.insert("maximum".into(), num);
            }
        }
        RuleStage::OneOf { choices, .. } => {
            out.insert(
                "enum".into(),
                Value::Array(choices.iter().cloned().map(Value::String).collect()),
            );
        }
        _ => {}
    }
}

fn kind_type(kind: ValueKind) -> Value {
    let name = match kind {
        ValueKind::String => "string",
        ValueKind::Number => "number",
        ValueKind::Boolean => "boolean",
        ValueKind::List => "array",
    };
    Value::String(name.into())
}

fn number_from_f64(value: f64) -> Option<Value> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        return Some(Value::Number((value as i64).into()));
    }
    serde_json::Number::from_f64(value).map(Value::Number)
}
