use serde_json::{Map, Number, Value};

use crate::schema::FormSchema;
use crate::spec::field::FieldSpec;
use crate::spec::rule::{RuleStage, StageClass, ValueKind};

/// Builds a raw value object for the schema, preferring declared defaults.
///
/// Generated values satisfy length, range, integer and `one_of` stages. A field with a
/// `pattern` stage and no default is left out, so a required one still fails validation.
pub fn generate(schema: &FormSchema) -> Value {
    let mut output = Map::new();
    for field in schema.fields() {
        if let Some(value) = example_for(field) {
            output.insert(field.name.clone(), value);
        }
    }
    Value::Object(output)
}

fn example_for(field: &FieldSpec) -> Option<Value> {
    if let Some(default_value) = &field.default_value {
        return Some(default_value.clone());
    }

    let stages = &field.rule.stages;
    if stages
        .iter()
        .any(|stage| matches!(stage, RuleStage::Pattern { .. }))
    {
        return None;
    }

    let value = match field.rule.input {
        ValueKind::String => {
            if let Some(RuleStage::OneOf { choices, .. }) = stages
                .iter()
                .find(|stage| matches!(stage, RuleStage::OneOf { .. }))
                && let Some(first) = choices.first()
            {
                return Some(Value::String(first.clone()));
            }
            if stages
                .iter()
                .any(|stage| matches!(stage, RuleStage::ToNumber | RuleStage::ToInteger))
            {
                return Some(Value::String(number_text(example_number(stages))));
            }
            if stages
                .iter()
                .any(|stage| matches!(stage, RuleStage::ToBoolean))
            {
                return Some(Value::String("false".into()));
            }
            Value::String(fit_length(format!("example-{}", field.name), stages))
        }
        ValueKind::Boolean => Value::Bool(false),
        ValueKind::Number => number_value(example_number(stages)),
        ValueKind::List => Value::Array(Vec::new()),
    };
    Some(value)
}

/// A number inside the `min`/`max` stages, whole when an integer stage applies.
fn example_number(stages: &[RuleStage]) -> f64 {
    let mut min: Option<f64> = None;
    let mut max: Option<f64> = None;
    let mut integer = false;
    for stage in stages {
        match stage {
            RuleStage::Min { value, .. } => min = Some(min.map_or(*value, |m| m.max(*value))),
            RuleStage::Max { value, .. } => max = Some(max.map_or(*value, |m| m.min(*value))),
            RuleStage::ToInteger | RuleStage::Integer { .. } => integer = true,
            _ => {}
        }
    }

    match (min, max) {
        (Some(lo), _) if integer => lo.ceil(),
        (Some(lo), _) => lo,
        (None, Some(hi)) if integer => hi.min(1.0).floor(),
        (None, Some(hi)) => hi.min(1.0),
        (None, None) => 1.0,
    }
}

fn number_text(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        (n as i64).to_string()
    } else {
        n.to_string()
    }
}

fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        return Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

/// Pads or truncates `text` to the length limits that apply to the raw string.
fn fit_length(text: String, stages: &[RuleStage]) -> String {
    let mut min = 0;
    let mut max = usize::MAX;
    for stage in stages {
        match stage {
            RuleStage::MinLen { len, .. } => min = min.max(*len),
            RuleStage::MaxLen { len, .. } => max = max.min(*len),
            stage if stage.class() != StageClass::Predicate => break,
            _ => {}
        }
    }

    let mut chars = text.chars().take(max).collect::<Vec<_>>();
    while chars.len() < min.min(max) {
        chars.push('x');
    }
    chars.into_iter().collect()
}
