use serde_json::{Number, Value};
use tracing::debug;

use crate::schema::{CompiledField, CompiledStage, FormSchema};
use crate::spec::rule::{RuleStage, ValueKind};
use crate::values::{ErrorKind, FieldError, FieldErrors, RawValues, TransformedValues};

/// Validates raw form input and transforms it into the output shape.
///
/// Every field is checked, so a failure in one field never hides failures in another. Any
/// error withholds the whole output. Keys the schema does not declare are ignored.
pub fn validate_and_transform(
    schema: &FormSchema,
    raw: &Value,
) -> Result<TransformedValues, FieldErrors> {
    match raw.as_object() {
        Some(values) => validate_values(schema, values),
        None => validate_values(schema, &RawValues::new()),
    }
}

/// Same as [`validate_and_transform`] over an already unpacked value map.
pub fn validate_values(
    schema: &FormSchema,
    raw: &RawValues,
) -> Result<TransformedValues, FieldErrors> {
    let mut output = TransformedValues::default();
    let mut errors = FieldErrors::new();

    for field in schema.compiled_fields() {
        match run_field(field, raw.get(&field.spec.name)) {
            Ok(value) => output.insert(field.spec.name.clone(), value),
            Err(error) => errors.set(error),
        }
    }

    let ignored = raw.keys().filter(|key| !schema.contains(key)).count();
    if ignored > 0 {
        debug!(form = %schema.id(), ignored, "ignored undeclared raw values");
    }

    if errors.is_empty() {
        Ok(output)
    } else {
        Err(errors)
    }
}

/// Validates a single field against the raw values.
///
/// Returns `None` when the schema does not declare `name`; otherwise the field's transformed
/// value (`None` inside for an undefined optional field) or its error.
pub fn validate_field(
    schema: &FormSchema,
    name: &str,
    raw: &RawValues,
) -> Option<Result<Option<Value>, FieldError>> {
    let field = schema.compiled_field(name)?;
    Some(run_field(field, raw.get(name)))
}

fn run_field(field: &CompiledField, raw: Option<&Value>) -> Result<Option<Value>, FieldError> {
    let spec = &field.spec;
    let value = match raw {
        None | Some(Value::Null) => {
            if spec.optional {
                return Ok(None);
            }
            return Err(field_error(
                field,
                Failure::new(ErrorKind::Required, "invalid_type", "Required"),
            ));
        }
        Some(Value::String(text)) if text.is_empty() && spec.optional => return Ok(None),
        Some(value) => value,
    };

    if ValueKind::of(value) != Some(spec.rule.input) {
        return Err(field_error(
            field,
            Failure::new(
                ErrorKind::TypeMismatch,
                "invalid_type",
                format!(
                    "Expected {}, received {}",
                    spec.rule.input,
                    received_label(value)
                ),
            ),
        ));
    }

    let mut current = value.clone();
    for stage in &field.stages {
        current = apply_stage(stage, current).map_err(|failure| field_error(field, failure))?;
    }
    Ok(Some(current))
}

struct Failure {
    kind: ErrorKind,
    code: &'static str,
    message: String,
}

impl Failure {
    fn new(kind: ErrorKind, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
        }
    }

    fn predicate(code: &'static str, custom: &Option<String>, default: String) -> Self {
        Self::new(
            ErrorKind::Predicate,
            code,
            custom.clone().unwrap_or(default),
        )
    }
}

fn field_error(field: &CompiledField, failure: Failure) -> FieldError {
    FieldError {
        field: field.spec.name.clone(),
        path: format!("/{}", field.spec.name),
        message: failure.message,
        code: failure.code.into(),
        kind: failure.kind,
    }
}

fn apply_stage(compiled: &CompiledStage, value: Value) -> Result<Value, Failure> {
    match (&compiled.stage, value) {
        (RuleStage::ToNumber, value) => coerce_number(&value),
        (RuleStage::ToInteger, value) => {
            let number = coerce_number(&value)?;
            match number.as_f64() {
                Some(n) if n.fract() == 0.0 => Ok(number),
                _ => Err(Failure::new(
                    ErrorKind::Coercion,
                    "invalid_type",
                    "Expected integer, received float",
                )),
            }
        }
        (RuleStage::ToBoolean, Value::String(text)) => {
            match text.trim().to_ascii_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => Ok(Value::Bool(true)),
                "false" | "off" | "no" | "0" | "" => Ok(Value::Bool(false)),
                _ => Err(Failure::new(
                    ErrorKind::Coercion,
                    "invalid_type",
                    "Expected boolean, received string",
                )),
            }
        }
        (RuleStage::ToString, Value::Number(number)) => Ok(Value::String(number.to_string())),
        (RuleStage::ToString, Value::Bool(flag)) => Ok(Value::String(flag.to_string())),
        (RuleStage::MinLen { len, message }, Value::String(text)) => {
            if text.chars().count() < *len {
                return Err(Failure::predicate(
                    "too_small",
                    message,
                    format!("String must contain at least {len} character(s)"),
                ));
            }
            Ok(Value::String(text))
        }
        (RuleStage::MaxLen { len, message }, Value::String(text)) => {
            if text.chars().count() > *len {
                return Err(Failure::predicate(
                    "too_big",
                    message,
                    format!("String must contain at most {len} character(s)"),
                ));
            }
            Ok(Value::String(text))
        }
        (RuleStage::Pattern { message, .. }, Value::String(text)) => {
            let matched = compiled
                .regex
                .as_ref()
                .is_some_and(|regex| regex.is_match(&text));
            if !matched {
                return Err(Failure::predicate(
                    "invalid_string",
                    message,
                    "Invalid".into(),
                ));
            }
            Ok(Value::String(text))
        }
        (RuleStage::Min { value: min, message }, Value::Number(number)) => {
            if number.as_f64().is_some_and(|n| n < *min) {
                return Err(Failure::predicate(
                    "too_small",
                    message,
                    format!("Number must be greater than or equal to {min}"),
                ));
            }
            Ok(Value::Number(number))
        }
        (RuleStage::Max { value: max, message }, Value::Number(number)) => {
            if number.as_f64().is_some_and(|n| n > *max) {
                return Err(Failure::predicate(
                    "too_big",
                    message,
                    format!("Number must be less than or equal to {max}"),
                ));
            }
            Ok(Value::Number(number))
        }
        (RuleStage::Integer { message }, Value::Number(number)) => {
            if number.as_f64().is_some_and(|n| n.fract() != 0.0) {
                return Err(Failure::predicate(
                    "invalid_type",
                    message,
                    "Expected integer, received float".into(),
                ));
            }
            Ok(Value::Number(number))
        }
        (RuleStage::OneOf { choices, message }, Value::String(text)) => {
            if !choices.contains(&text) {
                let expected = choices
                    .iter()
                    .map(|choice| format!("'{choice}'"))
                    .collect::<Vec<_>>()
                    .join(" | ");
                return Err(Failure::predicate(
                    "invalid_enum_value",
                    message,
                    format!("Invalid enum value. Expected {expected}, received '{text}'"),
                ));
            }
            Ok(Value::String(text))
        }
        (RuleStage::Split { separator }, Value::String(text)) => Ok(Value::Array(
            split_tokens(&text, separator)
                .into_iter()
                .map(Value::String)
                .collect(),
        )),
        (
            RuleStage::MapBool {
                when_true,
                when_false,
            },
            Value::Bool(flag),
        ) => Ok(Value::String(if flag {
            when_true.clone()
        } else {
            when_false.clone()
        })),
        (RuleStage::Trim, Value::String(text)) => Ok(Value::String(text.trim().to_string())),
        (RuleStage::Lowercase, Value::String(text)) => Ok(Value::String(text.to_lowercase())),
        (RuleStage::Uppercase, Value::String(text)) => Ok(Value::String(text.to_uppercase())),
        (stage, value) => Err(Failure::new(
            ErrorKind::TypeMismatch,
            "invalid_type",
            format!(
                "Expected {}, received {}",
                stage
                    .accepts()
                    .first()
                    .map(|kind| kind.as_str())
                    .unwrap_or("value"),
                received_label(&value)
            ),
        )),
    }
}

fn coerce_number(value: &Value) -> Result<Value, Failure> {
    let parsed = match value {
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                parse_radix(trimmed).or_else(|| trimmed.parse::<f64>().ok())
            }
        }
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        Value::Number(number) => number.as_f64(),
        _ => None,
    };

    match parsed.filter(|n| n.is_finite()) {
        Some(n) => Ok(number_value(n)),
        None => Err(Failure::new(
            ErrorKind::Coercion,
            "invalid_type",
            "Expected number, received nan",
        )),
    }
}

/// Unsigned `0x`, `0o` and `0b` literals, as numeric text from a browser input reads them.
fn parse_radix(text: &str) -> Option<f64> {
    let (radix, digits) = match text.get(..2)? {
        "0x" | "0X" => (16, &text[2..]),
        "0o" | "0O" => (8, &text[2..]),
        "0b" | "0B" => (2, &text[2..]),
        _ => return None,
    };
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0_f64, |acc, ch| {
        ch.to_digit(radix)
            .map(|digit| acc * f64::from(radix) + f64::from(digit))
    })
}

/// Integral values become JSON integers so `"50"` coerces to `50`, not `50.0`.
fn number_value(n: f64) -> Value {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE {
        return Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

fn split_tokens(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }
    text.split(separator).map(str::to_string).collect()
}

fn received_label(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
