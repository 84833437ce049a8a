use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kinds of values that flow between rule stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    String,
    Number,
    Boolean,
    List,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Boolean => "boolean",
            ValueKind::List => "list",
        }
    }

    /// Kind of a JSON value, `None` for `null` and objects.
    pub fn of(value: &Value) -> Option<ValueKind> {
        match value {
            Value::String(_) => Some(ValueKind::String),
            Value::Number(_) => Some(ValueKind::Number),
            Value::Bool(_) => Some(ValueKind::Boolean),
            Value::Array(_) => Some(ValueKind::List),
            Value::Null | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role a stage plays inside a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageClass {
    Coercion,
    Predicate,
    Transform,
}

/// One step of a field rule. Stages run left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RuleStage {
    ToNumber,
    ToInteger,
    ToBoolean,
    ToString,
    MinLen {
        len: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    MaxLen {
        len: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Pattern {
        pattern: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Min {
        value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Max {
        value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    OneOf {
        choices: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Split {
        separator: String,
    },
    MapBool {
        when_true: String,
        when_false: String,
    },
    Trim,
    Lowercase,
    Uppercase,
}

impl RuleStage {
    pub fn name(&self) -> &'static str {
        match self {
            RuleStage::ToNumber => "to_number",
            RuleStage::ToInteger => "to_integer",
            RuleStage::ToBoolean => "to_boolean",
            RuleStage::ToString => "to_string",
            RuleStage::MinLen { .. } => "min_len",
            RuleStage::MaxLen { .. } => "max_len",
            RuleStage::Pattern { .. } => "pattern",
            RuleStage::Min { .. } => "min",
            RuleStage::Max { .. } => "max",
            RuleStage::Integer { .. } => "integer",
            RuleStage::OneOf { .. } => "one_of",
            RuleStage::Split { .. } => "split",
            RuleStage::MapBool { .. } => "map_bool",
            RuleStage::Trim => "trim",
            RuleStage::Lowercase => "lowercase",
            RuleStage::Uppercase => "uppercase",
        }
    }

    pub fn class(&self) -> StageClass {
        match self {
            RuleStage::ToNumber
            | RuleStage::ToInteger
            | RuleStage::ToBoolean
            | RuleStage::ToString => StageClass::Coercion,
            RuleStage::MinLen { .. }
            | RuleStage::MaxLen { .. }
            | RuleStage::Pattern { .. }
            | RuleStage::Min { .. }
            | RuleStage::Max { .. }
            | RuleStage::Integer { .. }
            | RuleStage::OneOf { .. } => StageClass::Predicate,
            RuleStage::Split { .. }
            | RuleStage::MapBool { .. }
            | RuleStage::Trim
            | RuleStage::Lowercase
            | RuleStage::Uppercase => StageClass::Transform,
        }
    }

    /// Kinds this stage can be applied to.
    pub fn accepts(&self) -> &'static [ValueKind] {
        match self {
            RuleStage::ToNumber | RuleStage::ToInteger => &[ValueKind::String, ValueKind::Boolean],
            RuleStage::ToBoolean => &[ValueKind::String],
            RuleStage::ToString => &[ValueKind::Number, ValueKind::Boolean],
            RuleStage::MinLen { .. }
            | RuleStage::MaxLen { .. }
            | RuleStage::Pattern { .. }
            | RuleStage::OneOf { .. }
            | RuleStage::Split { .. }
            | RuleStage::Trim
            | RuleStage::Lowercase
            | RuleStage::Uppercase => &[ValueKind::String],
            RuleStage::Min { .. } | RuleStage::Max { .. } | RuleStage::Integer { .. } => {
                &[ValueKind::Number]
            }
            RuleStage::MapBool { .. } => &[ValueKind::Boolean],
        }
    }

    /// Kind produced when the stage is applied to `input`.
    pub fn produces(&self, input: ValueKind) -> ValueKind {
        match self {
            RuleStage::ToNumber | RuleStage::ToInteger => ValueKind::Number,
            RuleStage::ToBoolean => ValueKind::Boolean,
            RuleStage::ToString
            | RuleStage::MapBool { .. }
            | RuleStage::Trim
            | RuleStage::Lowercase
            | RuleStage::Uppercase => ValueKind::String,
            RuleStage::Split { .. } => ValueKind::List,
            _ => input,
        }
    }

    fn set_message(&mut self, text: String) {
        match self {
            RuleStage::MinLen { message, .. }
            | RuleStage::MaxLen { message, .. }
            | RuleStage::Pattern { message, .. }
            | RuleStage::Min { message, .. }
            | RuleStage::Max { message, .. }
            | RuleStage::Integer { message }
            | RuleStage::OneOf { message, .. } => *message = Some(text),
            _ => {}
        }
    }
}

/// Validation and transformation rule for a single raw field value.
///
/// Built either from JSON or by chaining:
///
/// ```
/// use form_spec::ValidationRule;
///
/// let age = ValidationRule::string().min_len(1).coerce_number().min(0.0);
/// assert_eq!(age.stages.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationRule {
    pub input: ValueKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<RuleStage>,
}

impl ValidationRule {
    pub fn new(input: ValueKind) -> Self {
        Self {
            input,
            stages: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::new(ValueKind::String)
    }

    pub fn boolean() -> Self {
        Self::new(ValueKind::Boolean)
    }

    pub fn number() -> Self {
        Self::new(ValueKind::Number)
    }

    pub fn stage(mut self, stage: RuleStage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn coerce_number(self) -> Self {
        self.stage(RuleStage::ToNumber)
    }

    pub fn coerce_integer(self) -> Self {
        self.stage(RuleStage::ToInteger)
    }

    pub fn coerce_boolean(self) -> Self {
        self.stage(RuleStage::ToBoolean)
    }

    pub fn coerce_string(self) -> Self {
        self.stage(RuleStage::ToString)
    }

    pub fn min_len(self, len: usize) -> Self {
        self.stage(RuleStage::MinLen { len, message: None })
    }

    pub fn max_len(self, len: usize) -> Self {
        self.stage(RuleStage::MaxLen { len, message: None })
    }

    pub fn pattern(self, pattern: impl Into<String>) -> Self {
        self.stage(RuleStage::Pattern {
            pattern: pattern.into(),
            message: None,
        })
    }

    pub fn min(self, value: f64) -> Self {
        self.stage(RuleStage::Min {
            value,
            message: None,
        })
    }

    pub fn max(self, value: f64) -> Self {
        self.stage(RuleStage::Max {
            value,
            message: None,
        })
    }

    pub fn integer(self) -> Self {
        self.stage(RuleStage::Integer { message: None })
    }

    pub fn one_of<I, S>(self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stage(RuleStage::OneOf {
            choices: choices.into_iter().map(Into::into).collect(),
            message: None,
        })
    }

    pub fn split(self, separator: impl Into<String>) -> Self {
        self.stage(RuleStage::Split {
            separator: separator.into(),
        })
    }

    pub fn map_bool(self, when_true: impl Into<String>, when_false: impl Into<String>) -> Self {
        self.stage(RuleStage::MapBool {
            when_true: when_true.into(),
            when_false: when_false.into(),
        })
    }

    pub fn trim(self) -> Self {
        self.stage(RuleStage::Trim)
    }

    pub fn lowercase(self) -> Self {
        self.stage(RuleStage::Lowercase)
    }

    pub fn uppercase(self) -> Self {
        self.stage(RuleStage::Uppercase)
    }

    /// Replaces the default error message of the most recent predicate stage.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        if let Some(stage) = self
            .stages
            .iter_mut()
            .rev()
            .find(|stage| stage.class() == StageClass::Predicate)
        {
            stage.set_message(message);
        }
        self
    }

    /// Kind of the value produced once every stage has run.
    pub fn output_kind(&self) -> ValueKind {
        self.stages
            .iter()
            .fold(self.input, |kind, stage| stage.produces(kind))
    }

    pub fn transform(&self) -> Option<&RuleStage> {
        self.stages
            .iter()
            .find(|stage| stage.class() == StageClass::Transform)
    }
}
