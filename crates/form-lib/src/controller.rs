use std::collections::BTreeSet;

use form_spec::{
    DisabledMap, FieldError, FieldErrors, FormSchema, RawValues, TransformedValues,
    ValidationMode, effective, resolve_disabled, validate_field, validate_values,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::FormError;
use crate::snapshot::{FieldSnapshot, FormSnapshot};

/// Input events the rendering layer sends to the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormEvent {
    Change { field: String, value: Value },
    Blur { field: String },
    Submit,
    Reset,
    SetDisabled { disabled: bool },
}

/// Result of a submit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Every field passed and the completion handler ran.
    Submitted,
    /// At least one field failed; errors were recorded instead.
    Blocked,
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted)
    }
}

/// Mutable state owned by one form instance.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    values: RawValues,
    errors: FieldErrors,
    disabled: bool,
    result: Option<TransformedValues>,
    touched: BTreeSet<String>,
    submit_count: u32,
}

impl FormState {
    pub fn values(&self) -> &RawValues {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Output of the last successful submit.
    pub fn result(&self) -> Option<&TransformedValues> {
        self.result.as_ref()
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.touched.contains(name)
    }

    pub fn submit_count(&self) -> u32 {
        self.submit_count
    }

    pub fn is_submitted(&self) -> bool {
        self.submit_count > 0
    }
}

/// Owns a form's raw values and drives validation and submission.
///
/// All handlers run synchronously and take `&mut self`, so one event is fully applied
/// before the next.
#[derive(Debug, Clone)]
pub struct FormController {
    schema: FormSchema,
    defaults: RawValues,
    state: FormState,
}

impl FormController {
    pub fn new(schema: FormSchema) -> Self {
        let defaults = schema.default_values();
        let state = FormState {
            values: defaults.clone(),
            ..FormState::default()
        };
        Self {
            schema,
            defaults,
            state,
        }
    }

    /// Starts from the schema defaults overlaid with `values`, which also become the
    /// values `reset` returns to.
    pub fn with_values(schema: FormSchema, values: &Value) -> Result<Self, FormError> {
        let overrides = values.as_object().ok_or_else(|| {
            FormError::InvalidValues("initial values must be a JSON object".into())
        })?;
        if let Some(unknown) = overrides.keys().find(|name| !schema.contains(name)) {
            return Err(FormError::UnknownField(unknown.clone()));
        }

        let mut controller = Self::new(schema);
        for (name, value) in overrides {
            controller.defaults.insert(name.clone(), value.clone());
        }
        controller.state.values = controller.defaults.clone();
        Ok(controller)
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn default_values(&self) -> &RawValues {
        &self.defaults
    }

    /// Binds to a declared field.
    pub fn register(&mut self, name: &str) -> Result<FieldHandle<'_>, FormError> {
        self.ensure_field(name)?;
        Ok(FieldHandle {
            controller: self,
            name: name.to_string(),
        })
    }

    pub fn change(&mut self, name: &str, value: Value) -> Result<(), FormError> {
        self.ensure_field(name)?;
        self.apply_change(name, value);
        Ok(())
    }

    pub fn blur(&mut self, name: &str) -> Result<(), FormError> {
        self.ensure_field(name)?;
        self.apply_blur(name);
        Ok(())
    }

    /// Validates the current raw values and calls `on_valid` once if every field passes.
    ///
    /// Failures are recorded in the error map; the previous successful output is kept.
    pub fn handle_submit<F>(&mut self, on_valid: F) -> SubmitOutcome
    where
        F: FnOnce(&TransformedValues),
    {
        self.state.submit_count = self.state.submit_count.saturating_add(1);

        match validate_values(&self.schema, &self.state.values) {
            Ok(values) => {
                self.state.errors.clear();
                on_valid(&values);
                self.state.result = Some(values);
                debug!(form = %self.schema.id(), "form submitted");
                SubmitOutcome::Submitted
            }
            Err(errors) => {
                debug!(
                    form = %self.schema.id(),
                    errors = errors.len(),
                    "submit blocked by field errors"
                );
                self.state.errors = errors;
                SubmitOutcome::Blocked
            }
        }
    }

    pub fn submit(&mut self) -> SubmitOutcome {
        self.handle_submit(|_| {})
    }

    /// Restores the default raw values and clears errors, touched fields and the last output.
    pub fn reset(&mut self) {
        self.state.values = self.defaults.clone();
        self.state.errors.clear();
        self.state.touched.clear();
        self.state.result = None;
        self.state.submit_count = 0;
        debug!(form = %self.schema.id(), "form reset");
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.state.disabled = disabled;
    }

    pub fn dispatch(&mut self, event: FormEvent) -> Result<(), FormError> {
        match event {
            FormEvent::Change { field, value } => self.change(&field, value),
            FormEvent::Blur { field } => self.blur(&field),
            FormEvent::Submit => {
                self.submit();
                Ok(())
            }
            FormEvent::Reset => {
                self.reset();
                Ok(())
            }
            FormEvent::SetDisabled { disabled } => {
                self.set_disabled(disabled);
                Ok(())
            }
        }
    }

    /// Effective disabled flag of a field, `None` for undeclared names.
    pub fn is_field_disabled(&self, name: &str) -> Option<bool> {
        self.schema
            .field(name)
            .map(|field| effective(self.state.disabled, field.disabled))
    }

    pub fn disabled_map(&self) -> DisabledMap {
        resolve_disabled(&self.schema, self.state.disabled)
    }

    pub fn snapshot(&self) -> FormSnapshot {
        let fields = self
            .schema
            .fields()
            .map(|field| {
                let value = self.state.values.get(&field.name);
                FieldSnapshot {
                    name: field.name.clone(),
                    label: field.label.clone(),
                    value: value.cloned(),
                    error: self.state.errors.get(&field.name).cloned(),
                    disabled: effective(self.state.disabled, field.disabled),
                    touched: self.state.touched.contains(&field.name),
                    dirty: value != self.defaults.get(&field.name),
                }
            })
            .collect::<Vec<_>>();

        FormSnapshot {
            form_id: self.schema.id().to_string(),
            title: self.schema.spec().title.clone(),
            disabled: self.state.disabled,
            submit_count: self.state.submit_count,
            has_errors: !self.state.errors.is_empty(),
            dirty: fields.iter().any(|field| field.dirty),
            fields,
            result: self.state.result.clone(),
        }
    }

    fn ensure_field(&self, name: &str) -> Result<(), FormError> {
        if self.schema.contains(name) {
            Ok(())
        } else {
            Err(FormError::UnknownField(name.to_string()))
        }
    }

    fn active_mode(&self) -> ValidationMode {
        self.schema.policy().active_mode(self.state.is_submitted())
    }

    fn apply_change(&mut self, name: &str, value: Value) {
        trace!(field = name, "field changed");
        self.state.values.insert(name.to_string(), value);
        if self.active_mode().on_change() {
            self.revalidate(name);
        }
    }

    fn apply_blur(&mut self, name: &str) {
        self.state.touched.insert(name.to_string());
        if self.active_mode().on_blur() {
            self.revalidate(name);
        }
    }

    fn revalidate(&mut self, name: &str) {
        match validate_field(&self.schema, name, &self.state.values) {
            Some(Ok(_)) => {
                self.state.errors.remove(name);
            }
            Some(Err(error)) => self.state.errors.set(error),
            None => {}
        }
    }
}

/// Binding between the rendering layer and one registered field.
pub struct FieldHandle<'a> {
    controller: &'a mut FormController,
    name: String,
}

impl FieldHandle<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&Value> {
        self.controller.state.values.get(&self.name)
    }

    pub fn change(&mut self, value: impl Into<Value>) {
        self.controller.apply_change(&self.name, value.into());
    }

    pub fn blur(&mut self) {
        self.controller.apply_blur(&self.name);
    }

    pub fn error(&self) -> Option<&FieldError> {
        self.controller.state.errors.get(&self.name)
    }

    pub fn is_disabled(&self) -> bool {
        self.controller
            .is_field_disabled(&self.name)
            .unwrap_or(self.controller.state.disabled)
    }

    pub fn is_touched(&self) -> bool {
        self.controller.state.is_touched(&self.name)
    }
}
