use form_spec::{FieldErrors, FormSchema, TransformedValues};
use serde::Serialize;
use serde_json::Value;

use crate::FormError;
use crate::controller::{FormController, FormEvent};

/// Everything needed to start a driver.
#[derive(Clone, Debug, Default)]
pub struct FormRunConfig {
    pub spec_json: String,
    pub initial_values_json: Option<String>,
    pub disabled: bool,
}

/// Response of a submit through the JSON facade.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmitResponse {
    /// `valid` or `invalid`.
    pub status: String,
    pub response_json: String,
}

impl SubmitResponse {
    pub fn is_valid(&self) -> bool {
        self.status == "valid"
    }
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum SubmitBody<'a> {
    Valid { values: &'a TransformedValues },
    Invalid { errors: &'a FieldErrors },
}

/// JSON-in/JSON-out facade over a [`FormController`].
#[derive(Debug, Clone)]
pub struct FormDriver {
    controller: FormController,
}

impl FormDriver {
    pub fn new(config: FormRunConfig) -> Result<Self, FormError> {
        let schema = FormSchema::from_json(&config.spec_json)?;
        let mut controller = match config.initial_values_json {
            Some(raw) => {
                let values: Value = serde_json::from_str(&raw)?;
                FormController::with_values(schema, &values)?
            }
            None => FormController::new(schema),
        };
        controller.set_disabled(config.disabled);
        Ok(Self { controller })
    }

    pub fn from_json(
        spec_json: &str,
        initial_values_json: Option<&str>,
    ) -> Result<Self, FormError> {
        Self::new(FormRunConfig {
            spec_json: spec_json.to_string(),
            initial_values_json: initial_values_json.map(str::to_string),
            disabled: false,
        })
    }

    pub fn from_controller(controller: FormController) -> Self {
        Self { controller }
    }

    /// Applies one change; `value_json` is the field's raw JSON value.
    pub fn change_json(&mut self, field: &str, value_json: &str) -> Result<(), FormError> {
        let value: Value = serde_json::from_str(value_json)?;
        self.controller.change(field, value)
    }

    /// Applies a JSON object map of field name -> raw value as a series of changes.
    ///
    /// Every key is checked before anything is applied.
    pub fn submit_patch_json(&mut self, patch_json: &str) -> Result<(), FormError> {
        let patch: Value = serde_json::from_str(patch_json)?;
        let patch = patch.as_object().ok_or_else(|| {
            FormError::InvalidValues(
                "patch_json must be a JSON object map of field -> value".into(),
            )
        })?;
        if let Some(unknown) = patch
            .keys()
            .find(|name| !self.controller.schema().contains(name))
        {
            return Err(FormError::UnknownField(unknown.clone()));
        }

        for (name, value) in patch {
            self.controller.change(name, value.clone())?;
        }
        Ok(())
    }

    /// Applies a serialized [`FormEvent`], e.g. `{"type":"blur","field":"name"}`.
    pub fn dispatch_json(&mut self, event_json: &str) -> Result<(), FormError> {
        let event: FormEvent = serde_json::from_str(event_json)?;
        self.controller.dispatch(event)
    }

    pub fn submit_json(&mut self) -> Result<SubmitResponse, FormError> {
        let mut submitted = None;
        self.controller
            .handle_submit(|values| submitted = Some(values.clone()));

        let body = match &submitted {
            Some(values) => SubmitBody::Valid { values },
            None => SubmitBody::Invalid {
                errors: self.controller.state().errors(),
            },
        };
        let status = if submitted.is_some() {
            "valid"
        } else {
            "invalid"
        };

        Ok(SubmitResponse {
            status: status.to_string(),
            response_json: serde_json::to_string(&body)?,
        })
    }

    pub fn snapshot_json(&self) -> Result<String, FormError> {
        Ok(serde_json::to_string(&self.controller.snapshot())?)
    }

    pub fn reset(&mut self) {
        self.controller.reset();
    }

    pub fn controller(&self) -> &FormController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut FormController {
        &mut self.controller
    }

    pub fn into_controller(self) -> FormController {
        self.controller
    }
}
