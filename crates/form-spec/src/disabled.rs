use std::collections::BTreeMap;

use crate::schema::FormSchema;

pub type DisabledMap = BTreeMap<String, bool>;

/// Effective disabled flag of a field.
///
/// A declared override is returned as is, whichever way it points; without one the field
/// follows the form-wide flag.
pub fn effective(global_disabled: bool, field_override: Option<bool>) -> bool {
    field_override.unwrap_or(global_disabled)
}

pub fn resolve_disabled(schema: &FormSchema, global_disabled: bool) -> DisabledMap {
    schema
        .fields()
        .map(|field| {
            (
                field.name.clone(),
                effective(global_disabled, field.disabled),
            )
        })
        .collect()
}
