pub mod cli;
pub mod cmd;
pub mod logging;

pub use cmd::demo::{FORM_FIELDS_SPEC, form_fields_schema};
