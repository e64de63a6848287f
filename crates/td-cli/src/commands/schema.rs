use schemars::schema_for;
use td_core::entities::Task;

use crate::cli::{GlobalFlags, OutputFormat};
use crate::output::output;

/// Handle `taskdeck schema`: the JSON schema for a task. Table output makes
/// no sense here, so it falls back to pretty JSON.
pub fn handle(flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = schema_for!(Task);
    let format = match flags.format {
        OutputFormat::Raw => OutputFormat::Raw,
        OutputFormat::Json | OutputFormat::Table => OutputFormat::Json,
    };
    output(&schema, format)
}
