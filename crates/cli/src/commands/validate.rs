//! Validate a session script without running it.

use std::path::Path;

use tracing::{error, info};

use crate::script::{ScriptError, load_script};

/// Load and validate a script, logging every problem found.
///
/// # Errors
///
/// Returns an error if the file cannot be read, does not parse, or fails
/// validation.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!(path = %path.display(), "Validating script");

    match load_script(path) {
        Ok(script) => {
            info!(
                restaurants = script.restaurants.len(),
                items = script.items.len(),
                steps = script.steps.len(),
                "Script is valid"
            );
            Ok(())
        }
        Err(ScriptError::Invalid(errors)) => {
            error!("Script validation failed:");
            for err in &errors {
                error!("  - {err}");
            }
            Err(ScriptError::Invalid(errors).into())
        }
        Err(e) => Err(e.into()),
    }
}
