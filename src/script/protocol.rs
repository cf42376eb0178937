//! Result protocol for script output
//!
//! A script reports its outcome on the last line of its output as a single
//! JSON object: `{"status": "success", "message": "..."}`. Any other status is
//! a failure. The process exit code is checked afterwards and a non-zero code
//! fails the step even when the script reported success.

use crate::script::ScriptError;
use serde_json::Value;
use tracing::info;

pub const UNPARSABLE_OUTPUT: &str =
    "Could not parse script output as JSON, manually validate the logs.";

const SUCCESS: &str = "success";
const UNKNOWN_ERROR: &str = "Unknown error";

/// Outcome reported on the last output line
#[derive(Debug, Clone, PartialEq)]
pub struct ReportedStatus {
    pub status: String,
    pub message: Option<String>,
}

impl ReportedStatus {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS
    }
}

/// Parse a status line; anything that is not a JSON object is forced to an error
pub fn parse_status_line(line: &str) -> ReportedStatus {
    match serde_json::from_str::<Value>(line.trim()) {
        Ok(Value::Object(map)) => ReportedStatus {
            status: map
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            message: map.get("message").and_then(|m| match m {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            }),
        },
        _ => {
            info!("Could not parse script output as JSON.");
            ReportedStatus {
                status: "error".to_string(),
                message: Some(UNPARSABLE_OUTPUT.to_string()),
            }
        }
    }
}

/// Apply the protocol to captured output lines and the process exit code.
///
/// `exit_code` is `None` when the process was terminated by a signal.
pub fn check_result(output: &[String], exit_code: Option<i32>) -> Result<(), ScriptError> {
    if let Some(last) = output.last() {
        let reported = parse_status_line(last);
        if !reported.is_success() {
            return Err(ScriptError::Reported(
                reported.message.unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            ));
        }
        info!(
            "Python script completed: {}",
            reported.message.as_deref().unwrap_or_default()
        );
    }

    match exit_code {
        Some(0) => Ok(()),
        Some(code) => Err(ScriptError::Execution(format!(
            "Script execution failed with exit code {}",
            code
        ))),
        None => Err(ScriptError::Execution(
            "Script execution failed: terminated by signal".to_string(),
        )),
    }
}
