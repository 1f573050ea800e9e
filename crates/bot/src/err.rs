use log::{error, warn};
use model::errors::LedgerError;

pub const ERROR: &str = "Something went wrong. Please try again later.";

/// Turns the outcome of a command into the reply text.
pub fn handle_result(result: Result<String, LedgerError>, command: &str) -> String {
    match result {
        Ok(text) => text,
        Err(err) => {
            if let Some(text) = business_error(&err, command) {
                warn!("Command {} rejected: {:#}", command, err);
                text
            } else {
                error!("Failed to handle {}: {:#}", command, err);
                ERROR.to_string()
            }
        }
    }
}

fn business_error(err: &LedgerError, command: &str) -> Option<String> {
    Some(match err {
        LedgerError::Eyre(_) => return None,
        LedgerError::PermissionDenied { .. } => {
            "Only administrators can use this command!".to_string()
        }
        LedgerError::InvalidArgument(reason) => format!(
            "Invalid arguments: {}. Expected format: {} userid|hours|note",
            reason, command
        ),
        LedgerError::NotFound(user_id) => {
            format!("No subscription found for user {}.", user_id)
        }
        LedgerError::TransportFailure { user_id, .. } => format!(
            "Failed to remove user {} from the chat, the next check will retry.",
            user_id
        ),
    })
}
