//! User-facing text for API failures
//!
//! Presentation only. Keep the table in sync with the backend's business
//! error codes.

use super::error::ApiError;

pub const NETWORK_MESSAGE: &str = "Cannot connect to server. Please check backend.";
pub const FALLBACK_MESSAGE: &str = "Something went wrong, please try again.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Message for a known backend business code
pub fn code_message(code: i64) -> Option<&'static str> {
    let message = match code {
        1001 => "Invalid data.",
        1002 => "Username already exists.",
        1003 => "Username must be at least 3 characters.",
        1004 => "Password must be at least 6 characters.",
        1005 => "User does not exist.",
        1007 => "You do not have permission to perform this action.",
        1008 => "Incorrect username or password.",
        2001 => "Vendor not found.",
        2002 => "Vendor code already exists.",
        2003 => "Rating must be between 1.0 and 5.0.",
        2004 => "Tax ID already exists.",
        2101 => "Material not found.",
        2102 => "Material code already exists.",
        9999 => "System error, please try again.",
        _ => return None,
    };
    Some(message)
}

/// Text to show the user for `error`.
///
/// Lookup order: connectivity, known business code, server message, a generic
/// fallback.
pub fn user_message(error: &ApiError) -> String {
    if error.is_network() {
        return NETWORK_MESSAGE.to_string();
    }

    if let Some(message) = error.code().and_then(code_message) {
        return message.to_string();
    }

    if let Some(message) = error.server_message().filter(|m| !m.trim().is_empty()) {
        return message.to_string();
    }

    match error {
        ApiError::Http { .. } if error.is_unauthorized() => SESSION_EXPIRED_MESSAGE.to_string(),
        ApiError::MissingToken | ApiError::Session(_) | ApiError::SelectionUnavailable(_) => {
            error.to_string()
        }
        _ => FALLBACK_MESSAGE.to_string(),
    }
}
