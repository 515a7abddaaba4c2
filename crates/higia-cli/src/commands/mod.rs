pub mod auth;
pub mod config;
pub mod sessions;
pub mod track;

use colored::Colorize;
use higia_core::HigiaError;
use higia_core::cleaning::CleaningSession;

/// Converts a library error into what the user should read.
pub(crate) fn user_error(err: HigiaError, fallback: &str) -> anyhow::Error {
    let message = err.user_message(fallback);
    if err.is_auth() {
        anyhow::anyhow!("{message} (run `higia login`)")
    } else {
        anyhow::anyhow!(message)
    }
}

pub(crate) fn print_error(err: &HigiaError, fallback: &str) {
    eprintln!("{} {}", "✗".red(), err.user_message(fallback));
}

pub(crate) fn sector_label(session: &CleaningSession) -> String {
    match (session.sector_name(), session.sector_location()) {
        (Some(name), Some(location)) => format!("{name} ({location})"),
        (Some(name), None) => name.to_string(),
        _ => session.sector_id.clone().unwrap_or_else(|| "-".to_string()),
    }
}
