//! Role-gated navigation
//!
//! Route declarations, the guards that decide whether a route renders, and the
//! [`Navigator`] seam the request pipeline uses to send the user elsewhere.

pub mod guard;
pub mod routes;

pub use guard::{Navigation, landing_route, resolve, resolve_final};
pub use routes::{Access, Role, Route};

use colored::*;
use log::warn;

/// Moves the user to another screen
pub trait Navigator: Send + Sync {
    fn redirect(&self, to: Route);
}

/// Terminal front end: a redirect becomes a hint on stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn redirect(&self, to: Route) {
        match to {
            Route::Login => {
                warn!("Session expired; redirecting to {}", to.path());
                eprintln!(
                    "{} Your session has expired. Run {} to sign in again.",
                    "!".yellow().bold(),
                    "epms-cli login".bold()
                );
            }
            other => {
                warn!("Redirecting to {}", other.path());
                eprintln!("{} Redirected to {}", "!".yellow().bold(), other.path());
            }
        }
    }
}
