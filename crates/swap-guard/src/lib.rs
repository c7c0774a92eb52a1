//! Confirmation guard for "cancel swap request" links.
//!
//! Links whose `href` carries the `delete_swap` marker get a click handler
//! that asks the user first and cancels the navigation on a "no".
//!
//! - `guard`: selection and the per-click state machine, host independent
//! - `host`: traits the guard talks to (document, confirm dialog, click event)
//! - `platform::headless`: in-memory host for tests and the CLI
//! - `platform::browser`: `web-sys` host (`browser` feature)

pub mod config;
pub mod guard;
pub mod host;
pub mod matcher;
pub mod platform;

pub use config::{ConfigError, GuardConfig};
pub use guard::{Activation, ConfirmationGuard, GuardState, GuardedLink, InvalidTransition, Outcome};
pub use host::{Confirm, Link, LinkSource, NavigationEvent};
pub use matcher::{HrefMatcher, MatchMode};
