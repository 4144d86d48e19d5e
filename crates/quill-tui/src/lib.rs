//! Full-screen TUI client for the quill blogging service.

pub mod common;
pub mod effects;
pub mod events;
pub mod interactions;
pub mod modal;
pub mod notices;
pub mod render;
pub mod router;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stderr};

use anyhow::Result;
use quill_core::config::Config;
use quill_core::{ApiClient, CredentialStore, SessionManager};
pub use runtime::TuiRuntime;

/// Builds the session from config and runs the TUI until quit.
pub async fn run(config: &Config) -> Result<()> {
    // The alternate screen needs a real terminal behind it.
    if !stderr().is_terminal() {
        anyhow::bail!("quill is an interactive client and requires a terminal.");
    }

    let api = ApiClient::new(&config.base_url, config.request_timeout_secs);
    let store = CredentialStore::new();
    let session = SessionManager::new(api, store);

    let mut runtime = TuiRuntime::new(session)?;
    runtime.run()
}
