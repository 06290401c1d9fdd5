use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

const USER_AGENT: &str = concat!("fpl_scout/", env!("CARGO_PKG_VERSION"));

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client. The timeout is fixed by the first caller; without one the
/// library default applies.
pub fn http_client(timeout: Option<Duration>) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().context("failed to build http client")
    })
}
