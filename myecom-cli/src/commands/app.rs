//! Process-wide state shared by every command.

use anyhow::{Context, Result};
use client::{
    ApiClient, Capability, ClientError, FileTokenStore, SessionStore, guard,
};
use shared::{config::Config, models::User};
use std::sync::Arc;
use tracing::debug;

/// The API client, the session restored from the token file and the resolved config.
#[derive(Debug)]
pub struct App {
    pub config: Config,
    pub api: ApiClient,
    pub session: SessionStore,
}

impl App {
    /// Build the client and restore the persisted session.
    ///
    /// An expired stored session is reported and dropped; the command then
    /// runs anonymously.
    pub async fn start(config: Config) -> Result<Self> {
        let api = ApiClient::from_config(&config).context("failed to build API client")?;
        let storage = Arc::new(FileTokenStore::new(config.token_path.clone()));
        debug!(token_path = %config.token_path.display(), "restoring session");
        let session = SessionStore::new(api.clone(), storage);

        match session.initialize().await {
            Ok(_) => {}
            Err(ClientError::AuthExpired) => {
                eprintln!("warning: stored session is no longer valid; log in again");
            }
            Err(err) => return Err(err).context("failed to restore session"),
        }

        Ok(Self {
            config,
            api,
            session,
        })
    }

    /// The signed-in user, if they hold `capability`.
    pub fn require(&self, capability: Capability) -> Result<User> {
        let snapshot = self.session.snapshot();
        guard::ensure(&snapshot, capability)
            .cloned()
            .with_context(|| match snapshot.user {
                Some(_) => "your account cannot do this".to_string(),
                None => "not logged in; run `myecom session login` first".to_string(),
            })
    }
}
