//! Remote connection arguments shared by the cloud commands.

use akilhane_sync_engine::{RestGateway, ReqwestClient, StaticIdentity, SyncConfig};
use clap::Args;
use std::time::Duration;

/// Where the remote store is and who is signed in.
#[derive(Args, Debug, Clone)]
pub struct RemoteArgs {
    /// Remote project URL
    #[arg(long, env = "AKILHANE_REMOTE_URL")]
    pub remote_url: String,

    /// Project API key
    #[arg(long, env = "AKILHANE_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Access token of the signed-in user
    #[arg(long, env = "AKILHANE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Id of the signed-in user (signed out if omitted)
    #[arg(long, env = "AKILHANE_USER_ID")]
    pub user_id: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,
}

impl RemoteArgs {
    /// Builds the sync configuration.
    pub fn config(&self) -> SyncConfig {
        let config = SyncConfig::new(&self.remote_url, &self.api_key)
            .with_timeout(Duration::from_secs(self.timeout));
        match &self.access_token {
            Some(token) => config.with_access_token(token),
            None => config,
        }
    }

    /// Connects a REST gateway.
    pub fn gateway(&self) -> Result<RestGateway<ReqwestClient>, Box<dyn std::error::Error>> {
        Ok(RestGateway::connect(self.config())?)
    }

    /// Returns the identity given on the command line.
    pub fn identity(&self) -> StaticIdentity {
        match &self.user_id {
            Some(user) => StaticIdentity::signed_in(user),
            None => StaticIdentity::signed_out(),
        }
    }
}
