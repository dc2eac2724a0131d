//! Session wiring shared by the commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing::{debug, warn};

use tether_core::{ApiUrl, RequestClient};
use tether_file::FileStore;
use tether_http::{HttpApi, HttpConfig};

use crate::cli::Cli;
use crate::output;

/// Get the default credentials file path.
fn default_credentials_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "tether").context("Could not determine data directory")?;

    Ok(dirs.data_dir().join("credentials.json"))
}

/// The API, credential store and request client for one invocation.
#[derive(Debug)]
pub struct CliSession {
    api: HttpApi,
    store: Arc<FileStore>,
    client: RequestClient,
}

impl CliSession {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let api_url = ApiUrl::new(&cli.api_url).context("Invalid API URL")?;
        let path = match &cli.credentials_file {
            Some(path) => path.clone(),
            None => default_credentials_path()?,
        };

        debug!(api = %api_url, credentials = %path.display(), "Using credentials file");
        let api = HttpApi::new(HttpConfig::new(api_url)).context("Failed to create HTTP client")?;
        let store = Arc::new(FileStore::new(path));
        let client = api.connect(store.clone());

        client.register_on_session_ended(|| {
            warn!("Session ended, stored credentials were cleared");
            output::error("Session ended. Run 'tether login' to sign in again.");
        });

        Ok(Self { api, store, client })
    }

    pub fn api(&self) -> &HttpApi {
        &self.api
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    pub fn client(&self) -> &RequestClient {
        &self.client
    }

    pub fn api_url(&self) -> &ApiUrl {
        self.api.base_url()
    }

    pub fn credentials_path(&self) -> &Path {
        self.store.path()
    }
}
