use std::sync::Arc;

use anyhow::Context;
use simpai_client::SimpaiClient;
use simpai_config::SimpaiConfig;
use simpai_session::{DocumentStore, PdfSession, SpreadsheetSession};
use simpai_store::LibsqlStore;

use crate::cli::GlobalFlags;
use crate::console::ConsoleNotifier;

/// Load layered configuration, reading `.env` from the working directory first.
pub fn load_config() -> anyhow::Result<SimpaiConfig> {
    SimpaiConfig::load_with_dotenv().context("failed to load simpai configuration")
}

/// Everything a command handler needs: config, backend client, local state.
pub struct AppContext {
    pub config: SimpaiConfig,
    pub client: Arc<SimpaiClient>,
    pub store: Arc<LibsqlStore>,
    pub notifier: Arc<ConsoleNotifier>,
}

impl AppContext {
    /// Build the client from config and the stored token. The state database
    /// is opened lazily on first use.
    pub fn init(config: SimpaiConfig, flags: &GlobalFlags) -> anyhow::Result<Self> {
        let client = SimpaiClient::new(&config.backend)
            .context("failed to build backend client")?
            .with_stored_token();
        let db_path = config.storage.state_db_path();
        tracing::debug!(
            backend = client.base_url(),
            db = %db_path.display(),
            authenticated = client.has_token(),
            "app context ready"
        );

        Ok(Self {
            store: Arc::new(LibsqlStore::new(db_path)),
            client: Arc::new(client),
            notifier: Arc::new(ConsoleNotifier::new(flags)),
            config,
        })
    }

    pub fn documents(&self) -> DocumentStore {
        DocumentStore::new(self.config.storage.documents_dir())
    }

    pub async fn spreadsheet(
        &self,
    ) -> SpreadsheetSession<SimpaiClient, LibsqlStore, Arc<ConsoleNotifier>> {
        SpreadsheetSession::open(
            Arc::clone(&self.client),
            Arc::clone(&self.store),
            Arc::clone(&self.notifier),
        )
        .await
    }

    pub async fn pdf(&self) -> PdfSession<SimpaiClient, LibsqlStore, Arc<ConsoleNotifier>> {
        PdfSession::open(
            Arc::clone(&self.client),
            Arc::clone(&self.store),
            Arc::clone(&self.notifier),
            self.documents(),
        )
        .await
    }
}
