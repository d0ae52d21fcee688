use std::sync::Arc;

use crate::config::Config;
use crate::db::Database;
use crate::domains::chat::ChatSession;
use crate::error::Result;
use crate::interfaces::providers::LlmProvider;
use crate::inventory::{InventoryStore, ProvinceCount};
use crate::providers::openai::OpenAiProvider;
use crate::providers::unconfigured::UnconfiguredProvider;
use crate::services::dispatcher::ChatDispatcher;
use crate::services::map::MapView;
use crate::services::queries::QueryService;

/// Backing services for the Map, Analytics and Chat views.
pub struct Dashboard {
    db: Database,
    inventory: InventoryStore,
    dispatcher: ChatDispatcher,
}

impl Dashboard {
    pub fn new(db: Database, llm: Arc<dyn LlmProvider>) -> Self {
        let inventory = InventoryStore::new(db.clone());
        let dispatcher = ChatDispatcher::new(llm, QueryService::new(db.clone()));
        Self {
            db,
            inventory,
            dispatcher,
        }
    }

    /// Opens the database and the model client. A missing API key only
    /// disables chat; the map and analytics views still work.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let db = Database::open(config.database_url()).await?;
        let llm: Arc<dyn LlmProvider> = match config.openai_api_key() {
            Ok(api_key) => {
                let openai = config.openai.clone().unwrap_or_default();
                let provider = OpenAiProvider::new(api_key, openai.model, openai.base_url);
                tracing::info!(database = %config.database_url(), model = provider.model(), "dashboard ready");
                Arc::new(provider)
            }
            Err(err) => {
                tracing::warn!(database = %config.database_url(), error = %err, "dashboard ready without chat");
                Arc::new(UnconfiguredProvider::new("OPENAI_API_KEY is not set"))
            }
        };
        Ok(Self::new(db, llm))
    }

    pub async fn map_view(&self) -> Result<MapView> {
        let points = self.inventory.map_points().await?;
        Ok(MapView::from_points(points))
    }

    pub async fn province_counts(&self) -> Result<Vec<ProvinceCount>> {
        self.inventory.province_counts().await
    }

    pub async fn tables(&self) -> Result<Vec<String>> {
        self.db.table_names().await
    }

    pub async fn chat(&self, session: &mut ChatSession, text: &str) -> String {
        self.dispatcher.handle_turn(session, text).await
    }
}
