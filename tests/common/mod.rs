#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use diesel_async::RunQueryDsl;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use adspot::db::Database;
use adspot::error::{AdspotError, Result};
use adspot::interfaces::providers::{LlmProvider, LlmResponse, ToolCall};
use adspot::inventory::{InventoryRecord, InventoryStore};

/// Replays canned responses in order; plain "mock text" once the queue is empty.
pub struct QueueLlmProvider {
    queue: Mutex<VecDeque<Result<LlmResponse>>>,
    pub prompts: Mutex<Vec<(String, String)>>,
}

impl QueueLlmProvider {
    pub fn new(queue: Vec<LlmResponse>) -> Self {
        Self::with_results(queue.into_iter().map(Ok).collect())
    }

    pub fn with_results(queue: Vec<Result<LlmResponse>>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::from(queue)),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self::with_results(vec![Err(AdspotError::Http(message.to_string()))])
    }
}

#[async_trait]
impl LlmProvider for QueueLlmProvider {
    async fn generate_with_tools(
        &self,
        prompt: &str,
        system_prompt: &str,
        _tools: Vec<serde_json::Value>,
    ) -> Result<LlmResponse> {
        self.prompts
            .lock()
            .await
            .push((prompt.to_string(), system_prompt.to_string()));
        let mut guard = self.queue.lock().await;
        guard.pop_front().unwrap_or_else(|| {
            Ok(LlmResponse {
                text: "mock text".to_string(),
                tool_calls: Vec::new(),
            })
        })
    }
}

pub fn tool_response(name: &str, arguments: &str) -> LlmResponse {
    LlmResponse {
        text: String::new(),
        tool_calls: vec![ToolCall {
            name: name.to_string(),
            arguments: arguments.to_string(),
        }],
    }
}

pub fn text_response(text: &str) -> LlmResponse {
    LlmResponse {
        text: text.to_string(),
        tool_calls: Vec::new(),
    }
}

/// A migrated database in a temp file. Keep the file alive for the test's duration.
pub async fn temp_database() -> (NamedTempFile, Database) {
    let file = NamedTempFile::new().unwrap();
    let db = Database::open(file.path().to_str().unwrap()).await.unwrap();
    (file, db)
}

pub fn record(name: &str, province: Option<&str>, lat: Option<f64>, lon: Option<f64>) -> InventoryRecord {
    InventoryRecord {
        location_name: Some(name.to_string()),
        province: province.map(str::to_string),
        latitude: lat,
        longitude: lon,
        ..Default::default()
    }
}

pub async fn seed_inventory(db: &Database) {
    let store = InventoryStore::new(db.clone());
    let records = vec![
        record("Union Station", Some("Ontario"), Some(43.6453), Some(-79.3806)),
        record("Eaton Centre", Some("Ontario"), Some(43.6544), Some(-79.3807)),
        record("Yorkdale", Some("Ontario"), Some(43.7254), Some(-79.4522)),
        record("Place Ville Marie", Some("Quebec"), Some(45.5017), Some(-73.5694)),
        record("Granville", Some("British Columbia"), Some(49.2827), Some(-123.1207)),
        record("Scotia Square", Some("Nova Scotia"), None, None),
        record("Unplaced", None, Some(51.0447), Some(-114.0719)),
    ];
    store.insert_records(&records).await.unwrap();
}

pub async fn execute(db: &Database, sql: &str) {
    let mut conn = db.conn().await.unwrap();
    diesel::sql_query(sql).execute(&mut conn).await.unwrap();
}

/// Adds a user table with `rows` rows outside the migrations.
pub async fn create_table(db: &Database, name: &str, rows: usize) {
    let mut conn = db.conn().await.unwrap();
    diesel::sql_query(format!(
        "CREATE TABLE \"{name}\" (id INTEGER PRIMARY KEY AUTOINCREMENT, note TEXT)"
    ))
    .execute(&mut conn)
    .await
    .unwrap();
    for i in 0..rows {
        diesel::sql_query(format!("INSERT INTO \"{name}\" (note) VALUES ('row {i}')"))
            .execute(&mut conn)
            .await
            .unwrap();
    }
}

pub fn provider(queue: Vec<LlmResponse>) -> Arc<QueueLlmProvider> {
    Arc::new(QueueLlmProvider::new(queue))
}
