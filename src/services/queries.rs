use crate::catalog::{best_match, MATCH_CUTOFF};
use crate::db::Database;
use crate::error::Result;
use crate::inventory::{InventoryStore, ProvinceCount};

/// The two canned queries behind the chat tools.
///
/// The text-returning methods never fail: database errors come back as a
/// readable sentence so they can be shown in the chat transcript as-is.
#[derive(Clone)]
pub struct QueryService {
    db: Database,
    inventory: InventoryStore,
}

impl QueryService {
    pub fn new(db: Database) -> Self {
        let inventory = InventoryStore::new(db.clone());
        Self { db, inventory }
    }

    pub async fn list_tables(&self) -> Result<Vec<String>> {
        self.db.table_names().await
    }

    pub async fn table_count(&self, guess: &str) -> String {
        match self.try_table_count(guess).await {
            Ok(text) => text,
            Err(err) => error_text(err),
        }
    }

    async fn try_table_count(&self, guess: &str) -> Result<String> {
        let tables = self.db.table_names().await?;
        let Some(table) = best_match(guess, &tables, MATCH_CUTOFF) else {
            tracing::debug!(guess, "no table matched");
            return Ok(format!("No matching table found for '{guess}'."));
        };
        let count = self.db.count_rows(table).await?;
        Ok(format!("The table '{table}' has {count} rows."))
    }

    pub async fn province_counts(&self) -> Result<Vec<ProvinceCount>> {
        self.inventory.province_counts().await
    }

    pub async fn count_by_province(&self) -> String {
        match self.inventory.province_counts().await {
            Ok(counts) => render_province_counts(&counts),
            Err(err) => error_text(err),
        }
    }
}

pub fn render_province_counts(counts: &[ProvinceCount]) -> String {
    if counts.is_empty() {
        return "No data found for provinces.".to_string();
    }
    let mut response = "Count of rows per province:\n\n".to_string();
    for entry in counts {
        response.push_str(&format!("{}: {}\n", entry.label(), entry.count));
    }
    response
}

pub fn error_text(err: impl std::fmt::Display) -> String {
    format!("An error occurred: {err}")
}
