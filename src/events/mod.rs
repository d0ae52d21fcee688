use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::Database;
use crate::error::{AdspotError, Result};

mod schema;
use schema::person_details;

#[derive(Insertable)]
#[diesel(table_name = person_details)]
struct NewPersonDetails<'a> {
    data: &'a str,
}

/// Append-only sink for person-location events. Rows hold the raw JSON text.
#[derive(Clone)]
pub struct PersonEventStore {
    db: Database,
}

impl PersonEventStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn insert_json(&self, data: &str) -> Result<()> {
        let mut conn = self.db.conn().await?;
        diesel::insert_into(person_details::table)
            .values(&NewPersonDetails { data })
            .execute(&mut conn)
            .await
            .map_err(|e| AdspotError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn count(&self) -> Result<i64> {
        let mut conn = self.db.conn().await?;
        person_details::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|e| AdspotError::Database(e.to_string()))
    }

    /// Most recent rows first.
    pub async fn latest(&self, limit: usize) -> Result<Vec<String>> {
        let mut conn = self.db.conn().await?;
        person_details::table
            .select(person_details::data)
            .order(person_details::id.desc())
            .limit(limit as i64)
            .load(&mut conn)
            .await
            .map_err(|e| AdspotError::Database(e.to_string()))
    }
}
