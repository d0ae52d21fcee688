use std::path::Path;

use diesel::prelude::*;
use diesel::sql_types::{BigInt, Nullable, Text};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::error::{AdspotError, Result};

mod schema;
use schema::inventory_table;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub location_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvinceCount {
    pub province: Option<String>,
    pub count: i64,
}

impl ProvinceCount {
    pub fn label(&self) -> &str {
        self.province.as_deref().unwrap_or("Unknown")
    }
}

/// One inventory row as it appears in the reference CSV.
#[derive(Debug, Clone, Default, Deserialize, Insertable)]
#[diesel(table_name = inventory_table)]
pub struct InventoryRecord {
    #[serde(rename = "Location_Name", default)]
    pub location_name: Option<String>,
    #[serde(rename = "Address", default)]
    pub address: Option<String>,
    #[serde(rename = "City", default)]
    pub city: Option<String>,
    #[serde(rename = "Province", default)]
    pub province: Option<String>,
    #[serde(rename = "Latitude", default)]
    pub latitude: Option<f64>,
    #[serde(rename = "Longitude", default)]
    pub longitude: Option<f64>,
}

#[derive(QueryableByName)]
struct ProvinceCountRow {
    #[diesel(sql_type = Nullable<Text>)]
    province: Option<String>,
    #[diesel(sql_type = BigInt)]
    count: i64,
}

#[derive(Clone)]
pub struct InventoryStore {
    db: Database,
}

impl InventoryStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn map_points(&self) -> Result<Vec<MapPoint>> {
        let mut conn = self.db.conn().await?;
        let rows: Vec<(Option<f64>, Option<f64>, Option<String>)> = inventory_table::table
            .filter(inventory_table::latitude.is_not_null())
            .filter(inventory_table::longitude.is_not_null())
            .select((
                inventory_table::latitude,
                inventory_table::longitude,
                inventory_table::location_name,
            ))
            .order(inventory_table::id.asc())
            .load(&mut conn)
            .await
            .map_err(|e| AdspotError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|(latitude, longitude, location_name)| {
                Some(MapPoint {
                    latitude: latitude?,
                    longitude: longitude?,
                    location_name,
                })
            })
            .collect())
    }

    /// Rows per province, largest first; equal counts are ordered by province name.
    pub async fn province_counts(&self) -> Result<Vec<ProvinceCount>> {
        let mut conn = self.db.conn().await?;
        let rows: Vec<ProvinceCountRow> = diesel::sql_query(
            "SELECT Province AS province, COUNT(*) AS count
             FROM inventory_table
             GROUP BY Province
             ORDER BY count DESC, Province ASC",
        )
        .load(&mut conn)
        .await
        .map_err(|e| AdspotError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| ProvinceCount {
                province: row.province,
                count: row.count,
            })
            .collect())
    }

    /// Inserts all records in one transaction; a failing row leaves the table untouched.
    pub async fn insert_records(&self, records: &[InventoryRecord]) -> Result<usize> {
        let mut conn = self.db.conn().await?;
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                let mut inserted = 0;
                // Row by row: SQLite cannot batch rows whose optional columns fall back to DEFAULT.
                for record in records {
                    inserted += diesel::insert_into(inventory_table::table)
                        .values(record)
                        .execute(conn)
                        .await?;
                }
                Ok(inserted)
            }
            .scope_boxed()
        })
        .await
        .map_err(|e| AdspotError::Database(e.to_string()))
    }

    pub async fn import_csv(&self, path: impl AsRef<Path>) -> Result<usize> {
        let records = read_inventory_csv(path)?;
        let inserted = self.insert_records(&records).await?;
        tracing::info!(inserted, "imported inventory records");
        Ok(inserted)
    }
}

pub fn read_inventory_csv(path: impl AsRef<Path>) -> Result<Vec<InventoryRecord>> {
    let mut reader =
        csv::Reader::from_path(path.as_ref()).map_err(|e| AdspotError::Config(e.to_string()))?;
    reader
        .deserialize()
        .map(|row| row.map_err(|e| AdspotError::Serialization(e.to_string())))
        .collect()
}
