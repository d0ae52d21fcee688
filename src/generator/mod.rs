//! Synthetic person-location events.
//!
//! A fixed catalog of profiles is built at startup. Each tick picks one
//! profile and one base location at random, jitters the coordinate, stamps
//! the current time and appends the JSON document to `person_details`.

pub mod locations;
pub mod profiles;

use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::error::{AdspotError, Result};
use crate::events::PersonEventStore;
use crate::interfaces::scheduler::ScheduledJob;

pub use locations::{load_locations_csv, BaseLocation, Jitter};
pub use profiles::{PersonProfile, ProfileCatalog};

#[derive(Debug, Clone, Serialize)]
pub struct PersonEvent {
    #[serde(flatten)]
    pub profile: PersonProfile,
    pub geospatial_coordinates: [f64; 2],
    pub timestamp: String,
}

pub struct EventGenerator {
    catalog: ProfileCatalog,
    locations: Vec<BaseLocation>,
    jitter: Jitter,
    rng: Mutex<StdRng>,
    store: PersonEventStore,
}

impl EventGenerator {
    pub fn new(
        catalog: ProfileCatalog,
        locations: Vec<BaseLocation>,
        jitter: Jitter,
        store: PersonEventStore,
    ) -> Result<Self> {
        Self::with_rng(catalog, locations, jitter, store, StdRng::from_entropy())
    }

    pub fn with_rng(
        catalog: ProfileCatalog,
        locations: Vec<BaseLocation>,
        jitter: Jitter,
        store: PersonEventStore,
        rng: StdRng,
    ) -> Result<Self> {
        if catalog.is_empty() {
            return Err(AdspotError::Config("profile catalog is empty".to_string()));
        }
        if locations.is_empty() {
            return Err(AdspotError::Config(
                "no base locations with coordinates".to_string(),
            ));
        }
        Ok(Self {
            catalog,
            locations,
            jitter,
            rng: Mutex::new(rng),
            store,
        })
    }

    pub async fn next_event(&self) -> Result<PersonEvent> {
        let mut rng = self.rng.lock().await;
        let profile = self
            .catalog
            .pick(&mut *rng)
            .cloned()
            .ok_or_else(|| AdspotError::Runtime("profile catalog is empty".to_string()))?;
        let base = *self
            .locations
            .choose(&mut *rng)
            .ok_or_else(|| AdspotError::Runtime("no base locations".to_string()))?;
        let geospatial_coordinates = self.jitter.apply(base, &mut *rng);
        drop(rng);

        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|e| AdspotError::Serialization(e.to_string()))?;

        Ok(PersonEvent {
            profile,
            geospatial_coordinates,
            timestamp,
        })
    }

    /// Generates one event and appends it. The JSON text is bound as a parameter.
    pub async fn emit_once(&self) -> Result<PersonEvent> {
        let event = self.next_event().await?;
        let data =
            serde_json::to_string(&event).map_err(|e| AdspotError::Serialization(e.to_string()))?;
        self.store.insert_json(&data).await?;
        tracing::info!(
            person_id = event.profile.person_id,
            latitude = event.geospatial_coordinates[0],
            longitude = event.geospatial_coordinates[1],
            "inserted person event"
        );
        Ok(event)
    }
}

pub struct GeneratorJob {
    generator: EventGenerator,
    interval: Duration,
}

impl GeneratorJob {
    pub fn new(generator: EventGenerator, interval: Duration) -> Self {
        Self {
            generator,
            interval,
        }
    }
}

#[async_trait]
impl ScheduledJob for GeneratorJob {
    fn name(&self) -> &str {
        "person_events"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run(&self) -> Result<()> {
        self.generator.emit_once().await.map(|_| ())
    }
}
