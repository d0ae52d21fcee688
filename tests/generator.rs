mod common;

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;

use adspot::events::PersonEventStore;
use adspot::generator::{BaseLocation, EventGenerator, GeneratorJob, Jitter, ProfileCatalog};
use adspot::inventory::InventoryStore;
use adspot::scheduler::Scheduler;

use common::{seed_inventory, temp_database};

fn toronto() -> BaseLocation {
    BaseLocation {
        latitude: 43.6532,
        longitude: -79.3832,
    }
}

#[tokio::test]
async fn emit_once_appends_one_json_document() {
    let (_file, db) = temp_database().await;
    let mut rng = StdRng::seed_from_u64(7);
    let catalog = ProfileCatalog::generate(50, &mut rng);
    let store = PersonEventStore::new(db);
    let generator = EventGenerator::with_rng(
        catalog,
        vec![toronto()],
        Jitter::new(0.01).unwrap(),
        store.clone(),
        rng,
    )
    .unwrap();

    let event = generator.emit_once().await.unwrap();
    assert_eq!(store.count().await.unwrap(), 1);

    let stored: Value = serde_json::from_str(&store.latest(1).await.unwrap()[0]).unwrap();
    assert_eq!(stored["person_id"], event.profile.person_id);
    assert_eq!(stored["name"], format!("Person {}", event.profile.person_id));
    let coords = stored["geospatial_coordinates"].as_array().unwrap();
    assert_eq!(coords.len(), 2);
    assert!((coords[0].as_f64().unwrap() - 43.6532).abs() < 0.1);
    assert!((coords[1].as_f64().unwrap() + 79.3832).abs() < 0.1);
    let score = stored["ad_influence_score"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&score));
    assert!(time::OffsetDateTime::parse(
        stored["timestamp"].as_str().unwrap(),
        &time::format_description::well_known::Rfc3339
    )
    .is_ok());
    for key in [
        "age",
        "sex",
        "reason_in_city",
        "job",
        "education_level",
        "income_level",
        "marital_status",
    ] {
        assert!(stored.get(key).is_some(), "missing {key}");
    }
}

#[tokio::test]
async fn empty_inputs_are_rejected_at_startup() {
    let (_file, db) = temp_database().await;
    let mut rng = StdRng::seed_from_u64(1);
    let store = PersonEventStore::new(db);

    let no_locations = EventGenerator::new(
        ProfileCatalog::generate(3, &mut rng),
        Vec::new(),
        Jitter::new(0.01).unwrap(),
        store.clone(),
    );
    assert!(no_locations.is_err());

    let no_profiles = EventGenerator::new(
        ProfileCatalog::generate(0, &mut rng),
        vec![toronto()],
        Jitter::new(0.01).unwrap(),
        store,
    );
    assert!(no_profiles.is_err());
}

#[tokio::test]
async fn scheduled_job_writes_until_stopped() {
    let (_file, db) = temp_database().await;
    seed_inventory(&db).await;
    let locations: Vec<BaseLocation> = InventoryStore::new(db.clone())
        .map_points()
        .await
        .unwrap()
        .iter()
        .map(BaseLocation::from)
        .collect();
    let store = PersonEventStore::new(db);
    let generator = EventGenerator::new(
        ProfileCatalog::generate(100, &mut StdRng::seed_from_u64(3)),
        locations,
        Jitter::new(0.01).unwrap(),
        store.clone(),
    )
    .unwrap();

    let mut scheduler = Scheduler::new();
    scheduler.register_job(Arc::new(GeneratorJob::new(
        generator,
        Duration::from_millis(20),
    )));
    scheduler.start();
    tokio::time::sleep(Duration::from_millis(150)).await;
    scheduler.stop().await;

    let written = store.count().await.unwrap();
    assert!(written >= 2, "expected several events, got {written}");
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(store.count().await.unwrap(), written);
}
