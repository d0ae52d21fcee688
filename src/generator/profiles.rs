use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

const SEXES: [&str; 2] = ["Male", "Female"];
const REASONS: [&str; 4] = ["Tourism", "Business", "Resident", "Education"];
// "None" the string and a missing job are distinct values in the emitted JSON.
const JOBS: [Option<&str>; 5] = [
    Some("Engineer"),
    Some("Doctor"),
    Some("Teacher"),
    Some("None"),
    None,
];
const EDUCATION_LEVELS: [&str; 4] = ["High School", "Bachelor Degree", "Master Degree", "PhD"];
const INCOME_LEVELS: [&str; 3] = ["Low", "Middle", "High"];
const MARITAL_STATUSES: [&str; 3] = ["Single", "Married", "Divorced"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonProfile {
    pub person_id: u32,
    pub name: String,
    pub age: u8,
    pub sex: &'static str,
    pub reason_in_city: &'static str,
    pub job: Option<&'static str>,
    pub ad_influence_score: f64,
    pub education_level: &'static str,
    pub income_level: &'static str,
    pub marital_status: &'static str,
}

impl PersonProfile {
    pub fn random<R: Rng + ?Sized>(person_id: u32, rng: &mut R) -> Self {
        Self {
            person_id,
            name: format!("Person {person_id}"),
            age: rng.gen_range(18..=80),
            sex: pick(&SEXES, rng),
            reason_in_city: pick(&REASONS, rng),
            job: pick(&JOBS, rng),
            ad_influence_score: round2(rng.gen_range(0.0..=1.0)),
            education_level: pick(&EDUCATION_LEVELS, rng),
            income_level: pick(&INCOME_LEVELS, rng),
            marital_status: pick(&MARITAL_STATUSES, rng),
        }
    }
}

fn pick<T: Copy, R: Rng + ?Sized>(values: &[T], rng: &mut R) -> T {
    // Every table above is non-empty.
    *values.choose(rng).unwrap_or(&values[0])
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Profiles for ids `1..=count`, generated once and kept for the life of the process.
#[derive(Debug, Clone)]
pub struct ProfileCatalog {
    profiles: Vec<PersonProfile>,
}

impl ProfileCatalog {
    pub fn generate<R: Rng + ?Sized>(count: u32, rng: &mut R) -> Self {
        let profiles = (1..=count)
            .map(|person_id| PersonProfile::random(person_id, rng))
            .collect();
        Self { profiles }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, person_id: u32) -> Option<&PersonProfile> {
        let index = person_id.checked_sub(1)? as usize;
        self.profiles.get(index)
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&PersonProfile> {
        self.profiles.choose(rng)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PersonProfile> {
        self.profiles.iter()
    }
}
