use std::path::Path;

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::Deserialize;

use crate::error::{AdspotError, Result};
use crate::inventory::MapPoint;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&MapPoint> for BaseLocation {
    fn from(point: &MapPoint) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
        }
    }
}

#[derive(Deserialize)]
struct LocationRow {
    #[serde(rename = "Latitude", default)]
    latitude: Option<f64>,
    #[serde(rename = "Longitude", default)]
    longitude: Option<f64>,
}

/// Reads base coordinates from a CSV with `Latitude` and `Longitude` headers.
/// Rows missing either value are skipped.
pub fn load_locations_csv(path: impl AsRef<Path>) -> Result<Vec<BaseLocation>> {
    let mut reader =
        csv::Reader::from_path(path.as_ref()).map_err(|e| AdspotError::Config(e.to_string()))?;
    let mut locations = Vec::new();
    for row in reader.deserialize::<LocationRow>() {
        let row = row.map_err(|e| AdspotError::Serialization(e.to_string()))?;
        if let (Some(latitude), Some(longitude)) = (row.latitude, row.longitude) {
            locations.push(BaseLocation {
                latitude,
                longitude,
            });
        }
    }
    Ok(locations)
}

/// Independent Gaussian noise on each axis, in degrees.
#[derive(Debug, Clone, Copy)]
pub struct Jitter {
    noise: Normal<f64>,
}

impl Jitter {
    pub fn new(std_dev: f64) -> Result<Self> {
        let noise = Normal::new(0.0, std_dev)
            .map_err(|e| AdspotError::Config(format!("invalid jitter std dev {std_dev}: {e}")))?;
        Ok(Self { noise })
    }

    /// `[latitude, longitude]` near `base`.
    pub fn apply<R: Rng + ?Sized>(&self, base: BaseLocation, rng: &mut R) -> [f64; 2] {
        [
            base.latitude + self.noise.sample(rng),
            base.longitude + self.noise.sample(rng),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;

    fn mean_and_std(values: &[f64]) -> (f64, f64) {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        (mean, var.sqrt())
    }

    #[test]
    fn jitter_centres_on_base_with_configured_spread() {
        let jitter = Jitter::new(0.01).unwrap();
        let base = BaseLocation {
            latitude: 43.6532,
            longitude: -79.3832,
        };
        let mut rng = StdRng::seed_from_u64(42);
        let samples: Vec<[f64; 2]> = (0..20_000).map(|_| jitter.apply(base, &mut rng)).collect();
        let lats: Vec<f64> = samples.iter().map(|s| s[0]).collect();
        let lons: Vec<f64> = samples.iter().map(|s| s[1]).collect();

        let (lat_mean, lat_std) = mean_and_std(&lats);
        let (lon_mean, lon_std) = mean_and_std(&lons);
        assert!((lat_mean - base.latitude).abs() < 0.0005, "lat mean {lat_mean}");
        assert!((lon_mean - base.longitude).abs() < 0.0005, "lon mean {lon_mean}");
        assert!((lat_std - 0.01).abs() < 0.0005, "lat std {lat_std}");
        assert!((lon_std - 0.01).abs() < 0.0005, "lon std {lon_std}");
    }

    #[test]
    fn negative_spread_is_rejected() {
        assert!(Jitter::new(-1.0).is_err());
    }

    #[test]
    fn csv_rows_without_coordinates_are_skipped() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Location_Name,Latitude,Longitude").unwrap();
        writeln!(file, "A,45.5,-73.56").unwrap();
        writeln!(file, "B,,-73.0").unwrap();
        writeln!(file, "C,49.28,-123.12").unwrap();
        file.flush().unwrap();

        let locations = load_locations_csv(file.path()).unwrap();
        assert_eq!(
            locations,
            vec![
                BaseLocation {
                    latitude: 45.5,
                    longitude: -73.56
                },
                BaseLocation {
                    latitude: 49.28,
                    longitude: -123.12
                },
            ]
        );
    }
}
