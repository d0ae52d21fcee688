use serde::{Deserialize, Serialize};

use crate::inventory::MapPoint;

pub const NO_DATA_MESSAGE: &str = "No data available";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub pitch: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterLayer {
    pub color: [u8; 4],
    pub radius: f64,
}

impl Default for ScatterLayer {
    fn default() -> Self {
        Self {
            color: [200, 30, 0, 160],
            radius: 100.0,
        }
    }
}

/// Everything the Map view needs to draw inventory locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub points: Vec<MapPoint>,
    pub view_state: Option<ViewState>,
    pub layer: ScatterLayer,
    pub message: Option<String>,
}

impl MapView {
    /// Centres the viewport on the first point.
    pub fn from_points(points: Vec<MapPoint>) -> Self {
        let view_state = points.first().map(|first| ViewState {
            latitude: first.latitude,
            longitude: first.longitude,
            zoom: 10.0,
            pitch: 0.0,
        });
        let message = view_state.is_none().then(|| NO_DATA_MESSAGE.to_string());
        Self {
            points,
            view_state,
            layer: ScatterLayer::default(),
            message,
        }
    }
}
