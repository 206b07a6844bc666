use serde::Serialize;
use shared::domain::{Coordinate, EventId, MagnitudeThreshold, SeismicEvent};

pub const MIN_RADIUS: f64 = 4.0;
pub const MAX_RADIUS: f64 = 30.0;
const RADIUS_PER_MAGNITUDE: f64 = 4.0;
const STRONG_FROM: f64 = 6.0;
const MODERATE_FROM: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnitudeClass {
    Strong,
    Moderate,
    Minor,
}

impl MagnitudeClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Moderate => "moderate",
            Self::Minor => "minor",
        }
    }

    pub fn fill_color(self) -> &'static str {
        match self {
            Self::Strong => "red",
            Self::Moderate => "orange",
            Self::Minor => "yellow",
        }
    }

    pub fn legend_label(self) -> &'static str {
        match self {
            Self::Strong => "Strong (≥ 6)",
            Self::Moderate => "Moderate (4–6)",
            Self::Minor => "Minor (< 4)",
        }
    }
}

pub const LEGEND: [MagnitudeClass; 3] = [
    MagnitudeClass::Strong,
    MagnitudeClass::Moderate,
    MagnitudeClass::Minor,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupData {
    pub place: String,
    pub magnitude: String,
    pub depth_km: String,
    pub occurred_at: String,
    pub detail_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: EventId,
    pub coordinate: Coordinate,
    pub radius: f64,
    pub class: MagnitudeClass,
    pub popup: PopupData,
}

pub fn radius_for(magnitude: Option<f64>) -> f64 {
    match magnitude {
        Some(magnitude) if magnitude.is_finite() => {
            (magnitude * RADIUS_PER_MAGNITUDE).clamp(MIN_RADIUS, MAX_RADIUS)
        }
        _ => MIN_RADIUS,
    }
}

pub fn classify(magnitude: Option<f64>) -> MagnitudeClass {
    match magnitude {
        Some(magnitude) if magnitude >= STRONG_FROM => MagnitudeClass::Strong,
        Some(magnitude) if magnitude >= MODERATE_FROM => MagnitudeClass::Moderate,
        _ => MagnitudeClass::Minor,
    }
}

/// Markers for every event at or above `threshold`, in input order.
pub fn derive(entities: &[SeismicEvent], threshold: MagnitudeThreshold) -> Vec<Marker> {
    entities
        .iter()
        .filter(|event| threshold.admits(event))
        // Normalization already drops these; a marker without a position cannot be drawn.
        .filter(|event| event.coordinate().is_valid())
        .map(project)
        .collect()
}

fn project(event: &SeismicEvent) -> Marker {
    Marker {
        id: event.id.clone(),
        coordinate: event.coordinate(),
        radius: radius_for(event.magnitude),
        class: classify(event.magnitude),
        popup: PopupData {
            place: event.place.clone(),
            magnitude: event.magnitude_label(),
            depth_km: event.depth_label(),
            occurred_at: event.occurred_at_label(),
            detail_url: event.detail_url.clone(),
        },
    }
}

#[cfg(test)]
#[path = "../tests/map_projection_tests.rs"]
mod tests;
