//! Terminal renditions of the map and list surfaces.

use quake_core::{
    views::map_projection::LEGEND, ListSurface, MagnitudeClass, MapSurface, Marker, StatusBanner,
};
use serde_json::Value;
use shared::domain::{Coordinate, SeismicEvent};

const LIST_ROWS: usize = 15;

#[derive(Default)]
pub struct TerminalMap {
    markers: Vec<Marker>,
}

impl TerminalMap {
    pub fn print_summary(&self) {
        let count = |class: MagnitudeClass| {
            self.markers
                .iter()
                .filter(|marker| marker.class == class)
                .count()
        };
        let summary: Vec<String> = LEGEND
            .iter()
            .map(|class| {
                format!(
                    "{} [{}]: {}",
                    class.legend_label(),
                    class.fill_color(),
                    count(*class)
                )
            })
            .collect();
        println!("map: {} markers | {}", self.markers.len(), summary.join(" | "));
    }
}

impl MapSurface for TerminalMap {
    fn render_markers(&mut self, markers: &[Marker]) {
        self.markers = markers.to_vec();
    }

    fn recenter_to(&mut self, coordinate: Coordinate, zoom: u8, duration_secs: f64) {
        let nearest = self
            .markers
            .iter()
            .find(|marker| marker.coordinate == coordinate);
        println!(
            "map: flying to {:.3}, {:.3} (zoom {zoom}, {duration_secs}s)",
            coordinate.latitude, coordinate.longitude
        );
        if let Some(marker) = nearest {
            let popup = &marker.popup;
            println!("  {}", popup.place);
            println!("  Magnitude: {}", popup.magnitude);
            println!("  Depth: {} km", popup.depth_km);
            println!("  Time: {}", popup.occurred_at);
            println!("  Details: {}", popup.detail_url);
        }
    }

    fn render_plate_boundaries(&mut self, boundaries: &Value) {
        let segments = boundaries
            .get("features")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        println!("map: tectonic plate boundaries loaded ({segments} segments)");
    }
}

#[derive(Default)]
pub struct TerminalList {
    events: Vec<SeismicEvent>,
    status: Option<StatusBanner>,
}

impl TerminalList {
    pub fn print(&self) {
        if let Some(status) = &self.status {
            match status {
                StatusBanner::Error(message) => println!("{} ({message})", status.text()),
                _ => println!("{}", status.text()),
            }
        }
        if self.events.is_empty() {
            if self.status.is_none() {
                println!("No earthquakes match the filter.");
            }
            return;
        }
        for event in self.events.iter().take(LIST_ROWS) {
            println!(
                "  M {:<5} {:<45} {}  [{}]",
                event.magnitude_label(),
                event.place,
                event.occurred_at_label(),
                event.id
            );
        }
        if self.events.len() > LIST_ROWS {
            println!("  ... and {} more", self.events.len() - LIST_ROWS);
        }
    }
}

impl ListSurface for TerminalList {
    fn render_list(&mut self, events: &[SeismicEvent]) {
        self.events = events.to_vec();
    }

    fn render_status(&mut self, status: Option<&StatusBanner>) {
        self.status = status.cloned();
    }
}
