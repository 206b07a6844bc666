use std::cmp::Ordering;

use shared::domain::{MagnitudeThreshold, SeismicEvent};

/// Events at or above `threshold`, strongest first.
///
/// Equal magnitudes are ordered by id so re-deriving after a threshold change
/// never reshuffles ties, whatever order the feed returned them in.
pub fn derive(entities: &[SeismicEvent], threshold: MagnitudeThreshold) -> Vec<SeismicEvent> {
    let mut sorted: Vec<&SeismicEvent> = entities.iter().collect();
    sorted.sort_by(|a, b| by_magnitude_desc(a, b));
    sorted
        .into_iter()
        .filter(|event| threshold.admits(event))
        .cloned()
        .collect()
}

fn by_magnitude_desc(a: &SeismicEvent, b: &SeismicEvent) -> Ordering {
    b.effective_magnitude()
        .total_cmp(&a.effective_magnitude())
        .then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
#[path = "../tests/magnitude_filter_tests.rs"]
mod tests;
