use shared::domain::{Coordinate, EventId, SeismicEvent};

/// Resolves a list activation to the map position to fly to.
///
/// Looks in the full collection rather than the filtered list, so an id from
/// a list that is mid re-derivation still resolves. Ids from an earlier
/// collection resolve to `None`.
pub fn on_select(id: &EventId, entities: &[SeismicEvent]) -> Option<Coordinate> {
    entities
        .iter()
        .find(|event| &event.id == id)
        .map(SeismicEvent::coordinate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, latitude: f64, longitude: f64) -> SeismicEvent {
        SeismicEvent {
            id: EventId::from(id),
            place: format!("near {id}"),
            magnitude: Some(1.0),
            occurred_at_ms: 0,
            longitude,
            latitude,
            depth_km: Some(10.0),
            detail_url: String::new(),
        }
    }

    #[test]
    fn returns_latitude_longitude_for_known_id() {
        let entities = vec![event("a", 35.0, 139.0), event("b", -33.4, -70.6)];
        assert_eq!(
            on_select(&EventId::from("b"), &entities),
            Some(Coordinate::new(-33.4, -70.6))
        );
    }

    #[test]
    fn unknown_id_is_a_no_op() {
        let entities = vec![event("a", 35.0, 139.0)];
        assert_eq!(on_select(&EventId::from("stale"), &entities), None);
        assert_eq!(on_select(&EventId::from("a"), &[]), None);
    }
}
