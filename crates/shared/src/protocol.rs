//! GeoJSON envelope served by the earthquake feeds and the search endpoint.

use serde::{Deserialize, Serialize};

use crate::{
    domain::{Coordinate, EventId, SeismicEvent},
    error::FetchError,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCollection {
    /// Kept as raw values so a single odd record cannot reject the batch.
    #[serde(default)]
    pub features: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureProperties {
    #[serde(default)]
    pub mag: Option<f64>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureGeometry {
    #[serde(default)]
    pub coordinates: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub properties: FeatureProperties,
    #[serde(default)]
    pub geometry: Option<FeatureGeometry>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    pub events: Vec<SeismicEvent>,
    /// Records without an id or usable geometry.
    pub dropped_incomplete: usize,
    /// Records whose shape could not be decoded at all.
    pub dropped_undecodable: usize,
}

impl FeatureCollection {
    pub fn decode(body: &[u8]) -> Result<Self, FetchError> {
        let collection: Self = serde_json::from_slice(body)
            .map_err(|err| FetchError::MalformedPayload(err.to_string()))?;
        if collection.features.is_none() {
            return Err(FetchError::MalformedPayload(
                "response has no features array".to_string(),
            ));
        }
        Ok(collection)
    }

    pub fn normalize(self) -> NormalizedBatch {
        let mut batch = NormalizedBatch::default();
        for raw in self.features.unwrap_or_default() {
            match serde_json::from_value::<Feature>(raw) {
                Ok(feature) => match feature.into_event() {
                    Some(event) => batch.events.push(event),
                    None => batch.dropped_incomplete += 1,
                },
                Err(_) => batch.dropped_undecodable += 1,
            }
        }
        batch
    }
}

impl Feature {
    /// Returns `None` when the record lacks an id or a valid `[lon, lat]` pair.
    pub fn into_event(self) -> Option<SeismicEvent> {
        let id = self.id.filter(|id| !id.is_empty())?;
        let coordinates = self.geometry?.coordinates;
        let longitude = coordinates.first().copied().flatten()?;
        let latitude = coordinates.get(1).copied().flatten()?;
        if !Coordinate::new(latitude, longitude).is_valid() {
            return None;
        }
        let depth_km = coordinates.get(2).copied().flatten();

        Some(SeismicEvent {
            id: EventId(id),
            place: self.properties.place.unwrap_or_default(),
            magnitude: self.properties.mag,
            occurred_at_ms: self.properties.time.unwrap_or_default(),
            longitude,
            latitude,
            depth_km,
            detail_url: self.properties.url.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_payload_without_features() {
        let err = FeatureCollection::decode(br#"{"type":"FeatureCollection"}"#)
            .expect_err("should fail");
        assert!(matches!(err, FetchError::MalformedPayload(_)));

        let err = FeatureCollection::decode(br#"{"features":null}"#).expect_err("should fail");
        assert!(matches!(err, FetchError::MalformedPayload(_)));
    }

    #[test]
    fn rejects_non_json_payload() {
        let err = FeatureCollection::decode(b"<html>oops</html>").expect_err("should fail");
        assert!(matches!(err, FetchError::MalformedPayload(_)));
    }

    #[test]
    fn normalizes_features_and_drops_missing_geometry() {
        let body = br#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "id": "ak1",
                    "properties": {"mag": 3.1, "place": "Alaska", "time": 1700000000000, "url": "https://example.test/ak1"},
                    "geometry": {"type": "Point", "coordinates": [-150.1, 61.2, 35.4]}
                },
                {
                    "id": "nc2",
                    "properties": {"mag": null, "place": "California", "time": 1700000000001, "url": "https://example.test/nc2"},
                    "geometry": {"type": "Point", "coordinates": [-121.0, 36.5]}
                },
                {
                    "id": "nogeo",
                    "properties": {"mag": 5.0},
                    "geometry": null
                },
                {
                    "id": "short",
                    "properties": {"mag": 5.0},
                    "geometry": {"coordinates": [10.0]}
                },
                "not-an-object"
            ]
        }"#;

        let batch = FeatureCollection::decode(body).expect("decode").normalize();
        assert_eq!(batch.events.len(), 2);
        assert_eq!(batch.dropped_incomplete, 2);
        assert_eq!(batch.dropped_undecodable, 1);

        let first = &batch.events[0];
        assert_eq!(first.id.as_str(), "ak1");
        assert_eq!(first.magnitude, Some(3.1));
        assert_eq!(first.latitude, 61.2);
        assert_eq!(first.longitude, -150.1);
        assert_eq!(first.depth_km, Some(35.4));

        let second = &batch.events[1];
        assert_eq!(second.magnitude, None);
        assert_eq!(second.depth_km, None);
    }

    #[test]
    fn drops_features_with_out_of_range_latitude() {
        let body = br#"{
            "features": [
                {
                    "id": "odd",
                    "properties": {"mag": 3.0},
                    "geometry": {"coordinates": [10.0, 95.0, 3.0]}
                },
                {
                    "id": "pole",
                    "properties": {"mag": 3.0},
                    "geometry": {"coordinates": [10.0, -90.0, 3.0]}
                }
            ]
        }"#;

        let batch = FeatureCollection::decode(body).expect("decode").normalize();
        assert_eq!(batch.events.len(), 1);
        assert_eq!(batch.events[0].id.as_str(), "pole");
        assert_eq!(batch.dropped_incomplete, 1);
    }

    #[test]
    fn empty_features_array_is_valid() {
        let batch = FeatureCollection::decode(br#"{"features":[]}"#)
            .expect("decode")
            .normalize();
        assert!(batch.events.is_empty());
    }
}
