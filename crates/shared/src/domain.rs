use std::{fmt, str::FromStr};

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{QueryError, ThresholdError};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(EventId);

/// Window of time a query covers.
///
/// `Decade` is part of the query grammar but only selectable from the
/// interface when the `decade-range` feature is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRangeSelector {
    Hour,
    #[default]
    Day,
    Week,
    Month,
    Year,
    Decade,
}

impl TimeRangeSelector {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::Decade => "decade",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Hour => "Last Hour",
            Self::Day => "Last Day",
            Self::Week => "Last 7 Days",
            Self::Month => "Last 30 Days",
            Self::Year => "Last Year",
            Self::Decade => "Last Decade",
        }
    }

    /// Selectors offered by the time range control, in display order.
    pub fn selectable() -> &'static [TimeRangeSelector] {
        #[cfg(feature = "decade-range")]
        {
            &[
                Self::Hour,
                Self::Day,
                Self::Week,
                Self::Month,
                Self::Year,
                Self::Decade,
            ]
        }
        #[cfg(not(feature = "decade-range"))]
        {
            &[Self::Hour, Self::Day, Self::Week, Self::Month, Self::Year]
        }
    }
}

impl fmt::Display for TimeRangeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRangeSelector {
    type Err = QueryError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_ascii_lowercase();
        Self::selectable()
            .iter()
            .copied()
            .find(|selector| selector.as_str() == wanted)
            .ok_or_else(|| QueryError::UnsupportedRange(raw.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
    }
}

/// A normalized earthquake record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeismicEvent {
    pub id: EventId,
    pub place: String,
    pub magnitude: Option<f64>,
    /// Milliseconds since the Unix epoch, as reported by the source.
    pub occurred_at_ms: i64,
    pub longitude: f64,
    pub latitude: f64,
    pub depth_km: Option<f64>,
    pub detail_url: String,
}

impl SeismicEvent {
    /// Magnitude used for filtering, sorting and sizing. Missing counts as zero.
    pub fn effective_magnitude(&self) -> f64 {
        self.magnitude.unwrap_or(0.0)
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.occurred_at_ms).single()
    }

    pub fn magnitude_label(&self) -> String {
        optional_label(self.magnitude)
    }

    pub fn depth_label(&self) -> String {
        optional_label(self.depth_km)
    }

    pub fn occurred_at_label(&self) -> String {
        self.occurred_at()
            .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_else(|| "N/A".to_string())
    }
}

fn optional_label(value: Option<f64>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "N/A".to_string(),
    }
}

/// Minimum magnitude shown by the list and map views.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct MagnitudeThreshold(f64);

impl MagnitudeThreshold {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 8.0;
    pub const STEP: f64 = 0.1;

    /// Clamps into `[MIN, MAX]` and snaps to the nearest step.
    pub fn new(value: f64) -> Result<Self, ThresholdError> {
        if !value.is_finite() {
            return Err(ThresholdError::NotFinite);
        }
        let clamped = value.clamp(Self::MIN, Self::MAX);
        let snapped = (clamped / Self::STEP).round() * Self::STEP;
        // Strip float noise introduced by the step multiplication (0.30000000000000004).
        let snapped = (snapped * 10.0).round() / 10.0;
        Ok(Self(snapped))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn admits(self, event: &SeismicEvent) -> bool {
        event.effective_magnitude() >= self.0
    }
}

impl TryFrom<f64> for MagnitudeThreshold {
    type Error = ThresholdError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MagnitudeThreshold> for f64 {
    fn from(value: MagnitudeThreshold) -> Self {
        value.0
    }
}

impl fmt::Display for MagnitudeThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// Recenter target chosen from the list. `selection` changes on every new
/// selection, so the map can react to identity rather than to value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectedCoordinate {
    pub selection: u64,
    pub coordinate: Coordinate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(magnitude: Option<f64>) -> SeismicEvent {
        SeismicEvent {
            id: EventId::from("us7000abcd"),
            place: "10 km SSW of Somewhere".to_string(),
            magnitude,
            occurred_at_ms: 1_700_000_000_000,
            longitude: -122.5,
            latitude: 37.75,
            depth_km: None,
            detail_url: "https://example.test/us7000abcd".to_string(),
        }
    }

    #[test]
    fn parses_selectable_ranges_case_insensitively() {
        assert_eq!(
            "Week".parse::<TimeRangeSelector>().expect("week"),
            TimeRangeSelector::Week
        );
        assert_eq!(
            " year ".parse::<TimeRangeSelector>().expect("year"),
            TimeRangeSelector::Year
        );
    }

    #[test]
    fn rejects_unknown_range() {
        let err = "fortnight"
            .parse::<TimeRangeSelector>()
            .expect_err("should fail");
        assert!(matches!(err, QueryError::UnsupportedRange(raw) if raw == "fortnight"));
    }

    #[cfg(not(feature = "decade-range"))]
    #[test]
    fn decade_is_not_selectable_without_feature() {
        assert!("decade".parse::<TimeRangeSelector>().is_err());
        assert!(!TimeRangeSelector::selectable().contains(&TimeRangeSelector::Decade));
    }

    #[cfg(feature = "decade-range")]
    #[test]
    fn decade_is_selectable_with_feature() {
        assert_eq!(
            "decade".parse::<TimeRangeSelector>().expect("decade"),
            TimeRangeSelector::Decade
        );
    }

    #[test]
    fn missing_magnitude_counts_as_zero_but_labels_na() {
        let quake = event(None);
        assert_eq!(quake.effective_magnitude(), 0.0);
        assert_eq!(quake.magnitude_label(), "N/A");
        assert_eq!(quake.depth_label(), "N/A");
        assert_eq!(event(Some(4.7)).magnitude_label(), "4.7");
    }

    #[test]
    fn threshold_clamps_and_snaps() {
        assert_eq!(MagnitudeThreshold::new(-1.0).expect("t").value(), 0.0);
        assert_eq!(MagnitudeThreshold::new(9.5).expect("t").value(), 8.0);
        assert_eq!(MagnitudeThreshold::new(0.3).expect("t").value(), 0.3);
        assert_eq!(MagnitudeThreshold::new(2.46).expect("t").value(), 2.5);
        assert!(MagnitudeThreshold::new(f64::NAN).is_err());
    }

    #[test]
    fn threshold_admits_missing_magnitude_only_at_zero() {
        let zero = MagnitudeThreshold::default();
        let low = MagnitudeThreshold::new(0.1).expect("t");
        assert!(zero.admits(&event(None)));
        assert!(!low.admits(&event(None)));
    }

    #[test]
    fn occurred_at_label_is_rfc3339_utc() {
        assert_eq!(event(None).occurred_at_label(), "2023-11-14T22:13:20Z");
    }
}
