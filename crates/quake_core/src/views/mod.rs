//! Pure derivations over `(entities, threshold)` for the list and the map.
//!
//! Both views filter with [`MagnitudeThreshold::admits`] so they always agree
//! on which events are visible.
//!
//! [`MagnitudeThreshold::admits`]: shared::domain::MagnitudeThreshold::admits

pub mod magnitude_filter;
pub mod map_projection;
