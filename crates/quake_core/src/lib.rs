//! Earthquake data pipeline: query building, cancellable fetching, the list
//! and map derivations, and the session that keeps them in sync.

pub mod config;
pub mod fetcher;
pub mod plates;
pub mod query;
pub mod selection;
pub mod session;
pub mod views;

pub use config::{load_settings, Settings};
pub use fetcher::{EventFetcher, HttpEventFetcher};
pub use session::{
    FetchCompletion, FetchState, ListSurface, MapSurface, Session, SessionCommand, StatusBanner,
};
pub use views::map_projection::{MagnitudeClass, Marker, PopupData};
