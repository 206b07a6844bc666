//! Event-driven session state: the active range, threshold, fetch state and
//! selection, plus the map/list surfaces that render them.
//!
//! Each range change starts a new fetch generation. The previous fetch is
//! cancelled before the new one is spawned, and a completion is committed only
//! when its generation is still current, so a slow stale response can never
//! overwrite a fresh one.

use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};

use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde_json::Value;
use shared::{
    domain::{
        Coordinate, EventId, MagnitudeThreshold, SeismicEvent, SelectedCoordinate,
        TimeRangeSelector,
    },
    error::{FetchError, QueryError},
};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    config::Settings,
    fetcher::EventFetcher,
    query, selection,
    views::{magnitude_filter, map_projection, map_projection::Marker},
};

/// Rendering side of the map.
pub trait MapSurface {
    fn render_markers(&mut self, markers: &[Marker]);
    fn recenter_to(&mut self, coordinate: Coordinate, zoom: u8, duration_secs: f64);
    fn render_plate_boundaries(&mut self, _boundaries: &Value) {}
}

/// Rendering side of the event list.
pub trait ListSurface {
    fn render_list(&mut self, events: &[SeismicEvent]);
    fn render_status(&mut self, _status: Option<&StatusBanner>) {}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Loaded(Vec<SeismicEvent>),
    Failed(String),
}

impl FetchState {
    pub fn entities(&self) -> &[SeismicEvent] {
        match self {
            Self::Loaded(events) => events,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Overlay shown above the map while loading, after a failure, or when the
/// current filters leave nothing to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusBanner {
    Loading,
    Error(String),
    Empty,
}

impl StatusBanner {
    pub fn text(&self) -> &str {
        match self {
            Self::Loading => "Loading earthquakes...",
            Self::Error(_) => "Error loading data",
            Self::Empty => "No earthquakes found for this range",
        }
    }
}

#[derive(Debug)]
pub enum SessionCommand {
    ChangeRange(TimeRangeSelector),
    ChangeThreshold(MagnitudeThreshold),
    SelectEvent(EventId),
    PlateBoundariesLoaded(Value),
}

#[derive(Debug)]
pub struct FetchCompletion {
    pub generation: u64,
    pub range: TimeRangeSelector,
    pub outcome: Result<Vec<SeismicEvent>, FetchError>,
}

struct InFlightFetch {
    generation: u64,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

pub struct Session<M: MapSurface, L: ListSurface> {
    fetcher: Arc<dyn EventFetcher>,
    settings: Settings,
    range: TimeRangeSelector,
    threshold: MagnitudeThreshold,
    fetch_state: FetchState,
    generation: u64,
    in_flight: Option<InFlightFetch>,
    completions_tx: mpsc::UnboundedSender<FetchCompletion>,
    completions_rx: mpsc::UnboundedReceiver<FetchCompletion>,
    selected: Option<SelectedCoordinate>,
    selections: u64,
    recentered: Option<u64>,
    map: M,
    list: L,
}

impl<M: MapSurface, L: ListSurface> Session<M, L> {
    pub fn new(fetcher: Arc<dyn EventFetcher>, settings: Settings, map: M, list: L) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            fetcher,
            range: settings.default_range,
            threshold: settings.default_min_magnitude,
            settings,
            fetch_state: FetchState::Idle,
            generation: 0,
            in_flight: None,
            completions_tx,
            completions_rx,
            selected: None,
            selections: 0,
            recentered: None,
            map,
            list,
        }
    }

    pub fn handle(&mut self, command: SessionCommand) -> Result<(), QueryError> {
        match command {
            SessionCommand::ChangeRange(range) => self.change_range(range)?,
            SessionCommand::ChangeThreshold(threshold) => self.change_threshold(threshold),
            SessionCommand::SelectEvent(id) => {
                self.select(&id);
            }
            SessionCommand::PlateBoundariesLoaded(boundaries) => {
                self.map.render_plate_boundaries(&boundaries)
            }
        }
        Ok(())
    }

    pub fn change_range(&mut self, range: TimeRangeSelector) -> Result<(), QueryError> {
        self.change_range_at(range, Utc::now())
    }

    /// Starts a fetch for `range`, superseding any fetch still in flight.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn change_range_at(
        &mut self,
        range: TimeRangeSelector,
        now: DateTime<Utc>,
    ) -> Result<(), QueryError> {
        let query = query::build(range, now)?;

        self.cancel_in_flight();
        self.generation += 1;
        let generation = self.generation;
        self.range = range;
        self.fetch_state = FetchState::Loading;
        info!(generation, range = %range, "fetching earthquakes");

        let cancel = CancellationToken::new();
        let fetcher = self.fetcher.clone();
        let completions = self.completions_tx.clone();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            let outcome = AssertUnwindSafe(fetcher.fetch(&query, token))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| {
                    Err(FetchError::Transport(format!(
                        "fetch task panicked: {}",
                        panic_message(payload.as_ref())
                    )))
                });
            let _ = completions.send(FetchCompletion {
                generation,
                range,
                outcome,
            });
        });
        self.in_flight = Some(InFlightFetch {
            generation,
            cancel,
            task,
        });

        self.render();
        Ok(())
    }

    fn cancel_in_flight(&mut self) {
        if let Some(previous) = self.in_flight.take() {
            debug!(generation = previous.generation, "cancelling superseded fetch");
            previous.cancel.cancel();
            previous.task.abort();
        }
    }

    /// Waits for the next fetch completion, current or stale.
    pub async fn next_completion(&mut self) -> Option<FetchCompletion> {
        self.completions_rx.recv().await
    }

    /// Commits `completion` if it belongs to the current generation. Returns
    /// whether the session state changed.
    pub fn apply_completion(&mut self, completion: FetchCompletion) -> bool {
        if completion.generation != self.generation {
            debug!(
                generation = completion.generation,
                current = self.generation,
                "discarding superseded fetch result"
            );
            return false;
        }

        self.fetch_state = match completion.outcome {
            Err(FetchError::Cancelled) => {
                debug!(generation = completion.generation, "fetch cancelled");
                return false;
            }
            Ok(events) => {
                info!(
                    generation = completion.generation,
                    range = %completion.range,
                    count = events.len(),
                    "earthquakes loaded"
                );
                FetchState::Loaded(events)
            }
            Err(err) => {
                warn!(
                    generation = completion.generation,
                    range = %completion.range,
                    "error fetching earthquakes: {err}"
                );
                FetchState::Failed(err.to_string())
            }
        };
        self.in_flight = None;
        self.render();
        true
    }

    /// Drives completions until the current generation has committed.
    pub async fn settle(&mut self) {
        while self.fetch_state.is_loading() {
            let Some(completion) = self.next_completion().await else {
                return;
            };
            self.apply_completion(completion);
        }
    }

    /// Re-derives both views; never touches the network.
    pub fn change_threshold(&mut self, threshold: MagnitudeThreshold) {
        self.threshold = threshold;
        self.render();
    }

    /// Records a new selection and recenters the map on it. Unknown ids are
    /// ignored.
    pub fn select(&mut self, id: &EventId) -> Option<Coordinate> {
        let Some(coordinate) = selection::on_select(id, self.fetch_state.entities()) else {
            debug!(id = %id, "ignoring selection of unknown event");
            return None;
        };
        self.selections += 1;
        self.selected = Some(SelectedCoordinate {
            selection: self.selections,
            coordinate,
        });
        self.sync_recenter();
        Some(coordinate)
    }

    fn sync_recenter(&mut self) {
        let Some(selected) = self.selected else {
            return;
        };
        if self.recentered == Some(selected.selection) {
            return;
        }
        self.recentered = Some(selected.selection);
        self.map.recenter_to(
            selected.coordinate,
            self.settings.recenter_zoom,
            self.settings.recenter_duration_secs,
        );
    }

    fn render(&mut self) {
        let listed = self.list_view();
        let markers = self.map_view();
        let status = self.status_banner();
        self.list.render_list(&listed);
        self.list.render_status(status.as_ref());
        self.map.render_markers(&markers);
        self.sync_recenter();
    }

    pub fn list_view(&self) -> Vec<SeismicEvent> {
        magnitude_filter::derive(self.fetch_state.entities(), self.threshold)
    }

    pub fn map_view(&self) -> Vec<Marker> {
        map_projection::derive(self.fetch_state.entities(), self.threshold)
    }

    pub fn status_banner(&self) -> Option<StatusBanner> {
        match &self.fetch_state {
            FetchState::Idle => None,
            FetchState::Loading => Some(StatusBanner::Loading),
            FetchState::Failed(message) => Some(StatusBanner::Error(message.clone())),
            FetchState::Loaded(events) => {
                let any_visible = events.iter().any(|event| self.threshold.admits(event));
                (!any_visible).then_some(StatusBanner::Empty)
            }
        }
    }

    pub fn range(&self) -> TimeRangeSelector {
        self.range
    }

    pub fn threshold(&self) -> MagnitudeThreshold {
        self.threshold
    }

    pub fn fetch_state(&self) -> &FetchState {
        &self.fetch_state
    }

    pub fn entities(&self) -> &[SeismicEvent] {
        self.fetch_state.entities()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn selected(&self) -> Option<SelectedCoordinate> {
        self.selected
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn list(&self) -> &L {
        &self.list
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

impl<M: MapSurface, L: ListSurface> Drop for Session<M, L> {
    fn drop(&mut self) {
        self.cancel_in_flight();
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
