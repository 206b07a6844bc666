//! Maps a time range selection to the remote request that serves it.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use shared::{domain::TimeRangeSelector, error::QueryError};
use url::Url;

use crate::config::Settings;

pub const SEARCH_RESULT_LIMIT: u32 = 5000;
pub const YEAR_MIN_MAGNITUDE: f64 = 2.5;
pub const DECADE_MIN_MAGNITUDE: f64 = 4.0;
const DECADE_YEARS: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedWindow {
    Hour,
    Day,
    Week,
    Month,
}

impl FeedWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub min_magnitude: f64,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Rolling "all events" summary feed.
    Feed(FeedWindow),
    /// Parameterized FDSN search, ordered by time.
    Search(SearchParams),
}

/// Builds the query for `selector` as of `now`.
pub fn build(selector: TimeRangeSelector, now: DateTime<Utc>) -> Result<Query, QueryError> {
    let today = now.date_naive();
    let query = match selector {
        TimeRangeSelector::Hour => Query::Feed(FeedWindow::Hour),
        TimeRangeSelector::Day => Query::Feed(FeedWindow::Day),
        TimeRangeSelector::Week => Query::Feed(FeedWindow::Week),
        TimeRangeSelector::Month => Query::Feed(FeedWindow::Month),
        TimeRangeSelector::Year => {
            let year = today.year() - 1;
            Query::Search(SearchParams {
                start: calendar_date(year, 1, 1, selector)?,
                end: calendar_date(year, 12, 31, selector)?,
                min_magnitude: YEAR_MIN_MAGNITUDE,
                limit: SEARCH_RESULT_LIMIT,
            })
        }
        TimeRangeSelector::Decade => Query::Search(SearchParams {
            start: calendar_date(today.year() - DECADE_YEARS, 1, 1, selector)?,
            end: today,
            min_magnitude: DECADE_MIN_MAGNITUDE,
            limit: SEARCH_RESULT_LIMIT,
        }),
    };
    Ok(query)
}

/// Parses an interface value and builds its query.
pub fn build_from_str(raw: &str, now: DateTime<Utc>) -> Result<Query, QueryError> {
    build(raw.parse()?, now)
}

fn calendar_date(
    year: i32,
    month: u32,
    day: u32,
    selector: TimeRangeSelector,
) -> Result<NaiveDate, QueryError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| QueryError::UnsupportedRange(format!("{selector} (year {year})")))
}

impl Query {
    pub fn url(&self, settings: &Settings) -> Result<Url, url::ParseError> {
        match self {
            Self::Feed(window) => Url::parse(&format!(
                "{}/all_{}.geojson",
                settings.feed_base_url.trim_end_matches('/'),
                window.as_str()
            )),
            Self::Search(params) => {
                let mut url = Url::parse(&settings.search_url)?;
                url.query_pairs_mut()
                    .clear()
                    .append_pair("format", "geojson")
                    .append_pair("starttime", &params.start.format("%Y-%m-%d").to_string())
                    .append_pair("endtime", &params.end.format("%Y-%m-%d").to_string())
                    .append_pair("minmagnitude", &params.min_magnitude.to_string())
                    .append_pair("orderby", "time")
                    .append_pair("limit", &params.limit.to_string());
                Ok(url)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
