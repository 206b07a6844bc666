//! One-shot load of the tectonic plate boundary overlay.
//!
//! The overlay never touches session state; a failed load only loses the
//! boundary lines.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::{info, warn};

pub async fn fetch_plate_boundaries(http: &Client, url: &str) -> Result<Value> {
    let boundaries: Value = http
        .get(url)
        .send()
        .await
        .with_context(|| format!("failed to request plate boundaries from {url}"))?
        .error_for_status()?
        .json()
        .await
        .context("plate boundaries are not valid JSON")?;

    if boundaries.get("features").and_then(Value::as_array).is_none() {
        return Err(anyhow!("plate boundaries response has no features array"));
    }
    Ok(boundaries)
}

/// Same as [`fetch_plate_boundaries`] but logs and swallows failures.
pub async fn load_plate_boundaries(http: &Client, url: &str) -> Option<Value> {
    match fetch_plate_boundaries(http, url).await {
        Ok(boundaries) => {
            let count = boundaries
                .get("features")
                .and_then(Value::as_array)
                .map_or(0, Vec::len);
            info!(count, "loaded tectonic plate boundaries");
            Some(boundaries)
        }
        Err(err) => {
            warn!("error loading tectonic plates: {err:#}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{http::StatusCode, routing::get, Router};
    use tokio::net::TcpListener;

    async fn spawn_plate_server() -> Result<String> {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = Router::new()
            .route(
                "/plates.json",
                get(|| async {
                    r#"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":{"type":"LineString","coordinates":[[0,0],[1,1]]}}]}"#
                }),
            )
            .route("/broken.json", get(|| async { (StatusCode::NOT_FOUND, "gone") }))
            .route("/empty.json", get(|| async { "{}" }));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(format!("http://{addr}"))
    }

    #[tokio::test]
    async fn loads_boundary_collection() {
        let base = spawn_plate_server().await.expect("spawn server");
        let boundaries = load_plate_boundaries(&Client::new(), &format!("{base}/plates.json"))
            .await
            .expect("boundaries");
        assert_eq!(boundaries["features"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn failures_are_swallowed() {
        let base = spawn_plate_server().await.expect("spawn server");
        let http = Client::new();
        assert!(load_plate_boundaries(&http, &format!("{base}/broken.json"))
            .await
            .is_none());
        assert!(fetch_plate_boundaries(&http, &format!("{base}/empty.json"))
            .await
            .is_err());
    }
}
