use crate::error::{ApiError, UpstreamError};
use crate::state::AppState;
use crate::upstream::fetch_body;
use axum::{extract::State, Json};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// The part of an Alertmanager v2 alert we look at. Everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertRecord {
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl AlertRecord {
    pub fn severity(&self) -> Option<&str> {
        self.labels
            .get("severity")
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

pub type SeverityHistogram = BTreeMap<String, u64>;

/// Counts alerts per severity. Alerts without a severity are dropped, not bucketed.
pub fn severity_histogram<'a, I>(alerts: I) -> SeverityHistogram
where
    I: IntoIterator<Item = &'a AlertRecord>,
{
    let mut counts = SeverityHistogram::new();
    for severity in alerts.into_iter().filter_map(AlertRecord::severity) {
        *counts.entry(severity.to_string()).or_insert(0) += 1;
    }
    counts
}

pub async fn fetch_alerts(client: &Client, endpoint: &Url) -> Result<Vec<AlertRecord>, UpstreamError> {
    let body = fetch_body(client.get(endpoint.clone()), "alertmanager").await?;
    Ok(serde_json::from_slice(&body)?)
}

// Any failure aborts the whole aggregation; there is no partial histogram
pub async fn aggregate_alerts(
    client: &Client,
    endpoint: &Url,
) -> Result<SeverityHistogram, UpstreamError> {
    let alerts = fetch_alerts(client, endpoint).await?;
    let histogram = severity_histogram(&alerts);
    debug!(
        alerts = alerts.len(),
        severities = histogram.len(),
        "Aggregated alerts by severity"
    );
    Ok(histogram)
}

pub async fn alerts_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SeverityHistogram>, ApiError> {
    let histogram = aggregate_alerts(&state.client, &state.alertmanager_url)
        .await
        .map_err(ApiError::Alertmanager)?;
    Ok(Json(histogram))
}
