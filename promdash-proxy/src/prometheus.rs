use crate::config::Mode;
use crate::error::{ApiError, UpstreamError};
use crate::state::AppState;
use crate::upstream::fetch_body;
use axum::{
    extract::{Query, State},
    Json,
};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// One labelled point of an instant vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub metric: BTreeMap<String, String>,
    /// `[timestamp, value]`, relayed without interpretation.
    pub value: (Value, Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorData {
    #[serde(rename = "resultType")]
    pub result_type: String,
    pub result: Vec<MetricSample>,
}

/// Thanos Query adds an optional `analysis` object next to the usual fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedVectorData {
    #[serde(flatten)]
    pub vector: VectorData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse<D> {
    pub status: String,
    pub data: D,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// A decoded query response. Which variant is produced depends on the configured [`Mode`];
/// both serialize to the upstream wire shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    Prometheus(QueryResponse<VectorData>),
    Thanos(QueryResponse<AnalyzedVectorData>),
}

impl QueryResult {
    /// Standard mode ignores any `analysis` field the upstream sends.
    pub fn decode(body: &[u8], mode: Mode) -> Result<Self, serde_json::Error> {
        Ok(match mode {
            Mode::Prometheus => QueryResult::Prometheus(serde_json::from_slice(body)?),
            Mode::Thanos => QueryResult::Thanos(serde_json::from_slice(body)?),
        })
    }

    pub fn status(&self) -> &str {
        match self {
            QueryResult::Prometheus(r) => &r.status,
            QueryResult::Thanos(r) => &r.status,
        }
    }

    pub fn samples(&self) -> &[MetricSample] {
        match self {
            QueryResult::Prometheus(r) => &r.data.result,
            QueryResult::Thanos(r) => &r.data.vector.result,
        }
    }

    pub fn analysis(&self) -> Option<&Map<String, Value>> {
        match self {
            QueryResult::Prometheus(_) => None,
            QueryResult::Thanos(r) => r.data.analysis.as_ref(),
        }
    }
}

/// Runs one instant query against `endpoint`. The query text is sent as-is (URL-encoded);
/// the upstream decides whether it is valid.
pub async fn execute_query(
    client: &Client,
    endpoint: &Url,
    query: &str,
    mode: Mode,
) -> Result<QueryResult, UpstreamError> {
    let request = client.get(endpoint.clone()).query(&[("query", query)]);
    let body = fetch_body(request, "prometheus").await?;
    let result = QueryResult::decode(&body, mode)?;
    debug!(
        status = result.status(),
        samples = result.samples().len(),
        has_analysis = result.analysis().is_some(),
        ?mode,
        "Decoded query result"
    );
    Ok(result)
}

// First `query` value wins when the parameter repeats
fn first_query_param(params: &[(String, String)]) -> Option<&str> {
    params
        .iter()
        .find(|(key, _)| key == "query")
        .map(|(_, value)| value.as_str())
}

pub async fn query_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<QueryResult>, ApiError> {
    let query = first_query_param(&params)
        .filter(|q| !q.is_empty())
        .ok_or(ApiError::MissingQuery)?;

    let result = execute_query(&state.client, &state.prometheus_url, query, state.mode)
        .await
        .map_err(ApiError::Prometheus)?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{spawn_upstream, unreachable_url};
    use axum::{http::StatusCode, routing::get, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    async fn spawn_prometheus(status: StatusCode, body: Value) -> (Url, Arc<Mutex<Option<String>>>) {
        let received: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
        let rec = received.clone();

        let app = Router::new().route(
            "/api/v1/query",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let rec = rec.clone();
                let body = body.clone();
                async move {
                    *rec.lock().await = params.get("query").cloned();
                    (status, Json(body))
                }
            }),
        );

        let base = spawn_upstream(app).await;
        (base.join("api/v1/query").expect("join"), received)
    }

    fn vector_body() -> Value {
        json!({
            "status": "success",
            "data": {
                "resultType": "vector",
                "result": [
                    {
                        "metric": { "__name__": "up", "job": "node" },
                        "value": [1700000000.123, "1"]
                    }
                ]
            }
        })
    }

    fn thanos_body() -> Value {
        let mut body = vector_body();
        body["data"]["analysis"] = json!({ "name": "[noArgFunction]", "executionTime": "1.2ms" });
        body
    }

    #[tokio::test]
    async fn standard_mode_never_emits_analysis() {
        let (url, _rec) = spawn_prometheus(StatusCode::OK, thanos_body()).await;
        let client = Client::new();

        let result = execute_query(&client, &url, "up", Mode::Prometheus)
            .await
            .expect("query");
        assert!(matches!(result, QueryResult::Prometheus(_)));
        assert!(result.analysis().is_none());

        let out = serde_json::to_value(&result).unwrap();
        assert!(out["data"].get("analysis").is_none());
        assert_eq!(out["status"], "success");
        assert_eq!(out["data"]["resultType"], "vector");
        assert_eq!(out["data"]["result"][0]["value"], json!([1700000000.123, "1"]));
        assert_eq!(out["data"]["result"][0]["metric"]["job"], "node");
    }

    #[tokio::test]
    async fn thanos_mode_keeps_analysis() {
        let (url, _rec) = spawn_prometheus(StatusCode::OK, thanos_body()).await;
        let client = Client::new();

        let result = execute_query(&client, &url, "up", Mode::Thanos)
            .await
            .expect("query");
        assert!(matches!(result, QueryResult::Thanos(_)));
        assert_eq!(result.samples().len(), 1);

        let out = serde_json::to_value(&result).unwrap();
        assert_eq!(out["data"]["analysis"]["name"], "[noArgFunction]");
        assert_eq!(out["data"]["result"][0]["metric"]["__name__"], "up");
    }

    #[tokio::test]
    async fn thanos_mode_omits_absent_analysis() {
        let (url, _rec) = spawn_prometheus(StatusCode::OK, vector_body()).await;
        let client = Client::new();

        let result = execute_query(&client, &url, "up", Mode::Thanos)
            .await
            .expect("query");
        let out = serde_json::to_value(&result).unwrap();
        let data = out["data"].as_object().expect("data object");
        assert!(
            !data.contains_key("analysis"),
            "absent analysis must not be serialized: {}",
            out
        );
    }

    #[test]
    fn null_analysis_is_treated_as_absent() {
        let mut body = vector_body();
        body["data"]["analysis"] = Value::Null;
        let bytes = serde_json::to_vec(&body).unwrap();

        let result = QueryResult::decode(&bytes, Mode::Thanos).expect("decode");
        assert!(result.analysis().is_none());
        let out = serde_json::to_value(&result).unwrap();
        assert!(out["data"].get("analysis").is_none());
    }

    #[test]
    fn warnings_are_relayed_when_present() {
        let mut body = vector_body();
        body["warnings"] = json!(["partial response"]);
        let bytes = serde_json::to_vec(&body).unwrap();

        let result = QueryResult::decode(&bytes, Mode::Prometheus).expect("decode");
        let out = serde_json::to_value(&result).unwrap();
        assert_eq!(out["warnings"], json!(["partial response"]));

        let bytes = serde_json::to_vec(&vector_body()).unwrap();
        let result = QueryResult::decode(&bytes, Mode::Prometheus).expect("decode");
        let out = serde_json::to_value(&result).unwrap();
        assert!(out.get("warnings").is_none());
    }

    #[tokio::test]
    async fn query_text_reaches_upstream_verbatim() {
        let (url, rec) = spawn_prometheus(StatusCode::OK, vector_body()).await;
        let client = Client::new();
        let query = r#"sum(rate(http_requests_total{code="500"}[5m])) by (job) & x"#;

        execute_query(&client, &url, query, Mode::Prometheus)
            .await
            .expect("query");

        let received = rec.lock().await;
        assert_eq!(received.as_deref(), Some(query));
    }

    #[tokio::test]
    async fn non_success_status_is_an_upstream_failure() {
        let error_body = json!({
            "status": "error",
            "errorType": "bad_data",
            "error": "parse error"
        });
        let (url, _rec) = spawn_prometheus(StatusCode::BAD_REQUEST, error_body).await;
        let client = Client::new();

        let err = execute_query(&client, &url, "up{", Mode::Prometheus)
            .await
            .unwrap_err();
        match err {
            UpstreamError::Status(s) => assert_eq!(s, StatusCode::BAD_REQUEST),
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn schema_mismatch_is_an_upstream_failure() {
        let (url, _rec) = spawn_prometheus(StatusCode::OK, json!(["not", "a", "response"])).await;
        let client = Client::new();

        let err = execute_query(&client, &url, "up", Mode::Thanos)
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Decode(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn unreachable_upstream_is_an_upstream_failure() {
        let url = unreachable_url("/api/v1/query");
        let client = Client::new();

        let err = execute_query(&client, &url, "up", Mode::Prometheus)
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Transport(_)), "got {:?}", err);
    }
}
