use crate::error::UpstreamError;
use bytes::Bytes;
use reqwest::RequestBuilder;
use tracing::{debug, info};

// Non-2xx answers are failures once the body has been logged
pub async fn fetch_body(request: RequestBuilder, upstream: &str) -> Result<Bytes, UpstreamError> {
    let resp = request.send().await?;
    let status = resp.status();
    info!(upstream, %status, "Upstream responded");

    let body = resp.bytes().await?;
    debug!(
        upstream,
        body = %String::from_utf8_lossy(&body),
        "Upstream response body"
    );

    if !status.is_success() {
        return Err(UpstreamError::Status(status));
    }
    Ok(body)
}
