// Open Graph passthrough: fetch a remote page so the frontend can read its
// meta tags without tripping over CORS.

use axum::{
  body::Bytes,
  extract::{Query, State},
};
use reqwest::Url;

use crate::{
  AppState,
  api::QueryParams,
  response::{ApiErr, TextResponse},
};

fn body_too_large(max_body: usize) -> ApiErr {
  ApiErr::UpstreamBody(format!("response body exceeds {} bytes", max_body))
}

/// Fetches `raw_url` and returns its body, reading at most `max_body` bytes.
pub async fn fetch_remote(client: &reqwest::Client, raw_url: &str, max_body: usize) -> Result<Bytes, ApiErr> {
  let url = Url::parse(raw_url).map_err(|err| ApiErr::InvalidUrl(err.to_string()))?;

  tracing::debug!("fetching open graph source {}", url);
  let mut res = client
    .get(url)
    .send()
    .await
    .map_err(|err| ApiErr::Client(err.to_string()))?;

  let status = res.status();
  if !status.is_success() {
    return Err(ApiErr::UpstreamStatus(status.to_string()));
  }

  if res.content_length().is_some_and(|len| len > max_body as u64) {
    return Err(body_too_large(max_body));
  }

  let mut body = Vec::new();
  while let Some(chunk) = res
    .chunk()
    .await
    .map_err(|err| ApiErr::UpstreamBody(err.to_string()))?
  {
    if body.len() + chunk.len() > max_body {
      return Err(body_too_large(max_body));
    }
    body.extend_from_slice(&chunk);
  }

  Ok(Bytes::from(body))
}

pub async fn open_graph(State(state): State<AppState>, Query(query): Query<QueryParams>) -> TextResponse {
  let Some(raw_url) = query.first("url") else {
    return TextResponse::Err(ApiErr::MissingParameter("url"));
  };

  match fetch_remote(&state.http_client, raw_url, state.max_og_body_bytes).await {
    Ok(body) => TextResponse::Raw(body),
    Err(err) => TextResponse::Err(err),
  }
}
