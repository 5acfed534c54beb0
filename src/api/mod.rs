use axum::{Router, routing::get};
use serde::Deserialize;

use crate::AppState;

pub mod key;
pub mod og;

/// Raw query pairs in request order. Repeated keys are kept, lookups take the
/// first occurrence, so `?length=8&length=9` reads as `8`.
#[derive(Deserialize)]
#[serde(transparent)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
  /// First value for `name`, treating an empty value as absent.
  pub fn first(&self, name: &str) -> Option<&str> {
    self
      .0
      .iter()
      .find(|(key, _)| key == name)
      .map(|(_, value)| value.as_str())
      .filter(|value| !value.is_empty())
  }
}

pub fn router() -> Router<AppState> {
  Router::new()
    .route("/api/v1/key", get(key::generate))
    .route("/api/v1/og", get(og::open_graph))
}
