use std::{
  convert::Infallible,
  future::Future,
  path::PathBuf,
  pin::Pin,
  sync::Arc,
  task::{Context, Poll},
};

use axum::{
  body::Body,
  http::{HeaderMap, HeaderValue, Method, Request, StatusCode, header},
  response::{IntoResponse, Response},
};
use tower::{Service, ServiceExt};
use tower_http::services::ServeFile;

/// Serves the single-page app's root document for browser navigations.
///
/// Anything that doesn't ask for HTML (a missing script, stylesheet, image)
/// gets a plain 404 so asset loaders still see the failure.
#[derive(Clone)]
pub struct SpaFallback {
  root: Arc<PathBuf>,
  file: Arc<str>,
}

fn accepts_html(headers: &HeaderMap) -> bool {
  headers
    .get_all(header::ACCEPT)
    .iter()
    .filter_map(|value| value.to_str().ok())
    .any(|value| value.contains("text/html"))
}

impl SpaFallback {
  pub fn new(root: impl Into<PathBuf>, file: impl AsRef<str>) -> Self {
    Self {
      root: Arc::new(root.into()),
      file: Arc::from(file.as_ref()),
    }
  }

  fn missing_document(&self) -> Response {
    (StatusCode::NOT_FOUND, format!("{} not found", self.file)).into_response()
  }

  pub async fn serve(self, mut req: Request<Body>) -> Response {
    if !accepts_html(req.headers()) {
      return (StatusCode::NOT_FOUND, "404 not found").into_response();
    }

    let path = self.root.join(&*self.file);
    match tokio::fs::metadata(&path).await {
      Ok(meta) if meta.is_file() => {}
      Ok(_) => {
        tracing::warn!("SPA root document {} is not a regular file", path.display());
        return self.missing_document();
      }
      Err(err) => {
        tracing::warn!("SPA root document {} unavailable: {}", path.display(), err);
        return self.missing_document();
      }
    }

    // navigations arrive with any method; the document is served as for GET
    if req.method() != Method::HEAD {
      *req.method_mut() = Method::GET;
    }

    // ServeFile takes care of Last-Modified, If-Modified-Since and Range
    let mut res = ServeFile::new(&path)
      .oneshot(req)
      .await
      .unwrap_or_else(|never| match never {});

    if res.status() == StatusCode::NOT_FOUND {
      tracing::warn!("SPA root document {} disappeared while serving", path.display());
      return self.missing_document();
    }

    if res.status() != StatusCode::NOT_MODIFIED {
      res.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
      );
    }

    res.map(Body::new)
  }
}

impl Service<Request<Body>> for SpaFallback {
  type Response = Response;
  type Error = Infallible;
  type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

  fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
    Poll::Ready(Ok(()))
  }

  fn call(&mut self, req: Request<Body>) -> Self::Future {
    let this = self.clone();
    Box::pin(async move { Ok(this.serve(req).await) })
  }
}
