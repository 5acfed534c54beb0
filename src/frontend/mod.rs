// This serves static content so we can deliver the frontend

use std::path::PathBuf;

use axum::Router;
use tower::Layer;
use tower_http::services::ServeDir;

use crate::AppState;

pub mod intercept;
pub mod spa;

pub use intercept::{Intercept404, Intercept404Layer};
pub use spa::SpaFallback;

/// Static assets from `frontend_dir`; any miss is handed to the SPA fallback.
pub fn router(frontend_dir: PathBuf, index_file: &str) -> Router<AppState> {
  let spa = SpaFallback::new(frontend_dir.clone(), index_file);
  let assets = Intercept404Layer::new(spa).layer(ServeDir::new(frontend_dir));

  Router::new().fallback_service(assets)
}

#[cfg(test)]
mod tests {
  use std::{
    convert::Infallible,
    sync::{
      Arc,
      atomic::{AtomicUsize, Ordering},
    },
  };

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::{IntoResponse, Response},
  };
  use tower::{ServiceExt, service_fn};

  use super::*;

  const INDEX: &str = "<!doctype html><div id=\"app\"></div>";
  const SCRIPT: &str = "console.log('hello')";

  fn asset_root() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), INDEX).unwrap();
    std::fs::create_dir(dir.path().join("js")).unwrap();
    std::fs::write(dir.path().join("js/index.js"), SCRIPT).unwrap();
    dir
  }

  fn request(path: &str, accept: &str) -> Request<Body> {
    Request::builder()
      .uri(path)
      .header(header::ACCEPT, accept)
      .body(Body::empty())
      .unwrap()
  }

  async fn body_string(res: Response) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
  }

  #[tokio::test]
  async fn unknown_route_with_html_accept_gets_root_document() {
    let dir = asset_root();
    let app = router(dir.path().to_path_buf(), "index.html").with_state(crate::tests::state());

    let res = app
      .oneshot(request("/dashboard/settings", "text/html,*/*;q=0.8"))
      .await
      .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "text/html; charset=utf-8");
    assert_eq!(body_string(res).await, INDEX);
  }

  #[tokio::test]
  async fn unknown_asset_without_html_accept_is_plain_404() {
    let dir = asset_root();
    let app = router(dir.path().to_path_buf(), "index.html").with_state(crate::tests::state());

    let res = app
      .oneshot(request("/js/missing.js", "application/javascript"))
      .await
      .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_string(res).await, "404 not found");
  }

  #[tokio::test]
  async fn existing_assets_never_reach_the_fallback() {
    let dir = asset_root();
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = calls.clone();
    let fallback = service_fn(move |_req: Request<Body>| {
      counted.fetch_add(1, Ordering::SeqCst);
      async { Ok::<_, Infallible>(StatusCode::IM_A_TEAPOT.into_response()) }
    });
    let service = Intercept404::new(ServeDir::new(dir.path()), fallback);

    for accept in ["text/html", "application/javascript", "*/*"] {
      let res = service
        .clone()
        .oneshot(request("/js/index.js", accept))
        .await
        .unwrap();
      assert_eq!(res.status(), StatusCode::OK);
      assert_eq!(body_string(res).await, SCRIPT);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn directory_root_serves_index_directly() {
    let dir = asset_root();
    let app = router(dir.path().to_path_buf(), "index.html").with_state(crate::tests::state());

    let res = app.oneshot(request("/", "application/json")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_string(res).await, INDEX);
  }
}
