// Wraps the static file service so that a 404 never reaches the client
// directly. The wrapped service runs to completion first; if it answered 404,
// its response is dropped unread and the fallback answers instead.
//
// A file server only knows GET and HEAD, so a 405 to any other method is a
// miss as well.

use std::{
  convert::Infallible,
  future::Future,
  pin::Pin,
  task::{Context, Poll},
};

use axum::{
  BoxError,
  body::{Body, Bytes, HttpBody},
  http::{Method, Request, StatusCode},
  response::Response,
};
use tower::{Layer, Service, ServiceExt};

#[derive(Clone)]
pub struct Intercept404Layer<F> {
  on_404: F,
}

impl<F> Intercept404Layer<F> {
  pub fn new(on_404: F) -> Self {
    Self { on_404 }
  }
}

impl<S, F: Clone> Layer<S> for Intercept404Layer<F> {
  type Service = Intercept404<S, F>;

  fn layer(&self, inner: S) -> Self::Service {
    Intercept404::new(inner, self.on_404.clone())
  }
}

fn is_miss(method: &Method, status: StatusCode) -> bool {
  match status {
    StatusCode::NOT_FOUND => true,
    StatusCode::METHOD_NOT_ALLOWED => method != Method::GET && method != Method::HEAD,
    _ => false,
  }
}

/// Runs `inner`, and on a 404 replaces its whole response (status, headers,
/// body) with whatever `on_404` produces for the same request.
#[derive(Clone)]
pub struct Intercept404<S, F> {
  inner: S,
  on_404: F,
}

impl<S, F> Intercept404<S, F> {
  pub fn new(inner: S, on_404: F) -> Self {
    Self { inner, on_404 }
  }
}

impl<S, F, B, FB> Service<Request<Body>> for Intercept404<S, F>
where
  S: Service<Request<Body>, Response = Response<B>, Error = Infallible> + Clone + Send + 'static,
  S::Future: Send,
  F: Service<Request<Body>, Response = Response<FB>, Error = Infallible> + Clone + Send + 'static,
  F::Future: Send,
  B: HttpBody<Data = Bytes> + Send + 'static,
  B::Error: Into<BoxError>,
  FB: HttpBody<Data = Bytes> + Send + 'static,
  FB::Error: Into<BoxError>,
{
  type Response = Response;
  type Error = Infallible;
  type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

  fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
    // both services are driven to readiness per call through `oneshot`
    Poll::Ready(Ok(()))
  }

  fn call(&mut self, req: Request<Body>) -> Self::Future {
    let inner = self.inner.clone();
    let on_404 = self.on_404.clone();

    Box::pin(async move {
      let (parts, body) = req.into_parts();
      let fallback_parts = parts.clone();

      let res = inner.oneshot(Request::from_parts(parts, body)).await?;
      if !is_miss(&fallback_parts.method, res.status()) {
        return Ok(res.map(Body::new));
      }

      // the suppressed response is dropped without its body ever being polled
      drop(res);
      tracing::debug!("{} not found, handing over to fallback", fallback_parts.uri.path());

      let res = on_404
        .oneshot(Request::from_parts(fallback_parts, Body::empty()))
        .await?;
      Ok(res.map(Body::new))
    })
  }
}
