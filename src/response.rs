use axum::{
  body::Bytes,
  http::{StatusCode, header},
  response::IntoResponse,
};

// Error bodies are delivered under a 200 status on purpose; clients of the
// API read the text and never branch on the status code.
pub enum ApiErr {
  MissingParameter(&'static str),
  InvalidLength(String),
  LengthTooShort(String, usize),
  LengthTooLong(String, usize),
  InvalidUrl(String),
  Client(String),
  UpstreamStatus(String),
  UpstreamBody(String),
}

pub enum TextResponse {
  Text(String),
  Raw(Bytes),
  Err(ApiErr),
}

impl ApiErr {
  pub fn message(&self) -> String {
    match self {
      ApiErr::MissingParameter(name) => format!("no {} parameter provided", name),
      ApiErr::InvalidLength(raw) => format!("invalid length parameter: {}", raw),
      ApiErr::LengthTooShort(raw, min) => {
        format!("invalid length parameter: {} (minimum is {})", raw, min)
      }
      ApiErr::LengthTooLong(raw, max) => {
        format!("invalid length parameter: {} (maximum is {})", raw, max)
      }
      ApiErr::InvalidUrl(err) => format!("url get error: {}", err),
      ApiErr::Client(err) => format!("http client error: {}", err),
      ApiErr::UpstreamStatus(status) => format!("http status error: {}", status),
      ApiErr::UpstreamBody(err) => format!("http body error: {}", err),
    }
  }
}

impl IntoResponse for TextResponse {
  fn into_response(self) -> axum::response::Response {
    match self {
      TextResponse::Text(text) => text.into_response(),
      // passthrough bodies keep no content type of their own
      TextResponse::Raw(bytes) => {
        let mut response = (StatusCode::OK, bytes).into_response();
        response.headers_mut().remove(header::CONTENT_TYPE);
        response
      }
      TextResponse::Err(err) => {
        let message = err.message();
        tracing::debug!("api error: {}", message);
        message.into_response()
      }
    }
  }
}
