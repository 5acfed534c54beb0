// Runtime configuration, read from the environment (and .env if present)

use std::{env, fmt, net::SocketAddr, path::PathBuf, time::Duration};

#[derive(Debug)]
pub enum ConfigError {
  InvalidNumber { key: &'static str, value: String },
  InvalidAddress { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::InvalidNumber { key, value } => {
        write!(f, "{} must be a non-negative integer, got \"{}\"", key, value)
      }
      ConfigError::InvalidAddress { key, value } => {
        write!(f, "{} must be a socket address (e.g. 0.0.0.0:3000), got \"{}\"", key, value)
      }
    }
  }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug)]
pub struct Config {
  pub listen_addr: SocketAddr,
  pub frontend_dir: PathBuf,
  pub index_file: String,
  pub og_fetch_timeout: Duration,
  pub max_key_length: usize,
  pub max_og_body_bytes: usize,
  pub cors_origin: Option<String>,
}

fn extract_from_env(key: &'static str, default: &'static str) -> String {
  match env::var(key) {
    Ok(val) => val,
    Err(_) => {
      tracing::warn!(
        "Environment variable {} not found, falling back to default \"{}\"",
        key,
        default
      );
      default.to_string()
    }
  }
}

impl Config {
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(extract_from_env)
  }

  /// Builds the config from any key lookup. `lookup` receives the variable
  /// name and its default and returns the value to use.
  pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
  where
    L: Fn(&'static str, &'static str) -> String,
  {
    let listen_addr_str = lookup("LISTEN_ADDR", "0.0.0.0:3000");
    let listen_addr = listen_addr_str
      .parse::<SocketAddr>()
      .map_err(|_| ConfigError::InvalidAddress {
        key: "LISTEN_ADDR",
        value: listen_addr_str.clone(),
      })?;

    let timeout_secs = parse_number("OG_FETCH_TIMEOUT_SECS", lookup("OG_FETCH_TIMEOUT_SECS", "10"))?;
    let max_key_length = parse_number("MAX_KEY_LENGTH", lookup("MAX_KEY_LENGTH", "4096"))?;
    let max_og_body_bytes =
      parse_number("MAX_OG_BODY_BYTES", lookup("MAX_OG_BODY_BYTES", "5242880"))?;

    let cors_origin = lookup("CORS_ORIGIN", "");

    Ok(Config {
      listen_addr,
      frontend_dir: PathBuf::from(lookup("FRONTEND_DIR", "public")),
      index_file: lookup("INDEX_FILE", "index.html"),
      og_fetch_timeout: Duration::from_secs(timeout_secs as u64),
      max_key_length,
      max_og_body_bytes,
      cors_origin: if cors_origin.is_empty() { None } else { Some(cors_origin) },
    })
  }
}

fn parse_number(key: &'static str, value: String) -> Result<usize, ConfigError> {
  let parsed = value.trim().parse::<usize>();
  parsed.map_err(|_| ConfigError::InvalidNumber { key, value })
}
