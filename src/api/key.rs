use axum::extract::{Query, State};
use rand::{Rng, seq::SliceRandom};

use crate::{
  AppState,
  api::QueryParams,
  response::{ApiErr, TextResponse},
};

pub const DIGITS: &[u8] = b"0123456789";
pub const SPECIALS: &[u8] = b"~=+%^*!@#$";
const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Shortest key that still has room for one forced digit and one forced special.
pub const MIN_KEY_LENGTH: usize = 2;

fn pick<R: Rng + ?Sized>(rng: &mut R, set: &[u8]) -> u8 {
  set[rng.gen_range(0..set.len())]
}

/// Generates a random key of exactly `length` characters. Guarantees at least
/// one digit and one special symbol, at unpredictable positions.
///
/// `length` must be at least [`MIN_KEY_LENGTH`].
pub fn generate_key<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
  debug_assert!(length >= MIN_KEY_LENGTH);

  let alphabet: Vec<u8> = [LETTERS, DIGITS, SPECIALS].concat();
  let mut buf = Vec::with_capacity(length);
  buf.push(pick(rng, DIGITS));
  buf.push(pick(rng, SPECIALS));
  while buf.len() < length {
    buf.push(pick(rng, &alphabet));
  }
  buf.shuffle(rng);

  // every byte comes from an ASCII table
  buf.into_iter().map(char::from).collect()
}

fn parse_length(raw: &str, max: usize) -> Result<usize, ApiErr> {
  let length = raw
    .parse::<usize>()
    .map_err(|_| ApiErr::InvalidLength(raw.to_string()))?;

  if length < MIN_KEY_LENGTH {
    return Err(ApiErr::LengthTooShort(raw.to_string(), MIN_KEY_LENGTH));
  }
  if length > max {
    return Err(ApiErr::LengthTooLong(raw.to_string(), max));
  }

  Ok(length)
}

pub async fn generate(State(state): State<AppState>, Query(query): Query<QueryParams>) -> TextResponse {
  let Some(raw) = query.first("length") else {
    return TextResponse::Err(ApiErr::MissingParameter("length"));
  };

  let length = match parse_length(raw, state.max_key_length) {
    Ok(length) => length,
    Err(err) => return TextResponse::Err(err),
  };

  let mut rng = rand::thread_rng();
  TextResponse::Text(generate_key(&mut rng, length))
}
