//! Password credential codec.
//!
//! Derives Argon2id hashes with a per-user random salt and serialises them
//! into a single self-describing credential string:
//!
//! ```text
//! $argon2id$v=19$m=1048576,t=5,p=4$<base64-salt>$<base64-hash>
//! ```
//!
//! Base64 uses the standard alphabet without padding. The cost parameters
//! travel inside the string, so [`verify`] always re-derives with whatever
//! parameters the credential was created under — existing credentials stay
//! verifiable if the constants below ever change.

use argon2::{Algorithm, Argon2, Params, Version};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD_NO_PAD as B64;
use rand_core::{OsRng, RngCore};
use subtle::ConstantTimeEq as _;
use thiserror::Error;

/// Salt length in bytes.
pub const SALT_LEN: usize = 128;
/// Derived hash length in bytes.
pub const HASH_LEN: usize = 512;
/// Argon2 time cost (iterations).
pub const TIME_COST: u32 = 5;
/// Argon2 memory cost in KiB (1 GiB).
pub const MEMORY_COST_KIB: u32 = 1024 * 1024;
/// Argon2 lane count.
pub const PARALLELISM: u32 = 4;

const VERSION: Version = Version::V0x13;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Failures of the credential codec.
///
/// `Malformed` means the *stored* credential is corrupt — callers must not
/// report it as a wrong password.
#[derive(Debug, Error)]
pub enum CredentialError {
  #[error("malformed credential string: {0}")]
  Malformed(&'static str),

  #[error("key derivation failed: {0}")]
  Derivation(argon2::Error),
}

// ─── Derivation ──────────────────────────────────────────────────────────────

/// Generate a fresh [`SALT_LEN`]-byte salt from the OS CSPRNG.
pub fn generate_salt() -> [u8; SALT_LEN] {
  let mut salt = [0u8; SALT_LEN];
  OsRng.fill_bytes(&mut salt);
  salt
}

/// Derive a [`HASH_LEN`]-byte Argon2id hash with the configured parameters.
pub fn derive(password: &str, salt: &[u8]) -> Result<Vec<u8>, CredentialError> {
  derive_with(
    password,
    salt,
    VERSION,
    MEMORY_COST_KIB,
    TIME_COST,
    PARALLELISM,
    HASH_LEN,
  )
}

fn derive_with(
  password: &str,
  salt: &[u8],
  version: Version,
  memory_cost_kib: u32,
  time_cost: u32,
  parallelism: u32,
  output_len: usize,
) -> Result<Vec<u8>, CredentialError> {
  let params = Params::new(memory_cost_kib, time_cost, parallelism, Some(output_len))
    .map_err(CredentialError::Derivation)?;
  let argon2 = Argon2::new(Algorithm::Argon2id, version, params);

  let mut out = vec![0u8; output_len];
  argon2
    .hash_password_into(password.as_bytes(), salt, &mut out)
    .map_err(CredentialError::Derivation)?;
  Ok(out)
}

// ─── Encoding ────────────────────────────────────────────────────────────────

/// Serialise a derived hash and its salt into the credential string format.
pub fn encode(hash: &[u8], salt: &[u8]) -> String {
  let b64_salt = B64.encode(salt);
  let b64_hash = B64.encode(hash);
  format!(
    "$argon2id$v={}$m={},t={},p={}${}${}",
    VERSION as u32,
    MEMORY_COST_KIB,
    TIME_COST,
    PARALLELISM,
    b64_salt,
    b64_hash,
  )
}

/// A parsed credential string.
#[derive(Debug, Clone)]
pub struct DecodedCredential {
  pub version:         Version,
  pub memory_cost_kib: u32,
  pub time_cost:       u32,
  pub parallelism:     u32,
  pub salt:            Vec<u8>,
  pub hash:            Vec<u8>,
}

/// Parse a credential string back into its hash, salt, and parameters.
pub fn decode(credential: &str) -> Result<DecodedCredential, CredentialError> {
  use CredentialError::Malformed;

  let fields: Vec<&str> = credential.split('$').collect();
  // Leading '$' yields an empty first field.
  if fields.len() != 6 || !fields[0].is_empty() {
    return Err(Malformed("expected 6 '$'-separated fields"));
  }
  if fields[1] != "argon2id" {
    return Err(Malformed("unsupported algorithm identifier"));
  }

  let version = match fields[2].strip_prefix("v=") {
    Some("16") => Version::V0x10,
    Some("19") => Version::V0x13,
    _ => return Err(Malformed("unrecognised version field")),
  };

  let (mut memory, mut time, mut lanes) = (None, None, None);
  for param in fields[3].split(',') {
    let (key, value) = param
      .split_once('=')
      .ok_or(Malformed("cost parameter is not key=value"))?;
    let value: u32 = value
      .parse()
      .map_err(|_| Malformed("cost parameter is not a number"))?;
    match key {
      "m" => memory = Some(value),
      "t" => time = Some(value),
      "p" => lanes = Some(value),
      _ => return Err(Malformed("unknown cost parameter")),
    }
  }
  let (memory_cost_kib, time_cost, parallelism) = match (memory, time, lanes) {
    (Some(m), Some(t), Some(p)) => (m, t, p),
    _ => return Err(Malformed("missing cost parameter")),
  };

  let salt = B64
    .decode(fields[4])
    .map_err(|_| Malformed("salt is not valid unpadded base64"))?;
  let hash = B64
    .decode(fields[5])
    .map_err(|_| Malformed("hash is not valid unpadded base64"))?;

  Ok(DecodedCredential {
    version,
    memory_cost_kib,
    time_cost,
    parallelism,
    salt,
    hash,
  })
}

// ─── Verification ────────────────────────────────────────────────────────────

/// Verify a plaintext password against a stored credential string.
///
/// Re-derives with the salt and cost parameters embedded in the credential
/// and compares in constant time. A credential that fails to parse is an
/// error, not a failed match.
pub fn verify(password: &str, credential: &str) -> Result<bool, CredentialError> {
  let decoded = decode(credential)?;
  let derived = derive_with(
    password,
    &decoded.salt,
    decoded.version,
    decoded.memory_cost_kib,
    decoded.time_cost,
    decoded.parallelism,
    decoded.hash.len(),
  )?;
  Ok(bool::from(decoded.hash.ct_eq(&derived)))
}

/// Salt, derive, and encode a new credential for `password`.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
  let salt = generate_salt();
  let hash = derive(password, &salt)?;
  Ok(encode(&hash, &salt))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
