//! `encrypt` / `decrypt`: a reversible obfuscation, not real security.
//!
//! Token layout: `ENC:{salt}:{time}:{payload}` where `salt` is unpadded
//! base64url, `time` is milliseconds in base 36 and `payload` is standard
//! base64 of the masked UTF-8 bytes.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

use crate::error::RuntimeError;
use crate::Value;
use super::{Export, NamespaceInfo, NamespaceProvider, RuntimeState, arg, check_argc};

const PREFIX: &str = "ENC:";
const SECRET: &str = "SECRET_KEY_2024";
const SALT_LEN: usize = 26;

const STD_ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const URL_ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub struct CipherNamespace;

impl NamespaceInfo for CipherNamespace {
    fn name(&self) -> &'static str { "cipher" }

    fn exports(&self) -> Vec<Export> {
        vec![Export::function("encrypt"), Export::function("decrypt")]
    }
}

impl NamespaceProvider for CipherNamespace {
    fn call(
        &self,
        name: &str,
        args: &[Value],
        _state: &mut RuntimeState,
        line: usize,
    ) -> Result<Option<Value>, RuntimeError> {
        match name {
            "encrypt" => {
                check_argc(name, args, 1, line)?;
                Ok(Some(Value::Str(encrypt(&arg(args, 0).to_string()))))
            }
            "decrypt" => {
                check_argc(name, args, 1, line)?;
                let token = arg(args, 0).to_string();
                decrypt(&token)
                    .map(|s| Some(Value::Str(s)))
                    .map_err(|e| RuntimeError::raised(line, e.to_string()))
            }
            _ => Ok(None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CipherError {
    #[error("Invalid encrypted data format. Must start with \"ENC:\"")]
    MissingPrefix,
    #[error("Invalid encrypted data format")]
    Malformed,
}

pub fn encrypt(plain: &str) -> String {
    let mut rng = rand::thread_rng();
    let salt: String = (0..SALT_LEN).map(|_| BASE36[rng.gen_range(0..36)] as char).collect();
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64);
    encrypt_with(plain, &salt, millis)
}

/// Deterministic core of [`encrypt`].
pub fn encrypt_with(plain: &str, salt: &str, millis: u64) -> String {
    let time = to_base36(millis);
    let payload = mask(plain.as_bytes(), &key(salt, &time));
    format!(
        "{PREFIX}{}:{time}:{}",
        encode(salt.as_bytes(), URL_ALPHABET, false),
        encode(&payload, STD_ALPHABET, true),
    )
}

pub fn decrypt(token: &str) -> Result<String, CipherError> {
    let body = token.strip_prefix(PREFIX).ok_or(CipherError::MissingPrefix)?;
    let parts: Vec<&str> = body.split(':').collect();
    let [salt, time, payload] = parts.as_slice() else {
        return Err(CipherError::Malformed);
    };

    let salt = decode(salt, URL_ALPHABET).ok_or(CipherError::Malformed)?;
    let salt = String::from_utf8(salt).map_err(|_| CipherError::Malformed)?;
    // re-render the timestamp so a non-canonical spelling still yields the same key
    let time = to_base36(from_base36(time).ok_or(CipherError::Malformed)?);
    let payload = decode(payload, STD_ALPHABET).ok_or(CipherError::Malformed)?;

    String::from_utf8(mask(&payload, &key(&salt, &time))).map_err(|_| CipherError::Malformed)
}

fn key(salt: &str, time: &str) -> Vec<u8> {
    format!("{salt}{time}{SECRET}").into_bytes()
}

/// XOR with the rotating key and a position mask. Its own inverse.
fn mask(bytes: &[u8], key: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .enumerate()
        .map(|(i, b)| b ^ key[i % key.len()] ^ ((i * 7 + 13) & 0xff) as u8)
        .collect()
}

// ─── Encodings ────────────────────────────────────────────────────────────────

fn encode(bytes: &[u8], alphabet: &[u8; 64], pad: bool) -> String {
    let mut out = String::with_capacity(bytes.len().div_ceil(3) * 4);
    for chunk in bytes.chunks(3) {
        let b = [chunk[0], *chunk.get(1).unwrap_or(&0), *chunk.get(2).unwrap_or(&0)];
        let n = (u32::from(b[0]) << 16) | (u32::from(b[1]) << 8) | u32::from(b[2]);
        let sextets = [(n >> 18) & 63, (n >> 12) & 63, (n >> 6) & 63, n & 63];
        for (i, s) in sextets.iter().enumerate() {
            if i <= chunk.len() {
                out.push(alphabet[*s as usize] as char);
            } else if pad {
                out.push('=');
            }
        }
    }
    out
}

/// Accepts padded or unpadded input.
fn decode(text: &str, alphabet: &[u8; 64]) -> Option<Vec<u8>> {
    let digits: Vec<u8> = text
        .trim_end_matches('=')
        .bytes()
        .map(|c| alphabet.iter().position(|&a| a == c).map(|p| p as u8))
        .collect::<Option<_>>()?;
    if digits.len() % 4 == 1 {
        return None;
    }

    let mut out = Vec::with_capacity(digits.len() * 3 / 4);
    for chunk in digits.chunks(4) {
        let mut n = 0u32;
        for (i, d) in chunk.iter().enumerate() {
            n |= u32::from(*d) << (18 - 6 * i);
        }
        let bytes = [(n >> 16) as u8, (n >> 8) as u8, n as u8];
        out.extend_from_slice(&bytes[..chunk.len() - 1]);
    }
    Some(out)
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".into();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.iter().rev().map(|&d| d as char).collect()
}

fn from_base36(s: &str) -> Option<u64> {
    if s.is_empty() {
        return None;
    }
    u64::from_str_radix(s, 36).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::error::RuntimeErrorKind;

    #[test]
    fn round_trips_representative_values() {
        for v in [
            Value::str(""),
            Value::str("hello"),
            Value::str("a-b_c"),
            Value::Number(0.0),
            Value::Number(42.0),
            Value::Number(-7.0),
            Value::Number(3.14),
        ] {
            let plain = v.to_string();
            assert_eq!(decrypt(&encrypt(&plain)).as_deref(), Ok(plain.as_str()));
        }
    }

    #[test]
    fn salted_tokens_differ_but_both_decrypt() {
        let a = encrypt("same");
        let b = encrypt("same");
        assert_ne!(a, b);
        assert_eq!(decrypt(&a).as_deref(), Ok("same"));
        assert_eq!(decrypt(&b).as_deref(), Ok("same"));
    }

    #[test]
    fn token_layout() {
        let token = encrypt_with("hi", "abc", 35);
        assert_eq!(token, format!("ENC:YWJj:z:{}", encode(&mask(b"hi", b"abczSECRET_KEY_2024"), STD_ALPHABET, true)));
        assert!(!token["ENC:".len()..].split(':').next().unwrap_or("").contains('='));
    }

    #[test]
    fn non_ascii_round_trip() {
        let token = encrypt_with("héllo ✓", "s4lt", 1_700_000_000_000);
        assert_eq!(decrypt(&token).as_deref(), Ok("héllo ✓"));
    }

    #[test]
    fn malformed_tokens() {
        assert_eq!(decrypt("hello"), Err(CipherError::MissingPrefix));
        assert_eq!(decrypt("ENC:a:b"), Err(CipherError::Malformed));
        assert_eq!(decrypt("ENC:YWJj:z:@@@@"), Err(CipherError::Malformed));
        assert_eq!(decrypt("ENC:YWJj::AAAA"), Err(CipherError::Malformed));
    }

    #[test]
    fn decrypt_error_surfaces_as_raised() {
        let mut st = RuntimeState::new(&EngineConfig::default(), (0.0, 0.0));
        let err = CipherNamespace.call("decrypt", &[Value::str("nope")], &mut st, 9).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::Raised);
        assert_eq!(err.line, 9);
        assert_eq!(err.message, "Invalid encrypted data format. Must start with \"ENC:\"");
    }

    #[test]
    fn base64_matches_known_vectors() {
        assert_eq!(encode(b"", STD_ALPHABET, true), "");
        assert_eq!(encode(b"f", STD_ALPHABET, true), "Zg==");
        assert_eq!(encode(b"fo", STD_ALPHABET, true), "Zm8=");
        assert_eq!(encode(b"foobar", STD_ALPHABET, true), "Zm9vYmFy");
        assert_eq!(decode("Zm8=", STD_ALPHABET), Some(b"fo".to_vec()));
        assert_eq!(decode("Zg", STD_ALPHABET), Some(b"f".to_vec()));
    }

    #[test]
    fn base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(from_base36("10"), Some(36));
    }
}
