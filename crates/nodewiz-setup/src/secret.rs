//! Secret key generation.

use rand_core::{OsRng, RngCore};

/// Characters a generated key is drawn from.
pub const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*(-_=+)";

pub const KEY_LEN: usize = 50;

/// A fresh key from the operating system's RNG.
pub fn generate() -> String { generate_with(&mut OsRng) }

/// A key drawn uniformly from [`ALPHABET`] using `rng`.
///
/// Bytes at or above the largest multiple of the alphabet size are discarded
/// so every character is equally likely.
pub fn generate_with<R: RngCore>(rng: &mut R) -> String {
  let limit = 256 - 256 % ALPHABET.len();
  let mut key = String::with_capacity(KEY_LEN);
  let mut buf = [0u8; 64];
  while key.len() < KEY_LEN {
    rng.fill_bytes(&mut buf);
    for &b in &buf {
      if usize::from(b) < limit && key.len() < KEY_LEN {
        key.push(char::from(ALPHABET[usize::from(b) % ALPHABET.len()]));
      }
    }
  }
  key
}

/// Shell command that installs `key` on a Heroku app. The alphabet contains
/// no single quote, so single-quoting is enough to stop shell expansion.
pub fn heroku_command(key: &str) -> String { format!("heroku config:set SECRET_KEY='{key}'") }

#[cfg(test)]
mod tests {
  use super::*;

  /// Yields 0, 1, 2, … wrapping at 256.
  struct Counter(u8);

  impl RngCore for Counter {
    fn next_u32(&mut self) -> u32 { u32::from(self.next_byte()) }

    fn next_u64(&mut self) -> u64 { u64::from(self.next_byte()) }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
      for b in dest {
        *b = self.next_byte();
      }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
      self.fill_bytes(dest);
      Ok(())
    }
  }

  impl Counter {
    fn next_byte(&mut self) -> u8 {
      let b = self.0;
      self.0 = self.0.wrapping_add(1);
      b
    }
  }

  #[test]
  fn alphabet_has_fifty_distinct_characters() {
    let mut chars = ALPHABET.to_vec();
    chars.sort_unstable();
    chars.dedup();
    assert_eq!(chars.len(), 50);
  }

  #[test]
  fn key_has_expected_length_and_charset() {
    let key = generate();
    assert_eq!(key.len(), KEY_LEN);
    assert!(key.bytes().all(|b| ALPHABET.contains(&b)));
  }

  #[test]
  fn deterministic_rng_walks_the_alphabet() {
    let key = generate_with(&mut Counter(0));
    assert_eq!(key.as_bytes(), ALPHABET);
  }

  #[test]
  fn biased_bytes_are_rejected() {
    // 250..=255 would favour the first six characters; they must be skipped.
    let key = generate_with(&mut Counter(250));
    assert!(key.starts_with("abcdef"));
    assert_eq!(key.len(), KEY_LEN);
  }

  #[test]
  fn keys_differ() {
    assert_ne!(generate(), generate());
  }

  #[test]
  fn heroku_line_is_single_quoted() {
    assert_eq!(heroku_command("a$b"), "heroku config:set SECRET_KEY='a$b'");
  }
}
