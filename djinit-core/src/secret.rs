//! Django `SECRET_KEY` generation.

use rand::{prelude::thread_rng, Rng};

pub const DEFAULT_KEY_LENGTH: usize = 50;
pub const DEFAULT_KEY_COUNT: usize = 3;

/// ASCII letters, digits and the punctuation Django's own generator uses.
const ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*(-_=+)";

/// One key of `length` characters drawn from the thread-local CSPRNG.
pub fn generate_secret_key(length: usize) -> String {
    let mut rng = thread_rng();
    (0..length)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
        .collect()
}

pub fn generate_secret_keys(count: usize, length: usize) -> Vec<String> {
    (0..count).map(|_| generate_secret_key(length)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_has_requested_length_and_alphabet() {
        let key = generate_secret_key(DEFAULT_KEY_LENGTH);
        assert_eq!(key.len(), 50);
        assert!(key.bytes().all(|b| ALPHABET.contains(&b)), "unexpected char in {key}");
    }

    #[test]
    fn zero_length_is_empty() {
        assert_eq!(generate_secret_key(0), "");
    }

    #[test]
    fn batch_keys_differ() {
        let keys = generate_secret_keys(DEFAULT_KEY_COUNT, 64);
        assert_eq!(keys.len(), 3);
        assert_ne!(keys[0], keys[1]);
        assert_ne!(keys[1], keys[2]);
    }
}
