//! Session codes and pilot keys.
//!
//! Codes are three uppercase Latin letters. Pilots type them in by hand, so
//! input is normalized before any comparison.

use rand::Rng;
use sortie_util::SessionCode;
use std::collections::HashSet;
use tracing::warn;

pub const CODE_LENGTH: usize = 3;

/// Random draws before falling back to a digit-suffixed code
pub const MAX_CODE_ATTEMPTS: usize = 1000;

const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A random three-letter code
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// A code not present in `taken`, compared case-insensitively.
///
/// With only 26^3 letter codes available the draw can keep colliding; after
/// [`MAX_CODE_ATTEMPTS`] a digit is appended instead.
pub fn generate_unique_session_code<R: Rng + ?Sized>(rng: &mut R, taken: &[SessionCode]) -> SessionCode {
    let taken: HashSet<String> = taken.iter().map(|c| c.as_str().to_uppercase()).collect();

    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = generate_code(rng);
        if !taken.contains(&code) {
            return SessionCode::new(code);
        }
    }

    warn!(taken = taken.len(), "No free letter code found, using digit suffix");

    loop {
        let code = format!("{}{}", generate_code(rng), rng.random_range(0..10));
        if !taken.contains(&code) {
            return SessionCode::new(code);
        }
    }
}

/// Trim, uppercase, keep `A-Z` only, at most [`CODE_LENGTH`] characters
pub fn normalize_key(input: &str) -> String {
    input
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase())
        .take(CODE_LENGTH)
        .collect()
}

/// Result of checking a pilot's key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCheck {
    Valid,
    Invalid,
    /// Nothing usable was entered
    Empty,
}

/// Set of keys accepted for a session
#[derive(Debug, Clone, Default)]
pub struct ValidKeys {
    keys: HashSet<String>,
}

impl ValidKeys {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(|k| normalize_key(k.as_ref()))
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn check(&self, input: &str) -> KeyCheck {
        let key = normalize_key(input);
        if key.is_empty() {
            KeyCheck::Empty
        } else if self.keys.contains(&key) {
            KeyCheck::Valid
        } else {
            KeyCheck::Invalid
        }
    }

    /// Accepted keys starting with `prefix`, ignoring case, sorted.
    ///
    /// A prefix with nothing usable in it matches nothing.
    pub fn matching(&self, prefix: &str) -> Vec<&str> {
        let prefix = normalize_key(prefix);
        if prefix.is_empty() {
            return Vec::new();
        }

        let mut found: Vec<&str> = self
            .keys
            .iter()
            .filter(|k| k.starts_with(&prefix))
            .map(String::as_str)
            .collect();
        found.sort_unstable();
        found
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_generated_code_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let code = generate_code(&mut rng);
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_unique_code_avoids_taken() {
        let mut rng = StdRng::seed_from_u64(42);
        let taken: Vec<SessionCode> = (0..50).map(|_| SessionCode::new(generate_code(&mut rng))).collect();

        let mut rng = StdRng::seed_from_u64(42);
        let code = generate_unique_session_code(&mut rng, &taken);
        assert!(!taken.contains(&code));
        assert_eq!(code.as_str().len(), CODE_LENGTH);
    }

    #[test]
    fn test_unique_code_is_case_insensitive() {
        let mut peek = StdRng::seed_from_u64(3);
        let first = generate_code(&mut peek).to_lowercase();

        let mut rng = StdRng::seed_from_u64(3);
        let code = generate_unique_session_code(&mut rng, &[SessionCode::new(&first)]);
        assert_ne!(code.as_str(), first.to_uppercase());
    }

    #[test]
    fn test_exhausted_letter_space_falls_back_to_digit() {
        let mut all = Vec::with_capacity(26 * 26 * 26);
        for a in ALPHABET {
            for b in ALPHABET {
                for c in ALPHABET {
                    let code: String = [*a, *b, *c].iter().map(|&x| x as char).collect();
                    all.push(SessionCode::new(code));
                }
            }
        }

        let mut rng = StdRng::seed_from_u64(1);
        let code = generate_unique_session_code(&mut rng, &all);
        assert_eq!(code.as_str().len(), CODE_LENGTH + 1);
        assert!(code.as_str().chars().last().unwrap().is_ascii_digit());
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  abc "), "ABC");
        assert_eq!(normalize_key("a-b1c"), "ABC");
        assert_eq!(normalize_key("abcdef"), "ABC");
        assert_eq!(normalize_key("абв"), "");
        assert_eq!(normalize_key(""), "");
    }

    #[test]
    fn test_key_check() {
        let keys = ValidKeys::new(["abc", "DEF", ""]);
        assert_eq!(keys.len(), 2);

        assert_eq!(keys.check("abc"), KeyCheck::Valid);
        assert_eq!(keys.check(" def "), KeyCheck::Valid);
        assert_eq!(keys.check("XYZ"), KeyCheck::Invalid);
        assert_eq!(keys.check("   "), KeyCheck::Empty);
        assert_eq!(keys.check("123"), KeyCheck::Empty);
    }

    #[test]
    fn test_matching_prefix() {
        let keys = ValidKeys::new(["abc", "ABD", "xyz", "aXe"]);

        assert_eq!(keys.matching("ab"), vec!["ABC", "ABD"]);
        assert_eq!(keys.matching("a"), vec!["ABC", "ABD", "AXE"]);
        assert_eq!(keys.matching(" Xy"), vec!["XYZ"]);
        assert_eq!(keys.matching("abc"), vec!["ABC"]);
        assert!(keys.matching("q").is_empty());
    }

    #[test]
    fn test_matching_empty_prefix_matches_nothing() {
        let keys = ValidKeys::new(["abc", "def"]);
        assert!(keys.matching("").is_empty());
        assert!(keys.matching("   ").is_empty());
        assert!(keys.matching("12").is_empty());
    }
}
