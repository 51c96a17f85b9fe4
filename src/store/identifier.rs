//! User id generation and validation
//!
//! Ids are 5 characters drawn uniformly from the 62 ASCII letters and
//! digits. A fresh id is retried until the store does not know it. The
//! retries are bounded: after `MAX_RANDOM_ATTEMPTS` random draws the
//! search walks forward from the last draw in base 62, and gives up with
//! `StoreError::IdentifierSpaceExhausted` after `MAX_FALLBACK_PROBES`.

use rand::distr::Alphanumeric;
use rand::Rng;
use tracing::{debug, warn};

use super::{StoreError, UserStore};

pub const IDENTIFIER_LEN: usize = 5;

pub const MAX_RANDOM_ATTEMPTS: usize = 1_000;

pub const MAX_FALLBACK_PROBES: usize = 100_000;

/// Base-62 digits in increment order
const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Why a typed id was rejected before any lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierProblem {
    NotAlphanumeric,
    WrongLength(usize),
}

impl std::fmt::Display for IdentifierProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentifierProblem::NotAlphanumeric => write!(
                f,
                "the user id must be {IDENTIFIER_LEN} letters or digits, you entered other characters"
            ),
            IdentifierProblem::WrongLength(len) => write!(
                f,
                "the user id must be {IDENTIFIER_LEN} letters or digits, you entered {len} characters"
            ),
        }
    }
}

/// Check the shape of a typed id
pub fn validate_identifier(identifier: &str) -> Result<(), IdentifierProblem> {
    if !identifier.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(IdentifierProblem::NotAlphanumeric);
    }
    let len = identifier.chars().count();
    if len != IDENTIFIER_LEN {
        return Err(IdentifierProblem::WrongLength(len));
    }
    Ok(())
}

pub fn is_well_formed(identifier: &str) -> bool {
    validate_identifier(identifier).is_ok()
}

/// Draw a random id
pub fn random_identifier<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..IDENTIFIER_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}

/// The id after `identifier` in base 62, wrapping from `zzzzz` to `00000`
pub fn next_identifier(identifier: &str) -> String {
    let mut digits: Vec<usize> = identifier
        .bytes()
        .map(|b| ALPHABET.iter().position(|a| *a == b).unwrap_or(0))
        .collect();

    for digit in digits.iter_mut().rev() {
        if *digit + 1 < ALPHABET.len() {
            *digit += 1;
            break;
        }
        *digit = 0;
    }

    digits.into_iter().map(|d| char::from(ALPHABET[d])).collect()
}

/// Produce an id the store does not hold yet
pub fn generate_unique<R: Rng + ?Sized>(
    store: &dyn UserStore,
    rng: &mut R,
) -> Result<String, StoreError> {
    let mut candidate = String::new();
    for attempt in 1..=MAX_RANDOM_ATTEMPTS {
        candidate = random_identifier(rng);
        if !store.contains(&candidate)? {
            debug!("Generated user id after {} attempt(s)", attempt);
            return Ok(candidate);
        }
    }

    warn!(
        "No free user id after {} random draws, probing sequentially",
        MAX_RANDOM_ATTEMPTS
    );
    for _ in 0..MAX_FALLBACK_PROBES {
        candidate = next_identifier(&candidate);
        if !store.contains(&candidate)? {
            return Ok(candidate);
        }
    }

    Err(StoreError::IdentifierSpaceExhausted {
        attempts: MAX_RANDOM_ATTEMPTS + MAX_FALLBACK_PROBES,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreRecord};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Reports the first `taken` lookups as existing rows
    struct CrowdedStore {
        taken: usize,
        lookups: AtomicUsize,
    }

    impl CrowdedStore {
        fn new(taken: usize) -> Self {
            Self {
                taken,
                lookups: AtomicUsize::new(0),
            }
        }
    }

    impl UserStore for CrowdedStore {
        fn name(&self) -> &str {
            "crowded"
        }

        fn find(&self, identifier: &str) -> Result<Option<StoreRecord>, StoreError> {
            let n = self.lookups.fetch_add(1, Ordering::SeqCst);
            if n < self.taken {
                Ok(Some(StoreRecord {
                    identifier: identifier.to_string(),
                    date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    answers: vec![],
                    total_score: 0,
                }))
            } else {
                Ok(None)
            }
        }

        fn append(&self, _record: &StoreRecord) -> Result<(), StoreError> {
            unreachable!()
        }

        fn update(&self, _identifier: &str, _record: &StoreRecord) -> Result<(), StoreError> {
            unreachable!()
        }

        fn delete(&self, _identifier: &str) -> Result<(), StoreError> {
            unreachable!()
        }
    }

    #[test]
    fn test_random_identifier_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            let id = random_identifier(&mut rng);
            assert_eq!(id.len(), IDENTIFIER_LEN);
            assert!(is_well_formed(&id), "{id}");
        }
    }

    #[test]
    fn test_validate_identifier() {
        assert_eq!(validate_identifier("aB3x9"), Ok(()));
        assert_eq!(
            validate_identifier("abc"),
            Err(IdentifierProblem::WrongLength(3))
        );
        assert_eq!(
            validate_identifier("abcdef"),
            Err(IdentifierProblem::WrongLength(6))
        );
        assert_eq!(
            validate_identifier("ab-de"),
            Err(IdentifierProblem::NotAlphanumeric)
        );
        assert_eq!(
            validate_identifier("abcdé"),
            Err(IdentifierProblem::NotAlphanumeric)
        );
    }

    #[test]
    fn test_next_identifier_carries() {
        assert_eq!(next_identifier("00000"), "00001");
        assert_eq!(next_identifier("0000z"), "00010");
        assert_eq!(next_identifier("a9zzz"), "aA000");
        assert_eq!(next_identifier("zzzzz"), "00000");
    }

    #[test]
    fn test_generated_id_is_not_in_store() {
        let store = MemoryStore::new();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let taken = random_identifier(&mut ChaCha8Rng::seed_from_u64(42));
        store
            .append(&StoreRecord {
                identifier: taken.clone(),
                date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                answers: vec![1],
                total_score: 1,
            })
            .unwrap();

        let id = generate_unique(&store, &mut rng).unwrap();
        assert_ne!(id, taken);
        assert!(is_well_formed(&id));
        assert!(store.find(&id).unwrap().is_none());
    }

    #[test]
    fn test_falls_back_to_sequential_probe() {
        let store = CrowdedStore::new(MAX_RANDOM_ATTEMPTS + 3);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let id = generate_unique(&store, &mut rng).unwrap();
        assert!(is_well_formed(&id));
        assert_eq!(
            store.lookups.load(Ordering::SeqCst),
            MAX_RANDOM_ATTEMPTS + 4
        );
    }

    #[test]
    fn test_gives_up_when_everything_is_taken() {
        let store = CrowdedStore::new(usize::MAX);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(
            generate_unique(&store, &mut rng),
            Err(StoreError::IdentifierSpaceExhausted { .. })
        ));
    }
}
