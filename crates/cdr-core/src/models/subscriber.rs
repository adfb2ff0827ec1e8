//! Subscriber identity model

use serde::{Deserialize, Serialize};

/// A subscriber known to the record store
///
/// The normalized (digits-only) `msisdn` is the canonical identity.
/// CDRs reference subscribers by value through this string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subscriber {
    /// Store-assigned identifier (0 until persisted)
    pub id: i64,

    /// Subscriber phone number, digits only
    pub msisdn: String,
}

impl Subscriber {
    /// Create an unsaved subscriber, normalizing the number
    pub fn new(msisdn: &str) -> Self {
        Self {
            id: 0,
            msisdn: normalize_msisdn(msisdn),
        }
    }
}

/// Strip every non-digit character from an MSISDN
///
/// `+7 (999) 111-22-33` becomes `79991112233`.
pub fn normalize_msisdn(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}
