//! Canonical company data produced by registry lookups
//!
//! Every successful lookup produces a fresh [`CompanyRecord`]; results from
//! different providers are never merged field by field.

use serde::{Deserialize, Serialize};

/// Structured company address
///
/// Geo fields default to the empty string when an upstream omits them; a
/// lookup is never failed solely for missing address parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub number: String,
    pub complement: String,
    pub district: String,
    pub municipality: String,
    pub state: String,
    pub postal_code: String,
}

impl Address {
    /// Compose the single-line form stored on the seller record
    ///
    /// Fixed format: street, number, district, municipality - state, CEP.
    /// The complement is kept on the structured record only.
    pub fn to_line(&self) -> String {
        format!(
            "{}, {}, {}, {} - {}, CEP {}",
            self.street, self.number, self.district, self.municipality, self.state, self.postal_code
        )
    }
}

/// Canonical resolved company data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// Registered legal name; always present on a successful lookup
    pub legal_name: String,

    /// Registered address
    pub address: Address,
}
