//! CNPJ parsing and structural validation
//!
//! A CNPJ is the 14-digit Brazilian business registry number. The last two
//! digits are check digits computed over the preceding digits with weights
//! cycling 2..9 from the right, one pass per check digit. Validation happens
//! entirely locally; invalid identifiers are rejected before any network call.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Errors from CNPJ structural validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CnpjError {
    /// Wrong number of digits after stripping formatting characters
    #[error("CNPJ must have exactly 14 digits, got {0}")]
    WrongLength(usize),

    /// Sequences like `11111111111111` pass the checksum arithmetic but are
    /// not assignable registry numbers
    #[error("CNPJ with all identical digits is invalid")]
    RepeatedDigits,

    /// One or both check digits do not match the computed values
    #[error("CNPJ check digits do not match")]
    CheckDigitMismatch,
}

/// A validated 14-digit CNPJ
///
/// Stored as the bare digit string; use [`Cnpj::formatted`] for the
/// `00.000.000/0000-00` rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Cnpj(String);

impl Cnpj {
    /// Parse and validate a CNPJ from arbitrary input
    ///
    /// Non-digit characters (dots, slashes, dashes, whitespace) are stripped
    /// before validation, so both `11222333000181` and `11.222.333/0001-81`
    /// are accepted.
    pub fn parse(input: &str) -> Result<Self, CnpjError> {
        let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();

        if digits.len() != 14 {
            return Err(CnpjError::WrongLength(digits.len()));
        }

        let first = digits.as_bytes()[0];
        if digits.bytes().all(|b| b == first) {
            return Err(CnpjError::RepeatedDigits);
        }

        let values: Vec<u32> = digits
            .chars()
            .map(|c| c.to_digit(10).expect("digits only"))
            .collect();

        if check_digit(&values[..12]) != values[12] || check_digit(&values[..13]) != values[13] {
            return Err(CnpjError::CheckDigitMismatch);
        }

        Ok(Self(digits))
    }

    /// The bare 14-digit string
    pub fn digits(&self) -> &str {
        &self.0
    }

    /// Formatted as `00.000.000/0000-00`
    pub fn formatted(&self) -> String {
        let d = &self.0;
        format!(
            "{}.{}.{}/{}-{}",
            &d[0..2],
            &d[2..5],
            &d[5..8],
            &d[8..12],
            &d[12..14]
        )
    }
}

impl fmt::Display for Cnpj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute one check digit over the given digit prefix
///
/// Weights cycle 2..9 starting from the rightmost digit of the prefix.
/// A weighted-sum remainder below 2 yields digit 0, otherwise `11 - rem`.
fn check_digit(digits: &[u32]) -> u32 {
    let sum: u32 = digits
        .iter()
        .rev()
        .zip((2..=9).cycle())
        .map(|(digit, weight)| digit * weight)
        .sum();

    let rem = sum % 11;
    if rem < 2 {
        0
    } else {
        11 - rem
    }
}
