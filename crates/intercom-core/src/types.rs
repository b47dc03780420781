use crate::{
    Result,
    constants::{MAX_ACCESS_CODE_LENGTH, MIN_ACCESS_CODE_LENGTH},
    error::Error,
};
use serde::Deserialize;
use std::fmt;
use subtle::ConstantTimeEq;

/// Door access code entered as call-signal tones.
///
/// An ordered sequence of printable ASCII symbols, fixed for the lifetime of
/// the process. Symbols are compared one by one and case-sensitively.
///
/// # Security
/// `Debug` and `Display` never reveal the code, and whole-code equality is
/// constant-time.
#[derive(Clone, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct AccessCode(Box<[u8]>);

impl AccessCode {
    /// Create a new access code with validation.
    ///
    /// Surrounding whitespace is trimmed. Case is preserved.
    ///
    /// # Errors
    /// Returns `Error::InvalidAccessCode` if:
    /// - The code length is not between 1-16 symbols
    /// - The code contains anything other than printable ASCII
    pub fn new(code: &str) -> Result<Self> {
        let code = code.trim();

        let len = code.len();
        if !(MIN_ACCESS_CODE_LENGTH..=MAX_ACCESS_CODE_LENGTH).contains(&len) {
            return Err(Error::invalid_access_code(format!(
                "Access code must be {MIN_ACCESS_CODE_LENGTH}-{MAX_ACCESS_CODE_LENGTH} symbols, got {len}"
            )));
        }

        if !code.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(Error::invalid_access_code(
                "Access code must contain printable ASCII symbols only",
            ));
        }

        Ok(AccessCode(code.as_bytes().into()))
    }

    /// Number of symbols in the code.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; validation rejects empty codes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Symbol expected at `position`, or `None` past the end.
    #[must_use]
    pub fn symbol_at(&self, position: usize) -> Option<char> {
        self.0.get(position).map(|&b| char::from(b))
    }

    /// Returns `true` if `symbol` is the expected symbol at `position`.
    #[inline]
    #[must_use]
    pub fn matches_at(&self, position: usize, symbol: char) -> bool {
        self.symbol_at(position) == Some(symbol)
    }
}

impl TryFrom<String> for AccessCode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        AccessCode::new(&value)
    }
}

impl std::str::FromStr for AccessCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        AccessCode::new(s)
    }
}

impl fmt::Debug for AccessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessCode({} symbols)", self.0.len())
    }
}

impl fmt::Display for AccessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", "*".repeat(self.0.len()))
    }
}

/// Constant-time comparison implementation for AccessCode
impl PartialEq for AccessCode {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

/// Token instructing the door actuator to run one unlock pulse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UnlockCommand;
