//! The [`RecordId`] wrapper and its text encoding.

use crate::{IdentityError, IdentityResult};
use bson::oid::ObjectId;
use std::{fmt, str::FromStr};

/// Identity of a stored Section or Doc.
///
/// Once constructed, a `RecordId` always holds a well-formed ObjectId, so it can be used as a
/// lookup key without further checks.
///
/// # Construction
/// - [`RecordId::new`] generates a fresh identity.
/// - [`RecordId::parse`] decodes externally supplied text.
/// - `From<ObjectId>` wraps an identity read back from the store.
///
/// # Display format
/// `Display` produces the canonical 24-character lowercase hex form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(ObjectId);

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordId {
    /// Generates a new identity.
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    /// Decodes a textual identity.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidInput`] if `input` is not 24 hex digits.
    pub fn parse(input: &str) -> IdentityResult<Self> {
        ObjectId::parse_str(input).map(Self).map_err(|_| {
            IdentityError::InvalidInput(format!(
                "identity must be 24 hexadecimal characters, got: '{}'",
                input
            ))
        })
    }

    /// Returns true if `input` decodes to a valid identity.
    pub fn is_valid(input: &str) -> bool {
        Self::parse(input).is_ok()
    }

    /// Returns the store-native identity.
    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl From<ObjectId> for RecordId {
    fn from(value: ObjectId) -> Self {
        Self(value)
    }
}

impl From<RecordId> for ObjectId {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

impl FromStr for RecordId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordId::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RecordId::parse(&s).map_err(serde::de::Error::custom)
    }
}
