//! Order-independent digests of variable/value combinations.
//!
//! A combination maps each variation variable of a parent product to one of
//! its values. The hash is the lookup key for the variation result, so two
//! combinations holding the same pairs must digest identically whatever
//! order the pairs were collected in.
//!
//! Each pair is rendered as `"{variable_id}={value_id}"`, the rendered pairs
//! are sorted, joined with `;`, and digested with SHA-256.

use core::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::id::{VariableId, VariableValueId};

/// Hex-encoded SHA-256 digest identifying a combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombinationHash(String);

impl CombinationHash {
    /// Length of the hex-encoded digest.
    pub const HEX_LENGTH: usize = 64;

    /// Digest a set of (variable, value) pairs.
    ///
    /// ```
    /// use product_variations_core::{CombinationHash, VariableId, VariableValueId};
    ///
    /// let a = CombinationHash::from_pairs([
    ///     (VariableId::new(1), VariableValueId::new(10)),
    ///     (VariableId::new(2), VariableValueId::new(20)),
    /// ]);
    /// let b = CombinationHash::from_pairs([
    ///     (VariableId::new(2), VariableValueId::new(20)),
    ///     (VariableId::new(1), VariableValueId::new(10)),
    /// ]);
    /// assert_eq!(a, b);
    /// ```
    #[must_use]
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (VariableId, VariableValueId)>,
    {
        let mut bits: Vec<String> = pairs
            .into_iter()
            .map(|(variable, value)| format!("{variable}={value}"))
            .collect();
        bits.sort();

        let digest = Sha256::digest(bits.join(";").as_bytes());
        Self(hex::encode(digest))
    }

    /// Wrap a digest loaded from storage.
    #[must_use]
    pub const fn from_stored(hex: String) -> Self {
        Self(hex)
    }

    /// Returns the digest as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CombinationHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for CombinationHash {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for CombinationHash {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for CombinationHash {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
