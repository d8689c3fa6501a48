//! Stock keeping unit type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Sku`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SkuError {
    /// The input is empty or only whitespace.
    #[error("SKU cannot be blank")]
    Blank,
    /// The input is too long.
    #[error("SKU must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A product SKU.
///
/// ## Constraints
///
/// - Surrounding whitespace is trimmed
/// - Length: 1-128 characters after trimming
///
/// ## Examples
///
/// ```
/// use product_variations_core::Sku;
///
/// assert_eq!(Sku::parse(" red-l ").unwrap().as_str(), "red-l");
/// assert!(Sku::parse("").is_err());
/// assert!(Sku::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    /// Maximum length of a SKU.
    pub const MAX_LENGTH: usize = 128;

    /// Parse a `Sku` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or longer than
    /// [`Sku::MAX_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, SkuError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(SkuError::Blank);
        }

        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(SkuError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the SKU as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Sku` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Sku {
    type Err = SkuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Sku {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Sku {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Sku {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Sku {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Sku {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(Sku::parse("  blue-s\t").unwrap().as_str(), "blue-s");
    }

    #[test]
    fn test_parse_blank() {
        assert_eq!(Sku::parse(""), Err(SkuError::Blank));
        assert_eq!(Sku::parse(" \n "), Err(SkuError::Blank));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "x".repeat(Sku::MAX_LENGTH + 1);
        assert_eq!(
            Sku::parse(&long),
            Err(SkuError::TooLong {
                max: Sku::MAX_LENGTH
            })
        );

        let max = "x".repeat(Sku::MAX_LENGTH);
        assert!(Sku::parse(&max).is_ok());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let accented = "é".repeat(Sku::MAX_LENGTH);
        assert!(Sku::parse(&accented).is_ok());
    }

    #[test]
    fn test_deserialize_is_transparent() {
        let sku: Sku = serde_json::from_str("\"red-xl\"").unwrap();
        assert_eq!(sku.as_str(), "red-xl");
        assert_eq!(serde_json::to_string(&sku).unwrap(), "\"red-xl\"");
    }
}
