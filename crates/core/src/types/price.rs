//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are stored as `NUMERIC(10, 2)` and carried as [`rust_decimal::Decimal`]
//! so that order totals never accumulate floating point error. On the wire a
//! price is a decimal string (`"45.00"`); plain JSON numbers are accepted on
//! input for compatibility with simple clients.

use core::fmt;
use core::iter::Sum;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The amount does not fit in the storage column.
    #[error("price must be less than {max}")]
    TooLarge {
        /// Exclusive upper bound.
        max: Decimal,
    },
}

/// A non-negative monetary amount with two decimal places.
///
/// The store operates in a single currency, so no currency code is carried.
///
/// ```
/// use paradise_core::Price;
/// use rust_decimal::Decimal;
///
/// let price = Price::new(Decimal::new(4500, 2)).unwrap();
/// assert_eq!(price.to_string(), "45.00");
/// assert_eq!(price.times(3).to_string(), "135.00");
/// assert!(Price::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Scale used for all stored prices.
    pub const SCALE: u32 = 2;

    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price, rounding to two decimal places (banker's rounding).
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` for amounts below zero and
    /// `PriceError::TooLarge` for amounts that overflow `NUMERIC(10, 2)`.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        let max = Self::max_exclusive();
        let mut rounded = amount.round_dp(Self::SCALE);
        rounded.rescale(Self::SCALE);
        if rounded >= max {
            return Err(PriceError::TooLarge { max });
        }
        Ok(Self(rounded))
    }

    /// Largest representable amount (exclusive) for `NUMERIC(10, 2)`.
    fn max_exclusive() -> Decimal {
        Decimal::new(100_000_000, 0)
    }

    /// Wrap a decimal read from the database without re-validating it.
    #[must_use]
    pub const fn from_stored(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Line total for `quantity` units.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Total of `(unit price, quantity)` lines, held to the same bound as
    /// [`Price::new`].
    ///
    /// # Errors
    ///
    /// Returns `PriceError::TooLarge` if the total does not fit in `NUMERIC(10, 2)`.
    pub fn checked_total<I>(lines: I) -> Result<Self, PriceError>
    where
        I: IntoIterator<Item = (Self, u32)>,
    {
        let overflow = PriceError::TooLarge {
            max: Self::max_exclusive(),
        };
        let mut total = Decimal::ZERO;
        for (unit, quantity) in lines {
            total = unit
                .0
                .checked_mul(Decimal::from(quantity))
                .and_then(|line| total.checked_add(line))
                .ok_or_else(|| overflow.clone())?;
        }
        Self::new(total)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|p| p.0).sum())
    }
}

impl<'a> Sum<&'a Price> for Price {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

/// Accepts either a decimal string or a JSON number.
#[derive(Deserialize)]
#[serde(untagged)]
enum PriceRepr {
    Text(String),
    Number(serde_json::Number),
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = match PriceRepr::deserialize(deserializer)? {
            PriceRepr::Text(s) => s,
            PriceRepr::Number(n) => n.to_string(),
        };
        let amount = text
            .trim()
            .parse::<Decimal>()
            .or_else(|_| Decimal::from_scientific(text.trim()))
            .map_err(|e| serde::de::Error::custom(format!("invalid price {text:?}: {e}")))?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Column constraints guarantee a non-negative value
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn price(s: &str) -> Price {
        Price::new(s.parse().unwrap()).unwrap()
    }

    #[test]
    fn test_new_rounds_to_cents() {
        assert_eq!(price("18.005").to_string(), "18.00");
        assert_eq!(price("18.015").to_string(), "18.02");
        assert_eq!(price("7").to_string(), "7.00");
    }

    #[test]
    fn test_new_rejects_negative() {
        assert_eq!(
            Price::new("-0.01".parse().unwrap()),
            Err(PriceError::Negative)
        );
    }

    #[test]
    fn test_new_accepts_zero() {
        assert_eq!(Price::new(Decimal::ZERO).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_new_rejects_overflow() {
        assert!(matches!(
            Price::new("100000000".parse().unwrap()),
            Err(PriceError::TooLarge { .. })
        ));
        assert!(Price::new("99999999.99".parse().unwrap()).is_ok());
    }

    #[test]
    fn test_times_and_sum() {
        let lines = [price("45.00").times(2), price("18.50").times(1)];
        let total: Price = lines.iter().sum();
        assert_eq!(total.to_string(), "108.50");
    }

    #[test]
    fn test_checked_total() {
        let total = Price::checked_total([(price("45.00"), 2), (price("18.50"), 1)]).unwrap();
        assert_eq!(total.to_string(), "108.50");
        assert_eq!(Price::checked_total([]).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_checked_total_rejects_overflow() {
        let max = price("99999999.99");
        assert!(matches!(
            Price::checked_total([(max, 2)]),
            Err(PriceError::TooLarge { .. })
        ));
        assert!(matches!(
            Price::checked_total([(max, 1), (price("0.01"), 1)]),
            Err(PriceError::TooLarge { .. })
        ));
        assert!(matches!(
            Price::checked_total([(max, u32::MAX)]),
            Err(PriceError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_serializes_as_string() {
        assert_eq!(serde_json::to_string(&price("25")).unwrap(), "\"25.00\"");
    }

    #[test]
    fn test_deserializes_from_number_or_string() {
        let from_number: Price = serde_json::from_str("45.5").unwrap();
        let from_string: Price = serde_json::from_str("\"45.50\"").unwrap();
        assert_eq!(from_number, from_string);
    }

    #[test]
    fn test_deserialize_rejects_garbage_and_negative() {
        assert!(serde_json::from_str::<Price>("\"free\"").is_err());
        assert!(serde_json::from_str::<Price>("-3").is_err());
    }
}
