//! Positive item quantity.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// Quantities must be at least one.
    #[error("quantity must be positive")]
    NotPositive,
    /// The value does not fit the storage column.
    #[error("quantity must be at most {max}")]
    TooLarge {
        /// Largest accepted quantity.
        max: u32,
    },
}

/// Number of units of a book in a cart line or order line. Always `> 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// Largest quantity that fits the `INTEGER` columns.
    pub const MAX: u32 = i32::MAX as u32;

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::NotPositive` for zero and
    /// `QuantityError::TooLarge` above [`Quantity::MAX`].
    pub fn new(value: u32) -> Result<Self, QuantityError> {
        if value > Self::MAX {
            return Err(QuantityError::TooLarge { max: Self::MAX });
        }
        NonZeroU32::new(value)
            .map(Self)
            .ok_or(QuantityError::NotPositive)
    }

    /// Create a quantity from a signed value (database columns, JSON input).
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::NotPositive` for zero or negative values.
    pub fn from_i64(value: i64) -> Result<Self, QuantityError> {
        let value = u32::try_from(value).map_err(|_| {
            if value <= 0 {
                QuantityError::NotPositive
            } else {
                QuantityError::TooLarge { max: Self::MAX }
            }
        })?;
        Self::new(value)
    }

    /// Get the quantity as `u32`.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Get the quantity as the `i32` stored in the database.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)] // bounded by Quantity::MAX
    pub const fn as_i32(self) -> i32 {
        self.0.get() as i32
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.get())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i64::deserialize(deserializer)?;
        Self::from_i64(value).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<i32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::from_i64(i64::from(value))
    }
}
