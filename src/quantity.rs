//! Exact decimal quantities for stock levels and movements.
//!
//! A parsed [`Quantity`] never carries more than [`MAX_SCALE`] fractional
//! digits. Parsing rejects anything it would have to round, rather than
//! coercing it. Columns holding quantities store the decimal text, so the
//! value read back is the value written, scale included, on every backend.

use crate::errors::ServiceError;
use rust_decimal::Decimal;
use sea_orm::sea_query::{ArrayType, ColumnType, Nullable, ValueType, ValueTypeErr};
use sea_orm::{ColIdx, DbErr, QueryResult, TryGetError, TryGetable, Value};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Maximum number of fractional digits a quantity may carry.
pub const MAX_SCALE: u32 = 8;

/// Maximum number of integral digits accepted for one movement.
pub const MAX_INTEGER_DIGITS: usize = 12;

/// Arbitrary-precision decimal quantity.
///
/// Deserializing goes through [`Quantity::parse`], so the same bounds apply
/// to JSON input as to query strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Quantity(Decimal);

impl Quantity {
    pub const ZERO: Quantity = Quantity(Decimal::ZERO);

    /// Parses a decimal string such as `"12.50000000"`.
    ///
    /// Accepts an optional sign, digits and at most one decimal point.
    /// Exponents, separators, blank input and more than [`MAX_SCALE`]
    /// fractional digits are rejected with `InvalidQuantity`.
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        let text = raw.trim();
        let invalid = || ServiceError::InvalidQuantity(format!("'{}' is not a decimal quantity", raw));

        let unsigned = text
            .strip_prefix('-')
            .or_else(|| text.strip_prefix('+'))
            .unwrap_or(text);
        let (integral, fraction) = match unsigned.split_once('.') {
            Some((int, frac)) => (int, Some(frac)),
            None => (unsigned, None),
        };

        let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if integral.is_empty() && fraction.map_or(true, str::is_empty) {
            return Err(invalid());
        }
        if !digits_only(integral) || !fraction.map_or(true, digits_only) {
            return Err(invalid());
        }

        let scale = fraction.map_or(0, str::len);
        if scale > MAX_SCALE as usize {
            return Err(ServiceError::InvalidQuantity(format!(
                "'{}' has {} decimal places; at most {} are supported",
                raw, scale, MAX_SCALE
            )));
        }
        if integral.trim_start_matches('0').len() > MAX_INTEGER_DIGITS {
            return Err(ServiceError::InvalidQuantity(format!(
                "'{}' exceeds the maximum supported quantity",
                raw
            )));
        }

        let mut canonical = String::with_capacity(text.len() + 1);
        if text.starts_with('-') {
            canonical.push('-');
        }
        canonical.push_str(if integral.is_empty() { "0" } else { integral });
        if let Some(frac) = fraction.filter(|f| !f.is_empty()) {
            canonical.push('.');
            canonical.push_str(frac);
        }

        Decimal::from_str_exact(&canonical).map(Quantity).map_err(|_| invalid())
    }

    /// Returns the quantity if it is strictly greater than zero.
    pub fn ensure_positive(self) -> Result<Self, ServiceError> {
        if self.is_positive() {
            Ok(self)
        } else {
            Err(ServiceError::InvalidQuantity(format!(
                "quantity must be positive, got {}",
                self
            )))
        }
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Reads a value back from a quantity column.
    ///
    /// Stored stock may legitimately exceed the per-movement bounds, so only
    /// exactness is checked here.
    fn from_column(text: &str) -> Result<Self, String> {
        Decimal::from_str_exact(text)
            .map(Quantity)
            .map_err(|e| format!("stored quantity '{}' is not a decimal: {}", text, e))
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl TryFrom<String> for Quantity {
    type Error = ServiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Quantity::parse(&value)
    }
}

impl From<Quantity> for Value {
    fn from(value: Quantity) -> Self {
        Value::String(Some(Box::new(value.0.to_string())))
    }
}

impl TryGetable for Quantity {
    fn try_get_by<I: ColIdx>(res: &QueryResult, index: I) -> Result<Self, TryGetError> {
        let text = String::try_get_by(res, index)?;
        Quantity::from_column(&text).map_err(|e| TryGetError::DbErr(DbErr::Type(e)))
    }
}

impl ValueType for Quantity {
    fn try_from(v: Value) -> Result<Self, ValueTypeErr> {
        match v {
            Value::String(Some(text)) => Quantity::from_column(&text).map_err(|_| ValueTypeErr),
            _ => Err(ValueTypeErr),
        }
    }

    fn type_name() -> String {
        "Quantity".to_owned()
    }

    fn array_type() -> ArrayType {
        ArrayType::String
    }

    fn column_type() -> ColumnType {
        ColumnType::Text
    }
}

impl Nullable for Quantity {
    fn null() -> Value {
        Value::String(None)
    }
}

impl From<Decimal> for Quantity {
    fn from(value: Decimal) -> Self {
        Quantity(value)
    }
}

impl From<Quantity> for Decimal {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl From<i64> for Quantity {
    fn from(value: i64) -> Self {
        Quantity(Decimal::from(value))
    }
}

impl FromStr for Quantity {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Quantity::parse(s)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 + rhs.0)
    }
}

impl AddAssign for Quantity {
    fn add_assign(&mut self, rhs: Quantity) {
        self.0 += rhs.0;
    }
}

impl Sub for Quantity {
    type Output = Quantity;

    fn sub(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 - rhs.0)
    }
}

impl SubAssign for Quantity {
    fn sub_assign(&mut self, rhs: Quantity) {
        self.0 -= rhs.0;
    }
}

impl Neg for Quantity {
    type Output = Quantity;

    fn neg(self) -> Quantity {
        Quantity(-self.0)
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Quantity {
        iter.fold(Quantity::ZERO, Add::add)
    }
}
