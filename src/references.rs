//! Turns caller-supplied identifiers into validated references.
//!
//! Everything here is pure parsing; nothing touches the store.

use crate::errors::ServiceError;
use crate::quantity::Quantity;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::fmt;
use uuid::Uuid;

/// Date format accepted for report boundaries
pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn parse_uuid(kind: &str, raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ServiceError::InvalidReference(format!("{} '{}' is not a valid id", kind, raw)))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProductRef(Uuid);

impl ProductRef {
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        parse_uuid("product", raw).map(ProductRef)
    }

    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for ProductRef {
    fn from(id: Uuid) -> Self {
        ProductRef(id)
    }
}

impl fmt::Display for ProductRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubVariantRef(Uuid);

impl SubVariantRef {
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        parse_uuid("sub-variant", raw).map(SubVariantRef)
    }

    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for SubVariantRef {
    fn from(id: Uuid) -> Self {
        SubVariantRef(id)
    }
}

impl fmt::Display for SubVariantRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fully resolved movement request, ready for the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StockMovement {
    pub product: ProductRef,
    pub sub_variant: SubVariantRef,
    pub quantity: Quantity,
}

impl StockMovement {
    /// Resolves the three raw request fields. The quantity must be strictly
    /// positive.
    pub fn resolve(
        product_id: &str,
        sub_variant_id: &str,
        quantity: &str,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            product: ProductRef::parse(product_id)?,
            sub_variant: SubVariantRef::parse(sub_variant_id)?,
            quantity: Quantity::parse(quantity)?.ensure_positive()?,
        })
    }
}

/// Half-open timestamp window `[from, to)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateWindow {
    /// Builds a window from explicit timestamps.
    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, ServiceError> {
        if from > to {
            return Err(ServiceError::InvalidInput(format!(
                "'from' ({}) must not be after 'to' ({})",
                from.to_rfc3339(),
                to.to_rfc3339()
            )));
        }
        Ok(Self { from, to })
    }

    /// Builds a window covering every calendar day from `from` through `to`
    /// inclusive (UTC).
    pub fn from_dates(from: NaiveDate, to: NaiveDate) -> Result<Self, ServiceError> {
        if from > to {
            return Err(ServiceError::InvalidInput(format!(
                "'from' ({}) must not be after 'to' ({})",
                from, to
            )));
        }
        let end = to
            .checked_add_signed(Duration::days(1))
            .ok_or_else(|| ServiceError::InvalidInput(format!("'to' ({}) is out of range", to)))?;
        Ok(Self {
            from: from.and_time(chrono::NaiveTime::MIN).and_utc(),
            to: end.and_time(chrono::NaiveTime::MIN).and_utc(),
        })
    }

    /// Parses `YYYY-MM-DD` boundaries as supplied on the query string.
    pub fn parse(from: &str, to: &str) -> Result<Self, ServiceError> {
        Self::from_dates(parse_date("from", from)?, parse_date("to", to)?)
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from <= at && at < self.to
    }
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ServiceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidInput(format!("'{}' date is required", field)));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| {
        ServiceError::InvalidInput(format!(
            "'{}' must be a date formatted as YYYY-MM-DD, got '{}'",
            field, raw
        ))
    })
}
