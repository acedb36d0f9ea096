//! Customer type enumeration.

use serde::{Deserialize, Serialize};

/// Error returned when a string is not one of the three customer types.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("customer type must be one of: product, service, both (got {0:?})")]
pub struct CustomerTypeError(pub String);

/// What a customer signed up for.
///
/// Gates which dashboard sections the customer may view. The value is fixed at
/// registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "customer_type", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    /// Buys catalog products.
    Product,
    /// Books services.
    Service,
    /// Both products and services.
    Both,
}

impl CustomerType {
    /// All customer types, in declaration order.
    pub const ALL: [Self; 3] = [Self::Product, Self::Service, Self::Both];

    /// Returns the wire/database name of the customer type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Service => "service",
            Self::Both => "both",
        }
    }

    /// Whether the product catalog section is visible.
    #[must_use]
    pub const fn can_view_products(self) -> bool {
        matches!(self, Self::Product | Self::Both)
    }

    /// Whether the services section is visible.
    #[must_use]
    pub const fn can_view_services(self) -> bool {
        matches!(self, Self::Service | Self::Both)
    }
}

impl std::fmt::Display for CustomerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CustomerType {
    type Err = CustomerTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" => Ok(Self::Product),
            "service" => Ok(Self::Service),
            "both" => Ok(Self::Both),
            _ => Err(CustomerTypeError(s.to_owned())),
        }
    }
}
