//! Resolved postal address.

use serde::{Deserialize, Serialize};

/// Street, city and region resolved from a postal code.
///
/// An `Address` only exists when all three parts are present; records hold an
/// `Option<Address>` so the fields are never partially populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Street name (logradouro).
    pub street: String,
    /// City (localidade).
    pub city: String,
    /// Region or state abbreviation (UF).
    pub region: String,
}

impl Address {
    /// Build an address from lookup output, rejecting incomplete results.
    ///
    /// Returns `None` if any part is missing or blank after trimming.
    #[must_use]
    pub fn complete(
        street: Option<&str>,
        city: Option<&str>,
        region: Option<&str>,
    ) -> Option<Self> {
        let street = non_blank(street)?;
        let city = non_blank(city)?;
        let region = non_blank(region)?;
        Some(Self {
            street,
            city,
            region,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_address() {
        let address = Address::complete(Some("Avenida Paulista"), Some("São Paulo"), Some("SP"))
            .unwrap();
        assert_eq!(address.street, "Avenida Paulista");
        assert_eq!(address.city, "São Paulo");
        assert_eq!(address.region, "SP");
    }

    #[test]
    fn test_blank_part_is_incomplete() {
        assert!(Address::complete(Some(""), Some("São Paulo"), Some("SP")).is_none());
        assert!(Address::complete(Some("Rua A"), Some("   "), Some("SP")).is_none());
        assert!(Address::complete(Some("Rua A"), Some("Batatais"), None).is_none());
    }
}
