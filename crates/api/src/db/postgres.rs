//! `PostgreSQL` customer store.
//!
//! Queries are checked at runtime so the crate builds without a live
//! database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use customer_registry_core::{
    Address, Customer, CustomerId, CustomerName, Email, NewCustomer, PostalCode,
};
use sqlx::PgPool;

use super::{CustomerStore, RepositoryError, map_write_error};

const COLUMNS: &str =
    "id, name, email, postal_code, street, city, region, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` customer queries.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    name: String,
    email: String,
    postal_code: String,
    street: Option<String>,
    city: Option<String>,
    region: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let name = CustomerName::parse(&row.name).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid name in database: {e}"))
        })?;
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let postal_code = PostalCode::validate(&row.postal_code).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid postal code in database: {e}"))
        })?;

        let address = match (&row.street, &row.city, &row.region) {
            (None, None, None) => None,
            (street, city, region) => Some(
                Address::complete(street.as_deref(), city.as_deref(), region.as_deref())
                    .ok_or_else(|| {
                        RepositoryError::DataCorruption(format!(
                            "partial address stored for customer {}",
                            row.id
                        ))
                    })?,
            ),
        };

        Ok(Self {
            id: CustomerId::new(row.id),
            name,
            email,
            postal_code,
            address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// Store
// =============================================================================

/// Customer store backed by the `customers` table.
#[derive(Debug, Clone)]
pub struct PgCustomerStore {
    pool: PgPool,
}

impl PgCustomerStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerStore for PgCustomerStore {
    async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        let rows: Vec<CustomerRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM customers ORDER BY name, id"))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row: Option<CustomerRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM customers WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn insert(&self, customer: NewCustomer) -> Result<Customer, RepositoryError> {
        let row: CustomerRow = sqlx::query_as(&format!(
            r"
            INSERT INTO customers (name, email, postal_code, street, city, region, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "
        ))
        .bind(customer.name.as_str())
        .bind(&customer.email)
        .bind(customer.postal_code.as_str())
        .bind(&customer.address.street)
        .bind(&customer.address.city)
        .bind(&customer.address.region)
        .bind(customer.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        row.try_into()
    }

    async fn replace(&self, customer: &Customer) -> Result<Customer, RepositoryError> {
        let address = customer.address.as_ref();
        let row: Option<CustomerRow> = sqlx::query_as(&format!(
            r"
            UPDATE customers
            SET name = $2, email = $3, postal_code = $4,
                street = $5, city = $6, region = $7, updated_at = $8
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        ))
        .bind(customer.id)
        .bind(customer.name.as_str())
        .bind(&customer.email)
        .bind(customer.postal_code.as_str())
        .bind(address.map(|a| a.street.as_str()))
        .bind(address.map(|a| a.city.as_str()))
        .bind(address.map(|a| a.region.as_str()))
        .bind(customer.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn delete(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row() -> CustomerRow {
        CustomerRow {
            id: 7,
            name: "Maria Souza".to_owned(),
            email: "maria@example.com".to_owned(),
            postal_code: "01310100".to_owned(),
            street: Some("Avenida Paulista".to_owned()),
            city: Some("São Paulo".to_owned()),
            region: Some("SP".to_owned()),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_row_to_customer() {
        let customer = Customer::try_from(row()).unwrap();
        assert_eq!(customer.id, CustomerId::new(7));
        assert_eq!(customer.address.unwrap().city, "São Paulo");
    }

    #[test]
    fn test_row_without_address() {
        let customer = Customer::try_from(CustomerRow {
            street: None,
            city: None,
            region: None,
            ..row()
        })
        .unwrap();
        assert!(customer.address.is_none());
    }

    #[test]
    fn test_partial_address_is_corruption() {
        let err = Customer::try_from(CustomerRow {
            city: None,
            ..row()
        })
        .unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }

    #[test]
    fn test_unnormalized_postal_code_is_corruption() {
        let err = Customer::try_from(CustomerRow {
            postal_code: "01310-10".to_owned(),
            ..row()
        })
        .unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }
}
