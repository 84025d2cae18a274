//! In-process customer store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use customer_registry_core::{Customer, CustomerId, NewCustomer};
use tokio::sync::RwLock;

use super::{CustomerStore, RepositoryError};

#[derive(Debug)]
struct Inner {
    next_id: i64,
    customers: BTreeMap<CustomerId, Customer>,
}

/// Customer store held in memory.
///
/// Ids are assigned sequentially from 1. Email uniqueness is enforced the
/// same way the database enforces it. Contents are lost on restart.
#[derive(Debug)]
pub struct MemoryCustomerStore {
    inner: RwLock<Inner>,
}

impl MemoryCustomerStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: 1,
                customers: BTreeMap::new(),
            }),
        }
    }
}

impl Default for MemoryCustomerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn email_taken(&self, customer: &Customer) -> bool {
        self.customers
            .values()
            .any(|other| other.id != customer.id && other.email == customer.email)
    }
}

#[async_trait]
impl CustomerStore for MemoryCustomerStore {
    async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        let inner = self.inner.read().await;
        let mut customers: Vec<Customer> = inner.customers.values().cloned().collect();
        customers.sort_by(|a, b| {
            a.name
                .as_str()
                .cmp(b.name.as_str())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(customers)
    }

    async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.inner.read().await.customers.get(&id).cloned())
    }

    async fn insert(&self, customer: NewCustomer) -> Result<Customer, RepositoryError> {
        let mut inner = self.inner.write().await;
        let customer = customer.with_id(CustomerId::new(inner.next_id));

        if inner.email_taken(&customer) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        inner.next_id += 1;
        inner.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn replace(&self, customer: &Customer) -> Result<Customer, RepositoryError> {
        let mut inner = self.inner.write().await;

        let Some(created_at) = inner.customers.get(&customer.id).map(|c| c.created_at) else {
            return Err(RepositoryError::NotFound);
        };
        if inner.email_taken(customer) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let stored = Customer {
            created_at,
            ..customer.clone()
        };
        inner.customers.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        Ok(self.inner.write().await.customers.remove(&id).is_some())
    }

    async fn exists(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        Ok(self.inner.read().await.customers.contains_key(&id))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, Utc};
    use customer_registry_core::{Address, CustomerName, Email, PostalCode};

    use super::*;

    fn new_customer(name: &str, email: &str) -> NewCustomer {
        NewCustomer {
            name: CustomerName::parse(name).unwrap(),
            email: Email::parse(email).unwrap(),
            postal_code: PostalCode::parse("01310100").unwrap(),
            address: Address::complete(Some("Avenida Paulista"), Some("São Paulo"), Some("SP"))
                .unwrap(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = MemoryCustomerStore::new();
        let first = store
            .insert(new_customer("Ana Lima", "ana@example.com"))
            .await
            .unwrap();
        let second = store
            .insert(new_customer("Bruno Dias", "bruno@example.com"))
            .await
            .unwrap();

        assert_eq!(first.id, CustomerId::new(1));
        assert_eq!(second.id, CustomerId::new(2));
        assert!(store.exists(second.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryCustomerStore::new();
        store
            .insert(new_customer("Ana Lima", "ana@example.com"))
            .await
            .unwrap();
        let err = store
            .insert(new_customer("Ana Souza", "ANA@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_ordered_by_name() {
        let store = MemoryCustomerStore::new();
        for (name, email) in [
            ("Carla Reis", "carla@example.com"),
            ("Ana Lima", "ana@example.com"),
            ("Bruno Dias", "bruno@example.com"),
        ] {
            store.insert(new_customer(name, email)).await.unwrap();
        }

        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name.as_str().to_owned())
            .collect();
        assert_eq!(names, ["Ana Lima", "Bruno Dias", "Carla Reis"]);
    }

    #[tokio::test]
    async fn test_replace_keeps_created_at() {
        let store = MemoryCustomerStore::new();
        let original = store
            .insert(new_customer("Ana Lima", "ana@example.com"))
            .await
            .unwrap();

        let tampered = Customer {
            name: CustomerName::parse("Ana Maria Lima").unwrap(),
            created_at: original.created_at - Duration::days(30),
            updated_at: Some(Utc::now()),
            ..original.clone()
        };
        let stored = store.replace(&tampered).await.unwrap();

        assert_eq!(stored.created_at, original.created_at);
        assert_eq!(stored.name.as_str(), "Ana Maria Lima");
        assert_eq!(store.get(original.id).await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn test_replace_missing_is_not_found() {
        let store = MemoryCustomerStore::new();
        let ghost = new_customer("Ana Lima", "ana@example.com").with_id(CustomerId::new(42));
        let err = store.replace(&ghost).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_replace_with_foreign_email_conflicts() {
        let store = MemoryCustomerStore::new();
        store
            .insert(new_customer("Ana Lima", "ana@example.com"))
            .await
            .unwrap();
        let bruno = store
            .insert(new_customer("Bruno Dias", "bruno@example.com"))
            .await
            .unwrap();

        let clash = Customer {
            email: Email::parse("ana@example.com").unwrap(),
            ..bruno
        };
        let err = store.replace(&clash).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let store = MemoryCustomerStore::new();
        let customer = store
            .insert(new_customer("Ana Lima", "ana@example.com"))
            .await
            .unwrap();

        assert!(store.delete(customer.id).await.unwrap());
        assert!(!store.delete(customer.id).await.unwrap());
        assert!(store.get(customer.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let store = MemoryCustomerStore::new();
        let first = store
            .insert(new_customer("Ana Lima", "ana@example.com"))
            .await
            .unwrap();
        store.delete(first.id).await.unwrap();
        let second = store
            .insert(new_customer("Ana Lima", "ana@example.com"))
            .await
            .unwrap();
        assert_eq!(second.id, CustomerId::new(2));
    }
}
