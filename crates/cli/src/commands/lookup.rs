//! Postal code lookup command.
//!
//! Resolves one postal code through the configured lookup service and logs
//! what the customer workflow would do with the answer. Useful for checking
//! connectivity and the `POSTAL_LOOKUP_*` settings without touching the store.
//!
//! # Usage
//!
//! ```bash
//! registry-cli lookup 01310-100
//! POSTAL_LOOKUP_BASE_URL=http://localhost:8081 registry-cli lookup 01310100
//! ```

use customer_registry_api::config::ApiConfig;
use customer_registry_api::lookup::{AddressLookup, LookupOutcome, ViaCepClient};
use customer_registry_core::PostalCode;

/// Resolve a postal code and log the result.
///
/// # Errors
///
/// Returns an error if the postal code is not eight digits, the configuration
/// is invalid, the lookup fails, or the code does not resolve to a complete
/// address.
pub async fn run(raw: &str) -> Result<(), Box<dyn std::error::Error>> {
    let postal_code = PostalCode::parse(raw)?;
    let config = ApiConfig::from_env()?;
    let client = ViaCepClient::new(&config.lookup)?;

    tracing::info!(
        postal_code = %postal_code,
        base_url = %config.lookup.base_url,
        "Looking up postal code..."
    );

    match client.lookup(&postal_code).await? {
        LookupOutcome::NotFound => Err(format!("postal code {postal_code} not found").into()),
        LookupOutcome::Found(found) => {
            let Some(address) = found.clone().into_complete() else {
                tracing::warn!(
                    street = ?found.street,
                    city = ?found.city,
                    region = ?found.region,
                    "Lookup returned an incomplete address"
                );
                return Err(format!("postal code {postal_code} has an incomplete address").into());
            };

            tracing::info!(
                street = %address.street,
                city = %address.city,
                region = %address.region,
                "Postal code resolved"
            );
            Ok(())
        }
    }
}
