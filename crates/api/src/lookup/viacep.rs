//! ViaCEP HTTP client.
//!
//! Calls `GET {base}/ws/{cep}/json/`. The service answers `200` for both
//! known and unknown codes; unknown codes carry an `erro` flag, which older
//! deployments send as a JSON boolean and newer ones as the string `"true"`.

use async_trait::async_trait;
use customer_registry_core::PostalCode;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::instrument;
use url::Url;

use super::{AddressLookup, LookupAddress, LookupError, LookupOutcome};
use crate::config::LookupConfig;

/// ViaCEP response body.
///
/// Field names on the wire are Portuguese; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViaCepResponse {
    /// Formatted postal code (`01310-100`).
    #[serde(rename = "cep", default)]
    pub postal_code: Option<String>,
    /// Street name.
    #[serde(rename = "logradouro", default)]
    pub street: Option<String>,
    /// Address complement.
    #[serde(rename = "complemento", default)]
    pub complement: Option<String>,
    /// Neighbourhood.
    #[serde(rename = "bairro", default)]
    pub district: Option<String>,
    /// City.
    #[serde(rename = "localidade", default)]
    pub city: Option<String>,
    /// State abbreviation.
    #[serde(rename = "uf", default)]
    pub region: Option<String>,
    /// IBGE city registry code.
    #[serde(rename = "ibge", default)]
    pub city_registry_code: Option<String>,
    /// Telephone area code.
    #[serde(rename = "ddd", default)]
    pub area_code: Option<String>,
    /// Set when the service does not know the postal code.
    #[serde(rename = "erro", default, deserialize_with = "lenient_bool")]
    pub not_found: bool,
}

impl ViaCepResponse {
    /// Interpret the body as a lookup outcome.
    ///
    /// A body is only a hit when the `erro` flag is absent or false and the
    /// `cep` field is present.
    #[must_use]
    pub fn into_outcome(self) -> LookupOutcome {
        let has_code = self
            .postal_code
            .as_deref()
            .is_some_and(|code| !code.trim().is_empty());

        if self.not_found || !has_code {
            return LookupOutcome::NotFound;
        }

        LookupOutcome::Found(LookupAddress {
            street: self.street,
            city: self.city,
            region: self.region,
        })
    }
}

/// Accept `true`, `false`, `"true"`, `"false"` or `null`.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(value)) => value,
        Some(Flag::Text(value)) => value.trim().eq_ignore_ascii_case("true"),
        None => false,
    })
}

/// ViaCEP postal code lookup client.
///
/// Cheap to clone; the underlying `reqwest::Client` pools connections.
#[derive(Debug, Clone)]
pub struct ViaCepClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ViaCepClient {
    /// Create a new client with the configured timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &LookupConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Build the lookup URL for a postal code.
    fn endpoint(&self, postal_code: &PostalCode) -> Result<Url, LookupError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                LookupError::Communication(format!(
                    "lookup base URL cannot carry a path: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["ws", postal_code.as_str(), "json", ""]);
        Ok(url)
    }
}

#[async_trait]
impl AddressLookup for ViaCepClient {
    #[instrument(skip(self), fields(postal_code = %postal_code))]
    async fn lookup(&self, postal_code: &PostalCode) -> Result<LookupOutcome, LookupError> {
        let url = self.endpoint(postal_code)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();

        if !status.is_success() {
            tracing::error!(status = %status, "postal code service returned an error status");
            return Err(LookupError::Communication(format!(
                "postal code service returned {status}"
            )));
        }

        let body = response.text().await.map_err(transport_error)?;
        if body.trim().is_empty() {
            tracing::warn!("postal code service returned an empty body");
            return Ok(LookupOutcome::NotFound);
        }

        let parsed: ViaCepResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, "failed to decode postal code service response");
            LookupError::Communication(format!("invalid response body: {e}"))
        })?;

        let outcome = parsed.into_outcome();
        if outcome == LookupOutcome::NotFound {
            tracing::warn!("postal code not known to the lookup service");
        } else {
            tracing::debug!("postal code resolved");
        }
        Ok(outcome)
    }
}

fn transport_error(err: reqwest::Error) -> LookupError {
    if err.is_timeout() {
        tracing::error!(error = %err, "postal code lookup timed out");
        LookupError::Timeout
    } else {
        tracing::error!(error = %err, "postal code lookup transport failure");
        LookupError::Communication(err.to_string())
    }
}
