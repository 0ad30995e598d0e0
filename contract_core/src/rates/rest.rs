//! REST rate source for a PostgREST-style backend
//! (`GET {base}/rest/v1/resource_rates?solution_id=eq.{id}`).

use async_trait::async_trait;
use log::warn;
use reqwest::{Client, Url};

use crate::rates::{FetchError, RateSource, ResourceRate};
use crate::settings::StoreSettings;

const RATES_PATH: &str = "rest/v1/resource_rates";

/// Fetches rate rows over HTTP.
#[derive(Debug, Clone)]
pub struct RestRateSource {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestRateSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        RestRateSource {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Build from settings. `None` when no REST URL is configured.
    /// The API key is read from the environment variable named in the settings.
    pub fn from_settings(settings: &StoreSettings) -> Option<Self> {
        let base_url = settings.rest_url.as_ref()?;
        let source = RestRateSource::new(base_url.clone());
        match std::env::var(&settings.api_key_env) {
            Ok(key) if !key.is_empty() => Some(source.with_api_key(key)),
            _ => Some(source),
        }
    }

    /// URL of the rate rows for one solution.
    pub fn rates_url(&self, solution_id: &str) -> Result<Url, FetchError> {
        let base = format!("{}/{}", self.base_url.trim_end_matches('/'), RATES_PATH);
        let filter = format!("eq.{}", solution_id);
        Url::parse_with_params(&base, &[("select", "*"), ("solution_id", filter.as_str())])
            .map_err(|e| FetchError::Network(format!("Failed to build URL: {}", e)))
    }
}

#[async_trait]
impl RateSource for RestRateSource {
    async fn fetch_rates(&self, solution_id: &str) -> Result<Vec<ResourceRate>, FetchError> {
        let url = self.rates_url(solution_id)?;

        let mut request = self.client.get(url.clone());
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            warn!("Rate table request failed with HTTP {}", status);
            return Err(FetchError::Http {
                status,
                url: url.to_string(),
            });
        }

        response
            .json::<Vec<ResourceRate>>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_url() {
        let source = RestRateSource::new("https://db.example.com/");
        let url = source.rates_url("erp").unwrap();
        assert_eq!(
            url.as_str(),
            "https://db.example.com/rest/v1/resource_rates?select=*&solution_id=eq.erp"
        );
    }

    #[test]
    fn test_rates_url_escapes_solution() {
        let source = RestRateSource::new("https://db.example.com");
        let url = source.rates_url("erp suite").unwrap();
        assert!(url.as_str().ends_with("solution_id=eq.erp+suite"));
    }

    #[test]
    fn test_from_settings_without_url() {
        assert!(RestRateSource::from_settings(&StoreSettings::default()).is_none());
    }

    #[test]
    fn test_invalid_base_url() {
        let source = RestRateSource::new("not a url");
        assert!(matches!(source.rates_url("erp"), Err(FetchError::Network(_))));
    }
}
