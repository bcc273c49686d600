//! PokeAPI client
//!
//! Thin HTTP adapter over the public catalogue: one GET against the
//! paginated `/pokemon` listing endpoint.

use async_trait::async_trait;
use pokedex_core::prelude::*;
use pokedex_core::SeedConfig;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// PokeAPI client configuration
#[derive(Debug, Clone)]
pub struct PokeApiConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for PokeApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://pokeapi.co/api/v2".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&SeedConfig> for PokeApiConfig {
    fn from(config: &SeedConfig) -> Self {
        Self {
            base_url: config.api_url.clone(),
            connect_timeout: config.connect_timeout,
            request_timeout: config.request_timeout,
        }
    }
}

/// PokeAPI client
pub struct PokeApiClient {
    client: Client,
    config: PokeApiConfig,
}

impl PokeApiClient {
    /// Create new client
    pub fn new(config: PokeApiConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(concat!("pokedex/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PokedexError::http_with_source("Failed to create client", e))?;

        Ok(Self { client, config })
    }

    /// Generic JSON GET
    async fn get<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| PokedexError::http_with_source(format!("GET {} failed", url), e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(PokedexError::http(format!(
                "GET {} returned {} - {}",
                url, status, body
            )));
        }

        resp.json()
            .await
            .map_err(|e| PokedexError::http_with_source("Failed to parse response", e))
    }
}

#[async_trait]
impl PokemonListing for PokeApiClient {
    async fn fetch_listing(&self, limit: u32) -> Result<PokeListing> {
        let url = listing_url(&self.config.base_url, limit)?;
        let listing: PokeListing = self.get(url).await?;

        debug!(
            count = listing.count,
            results = listing.results.len(),
            "Fetched catalogue listing"
        );
        Ok(listing)
    }
}

/// `{base}/pokemon?limit={limit}`
pub fn listing_url(base_url: &str, limit: u32) -> Result<Url> {
    let base = format!("{}/", base_url.trim_end_matches('/'));
    let mut url = Url::parse(&base)
        .and_then(|base| base.join("pokemon"))
        .map_err(|e| PokedexError::config(format!("invalid api url {}: {}", base_url, e)))?;
    url.query_pairs_mut()
        .append_pair("limit", &limit.to_string());
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_listing_url() {
        let url = listing_url("https://pokeapi.co/api/v2", 650).unwrap();
        assert_eq!(url.as_str(), "https://pokeapi.co/api/v2/pokemon?limit=650");

        let url = listing_url("http://localhost:8080/api/v2/", 10).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/v2/pokemon?limit=10");

        assert!(listing_url("not a url", 10).is_err());
    }

    #[test]
    fn test_config_from_seed_config() {
        let seed = SeedConfig {
            api_url: "http://mirror.local/api/v2".to_string(),
            ..Default::default()
        };
        let config = PokeApiConfig::from(&seed);
        assert_eq!(config.base_url, "http://mirror.local/api/v2");
        assert_eq!(config.request_timeout, seed.request_timeout);
    }

    #[test]
    fn test_client_builds() {
        assert!(PokeApiClient::new(PokeApiConfig::default()).is_ok());
    }

    fn client_for(server: &mockito::Server) -> PokeApiClient {
        PokeApiClient::new(PokeApiConfig {
            base_url: format!("{}/api/v2", server.url()),
            ..Default::default()
        })
        .unwrap()
    }

    fn listing_mock(server: &mut mockito::Server, limit: &str) -> mockito::Mock {
        server
            .mock("GET", "/api/v2/pokemon")
            .match_query(Matcher::UrlEncoded("limit".into(), limit.into()))
    }

    #[tokio::test]
    async fn test_fetch_listing_decodes_page() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{
            "count": 1302,
            "next": "https://pokeapi.co/api/v2/pokemon?offset=2&limit=2",
            "previous": null,
            "results": [
                {"name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/"},
                {"name": "ivysaur", "url": "https://pokeapi.co/api/v2/pokemon/2/"}
            ]
        }"#;
        let mock = listing_mock(&mut server, "2")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let listing = client_for(&server).fetch_listing(2).await.unwrap();
        mock.assert_async().await;

        assert_eq!(listing.count, 1302);
        assert!(listing.previous.is_none());
        assert_eq!(listing.results.len(), 2);
        assert_eq!(listing.results[1].name, "ivysaur");
        assert_eq!(listing.results[1].ordinal().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_fetch_listing_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = listing_mock(&mut server, "650")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let err = client_for(&server).fetch_listing(650).await.unwrap_err();
        assert!(matches!(err, PokedexError::Http { .. }));
        let message = err.to_string();
        assert!(message.contains("500"));
        assert!(message.contains("upstream exploded"));
    }

    #[tokio::test]
    async fn test_fetch_listing_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = listing_mock(&mut server, "10")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"results": "not a list"}"#)
            .create_async()
            .await;

        let err = client_for(&server).fetch_listing(10).await.unwrap_err();
        assert!(matches!(err, PokedexError::Http { .. }));
    }
}
