//! REST client for the remote document store.
//!
//! Documents live under per-user paths (`/v1/users/{uid}/cart`,
//! `/v1/users/{uid}/favorites/{pid}`) and products under `/v1/products/{pid}`.
//! Product lookups are cached with `moka` (5-minute TTL) since favorites
//! resolution hits the same ids repeatedly.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use pawmart_core::{Product, ProductId, UserId};

use crate::config::GatewayConfig;

use super::{CartDocument, GatewayError, StorageGateway};

/// Client for the remote document store.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct DocumentStoreClient {
    inner: Arc<DocumentStoreClientInner>,
}

struct DocumentStoreClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    product_cache: Cache<ProductId, Product>,
}

/// Body of a 409 response to a stale cart save.
#[derive(serde::Deserialize)]
struct ConflictBody {
    #[serde(default)]
    revision: u64,
}

impl DocumentStoreClient {
    /// Create a new document store client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed
    /// or the base URL cannot carry path segments.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        if config.base_url.cannot_be_a_base() {
            return Err(GatewayError::Backend(format!(
                "base URL {} cannot carry path segments",
                config.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let product_cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(DocumentStoreClientInner {
                client,
                base_url: config.base_url.clone(),
                api_key: config.api_key.expose_secret().to_string(),
                product_cache,
            }),
        })
    }

    /// Build a request URL under `/v1/`, percent-encoding each segment so an
    /// id containing `/`, `?`, or `#` cannot change the request target.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.base_url.clone();
        // Infallible: cannot-be-a-base URLs are rejected in `new`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("v1").extend(segments);
        }
        url
    }

    fn request(&self, method: reqwest::Method, segments: &[&str]) -> reqwest::RequestBuilder {
        self.inner
            .client
            .request(method, self.url(segments))
            .bearer_auth(&self.inner.api_key)
    }

    /// Map non-success statuses to gateway errors. `404` is handled by the
    /// callers that treat it as an expected outcome.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message: String = response
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(200)
            .collect();

        match status.as_u16() {
            401 | 403 => Err(GatewayError::Denied(message)),
            code => Err(GatewayError::Status {
                status: code,
                message,
            }),
        }
    }

    /// GET a JSON document, mapping `404` to `None`.
    async fn get_optional<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<Option<T>, GatewayError> {
        let response = self.request(reqwest::Method::GET, segments).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check_status(response).await?;
        let body = response.text().await?;
        let value = serde_json::from_str(&body)?;
        Ok(Some(value))
    }
}

impl StorageGateway for DocumentStoreClient {
    #[instrument(skip(self))]
    async fn load_cart(&self, user_id: &UserId) -> Result<Option<CartDocument>, GatewayError> {
        self.get_optional(&["users", user_id.as_str(), "cart"]).await
    }

    #[instrument(skip(self, document), fields(revision = document.revision))]
    async fn save_cart(
        &self,
        user_id: &UserId,
        document: &CartDocument,
    ) -> Result<(), GatewayError> {
        let response = self
            .request(reqwest::Method::PUT, &["users", user_id.as_str(), "cart"])
            .json(document)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::CONFLICT {
            let body = response.text().await.unwrap_or_default();
            let conflict: ConflictBody =
                serde_json::from_str(&body).unwrap_or(ConflictBody { revision: 0 });
            return Err(GatewayError::StaleWrite(conflict.revision));
        }

        Self::check_status(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_cart(&self, user_id: &UserId) -> Result<(), GatewayError> {
        let response = self
            .request(reqwest::Method::DELETE, &["users", user_id.as_str(), "cart"])
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check_status(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_favorite_ids(&self, user_id: &UserId) -> Result<Vec<ProductId>, GatewayError> {
        let ids: Option<Vec<ProductId>> = self
            .get_optional(&["users", user_id.as_str(), "favorites"])
            .await?;
        Ok(ids.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn add_favorite(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<(), GatewayError> {
        let response = self
            .request(
                reqwest::Method::PUT,
                &["users", user_id.as_str(), "favorites", product_id.as_str()],
            )
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_favorite(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<(), GatewayError> {
        let response = self
            .request(
                reqwest::Method::DELETE,
                &["users", user_id.as_str(), "favorites", product_id.as_str()],
            )
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            // Absent favorite: removal is a no-op, not an error.
            return Ok(());
        }
        Self::check_status(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>, GatewayError> {
        if let Some(product) = self.inner.product_cache.get(product_id).await {
            return Ok(Some(product));
        }

        let product: Option<Product> =
            self.get_optional(&["products", product_id.as_str()]).await?;

        if let Some(ref product) = product {
            self.inner
                .product_cache
                .insert(product_id.clone(), product.clone())
                .await;
        }
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn client_for(base_url: &str) -> DocumentStoreClient {
        let config = GatewayConfig {
            base_url: Url::parse(base_url).expect("base url"),
            api_key: SecretString::from("aB3xY9mK2nL5pQ7rT0uW4zC6"),
            timeout_secs: 5,
        };
        DocumentStoreClient::new(&config).expect("client")
    }

    #[test]
    fn test_url_percent_encodes_path_segments() {
        let client = client_for("https://store.pawmart.dev");
        let url = client.url(&["users", "a/b?c#d", "cart"]);
        assert_eq!(
            url.as_str(),
            "https://store.pawmart.dev/v1/users/a%2Fb%3Fc%23d/cart"
        );
    }

    #[test]
    fn test_url_joins_base_path_without_double_slash() {
        let client = client_for("https://store.pawmart.dev/api/");
        let url = client.url(&["products", "dog-bed"]);
        assert_eq!(url.as_str(), "https://store.pawmart.dev/api/v1/products/dog-bed");
    }

    #[test]
    fn test_new_rejects_base_url_without_path_segments() {
        let config = GatewayConfig {
            base_url: Url::parse("mailto:ops@pawmart.dev").expect("url"),
            api_key: SecretString::from("aB3xY9mK2nL5pQ7rT0uW4zC6"),
            timeout_secs: 5,
        };
        assert!(DocumentStoreClient::new(&config).is_err());
    }
}
