use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::api::error::{extract_message, ApiError};
use crate::api::EntityApi;
use crate::config::ApiConfig;
use crate::domain::{Category, Company, Entity, User};

/// Collection path of an entity under the API base URL.
pub trait RestResource {
    const PATH: &'static str;
}

impl RestResource for User {
    const PATH: &'static str = "users";
}

impl RestResource for Company {
    const PATH: &'static str = "companies";
}

#[derive(Debug, Deserialize)]
struct ExistsResponse {
    exists: bool,
}

/// HTTP client for the admin REST API.
pub struct RestClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl RestClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: config.token.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Search categories whose name matches `query`.
    pub async fn search_categories(&self, query: &str) -> Result<Vec<Category>, ApiError> {
        let mut url = self.endpoint(&["categories"])?;
        url.query_pairs_mut().append_pair("search", query);
        self.fetch_json(self.request(Method::GET, url)).await
    }

    /// Whether an operation report already exists for `date`.
    pub async fn report_date_exists(
        &self,
        date: NaiveDate,
        company_id: Option<&str>,
    ) -> Result<bool, ApiError> {
        let mut url = self.endpoint(&["operation-reports", "exists"])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("date", &date.format("%Y-%m-%d").to_string());
            if let Some(company_id) = company_id {
                pairs.append_pair("companyId", company_id);
            }
        }
        let response: ExistsResponse = self.fetch_json(self.request(Method::GET, url)).await?;
        Ok(response.exists)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_message(&body);
        tracing::debug!(
            status = status.as_u16(),
            message = message.as_deref().unwrap_or(""),
            "API request rejected"
        );
        Err(ApiError::from_status(status.as_u16(), message))
    }

    async fn fetch_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = self.execute(builder).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl<E> EntityApi<E> for RestClient
where
    E: Entity + RestResource,
{
    async fn list_all(&self) -> Result<Vec<E>, ApiError> {
        let url = self.endpoint(&[E::PATH])?;
        self.fetch_json(self.request(Method::GET, url)).await
    }

    async fn get_by_id(&self, id: &E::Key) -> Result<E, ApiError> {
        let url = self.endpoint(&[E::PATH, id.to_string().as_str()])?;
        self.fetch_json(self.request(Method::GET, url)).await
    }

    async fn create(&self, draft: &E::Draft) -> Result<E, ApiError> {
        let url = self.endpoint(&[E::PATH])?;
        self.fetch_json(self.request(Method::POST, url).json(draft))
            .await
    }

    async fn update(&self, id: &E::Key, draft: &E::Draft) -> Result<E, ApiError> {
        let url = self.endpoint(&[E::PATH, id.to_string().as_str()])?;
        self.fetch_json(self.request(Method::PUT, url).json(draft))
            .await
    }

    async fn delete_by_id(&self, id: &E::Key) -> Result<(), ApiError> {
        let url = self.endpoint(&[E::PATH, id.to_string().as_str()])?;
        self.execute(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}
