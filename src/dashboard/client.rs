use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::time::Duration;
use url::Url;

use crate::errors::ClientError;
use crate::middleware::auth::AUTH_USER_HEADER;
use crate::models::{DailyStat, DateRange, Overview, Page, PageQuery, RankingEntity};

/// Read side of the aggregation API as seen by the dashboard.
pub trait AggregationApi: Send + Sync {
    fn overview(&self) -> impl Future<Output = Result<Overview, ClientError>> + Send;

    fn daily_stats(
        &self,
        range: DateRange,
    ) -> impl Future<Output = Result<Vec<DailyStat>, ClientError>> + Send;

    fn ranking<T: RankingEntity>(
        &self,
        query: PageQuery,
    ) -> impl Future<Output = Result<Page<T>, ClientError>> + Send;
}

/// [`AggregationApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAggregationClient {
    http: Client,
    base_url: Url,
    auth_user: Option<String>,
}

impl HttpAggregationClient {
    pub fn new(
        base_url: &str,
        auth_user: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("openwebui-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: Url::parse(&base)?,
            auth_user: auth_user.filter(|user| !user.trim().is_empty()),
        })
    }

    pub fn endpoint<Q: Serialize>(&self, path: &str, query: Option<&Q>) -> Result<Url, ClientError> {
        let mut url = self.base_url.join(path.trim_start_matches('/'))?;
        if let Some(query) = query {
            let encoded = serde_qs::to_string(query)?;
            if !encoded.is_empty() {
                url.set_query(Some(&encoded));
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        tracing::debug!("GET {}", url);
        let mut request = self.http.get(url);
        if let Some(user) = &self.auth_user {
            request = request.header(AUTH_USER_HEADER, user);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        Ok(response.json::<T>().await?)
    }
}

impl AggregationApi for HttpAggregationClient {
    async fn overview(&self) -> Result<Overview, ClientError> {
        let url = self.endpoint::<()>("api/overview", None)?;
        self.get_json(url).await
    }

    async fn daily_stats(&self, range: DateRange) -> Result<Vec<DailyStat>, ClientError> {
        let url = self.endpoint("api/daily-stats", Some(&range))?;
        self.get_json(url).await
    }

    async fn ranking<T: RankingEntity>(&self, query: PageQuery) -> Result<Page<T>, ClientError> {
        let url = self.endpoint(&format!("api/rankings/{}", T::KIND), Some(&query))?;
        let page: Page<T> = self.get_json(url).await?;
        accept_page(page, query)
    }
}

/// Fills in paging fields the server may omit and enforces the page bounds.
pub fn accept_page<T>(mut page: Page<T>, query: PageQuery) -> Result<Page<T>, ClientError> {
    if page.limit == 0 {
        page.limit = query.limit;
        page.offset = query.offset;
    }
    page.check_bounds().map_err(ClientError::InvalidPage)?;
    Ok(page)
}
