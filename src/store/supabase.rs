use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, warn};
use url::Url;

use super::{Repository, ScopeVersion, Snapshot, StoreError};
use crate::items::Schedulable;
use crate::schedule::{ItemId, Scope};

const LOG_TARGET: &str = "store::supabase";

/// Connection settings for the managed Postgres REST endpoint
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: Url,
    pub service_key: String,
}

/// Reads and writes rows through PostgREST (`/rest/v1/<table>`).
///
/// The version check on `persist` re-fetches the scope before writing, so two
/// writers racing between the fetch and the upsert can still both land.
pub struct SupabaseRepository<R> {
    client: Client,
    table_url: Url,
    _rows: PhantomData<fn() -> R>,
}

impl<R: Schedulable> SupabaseRepository<R> {
    pub fn new(config: &SupabaseConfig) -> Result<Self, StoreError> {
        let mut rest = config.url.clone();
        rest.set_path("/rest/v1/");
        rest.set_query(None);
        let table_url = rest
            .join(R::TABLE)
            .map_err(|e| StoreError::Config(format!("invalid table url: {e}")))?;

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.service_key)
            .map_err(|_| StoreError::Config("service key is not a valid header value".into()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.service_key))
            .map_err(|_| StoreError::Config("service key is not a valid header value".into()))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|source| StoreError::Http {
                table: R::TABLE,
                source,
            })?;

        Ok(Self {
            client,
            table_url,
            _rows: PhantomData,
        })
    }

    /// Rows of one scope; the scope that NULL columns default to also takes those rows
    fn scope_request(&self, scope: Scope) -> RequestBuilder {
        let column = R::SCOPE_COLUMN;
        let value = scope.column_value();
        let filter = if R::null_scope() == Some(scope) {
            ("or", format!("({column}.eq.{value},{column}.is.null)"))
        } else {
            (column, format!("eq.{value}"))
        };
        self.client.get(self.table_url.clone()).query(&[
            ("select", "*".to_string()),
            filter,
            ("order", "display_order.asc".to_string()),
        ])
    }

    fn http(source: reqwest::Error) -> StoreError {
        StoreError::Http {
            table: R::TABLE,
            source,
        }
    }

    /// Sends the request and decodes a JSON array of rows, surfacing non-2xx bodies
    async fn rows(&self, request: RequestBuilder) -> Result<Vec<R>, StoreError> {
        let response: Response = request.send().await.map_err(Self::http)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                target = LOG_TARGET,
                table = R::TABLE,
                %status,
                %body,
                "postgrest request failed"
            );
            return Err(StoreError::Status {
                table: R::TABLE,
                status,
                body,
            });
        }
        response.json::<Vec<R>>().await.map_err(Self::http)
    }
}

#[async_trait]
impl<R: Schedulable> Repository<R> for SupabaseRepository<R> {
    async fn fetch_scope(&self, scope: Scope) -> Result<Snapshot<R>, StoreError> {
        debug!(target = LOG_TARGET, table = R::TABLE, %scope, "fetching scope");
        let rows = self.rows(self.scope_request(scope)).await?;
        Ok(Snapshot::new(scope, rows))
    }

    async fn fetch_all(&self) -> Result<Vec<R>, StoreError> {
        let request = self.client.get(self.table_url.clone()).query(&[
            ("select", "*"),
            ("order", "display_order.asc"),
        ]);
        self.rows(request).await
    }

    async fn get(&self, id: &ItemId) -> Result<Option<R>, StoreError> {
        let request = self
            .client
            .get(self.table_url.clone())
            .query(&[("select", "*".to_string()), ("id", format!("eq.{id}"))]);
        Ok(self.rows(request).await?.into_iter().next())
    }

    async fn persist(&self, row: R, expected: Option<&ScopeVersion>) -> Result<R, StoreError> {
        if let Some(expected) = expected {
            let scope = row.scope();
            let current = self.fetch_scope(scope).await?;
            if current.version != *expected {
                return Err(StoreError::Stale {
                    scope,
                    expected: expected.clone(),
                    actual: current.version,
                });
            }
        }

        debug!(target = LOG_TARGET, table = R::TABLE, id = %row.id(), "upserting row");
        let request = self
            .client
            .post(self.table_url.clone())
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&row);
        let mut stored = self.rows(request).await?;
        match stored.pop() {
            Some(row) => Ok(row),
            // PostgREST returns an empty representation when row-level security hides the row
            None => Ok(row),
        }
    }

    async fn delete(&self, id: &ItemId) -> Result<bool, StoreError> {
        debug!(target = LOG_TARGET, table = R::TABLE, %id, "deleting row");
        let request = self
            .client
            .delete(self.table_url.clone())
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{id}"))]);
        Ok(!self.rows(request).await?.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{BannerImage, Promotion};
    use crate::schedule::{BannerPlacement, UsageType};

    fn config(url: &str) -> SupabaseConfig {
        SupabaseConfig {
            url: Url::parse(url).unwrap(),
            service_key: "service-role-key".to_string(),
        }
    }

    #[test]
    fn table_urls_live_under_rest_v1() {
        let banners =
            SupabaseRepository::<BannerImage>::new(&config("https://abc.supabase.co")).unwrap();
        assert_eq!(
            banners.table_url.as_str(),
            "https://abc.supabase.co/rest/v1/banner_images"
        );

        let promos = SupabaseRepository::<Promotion>::new(&config(
            "https://abc.supabase.co/some/path?x=1",
        ))
        .unwrap();
        assert_eq!(promos.table_url.as_str(), "https://abc.supabase.co/rest/v1/promotions");
    }

    fn query_of<R: Schedulable>(repo: &SupabaseRepository<R>, scope: Scope) -> Vec<(String, String)> {
        let request = repo.scope_request(scope).build().unwrap();
        request.url().query_pairs().into_owned().collect()
    }

    #[test]
    fn default_usage_type_also_reads_null_rows() {
        let promos = SupabaseRepository::<Promotion>::new(&config("https://abc.supabase.co")).unwrap();
        let pair = |k: &str, v: &str| (k.to_string(), v.to_string());

        assert_eq!(
            query_of(&promos, Scope::Promotion(UsageType::OnceOff)),
            vec![
                pair("select", "*"),
                pair("or", "(usage_type.eq.once_off,usage_type.is.null)"),
                pair("order", "display_order.asc"),
            ]
        );
        assert_eq!(
            query_of(&promos, Scope::Promotion(UsageType::Recurring))[1],
            pair("usage_type", "eq.recurring")
        );

        let banners = SupabaseRepository::<BannerImage>::new(&config("https://abc.supabase.co")).unwrap();
        assert_eq!(
            query_of(&banners, Scope::Banner(BannerPlacement::PromotionWeb))[1],
            pair("banner_id", "eq.promotion-web")
        );
    }

    #[test]
    fn rejects_keys_that_cannot_be_headers() {
        let mut bad = config("https://abc.supabase.co");
        bad.service_key = "line\nbreak".to_string();
        assert!(matches!(
            SupabaseRepository::<BannerImage>::new(&bad),
            Err(StoreError::Config(_))
        ));
    }
}
