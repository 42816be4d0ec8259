//! Product catalog model and fetch boundary.
//!
//! Deserializes the collection and item resources of the product API,
//! builds request URLs, and fetches either from the remote API or from a
//! local directory of JSON fixtures. Every fetch returns
//! `Result<_, FetchError>`; callers decide how to present failures.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Base URL of the public demo API.
pub const DEFAULT_API_URL: &str = "https://dummyjson.com";

const USER_AGENT: &str = concat!("storefront/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Error type
// ============================================================================

/// Errors that can occur while fetching from a catalog source.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("invalid JSON from {origin}: {source}")]
    Decode {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// Product types
// ============================================================================

/// Keys left out of the generic field listing of a product detail.
pub const EXCLUDED_DETAIL_KEYS: [&str; 6] =
    ["tags", "dimensions", "reviews", "meta", "images", "thumbnail"];

/// One row of the collection resource.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductSummary {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub price: f64,
    pub stock: u64,
    pub rating: f64,
    pub availability_status: String,
}

impl ProductSummary {
    /// Route path of this product's detail screen.
    pub fn detail_path(&self) -> String {
        format!("/product-details/{}", self.id)
    }
}

/// The collection resource: a page of products plus pagination metadata.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProductPage {
    pub products: Vec<ProductSummary>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

/// The item resource, kept as an ordered JSON object.
///
/// Fields are rendered generically, so the record is not forced into a
/// fixed struct. Key order is the order the server sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDetail {
    fields: Map<String, Value>,
}

impl From<Value> for ProductDetail {
    /// Anything other than a JSON object (e.g. `null`) becomes an empty record.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }
}

impl ProductDetail {
    /// True if the record has no fields at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn title(&self) -> Option<&str> {
        self.fields.get("title").and_then(Value::as_str)
    }

    /// Image URLs in server order. Empty if `images` is absent or not a list.
    pub fn images(&self) -> Vec<&str> {
        self.string_list("images")
    }

    /// Tags with duplicates removed, keeping first-occurrence order.
    pub fn unique_tags(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.string_list("tags")
            .into_iter()
            .filter(|tag| seen.insert(*tag))
            .collect()
    }

    /// Every field except [`EXCLUDED_DETAIL_KEYS`], in key order.
    pub fn listed_fields(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.fields
            .iter()
            .filter(|(key, _)| !EXCLUDED_DETAIL_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.as_str(), value))
    }

    fn string_list(&self, key: &str) -> Vec<&str> {
        match self.fields.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

/// Render a JSON value as display text: strings unquoted, `null` blank,
/// containers as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Parameters of a collection request. `limit == 0` means unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: u32,
    pub sort_by: Option<String>,
    pub order: SortOrder,
}

impl Default for ListQuery {
    /// Every product, ascending by title.
    fn default() -> Self {
        Self {
            limit: 0,
            sort_by: Some("title".to_string()),
            order: SortOrder::Asc,
        }
    }
}

/// URL of the collection resource.
pub fn collection_url(base_url: &str, query: &ListQuery, delay_ms: Option<u64>) -> String {
    let mut url = format!(
        "{}/products/?limit={}",
        base_url.trim_end_matches('/'),
        query.limit
    );
    if let Some(sort_by) = &query.sort_by {
        url.push_str(&format!(
            "&sortBy={}&order={}",
            urlencoding::encode(sort_by),
            query.order.as_str()
        ));
    }
    if let Some(delay) = delay_ms {
        url.push_str(&format!("&delay={}", delay));
    }
    url
}

/// URL of the item resource for `id`.
pub fn item_url(base_url: &str, id: &str, delay_ms: Option<u64>) -> String {
    let mut url = format!(
        "{}/products/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(id)
    );
    if let Some(delay) = delay_ms {
        url.push_str(&format!("?delay={}", delay));
    }
    url
}

// ============================================================================
// Sources
// ============================================================================

/// Connection settings for the remote API.
#[derive(Debug, Clone)]
pub struct RemoteCatalog {
    pub base_url: String,
    /// Artificial server-side delay, passed through as `delay=<ms>`.
    pub delay_ms: Option<u64>,
    pub timeout: Duration,
}

impl Default for RemoteCatalog {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            delay_ms: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Where product data comes from.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    Remote(RemoteCatalog),
    /// A directory holding `products.json` and `products/{id}.json`.
    Local(PathBuf),
}

impl Default for CatalogSource {
    fn default() -> Self {
        CatalogSource::Remote(RemoteCatalog::default())
    }
}

/// Fetch the product collection.
pub fn fetch_product_list(
    source: &CatalogSource,
    query: &ListQuery,
) -> Result<ProductPage, FetchError> {
    match source {
        CatalogSource::Remote(remote) => {
            let url = collection_url(&remote.base_url, query, remote.delay_ms);
            let body = get_json(remote, &url)?;
            decode(&body, &url)
        }
        CatalogSource::Local(dir) => {
            let path = dir.join("products.json");
            let body = read_fixture(&path)?;
            let mut page: ProductPage = decode(&body, &path.display().to_string())?;
            apply_query(&mut page, query);
            Ok(page)
        }
    }
}

/// Fetch a single product record.
pub fn fetch_product_detail(
    source: &CatalogSource,
    id: &str,
) -> Result<ProductDetail, FetchError> {
    let value: Value = match source {
        CatalogSource::Remote(remote) => {
            let url = item_url(&remote.base_url, id, remote.delay_ms);
            let body = get_json(remote, &url)?;
            decode(&body, &url)?
        }
        CatalogSource::Local(dir) => {
            let path = fixture_path(dir, id)?;
            let body = read_fixture(&path)?;
            decode(&body, &path.display().to_string())?
        }
    };
    Ok(ProductDetail::from(value))
}

fn get_json(remote: &RemoteCatalog, url: &str) -> Result<String, FetchError> {
    let transport = |source| FetchError::Transport {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(remote.timeout)
        .build()
        .map_err(transport)?;

    debug!(url, "GET");
    let response = client.get(url).send().map_err(transport)?;

    if !response.status().is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    response.text().map_err(transport)
}

/// `products/{id}.json` under `dir`. Ids that could escape `dir` are refused.
fn fixture_path(dir: &Path, id: &str) -> Result<PathBuf, FetchError> {
    if id.is_empty() || id == "." || id.contains("..") || id.contains(['/', '\\']) {
        return Err(FetchError::Io {
            path: format!("products/{}.json", id),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "product id is not a plain file name",
            ),
        });
    }
    Ok(dir.join("products").join(format!("{}.json", id)))
}

fn read_fixture(path: &Path) -> Result<String, FetchError> {
    debug!(path = %path.display(), "reading fixture");
    std::fs::read_to_string(path).map_err(|source| FetchError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn decode<T: serde::de::DeserializeOwned>(body: &str, origin: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|source| FetchError::Decode {
        origin: origin.to_string(),
        source,
    })
}

/// Apply sort and limit to a fixture page the way the API would.
fn apply_query(page: &mut ProductPage, query: &ListQuery) {
    if let Some(sort_by) = query.sort_by.as_deref() {
        let products = &mut page.products;
        match sort_by {
            "title" => products.sort_by(|a, b| a.title.cmp(&b.title)),
            "price" => products.sort_by(|a, b| a.price.total_cmp(&b.price)),
            "rating" => products.sort_by(|a, b| a.rating.total_cmp(&b.rating)),
            "stock" => products.sort_by_key(|p| p.stock),
            "id" => products.sort_by_key(|p| p.id),
            _ => {}
        }
        if query.order == SortOrder::Desc {
            products.reverse();
        }
    }
    if query.limit > 0 {
        page.products.truncate(query.limit as usize);
    }
    page.limit = page.products.len() as u64;
}
