// API client module: a small blocking HTTP client for the Scrapbox page
// listing and search endpoints. One request per call, no shared state.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::{Client, Request};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE, USER_AGENT};
use reqwest::{Method, StatusCode, Url};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::ClientConfig;
use crate::error::ApiError;

pub const DEFAULT_SKIP: u32 = 0;
pub const DEFAULT_LIMIT: u32 = 30;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const SESSION_COOKIE: &str = "connect.sid";

/// Everything but `A-Z a-z 0-9 - _ . ~` is escaped in a query value.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Escape a query value: spaces become `+`, unreserved bytes stay as-is and
/// everything else is percent-encoded as UTF-8.
pub fn escape_query(value: &str) -> String {
    value
        .split(' ')
        .map(|part| utf8_percent_encode(part, QUERY_VALUE).to_string())
        .collect::<Vec<_>>()
        .join("+")
}

/// Build the relative request path for a page listing (empty `query`) or a
/// full-text search (non-empty `query`). The project is used verbatim.
pub fn build_path(project: &str, skip: u32, limit: u32, query: &str) -> String {
    let escaped = escape_query(query);
    let params = format!("skip={skip}&limit={limit}&q={escaped}");
    if query.is_empty() {
        format!("api/pages/{project}?{params}")
    } else {
        format!("api/pages/{project}/search/query?{params}")
    }
}

/// Parameters of a single listing/search call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub project: String,
    pub query: String,
    pub skip: u32,
    pub limit: u32,
}

impl PageQuery {
    /// First page of results with the default page size.
    pub fn new(project: impl Into<String>, query: impl Into<String>) -> Self {
        PageQuery {
            project: project.into(),
            query: query.into(),
            skip: DEFAULT_SKIP,
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn path(&self) -> String {
        build_path(&self.project, self.skip, self.limit, &self.query)
    }
}

/// A JSON `null` decodes to the type's default, like a missing key does.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Response body of `api/pages/...`. Both endpoints share this shape; the
/// listing endpoint just leaves the search-only fields out.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PagesResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub project_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub search_query: String,
    #[serde(deserialize_with = "null_as_default")]
    pub limit: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub pages: Vec<RawPage>,
    #[serde(deserialize_with = "null_as_default")]
    pub exists_exact_title_match: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub query: ParsedQuery,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPage {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    pub image: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub descriptions: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub user: PageUser,
    #[serde(deserialize_with = "null_as_default")]
    pub pin: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub views: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub linked: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub created: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub updated: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub accessed: i64,
    /// Number, boolean or null depending on the page; kept as-is.
    pub snapshot_created: serde_json::Value,
    /// Matched lines. The service spells the key `snipet`.
    #[serde(rename = "snipet", deserialize_with = "null_as_default")]
    pub snippet: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PageUser {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ParsedQuery {
    #[serde(deserialize_with = "null_as_default")]
    pub words: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub excludes: Vec<serde_json::Value>,
}

/// What the CLI prints for each result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
}

impl PagesResponse {
    /// Project the raw records to titles, keeping response order.
    pub fn into_pages(self) -> Vec<Page> {
        self.pages
            .into_iter()
            .map(|raw| Page { title: raw.title })
            .collect()
    }
}

/// Blocking client bound to one Scrapbox host.
#[derive(Clone)]
pub struct ScrapboxClient {
    client: Client,
    config: ClientConfig,
}

impl ScrapboxClient {
    /// No I/O happens here; the base URL was already validated by
    /// `ClientConfig`.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(ScrapboxClient { client, config })
    }

    /// Resolve `path` against the base URL. A trailing slash on the base is
    /// not doubled.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.config.base_url.as_str().trim_end_matches('/');
        let joined = format!("{base}/{path}");
        Url::parse(&joined).map_err(|e| ApiError::Request(format!("invalid url `{joined}`: {e}")))
    }

    /// Headers sent with every request. The session cookie is only added
    /// when a token is configured.
    fn default_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        let agent = HeaderValue::from_str(&self.config.user_agent)
            .map_err(|e| ApiError::Request(format!("invalid user agent: {e}")))?;
        headers.insert(USER_AGENT, agent);
        if let Some(token) = self.config.token.as_deref().filter(|t| !t.is_empty()) {
            let cookie = HeaderValue::from_str(&format!("{SESSION_COOKIE}={token}"))
                .map_err(|e| ApiError::Request(format!("invalid token: {e}")))?;
            headers.insert(COOKIE, cookie);
        }
        Ok(headers)
    }

    /// Build (but do not send) a request for `path` relative to the base URL.
    pub fn build_request(&self, method: Method, path: &str) -> Result<Request, ApiError> {
        let url = self.endpoint(path)?;
        let headers = self.default_headers()?;
        self.client
            .request(method, url)
            .headers(headers)
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))
    }

    /// Run one listing/search call and return the decoded body.
    ///
    /// Only `200 OK` counts as success. A body that is not valid JSON for
    /// `PagesResponse` is reported as `ApiError::Decode` rather than being
    /// treated as an empty result.
    pub fn search(&self, query: &PageQuery) -> Result<PagesResponse, ApiError> {
        let request = self.build_request(Method::GET, &query.path())?;
        log::debug!("GET {}", request.url());

        let response = self.client.execute(request).map_err(ApiError::Transport)?;
        let status = response.status();
        log::debug!("response status {status}");
        if status != StatusCode::OK {
            return Err(ApiError::Status(status));
        }

        let body: PagesResponse = serde_json::from_reader(response)?;
        log::info!(
            "project {}: {} of {} pages",
            query.project,
            body.pages.len(),
            body.count
        );
        Ok(body)
    }

    /// First page of titles for `project`, filtered by `query` when it is
    /// not empty.
    pub fn get_pages(&self, project: &str, query: &str) -> Result<Vec<Page>, ApiError> {
        let response = self.search(&PageQuery::new(project, query))?;
        Ok(response.into_pages())
    }
}
