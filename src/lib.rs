// Library root
// -----------
// The binary (`main.rs`) is a thin wrapper over these modules.
//
// Module responsibilities:
// - `config`: client settings (host, token, user agent, timeout) and their
//   environment fallbacks.
// - `api`: request path building, the blocking HTTP client and the
//   response types of the page listing/search endpoints.
// - `ui`: terminal output of the results.
// - `cli`: command and flag definitions, and the `list` command itself.
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod ui;

pub use api::{build_path, Page, PageQuery, PagesResponse, ScrapboxClient};
pub use config::ClientConfig;
pub use error::ApiError;
