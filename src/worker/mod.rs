//! Download worker
//!
//! Fetches linked files over HTTP, writes them into the storage layout and
//! records each outcome on its task.

pub mod http;
pub mod runner;

pub use http::{FetchError, Fetcher, HttpConfig, HttpFetcher};
pub use runner::{DownloadError, Downloader, file_name_from_url};
