//! Loading of input sources from disk or over HTTP.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::io::Read;
use tracing::debug;

/// Downloads `url` and returns the body. Non-2xx statuses are errors.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

/// Whether `source` names a remote resource rather than a local path.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Reads `source` from a local path or fetches it with `client`, then
/// gunzips it when the name ends in `.gz`.
#[tracing::instrument(skip_all, fields(source = %source))]
pub async fn load_source<C: HttpClient>(client: &C, source: &str) -> Result<Vec<u8>> {
    let bytes = if is_remote(source) {
        fetch_bytes(client, source)
            .await
            .with_context(|| format!("Failed to fetch {source}"))?
    } else {
        std::fs::read(source).with_context(|| format!("Failed to read {source}"))?
    };
    debug!(bytes = bytes.len(), "Source loaded");

    if source.ends_with(".gz") {
        return gunzip(&bytes).with_context(|| format!("Failed to decompress {source}"));
    }
    Ok(bytes)
}

/// Decompresses a gzip stream.
pub fn gunzip(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    GzDecoder::new(bytes).read_to_end(&mut out)?;
    Ok(out)
}
