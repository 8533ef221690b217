//! Locating and downloading template bundles from GitHub releases.

use crate::agent::Agent;
use crate::bundle;
use crate::error::{Result, SpecifyError};
use crate::script::ScriptType;
use reqwest::blocking::{Client, Response};
use reqwest::header;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_REPO: &str = "github/spec-kit";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    pub browser_download_url: String,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub api_base: String,
    /// `owner/name` of the repository publishing the bundles.
    pub repo: String,
    pub token: Option<String>,
    pub skip_tls: bool,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            repo: DEFAULT_REPO.to_string(),
            token: None,
            skip_tls: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Pick the GitHub token: explicit value, then `GH_TOKEN`, then
/// `GITHUB_TOKEN`. Blank values are treated as absent.
pub fn resolve_token(explicit: Option<&str>) -> Option<String> {
    let gh = std::env::var("GH_TOKEN").ok();
    let github = std::env::var("GITHUB_TOKEN").ok();
    first_token([explicit, gh.as_deref(), github.as_deref()])
}

fn first_token<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

pub struct ReleaseClient {
    client: Client,
    opts: ClientOptions,
}

impl ReleaseClient {
    pub fn new(opts: ClientOptions) -> Result<Self> {
        if opts.skip_tls {
            tracing::warn!("TLS certificate verification disabled");
        }
        let client = Client::builder()
            .user_agent(concat!("specify-cli/", env!("CARGO_PKG_VERSION")))
            .timeout(opts.timeout)
            .danger_accept_invalid_certs(opts.skip_tls)
            .build()?;
        Ok(Self { client, opts })
    }

    pub fn latest_release(&self) -> Result<Release> {
        let url = format!(
            "{}/repos/{}/releases/latest",
            self.opts.api_base.trim_end_matches('/'),
            self.opts.repo
        );
        tracing::debug!(%url, "fetching latest release");
        let release: Release = self.get(&url, "application/vnd.github+json")?.json()?;
        tracing::debug!(tag = %release.tag_name, assets = release.assets.len(), "found release");
        Ok(release)
    }

    pub fn download(&self, asset: &Asset) -> Result<Vec<u8>> {
        tracing::debug!(url = %asset.browser_download_url, size = asset.size, "downloading asset");
        let bytes = self
            .get(&asset.browser_download_url, "application/octet-stream")?
            .bytes()?;
        Ok(bytes.to_vec())
    }

    fn get(&self, url: &str, accept: &str) -> Result<Response> {
        let mut request = self.client.get(url).header(header::ACCEPT, accept);
        if let Some(token) = &self.opts.token {
            request = request.bearer_auth(token);
        }
        let response = request.send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(SpecifyError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
            hint: rate_limit_hint(&response),
        })
    }
}

fn rate_limit_hint(response: &Response) -> String {
    let status = response.status().as_u16();
    if status != 403 && status != 429 {
        return String::new();
    }
    let header = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let mut hint = String::from(
        " (GitHub API rate limit may be exhausted; pass --github-token or set GH_TOKEN/GITHUB_TOKEN",
    );
    if let Some(remaining) = header("x-ratelimit-remaining") {
        hint.push_str(&format!("; remaining: {remaining}"));
    }
    if let Some(reset) = header("x-ratelimit-reset") {
        let when = reset
            .parse::<i64>()
            .ok()
            .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
            .map(|t| t.to_rfc3339())
            .unwrap_or(reset);
        hint.push_str(&format!("; resets at {when}"));
    }
    hint.push(')');
    hint
}

/// Find the asset for `agent`/`script` in a release.
pub fn find_template_asset(release: &Release, agent: Agent, script: ScriptType) -> Result<&Asset> {
    let stem = bundle::asset_stem(agent, script);
    release
        .assets
        .iter()
        .find(|a| a.name.starts_with(&format!("{stem}-")) && a.name.ends_with(".zip"))
        .ok_or_else(|| SpecifyError::TemplateAssetNotFound {
            pattern: format!("{stem}-*.zip"),
            tag: release.tag_name.clone(),
            available: if release.assets.is_empty() {
                "none".to_string()
            } else {
                release
                    .assets
                    .iter()
                    .map(|a| a.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            },
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
