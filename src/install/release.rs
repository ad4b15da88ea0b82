use std::time::Instant;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;

use super::InstallError;

/// Explicit HTTP settings for one install run.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub api_url: String,
    pub user_agent: String,
    pub proxy: Option<String>,
    /// Sent as a bearer token to raise the API rate limit.
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub zipball_url: Option<String>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    pub name: String,
    pub browser_download_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => Platform::Windows,
            "linux" => Platform::Linux,
            "macos" => Platform::MacOs,
            _ => Platform::Other,
        }
    }

    /// Substring identifying this platform's prebuilt protoc archive.
    pub fn asset_marker(&self) -> Option<&'static str> {
        match self {
            Platform::Windows => Some("win64"),
            Platform::Linux => Some("linux-x86_64"),
            Platform::MacOs => Some("osx-x86_64"),
            Platform::Other => None,
        }
    }
}

/// Pick the asset built for `platform`.
pub fn select_asset(assets: &[Asset], platform: Platform) -> Result<&Asset, InstallError> {
    let marker = platform.asset_marker().ok_or(InstallError::AssetNotMatched)?;
    assets
        .iter()
        .find(|asset| asset.name.contains(marker))
        .ok_or(InstallError::AssetNotMatched)
}

pub struct ReleaseClient {
    http: Client,
    api_url: String,
}

impl ReleaseClient {
    pub fn new(config: &HttpConfig) -> Result<Self, InstallError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|err| InstallError::Config(format!("invalid token: {err}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers);

        if let Some(proxy_url) = config.proxy.as_deref() {
            tracing::info!(proxy = %proxy_url, "using proxy for downloads");
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        Ok(Self {
            http: builder.build()?,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Most recent release of `owner/repo`.
    pub fn latest_release(&self, owner: &str, repo: &str) -> Result<Release, InstallError> {
        let url = format!("{}/repos/{owner}/{repo}/releases?per_page=1", self.api_url);
        tracing::debug!(%url, "listing releases");

        let releases: Vec<Release> = self.http.get(&url).send()?.error_for_status()?.json()?;
        first_release(releases)
    }

    /// Download the protoc archive for `platform`.
    pub fn download_asset(
        &self,
        release: &Release,
        platform: Platform,
    ) -> Result<Vec<u8>, InstallError> {
        let asset = select_asset(&release.assets, platform)?;
        tracing::info!(asset = %asset.name, "selected release asset");
        self.download(&asset.browser_download_url)
    }

    /// Download the source zipball of `release`.
    pub fn download_zipball(&self, release: &Release) -> Result<Vec<u8>, InstallError> {
        let url = release
            .zipball_url
            .as_deref()
            .ok_or_else(|| InstallError::MissingZipball(release.tag_name.clone()))?;
        self.download(url)
    }

    pub fn download(&self, url: &str) -> Result<Vec<u8>, InstallError> {
        let started = Instant::now();
        let bytes = self.http.get(url).send()?.error_for_status()?.bytes()?;
        tracing::info!(
            %url,
            size = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "downloaded"
        );
        Ok(bytes.to_vec())
    }
}

fn first_release(releases: Vec<Release>) -> Result<Release, InstallError> {
    releases.into_iter().next().ok_or(InstallError::ReleaseNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assets() -> Vec<Asset> {
        ["protoc-x-win64.zip", "protoc-x-linux-x86_64.zip", "protoc-x-osx-x86_64.zip"]
            .into_iter()
            .map(|name| Asset {
                name: name.to_string(),
                browser_download_url: format!("https://example.invalid/{name}"),
            })
            .collect()
    }

    #[test]
    fn selects_asset_per_platform() {
        let assets = assets();
        let cases = [
            (Platform::Windows, "protoc-x-win64.zip"),
            (Platform::Linux, "protoc-x-linux-x86_64.zip"),
            (Platform::MacOs, "protoc-x-osx-x86_64.zip"),
        ];
        for (platform, expected) in cases {
            assert_eq!(select_asset(&assets, platform).unwrap().name, expected);
        }
    }

    #[test]
    fn no_matching_asset() {
        let assets = vec![Asset {
            name: "protobuf-all-21.12.zip".into(),
            browser_download_url: "https://example.invalid/all.zip".into(),
        }];
        for platform in [Platform::Windows, Platform::Linux, Platform::MacOs, Platform::Other] {
            assert!(matches!(
                select_asset(&assets, platform),
                Err(InstallError::AssetNotMatched)
            ));
        }
        assert!(matches!(
            select_asset(&[], Platform::current()),
            Err(InstallError::AssetNotMatched)
        ));
    }

    #[test]
    fn parses_release_listing() {
        let body = r#"[{
            "tag_name": "v21.12",
            "zipball_url": "https://api.github.com/repos/protocolbuffers/protobuf/zipball/v21.12",
            "draft": false,
            "assets": [
                {"name": "protoc-21.12-linux-x86_64.zip", "size": 1, "browser_download_url": "https://github.com/a.zip"}
            ]
        }]"#;
        let releases: Vec<Release> = serde_json::from_str(body).unwrap();
        let release = first_release(releases).unwrap();
        assert_eq!(release.tag_name, "v21.12");
        assert_eq!(release.assets.len(), 1);
        assert_eq!(
            select_asset(&release.assets, Platform::Linux).unwrap().browser_download_url,
            "https://github.com/a.zip"
        );
    }

    #[test]
    fn empty_listing_is_release_not_found() {
        let releases: Vec<Release> = serde_json::from_str("[]").unwrap();
        assert!(matches!(first_release(releases), Err(InstallError::ReleaseNotFound)));
    }

    #[test]
    fn zipball_is_required_for_sources() {
        let client = ReleaseClient::new(&HttpConfig {
            api_url: "https://api.github.com/".into(),
            user_agent: "protob-test".into(),
            proxy: None,
            token: None,
        })
        .unwrap();
        assert_eq!(client.api_url, "https://api.github.com");

        let release = Release {
            tag_name: "v1.3.2".into(),
            zipball_url: None,
            assets: Vec::new(),
        };
        assert!(matches!(
            client.download_zipball(&release),
            Err(InstallError::MissingZipball(tag)) if tag == "v1.3.2"
        ));
    }

    #[test]
    fn rejects_bad_proxy() {
        let result = ReleaseClient::new(&HttpConfig {
            api_url: "https://api.github.com".into(),
            user_agent: "protob-test".into(),
            proxy: Some("http://bad host:8080".into()),
            token: None,
        });
        assert!(result.is_err());
    }
}
