//! Backend origin configuration.

use reqwest::Url;

use crate::error::ClientError;

/// Origin used when no override is configured.
pub const DEFAULT_ORIGIN: &str = "http://localhost:8000";

/// Name of the variable overriding the backend origin.
pub const ORIGIN_VAR: &str = "MARKETLENS_API_URL";

/// Where the analysis backend lives. Built once and handed to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    origin: Url,
}

impl BackendConfig {
    pub fn new(origin: &str) -> Result<Self, ClientError> {
        let mut origin = Url::parse(origin.trim())
            .map_err(|err| ClientError::Config(format!("invalid backend origin `{origin}`: {err}")))?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "backend origin must be http(s), got `{}`",
                origin.scheme()
            )));
        }
        origin.set_query(None);
        origin.set_fragment(None);
        Ok(Self { origin })
    }

    /// Reads the origin override (runtime variable natively, build-time on wasm).
    pub fn from_env() -> Result<Self, ClientError> {
        #[cfg(target_arch = "wasm32")]
        let configured = option_env!("MARKETLENS_API_URL").map(str::to_string);

        #[cfg(not(target_arch = "wasm32"))]
        let configured = std::env::var(ORIGIN_VAR).ok();

        match configured.filter(|value| !value.trim().is_empty()) {
            Some(value) => Self::new(&value),
            None => Self::new(DEFAULT_ORIGIN),
        }
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Endpoint URL built from path segments; a trailing `""` keeps a trailing slash.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.origin.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ClientError::Config(format!("backend origin `{}` cannot be a base", self.origin))
            })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    /// Resolves a backend-relative resource path (`/static/...`) against the origin.
    /// Absolute URLs are returned unchanged.
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.origin.as_str().trim_end_matches('/');
        format!("{base}/{}", path.trim_start_matches('/'))
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            origin: Url::parse(DEFAULT_ORIGIN).expect("default origin is a valid URL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_trailing_slash_for_upload() {
        let config = BackendConfig::new("http://localhost:8000").unwrap();
        let url = config.endpoint(&["upload", ""]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/upload/");
    }

    #[test]
    fn endpoint_respects_path_prefix() {
        let config = BackendConfig::new("https://example.com/api/").unwrap();
        let url = config.endpoint(&["analyze", "abc123"]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/analyze/abc123");
    }

    #[test]
    fn endpoint_escapes_opaque_session_ids() {
        let config = BackendConfig::default();
        let url = config.endpoint(&["results", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/results/a%20b%2Fc");
    }

    #[test]
    fn resolve_joins_relative_paths() {
        let config = BackendConfig::new("http://localhost:8000/").unwrap();
        assert_eq!(
            config.resolve("/images/abc123/clusters.png"),
            "http://localhost:8000/images/abc123/clusters.png"
        );
        assert_eq!(
            config.resolve("static/x.png"),
            "http://localhost:8000/static/x.png"
        );
    }

    #[test]
    fn resolve_passes_absolute_urls_through() {
        let config = BackendConfig::default();
        let url = "https://cdn.example.com/heatmap.png";
        assert_eq!(config.resolve(url), url);
    }

    #[test]
    fn rejects_non_http_origins() {
        assert!(matches!(
            BackendConfig::new("ftp://example.com"),
            Err(ClientError::Config(_))
        ));
        assert!(matches!(
            BackendConfig::new("not a url"),
            Err(ClientError::Config(_))
        ));
    }
}
