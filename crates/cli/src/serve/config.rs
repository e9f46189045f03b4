//! Server configuration assembled from CLI flags and environment variables.

use std::path::PathBuf;

use super::DEFAULT_RATE_LIMIT;

pub(crate) const API_KEY_VAR: &str = "PROBLEMFLOW_API_KEY";
pub(crate) const RATE_LIMIT_VAR: &str = "PROBLEMFLOW_RATE_LIMIT";
pub(crate) const INSTANCE_URL_VAR: &str = "PROBLEMFLOW_INSTANCE_URL";

/// Everything `start_server` needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ServeConfig {
    pub(crate) port: u16,
    pub(crate) seed: PathBuf,
    /// Base for reference links. Always ends with `/`.
    pub(crate) instance_url: String,
    /// None = no auth required.
    pub(crate) api_key: Option<String>,
    /// Requests per minute per IP.
    pub(crate) rate_limit: u64,
    pub(crate) tls_cert: Option<PathBuf>,
    pub(crate) tls_key: Option<PathBuf>,
}

impl ServeConfig {
    /// Read configuration from the process environment.
    pub(crate) fn from_env(port: u16, seed: PathBuf, instance_url: Option<String>) -> Self {
        Self::from_lookup(port, seed, instance_url, |name| std::env::var(name).ok())
    }

    /// `lookup` stands in for the environment. A flag value wins over the
    /// matching variable.
    pub(crate) fn from_lookup(
        port: u16,
        seed: PathBuf,
        instance_url: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let instance_url = instance_url
            .or_else(|| lookup(INSTANCE_URL_VAR))
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| format!("http://localhost:{}/", port));

        let rate_limit = lookup(RATE_LIMIT_VAR)
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT);

        let api_key = lookup(API_KEY_VAR).filter(|k| !k.is_empty());

        Self {
            port,
            seed,
            instance_url: with_trailing_slash(instance_url.trim()),
            api_key,
            rate_limit,
            tls_cert: None,
            tls_key: None,
        }
    }

    pub(crate) fn with_tls(mut self, cert: Option<PathBuf>, key: Option<PathBuf>) -> Self {
        self.tls_cert = cert;
        self.tls_key = key;
        self
    }
}

pub(crate) fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(instance_url: Option<&str>, env: &[(&str, &str)]) -> ServeConfig {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServeConfig::from_lookup(
            8080,
            PathBuf::from("problems.json"),
            instance_url.map(str::to_string),
            |name| env.get(name).cloned(),
        )
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = config(None, &[]);
        assert_eq!(cfg.instance_url, "http://localhost:8080/");
        assert_eq!(cfg.rate_limit, DEFAULT_RATE_LIMIT);
        assert_eq!(cfg.api_key, None);
    }

    #[test]
    fn instance_url_gets_trailing_slash() {
        let cfg = config(Some("https://dev00000.service-now.com"), &[]);
        assert_eq!(cfg.instance_url, "https://dev00000.service-now.com/");
    }

    #[test]
    fn flag_wins_over_environment() {
        let cfg = config(
            Some("https://flag.example/"),
            &[(INSTANCE_URL_VAR, "https://env.example/")],
        );
        assert_eq!(cfg.instance_url, "https://flag.example/");

        let cfg = config(None, &[(INSTANCE_URL_VAR, "https://env.example")]);
        assert_eq!(cfg.instance_url, "https://env.example/");
    }

    #[test]
    fn rate_limit_and_key_from_environment() {
        let cfg = config(None, &[(RATE_LIMIT_VAR, "5"), (API_KEY_VAR, "s3cret")]);
        assert_eq!(cfg.rate_limit, 5);
        assert_eq!(cfg.api_key.as_deref(), Some("s3cret"));
    }

    #[test]
    fn unparseable_rate_limit_and_empty_key_fall_back() {
        let cfg = config(None, &[(RATE_LIMIT_VAR, "lots"), (API_KEY_VAR, "")]);
        assert_eq!(cfg.rate_limit, DEFAULT_RATE_LIMIT);
        assert_eq!(cfg.api_key, None);
    }
}
