// Runtime configuration, read from the environment (and `.env`, loaded in main).

use crate::core::contact::SheetTarget;
use crate::infra::google::oauth_client::SPREADSHEETS_SCOPE;
use crate::infra::google::GoogleOAuthConfig;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PORT: u16 = 85;
const DEFAULT_DATABASE_URL: &str = "data/contacts.db";
const DEFAULT_SITE_DIR: &str = "public";
const DEFAULT_SHEET_ID: &str = "11OoQ7XECZ2VklJ53y8wDd-ZoVW3ETsRd_qqhO5Jwyx8";
const DEFAULT_SHEET_RANGE: &str = "Página1!A:G";
const DEFAULT_SHEETS_TIMEOUT_SECS: u64 = 30;
const DEFAULT_GOOGLE_HTTP_TIMEOUT_SECS: u64 = 10;

const GOOGLE_CLIENT_KEYS: [&str; 3] = [
    "GOOGLE_CLIENT_ID",
    "GOOGLE_CLIENT_SECRET",
    "GOOGLE_REDIRECT_URI",
];

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub site_dir: PathBuf,
    /// `None` when the OAuth client is not configured; the site then runs
    /// without the spreadsheet mirror.
    pub google: Option<GoogleOAuthConfig>,
    /// Bound on each individual request to Google.
    pub google_http_timeout: Duration,
    /// `timeout` bounds a whole mirror attempt (refresh plus append).
    pub sheet: SheetTarget,
}

impl SiteConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so it can be tested without
    /// touching the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let seconds = |key: &str, default: u64| -> Result<Duration> {
            let secs = match var(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .with_context(|| {
                        format!("{} must be a positive number, got {:?}", key, raw)
                    })?,
                None => default,
            };
            Ok(Duration::from_secs(secs))
        };

        let port = match var("PORT") {
            Some(port) => port
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got {:?}", port))?,
            None => DEFAULT_PORT,
        };
        let host = var("BIND_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let bind_addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", host, port))?;

        let scopes = var("GOOGLE_OAUTH_SCOPES")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|scopes| !scopes.is_empty())
            .unwrap_or_else(|| vec![SPREADSHEETS_SCOPE.to_string()]);

        let missing: Vec<&str> = GOOGLE_CLIENT_KEYS
            .into_iter()
            .filter(|key| var(*key).is_none())
            .collect();
        let client = (
            var("GOOGLE_CLIENT_ID"),
            var("GOOGLE_CLIENT_SECRET"),
            var("GOOGLE_REDIRECT_URI"),
        );
        let google = match client {
            (Some(client_id), Some(client_secret), Some(redirect_uri)) => {
                Some(GoogleOAuthConfig {
                    client_id,
                    client_secret,
                    redirect_uri,
                    scopes,
                })
            }
            _ => {
                tracing::warn!(
                    "Missing {}; contacts will be stored but not mirrored to the spreadsheet",
                    missing.join(", ")
                );
                None
            }
        };

        let google_http_timeout =
            seconds("GOOGLE_HTTP_TIMEOUT_SECS", DEFAULT_GOOGLE_HTTP_TIMEOUT_SECS)?;
        let mirror_timeout = seconds("SHEETS_TIMEOUT_SECS", DEFAULT_SHEETS_TIMEOUT_SECS)?;
        if mirror_timeout <= google_http_timeout {
            tracing::warn!(
                "SHEETS_TIMEOUT_SECS ({:?}) leaves no room for a token refresh before the \
                 append (GOOGLE_HTTP_TIMEOUT_SECS is {:?})",
                mirror_timeout,
                google_http_timeout
            );
        }

        Ok(Self {
            bind_addr,
            database_url: var("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            site_dir: PathBuf::from(
                var("SITE_DIR").unwrap_or_else(|| DEFAULT_SITE_DIR.to_string()),
            ),
            google,
            google_http_timeout,
            sheet: SheetTarget {
                spreadsheet_id: var("GOOGLE_SHEET_ID")
                    .unwrap_or_else(|| DEFAULT_SHEET_ID.to_string()),
                range: var("GOOGLE_SHEET_RANGE")
                    .unwrap_or_else(|| DEFAULT_SHEET_RANGE.to_string()),
                timeout: mirror_timeout,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const GOOGLE: [(&str, &str); 3] = [
        ("GOOGLE_CLIENT_ID", "id"),
        ("GOOGLE_CLIENT_SECRET", "secret"),
        ("GOOGLE_REDIRECT_URI", "http://localhost/api/auth/callback/google"),
    ];

    #[test]
    fn defaults_apply_when_only_google_is_set() {
        let config = SiteConfig::from_lookup(lookup(&GOOGLE)).unwrap();

        assert_eq!(config.bind_addr.port(), 85);
        assert_eq!(config.database_url, "data/contacts.db");
        assert_eq!(config.site_dir, PathBuf::from("public"));
        let google = config.google.unwrap();
        assert_eq!(google.scopes, vec![SPREADSHEETS_SCOPE.to_string()]);
        assert_eq!(config.sheet.range, "Página1!A:G");
    }

    #[test]
    fn mirror_timeout_leaves_room_for_a_refresh() {
        let config = SiteConfig::from_lookup(lookup(&GOOGLE)).unwrap();

        assert_eq!(config.google_http_timeout, Duration::from_secs(10));
        assert_eq!(config.sheet.timeout, Duration::from_secs(30));
        // A refresh and an append, each at its own request limit, fit.
        assert!(config.sheet.timeout >= config.google_http_timeout * 2);
    }

    #[test]
    fn overrides_are_read() {
        let mut pairs = GOOGLE.to_vec();
        pairs.extend([
            ("PORT", "8080"),
            ("BIND_HOST", "127.0.0.1"),
            ("GOOGLE_OAUTH_SCOPES", "scope-a, scope-b,"),
            ("SHEETS_TIMEOUT_SECS", "3"),
            ("GOOGLE_HTTP_TIMEOUT_SECS", "1"),
            ("GOOGLE_SHEET_ID", "abc"),
        ]);
        let config = SiteConfig::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.google.unwrap().scopes, vec!["scope-a", "scope-b"]);
        assert_eq!(config.sheet.timeout, Duration::from_secs(3));
        assert_eq!(config.google_http_timeout, Duration::from_secs(1));
        assert_eq!(config.sheet.spreadsheet_id, "abc");
    }

    #[test]
    fn incomplete_google_client_disables_the_mirror() {
        let config = SiteConfig::from_lookup(lookup(&GOOGLE[..2])).unwrap();
        assert!(config.google.is_none());

        let config = SiteConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.google.is_none());
        assert_eq!(config.database_url, "data/contacts.db");
    }

    #[test]
    fn invalid_numbers_are_errors() {
        let mut pairs = GOOGLE.to_vec();
        pairs.push(("PORT", "eighty"));
        assert!(SiteConfig::from_lookup(lookup(&pairs)).is_err());

        let mut pairs = GOOGLE.to_vec();
        pairs.push(("SHEETS_TIMEOUT_SECS", "0"));
        assert!(SiteConfig::from_lookup(lookup(&pairs)).is_err());

        let mut pairs = GOOGLE.to_vec();
        pairs.push(("GOOGLE_HTTP_TIMEOUT_SECS", "soon"));
        let err = SiteConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("GOOGLE_HTTP_TIMEOUT_SECS"));
    }
}
