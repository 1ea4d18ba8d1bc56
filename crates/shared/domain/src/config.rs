use crate::constants::{API_DESCRIPTION, API_LICENSE_NAME, API_LICENSE_URL, API_TITLE};
use crate::version::ApiVersion;
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level API configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub versioning: VersioningConfig,
    pub docs: DocsConfig,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    /// API port (HTTPS when `ssl` is set).
    pub port: u16,
    /// Plain HTTP port redirecting to `port`; only bound when `ssl` is set.
    pub http_port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// URL-segment API versioning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VersioningConfig {
    pub default_version: ApiVersion,
    pub assume_default_version_when_unspecified: bool,
    pub report_api_versions: bool,
    pub versions: Vec<VersionEntry>,
}

/// A single supported API version.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VersionEntry {
    pub version: ApiVersion,
    #[serde(default)]
    pub deprecated: bool,
}

/// `OpenAPI` document metadata shared by every version.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    pub title: String,
    pub description: String,
    pub license_name: String,
    pub license_url: String,
    /// Overrides the `<executable>.xml` documentation comments lookup.
    pub xml_comments: Option<PathBuf>,
}

/// Bearer tokens accepted on API routes.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Accepted bearer tokens; a comma-separated string is also accepted (`a,b`).
    #[serde(deserialize_with = "string_or_list")]
    pub api_tokens: Vec<String>,
}

fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrList;

    impl<'de> Visitor<'de> for StringOrList {
        type Value = Vec<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a list of strings or a comma-separated string")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Ok(value.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned).collect())
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut items = Vec::with_capacity(seq.size_hint().unwrap_or_default());
            while let Some(item) = seq.next_element::<String>()? {
                items.push(item);
            }
            Ok(items)
        }
    }

    deserializer.deserialize_any(StringOrList)
}

/// Logger settings consumed by the binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub env_filter: Option<String>,
    pub directory: Option<PathBuf>,
    pub json: bool,
    pub max_files: usize,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 4583, http_port: 4580, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            default_version: ApiVersion::new(1, 0),
            assume_default_version_when_unspecified: true,
            report_api_versions: true,
            versions: vec![VersionEntry { version: ApiVersion::new(1, 0), deprecated: false }],
        }
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            title: API_TITLE.to_owned(),
            description: API_DESCRIPTION.to_owned(),
            license_name: API_LICENSE_NAME.to_owned(),
            license_url: API_LICENSE_URL.to_owned(),
            xml_comments: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            env_filter: None,
            directory: None,
            json: false,
            max_files: 10,
        }
    }
}
