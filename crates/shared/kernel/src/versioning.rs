use std::borrow::Cow;
use wine_domain::config::VersioningConfig;
use wine_domain::error::format_context;
use wine_domain::version::{ApiVersion, ApiVersionDescription};

#[derive(Debug, thiserror::Error)]
pub enum VersioningError {
    #[error("Invalid version set{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Duplicate API version{}: {version}", format_context(.context))]
    Duplicate { version: ApiVersion, context: Option<Cow<'static, str>> },
    #[error("Default API version is not supported{}: {version}", format_context(.context))]
    UnknownDefault { version: ApiVersion, context: Option<Cow<'static, str>> },
}

/// The validated set of API versions the server exposes.
///
/// Descriptions are sorted ascending and unique; the default version is always a member.
#[derive(Debug, Clone)]
pub struct ApiVersionSet {
    descriptions: Vec<ApiVersionDescription>,
    default_version: ApiVersion,
    assume_default: bool,
    report: bool,
}

impl ApiVersionSet {
    /// Builds the set from configuration.
    ///
    /// # Errors
    /// * No versions are configured.
    /// * A version is listed twice.
    /// * The default version is not listed.
    pub fn from_config(cfg: &VersioningConfig) -> Result<Self, VersioningError> {
        if cfg.versions.is_empty() {
            return Err(VersioningError::Validation {
                message: "at least one API version must be configured".into(),
                context: None,
            });
        }

        let mut descriptions: Vec<ApiVersionDescription> = cfg
            .versions
            .iter()
            .map(|entry| ApiVersionDescription::new(entry.version, entry.deprecated))
            .collect();
        descriptions.sort_by_key(|d| d.version);

        if let Some(pair) = descriptions.windows(2).find(|w| w[0].version == w[1].version) {
            return Err(VersioningError::Duplicate {
                version: pair[0].version,
                context: Some("versioning.versions".into()),
            });
        }

        if !descriptions.iter().any(|d| d.version == cfg.default_version) {
            return Err(VersioningError::UnknownDefault {
                version: cfg.default_version,
                context: Some("versioning.default_version".into()),
            });
        }

        Ok(Self {
            descriptions,
            default_version: cfg.default_version,
            assume_default: cfg.assume_default_version_when_unspecified,
            report: cfg.report_api_versions,
        })
    }

    #[must_use]
    pub fn descriptions(&self) -> &[ApiVersionDescription] {
        &self.descriptions
    }

    #[must_use]
    pub const fn default_version(&self) -> ApiVersion {
        self.default_version
    }

    #[must_use]
    pub const fn assume_default(&self) -> bool {
        self.assume_default
    }

    #[must_use]
    pub const fn reports_versions(&self) -> bool {
        self.report
    }

    #[must_use]
    pub fn get(&self, version: ApiVersion) -> Option<&ApiVersionDescription> {
        self.descriptions
            .binary_search_by_key(&version, |d| d.version)
            .ok()
            .map(|idx| &self.descriptions[idx])
    }

    /// Value of the `api-supported-versions` header (non-deprecated versions).
    #[must_use]
    pub fn supported_header(&self) -> Option<String> {
        join_versions(self.descriptions.iter().filter(|d| !d.deprecated))
    }

    /// Value of the `api-deprecated-versions` header.
    #[must_use]
    pub fn deprecated_header(&self) -> Option<String> {
        join_versions(self.descriptions.iter().filter(|d| d.deprecated))
    }
}

fn join_versions<'a>(descriptions: impl Iterator<Item = &'a ApiVersionDescription>) -> Option<String> {
    let joined = descriptions.map(|d| d.version.to_string()).collect::<Vec<_>>().join(", ");
    (!joined.is_empty()).then_some(joined)
}
