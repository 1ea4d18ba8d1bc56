use crate::docs::XmlComments;
use crate::versioning::{ApiVersionSet, VersioningError};
use axum::extract::FromRef;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Instant;
use wine_domain::config::ApiConfig;
use wine_domain::error::format_context;

#[derive(Debug, thiserror::Error)]
pub enum ApiStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("State versioning error{}: {source}", format_context(.context))]
    Versioning { source: VersioningError, context: Option<Cow<'static, str>> },
}

impl From<VersioningError> for ApiStateError {
    fn from(source: VersioningError) -> Self {
        Self::Versioning { source, context: None }
    }
}

#[derive(Debug)]
pub struct ApiStateInner {
    pub config: ApiConfig,
    pub versions: ApiVersionSet,
    pub comments: Option<XmlComments>,
    pub started_at: Instant,
}

/// Immutable process-wide state handed to every handler.
#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }

    /// Whether `token` is one of the configured API tokens.
    #[must_use]
    pub fn accepts_token(&self, token: &str) -> bool {
        self.inner.config.security.api_tokens.iter().any(|known| known == token)
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<ApiState> for ApiConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.config.clone()
    }
}

#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    config: Option<ApiConfig>,
    versions: Option<ApiVersionSet>,
    comments: Option<XmlComments>,
}

impl ApiStateBuilder {
    #[must_use]
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Uses an already validated version set instead of deriving one from the config.
    #[must_use]
    pub fn versions(mut self, versions: ApiVersionSet) -> Self {
        self.versions = Some(versions);
        self
    }

    #[must_use]
    pub fn comments(mut self, comments: Option<XmlComments>) -> Self {
        self.comments = comments;
        self
    }

    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let config = self.config.ok_or_else(|| ApiStateError::Validation {
            message: "ApiConfig not provided".into(),
            context: None,
        })?;
        let versions = match self.versions {
            Some(versions) => versions,
            None => ApiVersionSet::from_config(&config.versioning)?,
        };

        Ok(ApiState {
            inner: Arc::new(ApiStateInner {
                config,
                versions,
                comments: self.comments,
                started_at: Instant::now(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wine_domain::version::ApiVersion;

    #[test]
    fn requires_config() {
        let err = ApiState::builder().build().expect_err("config is mandatory");
        assert!(matches!(err, ApiStateError::Validation { .. }));
    }

    #[test]
    fn derives_versions_from_config() {
        let state = ApiState::builder().config(ApiConfig::default()).build().expect("state");
        assert_eq!(state.versions.default_version(), ApiVersion::new(1, 0));
        assert!(state.comments.is_none());
    }

    #[test]
    fn invalid_versioning_is_reported() {
        let mut config = ApiConfig::default();
        config.versioning.versions.clear();

        let err = ApiState::builder().config(config).build().expect_err("empty version set");
        assert!(matches!(err, ApiStateError::Versioning { .. }));
    }

    #[test]
    fn token_check() {
        let mut config = ApiConfig::default();
        config.security.api_tokens = vec!["secret".to_owned()];
        let state = ApiState::builder().config(config).build().expect("state");

        assert!(state.accepts_token("secret"));
        assert!(!state.accepts_token("Secret"));
        assert!(!state.accepts_token(""));
    }
}
