//! Per-version `OpenAPI` documents.
//!
//! Controllers are documented once, without a version prefix. [`versioned_documents`]
//! clones that base document for every supported version, substitutes the version
//! group into each path (`/health` becomes `/v1.0/health`), stamps the version's
//! [`Info`] and merges XML documentation comments.

mod xml;

pub use xml::{DocsError, XmlComments};

use crate::versioning::ApiVersionSet;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityRequirement, SecurityScheme};
use utoipa::openapi::{Components, Info, InfoBuilder, LicenseBuilder, OpenApi};
use wine_domain::config::DocsConfig;
use wine_domain::constants::{BEARER_SCHEME, DEPRECATION_NOTICE};
use wine_domain::version::ApiVersionDescription;

/// One generated document and the version it describes.
#[derive(Debug, Clone)]
pub struct VersionedDocument {
    pub description: ApiVersionDescription,
    pub openapi: OpenApi,
}

/// Document metadata for a single version.
#[must_use]
pub fn version_info(description: &ApiVersionDescription, cfg: &DocsConfig) -> Info {
    let mut text = cfg.description.clone();
    if description.deprecated {
        text.push_str(DEPRECATION_NOTICE);
    }

    let license = LicenseBuilder::new()
        .name(cfg.license_name.as_str())
        .url(Some(cfg.license_url.as_str()))
        .build();

    InfoBuilder::new()
        .title(cfg.title.as_str())
        .description(Some(text))
        .license(Some(license))
        .version(description.version.to_string())
        .build()
}

/// Builds the document of one version from the unversioned base document.
#[must_use]
pub fn versioned_document(
    base: &OpenApi,
    description: &ApiVersionDescription,
    cfg: &DocsConfig,
    comments: Option<&XmlComments>,
) -> OpenApi {
    let mut doc = base.clone();
    doc.info = version_info(description, cfg);

    let group = &description.group_name;
    doc.paths.paths = std::mem::take(&mut doc.paths.paths)
        .into_iter()
        .map(|(path, item)| (format!("/{group}{path}"), item))
        .collect();

    require_bearer(&mut doc);

    if let Some(comments) = comments {
        comments.apply(&mut doc);
    }

    doc
}

/// Builds one document per supported version, in ascending version order.
#[must_use]
pub fn versioned_documents(
    base: &OpenApi,
    versions: &ApiVersionSet,
    cfg: &DocsConfig,
    comments: Option<&XmlComments>,
) -> Vec<VersionedDocument> {
    versions
        .descriptions()
        .iter()
        .map(|description| VersionedDocument {
            description: description.clone(),
            openapi: versioned_document(base, description, cfg, comments),
        })
        .collect()
}

fn require_bearer(doc: &mut OpenApi) {
    doc.components.get_or_insert_with(Components::default).add_security_scheme(
        BEARER_SCHEME,
        SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
    );
    doc.security = Some(vec![SecurityRequirement::new(BEARER_SCHEME, Vec::<String>::new())]);
}
