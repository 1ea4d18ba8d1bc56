//! Fixed strings shared by the documentation and HTTP layers.

pub const API_TITLE: &str = "Wine Grapes API";
pub const API_DESCRIPTION: &str = "Wine Grapes database API based on VIVC catalog.";
pub const API_LICENSE_NAME: &str = "(c) jKi";
pub const API_LICENSE_URL: &str = "https://www.vivc.de/index.php?r=site%2Fdisclaimer";
pub const DEPRECATION_NOTICE: &str = "This API version has been deprecated";

pub const SYSTEM_TAG: &str = "System";

/// Name of the bearer security scheme in generated documents.
pub const BEARER_SCHEME: &str = "bearer";

pub const SUPPORTED_VERSIONS_HEADER: &str = "api-supported-versions";
pub const DEPRECATED_VERSIONS_HEADER: &str = "api-deprecated-versions";
