pub use crate::docs::{VersionedDocument, XmlComments};
pub use crate::server::{ApiController, ApiError, ApiState};
pub use crate::versioning::ApiVersionSet;
pub use wine_domain::config::ApiConfig;
pub use wine_domain::version::{ApiVersion, ApiVersionDescription};
