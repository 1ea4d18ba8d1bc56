//! HTTP plumbing: shared state, versioning and authorization middleware,
//! the HTTPS redirect listener and the system controller.

mod authorization;
mod error;
mod health;
mod redirect;
pub mod router;
mod state;
mod versioning;

pub use authorization::require_bearer;
pub use error::ApiError;
pub use health::{HealthResponse, HealthStatus};
pub use redirect::https_redirect_router;
pub use router::{ApiController, system_router};
pub use state::{ApiState, ApiStateBuilder, ApiStateError, ApiStateInner};
pub use versioning::{
    RequestedVersion, api_versioning, reject_version_segment, with_version_segments,
};
