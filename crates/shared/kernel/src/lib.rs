//! Kernel utilities shared by the server binary and controllers.
//! It owns versioning, `OpenAPI` document synthesis and the HTTP middleware;
//! controllers plug in through [`server::ApiController`].
//!
//! ## Config loading
//! ```rust,ignore
//! use wine_kernel::config::load_config;
//! let cfg: wine_kernel::domain::config::ApiConfig = load_config(Some("server")).unwrap();
//! ```
pub mod config;
pub mod docs;
pub mod prelude;
pub mod server;
pub mod versioning;

pub use wine_domain as domain;
