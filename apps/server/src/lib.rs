//! # Wine Grapes API Server
//!
//! Bootstraps the HTTP service: URL-segment API versioning, controller routing,
//! one `OpenAPI` document per version behind a Swagger UI at `/`, HTTPS redirection
//! and bearer authorization.
//!
//! ## Example
//! ```no_run
//! use wine_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(4583)
//!         .build()?
//!         .run()
//!         .await
//! }
//! ```

mod router;

use anyhow::{Context, Result};
use axum::Router;
use axum_server::Handle;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use wine_kernel::docs::XmlComments;
use wine_kernel::prelude::{ApiConfig, ApiController, ApiState, ApiVersionSet};
use wine_kernel::server::{https_redirect_router, system_router};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug)]
pub struct ServerBuilder {
    cfg: ApiConfig,
    controllers: Vec<ApiController>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self { cfg: ApiConfig::default(), controllers: vec![system_router as ApiController] }
    }
}

impl ServerBuilder {
    /// Set up the server's configuration.
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    /// Registers an additional controller next to the system controller.
    pub fn controller(mut self, controller: ApiController) -> Self {
        self.controllers.push(controller);
        self
    }

    fn validate_ssl_config(&self) -> Result<()> {
        if let Some(ssl) = &self.cfg.server.ssl {
            if !ssl.cert.exists() {
                anyhow::bail!("SSL certificate not found at: {}", ssl.cert.display());
            }
            if !ssl.key.exists() {
                anyhow::bail!("SSL key not found at: {}", ssl.key.display());
            }
            if self.cfg.server.http_port == self.cfg.server.port {
                anyhow::bail!(
                    "HTTP redirect port must differ from the HTTPS port ({})",
                    self.cfg.server.port
                );
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let metadata = ssl.key.metadata()?;
                if metadata.permissions().mode() & 0o077 != 0 {
                    warn!(
                        "SECURITY: SSL Private Key {} has insecure permissions (should be 600)",
                        ssl.key.display()
                    );
                }
            }
        }
        Ok(())
    }

    fn load_comments(&self) -> Result<Option<XmlComments>> {
        let Some(path) = self.cfg.docs.xml_comments.clone().or_else(XmlComments::default_path)
        else {
            return Ok(None);
        };
        XmlComments::load(&path).context("Failed to load API documentation comments")
    }

    /// Consumes the builder and initializes the server.
    ///
    /// # Process
    /// 1. Validates the TLS configuration
    /// 2. Validates the API version set
    /// 3. Loads XML documentation comments, if present
    /// 4. Constructs application state
    ///
    /// # Errors
    /// Returns an error if:
    /// * SSL certificate/key files are missing
    /// * The version set is empty, has duplicates or lacks the default version
    /// * The documentation comments file exists but is malformed
    pub fn build(self) -> Result<Server> {
        // 1. Validate SSL Configuration
        self.validate_ssl_config()?;

        // 2. Versioning
        let versions =
            ApiVersionSet::from_config(&self.cfg.versioning).context("Invalid API versioning")?;

        info!(
            default = %versions.default_version(),
            versions = versions.descriptions().len(),
            "API versioning configured"
        );

        // 3. Documentation comments
        let comments = self.load_comments()?;

        if self.cfg.security.api_tokens.is_empty() {
            warn!("No API tokens configured; every API request will be rejected");
        }

        // 4. Construct State
        let state = ApiState::builder()
            .config(self.cfg)
            .versions(versions)
            .comments(comments)
            .build()
            .context("Failed to finalize API state")?;

        Ok(Server { state, controllers: self.controllers })
    }
}

/// A fully initialized server instance ready to run.
///
/// This struct is returned by [`ServerBuilder::build`] and contains
/// all necessary runtime state.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
    controllers: Vec<ApiController>,
}

impl Server {
    /// Returns a new [`ServerBuilder`] to configure the server.
    ///
    /// # Examples
    /// ```no_run
    /// # use wine_server::Server;
    /// # async fn example() -> anyhow::Result<()> {
    /// let server = Server::builder()
    ///     .port(4583)
    ///     .build()?;
    ///
    /// server.run().await
    /// # }
    /// ```
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// The complete application router (documentation, versioning, authorization).
    #[must_use]
    pub fn router(&self) -> Router {
        router::init(self.state.clone(), &self.controllers)
    }

    /// Starts the server and runs until the shutdown signal is received.
    ///
    /// With TLS configured, the API is served over HTTPS and a second, plain HTTP
    /// listener redirects to it.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the configured address
    /// or if SSL/TLS setup fails.
    pub async fn run(self) -> Result<()> {
        let cfg = self.state.config.clone();
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);

        info!(
            address = %address,
            ssl = cfg.server.ssl.is_some(),
            "Starting server"
        );

        let app = self.router();

        // Set up Graceful Shutdown
        let handle = Handle::<SocketAddr>::new();
        let redirect_handle = Handle::<SocketAddr>::new();
        let shutdown_handles = [handle.clone(), redirect_handle.clone()];

        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!("Shutdown signal received, starting graceful shutdown...");
            for handle in &shutdown_handles {
                handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
            }
        });

        if let Some(ssl_config) = &cfg.server.ssl {
            let redirect_address = SocketAddr::new(cfg.server.address, cfg.server.http_port);
            info!("Starting HTTPS server on https://{address}");
            info!("Redirecting http://{redirect_address} to HTTPS");

            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                &ssl_config.cert,
                &ssl_config.key,
            )
            .await
            .context("Failed to load SSL/TLS certificates")?;

            let redirect = axum_server::bind(redirect_address)
                .handle(redirect_handle)
                .serve(https_redirect_router(cfg.server.port).into_make_service());
            let https = axum_server::bind_rustls(address, tls_config)
                .handle(handle)
                .serve(app.into_make_service());

            let (https, redirect) = tokio::join!(https, redirect);
            https.context("HTTPS server failed")?;
            redirect.context("HTTP redirect server failed")?;
        } else {
            warn!("Failed to determine the HTTPS port for redirect; serving plain HTTP");
            info!("Starting HTTP server on http://{address}");

            axum_server::bind(address)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTP server failed")?;
        }

        info!("Server shutdown complete");
        Ok(())
    }

    /// Returns a reference to the application state.
    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }
}

/// Listens for shutdown signals (Ctrl+C, SIGTERM).
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => {
            res.context("Ctrl+C signal received")?;
        },
        res = terminate => {
            res.context("SIGTERM signal received")?;
        },
    }

    Ok(())
}
