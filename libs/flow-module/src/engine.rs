//! Contracts for the nested engine and its configuration parser.
//!
//! The controller never looks inside the engine: it constructs one through an
//! [`EngineFactory`], feeds it parsed configuration, runs it and mounts its
//! HTTP handlers.

use async_trait::async_trait;
use axum::Router;
use tokio_util::sync::CancellationToken;

use crate::options::{Args, ControllerOptions, ExportFn};

/// Everything an engine receives at construction time.
#[derive(Clone)]
pub struct EngineOptions {
    /// Id of the owning module; the engine uses it as its controller id.
    pub controller_id: String,
    pub controller: ControllerOptions,
    /// Invoked by the engine whenever its exported values change.
    pub on_exports_change: ExportFn,
}

impl std::fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineOptions")
            .field("controller_id", &self.controller_id)
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}

/// A nested flow engine.
#[async_trait]
pub trait Engine: Send + Sync + 'static {
    /// Parsed configuration accepted by [`Engine::load_file`].
    type Source: Send;

    /// Loads (or reloads) configuration and arguments.
    ///
    /// Whether a failed reload leaves the previous configuration in effect is
    /// up to the engine.
    ///
    /// # Errors
    /// Returns the engine's own error when the configuration cannot be applied.
    fn load_file(&self, source: Self::Source, args: Args) -> anyhow::Result<()>;

    /// Runs until `cancel` fires. Must observe the token and return promptly.
    async fn run(&self, cancel: CancellationToken);

    /// Handler for requests addressed to the engine's components. Expects the
    /// full logical request path.
    fn component_handler(&self) -> Router;

    /// The engine's own top-level API, mounted at the module root.
    fn api_router(&self) -> Router;
}

/// Constructs engines for a module.
pub trait EngineFactory: Send + Sync + 'static {
    type Engine: Engine;

    fn construct(&self, options: EngineOptions) -> Self::Engine;
}

/// Parses raw configuration text for an engine.
pub trait ConfigParser: Send + Sync + 'static {
    type Source: Send;

    /// Parses `raw`; `id` names the source in diagnostics.
    ///
    /// # Errors
    /// Returns the parser's diagnostics when `raw` is not valid configuration.
    fn parse(&self, id: &str, raw: &[u8]) -> anyhow::Result<Self::Source>;
}
