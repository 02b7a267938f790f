use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;

use flow_logging::Logger;
use serde_json::{Map, Value};

/// Values exported by an engine, keyed by export name.
pub type Exports = Map<String, Value>;

/// Arguments passed into a module alongside its configuration.
pub type Args = Map<String, Value>;

/// Callback receiving the latest exports of a module.
pub type ExportFn = Arc<dyn Fn(&Exports) + Send + Sync>;

/// Type-erased collaborator passed through to the engine untouched
/// (tracer provider, clusterer, metrics registerer).
pub type Opaque = Arc<dyn Any + Send + Sync>;

/// Static options of one module instance.
#[derive(Clone)]
pub struct ModuleOptions {
    /// Identifier of the module; also used as the parser's source name.
    pub id: String,
    /// Receives exports whenever the nested engine's exports change.
    pub export: ExportFn,
    pub controller: ControllerOptions,
}

impl ModuleOptions {
    #[must_use]
    pub fn new(id: impl Into<String>, export: ExportFn, controller: ControllerOptions) -> Self {
        Self {
            id: id.into(),
            export,
            controller,
        }
    }
}

impl std::fmt::Debug for ModuleOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleOptions")
            .field("id", &self.id)
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}

/// Options forwarded verbatim to the nested engine when it is constructed.
#[derive(Clone, Default)]
pub struct ControllerOptions {
    /// Logger for the engine and its components.
    pub logger: Option<Arc<Logger>>,
    pub tracer_provider: Option<Opaque>,
    /// Coordinates distributed behavior between nodes.
    pub clusterer: Option<Opaque>,
    pub metrics_registerer: Option<Opaque>,
    /// Storage directory unique to this module. Created lazily by consumers.
    pub data_path: PathBuf,
    /// Address the outer HTTP server listens on.
    pub http_listen_addr: String,
    /// Base path requests need in order to reach this module. Handlers receive
    /// requests with this prefix already stripped.
    pub http_path_prefix: String,
}

impl std::fmt::Debug for ControllerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerOptions")
            .field("logger", &self.logger.is_some())
            .field("tracer_provider", &self.tracer_provider.is_some())
            .field("clusterer", &self.clusterer.is_some())
            .field("metrics_registerer", &self.metrics_registerer.is_some())
            .field("data_path", &self.data_path)
            .field("http_listen_addr", &self.http_listen_addr)
            .field("http_path_prefix", &self.http_path_prefix)
            .finish()
    }
}
