use std::sync::{Arc, OnceLock};

use axum::Router;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::engine::{ConfigParser, Engine, EngineFactory, EngineOptions};
use crate::error::ModuleError;
use crate::handler::component_router;
use crate::options::{Args, Exports, ModuleOptions};
use crate::state::ModuleState;

type EngineOf<F> = <F as EngineFactory>::Engine;

/// Controller embedding one nested engine as an addressable module.
///
/// The engine is built by the first [`Module::load_config`] call and reused
/// for the lifetime of the module.
pub struct Module<F, P>
where
    F: EngineFactory,
{
    options: ModuleOptions,
    factory: F,
    parser: P,
    // Serializes load_config, including the one-time construction.
    load_guard: Mutex<()>,
    engine: OnceLock<Arc<EngineOf<F>>>,
    // Held only for transitions, never across engine calls.
    state: Mutex<ModuleState>,
}

impl<F, P> Module<F, P>
where
    F: EngineFactory,
    P: ConfigParser<Source = <EngineOf<F> as Engine>::Source>,
{
    /// Creates an empty module. No engine exists until the first
    /// [`Module::load_config`].
    #[must_use]
    pub fn new(options: ModuleOptions, factory: F, parser: P) -> Self {
        Self {
            options,
            factory,
            parser,
            load_guard: Mutex::new(()),
            engine: OnceLock::new(),
            state: Mutex::new(ModuleState::Uninitialized),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.options.id
    }

    #[must_use]
    pub fn state(&self) -> ModuleState {
        *self.state.lock()
    }

    /// The embedded engine, once constructed.
    #[must_use]
    pub fn engine(&self) -> Option<&Arc<EngineOf<F>>> {
        self.engine.get()
    }

    /// Parses `config` and loads it with `args` into the engine, constructing
    /// the engine first if this is the first call.
    ///
    /// Calls are serialized. Safe while the module is running (hot reload).
    ///
    /// # Errors
    /// - [`ModuleError::Parse`] if `config` does not parse; the engine is not
    ///   touched.
    /// - [`ModuleError::Load`] if the engine rejects the configuration.
    pub fn load_config(&self, config: &[u8], args: Args) -> Result<(), ModuleError> {
        let _guard = self.load_guard.lock();

        let engine = self.engine.get_or_init(|| self.construct_engine());

        let source = self.parser.parse(&self.options.id, config).map_err(|e| {
            tracing::warn!(module = %self.options.id, error = %e, "failed to parse module config");
            ModuleError::Parse(e)
        })?;

        engine.load_file(source, args).map_err(|e| {
            tracing::warn!(module = %self.options.id, error = %e, "failed to load module config");
            ModuleError::Load(e)
        })?;

        let state = {
            let mut state = self.state.lock();
            *state = state.after_load();
            *state
        };
        tracing::debug!(module = %self.options.id, %state, "module config loaded");
        Ok(())
    }

    /// Runs the engine until `cancel` fires.
    ///
    /// Components inside the module do not run before this is called. Returns
    /// once the engine has observed cancellation and exited.
    ///
    /// # Errors
    /// - [`ModuleError::NotConfigured`] if no configuration was loaded yet.
    /// - [`ModuleError::AlreadyStarted`] on a second call.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), ModuleError> {
        let engine = {
            let mut state = self.state.lock();
            let engine = self.engine.get().cloned().ok_or(ModuleError::NotConfigured)?;
            *state = state.start()?;
            engine
        };

        tracing::info!(module = %self.options.id, "module running");
        engine.run(cancel).await;

        *self.state.lock() = ModuleState::Stopped;
        tracing::info!(module = %self.options.id, "module stopped");
        Ok(())
    }

    /// HTTP handler exposing the engine's API at the root and its components
    /// under `/{id}/...`.
    ///
    /// The returned router may be served concurrently with [`Module::run`] and
    /// later [`Module::load_config`] calls.
    ///
    /// # Errors
    /// [`ModuleError::NotConfigured`] before the first successful load.
    pub fn component_handler(&self) -> Result<Router, ModuleError> {
        if !self.state().is_configured() {
            return Err(ModuleError::NotConfigured);
        }
        let engine = self.engine.get().cloned().ok_or(ModuleError::NotConfigured)?;
        Ok(component_router(engine, &self.options.controller.http_path_prefix))
    }

    fn construct_engine(&self) -> Arc<EngineOf<F>> {
        let id = self.options.id.clone();
        let export = Arc::clone(&self.options.export);

        tracing::debug!(module = %id, "constructing nested engine");
        let engine = self.factory.construct(EngineOptions {
            controller_id: id.clone(),
            controller: self.options.controller.clone(),
            on_exports_change: Arc::new(move |exports: &Exports| {
                tracing::trace!(module = %id, count = exports.len(), "module exports changed");
                export(exports);
            }),
        });
        Arc::new(engine)
    }
}

impl<F, P> std::fmt::Debug for Module<F, P>
where
    F: EngineFactory,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("options", &self.options)
            .field("state", &*self.state.lock())
            .field("constructed", &self.engine.get().is_some())
            .finish_non_exhaustive()
    }
}
