//! Flow module controller.
//!
//! A [`Module`] embeds a nested flow engine as a single addressable unit of an
//! outer system:
//!
//! - [`Module::load_config`] constructs the engine on first use and (re)loads
//!   its configuration on every call;
//! - [`Module::run`] drives the engine until the owner cancels;
//! - [`Module::component_handler`] exposes the engine over HTTP, rebuilding
//!   request paths so nested modules stay addressable at any mount depth.
//!
//! The engine and the configuration parser are injected through the traits in
//! [`engine`].

pub mod config;
pub mod engine;
mod error;
mod handler;
mod module;
mod options;
mod state;

pub use config::ControllerSettings;
pub use engine::{ConfigParser, Engine, EngineFactory, EngineOptions};
pub use error::ModuleError;
pub use handler::join_path;
pub use module::Module;
pub use options::{Args, ControllerOptions, ExportFn, Exports, ModuleOptions, Opaque};
pub use state::ModuleState;
