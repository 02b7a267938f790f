//! File/env configuration for a module controller.
//!
//! Only the serializable part of [`ControllerOptions`] lives here; live
//! collaborators (logger, tracer, clusterer, registerer) are attached by the
//! owner in [`ControllerSettings::into_controller_options`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use flow_logging::{LogOptions, Logger};
use serde::{Deserialize, Serialize};

use crate::options::ControllerOptions;

/// Prefix of environment variables overriding file settings, e.g.
/// `FLOW_HTTP_PATH_PREFIX` or `FLOW_LOGGING__FORMAT`.
pub const ENV_PREFIX: &str = "FLOW_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerSettings {
    pub data_path: PathBuf,
    pub http_listen_addr: String,
    pub http_path_prefix: String,
    pub logging: LogOptions,
}

impl ControllerSettings {
    /// Extracts settings from an already assembled figment.
    ///
    /// # Errors
    /// Returns an error if the merged configuration does not match the schema.
    pub fn from_figment(figment: &Figment) -> anyhow::Result<Self> {
        Ok(figment.extract()?)
    }

    /// Defaults, then the optional YAML file, then `FLOW_*` environment
    /// variables (nested keys separated by `__`).
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or a value has the wrong
    /// shape.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            tracing::debug!(path = %path.display(), "loading controller settings");
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            figment = figment.merge(Yaml::string(&text));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::from_figment(&figment)
    }

    /// Attaches the live logger; the remaining collaborators start empty.
    #[must_use]
    pub fn into_controller_options(self, logger: Option<Arc<Logger>>) -> ControllerOptions {
        ControllerOptions {
            logger,
            tracer_provider: None,
            clusterer: None,
            metrics_registerer: None,
            data_path: self.data_path,
            http_listen_addr: self.http_listen_addr,
            http_path_prefix: self.http_path_prefix,
        }
    }
}
