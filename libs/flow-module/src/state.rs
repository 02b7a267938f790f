use std::fmt;

use crate::error::ModuleError;

/// Lifecycle of a [`crate::Module`].
///
/// `Uninitialized → Configured → Running → Stopped`. Configuration may be
/// reloaded in any state; only the first successful load moves the module out
/// of `Uninitialized`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    #[default]
    Uninitialized,
    Configured,
    Running,
    Stopped,
}

impl ModuleState {
    /// Whether a configuration has been loaded successfully at least once.
    #[must_use]
    pub const fn is_configured(self) -> bool {
        !matches!(self, Self::Uninitialized)
    }

    pub(crate) const fn after_load(self) -> Self {
        match self {
            Self::Uninitialized => Self::Configured,
            other => other,
        }
    }

    pub(crate) fn start(self) -> Result<Self, ModuleError> {
        match self {
            Self::Uninitialized => Err(ModuleError::NotConfigured),
            Self::Configured => Ok(Self::Running),
            Self::Running | Self::Stopped => Err(ModuleError::AlreadyStarted),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Configured => "configured",
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
