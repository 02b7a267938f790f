/// Errors returned by [`crate::Module`] operations.
///
/// Collaborator failures are wrapped transparently so callers see the
/// parser's or engine's own message.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    /// The configuration text could not be parsed.
    #[error(transparent)]
    Parse(anyhow::Error),

    /// The engine rejected the parsed configuration.
    #[error(transparent)]
    Load(anyhow::Error),

    #[error("module has not been configured yet")]
    NotConfigured,

    #[error("module has already been started")]
    AlreadyStarted,
}
