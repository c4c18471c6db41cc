use thiserror::Error;

/// Failures a caller of [`super::group::Group::get`] can observe.
///
/// Peer fetch failures never show up here: they are logged and the request
/// falls back to the loader.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("key is required")]
    EmptyKey,

    #[error("invalid namespace name: {0:?}")]
    InvalidNamespace(String),

    /// The loader's own error, surfaced unchanged.
    #[error(transparent)]
    Load(#[from] anyhow::Error),
}
