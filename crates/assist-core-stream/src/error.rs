use thiserror::Error;

#[derive(Debug, Error)]
/// Errors that end a streamed turn early.
pub enum StreamError {
    #[error("transport failure: {0}")]
    /// The chunk stream failed or reported an error event.
    Transport(String),

    #[error("turn aborted")]
    /// The turn was cancelled by the user.
    Aborted,

    #[error("turn superseded by a newer request")]
    /// A newer turn started before this one finished.
    Superseded,

    #[error("turn task failed: {0}")]
    /// The spawned turn task panicked or was cancelled by the runtime.
    Join(#[from] tokio::task::JoinError),
}
