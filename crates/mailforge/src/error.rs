//! Error types for the mailer.

use crate::pipeline::StepError;
use crate::transport::TransportError;

/// Result type alias for mailer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by [`Mailer::send`](crate::Mailer::send).
///
/// A send either fully succeeds or fails with the first error encountered;
/// there are no partial-success states.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The mailer was configured with an unusable transport.
    #[error("Transport configuration error: {0}")]
    Config(String),

    /// A pipeline step failed; later steps did not run.
    #[error("Pipeline step failed: {0}")]
    Step(#[from] StepError),

    /// The transport rejected the message.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}
