//! Ordered plugin pipeline.
//!
//! Cross-cutting mutation steps (markdown expansion, signing, header
//! injection) run over the mail description before composition and over the
//! composed message before transport handoff. Steps run strictly in
//! registration order; the output of step *i* is the input of step *i+1*,
//! and the first failure stops the pipeline.
//!
//! The two stages are separate typed pipelines held by the
//! [`Mailer`](crate::Mailer): `Pipeline<Mail>` for the compile stage and
//! `Pipeline<SendContext>` for the send stage. An unknown stage name is
//! unrepresentable.

use async_trait::async_trait;
use mailforge_mime::{ComposedMessage, Mail};
use std::fmt;
use tracing::trace;

/// Failure reported by a pipeline step.
#[derive(Debug)]
pub struct StepError {
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StepError {
    /// Creates a step error from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a step error wrapping an underlying error.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// A single mutation step over a pipeline context.
///
/// A step receives the context by value and returns either the replacement
/// context or a failure.
#[async_trait]
pub trait Step<C: Send + 'static>: Send + Sync {
    /// Applies the step, producing the context for the next step.
    ///
    /// # Errors
    ///
    /// Returns an error to stop the pipeline; later steps will not run.
    async fn apply(&self, ctx: C) -> Result<C, StepError>;
}

/// Adapter turning a synchronous function into a [`Step`].
pub struct SyncStep<F>(pub F);

#[async_trait]
impl<C, F> Step<C> for SyncStep<F>
where
    C: Send + 'static,
    F: Fn(C) -> Result<C, StepError> + Send + Sync,
{
    async fn apply(&self, ctx: C) -> Result<C, StepError> {
        (self.0)(ctx)
    }
}

/// Context handed to send-stage steps.
#[derive(Debug, Clone)]
pub struct SendContext {
    /// The mail description after the compile stage.
    pub mail: Mail,
    /// The composed message about to be handed to the transport.
    pub message: ComposedMessage,
}

/// An ordered list of [`Step`]s over a shared context type.
pub struct Pipeline<C> {
    steps: Vec<Box<dyn Step<C>>>,
}

impl<C: Send + 'static> Pipeline<C> {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Appends a step; steps run in registration order.
    pub fn push(&mut self, step: impl Step<C> + 'static) {
        self.steps.push(Box::new(step));
    }

    /// Number of registered steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Checks whether no steps are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs all steps in order.
    ///
    /// An empty pipeline is a passthrough.
    ///
    /// # Errors
    ///
    /// Returns the first step failure; remaining steps do not run.
    pub async fn run(&self, mut ctx: C) -> Result<C, StepError> {
        for (index, step) in self.steps.iter().enumerate() {
            trace!(step = index, total = self.steps.len(), "running pipeline step");
            ctx = step.apply(ctx).await?;
        }
        Ok(ctx)
    }
}

impl<C: Send + 'static> Default for Pipeline<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for Pipeline<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.steps.len())
            .finish()
    }
}
