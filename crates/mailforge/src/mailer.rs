//! Mailer orchestration.

use crate::error::{Error, Result};
use crate::pipeline::{Pipeline, SendContext, Step};
use crate::transport::{Delivery, LogSink, TracingSink, Transport};
use mailforge_mime::{BodyOrder, Composer, GuessLookup, Mail, MimeTypes, XMailer};
use std::sync::Arc;
use tracing::debug;

/// Product name stamped into the default X-Mailer signature.
const PRODUCT: &str = env!("CARGO_PKG_NAME");
/// Product version stamped into the default X-Mailer signature.
const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Product homepage stamped into the default X-Mailer signature.
const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");

/// Sends mail descriptions through a configured transport.
///
/// A `Mailer` holds the transport, the log sink transport entries are
/// forwarded to, the content-type lookup, the body ordering, and the two
/// pipeline stages. It keeps no per-send state: concurrent sends only share
/// these immutable parts.
pub struct Mailer {
    transport: Arc<dyn Transport>,
    sink: Arc<dyn LogSink>,
    lookup: Arc<dyn MimeTypes>,
    order: BodyOrder,
    compile: Pipeline<Mail>,
    send_stage: Pipeline<SendContext>,
}

impl Mailer {
    /// Creates a mailer over a transport.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the transport reports an empty name
    /// or version; both are required for the X-Mailer signature.
    pub fn new(transport: impl Transport + 'static) -> Result<Self> {
        if transport.name().is_empty() || transport.version().is_empty() {
            return Err(Error::Config(
                "transport must report a non-empty name and version".to_string(),
            ));
        }

        Ok(Self {
            transport: Arc::new(transport),
            sink: Arc::new(TracingSink),
            lookup: Arc::new(GuessLookup),
            order: BodyOrder::default(),
            compile: Pipeline::new(),
            send_stage: Pipeline::new(),
        })
    }

    /// Replaces the log sink transport entries are forwarded to.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replaces the content-type lookup collaborator.
    #[must_use]
    pub fn with_lookup(mut self, lookup: Arc<dyn MimeTypes>) -> Self {
        self.lookup = lookup;
        self
    }

    /// Sets the ordering of the implicit text/HTML alternatives.
    #[must_use]
    pub const fn with_body_order(mut self, order: BodyOrder) -> Self {
        self.order = order;
        self
    }

    /// Registers a compile-stage step, run over the mail description before
    /// composition.
    pub fn use_compile(&mut self, step: impl Step<Mail> + 'static) {
        self.compile.push(step);
    }

    /// Registers a send-stage step, run over the composed message before
    /// transport handoff.
    pub fn use_send(&mut self, step: impl Step<SendContext> + 'static) {
        self.send_stage.push(step);
    }

    /// The default X-Mailer signature for this mailer's transport.
    #[must_use]
    pub fn signature(&self) -> String {
        format!(
            "{PRODUCT} ({VERSION}; +{HOMEPAGE}; {}/{})",
            self.transport.name(),
            self.transport.version()
        )
    }

    /// Sends a mail description.
    ///
    /// Flow: compile pipeline, MIME composition, X-Mailer header, send
    /// pipeline, transport. The first failure stops the flow: a compile
    /// failure skips composition entirely, a send-stage failure skips the
    /// transport.
    ///
    /// # Errors
    ///
    /// Returns the first pipeline or transport failure encountered.
    pub async fn send(&self, mail: Mail) -> Result<Delivery> {
        let mail = self.compile.run(mail).await?;

        let mut message = Composer::new(&mail)
            .body_order(self.order)
            .lookup(&*self.lookup)
            .compose();

        match &mail.xmailer {
            XMailer::Disabled => {}
            XMailer::Custom(value) => message.root.headers.set("X-Mailer", value.clone()),
            XMailer::Default => message.root.headers.set("X-Mailer", self.signature()),
        }

        let ctx = self.send_stage.run(SendContext { mail, message }).await?;

        debug!(
            transport = self.transport.name(),
            content_type = %ctx.message.root.content_type,
            "handing message to transport"
        );

        Ok(self.transport.send(&ctx.message, &*self.sink).await?)
    }
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailer")
            .field("transport", &self.transport.name())
            .field("compile_steps", &self.compile.len())
            .field("send_steps", &self.send_stage.len())
            .finish_non_exhaustive()
    }
}
