//! Composes a small mail and sends it through the in-memory stub transport.
//!
//! Run with `cargo run --example stub` to see the transport log entries.

use mailforge::{AttachmentSpec, Mail, Mailbox, Mailer, StubTransport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("debug").init();

    let mailer = Mailer::new(StubTransport::new())?;

    let mail = Mail::builder()
        .from(Mailbox::with_name("Alice", "alice@example.com")?)
        .to(Mailbox::new("bob@example.com")?)
        .subject("Weekly report")
        .text("The report is attached.")
        .html("<p>The report is <b>attached</b>.</p>")
        .attachment(AttachmentSpec::file("/tmp/report.pdf"))
        .build();

    let delivery = mailer.send(mail).await?;
    println!(
        "delivered to {:?}, {} buffered bytes",
        delivery.envelope.to,
        delivery.response.len()
    );

    Ok(())
}
