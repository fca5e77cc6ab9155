//! Integration tests for the full compile → compose → send flow.
//!
//! These tests drive the mailer against the in-memory stub transport, so the
//! whole pipeline runs without network I/O.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use mailforge::{
    AttachmentSpec, BodyOrder, Mail, Mailbox, Mailer, MemorySink, SendContext, Step, StepError,
    StubTransport, SyncStep,
};

fn mailbox(addr: &str) -> Mailbox {
    Mailbox::new(addr).expect("valid test address")
}

#[tokio::test]
async fn send_plain_text_mail_through_stub() {
    let sink = Arc::new(MemorySink::new());
    let mailer = Mailer::new(StubTransport::new())
        .expect("stub is a valid transport")
        .with_sink(Arc::clone(&sink) as Arc<dyn mailforge::LogSink>);

    let mail = Mail::builder()
        .from(mailbox("sender@example.com"))
        .to(mailbox("recipient@example.com"))
        .subject("Hello")
        .text("Hello, World!")
        .build();

    let delivery = mailer.send(mail).await.expect("send succeeds");
    assert_eq!(delivery.response, b"Hello, World!");
    assert_eq!(delivery.envelope.from.as_deref(), Some("sender@example.com"));
    assert_eq!(delivery.envelope.to, vec!["recipient@example.com"]);

    let entries = sink.entries();
    assert_eq!(entries[0].kind, "envelope");
    assert!(entries[0].text.contains("recipient@example.com"));
    assert_eq!(entries[1].kind, "message");
}

#[tokio::test]
async fn mixed_tree_for_bodies_plus_attachment() {
    // {text, html, attachments:[{filePath:"/tmp/a.png"}]} composes to a mixed
    // root with an alternative subtree first and the attachment leaf second
    let mut mailer = Mailer::new(StubTransport::new()).expect("valid transport");
    mailer.use_send(SyncStep(|ctx: SendContext| {
        let root = &ctx.message.root;
        assert_eq!(root.content_type.to_string(), "multipart/mixed");
        assert_eq!(root.children.len(), 2);
        assert_eq!(
            root.children[0].content_type.to_string(),
            "multipart/alternative"
        );
        assert_eq!(root.children[1].filename.as_deref(), Some("a.png"));
        Ok(ctx)
    }));

    let mail = Mail::builder()
        .text("hi")
        .html("<p>hi</p>")
        .attachment(AttachmentSpec::file("/tmp/a.png"))
        .build();

    mailer.send(mail).await.expect("send succeeds");
}

#[tokio::test]
async fn related_tree_for_inline_image() {
    // {html:"<p><img src=cid:x></p>", attachments:[{cid:"x", ...}]} composes
    // to a single related root, no mixed/alternative wrapper
    let mut mailer = Mailer::new(StubTransport::new()).expect("valid transport");
    mailer.use_send(SyncStep(|ctx: SendContext| {
        let root = &ctx.message.root;
        assert_eq!(
            root.content_type.to_string(),
            "multipart/related; type=\"text/html\""
        );
        assert_eq!(root.children.len(), 2);
        assert!(root.children[0].content_type.is_html());
        assert_eq!(root.children[1].headers.get("Content-Id"), Some("<x>"));
        Ok(ctx)
    }));

    let mail = Mail::builder()
        .html("<p><img src=\"cid:x\"></p>")
        .attachment(AttachmentSpec::file("/tmp/x.png").cid("x"))
        .build();

    mailer.send(mail).await.expect("send succeeds");
}

#[tokio::test]
async fn html_first_body_order_is_honored() {
    let mut mailer = Mailer::new(StubTransport::new())
        .expect("valid transport")
        .with_body_order(BodyOrder::HtmlFirst);
    mailer.use_send(SyncStep(|ctx: SendContext| {
        let root = &ctx.message.root;
        assert!(root.children[0].content_type.is_html());
        assert!(root.children[1].content_type.is_text());
        Ok(ctx)
    }));

    let mail = Mail::builder().text("hi").html("<p>hi</p>").build();
    mailer.send(mail).await.expect("send succeeds");
}

#[tokio::test]
async fn compile_steps_short_circuit_in_order() {
    struct Count(Arc<AtomicUsize>);

    #[async_trait]
    impl Step<Mail> for Count {
        async fn apply(&self, ctx: Mail) -> Result<Mail, StepError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(ctx)
        }
    }

    struct Fail;

    #[async_trait]
    impl Step<Mail> for Fail {
        async fn apply(&self, _ctx: Mail) -> Result<Mail, StepError> {
            Err(StepError::new("second step failed"))
        }
    }

    let ran = Arc::new(AtomicUsize::new(0));
    let mut mailer = Mailer::new(StubTransport::new()).expect("valid transport");
    mailer.use_compile(Count(Arc::clone(&ran)));
    mailer.use_compile(Fail);
    mailer.use_compile(Count(Arc::clone(&ran)));

    let err = mailer.send(Mail::default()).await.expect_err("must fail");
    assert!(err.to_string().contains("second step failed"));
    // Step 3 never ran
    assert_eq!(ran.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn compile_step_mutations_reach_the_message() {
    let mut mailer = Mailer::new(StubTransport::new()).expect("valid transport");
    mailer.use_compile(SyncStep(|mut mail: Mail| {
        // Markdown-style expansion stand-in
        let text = mail.text.clone().unwrap_or_default();
        mail.html = Some(format!("<p>{text}</p>"));
        Ok(mail)
    }));
    mailer.use_send(SyncStep(|ctx: SendContext| {
        assert_eq!(
            ctx.message.root.content_type.to_string(),
            "multipart/alternative"
        );
        Ok(ctx)
    }));

    let mail = Mail::builder().text("expanded").build();
    let delivery = mailer.send(mail).await.expect("send succeeds");
    assert_eq!(delivery.response, b"expanded<p>expanded</p>");
}

#[tokio::test]
async fn failing_transport_propagates_without_logs() {
    let sink = Arc::new(MemorySink::new());
    let mailer = Mailer::new(StubTransport::failing("backend offline"))
        .expect("valid transport")
        .with_sink(Arc::clone(&sink) as Arc<dyn mailforge::LogSink>);

    let err = mailer
        .send(Mail::builder().text("hi").build())
        .await
        .expect_err("must fail");
    assert!(err.to_string().contains("backend offline"));
    assert!(sink.entries().is_empty());
}
