//! Cross-cutting wrappers applied to every registered action.
//!
//! [`decorate`] always nests [`Logging`] inside [`Recover`], so a panic raised
//! by the action or by the logging step itself never reaches the dispatcher.

use crate::context::Context;
use crate::handler::Handler;
use anyhow::Result;
use futures::FutureExt;
use gotbot_telegram::Update;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info};

/// Logs who invoked which command, then runs the wrapped handler.
pub struct Logging<H> {
    inner: H,
}

impl<H> Logging<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

#[async_trait::async_trait]
impl<H: Handler> Handler for Logging<H> {
    async fn handle(&self, ctx: &Context, update: &Update) -> Result<()> {
        if let Some(message) = &update.message {
            let user = message
                .from
                .as_ref()
                .map(|from| from.display_name())
                .unwrap_or_default();
            info!(
                update_id = update.update_id,
                user = user,
                command = message.command(),
                "User command received"
            );
        }
        self.inner.handle(ctx, update).await
    }
}

/// Turns a panic in the wrapped handler into a logged, successful return.
pub struct Recover<H> {
    inner: H,
}

impl<H> Recover<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

#[async_trait::async_trait]
impl<H: Handler> Handler for Recover<H> {
    async fn handle(&self, ctx: &Context, update: &Update) -> Result<()> {
        match AssertUnwindSafe(self.inner.handle(ctx, update))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(panic) => {
                error!(
                    update_id = update.update_id,
                    panic = downcast_panic(&*panic).unwrap_or("unknown panic payload"),
                    "Panic recovered"
                );
                Ok(())
            }
        }
    }
}

/// Wraps `action` as `Recover(Logging(action))`.
pub fn decorate<H: Handler + 'static>(action: H) -> Arc<dyn Handler> {
    Arc::new(Recover::new(Logging::new(action)))
}

fn downcast_panic(panic: &(dyn Any + Send)) -> Option<&str> {
    panic
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
}

#[cfg(test)]
mod tests {
    use super::{decorate, downcast_panic, Logging, Recover};
    use crate::context::Context;
    use crate::handler::Handler;
    use crate::test_support::{command_update, Failing, Panicking, Recording};
    use anyhow::Result;
    use gotbot_telegram::Update;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture_logs() -> (Captured, tracing::subscriber::DefaultGuard) {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (captured, guard)
    }

    /// Wrapper that fails before ever reaching its inner handler.
    struct Exploding<H>(H);

    #[async_trait::async_trait]
    impl<H: Handler> Handler for Exploding<H> {
        async fn handle(&self, ctx: &Context, update: &Update) -> Result<()> {
            if update.update_id > 0 {
                panic!("wrapper exploded");
            }
            self.0.handle(ctx, update).await
        }
    }

    #[tokio::test]
    async fn panic_is_contained() {
        let action = decorate(Panicking);
        let result = action
            .handle(&Context::new(), &command_update(1, 10, "/boom"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn errors_pass_through_unchanged() {
        let action = decorate(Failing("provider timed out"));
        let err = action
            .handle(&Context::new(), &command_update(2, 10, "/gpt hi"))
            .await
            .expect_err("error propagates");
        assert_eq!(err.to_string(), "provider timed out");
    }

    #[tokio::test]
    async fn logging_tolerates_missing_message() {
        let recording = Recording::default();
        let action = Recover::new(Logging::new(recording.clone()));
        let update = Update {
            update_id: 3,
            message: None,
        };
        assert!(action.handle(&Context::new(), &update).await.is_ok());
        assert_eq!(recording.seen(), vec![3]);
    }

    #[test]
    fn panic_payloads_downcast() {
        let static_payload: Box<dyn std::any::Any + Send> = Box::new("static");
        let owned_payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        let other_payload: Box<dyn std::any::Any + Send> = Box::new(42_u8);

        assert_eq!(downcast_panic(&*static_payload), Some("static"));
        assert_eq!(downcast_panic(&*owned_payload), Some("owned"));
        assert_eq!(downcast_panic(&*other_payload), None);
    }

    #[tokio::test]
    async fn panic_in_a_wrapper_is_contained() {
        let recording = Recording::default();
        let action = Recover::new(Exploding(Logging::new(recording.clone())));
        let result = action
            .handle(&Context::new(), &command_update(4, 10, "/start"))
            .await;
        assert!(result.is_ok());
        assert!(recording.seen().is_empty());
    }

    #[tokio::test]
    async fn logging_records_user_and_command() {
        let (logs, _guard) = capture_logs();
        let recording = Recording::default();
        let action = decorate(recording.clone());

        action
            .handle(&Context::new(), &command_update(5, 10, "/boom now"))
            .await
            .expect("handled");

        let text = logs.text();
        assert!(text.contains("User command received"), "{}", text);
        assert!(text.contains("update_id=5"), "{}", text);
        assert!(text.contains("user10"), "{}", text);
        assert!(text.contains("boom"), "{}", text);
        assert_eq!(recording.seen(), vec![5]);
    }

    #[tokio::test]
    async fn logging_falls_back_to_first_name() {
        let (logs, _guard) = capture_logs();
        let mut update = command_update(6, 10, "/help");
        if let Some(from) = update.message.as_mut().and_then(|m| m.from.as_mut()) {
            from.username.clear();
        }

        decorate(Recording::default())
            .handle(&Context::new(), &update)
            .await
            .expect("handled");

        let text = logs.text();
        assert!(text.contains("First10"), "{}", text);
        assert!(!text.contains("user10"), "{}", text);
    }

    #[tokio::test]
    async fn recovered_panic_is_logged() {
        let (logs, _guard) = capture_logs();
        decorate(Panicking)
            .handle(&Context::new(), &command_update(7, 10, "/boom"))
            .await
            .expect("recovered");

        let text = logs.text();
        assert!(text.contains("Panic recovered"), "{}", text);
        assert!(text.contains("action for update 7 blew up"), "{}", text);
    }
}
