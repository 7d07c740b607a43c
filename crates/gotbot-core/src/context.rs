use tokio_util::sync::CancellationToken;

/// Request context handed to every handler. Cancelling it stops the poll loop
/// and any keep-alive sessions bound to it; handlers already running are left alone.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

#[cfg(test)]
mod tests {
    use super::Context;

    #[tokio::test]
    async fn clones_share_cancellation() {
        let root = Context::new();
        let handed_out = root.clone();
        assert!(!handed_out.is_cancelled());

        root.cancel();
        handed_out.cancelled().await;
        assert!(handed_out.is_cancelled());
    }
}
