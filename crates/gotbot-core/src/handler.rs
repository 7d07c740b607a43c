use crate::context::Context;
use anyhow::Result;
use gotbot_telegram::Update;
use std::future::Future;
use std::sync::Arc;

/// The single seam every action and every decorator implements.
#[async_trait::async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &Context, update: &Update) -> Result<()>;
}

#[async_trait::async_trait]
impl<H: Handler + ?Sized> Handler for Arc<H> {
    async fn handle(&self, ctx: &Context, update: &Update) -> Result<()> {
        (**self).handle(ctx, update).await
    }
}

/// Adapts an async closure into a [`Handler`]. The closure receives owned
/// clones of the context and update.
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Context, Update) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    FnHandler { f }
}

pub struct FnHandler<F> {
    f: F,
}

#[async_trait::async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Context, Update) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn handle(&self, ctx: &Context, update: &Update) -> Result<()> {
        (self.f)(ctx.clone(), update.clone()).await
    }
}
