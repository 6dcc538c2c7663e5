//! Async interceptor chain.
//!
//! Interceptors wrap command dispatch. Each one receives the context and a
//! [`Next`] handle for the rest of the chain; not calling it ends the chain
//! there. Links run in three tiers (pre, normal, post), each in registration
//! order.

pub mod builtin;

use crate::context::Context;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Ordering tier of an interceptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Enforce {
    /// Runs before every normal link.
    Pre,
    #[default]
    Normal,
    /// Runs after every normal link, closest to the handler.
    Post,
}

/// A middleware link.
#[async_trait]
pub trait Interceptor: Send + Sync {
    async fn intercept(&self, ctx: &mut Context, next: Next<'_>) -> Result<()>;
}

/// The final step of the chain: a command's handler.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, ctx: &mut Context) -> Result<()>;
}

#[async_trait]
impl<F> CommandHandler for F
where
    F: Fn(&mut Context) -> Result<()> + Send + Sync,
{
    async fn handle(&self, ctx: &mut Context) -> Result<()> {
        self(ctx)
    }
}

/// An interceptor with its tier.
#[derive(Clone)]
pub struct InterceptorLink {
    pub enforce: Enforce,
    pub handler: Arc<dyn Interceptor>,
}

impl InterceptorLink {
    pub fn new<I: Interceptor + 'static>(enforce: Enforce, handler: I) -> Self {
        Self {
            enforce,
            handler: Arc::new(handler),
        }
    }
}

/// Handle to the remainder of the chain. Consumed by [`Next::run`], so a
/// link can continue at most once.
pub struct Next<'a> {
    rest: &'a [Arc<dyn Interceptor>],
    terminal: &'a dyn CommandHandler,
}

impl<'a> Next<'a> {
    pub async fn run(self, ctx: &mut Context) -> Result<()> {
        match self.rest.split_first() {
            Some((link, rest)) => {
                let next = Next {
                    rest,
                    terminal: self.terminal,
                };
                link.intercept(ctx, next).await
            }
            None => self.terminal.handle(ctx).await,
        }
    }
}

/// Links in execution order.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    links: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    /// Orders links by tier, keeping registration order within a tier.
    pub fn compose(links: &[InterceptorLink]) -> Self {
        let mut ordered = links.to_vec();
        ordered.sort_by_key(|link| link.enforce);
        Self {
            links: ordered.into_iter().map(|link| link.handler).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Runs every link, then `terminal` if the chain was not cut short.
    pub async fn run(&self, ctx: &mut Context, terminal: &dyn CommandHandler) -> Result<()> {
        Next {
            rest: &self.links,
            terminal,
        }
        .run(ctx)
        .await
    }
}
