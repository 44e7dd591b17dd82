use crate::resolution::Resolution;
use crate::target::RequestTarget;
use async_trait::async_trait;

#[async_trait]
pub trait Resolver: Send + Sync + 'static {
    /// Decides how the edge answers a request.
    ///
    /// Infallible: any internal failure resolves to a plain pass-through.
    async fn resolve(&self, target: &RequestTarget) -> Resolution;
}
