//! Sequential transformation chains.
//!
//! A chain is an ordered list of [`Stage`]s. Each present stage receives the value
//! produced by the previous one and returns a future of the next value; absent
//! stages are skipped without ending the chain.

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// An async transformation `T → T`.
pub type Transformer<T> = Arc<dyn Fn(T) -> BoxFuture<'static, T> + Send + Sync>;

/// One entry of a chain; `None` is a placeholder that leaves the value untouched.
pub type Stage<T> = Option<Transformer<T>>;

/// Wrap an async function as a [`Transformer`].
///
/// # Example
///
/// ```
/// use call_api_core::chain::{apply_middlewares, transformer};
///
/// # tokio_test::block_on(async {
/// let double = transformer(|n: i32| async move { n * 2 });
/// assert_eq!(apply_middlewares(&[Some(double)], 21).await, 42);
/// # });
/// ```
pub fn transformer<T, F, Fut>(f: F) -> Transformer<T>
where
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = T> + Send + 'static,
{
    Arc::new(move |value| Box::pin(f(value)))
}

/// Thread `seed` through every present stage, in order.
///
/// The stage list is only read, so the same list can drive any number of
/// concurrent chains. An empty or all-placeholder list returns `seed` unchanged.
pub async fn apply_middlewares<T>(middlewares: &[Stage<T>], seed: T) -> T {
    let mut value = seed;

    for (index, stage) in middlewares.iter().enumerate() {
        match stage {
            Some(transform) => value = transform(value).await,
            None => tracing::trace!(index, "Skipping placeholder stage"),
        }
    }

    value
}
