//! Bounded-concurrency mapping over a list of work items.
//!
//! [`map_limit`] runs an async transform over every item with at most `limit`
//! invocations in flight, and returns the results in input order.
//!
//! # Concurrency Model
//!
//! - Each invocation runs in its own Tokio task inside a [`JoinSet`]
//! - A new task is spawned only when fewer than `limit` are running
//! - Results are slotted back by input index, so completion order is irrelevant
//!
//! # Failure Behavior
//!
//! The first invocation to fail (in completion order) fails the whole call.
//! No further items are started. Tasks already running are detached: they run
//! to completion in the background and their results are dropped.
//!
//! # Example
//!
//! ```
//! use gallery_core::download::map_limit;
//! use gallery_core::CrawlError;
//!
//! # async fn example() -> Result<(), CrawlError> {
//! let doubled = map_limit(vec![1, 2, 3], 2, |n| async move { Ok(n * 2) }).await?;
//! assert_eq!(doubled, vec![2, 4, 6]);
//! # Ok(())
//! # }
//! ```

use std::future::Future;

use tokio::task::{JoinError, JoinSet};
use tracing::{debug, instrument, warn};

use crate::error::CrawlError;

/// Default number of concurrent image downloads.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Maximum allowed concurrency value.
pub const MAX_CONCURRENCY: usize = 100;

/// Applies `transform` to every item with at most `limit` concurrent invocations.
///
/// The futures returned by `transform` are spawned onto the Tokio runtime, so
/// they must be `Send + 'static`; the closure itself is only called on the
/// current task, right before its future is spawned.
///
/// # Errors
///
/// Returns [`CrawlError::InvalidLimit`] when `limit` is zero (no transform runs),
/// or the first error produced by any invocation.
///
/// # Panics
///
/// A panic inside a transform is resumed on the caller.
#[instrument(level = "debug", skip(items, transform), fields(items = items.len()))]
pub async fn map_limit<T, U, F, Fut>(
    items: Vec<T>,
    limit: usize,
    mut transform: F,
) -> Result<Vec<U>, CrawlError>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<U, CrawlError>> + Send + 'static,
    U: Send + 'static,
{
    if limit == 0 {
        return Err(CrawlError::InvalidLimit {
            name: "concurrency",
            value: limit,
        });
    }

    let total = items.len();
    let mut slots: Vec<Option<U>> = std::iter::repeat_with(|| None).take(total).collect();
    let mut tasks: JoinSet<(usize, Result<U, CrawlError>)> = JoinSet::new();

    for (index, item) in items.into_iter().enumerate() {
        // Wait for a free slot before starting the next item
        while tasks.len() >= limit {
            if let Some(joined) = tasks.join_next().await {
                if let Err(error) = store(&mut slots, joined) {
                    return Err(abandon(tasks, error));
                }
            }
        }

        let future = transform(item);
        tasks.spawn(async move { (index, future.await) });
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(error) = store(&mut slots, joined) {
            return Err(abandon(tasks, error));
        }
    }

    debug!(total, "all mapped tasks completed");

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.ok_or_else(|| CrawlError::TaskAborted(format!("no result for item {index}")))
        })
        .collect()
}

/// Records one finished task; returns its error if it failed.
fn store<U>(
    slots: &mut [Option<U>],
    joined: Result<(usize, Result<U, CrawlError>), JoinError>,
) -> Result<(), CrawlError> {
    match joined {
        Ok((index, Ok(value))) => {
            slots[index] = Some(value);
            Ok(())
        }
        Ok((index, Err(error))) => {
            debug!(index, error = %error, "mapped task failed");
            Err(error)
        }
        Err(join_error) => match join_error.try_into_panic() {
            Ok(payload) => std::panic::resume_unwind(payload),
            Err(join_error) => Err(CrawlError::TaskAborted(join_error.to_string())),
        },
    }
}

/// Lets in-flight tasks finish in the background and returns the failure.
fn abandon<R: 'static>(mut tasks: JoinSet<R>, error: CrawlError) -> CrawlError {
    if !tasks.is_empty() {
        warn!(
            in_flight = tasks.len(),
            "aborting mapped run, letting in-flight tasks finish"
        );
    }
    tasks.detach_all();
    error
}
