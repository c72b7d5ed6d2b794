//! Bounded-concurrency scheduling of upload jobs.
//!
//! With a barrier, jobs run in arrival-order groups of `concurrency`: a group
//! starts only after every job of the previous group has settled, successful or
//! not. Without it, a sliding window keeps up to `concurrency` jobs in flight.
//! Jobs are plain futures driven by the calling task; nothing is spawned.

use std::future::Future;

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use lectern_core::UploadPolicy;

/// Run `worker` over every job under `policy` and return all outputs.
///
/// `on_group_settled` is called with the group index and that group's outputs
/// each time a group settles (once, with index 0, for a sliding window run).
/// Outputs of barrier runs keep arrival order; sliding runs return them in
/// completion order.
pub async fn run_scheduled<T, O, W, Fut, G>(
    jobs: Vec<T>,
    policy: &UploadPolicy,
    worker: W,
    mut on_group_settled: G,
) -> Vec<O>
where
    W: Fn(T) -> Fut,
    Fut: Future<Output = O>,
    G: FnMut(usize, &[O]),
{
    let width = policy.concurrency.max(1);

    if !policy.barrier {
        let settled: Vec<O> = stream::iter(jobs)
            .map(&worker)
            .buffer_unordered(width)
            .collect()
            .await;
        on_group_settled(0, &settled);
        return settled;
    }

    let mut outputs = Vec::with_capacity(jobs.len());
    let mut remaining = jobs.into_iter().peekable();
    let mut group = 0;

    while remaining.peek().is_some() {
        let batch: Vec<Fut> = remaining.by_ref().take(width).map(&worker).collect();
        tracing::debug!(group, size = batch.len(), "Starting upload group");

        let settled = join_all(batch).await;
        on_group_settled(group, &settled);
        outputs.extend(settled);
        group += 1;
    }

    outputs
}
