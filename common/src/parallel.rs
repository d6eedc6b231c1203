//! Concurrency-limited parallel iteration.
//!
//! Decoding a directory of large rasters all at once can exhaust memory, so
//! items are processed in chunks of at most `max_concurrent` on the rayon pool.

use rayon::prelude::*;

/// Maps `f` over `items` in parallel, with at most `max_concurrent` items in flight.
///
/// Results keep the order of `items`. Stops at the first chunk that contains an
/// error and returns it; items within the failing chunk may still be processed.
///
/// # Panics
///
/// Panics if `max_concurrent` is 0.
pub fn try_par_map_limited<T, R, E, F>(
    items: &[T],
    max_concurrent: usize,
    f: F,
) -> Result<Vec<R>, E>
where
    T: Sync,
    R: Send,
    E: Send,
    F: Fn(&T) -> Result<R, E> + Sync,
{
    assert!(max_concurrent > 0, "max_concurrent must be > 0");

    let mut results = Vec::with_capacity(items.len());
    for chunk in items.chunks(max_concurrent) {
        let chunk_results: Result<Vec<R>, E> = chunk.par_iter().map(&f).collect();
        results.extend(chunk_results?);
    }
    Ok(results)
}
