//! # Item Fan-Out
//!
//! Items of one operation are independent: each task reads the snapshot and
//! returns its own result. Results are joined in item order after every task
//! finished, so no task touches shared mutable state.
//!
//! Small batches run sequentially; rayon's overhead is not worth it below
//! the configured threshold.

use rayon::prelude::*;

/// Map `items` with `f`, in parallel from `threshold` items on.
///
/// Returns the results in item order, or the error of the first failing item
/// in item order.
pub fn fan_out<T, R, E, F>(items: &[T], threshold: usize, f: F) -> Result<Vec<R>, E>
where
    T: Sync,
    R: Send,
    E: Send,
    F: Fn(usize, &T) -> Result<R, E> + Sync + Send,
{
    if items.len() < threshold.max(1) {
        return items.iter().enumerate().map(|(i, item)| f(i, item)).collect();
    }

    let results: Vec<Result<R, E>> = items
        .par_iter()
        .enumerate()
        .map(|(i, item)| f(i, item))
        .collect();
    results.into_iter().collect()
}
