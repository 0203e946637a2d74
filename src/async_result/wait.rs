use std::time::Duration;

use crate::async_result::api::{AsyncResult, AsyncResultBase};
use crate::async_result::control_block::Settled;
use crate::async_result::error::{
    cancelled, deadline_exceeded, failed_precondition, AsyncResultResult,
};

/// Block the calling thread until `result` completes or `timeout` elapses.
///
/// Returns as soon as the result is complete, whatever its error code; inspect the handle
/// afterwards for the outcome. Invalid handles fail with `FailedPrecondition` since they can never
/// complete, a result whose completer was dropped fails with `Cancelled`, and an elapsed timeout
/// fails with `DeadlineExceeded`. Nothing stays registered on the result once this returns.
pub fn wait_for_completion(
    result: &impl AsRef<AsyncResultBase>,
    timeout: Duration,
) -> AsyncResultResult<()> {
    let block = result
        .as_ref()
        .block()
        .ok_or_else(|| failed_precondition("cannot wait for an invalid async result"))?;

    match block.wait_timeout(timeout) {
        Settled::Complete => Ok(()),
        Settled::Abandoned => Err(cancelled(
            "async result can no longer complete; its completer was dropped",
        )),
        Settled::TimedOut => {
            log::debug!("async result still pending after {timeout:?}");
            Err(deadline_exceeded(format!(
                "async result did not complete within {timeout:?}"
            )))
        }
    }
}

impl<T> AsyncResult<T>
where
    T: Send + Sync + 'static,
{
    /// Block until this result completes or `timeout` elapses. See [`wait_for_completion`].
    pub fn wait(&self, timeout: Duration) -> AsyncResultResult<()> {
        wait_for_completion(self, timeout)
    }
}
