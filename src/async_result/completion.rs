use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::FusedFuture;

use crate::async_result::api::AsyncResult;
use crate::async_result::control_block::Settled;
use crate::async_result::error::{cancelled, failed_precondition, AsyncResultResult};

/// `std::future::Future` resolving to a completed [`AsyncResult`].
///
/// Created by [`AsyncResult::completion`]. Resolves with the completed handle whatever its error
/// code. Fails with `FailedPrecondition` for an invalid handle and with `Cancelled` once the
/// completer is dropped without completing. While pending it keeps a single waker registered on
/// the result, which is removed when the future resolves or is dropped.
pub struct Completion<T> {
    result: AsyncResult<T>,
    waker_key: Option<u64>,
    terminated: bool,
}

impl<T> AsyncResult<T>
where
    T: Send + Sync + 'static,
{
    pub fn completion(&self) -> Completion<T> {
        Completion {
            result: self.clone(),
            waker_key: None,
            terminated: false,
        }
    }
}

impl<T> Future for Completion<T>
where
    T: Send + Sync + 'static,
{
    type Output = AsyncResultResult<AsyncResult<T>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if this.terminated {
            return Poll::Ready(Err(failed_precondition(
                "completion polled after it resolved",
            )));
        }

        let Some(block) = this.result.as_base().block() else {
            this.terminated = true;
            return Poll::Ready(Err(failed_precondition(
                "cannot await an invalid async result",
            )));
        };
        let settled = match block.poll_settled(&mut this.waker_key, cx) {
            Poll::Ready(settled) => settled,
            Poll::Pending => return Poll::Pending,
        };

        this.terminated = true;
        let output = match settled {
            Settled::Complete => Ok(this.result.clone()),
            Settled::Abandoned | Settled::TimedOut => Err(cancelled(
                "async result can no longer complete; its completer was dropped",
            )),
        };
        Poll::Ready(output)
    }
}

impl<T> FusedFuture for Completion<T>
where
    T: Send + Sync + 'static,
{
    fn is_terminated(&self) -> bool {
        self.terminated
    }
}

impl<T> Drop for Completion<T> {
    fn drop(&mut self) {
        if let (Some(key), Some(block)) = (self.waker_key.take(), self.result.as_ref().block()) {
            block.forget_waker(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::async_result::{Completer, ErrorCode};
    use crate::test_support::{assert_failed_with, assert_succeeded_with};
    use futures::executor::block_on;
    use futures::FutureExt;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn resolves_immediately_when_already_complete() {
        let mut result = AsyncResult::new();
        Completer::new(&mut result).complete_successfully(42);

        let done = block_on(result.completion()).unwrap();
        assert_succeeded_with(&done, 42);
        assert!(done.shares_state_with(&result));
    }

    #[test]
    fn failed_operations_still_resolve_with_the_handle() {
        let mut result = AsyncResult::<i32>::new();
        let completer = Completer::new(&mut result);
        let completion = result.completion();
        completer.complete_unsuccessfully(7, "boom");

        let done = block_on(completion).unwrap();
        assert_failed_with(&done, 7, "boom");
    }

    #[test]
    fn invalid_handle_fails_fast() {
        let result = AsyncResult::<i32>::new();
        let err = block_on(result.completion()).unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::FailedPrecondition));
    }

    #[test]
    fn abandoned_result_is_cancelled() {
        let mut result = AsyncResult::<i32>::new();
        let completer = Completer::new(&mut result);
        let completion = result.completion();
        drop(result);
        drop(completer);

        let err = block_on(completion).unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::Cancelled));
    }

    #[test]
    fn dropped_completions_leave_no_listeners_behind() {
        let mut result = AsyncResult::<i32>::new();
        let _completer = Completer::new(&mut result);
        for _ in 0..500 {
            let mut completion = result.completion();
            assert!((&mut completion).now_or_never().is_none());
        }
        assert_eq!(result.as_base().pending_listeners(), 0);
    }

    #[test]
    fn fused_after_resolving() {
        let mut result = AsyncResult::new();
        Completer::new(&mut result).complete_successfully(1_u8);
        let mut completion = result.completion();
        assert!(!completion.is_terminated());

        assert!(block_on(&mut completion).is_ok());
        assert!(completion.is_terminated());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn resolves_when_completed_from_another_thread() {
        let mut result = AsyncResult::new();
        let completer = Completer::new(&mut result);
        let worker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            completer.complete_successfully(String::from("done"));
        });

        let done = result.completion().await.unwrap();
        assert_eq!(done.result().map(String::as_str), Some("done"));
        worker.join().unwrap();
    }
}
