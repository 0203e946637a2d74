use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::async_result::control_block::{ControlBlock, Snapshot};
use crate::async_result::error::{AsyncResultError, AsyncResultResult, ErrorCode};
use crate::util::assert;

/// Error value reported by a handle that is not bound to any operation.
pub const INVALID_ERROR: i32 = -1;

/// Observable state of an async result handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AsyncStatus {
    /// The operation has finished, successfully or not.
    Complete,
    /// The operation is bound to a completer that has not fired yet.
    Pending,
    /// The handle is not bound to any operation.
    Invalid,
}

impl AsyncStatus {
    pub fn name(&self) -> &'static str {
        match self {
            AsyncStatus::Complete => "Complete",
            AsyncStatus::Pending => "Pending",
            AsyncStatus::Invalid => "Invalid",
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, AsyncStatus::Complete)
    }
}

impl fmt::Display for AsyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Untyped handle to the outcome of an asynchronous operation.
///
/// Cloning shares the underlying state: every clone observes the same status, error and result at
/// all times, including clones taken while the operation was still pending. A default handle (or
/// one emptied with [`take`](Self::take)) is *invalid* and reports fixed sentinel values.
#[derive(Clone, Default)]
pub struct AsyncResultBase {
    block: Option<Arc<ControlBlock>>,
}

impl AsyncResultBase {
    /// Create an invalid handle.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_block(block: Arc<ControlBlock>) -> Self {
        Self { block: Some(block) }
    }

    /// Attach a fresh control block to this handle and return it for the completer.
    pub(crate) fn bind(&mut self) -> Arc<ControlBlock> {
        assert::assert(
            self.block.is_none(),
            "a completer can only be bound to an invalid async result",
        );
        let block = Arc::new(ControlBlock::new());
        self.block = Some(Arc::clone(&block));
        block
    }

    pub(crate) fn block(&self) -> Option<&Arc<ControlBlock>> {
        self.block.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn pending_listeners(&self) -> usize {
        self.block
            .as_ref()
            .map_or(0, |block| block.pending_listeners())
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        match &self.block {
            Some(block) => block.snapshot(),
            None => Snapshot {
                status: AsyncStatus::Invalid,
                error: INVALID_ERROR,
                error_message: String::new(),
            },
        }
    }

    pub fn is_valid(&self) -> bool {
        self.block.is_some()
    }

    /// Move the shared state out of this handle, leaving it invalid.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Whether both handles refer to the same operation.
    pub fn shares_state_with(&self, other: &AsyncResultBase) -> bool {
        match (&self.block, &other.block) {
            (Some(lhs), Some(rhs)) => Arc::ptr_eq(lhs, rhs),
            _ => false,
        }
    }

    pub fn status(&self) -> AsyncStatus {
        self.block
            .as_ref()
            .map_or(AsyncStatus::Invalid, |block| block.status())
    }

    /// Zero on success, the operation's error code on failure, `-1` when invalid.
    pub fn error(&self) -> i32 {
        self.block
            .as_ref()
            .map_or(INVALID_ERROR, |block| block.error())
    }

    pub fn error_message(&self) -> String {
        self.block
            .as_ref()
            .map(|block| block.error_message())
            .unwrap_or_default()
    }

    /// The type-erased result, present only once the operation completed with a value.
    pub fn result_any(&self) -> Option<&(dyn Any + Send + Sync)> {
        self.block.as_ref().and_then(|block| block.result())
    }

    /// Run `callback` exactly once when the operation completes.
    ///
    /// If the operation is already complete the callback runs immediately on the calling thread.
    /// On an invalid handle the callback is dropped without ever running.
    pub fn on_completion<F>(&self, callback: F)
    where
        F: FnOnce(&AsyncResultBase) + Send + 'static,
    {
        match &self.block {
            Some(block) => ControlBlock::on_completion(block, Box::new(callback)),
            None => log::trace!("ignoring completion callback registered on an invalid async result"),
        }
    }

    /// Function-pointer flavour of [`on_completion`](Self::on_completion) carrying user data.
    pub fn on_completion_with<U>(&self, callback: fn(&AsyncResultBase, U), user_data: U)
    where
        U: Send + 'static,
    {
        self.on_completion(move |result| callback(result, user_data));
    }
}

impl AsRef<AsyncResultBase> for AsyncResultBase {
    fn as_ref(&self) -> &AsyncResultBase {
        self
    }
}

impl fmt::Debug for AsyncResultBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot();
        let result = if self.result_any().is_some() {
            "<erased>"
        } else {
            "nullptr"
        };
        write!(
            f,
            "AsyncResult{{status={}, error={}, error_message={:?}, result={}}}",
            snapshot.status, snapshot.error, snapshot.error_message, result
        )
    }
}

/// Typed handle to the outcome of an asynchronous operation producing a `T`.
///
/// Behaves exactly like [`AsyncResultBase`]; the type parameter only adds typed access to the
/// result and to completion callbacks.
pub struct AsyncResult<T> {
    base: AsyncResultBase,
    _marker: PhantomData<fn() -> T>,
}

impl<T> AsyncResult<T>
where
    T: Send + Sync + 'static,
{
    /// Create an invalid handle.
    pub fn new() -> Self {
        Self::from_base(AsyncResultBase::new())
    }

    pub(crate) fn from_base(base: AsyncResultBase) -> Self {
        Self {
            base,
            _marker: PhantomData,
        }
    }

    pub(crate) fn base_mut(&mut self) -> &mut AsyncResultBase {
        &mut self.base
    }

    pub fn as_base(&self) -> &AsyncResultBase {
        &self.base
    }

    pub fn into_base(self) -> AsyncResultBase {
        self.base
    }

    pub fn is_valid(&self) -> bool {
        self.base.is_valid()
    }

    /// Move the shared state out of this handle, leaving it invalid.
    pub fn take(&mut self) -> Self {
        Self::from_base(self.base.take())
    }

    pub fn shares_state_with(&self, other: &AsyncResult<T>) -> bool {
        self.base.shares_state_with(&other.base)
    }

    pub fn status(&self) -> AsyncStatus {
        self.base.status()
    }

    pub fn error(&self) -> i32 {
        self.base.error()
    }

    /// The error decoded as a known [`ErrorCode`], if it is one.
    pub fn error_code(&self) -> Option<ErrorCode> {
        ErrorCode::from_i32(self.error())
    }

    pub fn error_message(&self) -> String {
        self.base.error_message()
    }

    pub fn result(&self) -> Option<&T> {
        self.base
            .result_any()
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// The outcome as a `Result`, or `None` while the operation is pending or the handle invalid.
    ///
    /// A non-zero error wins over any stored value.
    pub fn to_result(&self) -> Option<AsyncResultResult<&T>> {
        let snapshot = self.base.snapshot();
        if snapshot.status != AsyncStatus::Complete {
            return None;
        }
        if snapshot.error != 0 {
            return Some(Err(AsyncResultError::new(
                snapshot.error,
                snapshot.error_message,
            )));
        }
        match self.result() {
            Some(value) => Some(Ok(value)),
            None => Some(Err(AsyncResultError::new(
                ErrorCode::Internal,
                "async result completed without a value",
            ))),
        }
    }

    pub fn on_completion<F>(&self, callback: F)
    where
        F: FnOnce(&AsyncResult<T>) + Send + 'static,
    {
        self.base
            .on_completion(move |base| callback(&AsyncResult::from_base(base.clone())));
    }

    pub fn on_completion_with<U>(&self, callback: fn(&AsyncResult<T>, U), user_data: U)
    where
        U: Send + 'static,
    {
        self.on_completion(move |result| callback(result, user_data));
    }
}

impl<T> Clone for AsyncResult<T> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> Default for AsyncResult<T> {
    fn default() -> Self {
        Self {
            base: AsyncResultBase::default(),
            _marker: PhantomData,
        }
    }
}

impl<T> AsRef<AsyncResultBase> for AsyncResult<T> {
    fn as_ref(&self) -> &AsyncResultBase {
        &self.base
    }
}

impl<T> From<AsyncResult<T>> for AsyncResultBase {
    fn from(result: AsyncResult<T>) -> Self {
        result.base
    }
}

impl<T> fmt::Debug for AsyncResult<T>
where
    T: fmt::Debug + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.base.snapshot();
        write!(
            f,
            "AsyncResult{{status={}, error={}, error_message={:?}, result=",
            snapshot.status, snapshot.error, snapshot.error_message
        )?;
        match self.result() {
            Some(value) => write!(f, "{value:?}}}"),
            None => f.write_str("nullptr}"),
        }
    }
}
