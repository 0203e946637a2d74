use std::any::{type_name, Any, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::async_result::api::{AsyncResult, AsyncResultBase};
use crate::async_result::control_block::ControlBlock;
use crate::async_result::error::ErrorCode;
use crate::util::assert;

/// One-shot write capability for an [`AsyncResultBase`].
///
/// Each completion method consumes the completer, so a result can be resolved at most once.
/// Dropping a completer without calling either method leaves every handle pending forever. That
/// is the caller's responsibility: it is logged, callbacks never fire, and blocking or async
/// waiters are released with a `Cancelled` error.
pub struct CompleterBase {
    block: Option<Arc<ControlBlock>>,
    // Set when bound through a typed handle; stored values must then be of this type.
    expected: Option<(TypeId, &'static str)>,
}

impl CompleterBase {
    /// Bind a new completer to `target`, which must be invalid.
    ///
    /// The target becomes pending. Binding a handle that already refers to an operation is a
    /// fatal programmer error.
    pub fn new(target: &mut AsyncResultBase) -> Self {
        let block = target.bind();
        log::trace!("bound completer to a new async result");
        Self {
            block: Some(block),
            expected: None,
        }
    }

    /// Complete with an owned, type-erased value and an error code (usually `0`).
    ///
    /// When the completer came from a typed [`Completer`], storing a value of any other type is a
    /// fatal programmer error.
    pub fn complete_successfully(mut self, result: Box<dyn Any + Send + Sync>, error: i32) {
        if let Some((expected, expected_name)) = self.expected {
            assert::assert(
                (*result).type_id() == expected,
                format!("async result of {expected_name} completed with a value of another type"),
            );
        }
        self.finish(Some(result), error, String::new());
    }

    /// Complete without a value.
    pub fn complete_unsuccessfully(mut self, error: i32, error_message: impl Into<String>) {
        self.finish(None, error, error_message.into());
    }

    fn finish(
        &mut self,
        result: Option<Box<dyn Any + Send + Sync>>,
        error: i32,
        error_message: String,
    ) {
        if let Some(block) = self.block.take() {
            ControlBlock::complete(&block, result, error, error_message);
        }
    }
}

impl Drop for CompleterBase {
    fn drop(&mut self) {
        if let Some(block) = self.block.take() {
            log::warn!("completer dropped before completion; async result stays pending");
            block.abandon();
        }
    }
}

/// Typed one-shot write capability for an [`AsyncResult<T>`].
pub struct Completer<T> {
    inner: CompleterBase,
    _marker: PhantomData<fn(T)>,
}

impl<T> Completer<T>
where
    T: Send + Sync + 'static,
{
    /// Bind a new completer to `target`, which must be invalid.
    pub fn new(target: &mut AsyncResult<T>) -> Self {
        let mut inner = CompleterBase::new(target.base_mut());
        inner.expected = Some((TypeId::of::<T>(), type_name::<T>()));
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    pub fn complete_successfully(self, result: T) {
        self.complete_with(result, 0);
    }

    /// Complete with a value while still reporting `error`.
    pub fn complete_with(self, result: T, error: i32) {
        self.inner.complete_successfully(Box::new(result), error);
    }

    pub fn complete_unsuccessfully(self, error: i32, error_message: impl Into<String>) {
        self.inner.complete_unsuccessfully(error, error_message);
    }

    pub fn complete_with_error(self, code: ErrorCode, error_message: impl Into<String>) {
        self.complete_unsuccessfully(code.as_i32(), error_message);
    }

    /// Drop the type parameter, e.g. to hand the completer to untyped plumbing. The value type
    /// is still checked on completion.
    pub fn into_base(self) -> CompleterBase {
        self.inner
    }
}
