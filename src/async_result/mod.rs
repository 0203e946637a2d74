//! Reference-counted, single-assignment results of asynchronous operations.
//!
//! An operation producer creates an invalid [`AsyncResult`], binds a [`Completer`] to it (which
//! makes it pending) and hands clones of the handle to observers. Observers poll the status,
//! register completion callbacks, block with [`AsyncResult::wait`] or `.await` an
//! [`AsyncResult::completion`]. The producer resolves the result exactly once by consuming the
//! completer.
//!
//! ```
//! use firebase_async_result::async_result::{AsyncResult, AsyncStatus, Completer};
//!
//! let mut result = AsyncResult::new();
//! let completer = Completer::new(&mut result);
//! let observer = result.clone();
//! assert_eq!(observer.status(), AsyncStatus::Pending);
//!
//! completer.complete_successfully(42);
//! assert_eq!(observer.status(), AsyncStatus::Complete);
//! assert_eq!(observer.result(), Some(&42));
//! ```

pub mod api;
pub mod completer;
pub mod completion;
mod control_block;
pub mod error;
pub mod wait;

pub use api::{AsyncResult, AsyncResultBase, AsyncStatus, INVALID_ERROR};
pub use completer::{Completer, CompleterBase};
pub use completion::Completion;
pub use error::{AsyncResultError, AsyncResultResult, ErrorCode};
pub use wait::wait_for_completion;
