use std::error::Error;
use std::fmt::{Display, Formatter};

/// Numeric error codes reported through [`AsyncResult::error`](crate::async_result::AsyncResult::error).
///
/// The values follow the Firestore (gRPC) status codes. Producers are free to report other
/// integers; [`ErrorCode::from_i32`] returns `None` for those.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    Ok = 0,
    Cancelled = 1,
    Unknown = 2,
    InvalidArgument = 3,
    DeadlineExceeded = 4,
    NotFound = 5,
    AlreadyExists = 6,
    PermissionDenied = 7,
    ResourceExhausted = 8,
    FailedPrecondition = 9,
    Aborted = 10,
    OutOfRange = 11,
    Unimplemented = 12,
    Internal = 13,
    Unavailable = 14,
    DataLoss = 15,
    Unauthenticated = 16,
}

impl ErrorCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        let code = match value {
            0 => ErrorCode::Ok,
            1 => ErrorCode::Cancelled,
            2 => ErrorCode::Unknown,
            3 => ErrorCode::InvalidArgument,
            4 => ErrorCode::DeadlineExceeded,
            5 => ErrorCode::NotFound,
            6 => ErrorCode::AlreadyExists,
            7 => ErrorCode::PermissionDenied,
            8 => ErrorCode::ResourceExhausted,
            9 => ErrorCode::FailedPrecondition,
            10 => ErrorCode::Aborted,
            11 => ErrorCode::OutOfRange,
            12 => ErrorCode::Unimplemented,
            13 => ErrorCode::Internal,
            14 => ErrorCode::Unavailable,
            15 => ErrorCode::DataLoss,
            16 => ErrorCode::Unauthenticated,
            _ => return None,
        };
        Some(code)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Ok => "firestore/ok",
            ErrorCode::Cancelled => "firestore/cancelled",
            ErrorCode::Unknown => "firestore/unknown",
            ErrorCode::InvalidArgument => "firestore/invalid-argument",
            ErrorCode::DeadlineExceeded => "firestore/deadline-exceeded",
            ErrorCode::NotFound => "firestore/not-found",
            ErrorCode::AlreadyExists => "firestore/already-exists",
            ErrorCode::PermissionDenied => "firestore/permission-denied",
            ErrorCode::ResourceExhausted => "firestore/resource-exhausted",
            ErrorCode::FailedPrecondition => "firestore/failed-precondition",
            ErrorCode::Aborted => "firestore/aborted",
            ErrorCode::OutOfRange => "firestore/out-of-range",
            ErrorCode::Unimplemented => "firestore/unimplemented",
            ErrorCode::Internal => "firestore/internal",
            ErrorCode::Unavailable => "firestore/unavailable",
            ErrorCode::DataLoss => "firestore/data-loss",
            ErrorCode::Unauthenticated => "firestore/unauthenticated",
        }
    }
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> Self {
        code.as_i32()
    }
}

/// A failed asynchronous operation, or a failure to observe one.
///
/// Operation failures come from a completed result whose `error()` is non-zero. The wait and
/// completion adapters also use this type for timeouts and abandoned results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsyncResultError {
    pub code: i32,
    message: String,
}

impl AsyncResultError {
    pub fn new(code: impl Into<i32>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        ErrorCode::from_i32(self.code)
    }

    pub fn code_str(&self) -> String {
        match self.error_code() {
            Some(code) => code.as_str().to_string(),
            None => format!("error/{}", self.code),
        }
    }
}

impl Display for AsyncResultError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl Error for AsyncResultError {}

pub type AsyncResultResult<T> = Result<T, AsyncResultError>;

pub fn cancelled(message: impl Into<String>) -> AsyncResultError {
    AsyncResultError::new(ErrorCode::Cancelled, message)
}

pub fn deadline_exceeded(message: impl Into<String>) -> AsyncResultError {
    AsyncResultError::new(ErrorCode::DeadlineExceeded, message)
}

pub fn failed_precondition(message: impl Into<String>) -> AsyncResultError {
    AsyncResultError::new(ErrorCode::FailedPrecondition, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_integers() {
        for value in 0..=16 {
            let code = ErrorCode::from_i32(value).unwrap();
            assert_eq!(code.as_i32(), value);
        }
        assert_eq!(ErrorCode::from_i32(17), None);
        assert_eq!(ErrorCode::from_i32(-1), None);
    }

    #[test]
    fn display_includes_code_string() {
        let err = deadline_exceeded("too slow");
        assert_eq!(err.to_string(), "too slow (firestore/deadline-exceeded)");
        assert_eq!(err.error_code(), Some(ErrorCode::DeadlineExceeded));
    }

    #[test]
    fn unknown_codes_fall_back_to_raw_value() {
        let err = AsyncResultError::new(1234, "errmsg");
        assert_eq!(err.error_code(), None);
        assert_eq!(err.to_string(), "errmsg (error/1234)");
        assert_eq!(err.message(), "errmsg");
    }
}
