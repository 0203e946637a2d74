use std::fmt::Debug;

use crate::async_result::{AsyncResult, AsyncStatus, INVALID_ERROR};

/// Render the expected state of an async result the same way its `Debug` impl does.
pub fn describe<T: Debug>(
    status: AsyncStatus,
    error: i32,
    error_message: &str,
    result: Option<&T>,
) -> String {
    let result = match result {
        Some(value) => format!("{value:?}"),
        None => "nullptr".to_string(),
    };
    format!(
        "AsyncResult{{status={status}, error={error}, error_message={error_message:?}, result={result}}}"
    )
}

/// Names of the properties of `actual` that differ from the expected values.
pub fn mismatched_properties<T>(
    actual: &AsyncResult<T>,
    status: AsyncStatus,
    error: i32,
    error_message: &str,
    result: Option<&T>,
) -> Vec<&'static str>
where
    T: PartialEq + Send + Sync + 'static,
{
    let mut mismatched = Vec::new();
    if actual.status() != status {
        mismatched.push("status");
    }
    if actual.error() != error {
        mismatched.push("error");
    }
    if actual.error_message() != error_message {
        mismatched.push("error_message");
    }
    if actual.result() != result {
        mismatched.push("result");
    }
    mismatched
}

#[track_caller]
fn assert_properties<T>(
    actual: &AsyncResult<T>,
    status: AsyncStatus,
    error: i32,
    error_message: &str,
    result: Option<&T>,
) where
    T: Debug + PartialEq + Send + Sync + 'static,
{
    let mismatched = mismatched_properties(actual, status, error, error_message, result);
    assert!(
        mismatched.is_empty(),
        "match failed for: {}\n  expected: {}\n    actual: {:?}",
        mismatched.join(", "),
        describe(status, error, error_message, result),
        actual
    );
}

#[track_caller]
pub fn assert_invalid<T>(actual: &AsyncResult<T>)
where
    T: Debug + PartialEq + Send + Sync + 'static,
{
    assert_properties(actual, AsyncStatus::Invalid, INVALID_ERROR, "", None);
}

#[track_caller]
pub fn assert_pending<T>(actual: &AsyncResult<T>)
where
    T: Debug + PartialEq + Send + Sync + 'static,
{
    assert_properties(actual, AsyncStatus::Pending, 0, "", None);
}

#[track_caller]
pub fn assert_succeeded_with<T>(actual: &AsyncResult<T>, expected: T)
where
    T: Debug + PartialEq + Send + Sync + 'static,
{
    assert_properties(actual, AsyncStatus::Complete, 0, "", Some(&expected));
}

#[track_caller]
pub fn assert_failed_with<T>(actual: &AsyncResult<T>, error: i32, error_message: &str)
where
    T: Debug + PartialEq + Send + Sync + 'static,
{
    assert_properties(actual, AsyncStatus::Complete, error, error_message, None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::async_result::Completer;

    #[test]
    fn describe_matches_debug_output() {
        let mut result = AsyncResult::new();
        Completer::new(&mut result).complete_successfully(42);
        assert_eq!(
            describe(AsyncStatus::Complete, 0, "", Some(&42)),
            format!("{result:?}")
        );
    }

    #[test]
    fn mismatches_are_named() {
        let mut result = AsyncResult::<i32>::new();
        Completer::new(&mut result).complete_unsuccessfully(1234, "errmsg");
        let mismatched =
            mismatched_properties(&result, AsyncStatus::Complete, 0, "", Some(&42));
        assert_eq!(mismatched, vec!["error", "error_message", "result"]);
    }

    #[test]
    #[should_panic(expected = "match failed for: status, error")]
    fn assertion_reports_mismatches() {
        let result = AsyncResult::<i32>::new();
        assert_pending(&result);
    }
}
