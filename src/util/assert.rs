use crate::util::CONSTANTS;

/// Panic with an internal assertion message when the condition is false.
///
/// Reserved for programmer misuse (binding a handle twice, completing a result twice). These are
/// not recoverable and are never reported through the error accessors of an async result.
#[track_caller]
pub fn assert(condition: bool, message: impl AsRef<str>) {
    if !condition {
        fail(message);
    }
}

/// Unconditionally abort the current operation with an internal assertion message.
#[track_caller]
pub fn fail(message: impl AsRef<str>) -> ! {
    panic!("{}", assertion_error(message))
}

/// Build the string carried by internal assertion panics.
pub fn assertion_error(message: impl AsRef<str>) -> String {
    format!(
        "Firebase ({} {}) INTERNAL ASSERT FAILED: {}",
        CONSTANTS.crate_name,
        CONSTANTS.sdk_version,
        message.as_ref()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "INTERNAL ASSERT FAILED")]
    fn assert_panics_on_false() {
        assert(false, "should panic");
    }

    #[test]
    fn assert_passes_on_true() {
        assert(true, "never shown");
    }

    #[test]
    #[should_panic(expected = "INTERNAL ASSERT FAILED: unreachable state")]
    fn fail_always_panics() {
        fail("unreachable state");
    }

    #[test]
    fn assertion_error_formats_message() {
        let err = assertion_error("boom");
        assert!(err.contains("Firebase"));
        assert!(err.contains(CONSTANTS.sdk_version));
        assert!(err.ends_with("boom"));
    }
}
