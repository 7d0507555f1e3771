//! Exit code constants for the lockman CLI.
//!
//! - 0: Success (including streams in which individual lines were rejected)
//! - 1: User error (bad arguments, invalid configuration, unreadable input file)
//! - 2: I/O failure while streaming (for example a closed output pipe)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid configuration, or a rejected request.
pub const USER_ERROR: i32 = 1;

/// I/O failure on the input or output stream.
pub const IO_FAILURE: i32 = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [SUCCESS, USER_ERROR, IO_FAILURE];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }

    #[test]
    fn success_is_zero() {
        assert_eq!(SUCCESS, 0);
    }
}
