/// Classification for retry policy.
///
/// Used by the cache manager to decide whether a failed terminal call is
/// worth a second attempt.
///
/// | Class | Retry once after backoff? |
/// |-------|---------------------------|
/// | `Never` | No |
/// | `WithBackoff` | Yes |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - malformed payload, unknown security or unsupported call.
    /// The request is fundamentally invalid and retrying won't help.
    Never,

    /// Transient terminal or I/O failure.
    /// Retry after the configured backoff.
    WithBackoff,
}
