/// Classification for retry policy.
///
/// Nothing in the ingestion core retries on its own. The class is advice for
/// whoever called `refresh()` and has to decide between retrying the whole
/// exchange, skipping it, or giving up.
///
/// | Class | Retrying the refresh may help? |
/// |-------|--------------------------------|
/// | `Transient` | Yes, after a pause |
/// | `Never` | No, the request or the upstream format is wrong |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Connection failures, timeouts, throttling and upstream 5xx responses.
    Transient,

    /// Schema drift, client errors and mapping failures.
    /// The same request will fail the same way until code or upstream changes.
    Never,
}

impl RetryClass {
    pub fn is_retryable(self) -> bool {
        matches!(self, RetryClass::Transient)
    }
}
