use crate::core::attributes::AttributeSchema;
use crate::core::example::Example;
use std::io::Error;
use std::sync::Arc;

/// Pull-based interface for data streams that produce [`Example`]s.
///
/// Implementations may represent finite datasets (e.g. files) or unbounded
/// generators. All returned examples must conform to the same, immutable
/// [`AttributeSchema`] for the lifetime of the stream.
pub trait ExampleStream {
    /// Returns the stream's schema.
    ///
    /// The schema must remain valid and immutable for the entire lifetime of
    /// the stream; every example yielded by [`next_example`] must match it.
    ///
    /// [`next_example`]: Self::next_example
    fn schema(&self) -> &Arc<AttributeSchema>;

    /// Indicates whether the stream *may* produce more examples.
    ///
    /// Finite streams should return `false` once exhausted; unbounded
    /// generators typically return `true` always. This call should be cheap
    /// and side effect free. If it returns `false`, a subsequent call to
    /// [`next_example`](Self::next_example) must return `None`.
    fn has_more_examples(&self) -> bool;

    /// Produces the next example, or `None` if the stream is exhausted.
    ///
    /// Sources that can contain malformed records may skip invalid rows and
    /// continue, or end the stream early; they should not panic on normal
    /// end-of-stream conditions.
    fn next_example(&mut self) -> Option<Example>;

    /// Resets the stream to its initial state.
    ///
    /// For file-backed streams this typically seeks back to the start of the
    /// data; generators re-seed their RNG and clear internal counters. The
    /// schema must remain unchanged.
    fn restart(&mut self) -> Result<(), Error>;
}
