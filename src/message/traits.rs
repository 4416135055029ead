// Layer 1: Standard library imports
use std::fmt::Debug;

// Layer 2: Third-party crate imports
// (none for this module)

// Layer 3: Internal module imports
// (none)

/// Core message trait with compile-time type identification.
///
/// Every payload flowing through the runtime implements `Message`. The
/// `Clone` bound is what makes copy-on-send possible for remote links and
/// lets the runtime keep the last computed result around for exit notices.
///
/// Messages from one sender arrive in send order; there is no priority
/// lane, control and user messages share the same FIFO queue.
///
/// # Example
/// ```rust
/// use warden_rt::message::Message;
///
/// #[derive(Debug, Clone)]
/// struct JobRequest {
///     input: String,
/// }
///
/// impl Message for JobRequest {
///     const MESSAGE_TYPE: &'static str = "job_request";
/// }
/// ```
pub trait Message: Send + Sync + Clone + Debug + 'static {
    /// Unique message type identifier (compile-time constant)
    ///
    /// Used as a tag in diagnostics; no runtime reflection is involved.
    const MESSAGE_TYPE: &'static str;
}

impl Message for String {
    const MESSAGE_TYPE: &'static str = "string";
}
