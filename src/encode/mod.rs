//! Encoding sinks.
//!
//! Sinks consume decoded frames in sequence order; the pixel pipeline drives them.

/// `ffmpeg`-based sinks and one-shot tool invocation.
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
