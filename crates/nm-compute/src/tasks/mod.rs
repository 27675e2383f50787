//! Async task wrappers around the blocking engines.

pub mod work;

pub use work::WorkTask;
