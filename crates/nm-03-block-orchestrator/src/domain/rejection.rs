//! Classification of `process` rejections.

/// What a node rejection means for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Work below threshold: regenerate and retry.
    InsufficientWork,
    /// `previous` is not the account's frontier any more: re-read state and
    /// retry.
    StaleFrontier,
    /// The node already holds a block with this hash.
    AlreadyPublished,
    /// Anything else; reported with full context.
    Other,
}

impl Rejection {
    pub fn is_retryable(self) -> bool {
        matches!(self, Rejection::InsufficientWork | Rejection::StaleFrontier)
    }
}

/// Classify the node's error text.
pub fn classify_rejection(message: &str) -> Rejection {
    let message = message.to_ascii_lowercase();
    if message.contains("old block") {
        Rejection::AlreadyPublished
    } else if message.contains("work") {
        Rejection::InsufficientWork
    } else if message.contains("fork") || message.contains("gap previous") {
        Rejection::StaleFrontier
    } else {
        Rejection::Other
    }
}
