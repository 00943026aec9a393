use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node #{0} does not belong to this tree")]
    UnknownNode(usize),
}

/// Failure while rebuilding one project description.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("malformed project structure at line {line}: {reason}")]
    MalformedStructure { line: usize, reason: String },

    #[error("unbalanced scripts section for '{object}' (opened at line {line})")]
    UnbalancedScript { object: String, line: usize },

    #[error("corrupt project tree: {0}")]
    Tree(#[from] TreeError),

    #[error("failed to read project description: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid marker pattern: {0}")]
    Pattern(#[from] regex::Error),
}
