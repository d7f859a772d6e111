use thiserror::Error;

/// Custom error types for the grammar engine
#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Symbol already registered with a different classification: {0}")]
    DuplicateSymbol(String),

    #[error("Rule parent must be a non-terminal: {0}")]
    InvalidParentClassification(String),

    #[error("Terminal rule child must be a terminal: {0}")]
    InvalidChildClassification(String),

    #[error("Grammar has no start rule")]
    NoStartRule,

    #[error("Generation exhausted after {attempts} attempt(s)")]
    GenerationExhausted { attempts: usize },

    #[error("Empty production: {0}")]
    EmptyProduction(String),
}

/// Result type for grammar operations
pub type Result<T> = std::result::Result<T, GrammarError>;
