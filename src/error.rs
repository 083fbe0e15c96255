use core::{error::Error, fmt};

/// The three terminal error kinds of the language. Each one aborts the
/// current evaluation; the REPL catches per input line and continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinnowError {
    /// Malformed token stream, detected while parsing.
    SyntaxError,
    /// A lookup or `set!` target absent from every reachable frame.
    NameError,
    /// Any other semantic violation: wrong arity, calling a non-callable,
    /// malformed special forms, type mismatches in list operations.
    EvaluationError,
}

impl fmt::Display for MinnowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SyntaxError => "SyntaxError",
            Self::NameError => "NameError",
            Self::EvaluationError => "EvaluationError",
        };
        write!(f, "{}", name)
    }
}

impl Error for MinnowError {}
