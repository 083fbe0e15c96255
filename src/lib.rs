mod builtin;
mod context;
mod env;
mod error;
mod interpreter;
mod pair;
mod parser;

#[cfg(test)]
mod test_utils;

pub use context::Interpreter;
pub use env::{EnvId, Environments};
pub use error::MinnowError;
pub use interpreter::{evaluate, is_truthy, Builtin, Function, Lambda, Number, Value};
pub use pair::Pair;
pub use parser::{parse, parse_program, tokenize, Literal, Sexp, Token};
