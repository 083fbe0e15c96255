use crate::builtin::builtin_frame;
use crate::env::{EnvId, Environments};
use crate::error::MinnowError;
use crate::interpreter::{evaluate, Value};
use crate::parser::{parse_program, tokenize, Sexp};

/// A top-level evaluation session.
///
/// Construction chains an empty user frame onto a frame pre-populated with
/// the builtin procedure table. That pair of frames is the only
/// session-wide state; it is created once and threaded explicitly through
/// every evaluation, so two sessions never share bindings.
pub struct Interpreter {
    envs: Environments,
    global: EnvId,
}

impl Interpreter {
    pub fn new() -> Self {
        let mut envs = Environments::new();
        let builtins = builtin_frame(&mut envs);
        let global = envs.child(builtins);
        Self { envs, global }
    }

    /// Tokenizes, parses and evaluates every top-level form in `source`,
    /// returning the value of the last one. Evaluation stops at the first
    /// error; earlier definitions stay in effect.
    pub fn evaluate_str(&mut self, source: &str) -> Result<Value, MinnowError> {
        let tokens = tokenize(source);
        let forms = parse_program(&tokens)?;

        let mut result = Value::Nil;
        for form in &forms {
            result = evaluate(form, self.global, &mut self.envs)?;
        }
        Ok(result)
    }

    /// Evaluates an already-parsed expression in the session's global frame.
    pub fn evaluate_sexp(&mut self, sexp: &Sexp) -> Result<Value, MinnowError> {
        evaluate(sexp, self.global, &mut self.envs)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::Number;
    use crate::parser::parse;

    #[test]
    fn fresh_sessions_do_not_share_state() {
        let mut first = Interpreter::new();
        let mut second = Interpreter::new();

        first.evaluate_str("(define x 1)").unwrap();
        assert_eq!(second.evaluate_str("x"), Err(MinnowError::NameError));
    }

    #[test]
    fn definitions_persist_across_inputs() {
        let mut interpreter = Interpreter::new();
        interpreter.evaluate_str("(define x 41)").unwrap();
        assert_eq!(
            interpreter.evaluate_str("(+ x 1)"),
            Ok(Value::Number(Number::Int(42)))
        );
    }

    #[test]
    fn evaluate_sexp_uses_the_global_frame() {
        let mut interpreter = Interpreter::new();
        let form = parse(&tokenize("(+ 1 2)")).unwrap();
        assert_eq!(
            interpreter.evaluate_sexp(&form),
            Ok(Value::Number(Number::Int(3)))
        );
    }

    #[test]
    fn empty_source_is_a_syntax_error() {
        assert_eq!(
            Interpreter::new().evaluate_str("   ; nothing here"),
            Err(MinnowError::SyntaxError)
        );
    }
}
