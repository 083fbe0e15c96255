use core::fmt;

use itertools::Itertools;
use logos::Logos;

use crate::error::MinnowError;
use crate::interpreter::Number;

/// Lexical tokens: parentheses and whitespace-delimited atoms. Comments
/// run from `;` to the end of the line and are skipped along with the
/// whitespace, so an embedded parenthesis always becomes its own token.
#[derive(Debug, Clone, PartialEq, Logos)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r";[^\n]*")]
pub enum Token<'a> {
    #[token("(")]
    Open,

    #[token(")")]
    Close,

    #[regex(r"[^\s();]+", |lex| lex.slice())]
    Atom(&'a str),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Symbol(String),
    Number(Number),
}

/// Sexps are the basic building blocks of minnow programs.
#[derive(Debug, Clone, PartialEq)]
pub enum Sexp {
    Atom(Literal),
    Expression(Vec<Sexp>),
}

impl fmt::Display for Sexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom(Literal::Symbol(symbol)) => write!(f, "{}", symbol),
            Self::Atom(Literal::Number(number)) => write!(f, "{}", number),
            Self::Expression(items) => write!(f, "({})", items.iter().join(" ")),
        }
    }
}

/// Splits source text into tokens. The atom pattern covers every character
/// the skips do not, so the lexer is total and malformed input only
/// surfaces later, as a parse error.
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    Token::lexer(source).flatten().collect()
}

fn convert_atom(lexeme: &str) -> Literal {
    if let Ok(int) = lexeme.parse::<i64>() {
        Literal::Number(Number::Int(int))
    } else if let Ok(float) = lexeme.parse::<f64>() {
        Literal::Number(Number::Float(float))
    } else {
        Literal::Symbol(lexeme.to_owned())
    }
}

// The counts must match across the whole token sequence. This is the only
// whole-program validation; it is what rejects a lone `)` program.
fn check_balance(tokens: &[Token]) -> Result<(), MinnowError> {
    let open = tokens.iter().filter(|token| matches!(token, Token::Open)).count();
    let close = tokens.iter().filter(|token| matches!(token, Token::Close)).count();
    if open != close {
        return Err(MinnowError::SyntaxError);
    }
    Ok(())
}

fn parse_expression<'a, 'b>(
    tokens: &'a [Token<'b>],
) -> Result<(Sexp, &'a [Token<'b>]), MinnowError> {
    match tokens.split_first() {
        None => Err(MinnowError::SyntaxError),
        Some((Token::Close, _)) => Err(MinnowError::SyntaxError),
        Some((Token::Atom(lexeme), rest)) => Ok((Sexp::Atom(convert_atom(lexeme)), rest)),
        Some((Token::Open, mut rest)) => {
            let mut items = Vec::new();
            loop {
                match rest.first() {
                    None => return Err(MinnowError::SyntaxError),
                    Some(Token::Close) => return Ok((Sexp::Expression(items), &rest[1..])),
                    Some(_) => {
                        let (item, remaining) = parse_expression(rest)?;
                        items.push(item);
                        rest = remaining;
                    }
                }
            }
        }
    }
}

/// Parses a single top-level expression from the token sequence. A lone
/// atom is a valid program. Tokens past the first expression are not
/// validated beyond the balance check; use [`parse_program`] to consume
/// a whole source unit.
pub fn parse(tokens: &[Token]) -> Result<Sexp, MinnowError> {
    check_balance(tokens)?;
    let (expr, _rest) = parse_expression(tokens)?;
    Ok(expr)
}

/// Parses every top-level expression in order. Empty input is a syntax
/// error, so a successful parse always yields at least one form.
pub fn parse_program(tokens: &[Token]) -> Result<Vec<Sexp>, MinnowError> {
    check_balance(tokens)?;

    let mut rest = tokens;
    let mut forms = Vec::new();
    while !rest.is_empty() {
        let (expr, remaining) = parse_expression(rest)?;
        forms.push(expr);
        rest = remaining;
    }

    if forms.is_empty() {
        return Err(MinnowError::SyntaxError);
    }
    Ok(forms)
}
