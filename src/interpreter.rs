use core::fmt;
use std::rc::Rc;

use crate::env::{EnvId, Environments};
use crate::error::MinnowError;
use crate::pair::{self, Pair};
use crate::parser::{Literal, Sexp};

pub type EvaluationResult = Result<Value, MinnowError>;

/// Numbers are integers until arithmetic forces them not to be: `+`, `-`
/// and `*` stay integral on integer operands, `/` always produces a float.
/// Integer results that would overflow an `i64` promote to a float instead.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(int) => int as f64,
            Self::Float(float) => float,
        }
    }

    pub fn add(self, other: Self) -> Self {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => match a.checked_add(b) {
                Some(sum) => Self::Int(sum),
                None => Self::Float(a as f64 + b as f64),
            },
            _ => Self::Float(self.as_f64() + other.as_f64()),
        }
    }

    pub fn sub(self, other: Self) -> Self {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => match a.checked_sub(b) {
                Some(difference) => Self::Int(difference),
                None => Self::Float(a as f64 - b as f64),
            },
            _ => Self::Float(self.as_f64() - other.as_f64()),
        }
    }

    pub fn mul(self, other: Self) -> Self {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => match a.checked_mul(b) {
                Some(product) => Self::Int(product),
                None => Self::Float(a as f64 * b as f64),
            },
            _ => Self::Float(self.as_f64() * other.as_f64()),
        }
    }

    pub fn div(self, other: Self) -> Self {
        Self::Float(self.as_f64() / other.as_f64())
    }

    pub fn neg(self) -> Self {
        match self {
            Self::Int(int) => match int.checked_neg() {
                Some(negated) => Self::Int(negated),
                None => Self::Float(-(int as f64)),
            },
            Self::Float(float) => Self::Float(-float),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.as_f64().partial_cmp(&other.as_f64())
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(int) => write!(f, "{}", int),
            // Keep a decimal point so the printed form re-parses as a float.
            Self::Float(float) if float.fract() == 0.0 && float.is_finite() => {
                write!(f, "{:.1}", float)
            }
            Self::Float(float) => write!(f, "{}", float),
        }
    }
}

/// A runtime value. Numbers and booleans are copied by value; functions
/// and pairs are reference-shared.
#[derive(Clone)]
pub enum Value {
    Number(Number),
    Boolean(bool),
    Function(Function),
    Pair(Rc<Pair>),
    Nil,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{}", number),
            Self::Boolean(true) => write!(f, "#t"),
            Self::Boolean(false) => write!(f, "#f"),
            Self::Function(function) => write!(f, "{}", function),
            Self::Nil => write!(f, "()"),
            Self::Pair(cell) => {
                write!(f, "({}", cell.car)?;
                let mut tail = &cell.cdr;
                loop {
                    match tail {
                        Self::Pair(next) => {
                            write!(f, " {}", next.car)?;
                            tail = &next.cdr;
                        }
                        Self::Nil => break,
                        improper => {
                            write!(f, " . {}", improper)?;
                            break;
                        }
                    }
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Nil, Self::Nil) => true,
            (Self::Pair(a), Self::Pair(b)) => a.car == b.car && a.cdr == b.cdr,
            (Self::Function(a), Self::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// Everything except the boolean false is truthy in conditional contexts.
pub fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Boolean(false))
}

/// A native procedure: arity and type checks happen inside `call`, which
/// receives already-evaluated arguments.
#[derive(Debug)]
pub struct Builtin {
    pub name: &'static str,
    pub call: fn(Vec<Value>, &mut Environments) -> EvaluationResult,
}

/// A user function: parameter names, body expression, and the handle of
/// the environment active at its definition site.
#[derive(Debug)]
pub struct Lambda {
    pub(crate) params: Vec<String>,
    pub(crate) body: Sexp,
    pub(crate) env: EnvId,
}

impl Lambda {
    fn call(&self, args: Vec<Value>, envs: &mut Environments) -> EvaluationResult {
        if args.len() != self.params.len() {
            return Err(MinnowError::EvaluationError);
        }

        // Parent is the defining environment, never the caller's. This is
        // what makes the closures lexical rather than dynamic.
        let frame = envs.child(self.env);
        for (param, value) in self.params.iter().zip(args) {
            envs.define(frame, param, value);
        }

        evaluate(&self.body, frame, envs)
    }
}

#[derive(Clone)]
pub enum Function {
    Builtin(&'static Builtin),
    Lambda(Rc<Lambda>),
}

impl Function {
    pub fn call(&self, args: Vec<Value>, envs: &mut Environments) -> EvaluationResult {
        match self {
            Self::Builtin(builtin) => (builtin.call)(args, envs),
            Self::Lambda(lambda) => lambda.call(args, envs),
        }
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Builtin(a), Self::Builtin(b)) => std::ptr::eq(*a, *b),
            (Self::Lambda(a), Self::Lambda(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(builtin) => write!(f, "#<builtin {}>", builtin.name),
            Self::Lambda(_) => write!(f, "#<function>"),
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Syntactic constructs whose operands are not all eagerly evaluated.
/// Resolved once from the head symbol so dispatch is a tag match rather
/// than a string comparison cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecialForm {
    Define,
    Lambda,
    If,
    And,
    Or,
    Begin,
    Let,
    Set,
    List,
}

impl SpecialForm {
    fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "define" => Self::Define,
            "lambda" => Self::Lambda,
            "if" => Self::If,
            "and" => Self::And,
            "or" => Self::Or,
            "begin" => Self::Begin,
            "let" => Self::Let,
            "set!" => Self::Set,
            "list" => Self::List,
            _ => return None,
        })
    }

    fn evaluate(self, operands: &[Sexp], env: EnvId, envs: &mut Environments) -> EvaluationResult {
        match self {
            Self::Define => evaluate_define(operands, env, envs),
            Self::Lambda => evaluate_lambda(operands, env, envs),
            Self::If => evaluate_if(operands, env, envs),
            Self::And => evaluate_and(operands, env, envs),
            Self::Or => evaluate_or(operands, env, envs),
            Self::Begin => evaluate_begin(operands, env, envs),
            Self::Let => evaluate_let(operands, env, envs),
            Self::Set => evaluate_set(operands, env, envs),
            Self::List => evaluate_list(operands, env, envs),
        }
    }
}

/// Evaluates one expression in the given environment.
///
/// Nested expressions recurse through the host call stack; the language
/// has no loop construct, so deeply recursive user programs consume
/// proportional stack depth.
pub fn evaluate(sexp: &Sexp, env: EnvId, envs: &mut Environments) -> EvaluationResult {
    match sexp {
        Sexp::Atom(Literal::Number(number)) => Ok(Value::Number(*number)),
        Sexp::Atom(Literal::Symbol(symbol)) => envs.lookup(env, symbol),
        Sexp::Expression(items) => evaluate_expression(items, env, envs),
    }
}

fn evaluate_expression(items: &[Sexp], env: EnvId, envs: &mut Environments) -> EvaluationResult {
    let Some((operator, operands)) = items.split_first() else {
        return Err(MinnowError::EvaluationError);
    };

    if let Sexp::Atom(Literal::Symbol(symbol)) = operator {
        if let Some(form) = SpecialForm::from_symbol(symbol) {
            return form.evaluate(operands, env, envs);
        }
    }

    let function = match evaluate(operator, env, envs)? {
        Value::Function(function) => function,
        _ => return Err(MinnowError::EvaluationError),
    };

    let args = evaluate_operands(operands, env, envs)?;
    function.call(args, envs)
}

fn evaluate_operands(
    operands: &[Sexp],
    env: EnvId,
    envs: &mut Environments,
) -> Result<Vec<Value>, MinnowError> {
    operands
        .iter()
        .map(|operand| evaluate(operand, env, envs))
        .collect()
}

fn symbol_name(sexp: &Sexp) -> Result<&str, MinnowError> {
    match sexp {
        Sexp::Atom(Literal::Symbol(symbol)) => Ok(symbol),
        _ => Err(MinnowError::EvaluationError),
    }
}

fn evaluate_define(operands: &[Sexp], env: EnvId, envs: &mut Environments) -> EvaluationResult {
    // Either (define name expr) or the shorthand (define (name params) body).
    // The whole form may not exceed four elements; one trailing expression
    // is tolerated and ignored.
    if operands.len() < 2 || operands.len() > 3 {
        return Err(MinnowError::EvaluationError);
    }

    match &operands[0] {
        Sexp::Atom(Literal::Symbol(name)) => {
            let value = evaluate(&operands[1], env, envs)?;
            envs.define(env, name, value.clone());
            Ok(value)
        }
        Sexp::Expression(signature) => {
            let names = signature
                .iter()
                .map(symbol_name)
                .collect::<Result<Vec<_>, _>>()?;
            let Some((name, params)) = names.split_first() else {
                return Err(MinnowError::EvaluationError);
            };

            let function = Value::Function(Function::Lambda(Rc::new(Lambda {
                params: params.iter().map(|param| (*param).to_owned()).collect(),
                body: operands[1].clone(),
                env,
            })));
            envs.define(env, name, function.clone());
            Ok(function)
        }
        Sexp::Atom(Literal::Number(_)) => Err(MinnowError::EvaluationError),
    }
}

fn evaluate_lambda(operands: &[Sexp], env: EnvId, _envs: &mut Environments) -> EvaluationResult {
    if operands.len() != 2 {
        return Err(MinnowError::EvaluationError);
    }
    let Sexp::Expression(param_list) = &operands[0] else {
        return Err(MinnowError::EvaluationError);
    };

    let params = param_list
        .iter()
        .map(|param| symbol_name(param).map(str::to_owned))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Value::Function(Function::Lambda(Rc::new(Lambda {
        params,
        body: operands[1].clone(),
        env,
    }))))
}

fn evaluate_if(operands: &[Sexp], env: EnvId, envs: &mut Environments) -> EvaluationResult {
    if operands.len() != 3 {
        return Err(MinnowError::EvaluationError);
    }

    let test = evaluate(&operands[0], env, envs)?;
    if is_truthy(&test) {
        evaluate(&operands[1], env, envs)
    } else {
        evaluate(&operands[2], env, envs)
    }
}

fn evaluate_and(operands: &[Sexp], env: EnvId, envs: &mut Environments) -> EvaluationResult {
    for operand in operands {
        if !is_truthy(&evaluate(operand, env, envs)?) {
            return Ok(Value::Boolean(false));
        }
    }
    Ok(Value::Boolean(true))
}

fn evaluate_or(operands: &[Sexp], env: EnvId, envs: &mut Environments) -> EvaluationResult {
    for operand in operands {
        if is_truthy(&evaluate(operand, env, envs)?) {
            return Ok(Value::Boolean(true));
        }
    }
    Ok(Value::Boolean(false))
}

fn evaluate_begin(operands: &[Sexp], env: EnvId, envs: &mut Environments) -> EvaluationResult {
    let Some((last, init)) = operands.split_last() else {
        return Err(MinnowError::EvaluationError);
    };

    for operand in init {
        evaluate(operand, env, envs)?;
    }
    evaluate(last, env, envs)
}

fn evaluate_let(operands: &[Sexp], env: EnvId, envs: &mut Environments) -> EvaluationResult {
    if operands.len() != 2 {
        return Err(MinnowError::EvaluationError);
    }
    let Sexp::Expression(bindings) = &operands[0] else {
        return Err(MinnowError::EvaluationError);
    };

    // Binding values are evaluated in the outer environment, so earlier
    // bindings are not visible to later ones.
    let mut evaluated = Vec::with_capacity(bindings.len());
    for binding in bindings {
        let Sexp::Expression(parts) = binding else {
            return Err(MinnowError::EvaluationError);
        };
        let [name, value] = parts.as_slice() else {
            return Err(MinnowError::EvaluationError);
        };
        let name = symbol_name(name)?.to_owned();
        evaluated.push((name, evaluate(value, env, envs)?));
    }

    let frame = envs.child(env);
    for (name, value) in evaluated {
        envs.define(frame, &name, value);
    }
    evaluate(&operands[1], frame, envs)
}

fn evaluate_set(operands: &[Sexp], env: EnvId, envs: &mut Environments) -> EvaluationResult {
    if operands.len() != 2 {
        return Err(MinnowError::EvaluationError);
    }

    let name = symbol_name(&operands[0])?;
    let value = evaluate(&operands[1], env, envs)?;
    envs.assign(env, name, value)
}

fn evaluate_list(operands: &[Sexp], env: EnvId, envs: &mut Environments) -> EvaluationResult {
    let values = evaluate_operands(operands, env, envs)?;
    Ok(pair::list_from(values))
}
