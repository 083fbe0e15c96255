use std::collections::HashMap;

use crate::env::{EnvId, Environments};
use crate::error::MinnowError;
use crate::interpreter::{is_truthy, Builtin, EvaluationResult, Function, Number, Value};
use crate::pair;

fn numbers(values: Vec<Value>) -> Result<Vec<Number>, MinnowError> {
    values
        .into_iter()
        .map(|value| match value {
            Value::Number(number) => Ok(number),
            _ => Err(MinnowError::EvaluationError),
        })
        .collect()
}

fn builtin_add(values: Vec<Value>, _envs: &mut Environments) -> EvaluationResult {
    let numbers = numbers(values)?;
    Ok(Value::Number(
        numbers.into_iter().fold(Number::Int(0), Number::add),
    ))
}

fn builtin_sub(values: Vec<Value>, _envs: &mut Environments) -> EvaluationResult {
    let numbers = numbers(values)?;
    match numbers.split_first() {
        None => Err(MinnowError::EvaluationError),
        Some((first, [])) => Ok(Value::Number(first.neg())),
        Some((first, rest)) => {
            let total = rest.iter().copied().fold(Number::Int(0), Number::add);
            Ok(Value::Number(first.sub(total)))
        }
    }
}

fn builtin_mul(values: Vec<Value>, _envs: &mut Environments) -> EvaluationResult {
    let numbers = numbers(values)?;
    if numbers.is_empty() {
        return Err(MinnowError::EvaluationError);
    }
    Ok(Value::Number(
        numbers.into_iter().fold(Number::Int(1), Number::mul),
    ))
}

fn builtin_div(values: Vec<Value>, _envs: &mut Environments) -> EvaluationResult {
    let numbers = numbers(values)?;
    match numbers.split_first() {
        None => Err(MinnowError::EvaluationError),
        // A single operand comes back unchanged.
        Some((first, [])) => Ok(Value::Number(*first)),
        Some((first, rest)) => {
            let product = rest.iter().copied().fold(Number::Int(1), Number::mul);
            Ok(Value::Number(first.div(product)))
        }
    }
}

// Comparisons chain: every adjacent operand pair must satisfy the relation.
fn chained_compare(values: Vec<Value>, relation: fn(&Number, &Number) -> bool) -> EvaluationResult {
    let numbers = numbers(values)?;
    if numbers.is_empty() {
        return Err(MinnowError::EvaluationError);
    }
    let holds = numbers.windows(2).all(|pair| relation(&pair[0], &pair[1]));
    Ok(Value::Boolean(holds))
}

fn builtin_eq(values: Vec<Value>, _envs: &mut Environments) -> EvaluationResult {
    chained_compare(values, |a, b| a == b)
}

fn builtin_greater(values: Vec<Value>, _envs: &mut Environments) -> EvaluationResult {
    chained_compare(values, |a, b| a > b)
}

fn builtin_greater_eq(values: Vec<Value>, _envs: &mut Environments) -> EvaluationResult {
    chained_compare(values, |a, b| a >= b)
}

fn builtin_less(values: Vec<Value>, _envs: &mut Environments) -> EvaluationResult {
    chained_compare(values, |a, b| a < b)
}

fn builtin_less_eq(values: Vec<Value>, _envs: &mut Environments) -> EvaluationResult {
    chained_compare(values, |a, b| a <= b)
}

fn builtin_not(values: Vec<Value>, _envs: &mut Environments) -> EvaluationResult {
    match values.as_slice() {
        [value] => Ok(Value::Boolean(!is_truthy(value))),
        _ => Err(MinnowError::EvaluationError),
    }
}

fn builtin_cons(values: Vec<Value>, _envs: &mut Environments) -> EvaluationResult {
    let mut values = values.into_iter();
    match (values.next(), values.next(), values.next()) {
        (Some(car), Some(cdr), None) => Ok(pair::cons(car, cdr)),
        _ => Err(MinnowError::EvaluationError),
    }
}

fn builtin_car(values: Vec<Value>, _envs: &mut Environments) -> EvaluationResult {
    match values.as_slice() {
        [Value::Pair(cell)] => Ok(cell.car.clone()),
        _ => Err(MinnowError::EvaluationError),
    }
}

fn builtin_cdr(values: Vec<Value>, _envs: &mut Environments) -> EvaluationResult {
    match values.as_slice() {
        [Value::Pair(cell)] => Ok(cell.cdr.clone()),
        _ => Err(MinnowError::EvaluationError),
    }
}

fn builtin_length(values: Vec<Value>, _envs: &mut Environments) -> EvaluationResult {
    match values.as_slice() {
        [list] => Ok(Value::Number(Number::Int(pair::length(list)? as i64))),
        _ => Err(MinnowError::EvaluationError),
    }
}

fn builtin_elt_at_index(values: Vec<Value>, _envs: &mut Environments) -> EvaluationResult {
    match values.as_slice() {
        [list, Value::Number(Number::Int(index))] if *index >= 0 => {
            pair::element_at(list, *index as usize)
        }
        _ => Err(MinnowError::EvaluationError),
    }
}

fn builtin_concat(values: Vec<Value>, _envs: &mut Environments) -> EvaluationResult {
    pair::concat(&values)
}

fn builtin_map(values: Vec<Value>, envs: &mut Environments) -> EvaluationResult {
    match values.as_slice() {
        [Value::Function(function), list] => pair::map(function, list, envs),
        _ => Err(MinnowError::EvaluationError),
    }
}

fn builtin_filter(values: Vec<Value>, envs: &mut Environments) -> EvaluationResult {
    match values.as_slice() {
        [Value::Function(function), list] => pair::filter(function, list, envs),
        _ => Err(MinnowError::EvaluationError),
    }
}

fn builtin_reduce(values: Vec<Value>, envs: &mut Environments) -> EvaluationResult {
    match values.as_slice() {
        [Value::Function(function), list, initial] => {
            pair::reduce(function, list, initial.clone(), envs)
        }
        _ => Err(MinnowError::EvaluationError),
    }
}

static BUILTINS: &[Builtin] = &[
    Builtin { name: "+", call: builtin_add },
    Builtin { name: "-", call: builtin_sub },
    Builtin { name: "*", call: builtin_mul },
    Builtin { name: "/", call: builtin_div },
    Builtin { name: "=?", call: builtin_eq },
    Builtin { name: ">", call: builtin_greater },
    Builtin { name: ">=", call: builtin_greater_eq },
    Builtin { name: "<", call: builtin_less },
    Builtin { name: "<=", call: builtin_less_eq },
    Builtin { name: "not", call: builtin_not },
    Builtin { name: "cons", call: builtin_cons },
    Builtin { name: "car", call: builtin_car },
    Builtin { name: "cdr", call: builtin_cdr },
    Builtin { name: "length", call: builtin_length },
    Builtin { name: "elt-at-index", call: builtin_elt_at_index },
    Builtin { name: "concat", call: builtin_concat },
    Builtin { name: "map", call: builtin_map },
    Builtin { name: "filter", call: builtin_filter },
    Builtin { name: "reduce", call: builtin_reduce },
];

/// Allocates the parentless frame holding the builtin procedure table and
/// the `#t`/`#f`/`nil` constants.
pub(crate) fn builtin_frame(envs: &mut Environments) -> EnvId {
    let mut bindings: HashMap<String, Value> = BUILTINS
        .iter()
        .map(|builtin| {
            (
                builtin.name.to_owned(),
                Value::Function(Function::Builtin(builtin)),
            )
        })
        .collect();

    bindings.insert("#t".to_owned(), Value::Boolean(true));
    bindings.insert("#f".to_owned(), Value::Boolean(false));
    bindings.insert("nil".to_owned(), Value::Nil);

    envs.root(bindings)
}
