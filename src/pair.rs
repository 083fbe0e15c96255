use std::rc::Rc;

use crate::env::Environments;
use crate::error::MinnowError;
use crate::interpreter::{is_truthy, EvaluationResult, Function, Value};

/// A cons cell. A proper list is `Nil` or a `Pair` whose `cdr` is itself a
/// proper list; any other chain is a bare cons cell, which list-specific
/// operations reject.
#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    pub car: Value,
    pub cdr: Value,
}

pub fn cons(car: Value, cdr: Value) -> Value {
    Value::Pair(Rc::new(Pair { car, cdr }))
}

/// Builds a proper list, preserving element order.
pub fn list_from(values: Vec<Value>) -> Value {
    let mut list = Value::Nil;
    for value in values.into_iter().rev() {
        list = cons(value, list);
    }
    list
}

// Traversals walk an explicit cursor instead of recursing, so a long list
// cannot exhaust the host stack.
fn elements(value: &Value) -> Result<Vec<Value>, MinnowError> {
    let mut out = Vec::new();
    let mut cursor = value;
    loop {
        match cursor {
            Value::Nil => return Ok(out),
            Value::Pair(cell) => {
                out.push(cell.car.clone());
                cursor = &cell.cdr;
            }
            _ => return Err(MinnowError::EvaluationError),
        }
    }
}

pub fn length(value: &Value) -> Result<usize, MinnowError> {
    let mut count = 0;
    let mut cursor = value;
    loop {
        match cursor {
            Value::Nil => return Ok(count),
            Value::Pair(cell) => {
                count += 1;
                cursor = &cell.cdr;
            }
            _ => return Err(MinnowError::EvaluationError),
        }
    }
}

/// Zero-based indexed access. Out-of-range indexing and non-list values
/// are evaluation errors; a bare cons cell still answers for index 0.
pub fn element_at(value: &Value, index: usize) -> EvaluationResult {
    let mut remaining = index;
    let mut cursor = value;
    loop {
        match cursor {
            Value::Pair(cell) if remaining == 0 => return Ok(cell.car.clone()),
            Value::Pair(cell) => {
                remaining -= 1;
                cursor = &cell.cdr;
            }
            _ => return Err(MinnowError::EvaluationError),
        }
    }
}

pub fn is_list(value: &Value) -> bool {
    let mut cursor = value;
    loop {
        match cursor {
            Value::Nil => return true,
            Value::Pair(cell) => cursor = &cell.cdr,
            _ => return false,
        }
    }
}

/// Copies the spine of a list into fresh pair nodes; element values are
/// shared, not cloned structurally.
pub fn copy(value: &Value) -> EvaluationResult {
    Ok(list_from(elements(value)?))
}

/// Concatenates proper lists into a new list. No input list is modified:
/// even a single argument comes back as a copy.
pub fn concat(lists: &[Value]) -> EvaluationResult {
    match lists {
        [] => Ok(Value::Nil),
        [list] => copy(list),
        _ => {
            let mut combined = Vec::new();
            for list in lists {
                combined.extend(elements(list)?);
            }
            Ok(list_from(combined))
        }
    }
}

pub fn map(function: &Function, list: &Value, envs: &mut Environments) -> EvaluationResult {
    let mut mapped = Vec::new();
    for element in elements(list)? {
        mapped.push(function.call(vec![element], envs)?);
    }
    Ok(list_from(mapped))
}

pub fn filter(function: &Function, list: &Value, envs: &mut Environments) -> EvaluationResult {
    let mut kept = Vec::new();
    for element in elements(list)? {
        if is_truthy(&function.call(vec![element.clone()], envs)?) {
            kept.push(element);
        }
    }
    Ok(list_from(kept))
}

/// Left fold: the accumulator starts at `initial` and is threaded through
/// `function` with each element in turn. `Nil` returns `initial` unchanged.
pub fn reduce(
    function: &Function,
    list: &Value,
    initial: Value,
    envs: &mut Environments,
) -> EvaluationResult {
    let mut accumulator = initial;
    for element in elements(list)? {
        accumulator = function.call(vec![accumulator, element], envs)?;
    }
    Ok(accumulator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::Number;

    fn number(n: i64) -> Value {
        Value::Number(Number::Int(n))
    }

    fn sample_list(values: &[i64]) -> Value {
        list_from(values.iter().map(|n| number(*n)).collect())
    }

    #[test]
    fn length_of_proper_lists() {
        assert_eq!(length(&Value::Nil), Ok(0));
        assert_eq!(length(&sample_list(&[1, 2, 3])), Ok(3));
    }

    #[test]
    fn length_rejects_bare_cons_cells() {
        let cell = cons(number(1), number(2));
        assert_eq!(length(&cell), Err(MinnowError::EvaluationError));
        assert_eq!(length(&number(5)), Err(MinnowError::EvaluationError));
    }

    #[test]
    fn element_at_indexes_from_zero() {
        let list = sample_list(&[10, 20, 30]);
        assert_eq!(element_at(&list, 0), Ok(number(10)));
        assert_eq!(element_at(&list, 2), Ok(number(30)));
        assert_eq!(element_at(&list, 3), Err(MinnowError::EvaluationError));
        assert_eq!(element_at(&Value::Nil, 0), Err(MinnowError::EvaluationError));
    }

    #[test]
    fn element_at_reads_a_cons_cell_head() {
        let cell = cons(number(1), number(2));
        assert_eq!(element_at(&cell, 0), Ok(number(1)));
        assert_eq!(element_at(&cell, 1), Err(MinnowError::EvaluationError));
    }

    #[test]
    fn is_list_distinguishes_proper_lists() {
        assert!(is_list(&Value::Nil));
        assert!(is_list(&sample_list(&[1, 2])));
        assert!(!is_list(&cons(number(1), number(2))));
        assert!(!is_list(&number(1)));
    }

    #[test]
    fn copy_allocates_a_fresh_spine() {
        let original = sample_list(&[1, 2, 3]);
        let copied = copy(&original).unwrap();

        assert_eq!(original, copied);
        let (Value::Pair(a), Value::Pair(b)) = (&original, &copied) else {
            panic!("expected pairs");
        };
        assert!(!Rc::ptr_eq(a, b));
    }

    #[test]
    fn concat_combines_without_mutating_inputs() {
        let a = sample_list(&[1, 2]);
        let b = sample_list(&[3, 4]);

        let combined = concat(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(combined, sample_list(&[1, 2, 3, 4]));
        assert_eq!(a, sample_list(&[1, 2]));
        assert_eq!(b, sample_list(&[3, 4]));
    }

    #[test]
    fn concat_edge_cases() {
        assert_eq!(concat(&[]), Ok(Value::Nil));
        assert_eq!(
            concat(&[Value::Nil, sample_list(&[1]), Value::Nil]),
            Ok(sample_list(&[1]))
        );
        assert_eq!(
            concat(&[sample_list(&[1]), number(2)]),
            Err(MinnowError::EvaluationError)
        );
    }
}
