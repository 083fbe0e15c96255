use std::path::PathBuf;

use anyhow::bail;
use itertools::Itertools;
use serde::Deserialize;

use crate::error::MinnowError;
use crate::interpreter::Value;

/// One expected value from a fixture file. `Anything` (a bare string)
/// matches every successful result; it stands in for values like
/// functions that have no useful JSON rendering.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Expected {
    Bool(bool),
    Number(f64),
    List(Vec<Expected>),
    Anything(String),
}

impl Expected {
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Anything(_), _) => true,
            (Self::Bool(expected), Value::Boolean(actual)) => expected == actual,
            (Self::Number(expected), Value::Number(actual)) => {
                (expected - actual.as_f64()).abs() < 1.0e-6
            }
            (Self::List(expected), actual) => match list_elements(actual) {
                Some(elements) => {
                    expected.len() == elements.len()
                        && expected
                            .iter()
                            .zip(elements.iter())
                            .all(|(e, v)| e.matches(v))
                }
                None => false,
            },
            _ => false,
        }
    }
}

/// Either `{"output": ...}` or `{"error": "NameError"}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExpectedResult {
    Ok { output: Expected },
    Err { error: String },
}

impl ExpectedResult {
    pub fn matches(&self, result: &Result<Value, MinnowError>) -> bool {
        match (self, result) {
            (Self::Ok { output }, Ok(value)) => output.matches(value),
            (Self::Err { error }, Err(actual)) => error == &actual.to_string(),
            _ => false,
        }
    }
}

fn list_elements(value: &Value) -> Option<Vec<Value>> {
    let mut out = Vec::new();
    let mut cursor = value;
    loop {
        match cursor {
            Value::Nil => return Some(out),
            Value::Pair(cell) => {
                out.push(cell.car.clone());
                cursor = &cell.cdr;
            }
            _ => return None,
        }
    }
}

/// Loads a fixture pair: a line-per-form program from `test_inputs` and
/// the aligned JSON expectations from `test_outputs`.
pub fn load_fixture(name: &str) -> anyhow::Result<Vec<(String, ExpectedResult)>> {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    let inputs = std::fs::read_to_string(base.join("test_inputs").join(format!("{}.mnw", name)))?;
    let inputs = inputs
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_owned)
        .collect_vec();

    let outputs = std::fs::read_to_string(base.join("test_outputs").join(format!("{}.json", name)))?;
    let expected: Vec<ExpectedResult> = serde_json::from_str(&outputs)?;

    if inputs.len() != expected.len() {
        bail!(
            "fixture {}: {} inputs but {} expectations",
            name,
            inputs.len(),
            expected.len()
        );
    }
    Ok(inputs.into_iter().zip(expected).collect())
}

pub fn fixture_names() -> impl Iterator<Item = &'static str> {
    ["arithmetic", "closures", "lists", "errors"].into_iter()
}
