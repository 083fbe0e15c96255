use std::collections::HashMap;

use crate::error::MinnowError;
use crate::interpreter::Value;

/// Handle to one environment frame in an [`Environments`] arena.
///
/// Closures store this handle rather than a reference, so a captured frame
/// stays addressable for the closure's whole lifetime and mutation through
/// any holder is visible to every other holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvId(usize);

/// One level of the scope chain: a binding map plus a link to the
/// enclosing frame.
#[derive(Debug)]
struct Frame {
    bindings: HashMap<String, Value>,
    parent: Option<EnvId>,
}

/// Append-only arena of environment frames.
///
/// Frames are never freed within a session; children are only created from
/// ids already in the arena, so no frame can be its own ancestor.
#[derive(Debug, Default)]
pub struct Environments {
    frames: Vec<Frame>,
}

impl Environments {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Allocates a parentless frame with the given initial bindings.
    pub fn root(&mut self, bindings: HashMap<String, Value>) -> EnvId {
        self.push(Frame { bindings, parent: None })
    }

    /// Allocates an empty frame chained onto `parent`.
    pub fn child(&mut self, parent: EnvId) -> EnvId {
        self.push(Frame {
            bindings: HashMap::new(),
            parent: Some(parent),
        })
    }

    fn push(&mut self, frame: Frame) -> EnvId {
        let id = EnvId(self.frames.len());
        self.frames.push(frame);
        id
    }

    /// Inserts or overwrites a binding in `env` itself, never a parent.
    pub fn define(&mut self, env: EnvId, name: &str, value: Value) {
        self.frames[env.0].bindings.insert(name.to_owned(), value);
    }

    /// Walks the parent chain until the name is found.
    pub fn lookup(&self, env: EnvId, name: &str) -> Result<Value, MinnowError> {
        let mut current = Some(env);
        while let Some(id) = current {
            let frame = &self.frames[id.0];
            if let Some(value) = frame.bindings.get(name) {
                return Ok(value.clone());
            }
            current = frame.parent;
        }
        Err(MinnowError::NameError)
    }

    /// Mutates the nearest enclosing frame that already defines `name`.
    /// Never creates a binding.
    pub fn assign(&mut self, env: EnvId, name: &str, value: Value) -> Result<Value, MinnowError> {
        let mut current = Some(env);
        while let Some(id) = current {
            if self.frames[id.0].bindings.contains_key(name) {
                self.frames[id.0].bindings.insert(name.to_owned(), value.clone());
                return Ok(value);
            }
            current = self.frames[id.0].parent;
        }
        Err(MinnowError::NameError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::Number;

    fn number(n: i64) -> Value {
        Value::Number(Number::Int(n))
    }

    #[test]
    fn lookup_walks_parent_chain() {
        let mut envs = Environments::new();
        let root = envs.root(HashMap::new());
        envs.define(root, "x", number(1));
        let child = envs.child(root);
        let grandchild = envs.child(child);

        assert_eq!(envs.lookup(grandchild, "x"), Ok(number(1)));
        assert_eq!(envs.lookup(grandchild, "y"), Err(MinnowError::NameError));
    }

    #[test]
    fn child_binding_shadows_parent() {
        let mut envs = Environments::new();
        let root = envs.root(HashMap::new());
        envs.define(root, "x", number(1));
        let child = envs.child(root);
        envs.define(child, "x", number(2));

        assert_eq!(envs.lookup(child, "x"), Ok(number(2)));
        assert_eq!(envs.lookup(root, "x"), Ok(number(1)));
    }

    #[test]
    fn assign_mutates_nearest_defining_frame() {
        let mut envs = Environments::new();
        let root = envs.root(HashMap::new());
        envs.define(root, "counter", number(0));
        let child = envs.child(root);

        envs.assign(child, "counter", number(5)).unwrap();
        // Mutated in the root frame, not bound anew in the child.
        assert_eq!(envs.lookup(root, "counter"), Ok(number(5)));
    }

    #[test]
    fn assign_fails_without_existing_binding() {
        let mut envs = Environments::new();
        let root = envs.root(HashMap::new());
        let child = envs.child(root);

        assert_eq!(
            envs.assign(child, "missing", number(1)),
            Err(MinnowError::NameError)
        );
        assert_eq!(envs.lookup(child, "missing"), Err(MinnowError::NameError));
    }
}
