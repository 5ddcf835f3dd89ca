//! Scope chain and declaration lookup.

use crate::ast::Node;
use crate::control::{Cont, StepOutput, StepResult};
use crate::state::State;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A name bound to a function definition or a host builtin. Neither is
/// addressable or part of the value algebra proper; they only ever appear
/// as the callee slot of a `CallExpr`.
#[derive(Clone)]
pub enum Callable {
    Function(Rc<Node>),
    /// Invoked with the full `values` array from the call protocol,
    /// `values[0]` being the callee itself, per spec.md §4.4.
    Builtin(Rc<dyn Fn(&State, Cont, &[StepResult]) -> StepOutput>),
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Function(node) => f.debug_tuple("Function").field(&Rc::as_ptr(node)).finish(),
            Callable::Builtin(b) => f.debug_tuple("Builtin").field(&Rc::as_ptr(b)).finish(),
        }
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Callable::Function(a), Callable::Function(b)) => Rc::ptr_eq(a, b),
            (Callable::Builtin(a), Callable::Builtin(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// What a name resolves to. A `Place` is addressable (its pointer can be
/// used as an lvalue); a `Value` binding and a `Callable` binding are not.
#[derive(Clone, Debug, PartialEq)]
pub enum Binding {
    Place(Value),
    Value(Value),
    Callable(Callable),
}

impl Binding {
    /// Whether this binding can be used as an lvalue.
    pub fn is_addressable(&self) -> bool {
        matches!(self, Binding::Place(_))
    }
}

/// A single link in the scope chain. `is_function_boundary` marks the frame
/// past which `find_declaration` does not look for local bindings — it
/// stops at the first function scope before falling back to the global map.
#[derive(Debug)]
pub struct Scope {
    bindings: HashMap<String, Binding>,
    pub is_function_boundary: bool,
    pub parent: Option<Rc<Scope>>,
}

impl Scope {
    pub fn root() -> Rc<Scope> {
        Rc::new(Scope {
            bindings: HashMap::new(),
            is_function_boundary: false,
            parent: None,
        })
    }

    /// Pushes a new block scope on top of `parent`.
    pub fn push_block(parent: Rc<Scope>) -> Rc<Scope> {
        Rc::new(Scope {
            bindings: HashMap::new(),
            is_function_boundary: false,
            parent: Some(parent),
        })
    }

    /// Pushes a new function-boundary scope on top of `parent`, as applying
    /// a `call` effect does.
    pub fn push_function(parent: Rc<Scope>) -> Rc<Scope> {
        Rc::new(Scope {
            bindings: HashMap::new(),
            is_function_boundary: true,
            parent: Some(parent),
        })
    }

    /// Binds `name` in this scope. Since `Scope` is otherwise immutable once
    /// shared via `Rc`, callers (the driver, applying a `vardecl` effect)
    /// must hold the only strong reference when calling this.
    pub fn bind(self: &mut Rc<Scope>, name: String, binding: Binding) {
        Rc::get_mut(self)
            .expect("scope must be uniquely owned when binding")
            .bindings
            .insert(name, binding);
    }

    fn lookup_local(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }
}

/// The flat, process-wide fallback consulted once the scope chain is
/// exhausted.
#[derive(Debug, Default)]
pub struct GlobalMap {
    bindings: HashMap<String, Binding>,
}

impl GlobalMap {
    pub fn new() -> Self {
        Self { bindings: HashMap::new() }
    }

    pub fn bind(&mut self, name: impl Into<String>, binding: Binding) {
        self.bindings.insert(name.into(), binding);
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }
}

/// Walks `scope` toward the root, stopping at (and including) the first
/// function-boundary scope, then falls back to `global_map`.
pub fn find_declaration<'a>(
    scope: &'a Scope,
    global_map: &'a GlobalMap,
    name: &str,
) -> Option<&'a Binding> {
    let mut current = scope;
    loop {
        if let Some(binding) = current.lookup_local(name) {
            return Some(binding);
        }
        if current.is_function_boundary {
            break;
        }
        match &current.parent {
            Some(parent) => current = parent,
            None => break,
        }
    }
    global_map.get(name)
}
