//! Host builtins: the call protocol's other callee shape, alongside user
//! `FunctionDecl`s. A builtin is just a closure matching
//! [`crate::scope::Callable::Builtin`]'s
//! signature — it gets the caller's `State` (for types) and `Cont` (the
//! frame to resume once it has a result) and returns a `StepOutput` exactly
//! like any other stepper, so from the call protocol's point of view a
//! builtin call and a user call look identical.
//!
//! This crate registers no builtins on its own; a host picks which names to
//! wire up via [`crate::driver::Driver::register_builtin`]. [`print_int`] is
//! provided as the one concrete example the end-to-end tests exercise.

use crate::control::{Cont, StepOutcome, StepOutput, StepResult};
use crate::error::StepError;
use crate::state::State;
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// A builtin taking exactly one `int` argument and appending it to `sink`,
/// returning it unchanged (so `print_int(x)` can still be used as an
/// expression, the way C's `printf` returns a count). Grounds the call
/// protocol's builtin branch in a concrete example without needing any I/O:
/// tests pass their own `sink` and assert on it directly, rather than this
/// crate assuming a real stdout is available.
///
/// `values[0]` is the callee itself (unused here); `values[1]` is the sole
/// argument, per the call protocol's `values` layout.
pub fn print_int(sink: Rc<RefCell<Vec<i64>>>) -> impl Fn(&State, Cont, &[StepResult]) -> StepOutput {
    move |_state: &State, cont: Cont, values: &[StepResult]| -> StepOutput {
        let value = match values {
            [_callee, StepResult::Value(Value::Integral(_, v))] => *v,
            _ => return Err(StepError::MalformedAst),
        };
        sink.borrow_mut().push(value);
        Ok(StepOutcome::new(cont).with_result(StepResult::Value(Value::int(value))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Memory;
    use crate::scope::{Callable, GlobalMap, Scope};

    /// A placeholder `values[0]` for tests that don't care which callee
    /// invoked the builtin, just that the argument(s) after it are right.
    fn dummy_callee() -> StepResult {
        StepResult::Callable(Callable::Builtin(Rc::new(|_: &State, cont: Cont, _: &[StepResult]| {
            Ok(StepOutcome::new(cont))
        })))
    }

    #[test]
    fn test_print_int_appends_and_echoes() {
        let sink = Rc::new(RefCell::new(Vec::new()));
        let builtin = print_int(sink.clone());
        let memory = Memory::new();
        let global_map = GlobalMap::new();
        let state = State::new(&memory, Scope::root(), &global_map);

        let outcome = builtin(&state, Cont::Return, &[dummy_callee(), StepResult::Value(Value::int(7))]).unwrap();

        assert_eq!(*sink.borrow(), vec![7]);
        assert_eq!(outcome.result, Some(StepResult::Value(Value::int(7))));
        assert_eq!(outcome.control, Cont::Return);
    }

    #[test]
    fn test_print_int_rejects_wrong_arity() {
        let sink = Rc::new(RefCell::new(Vec::new()));
        let builtin = print_int(sink);
        let memory = Memory::new();
        let global_map = GlobalMap::new();
        let state = State::new(&memory, Scope::root(), &global_map);

        let err = builtin(&state, Cont::Return, &[dummy_callee()]).unwrap_err();
        assert_eq!(err, StepError::MalformedAst);
    }
}
