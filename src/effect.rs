//! The effect protocol: the only way the stepper describes mutation to its
//! driver. `step` never mutates memory or scope
//! itself (the `store`/`vardecl` variants describe a write for the driver to
//! perform); `load` is emitted purely for the driver's observability even
//! though the reference stepper reads memory directly to compute its result.

use crate::control::{Cont, StepResult};
use crate::value::{Type, Value};

/// One effect a driver must apply before resuming the stepper, in the order
/// they appear in a `StepOutcome`.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// A new scope is being pushed (block or function entry).
    Enter { function_boundary: bool },
    /// The current scope is being popped.
    Leave,
    /// A local is being declared, with an optional initial value.
    VarDecl { name: String, var_type: Type, init: Option<Value> },
    /// A read occurred at `value`'s address, observable only — the stepper
    /// already has the loaded value in hand.
    Load { at: Value },
    /// A write of `value` must occur at `at`'s address.
    Store { at: Value, value: Value },
    /// A function call is being entered: `values[0]` is the callee, the
    /// rest are the argument values, matching the stepper's own `values`
    /// layout for a `CallExpr`. `return_to` is the continuation to resume
    /// with the call's result once the callee unwinds to `Cont::Return`.
    Call { values: Vec<StepResult>, return_to: Cont },
}
