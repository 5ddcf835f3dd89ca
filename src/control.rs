//! The control descriptor and the types it's built from: the step tag, the
//! lvalue/value mode, the sequence-point tag, and the per-kind scratch slots.
//! An open-ended descriptor record that piggybacked `lhs`/`lvalue`/`values`/
//! `type`/… fields directly would work too, but a tagged `Scratch` union
//! keeps each node kind's scratch data exhaustively checked; the step tags
//! (otherwise a loose mix of small integers and ad hoc markers) become one
//! closed `Step` enum, and the "return" sentinel becomes a real
//! `Cont::Return` variant instead of a magic value.

use crate::ast::Node;
use crate::effect::Effect;
use crate::error::StepError;
use crate::scope::Callable;
use crate::value::{Type, Value};
use std::rc::Rc;

/// Unifies the source's small numeric step tags and its heterogeneous `'F'`/
/// `'R'` call-protocol tags into one enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    N(u32),
    /// Call protocol: parameter types resolved, ready to open the frame.
    CallSetup,
    /// Call protocol: callee has returned, forward the value.
    CallReturn,
}

impl Step {
    pub fn next(self) -> Step {
        match self {
            Step::N(n) => Step::N(n + 1),
            other => other,
        }
    }
}

/// Whether an expression is being evaluated to produce an address-bearing
/// reference (`LValue`) or a value (`Value`). Defaults to `Value`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Value,
    LValue,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Value
    }
}

/// A sequence-point tag: marks a driver-observable boundary matching C's
/// sequence-point rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Seq {
    Expr,
    Stmt,
}

/// The result of completing one descriptor: either nothing (statements),
/// a value (expressions), a type (type nodes), a named parameter (
/// `ParmVarDecl`), or a callable reference (a function/builtin name
/// evaluated in value mode).
#[derive(Clone, Debug, PartialEq)]
pub enum StepResult {
    Void,
    Value(Value),
    Type(Type),
    Param(String, Type),
    Callable(Callable),
}

impl StepResult {
    pub fn into_value(self) -> Option<Value> {
        match self {
            StepResult::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_type(self) -> Option<Type> {
        match self {
            StepResult::Type(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            StepResult::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Per-kind scratch, retained on a `Frame` across an intervening child
/// evaluation (which otherwise would overwrite `State::result`). Most node
/// kinds never need more than zero or one retained result; `Values`/`Params`
/// exist for the two steppers that accumulate a growing list (`CallExpr`'s
/// argument values, `FunctionProtoType`'s parameter list).
#[derive(Clone, Debug, PartialEq)]
pub enum Scratch {
    None,
    One(StepResult),
    Two(StepResult, StepResult),
    Values(Vec<StepResult>),
    Params(Type, Vec<(String, Type)>),
    /// `CallExpr`'s handoff from "all arguments collected" to "parameter
    /// types resolved": the callee (kept around so the eventual
    /// `Effect::Call` can carry `values[0]` per spec), the already-evaluated
    /// argument values, the callee's parameter names (read directly off its
    /// prototype AST, which isn't itself stepped), and the function body to
    /// enter.
    Call(Callable, Vec<Value>, Vec<String>, Rc<Node>),
}

/// One frame of the control chain: the node being stepped, which sub-step
/// it's at, its parent continuation, evaluation mode, sequence-point tag, an
/// optional loop-frame `break` target, and kind-specific scratch.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub node: Rc<Node>,
    pub step: Step,
    pub cont: Cont,
    pub mode: Mode,
    pub seq: Option<Seq>,
    /// Present only on loop frames: the step this loop should resume at when
    /// a nested `continue` targets it. `break` never needs a dedicated
    /// field — it resumes at `cont`, the step past the loop entirely.
    pub continue_target: Option<Step>,
    pub scratch: Scratch,
}

impl Frame {
    pub fn new(node: Rc<Node>, cont: Cont) -> Self {
        Frame {
            node,
            step: Step::N(0),
            cont,
            mode: Mode::Value,
            seq: None,
            continue_target: None,
            scratch: Scratch::None,
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_seq(mut self, seq: Seq) -> Self {
        self.seq = Some(seq);
        self
    }

    pub fn with_step(mut self, step: Step) -> Self {
        self.step = step;
        self
    }

    pub fn with_scratch(mut self, scratch: Scratch) -> Self {
        self.scratch = scratch;
        self
    }

    pub fn with_continue_target(mut self, target: Step) -> Self {
        self.continue_target = Some(target);
        self
    }
}

/// The continuation chain. `Return` is the sentinel that signals the driver
/// to unwind one function frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Cont {
    Return,
    Frame(Box<Frame>),
}

impl Cont {
    pub fn frame(frame: Frame) -> Self {
        Cont::Frame(Box::new(frame))
    }
}

/// The outcome of one `step` call: a replacement control, an optional
/// result to be placed into `State::result` by the driver, and an ordered
/// list of effects for the driver to apply before the next step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    pub control: Cont,
    pub result: Option<StepResult>,
    pub effects: Vec<Effect>,
}

impl StepOutcome {
    pub fn new(control: Cont) -> Self {
        StepOutcome { control, result: None, effects: Vec::new() }
    }

    pub fn with_result(mut self, result: StepResult) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: Vec<Effect>) -> Self {
        self.effects = effects;
        self
    }
}

/// `step`'s return type: a transition, or one of the two non-delegated error
/// classes (structural/semantic).
pub type StepOutput = Result<StepOutcome, StepError>;
