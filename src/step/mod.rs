//! `step`: dispatches on the current frame's node kind to one of the
//! per-concern steppers below and returns the resulting transition. Never
//! mutates `state` or panics on a well-formed frame; every failure path a
//! caller can hit is a [`StepError`].

mod call;
mod decl;
mod expr;
mod stmt;

use crate::ast::Node;
use crate::control::{Cont, Frame, Mode, Scratch, Seq, StepOutcome, StepOutput};
use crate::effect::Effect;
use crate::error::StepError;
use crate::memory::Memory;
use crate::scope::find_declaration;
use crate::state::State;
use crate::value::Value;
use std::rc::Rc;

/// Advances `frame` by exactly one step.
pub fn step(state: &State, frame: &Frame) -> StepOutput {
    match &*frame.node {
        Node::CompoundStmt { .. }
        | Node::DeclStmt { .. }
        | Node::ForStmt { .. }
        | Node::WhileStmt { .. }
        | Node::DoStmt { .. }
        | Node::BreakStmt
        | Node::ContinueStmt
        | Node::IfStmt { .. }
        | Node::ReturnStmt { .. } => stmt::step(state, frame),

        Node::VarDecl { .. }
        | Node::ParmVarDecl { .. }
        | Node::BuiltinType { .. }
        | Node::PointerType { .. }
        | Node::ConstantArrayType { .. }
        | Node::FunctionProtoType { .. }
        | Node::FunctionNoProtoType { .. } => decl::step(state, frame),

        Node::CallExpr { .. } => call::step(state, frame),

        Node::FunctionDecl { .. } => Err(StepError::MalformedAst),

        _ => expr::step(state, frame),
    }
}

/// Builds the transition that descends into `child`: `parent` (the frame
/// currently being stepped, already advanced to its next `step`/`scratch`)
/// becomes the child's continuation.
fn descend(child: Rc<Node>, mode: Mode, seq: Option<Seq>, parent: Frame) -> StepOutcome {
    let mut child_frame = Frame::new(child, Cont::frame(parent)).with_mode(mode);
    if let Some(seq) = seq {
        child_frame = child_frame.with_seq(seq);
    }
    StepOutcome::new(Cont::frame(child_frame))
}

/// Like [`descend`], but for nodes that are transparent to control (`paren`,
/// `if`'s branches, the ternary's chosen branch): the child's continuation
/// is `cont` directly, with no frame re-entered for the transparent node
/// once the child completes.
fn descend_transparent(child: Rc<Node>, mode: Mode, seq: Option<Seq>, cont: Cont) -> StepOutcome {
    let mut child_frame = Frame::new(child, cont).with_mode(mode);
    if let Some(seq) = seq {
        child_frame = child_frame.with_seq(seq);
    }
    StepOutcome::new(Cont::frame(child_frame))
}

/// Looks up `identifier`, turning a miss into the right [`StepError`].
fn lookup<'a>(state: &'a State, identifier: &str) -> Result<&'a crate::scope::Binding, StepError> {
    find_declaration(&state.scope, state.global_map, identifier)
        .ok_or_else(|| StepError::UnknownName(identifier.to_string()))
}

/// Finishes evaluating a `Place` binding or any other pointer-shaped lvalue
/// result (array subscript, dereference): in `LValue` mode the pointer
/// itself is the result; in `Value` mode, array-to-pointer decay happens if
/// the pointee is an array, otherwise the pointee is loaded from memory
/// (emitting a `Load` effect for observability — the read itself already
/// happened by the time this returns).
fn finalize_place(mode: Mode, pointer: Value, memory: &Memory) -> (Value, Vec<Effect>) {
    match mode {
        Mode::LValue => (pointer, Vec::new()),
        Mode::Value => {
            let pointee = pointer
                .pointee_type()
                .expect("place value must be a pointer")
                .clone();
            let addr = pointer.as_address().expect("place value must be a pointer");
            if let Some(elem) = pointee.array_element() {
                return (Value::pointer(elem.clone(), addr), Vec::new());
            }
            let loaded = memory.read_value(&pointee, addr);
            (loaded, vec![Effect::Load { at: pointer }])
        }
    }
}

/// Pulls a single [`Scratch::One`] value back out, for steppers that stash
/// exactly one intermediate result across a child evaluation.
fn take_one(scratch: &Scratch) -> Result<&crate::control::StepResult, StepError> {
    match scratch {
        Scratch::One(r) => Ok(r),
        _ => Err(StepError::MalformedAst),
    }
}

/// Walks `cont`'s ancestor chain looking for the nearest enclosing loop
/// frame (`for`/`while`/`do`), collecting a `Leave` effect for every
/// `CompoundStmt` scope passed through along the way (each one must unwind
/// before control reaches the loop). Used by `break`/`continue`, which have
/// no child of their own to descend into.
pub(crate) fn find_enclosing_loop(cont: &Cont) -> Result<(&Frame, Vec<Effect>), StepError> {
    let mut effects = Vec::new();
    let mut current = cont;
    loop {
        match current {
            Cont::Return => return Err(StepError::MalformedAst),
            Cont::Frame(frame) => {
                match &*frame.node {
                    Node::CompoundStmt { .. } => effects.push(Effect::Leave),
                    Node::ForStmt { .. } | Node::WhileStmt { .. } | Node::DoStmt { .. } => {
                        return Ok((frame, effects));
                    }
                    _ => {}
                }
                current = &frame.cont;
            }
        }
    }
}

/// Drives a pure expression/type node to completion outside a [`Driver`],
/// for unit tests that only need a result and don't care about effect
/// application (no scope mutation is needed to evaluate the node kinds these
/// tests exercise). Not meant for statements that declare bindings or branch
/// on loop/break control, which do need a real driver.
///
/// [`Driver`]: crate::driver::Driver
#[cfg(test)]
pub(crate) fn drive_to_completion(
    node: Rc<Node>,
    memory: &Memory,
    scope: Rc<crate::scope::Scope>,
    global_map: &crate::scope::GlobalMap,
) -> crate::control::StepResult {
    let mut control = Cont::frame(Frame::new(node, Cont::Return));
    let mut result = crate::control::StepResult::Void;
    loop {
        let frame = match control {
            Cont::Return => return result,
            Cont::Frame(frame) => *frame,
        };
        let state = State::new(memory, scope.clone(), global_map).with_result(result);
        let outcome = step(&state, &frame).expect("step should succeed in this test");
        result = outcome.result.unwrap_or(crate::control::StepResult::Void);
        control = outcome.control;
    }
}
