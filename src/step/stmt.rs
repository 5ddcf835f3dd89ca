//! Statement steppers: compound blocks, declarations-as-statements, the
//! three loop forms, `break`/`continue`, `if`, and `return`.
//!
//! Loop `continue` targets deserve a note (flagged for careful handling
//! during the transform): naively "resume this loop frame's current step"
//! is right for `for`/`while`, whose condition re-check step is reached
//! before the body ever runs — but wrong for `do`/`while`, which runs the
//! body *first*. Each loop stepper below fixes its `continue_target` to the
//! condition-check step explicitly, rather than relying on whatever step
//! happens to be current when the body is entered, so `do`/`while`'s
//! `continue` correctly lands on the condition instead of re-running the
//! body unconditionally.

use super::{descend, descend_transparent, find_enclosing_loop};
use crate::ast::Node;
use crate::control::{Cont, Frame, Mode, Seq, Step, StepOutcome, StepOutput, StepResult};
use crate::effect::Effect;
use crate::error::StepError;
use crate::state::State;

pub fn step(state: &State, frame: &Frame) -> StepOutput {
    match &*frame.node {
        Node::CompoundStmt { children } => compound(frame, children),
        Node::DeclStmt { decls } => decl_stmt(frame, decls),
        Node::ForStmt { init, cond, update, body } => for_stmt(state, frame, init, cond, update, body),
        Node::WhileStmt { cond, body } => while_stmt(state, frame, cond, body),
        Node::DoStmt { body, cond } => do_stmt(state, frame, body, cond),
        Node::BreakStmt => break_stmt(frame),
        Node::ContinueStmt => continue_stmt(frame),
        Node::IfStmt { cond, then_branch, else_branch } => if_stmt(state, frame, cond, then_branch, else_branch),
        Node::ReturnStmt { expr } => return_stmt(state, frame, expr),
        _ => unreachable!("stmt::step dispatched on a non-statement node"),
    }
}

fn n(step: Step) -> Result<u32, StepError> {
    match step {
        Step::N(i) => Ok(i),
        _ => Err(StepError::MalformedAst),
    }
}

fn compound(frame: &Frame, children: &[std::rc::Rc<Node>]) -> StepOutput {
    let i = n(frame.step)? as usize;
    if i == 0 && children.is_empty() {
        return Ok(StepOutcome::new(frame.cont.clone())
            .with_result(StepResult::Void)
            .with_effects(vec![Effect::Enter { function_boundary: false }, Effect::Leave]));
    }
    if i < children.len() {
        let parent = frame.clone().with_step(Step::N(i as u32 + 1));
        let mut outcome = descend(children[i].clone(), Mode::Value, Some(Seq::Stmt), parent);
        if i == 0 {
            outcome.effects.insert(0, Effect::Enter { function_boundary: false });
        }
        return Ok(outcome);
    }
    Ok(StepOutcome::new(frame.cont.clone())
        .with_result(StepResult::Void)
        .with_effect(Effect::Leave))
}

fn decl_stmt(frame: &Frame, decls: &[std::rc::Rc<Node>]) -> StepOutput {
    let i = n(frame.step)? as usize;
    if i < decls.len() {
        let parent = frame.clone().with_step(Step::N(i as u32 + 1));
        // No explicit sequence tag here: each VarDecl's own initializer
        // carries its own expression sequencing.
        return Ok(descend(decls[i].clone(), Mode::Value, None, parent));
    }
    Ok(StepOutcome::new(frame.cont.clone()).with_result(StepResult::Void))
}

fn for_stmt(
    state: &State,
    frame: &Frame,
    init: &std::rc::Rc<Node>,
    cond: &std::rc::Rc<Node>,
    update: &std::rc::Rc<Node>,
    body: &std::rc::Rc<Node>,
) -> StepOutput {
    match frame.step {
        Step::N(0) => {
            // continue resumes at the update step (3): a nested `continue`
            // still has to run the update expression before re-testing cond.
            let parent = frame
                .clone()
                .with_step(Step::N(1))
                .with_continue_target(Step::N(3));
            let mut outcome = descend(init.clone(), Mode::Value, Some(Seq::Stmt), parent);
            outcome.effects.push(Effect::Enter { function_boundary: false });
            Ok(outcome)
        }
        Step::N(1) => {
            let parent = frame.clone().with_step(Step::N(2));
            Ok(descend(cond.clone(), Mode::Value, Some(Seq::Expr), parent))
        }
        Step::N(2) => {
            let truthy = state.result.as_value().expect("for condition must be a value").to_bool();
            if truthy {
                let parent = frame.clone().with_step(Step::N(3));
                Ok(descend(body.clone(), Mode::Value, Some(Seq::Stmt), parent))
            } else {
                Ok(StepOutcome::new(frame.cont.clone())
                    .with_result(StepResult::Void)
                    .with_effect(Effect::Leave))
            }
        }
        Step::N(3) => {
            let parent = frame.clone().with_step(Step::N(1));
            Ok(descend(update.clone(), Mode::Value, Some(Seq::Expr), parent))
        }
        _ => Err(StepError::MalformedAst),
    }
}

fn while_stmt(state: &State, frame: &Frame, cond: &std::rc::Rc<Node>, body: &std::rc::Rc<Node>) -> StepOutput {
    match frame.step {
        Step::N(0) => {
            let parent = frame
                .clone()
                .with_step(Step::N(1))
                .with_continue_target(Step::N(0));
            Ok(descend(cond.clone(), Mode::Value, Some(Seq::Expr), parent))
        }
        Step::N(1) => {
            let truthy = state.result.as_value().expect("while condition must be a value").to_bool();
            if truthy {
                let parent = frame.clone().with_step(Step::N(0));
                Ok(descend(body.clone(), Mode::Value, Some(Seq::Stmt), parent))
            } else {
                Ok(StepOutcome::new(frame.cont.clone()).with_result(StepResult::Void))
            }
        }
        _ => Err(StepError::MalformedAst),
    }
}

fn do_stmt(state: &State, frame: &Frame, body: &std::rc::Rc<Node>, cond: &std::rc::Rc<Node>) -> StepOutput {
    match frame.step {
        Step::N(0) => {
            // The documented fix: continue targets the cond-check step (1),
            // not "whatever step is current" (which would be the body step).
            let parent = frame
                .clone()
                .with_step(Step::N(1))
                .with_continue_target(Step::N(1));
            Ok(descend(body.clone(), Mode::Value, Some(Seq::Stmt), parent))
        }
        Step::N(1) => {
            let parent = frame.clone().with_step(Step::N(2));
            Ok(descend(cond.clone(), Mode::Value, Some(Seq::Expr), parent))
        }
        Step::N(2) => {
            let truthy = state.result.as_value().expect("do/while condition must be a value").to_bool();
            if truthy {
                let parent = frame.clone().with_step(Step::N(1));
                Ok(descend(body.clone(), Mode::Value, Some(Seq::Stmt), parent))
            } else {
                Ok(StepOutcome::new(frame.cont.clone()).with_result(StepResult::Void))
            }
        }
        _ => Err(StepError::MalformedAst),
    }
}

fn break_stmt(frame: &Frame) -> StepOutput {
    let (loop_frame, mut effects) = find_enclosing_loop(&frame.cont)?;
    if matches!(&*loop_frame.node, Node::ForStmt { .. }) {
        // `for` owns a scope of its own (for its init-declared variable)
        // that nothing inside the walk above accounts for.
        effects.push(Effect::Leave);
    }
    Ok(StepOutcome::new(loop_frame.cont.clone())
        .with_result(StepResult::Void)
        .with_effects(effects))
}

fn continue_stmt(frame: &Frame) -> StepOutput {
    let (loop_frame, effects) = find_enclosing_loop(&frame.cont)?;
    let target = loop_frame.continue_target.ok_or(StepError::MalformedAst)?;
    let resumed = loop_frame.clone().with_step(target);
    Ok(StepOutcome::new(Cont::frame(resumed))
        .with_result(StepResult::Void)
        .with_effects(effects))
}

fn if_stmt(
    state: &State,
    frame: &Frame,
    cond: &std::rc::Rc<Node>,
    then_branch: &std::rc::Rc<Node>,
    else_branch: &Option<std::rc::Rc<Node>>,
) -> StepOutput {
    match frame.step {
        Step::N(0) => {
            let parent = frame.clone().with_step(Step::N(1));
            Ok(descend(cond.clone(), Mode::Value, Some(Seq::Expr), parent))
        }
        Step::N(1) => {
            let truthy = state.result.as_value().expect("if condition must be a value").to_bool();
            if truthy {
                Ok(descend_transparent(
                    then_branch.clone(),
                    Mode::Value,
                    Some(Seq::Stmt),
                    frame.cont.clone(),
                ))
            } else if let Some(else_branch) = else_branch {
                Ok(descend_transparent(
                    else_branch.clone(),
                    Mode::Value,
                    Some(Seq::Stmt),
                    frame.cont.clone(),
                ))
            } else {
                Ok(StepOutcome::new(frame.cont.clone()).with_result(StepResult::Void))
            }
        }
        _ => Err(StepError::MalformedAst),
    }
}

fn return_stmt(state: &State, frame: &Frame, expr: &Option<std::rc::Rc<Node>>) -> StepOutput {
    match frame.step {
        Step::N(0) => match expr {
            Some(expr) => {
                let parent = frame.clone().with_step(Step::N(1));
                Ok(descend(expr.clone(), Mode::Value, Some(Seq::Expr), parent))
            }
            None => Ok(StepOutcome::new(Cont::Return).with_result(StepResult::Void)),
        },
        Step::N(1) => Ok(StepOutcome::new(Cont::Return).with_result(state.result.clone())),
        _ => Err(StepError::MalformedAst),
    }
}
