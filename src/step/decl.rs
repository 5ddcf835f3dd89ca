//! Declaration and type-node steppers: `VarDecl`, `ParmVarDecl`, and the
//! four type node kinds (`BuiltinType`, `PointerType`, `ConstantArrayType`,
//! `FunctionProtoType`/`FunctionNoProtoType`). Type nodes "evaluate" to a
//! [`crate::value::Type`] through the same generic step machinery expression
//! nodes use, rather than through a separate code path.

use super::descend;
use crate::ast::Node;
use crate::control::{Frame, Mode, Scratch, Seq, Step, StepOutcome, StepOutput, StepResult};
use crate::effect::Effect;
use crate::error::StepError;
use crate::state::State;
use crate::value::{lookup_scalar_type, Type};
use std::rc::Rc;

pub fn step(state: &State, frame: &Frame) -> StepOutput {
    match &*frame.node {
        Node::VarDecl { name, var_type, init } => var_decl(state, frame, name, var_type, init),
        Node::ParmVarDecl { name, var_type } => parm_var_decl(state, frame, name, var_type),
        Node::BuiltinType { name } => builtin_type(frame, name),
        Node::PointerType { pointee } => pointer_type(state, frame, pointee),
        Node::ConstantArrayType { elem, count } => constant_array_type(state, frame, elem, count),
        Node::FunctionProtoType { result, params } => function_proto_type(state, frame, result, params),
        Node::FunctionNoProtoType { result } => function_no_proto_type(state, frame, result),
        _ => unreachable!("decl::step dispatched on a non-declaration node"),
    }
}

fn var_decl(
    state: &State,
    frame: &Frame,
    name: &str,
    var_type: &Rc<Node>,
    init: &Option<Rc<Node>>,
) -> StepOutput {
    match frame.step {
        Step::N(0) => {
            let parent = frame.clone().with_step(Step::N(1));
            Ok(descend(var_type.clone(), Mode::Value, None, parent))
        }
        Step::N(1) => {
            let ty = state.result.clone().into_type().ok_or(StepError::MalformedAst)?;
            match init {
                Some(init) => {
                    let parent = frame
                        .clone()
                        .with_step(Step::N(2))
                        .with_scratch(Scratch::One(StepResult::Type(ty)));
                    Ok(descend(init.clone(), Mode::Value, Some(Seq::Expr), parent))
                }
                None => Ok(StepOutcome::new(frame.cont.clone())
                    .with_result(StepResult::Void)
                    .with_effect(Effect::VarDecl { name: name.to_string(), var_type: ty, init: None })),
            }
        }
        Step::N(2) => {
            let ty = match &frame.scratch {
                Scratch::One(StepResult::Type(t)) => t.clone(),
                _ => return Err(StepError::MalformedAst),
            };
            let value = state.result.clone().into_value().ok_or(StepError::MalformedAst)?;
            Ok(StepOutcome::new(frame.cont.clone())
                .with_result(StepResult::Void)
                .with_effect(Effect::VarDecl { name: name.to_string(), var_type: ty, init: Some(value) }))
        }
        _ => Err(StepError::MalformedAst),
    }
}

fn parm_var_decl(state: &State, frame: &Frame, name: &str, var_type: &Rc<Node>) -> StepOutput {
    match frame.step {
        Step::N(0) => {
            let parent = frame.clone().with_step(Step::N(1));
            Ok(descend(var_type.clone(), Mode::Value, None, parent))
        }
        Step::N(1) => {
            let ty = state.result.clone().into_type().ok_or(StepError::MalformedAst)?;
            Ok(StepOutcome::new(frame.cont.clone()).with_result(StepResult::Param(name.to_string(), ty)))
        }
        _ => Err(StepError::MalformedAst),
    }
}

fn builtin_type(frame: &Frame, name: &str) -> StepOutput {
    let scalar = lookup_scalar_type(name).ok_or(StepError::MalformedAst)?;
    Ok(StepOutcome::new(frame.cont.clone()).with_result(StepResult::Type(Type::Scalar(scalar))))
}

fn pointer_type(state: &State, frame: &Frame, pointee: &Rc<Node>) -> StepOutput {
    match frame.step {
        Step::N(0) => {
            let parent = frame.clone().with_step(Step::N(1));
            Ok(descend(pointee.clone(), Mode::Value, None, parent))
        }
        Step::N(1) => {
            let inner = state.result.clone().into_type().ok_or(StepError::MalformedAst)?;
            Ok(StepOutcome::new(frame.cont.clone()).with_result(StepResult::Type(Type::pointer(inner))))
        }
        _ => Err(StepError::MalformedAst),
    }
}

fn constant_array_type(state: &State, frame: &Frame, elem: &Rc<Node>, count: &Rc<Node>) -> StepOutput {
    match frame.step {
        Step::N(0) => {
            let parent = frame.clone().with_step(Step::N(1));
            Ok(descend(elem.clone(), Mode::Value, None, parent))
        }
        Step::N(1) => {
            let elem_ty = state.result.clone().into_type().ok_or(StepError::MalformedAst)?;
            let parent = frame
                .clone()
                .with_step(Step::N(2))
                .with_scratch(Scratch::One(StepResult::Type(elem_ty)));
            Ok(descend(count.clone(), Mode::Value, Some(Seq::Expr), parent))
        }
        Step::N(2) => {
            let elem_ty = match &frame.scratch {
                Scratch::One(StepResult::Type(t)) => t.clone(),
                _ => return Err(StepError::MalformedAst),
            };
            let count_value = state.result.as_value().ok_or(StepError::MalformedAst)?;
            let count = match count_value {
                crate::value::Value::Integral(_, v) => *v as usize,
                _ => return Err(StepError::MalformedAst),
            };
            Ok(StepOutcome::new(frame.cont.clone())
                .with_result(StepResult::Type(Type::constant_array(elem_ty, count))))
        }
        _ => Err(StepError::MalformedAst),
    }
}

fn function_proto_type(
    state: &State,
    frame: &Frame,
    result: &Rc<Node>,
    params: &[Rc<Node>],
) -> StepOutput {
    match frame.step {
        Step::N(0) => {
            let parent = frame.clone().with_step(Step::N(1));
            Ok(descend(result.clone(), Mode::Value, None, parent))
        }
        Step::N(1) => {
            let result_ty = state.result.clone().into_type().ok_or(StepError::MalformedAst)?;
            if params.is_empty() {
                return Ok(StepOutcome::new(frame.cont.clone())
                    .with_result(StepResult::Type(Type::function(result_ty, Vec::new()))));
            }
            let parent = frame
                .clone()
                .with_step(Step::N(2))
                .with_scratch(Scratch::Params(result_ty, Vec::new()));
            Ok(descend(params[0].clone(), Mode::Value, None, parent))
        }
        Step::N(j) if j >= 2 => {
            let (result_ty, mut collected) = match &frame.scratch {
                Scratch::Params(t, c) => (t.clone(), c.clone()),
                _ => return Err(StepError::MalformedAst),
            };
            match state.result.clone() {
                StepResult::Param(name, ty) => collected.push((name, ty)),
                _ => return Err(StepError::MalformedAst),
            }
            let next_index = collected.len();
            if next_index < params.len() {
                let parent = frame
                    .clone()
                    .with_step(Step::N(j + 1))
                    .with_scratch(Scratch::Params(result_ty, collected));
                Ok(descend(params[next_index].clone(), Mode::Value, None, parent))
            } else {
                let param_types = collected.into_iter().map(|(_, t)| t).collect();
                Ok(StepOutcome::new(frame.cont.clone())
                    .with_result(StepResult::Type(Type::function(result_ty, param_types))))
            }
        }
        _ => Err(StepError::MalformedAst),
    }
}

fn function_no_proto_type(state: &State, frame: &Frame, result: &Rc<Node>) -> StepOutput {
    match frame.step {
        Step::N(0) => {
            let parent = frame.clone().with_step(Step::N(1));
            Ok(descend(result.clone(), Mode::Value, None, parent))
        }
        Step::N(1) => {
            let result_ty = state.result.clone().into_type().ok_or(StepError::MalformedAst)?;
            Ok(StepOutcome::new(frame.cont.clone())
                .with_result(StepResult::Type(Type::function(result_ty, Vec::new()))))
        }
        _ => Err(StepError::MalformedAst),
    }
}
