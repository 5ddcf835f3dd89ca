//! The call protocol: argument accumulation, dispatch on the callee
//! binding, and (for a user function) a second hand-off through the
//! callee's prototype to resolve parameter types before the body opens.

use super::descend;
use crate::ast::Node;
use crate::control::{Cont, Frame, Mode, Scratch, Seq, Step, StepOutcome, StepOutput, StepResult};
use crate::effect::Effect;
use crate::error::StepError;
use crate::scope::Callable;
use crate::state::State;
use crate::value::{eval_cast, Type};
use std::rc::Rc;

pub fn step(state: &State, frame: &Frame) -> StepOutput {
    let children = match &*frame.node {
        Node::CallExpr { children } => children,
        _ => unreachable!("call::step dispatched on a non-call node"),
    };

    match frame.step {
        Step::N(i) => {
            let i = i as usize;
            let mut collected = match &frame.scratch {
                Scratch::None => Vec::new(),
                Scratch::Values(v) => v.clone(),
                _ => return Err(StepError::MalformedAst),
            };
            if i > 0 {
                collected.push(state.result.clone());
            }
            if collected.len() < children.len() {
                let next = collected.len();
                let parent = frame
                    .clone()
                    .with_step(Step::N(i as u32 + 1))
                    .with_scratch(Scratch::Values(collected));
                return Ok(descend(children[next].clone(), Mode::Value, Some(Seq::Expr), parent));
            }
            dispatch(state, frame, collected)
        }
        Step::CallSetup => call_setup(state, frame),
        Step::CallReturn => Ok(StepOutcome::new(frame.cont.clone()).with_result(state.result.clone())),
        _ => Err(StepError::MalformedAst),
    }
}

fn dispatch(state: &State, frame: &Frame, values: Vec<StepResult>) -> StepOutput {
    let callable = match &values[0] {
        StepResult::Callable(c) => c.clone(),
        _ => return Err(StepError::NotCallable),
    };
    let args: Vec<_> = values[1..]
        .iter()
        .map(|r| r.as_value().cloned().ok_or(StepError::MalformedAst))
        .collect::<Result<_, _>>()?;

    match callable {
        Callable::Function(decl) => {
            let (proto_type, body) = match &*decl {
                Node::FunctionDecl { proto_type, body, .. } => (proto_type.clone(), body.clone()),
                _ => return Err(StepError::MalformedAst),
            };
            let params: &[Rc<Node>] = match &*proto_type {
                Node::FunctionProtoType { params, .. } => params,
                Node::FunctionNoProtoType { .. } => &[],
                _ => return Err(StepError::MalformedAst),
            };
            let param_names: Vec<String> = params
                .iter()
                .map(|p| match &**p {
                    Node::ParmVarDecl { name, .. } => Ok(name.clone()),
                    _ => Err(StepError::MalformedAst),
                })
                .collect::<Result<_, _>>()?;
            if param_names.len() != args.len() {
                return Err(StepError::MalformedAst);
            }
            let parent = frame
                .clone()
                .with_step(Step::CallSetup)
                .with_scratch(Scratch::Call(Callable::Function(decl), args, param_names, body));
            Ok(descend(proto_type, Mode::Value, None, parent))
        }
        Callable::Builtin(f) => {
            // `values` is the full accumulated array, callee included at
            // index 0, per spec.md §4.4's `fn(state, control.cont, values)`.
            let values: Vec<StepResult> = std::iter::once(StepResult::Callable(callable))
                .chain(args.into_iter().map(StepResult::Value))
                .collect();
            f(state, frame.cont.clone(), &values)
        }
    }
}

fn call_setup(state: &State, frame: &Frame) -> StepOutput {
    let (callee, args, param_names, body) = match &frame.scratch {
        Scratch::Call(callee, args, names, body) => (callee.clone(), args.clone(), names.clone(), body.clone()),
        _ => return Err(StepError::MalformedAst),
    };
    let proto = state.result.clone().into_type().ok_or(StepError::MalformedAst)?;
    let param_types = match proto {
        Type::Function(_, params) => params,
        _ => return Err(StepError::MalformedAst),
    };
    if param_types.len() != args.len() {
        return Err(StepError::MalformedAst);
    }

    // The return continuation is this same descriptor, parked at `CallReturn`
    // rather than `frame.cont` directly: once the driver has unwound the
    // callee's scope and resumes here, `step` still needs one more turn (the
    // `Step::CallReturn` arm above) to actually forward `state.result` to
    // `frame.cont`.
    let return_frame = frame.clone().with_step(Step::CallReturn);
    // `values[0]` is the callee, matching the stepper's own `CallExpr`
    // `values` layout and spec.md §4.4's `('call', returnCont, values)`.
    let values: Vec<StepResult> = std::iter::once(StepResult::Callable(callee))
        .chain(args.iter().cloned().map(StepResult::Value))
        .collect();
    let mut effects = vec![
        Effect::Call { values, return_to: Cont::frame(return_frame) },
        Effect::Enter { function_boundary: true },
    ];
    for ((name, declared_type), arg) in param_names.into_iter().zip(param_types).zip(args) {
        let value = eval_cast(&declared_type, &arg)?;
        effects.push(Effect::VarDecl { name, var_type: declared_type, init: Some(value) });
    }
    let body_frame = Frame::new(body, Cont::Return);
    Ok(StepOutcome::new(Cont::frame(body_frame)).with_effects(effects))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::*;
    use crate::memory::Memory;
    use crate::scope::{Binding, Callable, GlobalMap, Scope};
    use crate::value::Value;

    /// A zero-argument call dispatches straight through to `call_setup`
    /// without ever entering the argument-accumulation loop at `Step::N(i)`
    /// for `i > 0`.
    #[test]
    fn test_call_with_no_arguments_dispatches_directly() {
        let callee = function_decl(
            "f",
            function_proto(builtin_type("int"), vec![]),
            compound(vec![return_stmt(Some(int_literal("9")))]),
        );
        let mut global_map = GlobalMap::new();
        global_map.bind("f", Binding::Callable(Callable::Function(callee)));
        let memory = Memory::new();
        let scope = Scope::root();
        let state = State::new(&memory, scope, &global_map);

        let node = call(decl_ref("f"), vec![]);
        let frame = Frame::new(node, Cont::Return);
        let outcome = step(&state, &frame).unwrap();

        // Step 0 descends into the callee expression itself first (there are
        // no arguments to accumulate); only once that resolves to a
        // `Callable` does dispatch hand off to `call_setup`.
        match outcome.control {
            Cont::Frame(f) => assert!(matches!(&*f.node, Node::DeclRefExpr { identifier } if identifier == "f")),
            Cont::Return => panic!("expected a frame descending into the callee expression"),
        }
    }

    /// A builtin callee is dispatched directly to its closure rather than
    /// going through the user-function `CallSetup` protocol.
    #[test]
    fn test_call_dispatches_builtin_directly() {
        let mut global_map = GlobalMap::new();
        global_map.bind(
            "double_it",
            Binding::Callable(Callable::Builtin(std::rc::Rc::new(|_state: &State, cont: Cont, values: &[StepResult]| {
                // values[0] is the callee itself; the sole argument is values[1].
                let v = values[1].as_value().cloned().ok_or(StepError::MalformedAst)?;
                let doubled = crate::value::eval_binary_operation(crate::value::BinaryOpcode::Add, &v, &v)?;
                Ok(StepOutcome::new(cont).with_result(StepResult::Value(doubled)))
            }))),
        );
        let memory = Memory::new();
        let scope = Scope::root();

        let node = call(decl_ref("double_it"), vec![int_literal("4")]);
        let result = super::super::drive_to_completion(node, &memory, scope, &global_map);
        assert_eq!(result.into_value().unwrap(), Value::int(8));
    }
}
