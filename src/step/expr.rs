//! Expression steppers: literals, the transparent/reference-producing forms
//! (`paren`, `sizeof`, casts, subscript, ternary), and the operator forms
//! (unary, binary, compound assignment).

use super::{descend, descend_transparent, finalize_place, lookup, take_one};
use crate::ast::{BinaryNodeOpcode, Node, UnaryNodeOpcode};
use crate::control::{Frame, Mode, Scratch, Seq, Step, StepOutcome, StepOutput, StepResult};
use crate::effect::Effect;
use crate::error::StepError;
use crate::scope::Binding;
use crate::state::State;
use crate::value::{
    eval_binary_operation, eval_cast, eval_pointer_add, eval_unary_operation, lookup_scalar_type, BinaryOpcode,
    UnaryOpcode, Value,
};
use std::rc::Rc;

pub fn step(state: &State, frame: &Frame) -> StepOutput {
    match &*frame.node {
        Node::ParenExpr { inner } => Ok(descend_transparent(inner.clone(), frame.mode, frame.seq, frame.cont.clone())),
        Node::ImplicitCastExpr { value, target_type } => implicit_cast(state, frame, value, target_type),
        Node::CStyleCastExpr { target_type, value } => c_style_cast(state, frame, target_type, value),
        Node::DeclRefExpr { identifier } => decl_ref(state, frame, identifier),
        Node::IntegerLiteral { lexeme } => integer_literal(frame, lexeme),
        Node::CharacterLiteral { lexeme } => character_literal(frame, lexeme),
        Node::FloatingLiteral { lexeme } => floating_literal(frame, lexeme),
        Node::StringLiteral { address, length } => string_literal(frame, *address, *length),
        Node::UnaryOperator { opcode, operand } => unary_operator(state, frame, *opcode, operand),
        Node::SizeofExpr { operand } => sizeof_expr(state, frame, operand),
        Node::BinaryOperator { opcode, lhs, rhs } => binary_operator(state, frame, *opcode, lhs, rhs),
        Node::CompoundAssignOperator { opcode, lhs, rhs } => compound_assign(state, frame, *opcode, lhs, rhs),
        Node::ArraySubscriptExpr { array, index } => array_subscript(state, frame, array, index),
        Node::ConditionalOperator { cond, then_branch, else_branch } => {
            conditional(state, frame, cond, then_branch, else_branch)
        }
        _ => unreachable!("expr::step dispatched on a non-expression node"),
    }
}

fn decl_ref(state: &State, frame: &Frame, identifier: &str) -> StepOutput {
    match super::lookup(state, identifier)?.clone() {
        Binding::Callable(c) => {
            if frame.mode == Mode::LValue {
                return Err(StepError::NotAddressable);
            }
            Ok(StepOutcome::new(frame.cont.clone()).with_result(StepResult::Callable(c)))
        }
        Binding::Value(v) => {
            if frame.mode == Mode::LValue {
                return Err(StepError::NotAddressable);
            }
            Ok(StepOutcome::new(frame.cont.clone()).with_result(StepResult::Value(v)))
        }
        Binding::Place(pointer) => {
            let (result, effects) = finalize_place(frame.mode, pointer, state.memory);
            Ok(StepOutcome::new(frame.cont.clone())
                .with_result(StepResult::Value(result))
                .with_effects(effects))
        }
    }
}

fn integer_literal(frame: &Frame, lexeme: &str) -> StepOutput {
    let trimmed = lexeme.trim_end_matches(|c: char| matches!(c, 'u' | 'U' | 'l' | 'L'));
    // TODO: honor the literal's suffix (u/l/ll) to pick its type; every
    // integer literal is typed `int` here regardless of suffix.
    let value = if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).unwrap_or(0)
    } else {
        trimmed.parse().unwrap_or(0)
    };
    Ok(StepOutcome::new(frame.cont.clone()).with_result(StepResult::Value(Value::int(value))))
}

fn character_literal(frame: &Frame, lexeme: &str) -> StepOutput {
    let inner = lexeme.trim_start_matches('\'').trim_end_matches('\'');
    let c = match inner {
        "\\n" => '\n',
        "\\t" => '\t',
        "\\0" => '\0',
        "\\\\" => '\\',
        "\\'" => '\'',
        _ => inner.chars().next().unwrap_or('\0'),
    };
    Ok(StepOutcome::new(frame.cont.clone()).with_result(StepResult::Value(Value::char_value(c as i64))))
}

fn floating_literal(frame: &Frame, lexeme: &str) -> StepOutput {
    let value = if let Some(stripped) = lexeme.strip_suffix('f').or_else(|| lexeme.strip_suffix('F')) {
        Value::Floating(lookup_scalar_type("float").expect("float is a builtin scalar type"), stripped.parse().unwrap_or(0.0))
    } else {
        Value::Floating(lookup_scalar_type("double").expect("double is a builtin scalar type"), lexeme.parse().unwrap_or(0.0))
    };
    Ok(StepOutcome::new(frame.cont.clone()).with_result(StepResult::Value(value)))
}

fn string_literal(frame: &Frame, address: crate::value::Address, _length: usize) -> StepOutput {
    let char_ty = crate::value::Type::Scalar(lookup_scalar_type("char").expect("char is a builtin scalar type"));
    Ok(StepOutcome::new(frame.cont.clone())
        .with_result(StepResult::Value(Value::pointer(char_ty, address))))
}

fn unary_operator(state: &State, frame: &Frame, opcode: UnaryNodeOpcode, operand: &Rc<Node>) -> StepOutput {
    use UnaryNodeOpcode::*;
    match opcode {
        Plus | Minus | LNot | Not => match frame.step {
            Step::N(0) => {
                let parent = frame.clone().with_step(Step::N(1));
                Ok(descend(operand.clone(), Mode::Value, Some(Seq::Expr), parent))
            }
            Step::N(1) => {
                let value = state.result.as_value().ok_or(StepError::MalformedAst)?;
                let op = match opcode {
                    Plus => UnaryOpcode::Plus,
                    Minus => UnaryOpcode::Minus,
                    LNot => UnaryOpcode::LNot,
                    Not => UnaryOpcode::Not,
                    _ => unreachable!(),
                };
                let result = eval_unary_operation(op, value)?;
                Ok(StepOutcome::new(frame.cont.clone()).with_result(StepResult::Value(result)))
            }
            _ => Err(StepError::MalformedAst),
        },
        PreInc | PreDec | PostInc | PostDec => match frame.step {
            Step::N(0) => {
                let parent = frame.clone().with_step(Step::N(1));
                Ok(descend(operand.clone(), Mode::LValue, Some(Seq::Expr), parent))
            }
            Step::N(1) => {
                let pointer = state.result.as_value().ok_or(StepError::MalformedAst)?.clone();
                let pointee = pointer.pointee_type().ok_or(StepError::NotAddressable)?.clone();
                let addr = pointer.as_address().ok_or(StepError::NotAddressable)?;
                let old = state.memory.read_value(&pointee, addr);
                let increasing = matches!(opcode, PreInc | PostInc);
                let new = if matches!(old, Value::Pointer(..)) {
                    eval_pointer_add(&old, if increasing { 1 } else { -1 })?
                } else {
                    let op = if increasing { BinaryOpcode::Add } else { BinaryOpcode::Sub };
                    eval_binary_operation(op, &old, &Value::int(1))?
                };
                let result = if matches!(opcode, PreInc | PreDec) { new.clone() } else { old.clone() };
                Ok(StepOutcome::new(frame.cont.clone())
                    .with_result(StepResult::Value(result))
                    .with_effects(vec![
                        Effect::Load { at: pointer.clone() },
                        Effect::Store { at: pointer, value: new },
                    ]))
            }
            _ => Err(StepError::MalformedAst),
        },
        AddrOf => match frame.step {
            Step::N(0) => {
                let parent = frame.clone().with_step(Step::N(1));
                Ok(descend(operand.clone(), Mode::LValue, Some(Seq::Expr), parent))
            }
            Step::N(1) => {
                let pointer = state.result.as_value().ok_or(StepError::MalformedAst)?.clone();
                Ok(StepOutcome::new(frame.cont.clone()).with_result(StepResult::Value(pointer)))
            }
            _ => Err(StepError::MalformedAst),
        },
        Deref => match frame.step {
            Step::N(0) => {
                let parent = frame.clone().with_step(Step::N(1));
                Ok(descend(operand.clone(), Mode::Value, Some(Seq::Expr), parent))
            }
            Step::N(1) => {
                let pointer = state.result.as_value().ok_or(StepError::MalformedAst)?.clone();
                let (result, effects) = finalize_place(frame.mode, pointer, state.memory);
                Ok(StepOutcome::new(frame.cont.clone())
                    .with_result(StepResult::Value(result))
                    .with_effects(effects))
            }
            _ => Err(StepError::MalformedAst),
        },
    }
}

/// Walks the operand AST directly, without evaluating it. An operand that
/// resolves to a non-addressable binding (a function or builtin) reports
/// size 0 rather than erroring.
fn sizeof_operand(node: &Node, state: &State) -> Result<usize, StepError> {
    match node {
        Node::ParenExpr { inner } => sizeof_operand(inner, state),
        Node::DeclRefExpr { identifier } => match lookup(state, identifier)? {
            Binding::Place(v) => Ok(v.pointee_type().expect("place value must be a pointer").size()),
            Binding::Value(_) | Binding::Callable(_) => Ok(0),
        },
        _ => Err(StepError::UnsupportedSizeofOperand),
    }
}

fn sizeof_expr(state: &State, frame: &Frame, operand: &Rc<Node>) -> StepOutput {
    let size = sizeof_operand(operand, state)?;
    Ok(StepOutcome::new(frame.cont.clone()).with_result(StepResult::Value(Value::int(size as i64))))
}

fn binary_operator(
    state: &State,
    frame: &Frame,
    opcode: BinaryNodeOpcode,
    lhs: &Rc<Node>,
    rhs: &Rc<Node>,
) -> StepOutput {
    match opcode {
        BinaryNodeOpcode::Assign => match frame.step {
            Step::N(0) => {
                let parent = frame.clone().with_step(Step::N(1));
                Ok(descend(lhs.clone(), Mode::LValue, Some(Seq::Expr), parent))
            }
            Step::N(1) => {
                let lvalue = state.result.as_value().ok_or(StepError::MalformedAst)?.clone();
                let parent = frame
                    .clone()
                    .with_step(Step::N(2))
                    .with_scratch(Scratch::One(StepResult::Value(lvalue)));
                Ok(descend(rhs.clone(), Mode::Value, Some(Seq::Expr), parent))
            }
            Step::N(2) => {
                let lvalue = match take_one(&frame.scratch)? {
                    StepResult::Value(v) => v.clone(),
                    _ => return Err(StepError::MalformedAst),
                };
                let value = state.result.as_value().ok_or(StepError::MalformedAst)?.clone();
                Ok(StepOutcome::new(frame.cont.clone())
                    .with_result(StepResult::Value(value.clone()))
                    .with_effect(Effect::Store { at: lvalue, value }))
            }
            _ => Err(StepError::MalformedAst),
        },
        BinaryNodeOpcode::Arith(BinaryOpcode::LAnd) | BinaryNodeOpcode::Arith(BinaryOpcode::LOr) => {
            let is_and = matches!(opcode, BinaryNodeOpcode::Arith(BinaryOpcode::LAnd));
            match frame.step {
                Step::N(0) => {
                    let parent = frame.clone().with_step(Step::N(1));
                    Ok(descend(lhs.clone(), Mode::Value, Some(Seq::Expr), parent))
                }
                Step::N(1) => {
                    let truthy = state.result.as_value().ok_or(StepError::MalformedAst)?.to_bool();
                    let short_circuits = if is_and { !truthy } else { truthy };
                    if short_circuits {
                        // Return the LHS value itself, not a normalized 0/1:
                        // `5 || anything` must yield `5`.
                        Ok(StepOutcome::new(frame.cont.clone()).with_result(state.result.clone()))
                    } else {
                        let parent = frame.clone().with_step(Step::N(2));
                        Ok(descend(rhs.clone(), Mode::Value, Some(Seq::Expr), parent))
                    }
                }
                Step::N(2) => {
                    // Result is RHS, exactly like the `Comma` arm below:
                    // `1 && 7` must yield `7`, not `1`.
                    Ok(StepOutcome::new(frame.cont.clone()).with_result(state.result.clone()))
                }
                _ => Err(StepError::MalformedAst),
            }
        }
        BinaryNodeOpcode::Arith(BinaryOpcode::Comma) => match frame.step {
            Step::N(0) => {
                let parent = frame.clone().with_step(Step::N(1));
                Ok(descend(lhs.clone(), Mode::Value, Some(Seq::Expr), parent))
            }
            Step::N(1) => {
                let parent = frame.clone().with_step(Step::N(2));
                Ok(descend(rhs.clone(), frame.mode, Some(Seq::Expr), parent))
            }
            Step::N(2) => Ok(StepOutcome::new(frame.cont.clone()).with_result(state.result.clone())),
            _ => Err(StepError::MalformedAst),
        },
        BinaryNodeOpcode::Arith(op) => match frame.step {
            Step::N(0) => {
                let parent = frame.clone().with_step(Step::N(1));
                Ok(descend(lhs.clone(), Mode::Value, Some(Seq::Expr), parent))
            }
            Step::N(1) => {
                let lhs_value = state.result.as_value().ok_or(StepError::MalformedAst)?.clone();
                let parent = frame
                    .clone()
                    .with_step(Step::N(2))
                    .with_scratch(Scratch::One(StepResult::Value(lhs_value)));
                Ok(descend(rhs.clone(), Mode::Value, Some(Seq::Expr), parent))
            }
            Step::N(2) => {
                let lhs_value = match take_one(&frame.scratch)? {
                    StepResult::Value(v) => v.clone(),
                    _ => return Err(StepError::MalformedAst),
                };
                let rhs_value = state.result.as_value().ok_or(StepError::MalformedAst)?;
                let result = eval_binary_operation(op, &lhs_value, rhs_value)?;
                Ok(StepOutcome::new(frame.cont.clone()).with_result(StepResult::Value(result)))
            }
            _ => Err(StepError::MalformedAst),
        },
    }
}

fn compound_assign(state: &State, frame: &Frame, opcode: BinaryOpcode, lhs: &Rc<Node>, rhs: &Rc<Node>) -> StepOutput {
    match frame.step {
        Step::N(0) => {
            let parent = frame.clone().with_step(Step::N(1));
            Ok(descend(lhs.clone(), Mode::LValue, Some(Seq::Expr), parent))
        }
        Step::N(1) => {
            let lvalue = state.result.as_value().ok_or(StepError::MalformedAst)?.clone();
            let pointee = lvalue.pointee_type().ok_or(StepError::NotAddressable)?.clone();
            let addr = lvalue.as_address().ok_or(StepError::NotAddressable)?;
            let old = state.memory.read_value(&pointee, addr);
            let parent = frame
                .clone()
                .with_step(Step::N(2))
                .with_scratch(Scratch::Two(StepResult::Value(lvalue.clone()), StepResult::Value(old)));
            let mut outcome = descend(rhs.clone(), Mode::Value, Some(Seq::Expr), parent);
            outcome.effects.push(Effect::Load { at: lvalue });
            Ok(outcome)
        }
        Step::N(2) => {
            let (lvalue, old) = match &frame.scratch {
                Scratch::Two(StepResult::Value(lvalue), StepResult::Value(old)) => (lvalue.clone(), old.clone()),
                _ => return Err(StepError::MalformedAst),
            };
            let rhs_value = state.result.as_value().ok_or(StepError::MalformedAst)?;
            let new = eval_binary_operation(opcode, &old, rhs_value)?;
            Ok(StepOutcome::new(frame.cont.clone())
                .with_result(StepResult::Value(new.clone()))
                .with_effect(Effect::Store { at: lvalue, value: new }))
        }
        _ => Err(StepError::MalformedAst),
    }
}

fn array_subscript(state: &State, frame: &Frame, array: &Rc<Node>, index: &Rc<Node>) -> StepOutput {
    match frame.step {
        Step::N(0) => {
            let parent = frame.clone().with_step(Step::N(1));
            Ok(descend(array.clone(), Mode::Value, Some(Seq::Expr), parent))
        }
        Step::N(1) => {
            let array_ptr = state.result.as_value().ok_or(StepError::MalformedAst)?.clone();
            let parent = frame
                .clone()
                .with_step(Step::N(2))
                .with_scratch(Scratch::One(StepResult::Value(array_ptr)));
            Ok(descend(index.clone(), Mode::Value, Some(Seq::Expr), parent))
        }
        Step::N(2) => {
            let array_ptr = match take_one(&frame.scratch)? {
                StepResult::Value(v) => v.clone(),
                _ => return Err(StepError::MalformedAst),
            };
            let index_value = state.result.as_value().ok_or(StepError::MalformedAst)?;
            let idx = match index_value {
                Value::Integral(_, v) => *v,
                _ => return Err(StepError::MalformedAst),
            };
            let elem_ptr = eval_pointer_add(&array_ptr, idx)?;
            let (result, effects) = finalize_place(frame.mode, elem_ptr, state.memory);
            Ok(StepOutcome::new(frame.cont.clone())
                .with_result(StepResult::Value(result))
                .with_effects(effects))
        }
        _ => Err(StepError::MalformedAst),
    }
}

fn conditional(
    state: &State,
    frame: &Frame,
    cond: &Rc<Node>,
    then_branch: &Rc<Node>,
    else_branch: &Rc<Node>,
) -> StepOutput {
    match frame.step {
        Step::N(0) => {
            let parent = frame.clone().with_step(Step::N(1));
            Ok(descend(cond.clone(), Mode::Value, Some(Seq::Expr), parent))
        }
        Step::N(1) => {
            let truthy = state.result.as_value().ok_or(StepError::MalformedAst)?.to_bool();
            let branch = if truthy { then_branch } else { else_branch };
            // Both branches are entered with statement sequencing, matching
            // C's observable stepping, not whatever `seq` tag the ternary
            // expression itself was entered with.
            Ok(descend_transparent(branch.clone(), frame.mode, Some(Seq::Stmt), frame.cont.clone()))
        }
        _ => Err(StepError::MalformedAst),
    }
}

fn implicit_cast(state: &State, frame: &Frame, value: &Rc<Node>, target_type: &Rc<Node>) -> StepOutput {
    match frame.step {
        Step::N(0) => {
            let parent = frame.clone().with_step(Step::N(1));
            Ok(descend(value.clone(), frame.mode, frame.seq, parent))
        }
        Step::N(1) => {
            let value_result = state.result.clone();
            let parent = frame
                .clone()
                .with_step(Step::N(2))
                .with_scratch(Scratch::One(value_result));
            Ok(descend(target_type.clone(), Mode::Value, None, parent))
        }
        Step::N(2) => {
            let value_result = take_one(&frame.scratch)?.clone();
            // It's unclear what it even means to cast an lvalue — here the
            // uncast value/lvalue just passes through unchanged rather than
            // applying `eval_cast` to it.
            if frame.mode == Mode::LValue {
                return Ok(StepOutcome::new(frame.cont.clone()).with_result(value_result));
            }
            let ty = state.result.clone().into_type().ok_or(StepError::MalformedAst)?;
            let value = value_result.into_value().ok_or(StepError::MalformedAst)?;
            let cast = eval_cast(&ty, &value)?;
            Ok(StepOutcome::new(frame.cont.clone()).with_result(StepResult::Value(cast)))
        }
        _ => Err(StepError::MalformedAst),
    }
}

fn c_style_cast(state: &State, frame: &Frame, target_type: &Rc<Node>, value: &Rc<Node>) -> StepOutput {
    match frame.step {
        Step::N(0) => {
            let parent = frame.clone().with_step(Step::N(1));
            Ok(descend(target_type.clone(), Mode::Value, None, parent))
        }
        Step::N(1) => {
            let ty = state.result.clone().into_type().ok_or(StepError::MalformedAst)?;
            let parent = frame
                .clone()
                .with_step(Step::N(2))
                .with_scratch(Scratch::One(StepResult::Type(ty)));
            Ok(descend(value.clone(), Mode::Value, Some(Seq::Expr), parent))
        }
        Step::N(2) => {
            let ty = match take_one(&frame.scratch)? {
                StepResult::Type(t) => t.clone(),
                _ => return Err(StepError::MalformedAst),
            };
            let value = state.result.as_value().ok_or(StepError::MalformedAst)?;
            let cast = eval_cast(&ty, value)?;
            Ok(StepOutcome::new(frame.cont.clone()).with_result(StepResult::Value(cast)))
        }
        _ => Err(StepError::MalformedAst),
    }
}

#[cfg(test)]
mod tests {
    use super::super::drive_to_completion;
    use crate::ast::build::*;
    use crate::memory::Memory;
    use crate::scope::{GlobalMap, Scope};
    use crate::value::{lookup_scalar_type, Type, Value};

    fn root_state_parts() -> (Memory, std::rc::Rc<Scope>, GlobalMap) {
        (Memory::new(), Scope::root(), GlobalMap::new())
    }

    #[test]
    fn test_conditional_picks_then_branch_when_cond_is_truthy() {
        let (memory, scope, global_map) = root_state_parts();
        let node = conditional(int_literal("1"), int_literal("42"), int_literal("7"));
        let result = drive_to_completion(node, &memory, scope, &global_map);
        assert_eq!(result.into_value().unwrap(), Value::int(42));
    }

    #[test]
    fn test_conditional_picks_else_branch_when_cond_is_falsy() {
        let (memory, scope, global_map) = root_state_parts();
        let node = conditional(int_literal("0"), int_literal("42"), int_literal("7"));
        let result = drive_to_completion(node, &memory, scope, &global_map);
        assert_eq!(result.into_value().unwrap(), Value::int(7));
    }

    #[test]
    fn test_c_style_cast_truncates_float_to_int() {
        let (memory, scope, global_map) = root_state_parts();
        let node = c_style_cast(builtin_type("int"), float_literal("3.9"));
        let result = drive_to_completion(node, &memory, scope, &global_map);
        assert_eq!(result.into_value().unwrap(), Value::int(3));
    }

    #[test]
    fn test_implicit_cast_converts_int_to_double() {
        let (memory, scope, global_map) = root_state_parts();
        let node = implicit_cast(int_literal("5"), builtin_type("double"));
        let result = drive_to_completion(node, &memory, scope, &global_map);
        match result.into_value().unwrap() {
            Value::Floating(ty, v) => {
                assert_eq!(ty, lookup_scalar_type("double").unwrap());
                assert_eq!(v, 5.0);
            }
            other => panic!("expected a double, got {:?}", other),
        }
    }

    /// Per the open question preserved in `implicit_cast`: in lvalue mode the
    /// uncast value passes through unchanged rather than being cast.
    #[test]
    fn test_implicit_cast_in_lvalue_mode_passes_through_unchanged() {
        let memory = Memory::new();
        let mut scope_mut = Scope::push_block(Scope::root());
        let int_ty = Type::Scalar(lookup_scalar_type("int").unwrap());
        let addr = memory.allocate(int_ty.size());
        scope_mut.bind("x".into(), crate::scope::Binding::Place(Value::pointer(int_ty, addr)));
        let global_map = GlobalMap::new();
        let state = crate::state::State::new(&memory, scope_mut, &global_map);

        let node = implicit_cast(decl_ref("x"), builtin_type("double"));
        let frame = crate::control::Frame::new(node, crate::control::Cont::Return).with_mode(crate::control::Mode::LValue);
        let outcome = super::step(&state, &frame).unwrap();
        assert!(matches!(outcome.result, Some(crate::control::StepResult::Value(Value::Pointer(..)))));
    }

    #[test]
    fn test_string_literal_yields_pointer_to_char_at_address() {
        let (memory, scope, global_map) = root_state_parts();
        let char_ty = Type::Scalar(lookup_scalar_type("char").unwrap());
        let node = string_literal(100, 5);
        let result = drive_to_completion(node, &memory, scope, &global_map);
        assert_eq!(result.into_value().unwrap(), Value::pointer(char_ty, 100));
    }

    #[test]
    fn test_character_literal_plain_char() {
        let (memory, scope, global_map) = root_state_parts();
        let node = char_literal("'a'");
        let result = drive_to_completion(node, &memory, scope, &global_map);
        assert_eq!(result.into_value().unwrap(), Value::char_value('a' as i64));
    }

    #[test]
    fn test_character_literal_newline_escape() {
        let (memory, scope, global_map) = root_state_parts();
        let node = char_literal("'\\n'");
        let result = drive_to_completion(node, &memory, scope, &global_map);
        assert_eq!(result.into_value().unwrap(), Value::char_value('\n' as i64));
    }

    #[test]
    fn test_floating_literal_double_by_default() {
        let (memory, scope, global_map) = root_state_parts();
        let node = float_literal("3.5");
        let result = drive_to_completion(node, &memory, scope, &global_map);
        match result.into_value().unwrap() {
            Value::Floating(ty, v) => {
                assert_eq!(ty, lookup_scalar_type("double").unwrap());
                assert_eq!(v, 3.5);
            }
            other => panic!("expected a double, got {:?}", other),
        }
    }

    #[test]
    fn test_floating_literal_f_suffix_is_float() {
        let (memory, scope, global_map) = root_state_parts();
        let node = float_literal("3.5f");
        let result = drive_to_completion(node, &memory, scope, &global_map);
        match result.into_value().unwrap() {
            Value::Floating(ty, v) => {
                assert_eq!(ty, lookup_scalar_type("float").unwrap());
                assert_eq!(v, 3.5);
            }
            other => panic!("expected a float, got {:?}", other),
        }
    }

    #[test]
    fn test_unary_minus_negates() {
        let (memory, scope, global_map) = root_state_parts();
        let node = unary(crate::ast::UnaryNodeOpcode::Minus, int_literal("5"));
        let result = drive_to_completion(node, &memory, scope, &global_map);
        assert_eq!(result.into_value().unwrap(), Value::int(-5));
    }

    #[test]
    fn test_unary_plus_is_identity() {
        let (memory, scope, global_map) = root_state_parts();
        let node = unary(crate::ast::UnaryNodeOpcode::Plus, int_literal("5"));
        let result = drive_to_completion(node, &memory, scope, &global_map);
        assert_eq!(result.into_value().unwrap(), Value::int(5));
    }

    #[test]
    fn test_unary_lnot_of_zero_is_one() {
        let (memory, scope, global_map) = root_state_parts();
        let node = unary(crate::ast::UnaryNodeOpcode::LNot, int_literal("0"));
        let result = drive_to_completion(node, &memory, scope, &global_map);
        assert_eq!(result.into_value().unwrap(), Value::int(1));
    }

    #[test]
    fn test_unary_bitwise_not_of_zero_is_negative_one() {
        let (memory, scope, global_map) = root_state_parts();
        let node = unary(crate::ast::UnaryNodeOpcode::Not, int_literal("0"));
        let result = drive_to_completion(node, &memory, scope, &global_map);
        assert_eq!(result.into_value().unwrap(), Value::int(-1));
    }
}
