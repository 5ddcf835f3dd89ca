//! The purity/determinism property: for any `(state, control)`, two calls
//! to `step` produce equal transitions (structural equality on control,
//! result, and effects). `step` takes everything by shared reference and
//! returns an owned `StepOutcome`, so this is straightforward to check
//! directly without a driver.

use cstep::ast::build::*;
use cstep::ast::BinaryNodeOpcode::Arith;
use cstep::control::{Cont, Frame};
use cstep::memory::Memory;
use cstep::scope::{Binding, GlobalMap, Scope};
use cstep::state::State;
use cstep::step;
use cstep::value::{BinaryOpcode, Value};

#[test]
fn test_step_is_pure_for_a_binary_expression() {
    let node = binary(Arith(BinaryOpcode::Add), int_literal("1"), int_literal("2"));
    let frame = Frame::new(node, Cont::Return);
    let memory = Memory::new();
    let global_map = GlobalMap::new();
    let state = State::new(&memory, Scope::root(), &global_map);

    let first = step(&state, &frame).unwrap();
    let second = step(&state, &frame).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_step_is_pure_for_a_decl_ref_load() {
    let mut scope = Scope::push_block(Scope::root());
    let mut memory = Memory::new();
    let int_ty = cstep::value::Type::Scalar(cstep::value::lookup_scalar_type("int").unwrap());
    let addr = memory.allocate(int_ty.size());
    memory.write_value(addr, &Value::int(42));
    scope.bind("x".into(), Binding::Place(Value::pointer(int_ty, addr)));
    let global_map = GlobalMap::new();

    let node = decl_ref("x");
    let frame = Frame::new(node, Cont::Return);
    let state = State::new(&memory, scope, &global_map);

    let first = step(&state, &frame).unwrap();
    let second = step(&state, &frame).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.result, Some(cstep::control::StepResult::Value(Value::int(42))));
}

#[test]
fn test_step_never_mutates_memory_directly() {
    // Stepping a `DeclRefExpr` in value mode for a pointer binding emits a
    // `Load` effect but performs no write; memory contents must be
    // byte-for-byte identical before and after the call.
    let mut scope = Scope::push_block(Scope::root());
    let mut memory = Memory::new();
    let int_ty = cstep::value::Type::Scalar(cstep::value::lookup_scalar_type("int").unwrap());
    let addr = memory.allocate(int_ty.size());
    memory.write_value(addr, &Value::int(7));
    scope.bind("x".into(), Binding::Place(Value::pointer(int_ty, addr)));
    let global_map = GlobalMap::new();
    let before = memory.clone();

    let node = decl_ref("x");
    let frame = Frame::new(node, Cont::Return);
    let state = State::new(&memory, scope, &global_map);
    let _ = step(&state, &frame).unwrap();

    assert_eq!(memory, before);
}
