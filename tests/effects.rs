//! The effect-trace property from a pointer-store scenario: running
//! `int main() { int x = 5; int *p = &x; *p = 9; return x; }` must apply, in
//! order, an `Enter` for the function body's block, a `VarDecl` for `x`, a
//! `VarDecl` for `p`, a `Store` of `9` through the pointer bound to `x`, and
//! a trailing `Leave` — with no extraneous stores in between.

use cstep::ast::build::*;
use cstep::ast::BinaryNodeOpcode;
use cstep::ast::BinaryNodeOpcode::Arith;
use cstep::ast::UnaryNodeOpcode::*;
use cstep::driver::Driver;
use cstep::effect::Effect;
use cstep::value::{BinaryOpcode, Value};

#[test]
fn test_pointer_store_effect_trace_matches_scenario_four() {
    let int_ty = builtin_type("int");
    let body = compound(vec![
        decl_stmt(vec![var_decl("x", int_ty.clone(), Some(int_literal("5")))]),
        decl_stmt(vec![var_decl("p", pointer_type(int_ty.clone()), Some(unary(AddrOf, decl_ref("x"))))]),
        binary(BinaryNodeOpcode::Assign, unary(Deref, decl_ref("p")), int_literal("9")),
        return_stmt(Some(decl_ref("x"))),
    ]);
    let main = function_decl("main", function_proto(int_ty, vec![]), body);

    let mut driver = Driver::new();
    assert_eq!(driver.run(main).unwrap(), Value::int(9));

    let log = driver.effects_log();

    // Exactly one store occurs: the `*p = 9` assignment. No extraneous
    // stores slip in from the declarations' own initializers (those are
    // `VarDecl` effects, not `Store`s).
    let stores: Vec<_> = log.iter().filter(|e| matches!(e, Effect::Store { .. })).collect();
    assert_eq!(stores.len(), 1);
    match stores[0] {
        Effect::Store { value, .. } => assert_eq!(*value, Value::int(9)),
        _ => unreachable!(),
    }

    // Enter precedes both vardecls, which precede the lone store, which
    // precedes the final leave.
    let enter_idx = log.iter().position(|e| matches!(e, Effect::Enter { .. })).unwrap();
    let vardecl_idxs: Vec<_> = log
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, Effect::VarDecl { .. }))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(vardecl_idxs.len(), 2);
    let store_idx = log.iter().position(|e| matches!(e, Effect::Store { .. })).unwrap();
    let leave_idx = log.iter().rposition(|e| matches!(e, Effect::Leave)).unwrap();

    assert!(enter_idx < vardecl_idxs[0]);
    assert!(vardecl_idxs[0] < vardecl_idxs[1]);
    assert!(vardecl_idxs[1] < store_idx);
    assert!(store_idx < leave_idx);
}

#[test]
fn test_short_circuit_and_produces_no_load_or_store_for_rhs() {
    // `0 && (x = 1)`: the assignment must never run, so no `Store` effect
    // should appear in the trace at all.
    let body = compound(vec![
        decl_stmt(vec![var_decl("x", builtin_type("int"), Some(int_literal("0")))]),
        return_stmt(Some(binary(
            Arith(BinaryOpcode::LAnd),
            int_literal("0"),
            binary(BinaryNodeOpcode::Assign, decl_ref("x"), int_literal("1")),
        ))),
    ]);
    let main = function_decl("main", function_proto(builtin_type("int"), vec![]), body);

    let mut driver = Driver::new();
    assert_eq!(driver.run(main).unwrap(), Value::int(0));
    assert!(!driver.effects_log().iter().any(|e| matches!(e, Effect::Store { .. })));
}
