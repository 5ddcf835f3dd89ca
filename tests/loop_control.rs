//! `break`/`continue` across all three loop forms, driven end to end. The
//! unit tests colocated in `src/step/stmt.rs` cover the same two
//! corrections at the stepper level directly; these exercise the same
//! scenarios through a real `Driver::run`, the way a host embedding the
//! stepper actually would.

use cstep::ast::build::*;
use cstep::ast::BinaryNodeOpcode::Arith;
use cstep::ast::UnaryNodeOpcode::PreInc;
use cstep::driver::{Driver, DriverConfig};
use cstep::effect::Effect;
use cstep::value::{BinaryOpcode, Value};

fn int_ty() -> std::rc::Rc<cstep::ast::Node> {
    builtin_type("int")
}

/// `do { ++i; if (i == 2) continue; n += i; } while (i < 4);` must land on
/// `n == 8`: `continue` at `i == 2` has to resume at the condition check,
/// skipping straight past `n += i` for that iteration, rather than jumping
/// back into the body unconditionally (which would never re-test `i < 4`
/// and run forever).
#[test]
fn test_scenario_do_while_continue_skips_body_but_still_rechecks_condition() {
    let do_body = compound(vec![
        unary(PreInc, decl_ref("i")),
        if_stmt(binary(Arith(BinaryOpcode::Eq), decl_ref("i"), int_literal("2")), continue_stmt(), None),
        compound_assign(BinaryOpcode::Add, decl_ref("n"), decl_ref("i")),
    ]);
    let body = compound(vec![
        decl_stmt(vec![var_decl("i", int_ty(), Some(int_literal("0"))), var_decl("n", int_ty(), Some(int_literal("0")))]),
        do_stmt(do_body, binary(Arith(BinaryOpcode::Lt), decl_ref("i"), int_literal("4"))),
        return_stmt(Some(decl_ref("n"))),
    ]);
    let main = function_decl("main", function_proto(int_ty(), vec![]), body);

    let mut driver = Driver::with_config(DriverConfig { max_steps: 1000 });
    assert_eq!(driver.run(main).unwrap(), Value::int(8));
}

/// `break` out of a `for` loop nested inside an `if`: the accumulated sum
/// stops at the breaking iteration, and the driver doesn't panic on
/// "leave without a matching enter" while unwinding the `for`'s own scope.
#[test]
fn test_scenario_break_out_of_for_loop_stops_accumulation() {
    let for_body = compound(vec![
        if_stmt(binary(Arith(BinaryOpcode::Eq), decl_ref("i"), int_literal("3")), break_stmt(), None),
        compound_assign(BinaryOpcode::Add, decl_ref("n"), decl_ref("i")),
    ]);
    let body = compound(vec![
        decl_stmt(vec![var_decl("n", int_ty(), Some(int_literal("0")))]),
        for_stmt(
            decl_stmt(vec![var_decl("i", int_ty(), Some(int_literal("0")))]),
            binary(Arith(BinaryOpcode::Lt), decl_ref("i"), int_literal("10")),
            unary(PreInc, decl_ref("i")),
            for_body,
        ),
        return_stmt(Some(decl_ref("n"))),
    ]);
    let main = function_decl("main", function_proto(int_ty(), vec![]), body);

    let mut driver = Driver::new();
    assert_eq!(driver.run(main).unwrap(), Value::int(3)); // 0 + 1 + 2
}

/// `break` out of a `while` loop nested two `CompoundStmt` levels deep: the
/// driver must collect exactly one `Leave` per block passed through and
/// stop there, not one more (`while` owns no scope of its own, unlike
/// `for`).
#[test]
fn test_scenario_break_out_of_nested_block_inside_while_loop() {
    let inner_block = compound(vec![break_stmt()]);
    let while_body = compound(vec![if_stmt(
        binary(Arith(BinaryOpcode::Eq), decl_ref("i"), int_literal("3")),
        inner_block,
        None,
    ), unary(PreInc, decl_ref("i"))]);
    let body = compound(vec![
        decl_stmt(vec![var_decl("i", int_ty(), Some(int_literal("0")))]),
        while_stmt(int_literal("1"), while_body),
        return_stmt(Some(decl_ref("i"))),
    ]);
    let main = function_decl("main", function_proto(int_ty(), vec![]), body);

    let mut driver = Driver::new();
    assert_eq!(driver.run(main).unwrap(), Value::int(3));

    let enters = driver.effects_log().iter().filter(|e| matches!(e, Effect::Enter { .. })).count();
    let leaves = driver.effects_log().iter().filter(|e| matches!(e, Effect::Leave)).count();
    assert_eq!(enters, leaves, "break must close every scope it passed through, and no more");
}
