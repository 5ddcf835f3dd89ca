//! Demonstrates the subscriber-attachment use case the `tracing`
//! instrumentation exists for: a host registers a subscriber once, then
//! runs the driver and observes its `trace`/`debug` events, the same way a
//! CLI wires up `tracing_subscriber::fmt` before running its own work. No
//! assertions on log content here — this just exercises that a subscriber
//! can be attached and a program still runs to completion under it.

use cstep::ast::build::*;
use cstep::driver::Driver;
use cstep::value::Value;

#[test]
fn test_program_runs_to_completion_under_an_attached_subscriber() {
    // Multiple test binaries may call this; a subscriber can only be set
    // once per process, so ignore the "already set" error.
    let _ = tracing_subscriber::fmt().with_env_filter("cstep=trace").try_init();

    let body = compound(vec![return_stmt(Some(int_literal("7")))]);
    let main = function_decl("main", function_proto(builtin_type("int"), vec![]), body);

    let mut driver = Driver::new();
    assert_eq!(driver.run(main).unwrap(), Value::int(7));
}
