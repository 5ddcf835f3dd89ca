//! A small-step, reifiable interpreter for a C-subset AST.
//!
//! The crate's one deliverable is [`step::step`]: a pure function from
//! `(State, Frame)` to a `StepOutcome` describing the next control
//! descriptor, an optional result, and a list of [`effect::Effect`]s for an
//! external driver to apply. `step` never mutates memory or scope itself and
//! never panics on a well-formed program; every failure path is a
//! [`error::StepError`].
//!
//! Everything else in this crate — [`memory`], [`value`], [`scope`], and
//! [`driver`] — is a reference implementation of `step`'s external
//! collaborators, faithful enough to drive the end-to-end tests in `tests/`
//! but not itself the focus of the crate.
//!
//! ```
//! use cstep::ast::build::*;
//! use cstep::driver::Driver;
//!
//! let body = compound(vec![return_stmt(Some(int_literal("42")))]);
//! let proto = function_proto(builtin_type("int"), vec![]);
//! let main = function_decl("main", proto, body);
//!
//! let mut driver = Driver::new();
//! driver.register_function(&main);
//! let result = driver.run(main).unwrap();
//! assert_eq!(result, cstep::value::Value::int(42));
//! ```

#![deny(unused_must_use)]

pub mod ast;
pub mod builtins;
mod consts;
pub mod control;
pub mod driver;
pub mod effect;
pub mod error;
pub mod memory;
pub mod scope;
pub mod state;
mod step;
pub mod value;

pub use consts::MAX_STEP_COUNT;
pub use control::{Cont, Frame, Mode, Scratch, Seq, Step, StepOutcome, StepResult};
pub use driver::{Driver, DriverError};
pub use effect::Effect;
pub use error::StepError;
pub use step::step;
