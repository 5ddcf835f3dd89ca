//! Errors the stepper itself can raise. Structural errors (malformed AST,
//! uncallable callee) and semantic errors (undeclared name, non-addressable
//! lvalue) are represented directly; delegated errors are the value/type
//! algebra's own [`ValueError`], carried through unchanged via
//! [`StepError::Delegated`].
//!
//! No source span is attached to any of these: AST production is out of
//! scope here, so this is a flat `thiserror` enum rather than one paired
//! with a source-location wrapper.

use crate::value::ValueError;
use thiserror::Error;

/// An error raised while advancing one step. `step` never panics on
/// malformed input; every failure mode the dispatcher can detect surfaces
/// here instead.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum StepError {
    /// `findDeclaration` found nothing for this identifier.
    #[error("undeclared identifier `{0}`")]
    UnknownName(String),
    /// An lvalue was required (address-of, assignment target, `++`/`--`
    /// operand, `sizeof`) but the binding or expression isn't addressable.
    #[error("expression is not addressable")]
    NotAddressable,
    /// `sizeof` was applied to an operand shape the reference walk doesn't
    /// recognize.
    #[error("sizeof is not supported for this operand")]
    UnsupportedSizeofOperand,
    /// A `CallExpr`'s callee didn't resolve to a `Callable` binding.
    #[error("value is not callable")]
    NotCallable,
    /// The AST shape at this node doesn't match what its `kind` requires
    /// (e.g. a step index past the node's child count). Reaching this
    /// indicates a malformed descriptor rather than a user-code error.
    #[error("malformed AST at this step")]
    MalformedAst,
    /// Forwarded verbatim from the value/type algebra.
    #[error(transparent)]
    Delegated(#[from] ValueError),
}
