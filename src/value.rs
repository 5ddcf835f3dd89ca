//! The value and type algebra: integral/floating/pointer values, the scalar/
//! pointer/array/function type lattice, and the primitive evaluators that
//! the stepper calls into (`eval_unary_operation`, `eval_binary_operation`,
//! `eval_cast`, `eval_pointer_add`).
//!
//! This is a reference implementation, faithful enough to C semantics to
//! drive the end-to-end tests in `tests/`, but kept deliberately separate
//! from the stepper itself — `step` only ever calls into it, never the
//! reverse.

use serde::Serialize;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// The address space the reference `Memory` allocates out of.
pub type Address = usize;

/// A named scalar type, e.g. `int` or `double`. Looked up by name out of
/// [`scalar_types`]. `Serialize`-only (no `Deserialize`): a host animation UI
/// renders these, it never constructs one from wire data, so there's no need
/// to round-trip the `&'static str` name through an owned allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ScalarType {
    pub name: &'static str,
    pub size: usize,
    pub kind: ScalarKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ScalarKind {
    Integral,
    Floating,
}

const INT: ScalarType = ScalarType { name: "int", size: 4, kind: ScalarKind::Integral };
const CHAR: ScalarType = ScalarType { name: "char", size: 1, kind: ScalarKind::Integral };
const FLOAT: ScalarType = ScalarType { name: "float", size: 4, kind: ScalarKind::Floating };
const DOUBLE: ScalarType = ScalarType { name: "double", size: 8, kind: ScalarKind::Floating };

/// The process-wide table of scalar type names.
pub fn scalar_types() -> &'static [ScalarType] {
    &[INT, CHAR, FLOAT, DOUBLE]
}

/// Looks up a scalar type by name, e.g. `"int"`.
pub fn lookup_scalar_type(name: &str) -> Option<ScalarType> {
    scalar_types().iter().copied().find(|t| t.name == name)
}

/// A type: scalar, pointer, constant array, or function. `Serialize`-derived
/// so a host driver can hand a variable's declared type to an
/// animation/debugging UI alongside its current [`Value`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Type {
    Scalar(ScalarType),
    Pointer(Rc<Type>),
    ConstantArray(Rc<Type>, usize),
    Function(Rc<Type>, Vec<Type>),
}

impl Type {
    pub fn pointer(pointee: Type) -> Self {
        Type::Pointer(Rc::new(pointee))
    }

    pub fn constant_array(elem: Type, count: usize) -> Self {
        Type::ConstantArray(Rc::new(elem), count)
    }

    pub fn function(result: Type, params: Vec<Type>) -> Self {
        Type::Function(Rc::new(result), params)
    }

    /// The size in bytes of a value of this type. Defined for every pointee
    /// type.
    pub fn size(&self) -> usize {
        match self {
            Type::Scalar(s) => s.size,
            // All pointers are a machine address wide, regardless of pointee.
            Type::Pointer(_) => std::mem::size_of::<Address>(),
            Type::ConstantArray(elem, count) => elem.size() * count,
            // Functions aren't objects; this is only reached if someone takes
            // sizeof a function type, which callers should reject upstream.
            Type::Function(_, _) => 0,
        }
    }

    /// If this is an array type, the element type (used for array decay).
    pub fn array_element(&self) -> Option<&Type> {
        match self {
            Type::ConstantArray(elem, _) => Some(elem),
            _ => None,
        }
    }

    /// If this is a pointer type, the pointee type.
    pub fn pointee(&self) -> Option<&Type> {
        match self {
            Type::Pointer(pointee) => Some(pointee),
            _ => None,
        }
    }

    fn is_floating(&self) -> bool {
        matches!(self, Type::Scalar(s) if s.kind == ScalarKind::Floating)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Scalar(s) => write!(f, "{}", s.name),
            Type::Pointer(pointee) => write!(f, "{}*", pointee),
            Type::ConstantArray(elem, count) => write!(f, "{}[{}]", elem, count),
            Type::Function(result, params) => {
                write!(f, "{} (", result)?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A value. Every value carries its type. `Serialize`-derived for the same
/// reason as [`Type`]: a host UI renders `State::result` and the values
/// threaded through `load`/`store` effects as the program animates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Value {
    Integral(ScalarType, i64),
    Floating(ScalarType, f64),
    Pointer(Rc<Type>, Address),
}

impl Value {
    pub fn int(value: i64) -> Self {
        Value::Integral(INT, value)
    }

    pub fn char_value(value: i64) -> Self {
        Value::Integral(CHAR, value)
    }

    pub fn pointer(pointee: Type, address: Address) -> Self {
        Value::Pointer(Rc::new(pointee), address)
    }

    /// The type of this value. For a pointer, this is `pointer(pointee)`.
    pub fn ty(&self) -> Type {
        match self {
            Value::Integral(s, _) => Type::Scalar(*s),
            Value::Floating(s, _) => Type::Scalar(*s),
            Value::Pointer(pointee, _) => Type::Pointer(pointee.clone()),
        }
    }

    /// The truthiness predicate used by control flow (if/while/for/ternary/
    /// short-circuit operators).
    pub fn to_bool(&self) -> bool {
        match self {
            Value::Integral(_, v) => *v != 0,
            Value::Floating(_, v) => *v != 0.0,
            Value::Pointer(_, addr) => *addr != 0,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            Value::Pointer(_, addr) => Some(*addr),
            _ => None,
        }
    }

    pub fn pointee_type(&self) -> Option<&Type> {
        match self {
            Value::Pointer(pointee, _) => Some(pointee),
            _ => None,
        }
    }
}

/// Errors raised by the value/type algebra. The stepper treats these as
/// delegated errors: it surfaces them without interpreting them.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValueError {
    #[error("unknown unary operator {0:?}")]
    UnknownUnaryOperator(UnaryOpcode),
    #[error("unknown binary operator {0:?}")]
    UnknownBinaryOperator(BinaryOpcode),
    #[error("divide by zero")]
    DivideByZero,
    #[error("cannot cast {from} to {to}")]
    InvalidCast { from: String, to: String },
    #[error("pointer arithmetic is only defined for pointer values")]
    NotAPointer,
}

/// Unary operators that go through `eval_unary_operation`. The increment/
/// decrement and address-of/deref operators are handled directly by the
/// stepper and never reach this function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOpcode {
    Plus,
    Minus,
    LNot,
    Not,
}

/// Binary operators that go through `eval_binary_operation`. `Comma`, `LAnd`,
/// and `LOr` are special-cased by the stepper before reaching this function
/// (their result is one of the operands, not computed here) but are included
/// for completeness of the opcode set the stepper dispatches on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOpcode {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    BAnd,
    BOr,
    BXor,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    LAnd,
    LOr,
    Comma,
}

/// Evaluates a unary operator against a single value.
pub fn eval_unary_operation(op: UnaryOpcode, value: &Value) -> Result<Value, ValueError> {
    match (op, value) {
        (UnaryOpcode::Plus, Value::Integral(t, v)) => Ok(Value::Integral(*t, *v)),
        (UnaryOpcode::Plus, Value::Floating(t, v)) => Ok(Value::Floating(*t, *v)),
        (UnaryOpcode::Minus, Value::Integral(t, v)) => {
            Ok(Value::Integral(*t, truncate_to_width(v.wrapping_neg(), t.size)))
        }
        (UnaryOpcode::Minus, Value::Floating(t, v)) => Ok(Value::Floating(*t, -v)),
        (UnaryOpcode::LNot, v) => Ok(Value::int(!v.to_bool() as i64)),
        (UnaryOpcode::Not, Value::Integral(t, v)) => Ok(Value::Integral(*t, truncate_to_width(!v, t.size))),
        _ => Err(ValueError::UnknownUnaryOperator(op)),
    }
}

/// Evaluates a binary operator against two values. `Comma`/`LAnd`/`LOr` are
/// accepted here too (falling through to their operand semantics) so callers
/// that don't special-case them still get a sensible result, but the stepper
/// itself short-circuits before calling this for those three opcodes.
pub fn eval_binary_operation(
    op: BinaryOpcode,
    lhs: &Value,
    rhs: &Value,
) -> Result<Value, ValueError> {
    use BinaryOpcode::*;
    if matches!(op, Comma) {
        return Ok(rhs.clone());
    }
    if matches!(op, LAnd) {
        return Ok(Value::int((lhs.to_bool() && rhs.to_bool()) as i64));
    }
    if matches!(op, LOr) {
        return Ok(Value::int((lhs.to_bool() || rhs.to_bool()) as i64));
    }

    if let (Value::Pointer(pointee, addr), Value::Integral(_, idx)) = (lhs, rhs) {
        if matches!(op, Add | Sub) {
            let signed_idx = if matches!(op, Sub) { -idx } else { *idx };
            return eval_pointer_add(&Value::Pointer(pointee.clone(), *addr), signed_idx);
        }
    }

    let result_is_float = lhs.ty().is_floating() || rhs.ty().is_floating();
    if result_is_float {
        let l = as_f64(lhs);
        let r = as_f64(rhs);
        let ty = if matches!(lhs.ty(), Type::Scalar(s) if s.kind == ScalarKind::Floating) {
            scalar_of(lhs)
        } else {
            scalar_of(rhs)
        };
        let arith = |v: f64| Ok(Value::Floating(ty, v));
        return match op {
            Add => arith(l + r),
            Sub => arith(l - r),
            Mul => arith(l * r),
            Div => {
                if r == 0.0 {
                    Err(ValueError::DivideByZero)
                } else {
                    arith(l / r)
                }
            }
            Lt => Ok(Value::int((l < r) as i64)),
            Gt => Ok(Value::int((l > r) as i64)),
            Le => Ok(Value::int((l <= r) as i64)),
            Ge => Ok(Value::int((l >= r) as i64)),
            Eq => Ok(Value::int((l == r) as i64)),
            Ne => Ok(Value::int((l != r) as i64)),
            _ => Err(ValueError::UnknownBinaryOperator(op)),
        };
    }

    let ty = scalar_of(lhs);
    let l = std::num::Wrapping(as_i64(lhs));
    let r = std::num::Wrapping(as_i64(rhs));
    let wrap = |v: std::num::Wrapping<i64>| Ok(Value::Integral(ty, truncate_to_width(v.0, ty.size)));
    match op {
        Add => wrap(l + r),
        Sub => wrap(l - r),
        Mul => wrap(l * r),
        Div => {
            if r.0 == 0 {
                Err(ValueError::DivideByZero)
            } else {
                wrap(l / r)
            }
        }
        Rem => {
            if r.0 == 0 {
                Err(ValueError::DivideByZero)
            } else {
                wrap(l % r)
            }
        }
        Shl => wrap(std::num::Wrapping(l.0 << r.0)),
        Shr => wrap(std::num::Wrapping(l.0 >> r.0)),
        BAnd => wrap(std::num::Wrapping(l.0 & r.0)),
        BOr => wrap(std::num::Wrapping(l.0 | r.0)),
        BXor => wrap(std::num::Wrapping(l.0 ^ r.0)),
        Lt => Ok(Value::int((l.0 < r.0) as i64)),
        Gt => Ok(Value::int((l.0 > r.0) as i64)),
        Le => Ok(Value::int((l.0 <= r.0) as i64)),
        Ge => Ok(Value::int((l.0 >= r.0) as i64)),
        Eq => Ok(Value::int((l.0 == r.0) as i64)),
        Ne => Ok(Value::int((l.0 != r.0) as i64)),
        _ => Err(ValueError::UnknownBinaryOperator(op)),
    }
}

/// Converts `value` to `target`, per C's usual implicit/explicit conversion
/// rules (integral <-> floating <-> pointer), truncating or widening as
/// needed.
pub fn eval_cast(target: &Type, value: &Value) -> Result<Value, ValueError> {
    match (target, value) {
        (Type::Scalar(t), _) if t.kind == ScalarKind::Integral => {
            let v = match value {
                Value::Integral(_, v) => *v,
                Value::Floating(_, v) => *v as i64,
                Value::Pointer(_, addr) => *addr as i64,
            };
            Ok(Value::Integral(*t, truncate_to_width(v, t.size)))
        }
        (Type::Scalar(t), _) if t.kind == ScalarKind::Floating => {
            let v = match value {
                Value::Integral(_, v) => *v as f64,
                Value::Floating(_, v) => *v,
                Value::Pointer(_, _) => {
                    return Err(ValueError::InvalidCast {
                        from: value.ty().to_string(),
                        to: target.to_string(),
                    })
                }
            };
            let v = if t.size == 4 { (v as f32) as f64 } else { v };
            Ok(Value::Floating(*t, v))
        }
        (Type::Pointer(pointee), Value::Pointer(_, addr)) => {
            Ok(Value::Pointer(pointee.clone(), *addr))
        }
        (Type::Pointer(pointee), Value::Integral(_, addr)) => {
            Ok(Value::Pointer(pointee.clone(), *addr as Address))
        }
        (Type::ConstantArray(elem, _), Value::Pointer(_, addr)) => {
            // Decaying an array value through a cast just re-points at the
            // same address with the element type.
            Ok(Value::Pointer(elem.clone(), *addr))
        }
        _ => Err(ValueError::InvalidCast {
            from: value.ty().to_string(),
            to: target.to_string(),
        }),
    }
}

/// `base + index`, scaled by the pointee's size, per C pointer arithmetic.
pub fn eval_pointer_add(base: &Value, index: i64) -> Result<Value, ValueError> {
    match base {
        Value::Pointer(pointee, addr) => {
            let size = pointee.size() as i64;
            let new_addr = (*addr as i64) + index * size;
            Ok(Value::Pointer(pointee.clone(), new_addr as Address))
        }
        _ => Err(ValueError::NotAPointer),
    }
}

fn scalar_of(value: &Value) -> ScalarType {
    match value {
        Value::Integral(t, _) => *t,
        Value::Floating(t, _) => *t,
        Value::Pointer(_, _) => INT,
    }
}

fn as_i64(value: &Value) -> i64 {
    match value {
        Value::Integral(_, v) => *v,
        Value::Floating(_, v) => *v as i64,
        Value::Pointer(_, addr) => *addr as i64,
    }
}

fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Integral(_, v) => *v as f64,
        Value::Floating(_, v) => *v,
        Value::Pointer(_, addr) => *addr as f64,
    }
}

fn truncate_to_width(v: i64, size: usize) -> i64 {
    match size {
        1 => v as i8 as i64,
        2 => v as i16 as i64,
        4 => v as i32 as i64,
        _ => v,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_scalar_type() {
        assert_eq!(lookup_scalar_type("int"), Some(INT));
        assert_eq!(lookup_scalar_type("bogus"), None);
    }

    #[test]
    fn test_eval_binary_operation_add_wraps() {
        let max = Value::Integral(INT, i32::MAX as i64);
        let one = Value::int(1);
        let result = eval_binary_operation(BinaryOpcode::Add, &max, &one).unwrap();
        assert_eq!(result, Value::Integral(INT, i32::MIN as i64));
    }

    #[test]
    fn test_eval_binary_operation_divide_by_zero() {
        let err = eval_binary_operation(BinaryOpcode::Div, &Value::int(1), &Value::int(0))
            .unwrap_err();
        assert_eq!(err, ValueError::DivideByZero);
    }

    #[test]
    fn test_eval_pointer_add_scales_by_pointee_size() {
        let ptr = Value::pointer(Type::Scalar(INT), 100);
        let result = eval_pointer_add(&ptr, 2).unwrap();
        assert_eq!(result, Value::pointer(Type::Scalar(INT), 108));
    }

    #[test]
    fn test_eval_cast_float_to_int_truncates() {
        let f = Value::Floating(DOUBLE, 3.9);
        let result = eval_cast(&Type::Scalar(INT), &f).unwrap();
        assert_eq!(result, Value::int(3));
    }

    #[test]
    fn test_array_size_multiplies_element_size() {
        let arr = Type::constant_array(Type::Scalar(INT), 3);
        assert_eq!(arr.size(), 12);
    }
}
