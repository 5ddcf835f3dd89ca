//! The memory subsystem: a byte-addressable store supporting typed reads and
//! writes, exposed as `read_value`/`write_value`. Kept separate from the
//! stepper itself; this is a reference implementation backing the reference
//! driver.

use crate::value::{Address, ScalarKind, Type, Value};

/// A flat byte-addressable store. Values are encoded little-endian.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Reserves `size` fresh, zeroed bytes and returns the address of the
    /// first one.
    pub fn allocate(&mut self, size: usize) -> Address {
        let addr = self.bytes.len();
        self.bytes.resize(addr + size, 0);
        addr
    }

    /// Reads a value of `pointee`'s type from `address`.
    pub fn read_value(&self, pointee: &Type, address: Address) -> Value {
        let size = pointee.size();
        let slice = &self.bytes[address..address + size];
        match pointee {
            Type::Scalar(s) if s.kind == ScalarKind::Floating => {
                let bits = if s.size == 4 {
                    f32::from_le_bytes(slice.try_into().unwrap()) as f64
                } else {
                    f64::from_le_bytes(slice.try_into().unwrap())
                };
                Value::Floating(*s, bits)
            }
            Type::Scalar(s) => {
                let v = read_int(slice);
                Value::Integral(*s, v)
            }
            Type::Pointer(inner) => {
                let addr = read_int(slice) as Address;
                Value::pointer((**inner).clone(), addr)
            }
            // Reading an array or function "value" directly isn't a
            // meaningful C operation; the stepper never does this (arrays
            // decay to pointers before a load is emitted).
            Type::ConstantArray(_, _) | Type::Function(_, _) => {
                unreachable!("cannot read a value of array or function type")
            }
        }
    }

    /// Writes `value` at `address`.
    pub fn write_value(&mut self, address: Address, value: &Value) {
        let size = value.ty().size();
        let bytes: Vec<u8> = match value {
            Value::Floating(s, v) => {
                if s.size == 4 {
                    (*v as f32).to_le_bytes().to_vec()
                } else {
                    v.to_le_bytes().to_vec()
                }
            }
            Value::Integral(_, v) => write_int(*v, size),
            Value::Pointer(_, addr) => write_int(*addr as i64, size),
        };
        self.bytes[address..address + size].copy_from_slice(&bytes);
    }
}

fn read_int(slice: &[u8]) -> i64 {
    let mut buf = [0u8; 8];
    let sign_extend = slice.last().copied().unwrap_or(0) & 0x80 != 0;
    if sign_extend {
        buf = [0xff; 8];
    }
    buf[..slice.len()].copy_from_slice(slice);
    i64::from_le_bytes(buf)
}

fn write_int(value: i64, size: usize) -> Vec<u8> {
    value.to_le_bytes()[..size].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Type;

    #[test]
    fn test_write_then_read_int_roundtrip() {
        let mut mem = Memory::new();
        let int_ty = Type::Scalar(crate::value::lookup_scalar_type("int").unwrap());
        let addr = mem.allocate(int_ty.size());
        mem.write_value(addr, &Value::int(-42));
        assert_eq!(mem.read_value(&int_ty, addr), Value::int(-42));
    }

    #[test]
    fn test_write_then_read_pointer_roundtrip() {
        let mut mem = Memory::new();
        let int_ty = Type::Scalar(crate::value::lookup_scalar_type("int").unwrap());
        let ptr_ty = Type::pointer(int_ty.clone());
        let addr = mem.allocate(ptr_ty.size());
        mem.write_value(addr, &Value::pointer(int_ty.clone(), 12));
        assert_eq!(mem.read_value(&ptr_ty, addr), Value::pointer(int_ty, 12));
    }

    #[test]
    fn test_write_then_read_double_roundtrip() {
        let mut mem = Memory::new();
        let double_ty = Type::Scalar(crate::value::lookup_scalar_type("double").unwrap());
        let addr = mem.allocate(double_ty.size());
        mem.write_value(addr, &Value::Floating(crate::value::lookup_scalar_type("double").unwrap(), 3.5));
        assert_eq!(
            mem.read_value(&double_ty, addr),
            Value::Floating(crate::value::lookup_scalar_type("double").unwrap(), 3.5)
        );
    }
}
