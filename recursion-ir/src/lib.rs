//! # Recursion IR
//!
//! Instruction set and wire format for recursion-verifier constraint
//! programs.
//!
//! A program is a flat list of instructions over three typed symbol
//! domains:
//! - **var**: elements of the native proof-system field
//! - **felt**: elements of the BabyBear field (p = 2^31 - 2^27 + 1)
//! - **ext**: elements of the degree-4 extension `BabyBear[X]/(X^4 - 11)`
//!
//! This crate decodes JSON programs and witnesses into typed form and
//! provides host-side reference arithmetic for both small fields. Compiling
//! a program into constraints is done by `recursion-compiler`.

pub mod error;
pub mod extension;
pub mod field;
pub mod format;
pub mod instruction;
pub mod literal;
pub mod opcode;
pub mod program;
pub mod symbol;
pub mod validation;
pub mod witness;

pub use error::{DecodeError, Result};
pub use extension::{BabyBearExt4, EXT_DEGREE, EXT_W};
pub use field::{BabyBear, BABYBEAR_BITS, BABYBEAR_PRIME};
pub use instruction::{Instruction, FELT_PERMUTATION_WIDTH, NATIVE_PERMUTATION_WIDTH};
pub use literal::NativeLiteral;
pub use opcode::Opcode;
pub use program::{ConstraintRecord, Program};
pub use symbol::{Domain, ExtId, FeltId, Operand, SymbolTable, Symbols, VarId};
pub use validation::{validate, ValidationError, ValidationResult, ValidationWarning};
pub use witness::{Witness, WitnessInput, WitnessShape};
