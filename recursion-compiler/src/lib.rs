//! # Recursion Compiler
//!
//! Compiles recursion IR programs into rank-1 constraint systems over BN254.
//!
//! ## Usage
//!
//! ```no_run
//! use recursion_compiler::{Compiler, CompilerConfig};
//! use recursion_ir::{Program, Witness};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let program = Program::from_json(&std::fs::read_to_string("constraints.json")?)?;
//! let witness = Witness::from_json(&std::fs::read_to_string("witness.json")?)?;
//!
//! let circuit = Compiler::new(CompilerConfig::default()).compile(&program, &witness)?;
//! println!("{} constraints", circuit.num_constraints());
//! assert!(circuit.is_satisfied()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Structure
//!
//! - [`execute`]: the per-instruction interpreter, generic over a
//!   [`CircuitBuilder`]
//! - [`r1cs`]: the BN254 backend, with emulated BabyBear and extension
//!   arithmetic and both Poseidon2 permutations
//! - [`compile`]: the driver tying a program, a witness and a backend
//!   together

pub mod backend;
pub mod compile;
pub mod config;
pub mod env;
pub mod error;
pub mod execute;
pub mod r1cs;
pub mod witness;

pub use backend::{BackendError, BackendResult, BitOrder, CircuitBuilder};
pub use compile::{CircuitStats, CompiledCircuit, Compiler};
pub use config::{CompileMode, CompilerConfig};
pub use error::{CompileError, Result};
pub use r1cs::poseidon2::Poseidon2Params;
pub use r1cs::R1csBuilder;
