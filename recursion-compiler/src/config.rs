//! Compiler configuration

use crate::r1cs::poseidon2::Poseidon2Params;

/// What the compiled constraint system is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompileMode {
    /// Assign every variable from the witness
    #[default]
    Prove,

    /// Build only the constraint structure; witness values are never read
    Shape,
}

/// Compiler configuration
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    pub mode: CompileMode,

    /// Log every instruction at trace level
    pub trace: bool,

    /// Run the program lint before compiling and log its warnings
    pub lint: bool,

    /// Round constants for both permutation instances
    pub poseidon2: Poseidon2Params,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            mode: CompileMode::Prove,
            trace: false,
            lint: true,
            poseidon2: Poseidon2Params::default(),
        }
    }
}

impl CompilerConfig {
    pub fn shape() -> Self {
        Self {
            mode: CompileMode::Shape,
            ..Self::default()
        }
    }
}
