//! Compiler error types

use crate::backend::BackendError;
use crate::witness::BindError;
use ark_relations::r1cs::SynthesisError;
use recursion_ir::{DecodeError, Domain, Opcode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("{opcode} at instruction {position}: undefined {domain} {name:?}")]
    UndefinedSymbol {
        position: usize,
        opcode: Opcode,
        domain: Domain,
        name: String,
    },

    #[error(
        "{opcode} at instruction {position}: {domain} witness index {index} out of range (length {len})"
    )]
    WitnessIndexOutOfRange {
        position: usize,
        opcode: Opcode,
        domain: Domain,
        index: usize,
        len: usize,
    },

    #[error("{opcode} at instruction {position}: arithmetic failure: {reason}")]
    ArithmeticFailure {
        position: usize,
        opcode: Opcode,
        reason: String,
    },

    #[error("{opcode} at instruction {position}: constraint synthesis failed: {source}")]
    Synthesis {
        position: usize,
        opcode: Opcode,
        #[source]
        source: SynthesisError,
    },

    #[error("Public input allocation failed: {0}")]
    PublicInput(#[source] BackendError),
}

impl CompileError {
    /// Wrap a backend failure with the instruction it came from
    pub fn from_backend(position: usize, opcode: Opcode, err: BackendError) -> Self {
        match err {
            BackendError::Synthesis(source) => CompileError::Synthesis {
                position,
                opcode,
                source,
            },
            other => CompileError::ArithmeticFailure {
                position,
                opcode,
                reason: other.to_string(),
            },
        }
    }

    /// Wrap a witness binding failure with the instruction it came from
    pub fn from_bind(position: usize, opcode: Opcode, err: BindError) -> Self {
        match err {
            BindError::OutOfRange { domain, index, len } => CompileError::WitnessIndexOutOfRange {
                position,
                opcode,
                domain,
                index,
                len,
            },
            BindError::Backend(err) => CompileError::from_backend(position, opcode, err),
        }
    }

    pub fn position(&self) -> Option<usize> {
        match self {
            CompileError::Decode(err) => err.position(),
            CompileError::UndefinedSymbol { position, .. }
            | CompileError::WitnessIndexOutOfRange { position, .. }
            | CompileError::ArithmeticFailure { position, .. }
            | CompileError::Synthesis { position, .. } => Some(*position),
            CompileError::PublicInput(_) => None,
        }
    }

    pub fn opcode(&self) -> Option<Opcode> {
        match self {
            CompileError::Decode(DecodeError::MalformedArgs { opcode, .. })
            | CompileError::Decode(DecodeError::InvalidLiteral { opcode, .. }) => Some(*opcode),
            CompileError::UndefinedSymbol { opcode, .. }
            | CompileError::WitnessIndexOutOfRange { opcode, .. }
            | CompileError::ArithmeticFailure { opcode, .. }
            | CompileError::Synthesis { opcode, .. } => Some(*opcode),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_symbol_display() {
        let err = CompileError::UndefinedSymbol {
            position: 4,
            opcode: Opcode::AddV,
            domain: Domain::Var,
            name: "b".to_string(),
        };
        assert_eq!(err.to_string(), "AddV at instruction 4: undefined var \"b\"");
        assert_eq!(err.position(), Some(4));
        assert_eq!(err.opcode(), Some(Opcode::AddV));
    }

    #[test]
    fn test_witness_index_display() {
        let err = CompileError::WitnessIndexOutOfRange {
            position: 0,
            opcode: Opcode::WitnessV,
            domain: Domain::Var,
            index: 99,
            len: 3,
        };
        assert_eq!(
            err.to_string(),
            "WitnessV at instruction 0: var witness index 99 out of range (length 3)"
        );
    }

    #[test]
    fn test_from_backend() {
        let err = CompileError::from_backend(
            2,
            Opcode::InvE,
            BackendError::ArithmeticFailure("inverse of zero".to_string()),
        );
        assert!(matches!(
            err,
            CompileError::ArithmeticFailure { position: 2, opcode: Opcode::InvE, .. }
        ));

        let err = CompileError::from_backend(
            5,
            Opcode::MulV,
            BackendError::Synthesis(SynthesisError::AssignmentMissing),
        );
        assert!(matches!(err, CompileError::Synthesis { position: 5, .. }));
    }

    #[test]
    fn test_from_bind() {
        let err = CompileError::from_bind(
            7,
            Opcode::WitnessF,
            BindError::OutOfRange {
                domain: Domain::Felt,
                index: 4,
                len: 2,
            },
        );
        assert!(matches!(
            err,
            CompileError::WitnessIndexOutOfRange { position: 7, index: 4, len: 2, .. }
        ));
    }

    #[test]
    fn test_decode_position_passthrough() {
        let err = CompileError::from(DecodeError::UnsupportedOpcode {
            position: 3,
            tag: "Frobnicate".to_string(),
        });
        assert_eq!(err.position(), Some(3));
        assert_eq!(err.opcode(), None);
        assert!(err.to_string().contains("Frobnicate"));
    }
}
