//! # Error Types for the Recursion IR

use crate::opcode::Opcode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Unsupported opcode {tag:?} at instruction {position}")]
    UnsupportedOpcode { position: usize, tag: String },

    #[error("Malformed arguments for {opcode} at instruction {position}: {reason}")]
    MalformedArgs {
        position: usize,
        opcode: Opcode,
        reason: String,
    },

    #[error("Invalid literal {token:?} for {opcode} at instruction {position}")]
    InvalidLiteral {
        position: usize,
        opcode: Opcode,
        token: String,
    },

    #[error("Invalid witness value {token:?} at {field}[{index}]")]
    InvalidWitness {
        field: &'static str,
        index: usize,
        token: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    /// Position of the offending instruction, if the error is tied to one
    pub fn position(&self) -> Option<usize> {
        match self {
            DecodeError::UnsupportedOpcode { position, .. }
            | DecodeError::MalformedArgs { position, .. }
            | DecodeError::InvalidLiteral { position, .. } => Some(*position),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
