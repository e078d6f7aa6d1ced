//! Static program checks.
//!
//! Runs over a decoded program without compiling it. Catches issues the
//! compiler would only report one at a time, or not at all:
//! - Reads of symbols never defined earlier in the program
//! - Public commitments that are missing or issued more than once
//! - Symbols that are rebound

use crate::opcode::Opcode;
use crate::program::Program;
use crate::symbol::{Domain, Operand};
use std::collections::HashSet;
use thiserror::Error;

/// Validation error types
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{opcode} at instruction {position} reads undefined {domain} {name:?}")]
    UseBeforeDef {
        position: usize,
        opcode: Opcode,
        domain: Domain,
        name: String,
    },
}

/// Validation warning types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// The program never binds the given public input
    MissingCommitment { opcode: Opcode },

    /// The given public input is bound more than once
    DuplicateCommitment { opcode: Opcode, position: usize },

    /// A symbol is bound again, shadowing its earlier value
    Redefinition {
        position: usize,
        domain: Domain,
        name: String,
    },
}

/// Validation result
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed (no errors)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Validate a whole program
pub fn validate(program: &Program) -> ValidationResult {
    let mut result = ValidationResult::new();
    let mut defined: HashSet<Operand> = HashSet::new();
    let mut commits: [(Opcode, usize); 2] = [
        (Opcode::CommitVkeyHash, 0),
        (Opcode::CommitCommitedValuesDigest, 0),
    ];

    for (position, inst) in program.iter().enumerate() {
        let opcode = inst.opcode();

        for operand in inst.uses() {
            if !defined.contains(&operand) {
                result.errors.push(ValidationError::UseBeforeDef {
                    position,
                    opcode,
                    domain: operand.domain,
                    name: program.symbols.name(operand).to_string(),
                });
                // report each undefined symbol once
                defined.insert(operand);
            }
        }

        // Permute updates its state in place
        let in_place = matches!(opcode, Opcode::Permute | Opcode::PermuteBabyBear);
        for operand in inst.defs() {
            if !defined.insert(operand) && !in_place {
                result.warnings.push(ValidationWarning::Redefinition {
                    position,
                    domain: operand.domain,
                    name: program.symbols.name(operand).to_string(),
                });
            }
        }

        for (commit, count) in commits.iter_mut() {
            if *commit == opcode {
                *count += 1;
                if *count > 1 {
                    result.warnings.push(ValidationWarning::DuplicateCommitment {
                        opcode,
                        position,
                    });
                }
            }
        }
    }

    for (opcode, count) in commits {
        if count == 0 {
            result
                .warnings
                .push(ValidationWarning::MissingCommitment { opcode });
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::ConstraintRecord;

    fn program(records: &[(&str, &[&[&str]])]) -> Program {
        let records: Vec<_> = records
            .iter()
            .map(|(op, args)| ConstraintRecord::new(op, args))
            .collect();
        Program::decode(&records).unwrap()
    }

    #[test]
    fn test_valid_program() {
        let p = program(&[
            ("WitnessV", &[&["v"], &["0"]]),
            ("WitnessV", &[&["d"], &["1"]]),
            ("CommitVkeyHash", &[&["v"]]),
            ("CommitCommitedValuesDigest", &[&["d"]]),
        ]);
        let result = validate(&p);
        assert!(result.is_valid());
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_use_before_def() {
        let p = program(&[
            ("ImmV", &[&["a"], &["1"]]),
            ("AddV", &[&["c"], &["a"], &["b"]]),
            ("MulV", &[&["d"], &["b"], &["b"]]),
        ]);
        let result = validate(&p);
        assert_eq!(
            result.errors,
            vec![ValidationError::UseBeforeDef {
                position: 1,
                opcode: Opcode::AddV,
                domain: Domain::Var,
                name: "b".to_string(),
            }]
        );
    }

    #[test]
    fn test_commitment_warnings() {
        let p = program(&[
            ("ImmV", &[&["a"], &["1"]]),
            ("CommitVkeyHash", &[&["a"]]),
            ("CommitVkeyHash", &[&["a"]]),
        ]);
        let result = validate(&p);
        assert!(result.is_valid());
        assert!(result.warnings.contains(&ValidationWarning::DuplicateCommitment {
            opcode: Opcode::CommitVkeyHash,
            position: 2,
        }));
        assert!(result.warnings.contains(&ValidationWarning::MissingCommitment {
            opcode: Opcode::CommitCommitedValuesDigest,
        }));
    }

    #[test]
    fn test_permute_is_not_redefinition() {
        let p = program(&[
            ("ImmV", &[&["a"], &["1"]]),
            ("ImmV", &[&["b"], &["2"]]),
            ("ImmV", &[&["c"], &["3"]]),
            ("Permute", &[&["a"], &["b"], &["c"]]),
            ("ImmV", &[&["a"], &["4"]]),
        ]);
        let result = validate(&p);
        let redefs: Vec<_> = result
            .warnings
            .iter()
            .filter(|w| matches!(w, ValidationWarning::Redefinition { .. }))
            .collect();
        assert_eq!(redefs.len(), 1);
    }
}
