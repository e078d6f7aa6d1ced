//! Recursion IR Instruction Set
//!
//! Decoded, typed instructions. Operands are interned symbol ids; literals
//! are parsed and validated at decode time.

use crate::extension::BabyBearExt4;
use crate::field::BabyBear;
use crate::literal::NativeLiteral;
use crate::opcode::Opcode;
use crate::symbol::{ExtId, FeltId, Operand, VarId};

/// Width of the native permutation state
pub const NATIVE_PERMUTATION_WIDTH: usize = 3;

/// Width of the BabyBear permutation state
pub const FELT_PERMUTATION_WIDTH: usize = 16;

/// Recursion IR instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    // ========== Immediate ==========
    /// IMMV: dst = literal
    ImmV { dst: VarId, value: NativeLiteral },

    /// IMMF: dst = felt literal
    ImmF { dst: FeltId, value: BabyBear },

    /// IMME: dst = ext literal
    ImmE { dst: ExtId, value: BabyBearExt4 },

    // ========== Native arithmetic ==========
    AddV { dst: VarId, lhs: VarId, rhs: VarId },
    SubV { dst: VarId, lhs: VarId, rhs: VarId },
    MulV { dst: VarId, lhs: VarId, rhs: VarId },

    // ========== Felt arithmetic ==========
    AddF { dst: FeltId, lhs: FeltId, rhs: FeltId },
    SubF { dst: FeltId, lhs: FeltId, rhs: FeltId },
    MulF { dst: FeltId, lhs: FeltId, rhs: FeltId },

    // ========== Extension arithmetic ==========
    AddE { dst: ExtId, lhs: ExtId, rhs: ExtId },
    SubE { dst: ExtId, lhs: ExtId, rhs: ExtId },
    MulE { dst: ExtId, lhs: ExtId, rhs: ExtId },
    /// DIVE: dst = lhs / rhs, fails when rhs is zero
    DivE { dst: ExtId, lhs: ExtId, rhs: ExtId },
    NegE { dst: ExtId, src: ExtId },
    /// INVE: dst = 1 / src, fails when src is zero
    InvE { dst: ExtId, src: ExtId },

    // ========== Mixed extension / felt ==========
    AddEF { dst: ExtId, lhs: ExtId, rhs: FeltId },
    SubEF { dst: ExtId, lhs: ExtId, rhs: FeltId },
    MulEF { dst: ExtId, lhs: ExtId, rhs: FeltId },

    // ========== Bit decomposition ==========
    /// NUM2BITSV: bits = value as `width` boolean vars
    Num2BitsV {
        bits: Vec<VarId>,
        value: VarId,
        width: usize,
    },

    /// NUM2BITSF: bits = canonical felt bits
    Num2BitsF { bits: Vec<VarId>, value: FeltId },

    // ========== Permutation ==========
    Permute {
        state: [VarId; NATIVE_PERMUTATION_WIDTH],
    },
    PermuteBabyBear {
        state: [FeltId; FELT_PERMUTATION_WIDTH],
    },

    // ========== Select ==========
    /// SELECTV: dst = cond ? a : b
    SelectV {
        dst: VarId,
        cond: VarId,
        a: VarId,
        b: VarId,
    },
    SelectF {
        dst: FeltId,
        cond: VarId,
        a: FeltId,
        b: FeltId,
    },
    SelectE {
        dst: ExtId,
        cond: VarId,
        a: ExtId,
        b: ExtId,
    },

    // ========== Conversion ==========
    Ext2Felt { felts: [FeltId; 4], src: ExtId },
    CircuitFelts2Ext { dst: ExtId, felts: [FeltId; 4] },

    // ========== Assertion ==========
    AssertEqV { lhs: VarId, rhs: VarId },
    AssertEqF { lhs: FeltId, rhs: FeltId },
    AssertEqE { lhs: ExtId, rhs: ExtId },

    // ========== Debug ==========
    PrintV { src: VarId },
    PrintF { src: FeltId },
    PrintE { src: ExtId },

    // ========== Witness ==========
    WitnessV { dst: VarId, index: usize },
    WitnessF { dst: FeltId, index: usize },
    WitnessE { dst: ExtId, index: usize },

    // ========== Public commitment ==========
    CommitVkeyHash { src: VarId },
    CommitCommitedValuesDigest { src: VarId },
}

impl Instruction {
    /// Opcode tag of this instruction
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::ImmV { .. } => Opcode::ImmV,
            Instruction::ImmF { .. } => Opcode::ImmF,
            Instruction::ImmE { .. } => Opcode::ImmE,
            Instruction::AddV { .. } => Opcode::AddV,
            Instruction::SubV { .. } => Opcode::SubV,
            Instruction::MulV { .. } => Opcode::MulV,
            Instruction::AddF { .. } => Opcode::AddF,
            Instruction::SubF { .. } => Opcode::SubF,
            Instruction::MulF { .. } => Opcode::MulF,
            Instruction::AddE { .. } => Opcode::AddE,
            Instruction::SubE { .. } => Opcode::SubE,
            Instruction::MulE { .. } => Opcode::MulE,
            Instruction::DivE { .. } => Opcode::DivE,
            Instruction::NegE { .. } => Opcode::NegE,
            Instruction::InvE { .. } => Opcode::InvE,
            Instruction::AddEF { .. } => Opcode::AddEF,
            Instruction::SubEF { .. } => Opcode::SubEF,
            Instruction::MulEF { .. } => Opcode::MulEF,
            Instruction::Num2BitsV { .. } => Opcode::Num2BitsV,
            Instruction::Num2BitsF { .. } => Opcode::Num2BitsF,
            Instruction::Permute { .. } => Opcode::Permute,
            Instruction::PermuteBabyBear { .. } => Opcode::PermuteBabyBear,
            Instruction::SelectV { .. } => Opcode::SelectV,
            Instruction::SelectF { .. } => Opcode::SelectF,
            Instruction::SelectE { .. } => Opcode::SelectE,
            Instruction::Ext2Felt { .. } => Opcode::Ext2Felt,
            Instruction::CircuitFelts2Ext { .. } => Opcode::CircuitFelts2Ext,
            Instruction::AssertEqV { .. } => Opcode::AssertEqV,
            Instruction::AssertEqF { .. } => Opcode::AssertEqF,
            Instruction::AssertEqE { .. } => Opcode::AssertEqE,
            Instruction::PrintV { .. } => Opcode::PrintV,
            Instruction::PrintF { .. } => Opcode::PrintF,
            Instruction::PrintE { .. } => Opcode::PrintE,
            Instruction::WitnessV { .. } => Opcode::WitnessV,
            Instruction::WitnessF { .. } => Opcode::WitnessF,
            Instruction::WitnessE { .. } => Opcode::WitnessE,
            Instruction::CommitVkeyHash { .. } => Opcode::CommitVkeyHash,
            Instruction::CommitCommitedValuesDigest { .. } => Opcode::CommitCommitedValuesDigest,
        }
    }

    /// Symbols read by this instruction, in argument order
    pub fn uses(&self) -> Vec<Operand> {
        match self {
            Instruction::ImmV { .. }
            | Instruction::ImmF { .. }
            | Instruction::ImmE { .. }
            | Instruction::WitnessV { .. }
            | Instruction::WitnessF { .. }
            | Instruction::WitnessE { .. } => vec![],

            Instruction::AddV { lhs, rhs, .. }
            | Instruction::SubV { lhs, rhs, .. }
            | Instruction::MulV { lhs, rhs, .. }
            | Instruction::AssertEqV { lhs, rhs } => vec![(*lhs).into(), (*rhs).into()],

            Instruction::AddF { lhs, rhs, .. }
            | Instruction::SubF { lhs, rhs, .. }
            | Instruction::MulF { lhs, rhs, .. }
            | Instruction::AssertEqF { lhs, rhs } => vec![(*lhs).into(), (*rhs).into()],

            Instruction::AddE { lhs, rhs, .. }
            | Instruction::SubE { lhs, rhs, .. }
            | Instruction::MulE { lhs, rhs, .. }
            | Instruction::DivE { lhs, rhs, .. }
            | Instruction::AssertEqE { lhs, rhs } => vec![(*lhs).into(), (*rhs).into()],

            Instruction::AddEF { lhs, rhs, .. }
            | Instruction::SubEF { lhs, rhs, .. }
            | Instruction::MulEF { lhs, rhs, .. } => vec![(*lhs).into(), (*rhs).into()],

            Instruction::NegE { src, .. } | Instruction::InvE { src, .. } => vec![(*src).into()],

            Instruction::Num2BitsV { value, .. } => vec![(*value).into()],
            Instruction::Num2BitsF { value, .. } => vec![(*value).into()],

            Instruction::Permute { state } => state.iter().map(|&s| s.into()).collect(),
            Instruction::PermuteBabyBear { state } => state.iter().map(|&s| s.into()).collect(),

            Instruction::SelectV { cond, a, b, .. } => {
                vec![(*cond).into(), (*a).into(), (*b).into()]
            }
            Instruction::SelectF { cond, a, b, .. } => {
                vec![(*cond).into(), (*a).into(), (*b).into()]
            }
            Instruction::SelectE { cond, a, b, .. } => {
                vec![(*cond).into(), (*a).into(), (*b).into()]
            }

            Instruction::Ext2Felt { src, .. } => vec![(*src).into()],
            Instruction::CircuitFelts2Ext { felts, .. } => {
                felts.iter().map(|&f| f.into()).collect()
            }

            Instruction::PrintV { src }
            | Instruction::CommitVkeyHash { src }
            | Instruction::CommitCommitedValuesDigest { src } => vec![(*src).into()],
            Instruction::PrintF { src } => vec![(*src).into()],
            Instruction::PrintE { src } => vec![(*src).into()],
        }
    }

    /// Symbols written by this instruction
    pub fn defs(&self) -> Vec<Operand> {
        match self {
            Instruction::ImmV { dst, .. }
            | Instruction::AddV { dst, .. }
            | Instruction::SubV { dst, .. }
            | Instruction::MulV { dst, .. }
            | Instruction::SelectV { dst, .. }
            | Instruction::WitnessV { dst, .. } => vec![(*dst).into()],

            Instruction::ImmF { dst, .. }
            | Instruction::AddF { dst, .. }
            | Instruction::SubF { dst, .. }
            | Instruction::MulF { dst, .. }
            | Instruction::SelectF { dst, .. }
            | Instruction::WitnessF { dst, .. } => vec![(*dst).into()],

            Instruction::ImmE { dst, .. }
            | Instruction::AddE { dst, .. }
            | Instruction::SubE { dst, .. }
            | Instruction::MulE { dst, .. }
            | Instruction::DivE { dst, .. }
            | Instruction::NegE { dst, .. }
            | Instruction::InvE { dst, .. }
            | Instruction::AddEF { dst, .. }
            | Instruction::SubEF { dst, .. }
            | Instruction::MulEF { dst, .. }
            | Instruction::SelectE { dst, .. }
            | Instruction::CircuitFelts2Ext { dst, .. }
            | Instruction::WitnessE { dst, .. } => vec![(*dst).into()],

            Instruction::Num2BitsV { bits, .. } | Instruction::Num2BitsF { bits, .. } => {
                bits.iter().map(|&b| b.into()).collect()
            }

            Instruction::Permute { state } => state.iter().map(|&s| s.into()).collect(),
            Instruction::PermuteBabyBear { state } => state.iter().map(|&s| s.into()).collect(),

            Instruction::Ext2Felt { felts, .. } => felts.iter().map(|&f| f.into()).collect(),

            Instruction::AssertEqV { .. }
            | Instruction::AssertEqF { .. }
            | Instruction::AssertEqE { .. }
            | Instruction::PrintV { .. }
            | Instruction::PrintF { .. }
            | Instruction::PrintE { .. }
            | Instruction::CommitVkeyHash { .. }
            | Instruction::CommitCommitedValuesDigest { .. } => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Domain;

    #[test]
    fn test_opcode_mapping() {
        let inst = Instruction::AddV {
            dst: VarId::new(2),
            lhs: VarId::new(0),
            rhs: VarId::new(1),
        };
        assert_eq!(inst.opcode(), Opcode::AddV);

        let inst = Instruction::CommitCommitedValuesDigest { src: VarId::new(0) };
        assert_eq!(inst.opcode(), Opcode::CommitCommitedValuesDigest);
    }

    #[test]
    fn test_uses_and_defs() {
        let inst = Instruction::SelectF {
            dst: FeltId::new(3),
            cond: VarId::new(0),
            a: FeltId::new(1),
            b: FeltId::new(2),
        };
        let uses = inst.uses();
        assert_eq!(uses.len(), 3);
        assert_eq!(uses[0].domain, Domain::Var);
        assert_eq!(uses[1].domain, Domain::Felt);
        assert_eq!(inst.defs(), vec![FeltId::new(3).into()]);
    }

    #[test]
    fn test_permute_reads_and_writes_state() {
        let state = [VarId::new(0), VarId::new(1), VarId::new(2)];
        let inst = Instruction::Permute { state };
        assert_eq!(inst.uses(), inst.defs());
    }

    #[test]
    fn test_assertions_define_nothing() {
        let inst = Instruction::AssertEqE {
            lhs: ExtId::new(0),
            rhs: ExtId::new(1),
        };
        assert!(inst.defs().is_empty());
        assert_eq!(inst.uses().len(), 2);
    }
}
