//! # Recursion IR Opcode Tags
//!
//! Opcodes are identified on the wire by their string tag (e.g. `"AddV"`).
//! The suffix names the operand domain:
//! - `V`: native proof-system field value
//! - `F`: BabyBear felt
//! - `E`: degree-4 extension element
//! - `EF`: extension combined with a felt

use serde::{Deserialize, Serialize};
use std::fmt;

/// Instruction opcode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    // ========== Immediate ==========
    ImmV,
    ImmF,
    ImmE,

    // ========== Arithmetic ==========
    AddV,
    AddF,
    AddE,
    AddEF,
    SubV,
    SubF,
    SubE,
    SubEF,
    MulV,
    MulF,
    MulE,
    MulEF,

    // ========== Extension-only ==========
    DivE,
    NegE,
    InvE,

    // ========== Bit decomposition ==========
    Num2BitsV,
    Num2BitsF,

    // ========== Permutation ==========
    Permute,
    PermuteBabyBear,

    // ========== Select ==========
    SelectV,
    SelectF,
    SelectE,

    // ========== Conversion ==========
    Ext2Felt,
    CircuitFelts2Ext,

    // ========== Assertion ==========
    AssertEqV,
    AssertEqF,
    AssertEqE,

    // ========== Debug ==========
    PrintV,
    PrintF,
    PrintE,

    // ========== Witness ==========
    WitnessV,
    WitnessF,
    WitnessE,

    // ========== Public commitment ==========
    CommitVkeyHash,
    CommitCommitedValuesDigest,
}

impl Opcode {
    /// Every opcode, in declaration order
    pub const ALL: [Opcode; 38] = [
        Opcode::ImmV,
        Opcode::ImmF,
        Opcode::ImmE,
        Opcode::AddV,
        Opcode::AddF,
        Opcode::AddE,
        Opcode::AddEF,
        Opcode::SubV,
        Opcode::SubF,
        Opcode::SubE,
        Opcode::SubEF,
        Opcode::MulV,
        Opcode::MulF,
        Opcode::MulE,
        Opcode::MulEF,
        Opcode::DivE,
        Opcode::NegE,
        Opcode::InvE,
        Opcode::Num2BitsV,
        Opcode::Num2BitsF,
        Opcode::Permute,
        Opcode::PermuteBabyBear,
        Opcode::SelectV,
        Opcode::SelectF,
        Opcode::SelectE,
        Opcode::Ext2Felt,
        Opcode::CircuitFelts2Ext,
        Opcode::AssertEqV,
        Opcode::AssertEqF,
        Opcode::AssertEqE,
        Opcode::PrintV,
        Opcode::PrintF,
        Opcode::PrintE,
        Opcode::WitnessV,
        Opcode::WitnessF,
        Opcode::WitnessE,
        Opcode::CommitVkeyHash,
        Opcode::CommitCommitedValuesDigest,
    ];

    /// Look up an opcode by its wire tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.tag() == tag)
    }

    /// Wire tag of this opcode
    pub const fn tag(self) -> &'static str {
        match self {
            Opcode::ImmV => "ImmV",
            Opcode::ImmF => "ImmF",
            Opcode::ImmE => "ImmE",
            Opcode::AddV => "AddV",
            Opcode::AddF => "AddF",
            Opcode::AddE => "AddE",
            Opcode::AddEF => "AddEF",
            Opcode::SubV => "SubV",
            Opcode::SubF => "SubF",
            Opcode::SubE => "SubE",
            Opcode::SubEF => "SubEF",
            Opcode::MulV => "MulV",
            Opcode::MulF => "MulF",
            Opcode::MulE => "MulE",
            Opcode::MulEF => "MulEF",
            Opcode::DivE => "DivE",
            Opcode::NegE => "NegE",
            Opcode::InvE => "InvE",
            Opcode::Num2BitsV => "Num2BitsV",
            Opcode::Num2BitsF => "Num2BitsF",
            Opcode::Permute => "Permute",
            Opcode::PermuteBabyBear => "PermuteBabyBear",
            Opcode::SelectV => "SelectV",
            Opcode::SelectF => "SelectF",
            Opcode::SelectE => "SelectE",
            Opcode::Ext2Felt => "Ext2Felt",
            Opcode::CircuitFelts2Ext => "CircuitFelts2Ext",
            Opcode::AssertEqV => "AssertEqV",
            Opcode::AssertEqF => "AssertEqF",
            Opcode::AssertEqE => "AssertEqE",
            Opcode::PrintV => "PrintV",
            Opcode::PrintF => "PrintF",
            Opcode::PrintE => "PrintE",
            Opcode::WitnessV => "WitnessV",
            Opcode::WitnessF => "WitnessF",
            Opcode::WitnessE => "WitnessE",
            Opcode::CommitVkeyHash => "CommitVkeyHash",
            Opcode::CommitCommitedValuesDigest => "CommitCommitedValuesDigest",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
