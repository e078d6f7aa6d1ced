//! Instruction formatting to listing text

use crate::instruction::Instruction;
use crate::symbol::{ExtId, FeltId, Symbols, VarId};

/// Format an instruction with source symbol names
pub fn format(inst: &Instruction, symbols: &Symbols) -> String {
    let v = |id: &VarId| symbols.vars.name(id.index() as u32).to_string();
    let f = |id: &FeltId| symbols.felts.name(id.index() as u32).to_string();
    let e = |id: &ExtId| symbols.exts.name(id.index() as u32).to_string();
    let tag = inst.opcode().tag();

    match inst {
        // ========== Immediate ==========
        Instruction::ImmV { dst, value } => format!("{} {}, {}", tag, v(dst), value),
        Instruction::ImmF { dst, value } => format!("{} {}, {}", tag, f(dst), value),
        Instruction::ImmE { dst, value } => format!("{} {}, {}", tag, e(dst), value),

        // ========== Arithmetic ==========
        Instruction::AddV { dst, lhs, rhs }
        | Instruction::SubV { dst, lhs, rhs }
        | Instruction::MulV { dst, lhs, rhs } => {
            format!("{} {}, {}, {}", tag, v(dst), v(lhs), v(rhs))
        }
        Instruction::AddF { dst, lhs, rhs }
        | Instruction::SubF { dst, lhs, rhs }
        | Instruction::MulF { dst, lhs, rhs } => {
            format!("{} {}, {}, {}", tag, f(dst), f(lhs), f(rhs))
        }
        Instruction::AddE { dst, lhs, rhs }
        | Instruction::SubE { dst, lhs, rhs }
        | Instruction::MulE { dst, lhs, rhs }
        | Instruction::DivE { dst, lhs, rhs } => {
            format!("{} {}, {}, {}", tag, e(dst), e(lhs), e(rhs))
        }
        Instruction::AddEF { dst, lhs, rhs }
        | Instruction::SubEF { dst, lhs, rhs }
        | Instruction::MulEF { dst, lhs, rhs } => {
            format!("{} {}, {}, {}", tag, e(dst), e(lhs), f(rhs))
        }
        Instruction::NegE { dst, src } | Instruction::InvE { dst, src } => {
            format!("{} {}, {}", tag, e(dst), e(src))
        }

        // ========== Bit decomposition ==========
        Instruction::Num2BitsV { bits, value, width } => {
            format!("{} [{}], {}, {}", tag, names(bits.iter().map(v)), v(value), width)
        }
        Instruction::Num2BitsF { bits, value } => {
            format!("{} [{}], {}", tag, names(bits.iter().map(v)), f(value))
        }

        // ========== Permutation ==========
        Instruction::Permute { state } => format!("{} {}", tag, names(state.iter().map(v))),
        Instruction::PermuteBabyBear { state } => {
            format!("{} {}", tag, names(state.iter().map(f)))
        }

        // ========== Select ==========
        Instruction::SelectV { dst, cond, a, b } => {
            format!("{} {}, {} ? {} : {}", tag, v(dst), v(cond), v(a), v(b))
        }
        Instruction::SelectF { dst, cond, a, b } => {
            format!("{} {}, {} ? {} : {}", tag, f(dst), v(cond), f(a), f(b))
        }
        Instruction::SelectE { dst, cond, a, b } => {
            format!("{} {}, {} ? {} : {}", tag, e(dst), v(cond), e(a), e(b))
        }

        // ========== Conversion ==========
        Instruction::Ext2Felt { felts, src } => {
            format!("{} [{}], {}", tag, names(felts.iter().map(f)), e(src))
        }
        Instruction::CircuitFelts2Ext { dst, felts } => {
            format!("{} {}, [{}]", tag, e(dst), names(felts.iter().map(f)))
        }

        // ========== Assertion ==========
        Instruction::AssertEqV { lhs, rhs } => format!("{} {}, {}", tag, v(lhs), v(rhs)),
        Instruction::AssertEqF { lhs, rhs } => format!("{} {}, {}", tag, f(lhs), f(rhs)),
        Instruction::AssertEqE { lhs, rhs } => format!("{} {}, {}", tag, e(lhs), e(rhs)),

        // ========== Debug ==========
        Instruction::PrintV { src } => format!("{} {}", tag, v(src)),
        Instruction::PrintF { src } => format!("{} {}", tag, f(src)),
        Instruction::PrintE { src } => format!("{} {}", tag, e(src)),

        // ========== Witness ==========
        Instruction::WitnessV { dst, index } => format!("{} {}, vars[{}]", tag, v(dst), index),
        Instruction::WitnessF { dst, index } => format!("{} {}, felts[{}]", tag, f(dst), index),
        Instruction::WitnessE { dst, index } => format!("{} {}, exts[{}]", tag, e(dst), index),

        // ========== Public commitment ==========
        Instruction::CommitVkeyHash { src } | Instruction::CommitCommitedValuesDigest { src } => {
            format!("{} {}", tag, v(src))
        }
    }
}

fn names(iter: impl Iterator<Item = String>) -> String {
    iter.collect::<Vec<_>>().join(", ")
}
