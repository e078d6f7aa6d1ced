//! # Program Structure
//!
//! Wire records and the decoded program.
//!
//! Wire format (JSON):
//! ```text
//! [
//!   { "opcode": "ImmV", "args": [["a"], ["5"]] },
//!   { "opcode": "AddV", "args": [["c"], ["a"], ["b"]] },
//!   ...
//! ]
//! ```
//!
//! Decoding runs once, before any compilation: opcode tags are resolved,
//! argument shapes and literals are validated, and symbol names are interned
//! per domain.

use crate::error::{DecodeError, Result};
use crate::extension::BabyBearExt4;
use crate::field::{BabyBear, BABYBEAR_BITS};
use crate::instruction::{Instruction, FELT_PERMUTATION_WIDTH, NATIVE_PERMUTATION_WIDTH};
use crate::literal::{parse_usize, NativeLiteral};
use crate::opcode::Opcode;
use crate::symbol::Symbols;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;

/// One serialized instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintRecord {
    pub opcode: String,
    pub args: Vec<Vec<String>>,
}

impl ConstraintRecord {
    pub fn new(opcode: &str, args: &[&[&str]]) -> Self {
        Self {
            opcode: opcode.to_string(),
            args: args
                .iter()
                .map(|group| group.iter().map(|t| t.to_string()).collect())
                .collect(),
        }
    }
}

/// A decoded straight-line program
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    pub symbols: Symbols,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode wire records into typed instructions.
    ///
    /// Fails on the first record with an unknown tag, a malformed argument
    /// layout, or an invalid literal.
    pub fn decode(records: &[ConstraintRecord]) -> Result<Self> {
        let mut symbols = Symbols::new();
        let instructions = records
            .iter()
            .enumerate()
            .map(|(position, record)| decode_record(position, record, &mut symbols))
            .collect::<Result<Vec<_>>>()?;
        Ok(Program {
            instructions,
            symbols,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<ConstraintRecord> = serde_json::from_str(json)?;
        Self::decode(&records)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let records: Vec<ConstraintRecord> = serde_json::from_reader(reader)?;
        Self::decode(&records)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }

    /// Human-readable listing of the program
    pub fn listing(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, inst) in self.instructions.iter().enumerate() {
            writeln!(
                f,
                "{:6}  {}",
                position,
                crate::format::format(inst, &self.symbols)
            )?;
        }
        Ok(())
    }
}

/// Argument-group accessor for a single record
struct Args<'a> {
    position: usize,
    opcode: Opcode,
    groups: &'a [Vec<String>],
}

impl<'a> Args<'a> {
    fn malformed(&self, reason: String) -> DecodeError {
        DecodeError::MalformedArgs {
            position: self.position,
            opcode: self.opcode,
            reason,
        }
    }

    fn invalid(&self, token: &str) -> DecodeError {
        DecodeError::InvalidLiteral {
            position: self.position,
            opcode: self.opcode,
            token: token.to_string(),
        }
    }

    fn expect_groups(&self, count: usize) -> Result<()> {
        if self.groups.len() != count {
            return Err(self.malformed(format!(
                "expected {} argument groups, found {}",
                count,
                self.groups.len()
            )));
        }
        Ok(())
    }

    fn group(&self, i: usize) -> Result<&'a [String]> {
        let group = &self.groups[i];
        if group.is_empty() {
            return Err(self.malformed(format!("argument group {} is empty", i)));
        }
        Ok(group)
    }

    /// Group `i`, which may be empty
    fn list(&self, i: usize) -> &'a [String] {
        &self.groups[i]
    }

    /// The only token of group `i`
    fn single(&self, i: usize) -> Result<&'a str> {
        let group = self.group(i)?;
        if group.len() != 1 {
            return Err(self.malformed(format!(
                "argument group {} must hold one token, found {}",
                i,
                group.len()
            )));
        }
        Ok(&group[0])
    }

    fn native(&self, i: usize) -> Result<NativeLiteral> {
        let token = self.single(i)?;
        NativeLiteral::parse(token).ok_or_else(|| self.invalid(token))
    }

    fn felt(&self, token: &str) -> Result<BabyBear> {
        BabyBear::from_decimal(token).ok_or_else(|| self.invalid(token))
    }

    fn index(&self, i: usize) -> Result<usize> {
        let token = self.single(i)?;
        parse_usize(token).ok_or_else(|| self.invalid(token))
    }
}

fn decode_record(
    position: usize,
    record: &ConstraintRecord,
    symbols: &mut Symbols,
) -> Result<Instruction> {
    let opcode =
        Opcode::from_tag(&record.opcode).ok_or_else(|| DecodeError::UnsupportedOpcode {
            position,
            tag: record.opcode.clone(),
        })?;
    let args = Args {
        position,
        opcode,
        groups: &record.args,
    };

    let inst = match opcode {
        // ========== Immediate ==========
        Opcode::ImmV => {
            args.expect_groups(2)?;
            Instruction::ImmV {
                dst: symbols.var(args.single(0)?),
                value: args.native(1)?,
            }
        }
        Opcode::ImmF => {
            args.expect_groups(2)?;
            Instruction::ImmF {
                dst: symbols.felt(args.single(0)?),
                value: args.felt(args.single(1)?)?,
            }
        }
        Opcode::ImmE => {
            args.expect_groups(2)?;
            let dst = symbols.ext(args.single(0)?);
            let coords = args.group(1)?;
            if coords.len() != 4 {
                return Err(args.malformed(format!(
                    "extension literal needs 4 coordinates, found {}",
                    coords.len()
                )));
            }
            let mut value = [BabyBear::ZERO; 4];
            for (slot, token) in value.iter_mut().zip(coords) {
                *slot = args.felt(token)?;
            }
            Instruction::ImmE {
                dst,
                value: BabyBearExt4::new(value),
            }
        }

        // ========== Binary arithmetic ==========
        Opcode::AddV | Opcode::SubV | Opcode::MulV => {
            args.expect_groups(3)?;
            let dst = symbols.var(args.single(0)?);
            let lhs = symbols.var(args.single(1)?);
            let rhs = symbols.var(args.single(2)?);
            match opcode {
                Opcode::AddV => Instruction::AddV { dst, lhs, rhs },
                Opcode::SubV => Instruction::SubV { dst, lhs, rhs },
                _ => Instruction::MulV { dst, lhs, rhs },
            }
        }
        Opcode::AddF | Opcode::SubF | Opcode::MulF => {
            args.expect_groups(3)?;
            let dst = symbols.felt(args.single(0)?);
            let lhs = symbols.felt(args.single(1)?);
            let rhs = symbols.felt(args.single(2)?);
            match opcode {
                Opcode::AddF => Instruction::AddF { dst, lhs, rhs },
                Opcode::SubF => Instruction::SubF { dst, lhs, rhs },
                _ => Instruction::MulF { dst, lhs, rhs },
            }
        }
        Opcode::AddE | Opcode::SubE | Opcode::MulE | Opcode::DivE => {
            args.expect_groups(3)?;
            let dst = symbols.ext(args.single(0)?);
            let lhs = symbols.ext(args.single(1)?);
            let rhs = symbols.ext(args.single(2)?);
            match opcode {
                Opcode::AddE => Instruction::AddE { dst, lhs, rhs },
                Opcode::SubE => Instruction::SubE { dst, lhs, rhs },
                Opcode::MulE => Instruction::MulE { dst, lhs, rhs },
                _ => Instruction::DivE { dst, lhs, rhs },
            }
        }
        Opcode::AddEF | Opcode::SubEF | Opcode::MulEF => {
            args.expect_groups(3)?;
            let dst = symbols.ext(args.single(0)?);
            let lhs = symbols.ext(args.single(1)?);
            let rhs = symbols.felt(args.single(2)?);
            match opcode {
                Opcode::AddEF => Instruction::AddEF { dst, lhs, rhs },
                Opcode::SubEF => Instruction::SubEF { dst, lhs, rhs },
                _ => Instruction::MulEF { dst, lhs, rhs },
            }
        }
        Opcode::NegE | Opcode::InvE => {
            args.expect_groups(2)?;
            let dst = symbols.ext(args.single(0)?);
            let src = symbols.ext(args.single(1)?);
            if opcode == Opcode::NegE {
                Instruction::NegE { dst, src }
            } else {
                Instruction::InvE { dst, src }
            }
        }

        // ========== Bit decomposition ==========
        Opcode::Num2BitsV => {
            args.expect_groups(3)?;
            // empty exactly when the width is zero
            let names = args.list(0);
            let value = symbols.var(args.single(1)?);
            let width = args.index(2)?;
            if names.len() != width {
                return Err(args.malformed(format!(
                    "{} output names for a {}-bit decomposition",
                    names.len(),
                    width
                )));
            }
            Instruction::Num2BitsV {
                bits: names.iter().map(|n| symbols.var(n)).collect(),
                value,
                width,
            }
        }
        Opcode::Num2BitsF => {
            args.expect_groups(2)?;
            let names = args.group(0)?;
            if names.len() != BABYBEAR_BITS {
                return Err(args.malformed(format!(
                    "{} output names for a {}-bit felt decomposition",
                    names.len(),
                    BABYBEAR_BITS
                )));
            }
            let bits = names.iter().map(|n| symbols.var(n)).collect();
            Instruction::Num2BitsF {
                bits,
                value: symbols.felt(args.single(1)?),
            }
        }

        // ========== Permutation ==========
        Opcode::Permute => {
            args.expect_groups(NATIVE_PERMUTATION_WIDTH)?;
            let mut state = [crate::symbol::VarId::new(0); NATIVE_PERMUTATION_WIDTH];
            for (i, slot) in state.iter_mut().enumerate() {
                *slot = symbols.var(args.single(i)?);
            }
            Instruction::Permute { state }
        }
        Opcode::PermuteBabyBear => {
            args.expect_groups(FELT_PERMUTATION_WIDTH)?;
            let mut state = [crate::symbol::FeltId::new(0); FELT_PERMUTATION_WIDTH];
            for (i, slot) in state.iter_mut().enumerate() {
                *slot = symbols.felt(args.single(i)?);
            }
            Instruction::PermuteBabyBear { state }
        }

        // ========== Select ==========
        Opcode::SelectV => {
            args.expect_groups(4)?;
            Instruction::SelectV {
                dst: symbols.var(args.single(0)?),
                cond: symbols.var(args.single(1)?),
                a: symbols.var(args.single(2)?),
                b: symbols.var(args.single(3)?),
            }
        }
        Opcode::SelectF => {
            args.expect_groups(4)?;
            Instruction::SelectF {
                dst: symbols.felt(args.single(0)?),
                cond: symbols.var(args.single(1)?),
                a: symbols.felt(args.single(2)?),
                b: symbols.felt(args.single(3)?),
            }
        }
        Opcode::SelectE => {
            args.expect_groups(4)?;
            Instruction::SelectE {
                dst: symbols.ext(args.single(0)?),
                cond: symbols.var(args.single(1)?),
                a: symbols.ext(args.single(2)?),
                b: symbols.ext(args.single(3)?),
            }
        }

        // ========== Conversion ==========
        Opcode::Ext2Felt => {
            args.expect_groups(5)?;
            let mut felts = [crate::symbol::FeltId::new(0); 4];
            for (i, slot) in felts.iter_mut().enumerate() {
                *slot = symbols.felt(args.single(i)?);
            }
            Instruction::Ext2Felt {
                felts,
                src: symbols.ext(args.single(4)?),
            }
        }
        Opcode::CircuitFelts2Ext => {
            args.expect_groups(5)?;
            let dst = symbols.ext(args.single(0)?);
            let mut felts = [crate::symbol::FeltId::new(0); 4];
            for (i, slot) in felts.iter_mut().enumerate() {
                *slot = symbols.felt(args.single(i + 1)?);
            }
            Instruction::CircuitFelts2Ext { dst, felts }
        }

        // ========== Assertion ==========
        Opcode::AssertEqV => {
            args.expect_groups(2)?;
            Instruction::AssertEqV {
                lhs: symbols.var(args.single(0)?),
                rhs: symbols.var(args.single(1)?),
            }
        }
        Opcode::AssertEqF => {
            args.expect_groups(2)?;
            Instruction::AssertEqF {
                lhs: symbols.felt(args.single(0)?),
                rhs: symbols.felt(args.single(1)?),
            }
        }
        Opcode::AssertEqE => {
            args.expect_groups(2)?;
            Instruction::AssertEqE {
                lhs: symbols.ext(args.single(0)?),
                rhs: symbols.ext(args.single(1)?),
            }
        }

        // ========== Debug ==========
        Opcode::PrintV => {
            args.expect_groups(1)?;
            Instruction::PrintV {
                src: symbols.var(args.single(0)?),
            }
        }
        Opcode::PrintF => {
            args.expect_groups(1)?;
            Instruction::PrintF {
                src: symbols.felt(args.single(0)?),
            }
        }
        Opcode::PrintE => {
            args.expect_groups(1)?;
            Instruction::PrintE {
                src: symbols.ext(args.single(0)?),
            }
        }

        // ========== Witness ==========
        Opcode::WitnessV => {
            args.expect_groups(2)?;
            Instruction::WitnessV {
                dst: symbols.var(args.single(0)?),
                index: args.index(1)?,
            }
        }
        Opcode::WitnessF => {
            args.expect_groups(2)?;
            Instruction::WitnessF {
                dst: symbols.felt(args.single(0)?),
                index: args.index(1)?,
            }
        }
        Opcode::WitnessE => {
            args.expect_groups(2)?;
            Instruction::WitnessE {
                dst: symbols.ext(args.single(0)?),
                index: args.index(1)?,
            }
        }

        // ========== Public commitment ==========
        Opcode::CommitVkeyHash => {
            args.expect_groups(1)?;
            Instruction::CommitVkeyHash {
                src: symbols.var(args.single(0)?),
            }
        }
        Opcode::CommitCommitedValuesDigest => {
            args.expect_groups(1)?;
            Instruction::CommitCommitedValuesDigest {
                src: symbols.var(args.single(0)?),
            }
        }
    };

    Ok(inst)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(opcode: &str, args: &[&[&str]]) -> ConstraintRecord {
        ConstraintRecord::new(opcode, args)
    }

    #[test]
    fn test_decode_arithmetic() {
        let program = Program::decode(&[
            rec("ImmV", &[&["a"], &["5"]]),
            rec("ImmV", &[&["b"], &["7"]]),
            rec("AddV", &[&["c"], &["a"], &["b"]]),
        ])
        .unwrap();

        assert_eq!(program.len(), 3);
        assert_eq!(program.symbols.vars.len(), 3);
        match &program.instructions[2] {
            Instruction::AddV { dst, lhs, rhs } => {
                assert_eq!(program.symbols.vars.name(dst.index() as u32), "c");
                assert_eq!(lhs.index(), 0);
                assert_eq!(rhs.index(), 1);
            }
            other => panic!("unexpected instruction {:?}", other),
        }
    }

    #[test]
    fn test_decode_unknown_opcode() {
        let err = Program::decode(&[
            rec("ImmV", &[&["a"], &["5"]]),
            rec("Frobnicate", &[&["a"]]),
        ])
        .unwrap_err();
        match err {
            DecodeError::UnsupportedOpcode { position, tag } => {
                assert_eq!(position, 1);
                assert_eq!(tag, "Frobnicate");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_decode_bad_witness_index() {
        let err = Program::decode(&[rec("WitnessV", &[&["a"], &["three"]])]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidLiteral { position: 0, opcode: Opcode::WitnessV, .. }
        ));
    }

    #[test]
    fn test_decode_arity() {
        let err = Program::decode(&[rec("AddV", &[&["c"], &["a"]])]).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedArgs { opcode: Opcode::AddV, .. }));

        let err = Program::decode(&[rec("ImmE", &[&["e"], &["1", "2", "3"]])]).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedArgs { opcode: Opcode::ImmE, .. }));
    }

    #[test]
    fn test_decode_num2bits_width_mismatch() {
        let err = Program::decode(&[
            rec("ImmV", &[&["x"], &["5"]]),
            rec("Num2BitsV", &[&["b0", "b1"], &["x"], &["3"]]),
        ])
        .unwrap_err();
        assert!(matches!(err, DecodeError::MalformedArgs { position: 1, .. }));
    }

    #[test]
    fn test_decode_num2bits_zero_width() {
        let program = Program::decode(&[
            rec("ImmV", &[&["x"], &["0"]]),
            rec("Num2BitsV", &[&[], &["x"], &["0"]]),
        ])
        .unwrap();
        match &program.instructions[1] {
            Instruction::Num2BitsV { bits, width, .. } => {
                assert!(bits.is_empty());
                assert_eq!(*width, 0);
            }
            other => panic!("unexpected {:?}", other),
        }

        let err = Program::decode(&[rec("Num2BitsV", &[&[], &["x"], &["2"]])]).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedArgs { position: 0, .. }));
    }

    #[test]
    fn test_decode_ext2felt_layout() {
        let program = Program::decode(&[rec(
            "Ext2Felt",
            &[&["f0"], &["f1"], &["f2"], &["f3"], &["e"]],
        )])
        .unwrap();
        match &program.instructions[0] {
            Instruction::Ext2Felt { felts, src } => {
                assert_eq!(felts.map(|f| f.index()), [0, 1, 2, 3]);
                assert_eq!(src.index(), 0);
            }
            other => panic!("unexpected instruction {:?}", other),
        }
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"opcode": "ImmF", "args": [["f"], ["2013265922"]]},
            {"opcode": "PrintF", "args": [["f"]]}
        ]"#;
        let program = Program::from_json(json).unwrap();
        assert_eq!(
            program.instructions[0],
            Instruction::ImmF {
                dst: crate::symbol::FeltId::new(0),
                value: BabyBear::ONE
            }
        );
        assert_eq!(program.instructions[1].opcode(), Opcode::PrintF);
    }
}
