//! Decoding tests for the recursion IR
//!
//! Covers the JSON wire format, malformed records, witness parsing, and the
//! host-side field arithmetic used as a reference by the compiler.

use proptest::prelude::*;
use std::collections::HashSet;
use recursion_ir::{
    validate, BabyBear, BabyBearExt4, ConstraintRecord, DecodeError, Domain, Instruction, Opcode,
    Program, Witness, BABYBEAR_PRIME,
};

fn rec(opcode: &str, args: &[&[&str]]) -> ConstraintRecord {
    ConstraintRecord::new(opcode, args)
}

// ============================================================================
// Wire Format Tests
// ============================================================================

#[test]
fn test_every_opcode_decodes() {
    let felts16: Vec<String> = (0..16).map(|i| format!("s{}", i)).collect();
    let felts16: Vec<&str> = felts16.iter().map(String::as_str).collect();
    let bits31: Vec<String> = (0..31).map(|i| format!("b{}", i)).collect();
    let bits31: Vec<&str> = bits31.iter().map(String::as_str).collect();
    let permute_bb: Vec<&[&str]> = felts16.iter().map(std::slice::from_ref).collect();

    let records = vec![
        rec("ImmV", &[&["v"], &["1"]]),
        rec("ImmF", &[&["f"], &["2"]]),
        rec("ImmE", &[&["e"], &["1", "2", "3", "4"]]),
        rec("AddV", &[&["v"], &["v"], &["v"]]),
        rec("SubV", &[&["v"], &["v"], &["v"]]),
        rec("MulV", &[&["v"], &["v"], &["v"]]),
        rec("AddF", &[&["f"], &["f"], &["f"]]),
        rec("SubF", &[&["f"], &["f"], &["f"]]),
        rec("MulF", &[&["f"], &["f"], &["f"]]),
        rec("AddE", &[&["e"], &["e"], &["e"]]),
        rec("SubE", &[&["e"], &["e"], &["e"]]),
        rec("MulE", &[&["e"], &["e"], &["e"]]),
        rec("DivE", &[&["e"], &["e"], &["e"]]),
        rec("NegE", &[&["e"], &["e"]]),
        rec("InvE", &[&["e"], &["e"]]),
        rec("AddEF", &[&["e"], &["e"], &["f"]]),
        rec("SubEF", &[&["e"], &["e"], &["f"]]),
        rec("MulEF", &[&["e"], &["e"], &["f"]]),
        rec("Num2BitsV", &[&["b0", "b1", "b2"], &["v"], &["3"]]),
        rec("Num2BitsF", &[bits31.as_slice(), &["f"]]),
        rec("Permute", &[&["v"], &["w"], &["x"]]),
        rec("PermuteBabyBear", &permute_bb),
        rec("SelectV", &[&["v"], &["b0"], &["v"], &["w"]]),
        rec("SelectF", &[&["f"], &["b0"], &["f"], &["f"]]),
        rec("SelectE", &[&["e"], &["b0"], &["e"], &["e"]]),
        rec("Ext2Felt", &[&["f0"], &["f1"], &["f2"], &["f3"], &["e"]]),
        rec("CircuitFelts2Ext", &[&["e"], &["f0"], &["f1"], &["f2"], &["f3"]]),
        rec("AssertEqV", &[&["v"], &["w"]]),
        rec("AssertEqF", &[&["f"], &["f0"]]),
        rec("AssertEqE", &[&["e"], &["e"]]),
        rec("PrintV", &[&["v"]]),
        rec("PrintF", &[&["f"]]),
        rec("PrintE", &[&["e"]]),
        rec("WitnessV", &[&["v"], &["0"]]),
        rec("WitnessF", &[&["f"], &["0"]]),
        rec("WitnessE", &[&["e"], &["0"]]),
        rec("CommitVkeyHash", &[&["v"]]),
        rec("CommitCommitedValuesDigest", &[&["v"]]),
    ];
    assert_eq!(records.len(), Opcode::ALL.len());

    let program = Program::decode(&records).unwrap();
    let decoded: HashSet<Opcode> = program.iter().map(Instruction::opcode).collect();
    assert_eq!(decoded, Opcode::ALL.into_iter().collect::<HashSet<_>>());
}

#[test]
fn test_json_roundtrip_of_records() {
    let records = vec![
        rec("ImmV", &[&["a"], &["5"]]),
        rec("ImmV", &[&["b"], &["7"]]),
        rec("MulV", &[&["c"], &["a"], &["b"]]),
    ];
    let json = serde_json::to_string(&records).unwrap();
    assert!(json.contains("\"opcode\":\"MulV\""));

    let program = Program::from_json(&json).unwrap();
    assert_eq!(program.len(), 3);
    assert_eq!(program.symbols.vars.lookup("c"), Some(2));
}

#[test]
fn test_program_listing() {
    let program = Program::decode(&[
        rec("WitnessE", &[&["x"], &["0"]]),
        rec("InvE", &[&["y"], &["x"]]),
    ])
    .unwrap();
    let listing = program.listing();
    assert!(listing.contains("WitnessE x, exts[0]"));
    assert!(listing.contains("InvE y, x"));
}

// ============================================================================
// Malformed Input Tests
// ============================================================================

#[test]
fn test_unknown_opcode_reports_position() {
    let result = Program::decode(&[
        rec("ImmV", &[&["a"], &["1"]]),
        rec("ImmV", &[&["b"], &["2"]]),
        rec("XorV", &[&["c"], &["a"], &["b"]]),
    ]);

    if let Err(DecodeError::UnsupportedOpcode { position, tag }) = result {
        assert_eq!(position, 2);
        assert_eq!(tag, "XorV");
    } else {
        panic!("Expected UnsupportedOpcode error");
    }
}

#[test]
fn test_opcode_tags_are_case_sensitive() {
    let result = Program::decode(&[rec("addv", &[&["c"], &["a"], &["b"]])]);
    assert!(matches!(result, Err(DecodeError::UnsupportedOpcode { .. })));
}

#[test]
fn test_extra_argument_group() {
    let result = Program::decode(&[rec("PrintV", &[&["a"], &["b"]])]);
    assert!(matches!(result, Err(DecodeError::MalformedArgs { .. })));
}

#[test]
fn test_two_tokens_in_single_group() {
    let result = Program::decode(&[rec("ImmV", &[&["a", "b"], &["1"]])]);
    assert!(matches!(result, Err(DecodeError::MalformedArgs { .. })));
}

#[test]
fn test_empty_group() {
    let result = Program::decode(&[rec("PrintF", &[&[]])]);
    assert!(matches!(result, Err(DecodeError::MalformedArgs { .. })));
}

#[test]
fn test_negative_literal_rejected() {
    let result = Program::decode(&[rec("ImmV", &[&["a"], &["-1"]])]);
    assert!(matches!(result, Err(DecodeError::InvalidLiteral { .. })));
}

#[test]
fn test_num2bits_felt_needs_31_outputs() {
    let result = Program::decode(&[rec("Num2BitsF", &[&["b0", "b1"], &["f"]])]);
    assert!(matches!(
        result,
        Err(DecodeError::MalformedArgs { opcode: Opcode::Num2BitsF, .. })
    ));
}

#[test]
fn test_malformed_json() {
    let result = Program::from_json("[{\"opcode\": \"ImmV\"}]");
    assert!(matches!(result, Err(DecodeError::Json(_))));
}

// ============================================================================
// Witness Tests
// ============================================================================

#[test]
fn test_witness_missing_public_field() {
    let result = Witness::from_json(r#"{"vars": [], "felts": [], "exts": []}"#);
    assert!(matches!(result, Err(DecodeError::Json(_))));
}

#[test]
fn test_witness_felts_reduced() {
    let json = format!(
        r#"{{"vars": [], "felts": ["{}"], "exts": [], "vkey_hash": "0", "commited_values_digest": "0"}}"#,
        BABYBEAR_PRIME as u64 + 5
    );
    let witness = Witness::from_json(&json).unwrap();
    assert_eq!(witness.felts[0], BabyBear::new(5));
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn test_lint_reports_undefined_symbol_by_name() {
    let program = Program::decode(&[rec("AddF", &[&["z"], &["x"], &["y"]])]).unwrap();
    let result = validate(&program);
    assert_eq!(result.errors.len(), 2);
    assert!(result.errors[0].to_string().contains("\"x\""));
    match &result.errors[1] {
        recursion_ir::ValidationError::UseBeforeDef { domain, name, .. } => {
            assert_eq!(*domain, Domain::Felt);
            assert_eq!(name, "y");
        }
    }
}

#[test]
fn test_instruction_operands() {
    let program = Program::decode(&[rec("SelectE", &[&["d"], &["c"], &["a"], &["b"]])]).unwrap();
    let inst = &program.instructions[0];
    assert!(matches!(inst, Instruction::SelectE { .. }));
    let domains: Vec<_> = inst.uses().iter().map(|op| op.domain).collect();
    assert_eq!(domains, vec![Domain::Var, Domain::Ext, Domain::Ext]);
}

// ============================================================================
// Property Tests
// ============================================================================

fn arb_felt() -> impl Strategy<Value = BabyBear> {
    (0u64..BABYBEAR_PRIME as u64).prop_map(BabyBear::new)
}

fn arb_ext() -> impl Strategy<Value = BabyBearExt4> {
    prop::array::uniform4(arb_felt()).prop_map(BabyBearExt4::new)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_decimal_parse_matches_reduction(n in any::<u64>()) {
        prop_assert_eq!(BabyBear::from_decimal(&n.to_string()), Some(BabyBear::new(n)));
    }

    #[test]
    fn test_ext_inverse(a in arb_ext()) {
        prop_assume!(!a.is_zero());
        let inv = a.inverse().unwrap();
        prop_assert_eq!(a * inv, BabyBearExt4::ONE);
    }

    #[test]
    fn test_ext_distributive(a in arb_ext(), b in arb_ext(), c in arb_ext()) {
        prop_assert_eq!(a * (b + c), a * b + a * c);
    }

    #[test]
    fn test_imm_felt_literal(n in any::<u64>()) {
        let lit = n.to_string();
        let program = Program::decode(&[rec("ImmF", &[&["f"], &[lit.as_str()]])]).unwrap();
        prop_assert_eq!(
            &program.instructions[0],
            &Instruction::ImmF { dst: recursion_ir::FeltId::new(0), value: BabyBear::new(n) }
        );
    }
}
