//! Witness input.
//!
//! Witness values arrive as decimal strings in a JSON object with five
//! fields. Each extension element is a group of four BabyBear coordinates.

use crate::error::{DecodeError, Result};
use crate::extension::BabyBearExt4;
use crate::field::BabyBear;
use crate::literal::NativeLiteral;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Witness vector lengths, per domain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WitnessShape {
    pub vars: usize,
    pub felts: usize,
    pub exts: usize,
}

/// Raw witness, exactly as serialized
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessInput {
    #[serde(default)]
    pub vars: Vec<String>,
    #[serde(default)]
    pub felts: Vec<String>,
    #[serde(default)]
    pub exts: Vec<Vec<String>>,
    pub vkey_hash: String,
    pub commited_values_digest: String,
}

/// Parsed witness values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Witness {
    pub vars: Vec<NativeLiteral>,
    pub felts: Vec<BabyBear>,
    pub exts: Vec<BabyBearExt4>,
    pub vkey_hash: NativeLiteral,
    pub committed_values_digest: NativeLiteral,
}

impl Witness {
    /// Validate and parse a raw witness
    pub fn from_input(input: &WitnessInput) -> Result<Self> {
        let vars = input
            .vars
            .iter()
            .enumerate()
            .map(|(i, s)| native("vars", i, s))
            .collect::<Result<Vec<_>>>()?;

        let felts = input
            .felts
            .iter()
            .enumerate()
            .map(|(i, s)| felt("felts", i, s))
            .collect::<Result<Vec<_>>>()?;

        let mut exts = Vec::with_capacity(input.exts.len());
        for (i, group) in input.exts.iter().enumerate() {
            if group.len() != 4 {
                return Err(DecodeError::InvalidWitness {
                    field: "exts",
                    index: i,
                    token: format!("{} coordinates", group.len()),
                });
            }
            let mut coords = [BabyBear::ZERO; 4];
            for (slot, token) in coords.iter_mut().zip(group) {
                *slot = felt("exts", i, token)?;
            }
            exts.push(BabyBearExt4::new(coords));
        }

        Ok(Witness {
            vars,
            felts,
            exts,
            vkey_hash: native("vkey_hash", 0, &input.vkey_hash)?,
            committed_values_digest: native(
                "commited_values_digest",
                0,
                &input.commited_values_digest,
            )?,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let input: WitnessInput = serde_json::from_str(json)?;
        Self::from_input(&input)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let input: WitnessInput = serde_json::from_reader(reader)?;
        Self::from_input(&input)
    }

    /// All-zero witness of the given shape
    pub fn placeholder(shape: WitnessShape) -> Self {
        Witness {
            vars: vec![NativeLiteral::zero(); shape.vars],
            felts: vec![BabyBear::ZERO; shape.felts],
            exts: vec![BabyBearExt4::ZERO; shape.exts],
            vkey_hash: NativeLiteral::zero(),
            committed_values_digest: NativeLiteral::zero(),
        }
    }
}

fn native(field: &'static str, index: usize, token: &str) -> Result<NativeLiteral> {
    NativeLiteral::parse(token).ok_or_else(|| DecodeError::InvalidWitness {
        field,
        index,
        token: token.to_string(),
    })
}

fn felt(field: &'static str, index: usize, token: &str) -> Result<BabyBear> {
    BabyBear::from_decimal(token).ok_or_else(|| DecodeError::InvalidWitness {
        field,
        index,
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let json = r#"{
            "vars": ["1", "2"],
            "felts": ["2013265920"],
            "exts": [["1", "2", "3", "4"]],
            "vkey_hash": "99",
            "commited_values_digest": "100"
        }"#;
        let witness = Witness::from_json(json).unwrap();
        assert_eq!(witness.vars.len(), 2);
        assert_eq!(witness.felts[0], -BabyBear::ONE);
        assert_eq!(witness.exts[0].coords()[3], BabyBear::new(4));
        assert_eq!(witness.vkey_hash.as_str(), "99");
        assert_eq!(witness.committed_values_digest.as_str(), "100");
    }

    #[test]
    fn test_bad_ext_group() {
        let input = WitnessInput {
            exts: vec![vec!["1".into(), "2".into()]],
            vkey_hash: "0".into(),
            commited_values_digest: "0".into(),
            ..Default::default()
        };
        let err = Witness::from_input(&input).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidWitness { field: "exts", index: 0, .. }));
    }

    #[test]
    fn test_bad_var() {
        let input = WitnessInput {
            vars: vec!["0".into(), "abc".into()],
            vkey_hash: "0".into(),
            commited_values_digest: "0".into(),
            ..Default::default()
        };
        let err = Witness::from_input(&input).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidWitness { field: "vars", index: 1, .. }));
    }

    #[test]
    fn test_placeholder_shape() {
        let shape = WitnessShape {
            vars: 2,
            felts: 3,
            exts: 1,
        };
        let witness = Witness::placeholder(shape);
        assert_eq!(witness.vars.len(), 2);
        assert_eq!(witness.felts.len(), 3);
        assert_eq!(witness.exts[0], BabyBearExt4::ZERO);
    }
}
