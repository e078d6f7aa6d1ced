//! Poseidon2 permutations.
//!
//! Two instances are supported:
//!
//! | Instance | Field   | Width | S-box | Full rounds | Partial rounds |
//! |----------|---------|-------|-------|-------------|----------------|
//! | native   | BN254 r | 3     | x^5   | 8           | 56             |
//! | felt     | BabyBear| 16    | x^7   | 8           | 13             |
//!
//! Both run an external linear layer, half the full rounds, the partial
//! rounds, then the other half of the full rounds. Round constants and the
//! BabyBear internal diagonal come from [`Poseidon2Params`]; the default set
//! is the published HorizenLabs instance for each field.

mod constants;

use super::felt::{Felt, FeltChip};
use ark_bn254::Fr;
use ark_r1cs_std::fields::{fp::FpVar, FieldVar};
use ark_relations::r1cs::SynthesisError;
use recursion_ir::{BabyBear, BABYBEAR_PRIME};

pub const NATIVE_WIDTH: usize = 3;
pub const NATIVE_FULL_ROUNDS: usize = 8;
pub const NATIVE_PARTIAL_ROUNDS: usize = 56;

pub const FELT_WIDTH: usize = 16;
pub const FELT_FULL_ROUNDS: usize = 8;
pub const FELT_PARTIAL_ROUNDS: usize = 13;

/// Internal diagonal of the width-3 native instance, `state_i = d_i·state_i + Σ state`
const NATIVE_DIAG: [u64; NATIVE_WIDTH] = [1, 1, 2];

/// Round constants and internal diagonal for both instances
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poseidon2Params {
    pub native_external: [[Fr; NATIVE_WIDTH]; NATIVE_FULL_ROUNDS],
    pub native_internal: [Fr; NATIVE_PARTIAL_ROUNDS],
    pub felt_external: [[BabyBear; FELT_WIDTH]; FELT_FULL_ROUNDS],
    pub felt_internal: [BabyBear; FELT_PARTIAL_ROUNDS],
    pub felt_diag: [BabyBear; FELT_WIDTH],
}

impl Default for Poseidon2Params {
    /// HorizenLabs BN254 t=3 and BabyBear t=16 constants.
    ///
    /// The BabyBear diagonal is
    /// `[-2, 1, 2, 1/2, 3, 4, -1/2, -3, -4, 1/2^8, 1/4, 1/8, 1/2^27, -1/2^8, -1/16, -1/2^27]`.
    fn default() -> Self {
        let half = BabyBear::new((BABYBEAR_PRIME as u64 + 1) / 2);
        let small = |k: u64| BabyBear::new(k);
        let felt_diag = [
            -small(2),
            small(1),
            small(2),
            half,
            small(3),
            small(4),
            -half,
            -small(3),
            -small(4),
            half.pow(8),
            half.pow(2),
            half.pow(3),
            half.pow(27),
            -half.pow(8),
            -half.pow(4),
            -half.pow(27),
        ];
        let felt = |x: u32| BabyBear::new(x as u64);

        Self {
            native_external: constants::NATIVE_EXTERNAL.map(|round| round.map(Fr::new)),
            native_internal: constants::NATIVE_INTERNAL.map(Fr::new),
            felt_external: constants::FELT_EXTERNAL.map(|round| round.map(felt)),
            felt_internal: constants::FELT_INTERNAL.map(felt),
            felt_diag,
        }
    }
}

// ============================================================================
// Native instance (width 3 over BN254)
// ============================================================================

fn native_sbox(x: &FpVar<Fr>) -> Result<FpVar<Fr>, SynthesisError> {
    let x2 = x.square()?;
    let x4 = x2.square()?;
    Ok(x4 * x)
}

/// circ(2, 1, 1)
fn native_external(state: &mut [FpVar<Fr>; NATIVE_WIDTH]) {
    let sum = &state[0] + &state[1] + &state[2];
    for s in state.iter_mut() {
        *s += &sum;
    }
}

fn native_internal(state: &mut [FpVar<Fr>; NATIVE_WIDTH]) {
    let sum = &state[0] + &state[1] + &state[2];
    for (s, d) in state.iter_mut().zip(NATIVE_DIAG) {
        *s = &*s * Fr::from(d) + &sum;
    }
}

/// Permute a native state in place
pub fn permute_native(
    params: &Poseidon2Params,
    state: &mut [FpVar<Fr>; NATIVE_WIDTH],
) -> Result<(), SynthesisError> {
    let half = NATIVE_FULL_ROUNDS / 2;
    native_external(state);

    for rc in &params.native_external[..half] {
        for (s, c) in state.iter_mut().zip(rc) {
            *s = native_sbox(&(&*s + *c))?;
        }
        native_external(state);
    }

    for c in &params.native_internal {
        state[0] = native_sbox(&(&state[0] + *c))?;
        native_internal(state);
    }

    for rc in &params.native_external[half..] {
        for (s, c) in state.iter_mut().zip(rc) {
            *s = native_sbox(&(&*s + *c))?;
        }
        native_external(state);
    }

    Ok(())
}

/// Out-of-circuit native permutation
pub fn permute_native_host(params: &Poseidon2Params, state: [Fr; NATIVE_WIDTH]) -> [Fr; NATIVE_WIDTH] {
    let mut state = state;
    let sbox = |x: Fr| {
        let x2 = x * x;
        x2 * x2 * x
    };
    let external = |s: &mut [Fr; NATIVE_WIDTH]| {
        let sum = s[0] + s[1] + s[2];
        s.iter_mut().for_each(|x| *x += sum);
    };
    let internal = |s: &mut [Fr; NATIVE_WIDTH]| {
        let sum = s[0] + s[1] + s[2];
        for (x, d) in s.iter_mut().zip(NATIVE_DIAG) {
            *x = *x * Fr::from(d) + sum;
        }
    };

    let half = NATIVE_FULL_ROUNDS / 2;
    external(&mut state);
    for rc in &params.native_external[..half] {
        for (x, c) in state.iter_mut().zip(rc) {
            *x = sbox(*x + c);
        }
        external(&mut state);
    }
    for c in &params.native_internal {
        state[0] = sbox(state[0] + c);
        internal(&mut state);
    }
    for rc in &params.native_external[half..] {
        for (x, c) in state.iter_mut().zip(rc) {
            *x = sbox(*x + c);
        }
        external(&mut state);
    }
    state
}

// ============================================================================
// Felt instance (width 16 over BabyBear)
// ============================================================================

/// Rows of the 4×4 MDS block
const M4: [[u64; 4]; 4] = [[2, 3, 1, 1], [1, 2, 3, 1], [1, 1, 2, 3], [3, 1, 1, 2]];

fn felt_sbox(chip: &FeltChip, x: &Felt) -> Result<Felt, SynthesisError> {
    let x2 = chip.mul(x, x)?;
    let x3 = chip.mul(&x2, x)?;
    let x6 = chip.mul(&x3, &x3)?;
    chip.mul(&x6, x)
}

fn felt_sum(chip: &FeltChip, terms: &[Felt]) -> Result<Felt, SynthesisError> {
    terms
        .iter()
        .try_fold(Felt::constant(BabyBear::ZERO), |acc, t| chip.add(&acc, t))
}

/// `M4` on each block of four, then the outer `circ(2, 1, 1, 1)` over blocks
fn felt_external(chip: &FeltChip, state: &mut [Felt; FELT_WIDTH]) -> Result<(), SynthesisError> {
    for block in state.chunks_exact_mut(4) {
        let mut out = Vec::with_capacity(4);
        for row in M4 {
            let terms = row
                .iter()
                .zip(block.iter())
                .map(|(&k, x)| chip.scale(x, BabyBear::new(k)))
                .collect::<Result<Vec<_>, _>>()?;
            out.push(felt_sum(chip, &terms)?);
        }
        block.clone_from_slice(&out);
    }

    let mut sums = Vec::with_capacity(4);
    for lane in 0..4 {
        let column: Vec<Felt> = state.iter().skip(lane).step_by(4).cloned().collect();
        sums.push(felt_sum(chip, &column)?);
    }
    for (i, s) in state.iter_mut().enumerate() {
        *s = chip.add(s, &sums[i % 4])?;
    }
    Ok(())
}

fn felt_internal(
    chip: &FeltChip,
    diag: &[BabyBear; FELT_WIDTH],
    state: &mut [Felt; FELT_WIDTH],
) -> Result<(), SynthesisError> {
    let sum = felt_sum(chip, &state[..])?;
    for (s, d) in state.iter_mut().zip(diag) {
        let scaled = chip.scale(s, *d)?;
        *s = chip.add(&scaled, &sum)?;
    }
    Ok(())
}

fn felt_full_round(
    chip: &FeltChip,
    rc: &[BabyBear; FELT_WIDTH],
    state: &mut [Felt; FELT_WIDTH],
) -> Result<(), SynthesisError> {
    for (s, c) in state.iter_mut().zip(rc) {
        let shifted = chip.add(s, &Felt::constant(*c))?;
        *s = felt_sbox(chip, &shifted)?;
    }
    felt_external(chip, state)
}

/// Permute a BabyBear state in place
pub fn permute_felt(
    chip: &FeltChip,
    params: &Poseidon2Params,
    state: &mut [Felt; FELT_WIDTH],
) -> Result<(), SynthesisError> {
    let half = FELT_FULL_ROUNDS / 2;
    felt_external(chip, state)?;

    for rc in &params.felt_external[..half] {
        felt_full_round(chip, rc, state)?;
    }

    for c in &params.felt_internal {
        let shifted = chip.add(&state[0], &Felt::constant(*c))?;
        state[0] = felt_sbox(chip, &shifted)?;
        felt_internal(chip, &params.felt_diag, state)?;
    }

    for rc in &params.felt_external[half..] {
        felt_full_round(chip, rc, state)?;
    }

    // leave every lane as a 31-bit representative
    for s in state.iter_mut() {
        *s = chip.reduce(s)?;
    }
    Ok(())
}

/// Out-of-circuit BabyBear permutation
pub fn permute_felt_host(
    params: &Poseidon2Params,
    state: [BabyBear; FELT_WIDTH],
) -> [BabyBear; FELT_WIDTH] {
    let mut state = state;
    let sbox = |x: BabyBear| x.pow(7);
    let external = |s: &mut [BabyBear; FELT_WIDTH]| {
        for block in s.chunks_exact_mut(4) {
            let x = [block[0], block[1], block[2], block[3]];
            for (out, row) in block.iter_mut().zip(M4) {
                *out = row
                    .iter()
                    .zip(x)
                    .fold(BabyBear::ZERO, |acc, (&k, v)| acc + BabyBear::new(k) * v);
            }
        }
        let mut sums = [BabyBear::ZERO; 4];
        for (i, x) in s.iter().enumerate() {
            sums[i % 4] += *x;
        }
        for (i, x) in s.iter_mut().enumerate() {
            *x += sums[i % 4];
        }
    };

    let half = FELT_FULL_ROUNDS / 2;
    external(&mut state);
    for rc in &params.felt_external[..half] {
        for (x, c) in state.iter_mut().zip(rc) {
            *x = sbox(*x + *c);
        }
        external(&mut state);
    }
    for c in &params.felt_internal {
        state[0] = sbox(state[0] + *c);
        let sum = state.iter().fold(BabyBear::ZERO, |acc, x| acc + *x);
        for (x, d) in state.iter_mut().zip(params.felt_diag) {
            *x = *x * d + sum;
        }
    }
    for rc in &params.felt_external[half..] {
        for (x, c) in state.iter_mut().zip(rc) {
            *x = sbox(*x + *c);
        }
        external(&mut state);
    }
    state
}
