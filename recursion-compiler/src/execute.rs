//! Instruction execution.
//!
//! Each instruction resolves its operands from the environments, calls the
//! backend and binds its results. Nothing is evaluated on the host; every
//! value is a backend handle.

use crate::backend::{BackendError, BackendResult, CircuitBuilder};
use crate::env::Environments;
use crate::error::{CompileError, Result};
use crate::witness::{WitnessBinder, WitnessSource};
use recursion_ir::format::format;
use recursion_ir::{
    Domain, ExtId, FeltId, Instruction, Opcode, Operand, Symbols, VarId,
    FELT_PERMUTATION_WIDTH, NATIVE_PERMUTATION_WIDTH,
};
use tracing::{info, trace};

const PRINT_TARGET: &str = "recursion::print";

/// Instruction being executed, for error reports
#[derive(Debug, Clone, Copy)]
struct Site {
    position: usize,
    opcode: Opcode,
}

impl Site {
    fn backend(self, err: BackendError) -> CompileError {
        CompileError::from_backend(self.position, self.opcode, err)
    }
}

/// Counts of side effects that leave no symbol behind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub assertions: usize,
    pub commitments: usize,
    pub prints: usize,
}

/// Public inputs, in declaration order
#[derive(Debug, Clone)]
pub struct PublicInputs<V> {
    pub vkey_hash: V,
    pub committed_values_digest: V,
}

/// Interpreter state for one compilation
pub struct Interpreter<'p, B: CircuitBuilder> {
    builder: B,
    symbols: &'p Symbols,
    env: Environments<B>,
    witness: WitnessBinder<'p, B>,
    publics: PublicInputs<B::Var>,
    trace: bool,
    counters: Counters,
}

/// What an interpreter leaves behind
pub struct Finished<B: CircuitBuilder> {
    pub builder: B,
    pub publics: PublicInputs<B::Var>,
    pub counters: Counters,
    pub witness_bindings: usize,
}

impl<'p, B: CircuitBuilder> Interpreter<'p, B> {
    /// Allocate the public inputs and start with empty environments
    pub fn new(
        mut builder: B,
        symbols: &'p Symbols,
        witness: impl Into<WitnessSource<'p>>,
        trace: bool,
    ) -> Result<Self> {
        let witness = witness.into();
        let vkey_hash = builder
            .public_input(&witness.vkey_hash())
            .map_err(CompileError::PublicInput)?;
        let committed_values_digest = builder
            .public_input(&witness.committed_values_digest())
            .map_err(CompileError::PublicInput)?;

        Ok(Self {
            builder,
            symbols,
            env: Environments::new(symbols),
            witness: WitnessBinder::new(witness),
            publics: PublicInputs {
                vkey_hash,
                committed_values_digest,
            },
            trace,
            counters: Counters::default(),
        })
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn finish(self) -> Finished<B> {
        Finished {
            witness_bindings: self.witness.allocated(),
            builder: self.builder,
            publics: self.publics,
            counters: self.counters,
        }
    }

    /// Execute a single instruction
    pub fn execute(&mut self, position: usize, inst: &Instruction) -> Result<()> {
        let site = Site {
            position,
            opcode: inst.opcode(),
        };
        if self.trace {
            trace!(position, "{}", format(inst, self.symbols));
        }

        match inst {
            // ========== Immediate ==========
            Instruction::ImmV { dst, value } => {
                let v = self.builder.constant_var(value).map_err(|e| site.backend(e))?;
                self.env.define_var(*dst, v);
            }

            Instruction::ImmF { dst, value } => {
                let v = self.builder.constant_felt(*value).map_err(|e| site.backend(e))?;
                self.env.define_felt(*dst, v);
            }

            Instruction::ImmE { dst, value } => {
                let v = self.builder.constant_ext(*value).map_err(|e| site.backend(e))?;
                self.env.define_ext(*dst, v);
            }

            // ========== Native arithmetic ==========
            Instruction::AddV { dst, lhs, rhs } => self.var_op(site, *dst, *lhs, *rhs, B::add_var)?,
            Instruction::SubV { dst, lhs, rhs } => self.var_op(site, *dst, *lhs, *rhs, B::sub_var)?,
            Instruction::MulV { dst, lhs, rhs } => self.var_op(site, *dst, *lhs, *rhs, B::mul_var)?,

            // ========== Felt arithmetic ==========
            Instruction::AddF { dst, lhs, rhs } => self.felt_op(site, *dst, *lhs, *rhs, B::add_felt)?,
            Instruction::SubF { dst, lhs, rhs } => self.felt_op(site, *dst, *lhs, *rhs, B::sub_felt)?,
            Instruction::MulF { dst, lhs, rhs } => self.felt_op(site, *dst, *lhs, *rhs, B::mul_felt)?,

            // ========== Extension arithmetic ==========
            Instruction::AddE { dst, lhs, rhs } => self.ext_op(site, *dst, *lhs, *rhs, B::add_ext)?,
            Instruction::SubE { dst, lhs, rhs } => self.ext_op(site, *dst, *lhs, *rhs, B::sub_ext)?,
            Instruction::MulE { dst, lhs, rhs } => self.ext_op(site, *dst, *lhs, *rhs, B::mul_ext)?,
            Instruction::DivE { dst, lhs, rhs } => self.ext_op(site, *dst, *lhs, *rhs, B::div_ext)?,

            Instruction::NegE { dst, src } => {
                let a = self.ext(site, *src)?;
                let v = self.builder.neg_ext(&a).map_err(|e| site.backend(e))?;
                self.env.define_ext(*dst, v);
            }

            Instruction::InvE { dst, src } => {
                let a = self.ext(site, *src)?;
                let v = self.builder.inv_ext(&a).map_err(|e| site.backend(e))?;
                self.env.define_ext(*dst, v);
            }

            // ========== Mixed extension / felt ==========
            Instruction::AddEF { dst, lhs, rhs } => {
                self.ext_felt_op(site, *dst, *lhs, *rhs, B::add_ext_felt)?
            }
            Instruction::SubEF { dst, lhs, rhs } => {
                self.ext_felt_op(site, *dst, *lhs, *rhs, B::sub_ext_felt)?
            }
            Instruction::MulEF { dst, lhs, rhs } => {
                self.ext_felt_op(site, *dst, *lhs, *rhs, B::mul_ext_felt)?
            }

            // ========== Bit decomposition ==========
            Instruction::Num2BitsV { bits, value, width } => {
                if *width > B::MAX_VAR_BITS {
                    return Err(site.backend(BackendError::BitWidth {
                        width: *width,
                        max: B::MAX_VAR_BITS,
                    }));
                }
                let v = self.var(site, *value)?;
                let out = self
                    .builder
                    .var_to_bits(&v, *width)
                    .map_err(|e| site.backend(e))?;
                self.define_bits(site, bits, out)?;
            }

            Instruction::Num2BitsF { bits, value } => {
                if bits.len() != B::FELT_BITS {
                    return Err(CompileError::ArithmeticFailure {
                        position: site.position,
                        opcode: site.opcode,
                        reason: format!(
                            "{} outputs for a {}-bit felt decomposition",
                            bits.len(),
                            B::FELT_BITS
                        ),
                    });
                }
                let v = self.felt(site, *value)?;
                let out = self.builder.felt_to_bits(&v).map_err(|e| site.backend(e))?;
                self.define_bits(site, bits, out)?;
            }

            // ========== Permutation ==========
            Instruction::Permute { state } => {
                let mut lanes: [B::Var; NATIVE_PERMUTATION_WIDTH] =
                    self.lanes(site, state, Self::var)?;
                self.builder
                    .permute_native(&mut lanes)
                    .map_err(|e| site.backend(e))?;
                for (id, v) in state.iter().zip(lanes) {
                    self.env.define_var(*id, v);
                }
            }

            Instruction::PermuteBabyBear { state } => {
                let mut lanes: [B::Felt; FELT_PERMUTATION_WIDTH] =
                    self.lanes(site, state, Self::felt)?;
                self.builder
                    .permute_felt(&mut lanes)
                    .map_err(|e| site.backend(e))?;
                for (id, v) in state.iter().zip(lanes) {
                    self.env.define_felt(*id, v);
                }
            }

            // ========== Select ==========
            Instruction::SelectV { dst, cond, a, b } => {
                let (c, x, y) = (self.var(site, *cond)?, self.var(site, *a)?, self.var(site, *b)?);
                let v = self.builder.select_var(&c, &x, &y).map_err(|e| site.backend(e))?;
                self.env.define_var(*dst, v);
            }

            Instruction::SelectF { dst, cond, a, b } => {
                let (c, x, y) = (self.var(site, *cond)?, self.felt(site, *a)?, self.felt(site, *b)?);
                let v = self.builder.select_felt(&c, &x, &y).map_err(|e| site.backend(e))?;
                self.env.define_felt(*dst, v);
            }

            Instruction::SelectE { dst, cond, a, b } => {
                let (c, x, y) = (self.var(site, *cond)?, self.ext(site, *a)?, self.ext(site, *b)?);
                let v = self.builder.select_ext(&c, &x, &y).map_err(|e| site.backend(e))?;
                self.env.define_ext(*dst, v);
            }

            // ========== Conversion ==========
            Instruction::Ext2Felt { felts, src } => {
                let e = self.ext(site, *src)?;
                let coords = self.builder.ext_to_felts(&e).map_err(|e| site.backend(e))?;
                for (id, v) in felts.iter().zip(coords) {
                    self.env.define_felt(*id, v);
                }
            }

            Instruction::CircuitFelts2Ext { dst, felts } => {
                let coords = self.lanes(site, felts, Self::felt)?;
                let v = self.builder.felts_to_ext(&coords).map_err(|e| site.backend(e))?;
                self.env.define_ext(*dst, v);
            }

            // ========== Assertion ==========
            Instruction::AssertEqV { lhs, rhs } => {
                let (a, b) = (self.var(site, *lhs)?, self.var(site, *rhs)?);
                self.builder.assert_eq_var(&a, &b).map_err(|e| site.backend(e))?;
                self.counters.assertions += 1;
            }

            Instruction::AssertEqF { lhs, rhs } => {
                let (a, b) = (self.felt(site, *lhs)?, self.felt(site, *rhs)?);
                self.builder.assert_eq_felt(&a, &b).map_err(|e| site.backend(e))?;
                self.counters.assertions += 1;
            }

            Instruction::AssertEqE { lhs, rhs } => {
                let (a, b) = (self.ext(site, *lhs)?, self.ext(site, *rhs)?);
                self.builder.assert_eq_ext(&a, &b).map_err(|e| site.backend(e))?;
                self.counters.assertions += 1;
            }

            // ========== Debug ==========
            Instruction::PrintV { src } => {
                let v = self.var(site, *src)?;
                let value = self.builder.var_value(&v);
                self.print(site, (*src).into(), value);
            }

            Instruction::PrintF { src } => {
                let v = self.felt(site, *src)?;
                let value = self.builder.felt_value(&v).map(|x| x.to_string());
                self.print(site, (*src).into(), value);
            }

            Instruction::PrintE { src } => {
                let v = self.ext(site, *src)?;
                let value = self.builder.ext_value(&v).map(|x| x.to_string());
                self.print(site, (*src).into(), value);
            }

            // ========== Witness ==========
            Instruction::WitnessV { dst, index } => {
                let v = self
                    .witness
                    .var(&mut self.builder, *index)
                    .map_err(|e| CompileError::from_bind(position, site.opcode, e))?;
                self.env.define_var(*dst, v);
            }

            Instruction::WitnessF { dst, index } => {
                let v = self
                    .witness
                    .felt(&mut self.builder, *index)
                    .map_err(|e| CompileError::from_bind(position, site.opcode, e))?;
                self.env.define_felt(*dst, v);
            }

            Instruction::WitnessE { dst, index } => {
                let v = self
                    .witness
                    .ext(&mut self.builder, *index)
                    .map_err(|e| CompileError::from_bind(position, site.opcode, e))?;
                self.env.define_ext(*dst, v);
            }

            // ========== Public commitment ==========
            Instruction::CommitVkeyHash { src } => {
                let v = self.var(site, *src)?;
                self.builder
                    .assert_eq_var(&v, &self.publics.vkey_hash)
                    .map_err(|e| site.backend(e))?;
                self.counters.commitments += 1;
            }

            Instruction::CommitCommitedValuesDigest { src } => {
                let v = self.var(site, *src)?;
                self.builder
                    .assert_eq_var(&v, &self.publics.committed_values_digest)
                    .map_err(|e| site.backend(e))?;
                self.counters.commitments += 1;
            }
        }

        Ok(())
    }

    // ========== Operand resolution ==========

    fn undefined(&self, site: Site, operand: Operand) -> CompileError {
        CompileError::UndefinedSymbol {
            position: site.position,
            opcode: site.opcode,
            domain: operand.domain,
            name: self.symbols.name(operand).to_string(),
        }
    }

    fn var(&self, site: Site, id: VarId) -> Result<B::Var> {
        self.env
            .var(id)
            .cloned()
            .ok_or_else(|| self.undefined(site, id.into()))
    }

    fn felt(&self, site: Site, id: FeltId) -> Result<B::Felt> {
        self.env
            .felt(id)
            .cloned()
            .ok_or_else(|| self.undefined(site, id.into()))
    }

    fn ext(&self, site: Site, id: ExtId) -> Result<B::Ext> {
        self.env
            .ext(id)
            .cloned()
            .ok_or_else(|| self.undefined(site, id.into()))
    }

    /// Resolve a fixed-width operand group in lane order
    fn lanes<I: Copy, T: Clone, const N: usize>(
        &self,
        site: Site,
        ids: &[I; N],
        resolve: impl Fn(&Self, Site, I) -> Result<T>,
    ) -> Result<[T; N]> {
        let Some(&first) = ids.first() else {
            return Err(CompileError::ArithmeticFailure {
                position: site.position,
                opcode: site.opcode,
                reason: "empty operand group".to_string(),
            });
        };
        let first = resolve(self, site, first)?;
        let mut lanes: [T; N] = std::array::from_fn(|_| first.clone());
        for (lane, &id) in lanes.iter_mut().zip(ids).skip(1) {
            *lane = resolve(self, site, id)?;
        }
        Ok(lanes)
    }

    // ========== Shared instruction shapes ==========

    fn var_op(
        &mut self,
        site: Site,
        dst: VarId,
        lhs: VarId,
        rhs: VarId,
        op: impl FnOnce(&mut B, &B::Var, &B::Var) -> BackendResult<B::Var>,
    ) -> Result<()> {
        let (a, b) = (self.var(site, lhs)?, self.var(site, rhs)?);
        let v = op(&mut self.builder, &a, &b).map_err(|e| site.backend(e))?;
        self.env.define_var(dst, v);
        Ok(())
    }

    fn felt_op(
        &mut self,
        site: Site,
        dst: FeltId,
        lhs: FeltId,
        rhs: FeltId,
        op: impl FnOnce(&mut B, &B::Felt, &B::Felt) -> BackendResult<B::Felt>,
    ) -> Result<()> {
        let (a, b) = (self.felt(site, lhs)?, self.felt(site, rhs)?);
        let v = op(&mut self.builder, &a, &b).map_err(|e| site.backend(e))?;
        self.env.define_felt(dst, v);
        Ok(())
    }

    fn ext_op(
        &mut self,
        site: Site,
        dst: ExtId,
        lhs: ExtId,
        rhs: ExtId,
        op: impl FnOnce(&mut B, &B::Ext, &B::Ext) -> BackendResult<B::Ext>,
    ) -> Result<()> {
        let (a, b) = (self.ext(site, lhs)?, self.ext(site, rhs)?);
        let v = op(&mut self.builder, &a, &b).map_err(|e| site.backend(e))?;
        self.env.define_ext(dst, v);
        Ok(())
    }

    fn ext_felt_op(
        &mut self,
        site: Site,
        dst: ExtId,
        lhs: ExtId,
        rhs: FeltId,
        op: impl FnOnce(&mut B, &B::Ext, &B::Felt) -> BackendResult<B::Ext>,
    ) -> Result<()> {
        let (a, b) = (self.ext(site, lhs)?, self.felt(site, rhs)?);
        let v = op(&mut self.builder, &a, &b).map_err(|e| site.backend(e))?;
        self.env.define_ext(dst, v);
        Ok(())
    }

    fn define_bits(&mut self, site: Site, names: &[VarId], bits: Vec<B::Var>) -> Result<()> {
        if names.len() != bits.len() {
            return Err(CompileError::ArithmeticFailure {
                position: site.position,
                opcode: site.opcode,
                reason: format!("{} bits produced for {} outputs", bits.len(), names.len()),
            });
        }
        for (id, bit) in names.iter().zip(bits) {
            self.env.define_var(*id, bit);
        }
        Ok(())
    }

    fn print(&mut self, site: Site, operand: Operand, value: Option<String>) {
        let symbol = self.symbols.name(operand);
        let domain: Domain = operand.domain;
        let position = site.position;
        match value {
            Some(value) => info!(target: PRINT_TARGET, position, %domain, symbol, "{}", value),
            None => info!(target: PRINT_TARGET, position, %domain, symbol, "<unassigned>"),
        }
        self.counters.prints += 1;
    }
}
