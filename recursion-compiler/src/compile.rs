//! Compilation driver

use crate::config::{CompileMode, CompilerConfig};
use crate::error::Result;
use crate::execute::Interpreter;
use crate::r1cs::R1csBuilder;
use crate::witness::WitnessSource;
use ark_bn254::Fr;
use ark_r1cs_std::fields::fp::FpVar;
use ark_relations::r1cs::{ConstraintMatrices, ConstraintSystemRef, SynthesisError};
use recursion_ir::{validate, ConstraintRecord, Program, Witness};
use tracing::{debug, info_span, warn};

/// Size of a compiled circuit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CircuitStats {
    /// Instructions executed
    pub instructions: usize,
    pub constraints: usize,
    /// Public inputs, excluding the constant one
    pub public_inputs: usize,
    pub witness_variables: usize,
    /// Assertions issued by AssertEq instructions
    pub assertions: usize,
    pub commitments: usize,
    /// Distinct witness entries bound
    pub witness_bindings: usize,
    pub prints: usize,
}

/// A constraint system together with its public interface
pub struct CompiledCircuit {
    pub cs: ConstraintSystemRef<Fr>,
    pub mode: CompileMode,
    pub vkey_hash: FpVar<Fr>,
    pub committed_values_digest: FpVar<Fr>,
    pub stats: CircuitStats,
}

impl CompiledCircuit {
    pub fn num_constraints(&self) -> usize {
        self.cs.num_constraints()
    }

    /// Whether the assignment satisfies every constraint.
    ///
    /// Only meaningful for [`CompileMode::Prove`]; a shape-only circuit has
    /// no assignment and reports [`SynthesisError::AssignmentMissing`].
    pub fn is_satisfied(&self) -> std::result::Result<bool, SynthesisError> {
        if self.mode == CompileMode::Shape {
            return Err(SynthesisError::AssignmentMissing);
        }
        self.cs.is_satisfied()
    }

    /// Index of the first unsatisfied constraint, if any
    pub fn which_is_unsatisfied(&self) -> std::result::Result<Option<String>, SynthesisError> {
        if self.mode == CompileMode::Shape {
            return Err(SynthesisError::AssignmentMissing);
        }
        self.cs.which_is_unsatisfied()
    }

    /// Finalize the system and export its R1CS matrices
    pub fn matrices(&self) -> Option<ConstraintMatrices<Fr>> {
        self.cs.finalize();
        self.cs.to_matrices()
    }
}

/// Compiles decoded programs into R1CS
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile `program` against `witness`.
    ///
    /// Every instruction is executed once, in order. The first failure aborts
    /// the compilation and nothing built so far is returned.
    pub fn compile(&self, program: &Program, witness: &Witness) -> Result<CompiledCircuit> {
        self.run(program, WitnessSource::Values(witness), self.config.mode)
    }

    /// Compile only the constraint structure.
    ///
    /// No witness is consulted: every bound index becomes an unassigned
    /// variable, whatever its value.
    pub fn compile_shape(&self, program: &Program) -> Result<CompiledCircuit> {
        self.run(program, WitnessSource::Unassigned, CompileMode::Shape)
    }

    fn run(
        &self,
        program: &Program,
        witness: WitnessSource<'_>,
        mode: CompileMode,
    ) -> Result<CompiledCircuit> {
        let span = info_span!("compile", instructions = program.len(), ?mode);
        let _enter = span.enter();

        if self.config.lint {
            self.lint(program);
        }

        let builder = R1csBuilder::new(mode, self.config.poseidon2.clone());
        let mut interp = Interpreter::new(builder, &program.symbols, witness, self.config.trace)?;
        for (position, inst) in program.iter().enumerate() {
            interp.execute(position, inst)?;
        }
        let done = interp.finish();

        let cs = done.builder.into_cs();
        let stats = CircuitStats {
            instructions: program.len(),
            constraints: cs.num_constraints(),
            public_inputs: cs.num_instance_variables().saturating_sub(1),
            witness_variables: cs.num_witness_variables(),
            assertions: done.counters.assertions,
            commitments: done.counters.commitments,
            witness_bindings: done.witness_bindings,
            prints: done.counters.prints,
        };
        debug!(
            constraints = stats.constraints,
            witness_variables = stats.witness_variables,
            assertions = stats.assertions,
            witness_bindings = stats.witness_bindings,
            "compiled"
        );

        Ok(CompiledCircuit {
            cs,
            mode,
            vkey_hash: done.publics.vkey_hash,
            committed_values_digest: done.publics.committed_values_digest,
            stats,
        })
    }

    /// Decode and compile raw constraint records
    pub fn compile_records(
        &self,
        records: &[ConstraintRecord],
        witness: &Witness,
    ) -> Result<CompiledCircuit> {
        let program = Program::decode(records)?;
        self.compile(&program, witness)
    }

    /// Decode and compile a JSON instruction list
    pub fn compile_json(&self, json: &str, witness: &Witness) -> Result<CompiledCircuit> {
        let program = Program::from_json(json)?;
        self.compile(&program, witness)
    }

    fn lint(&self, program: &Program) {
        let report = validate(program);
        for err in &report.errors {
            warn!(%err, "lint");
        }
        for warning in &report.warnings {
            warn!(?warning, "lint");
        }
    }
}
