//! Recursion IR compiler CLI

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use recursion_compiler::{CompiledCircuit, Compiler, CompilerConfig};
use recursion_ir::{validate, Program, Witness};

#[derive(Parser)]
#[command(name = "recursion")]
#[command(about = "Compile recursion IR programs into R1CS", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a constraint program, optionally checking a witness against it
    Compile {
        /// Path to the instruction list
        #[arg(short, long, env = "CONSTRAINTS_JSON", default_value = "constraints.json")]
        constraints: PathBuf,

        /// Path to the witness; without one only the circuit shape is built
        #[arg(short, long, env = "WITNESS_JSON")]
        witness: Option<PathBuf>,

        /// Log every instruction as it is compiled
        #[arg(long)]
        trace: bool,
    },

    /// Check a constraint program without compiling it
    Lint {
        /// Path to the instruction list
        #[arg(short, long, env = "CONSTRAINTS_JSON", default_value = "constraints.json")]
        constraints: PathBuf,
    },

    /// Print a constraint program as a listing
    List {
        /// Path to the instruction list
        #[arg(short, long, env = "CONSTRAINTS_JSON", default_value = "constraints.json")]
        constraints: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Compile {
            constraints,
            witness,
            trace,
        } => cmd_compile(&constraints, witness.as_deref(), trace),
        Commands::Lint { constraints } => cmd_lint(&constraints),
        Commands::List { constraints } => cmd_list(&constraints),
    }
}

fn load_program(path: &Path) -> Result<Program> {
    info!("Loading constraints from {:?}", path);
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let program = Program::from_reader(BufReader::new(file))
        .with_context(|| format!("decoding {}", path.display()))?;
    info!("Decoded {} instructions", program.len());
    Ok(program)
}

fn load_witness(path: &Path) -> Result<Witness> {
    info!("Loading witness from {:?}", path);
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Witness::from_reader(BufReader::new(file)).with_context(|| format!("decoding {}", path.display()))
}

fn cmd_compile(constraints: &Path, witness: Option<&Path>, trace: bool) -> Result<()> {
    let program = load_program(constraints)?;
    let compiler = Compiler::new(CompilerConfig {
        trace,
        ..CompilerConfig::default()
    });

    match witness {
        Some(path) => {
            let witness = load_witness(path)?;
            let circuit = compiler.compile(&program, &witness)?;
            report(&circuit);
            match circuit.which_is_unsatisfied()? {
                None => println!("Witness: SATISFIED"),
                Some(constraint) => {
                    println!("Witness: UNSATISFIED");
                    warn!("First unsatisfied constraint: {}", constraint);
                    std::process::exit(1);
                }
            }
        }
        None => {
            info!("No witness given; building circuit shape only");
            let circuit = compiler.compile_shape(&program)?;
            report(&circuit);
        }
    }

    Ok(())
}

fn report(circuit: &CompiledCircuit) {
    let stats = &circuit.stats;
    println!("Circuit ({:?} mode)", circuit.mode);
    println!("  Instructions:      {}", stats.instructions);
    println!("  Constraints:       {}", stats.constraints);
    println!("  Public inputs:     {}", stats.public_inputs);
    println!("  Witness variables: {}", stats.witness_variables);
    println!("  Witness bindings:  {}", stats.witness_bindings);
    println!("  Assertions:        {}", stats.assertions);
    println!("  Commitments:       {}", stats.commitments);
}

fn cmd_lint(constraints: &Path) -> Result<()> {
    let program = load_program(constraints)?;
    let report = validate(&program);

    for err in &report.errors {
        println!("error: {}", err);
    }
    for warning in &report.warnings {
        println!("warning: {:?}", warning);
    }

    if report.is_valid() {
        println!(
            "Lint: PASSED ({} warnings)",
            report.warnings.len()
        );
        Ok(())
    } else {
        anyhow::bail!("{} lint errors", report.errors.len())
    }
}

fn cmd_list(constraints: &Path) -> Result<()> {
    let program = load_program(constraints)?;
    print!("{}", program.listing());
    Ok(())
}
