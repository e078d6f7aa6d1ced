use criterion::{black_box, criterion_group, criterion_main, Criterion};
use recursion_compiler::{Compiler, CompilerConfig};
use recursion_ir::{BabyBear, ConstraintRecord, NativeLiteral, Program, Witness, WitnessShape};

fn owned(opcode: &str, args: Vec<Vec<String>>) -> ConstraintRecord {
    ConstraintRecord {
        opcode: opcode.to_string(),
        args,
    }
}

/// A felt multiply-accumulate chain followed by one BabyBear permutation
fn felt_program(len: usize) -> Program {
    let mut records = vec![
        owned("WitnessF", vec![vec!["x".into()], vec!["0".into()]]),
        owned("ImmF", vec![vec!["acc".into()], vec!["1".into()]]),
    ];
    for _ in 0..len {
        records.push(owned(
            "MulF",
            vec![vec!["acc".into()], vec!["acc".into()], vec!["x".into()]],
        ));
        records.push(owned(
            "AddF",
            vec![vec!["acc".into()], vec!["acc".into()], vec!["x".into()]],
        ));
    }
    let lanes: Vec<String> = (0..16).map(|i| format!("s{}", i)).collect();
    for lane in &lanes {
        records.push(owned("AddF", vec![vec![lane.clone()], vec!["acc".into()], vec!["x".into()]]));
    }
    records.push(owned("PermuteBabyBear", lanes.iter().map(|l| vec![l.clone()]).collect()));
    Program::decode(&records).expect("benchmark program decodes")
}

/// A native multiply chain followed by one native permutation
fn native_program(len: usize) -> Program {
    let mut records = vec![owned("WitnessV", vec![vec!["x".into()], vec!["0".into()]])];
    records.push(owned("ImmV", vec![vec!["acc".into()], vec!["1".into()]]));
    for _ in 0..len {
        records.push(owned(
            "MulV",
            vec![vec!["acc".into()], vec!["acc".into()], vec!["x".into()]],
        ));
    }
    records.push(owned("Permute", vec![vec!["acc".into()], vec!["x".into()], vec!["acc".into()]]));
    Program::decode(&records).expect("benchmark program decodes")
}

fn bench_compile(c: &mut Criterion) {
    let mut witness = Witness::placeholder(WitnessShape {
        vars: 1,
        felts: 1,
        exts: 0,
    });
    witness.vars[0] = NativeLiteral::from(3);
    witness.felts[0] = BabyBear::new(123_456_789);
    let compiler = Compiler::new(CompilerConfig {
        lint: false,
        ..CompilerConfig::default()
    });

    let felts = felt_program(256);
    c.bench_function("compile_felt_chain_256", |b| {
        b.iter(|| black_box(compiler.compile(&felts, &witness).expect("compiles").num_constraints()))
    });

    let native = native_program(1024);
    c.bench_function("compile_native_chain_1024", |b| {
        b.iter(|| black_box(compiler.compile(&native, &witness).expect("compiles").num_constraints()))
    });

    c.bench_function("compile_shape_felt_chain_256", |b| {
        b.iter(|| black_box(compiler.compile_shape(&felts).expect("compiles").num_constraints()))
    });
}

criterion_group!(benches, bench_compile);
criterion_main!(benches);
