//! Benchmarks for the LS-8 execution engine.
//!
//! Run with: cargo bench -p ls8-vm --bench exec_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ls8_vm::{loader, Cpu, Opcode};

// ============================================================================
// Helper Functions
// ============================================================================

fn setup_cpu(image: &[u8]) -> Cpu {
    let mut cpu = Cpu::new();
    cpu.load(image).unwrap();
    cpu
}

fn run_to_halt(image: &[u8]) -> Cpu {
    let mut cpu = setup_cpu(image);
    cpu.run().unwrap();
    cpu
}

// ============================================================================
// Instruction Dispatch Benchmarks
// ============================================================================

fn bench_instruction_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("Instruction-Dispatch");

    let ldi = vec![Opcode::Ldi as u8, 0, 8, Opcode::Hlt as u8];
    let add = vec![
        Opcode::Ldi as u8,
        0,
        1,
        Opcode::Ldi as u8,
        1,
        2,
        Opcode::Add as u8,
        0,
        1,
        Opcode::Hlt as u8,
    ];
    let mul = vec![
        Opcode::Ldi as u8,
        0,
        9,
        Opcode::Ldi as u8,
        1,
        8,
        Opcode::Mul as u8,
        0,
        1,
        Opcode::Hlt as u8,
    ];
    let push_pop = vec![
        Opcode::Ldi as u8,
        0,
        5,
        Opcode::Push as u8,
        0,
        Opcode::Pop as u8,
        1,
        Opcode::Hlt as u8,
    ];
    let call_ret = vec![
        Opcode::Ldi as u8,
        0,
        7,
        Opcode::Call as u8,
        0,
        Opcode::Hlt as u8,
        0,
        Opcode::Ret as u8,
    ];
    let cmp_jeq = vec![
        Opcode::Ldi as u8,
        0,
        3,
        Opcode::Ldi as u8,
        1,
        3,
        Opcode::Ldi as u8,
        2,
        17,
        Opcode::Cmp as u8,
        0,
        1,
        Opcode::Jeq as u8,
        2,
        Opcode::Ldi as u8,
        3,
        1,
        Opcode::Hlt as u8,
    ];

    for (name, image) in [
        ("LDI", &ldi),
        ("ADD", &add),
        ("MUL", &mul),
        ("PUSH/POP", &push_pop),
        ("CALL/RET", &call_ret),
        ("CMP/JEQ", &cmp_jeq),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), image, |b, image| {
            b.iter(|| black_box(run_to_halt(image)))
        });
    }

    group.finish();
}

// ============================================================================
// Step Throughput Benchmark
// ============================================================================

fn bench_step_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("Step-Throughput");

    // DEC/CMP/JGT loop from 255 down to 0: 768 instructions per run.
    let image = vec![
        Opcode::Ldi as u8,
        0,
        255,
        Opcode::Ldi as u8,
        1,
        0,
        Opcode::Ldi as u8,
        2,
        9,
        Opcode::Dec as u8,
        0,
        Opcode::Cmp as u8,
        0,
        1,
        Opcode::Jgt as u8,
        2,
        Opcode::Hlt as u8,
    ];

    group.bench_function("countdown_255", |b| {
        b.iter(|| black_box(run_to_halt(&image)))
    });

    group.finish();
}

// ============================================================================
// Whole-Program Benchmarks
// ============================================================================

fn bench_program_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("Program-Run");

    let images = [
        ("mult", loader::parse_image(include_str!("../../../programs/mult.ls8"))),
        ("call", loader::parse_image(include_str!("../../../programs/call.ls8"))),
        (
            "countdown",
            loader::parse_image(include_str!("../../../programs/countdown.ls8")),
        ),
    ];

    for (name, image) in &images {
        group.bench_with_input(BenchmarkId::from_parameter(*name), image, |b, image| {
            b.iter(|| {
                let mut cpu = setup_cpu(image);
                cpu.run().unwrap();
                black_box(cpu.take_output())
            })
        });
    }

    group.finish();
}

// ============================================================================
// Tracing Overhead Benchmark
// ============================================================================

fn bench_tracing_overhead(c: &mut Criterion) {
    let mut group = c.benchmark_group("Tracing-Overhead");

    let image = loader::parse_image(include_str!("../../../programs/countdown.ls8"));

    group.bench_function("untraced", |b| {
        b.iter(|| black_box(run_to_halt(&image)))
    });

    group.bench_function("traced", |b| {
        b.iter(|| {
            let mut cpu = setup_cpu(&image);
            cpu.enable_tracing();
            cpu.run().unwrap();
            black_box(cpu.take_trace())
        })
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_instruction_dispatch,
    bench_step_throughput,
    bench_program_run,
    bench_tracing_overhead,
);

criterion_main!(benches);
