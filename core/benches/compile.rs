//! Compile benchmarks: expression → graph construction.
//!
//! Measures the one-time cost of lowering an expression tree into a graph,
//! including the unrolling of bounded repetition.

use tokre::prelude::*;

fn main() {
    divan::main();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Catalog patterns
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn compile_email(bencher: divan::Bencher) {
    let expr = email();
    bencher.bench_local(|| Program::compile(&expr));
}

#[divan::bench]
fn compile_url(bencher: divan::Bencher) {
    let expr = url();
    bencher.bench_local(|| Program::compile(&expr));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Scaling
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench(args = [1, 10, 100, 1000])]
fn compile_n_literal(bencher: divan::Bencher, n: usize) {
    let expr = seq("abcdefghij".chars().cycle().take(n));
    bencher.bench_local(|| Program::compile(&expr));
}

#[divan::bench(args = [1, 10, 50, 100])]
fn compile_n_alternatives(bencher: divan::Bencher, n: usize) {
    let words: Vec<String> = (0..n).map(|i| format!("word{i}")).collect();
    let expr = words
        .iter()
        .map(|w| seq(w.chars()))
        .reduce(|a, b| a | b)
        .unwrap();
    bencher.bench_local(|| Program::compile(&expr));
}

#[divan::bench(args = [1, 10, 50, 100])]
fn compile_bounded_repeat(bencher: divan::Bencher, n: usize) {
    let expr = capture("d", digit()).unwrap().between(0, n).unwrap();
    bencher.bench_local(|| Program::compile(&expr));
}

#[divan::bench(args = [1, 4, 16, 32])]
fn compile_nested_repeat(bencher: divan::Bencher, depth: usize) {
    let mut expr = alpha();
    for _ in 0..depth {
        expr = repeat(expr + digit());
    }
    bencher.bench_local(|| Program::compile(&expr));
}

#[divan::bench(args = [128, 256, 512, 1024])]
fn compile_wide_optional_chain(bencher: divan::Bencher, n: usize) {
    let expr = alpha().between(0, n).unwrap();
    bencher.bench_local(|| Program::compile(&expr));
}
