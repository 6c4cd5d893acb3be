//! Benchmarks for the per-keystroke hot paths: diffing, undo and
//! highlighting.
//!
//! Run with: cargo bench

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use modex_buffer::{History, Position, TextBuffer, apply_diff, compute_diff};
use modex_syntax::{Highlighter, Language, SyntaxConfig, tokenize};

/// Generates a TypeScript-looking document for benchmarking.
fn generate_lines(lines: usize) -> Vec<String> {
    (0..lines)
        .map(|i| format!("const value{i}: number = {i} * 2; // line {i} of the sample"))
        .collect()
}

/// Benchmarks diffing a buffer against a one-line edit of itself.
fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff");

    for size in [100, 1000, 10000] {
        let old = generate_lines(size);
        let mut new = old.clone();
        new[size / 2].push_str(" edited");

        group.bench_with_input(BenchmarkId::new("compute_one_line", size), &size, |b, _| {
            b.iter(|| black_box(compute_diff(black_box(&old), black_box(&new))))
        });

        let diffs = compute_diff(&old, &new);
        group.bench_with_input(BenchmarkId::new("apply_reverse", size), &size, |b, _| {
            b.iter(|| black_box(apply_diff(black_box(&new), &diffs, true)))
        });
    }

    group.finish();
}

/// Benchmarks an insert session: one commit per typed character, then undo.
fn bench_typing_and_undo(c: &mut Criterion) {
    let mut group = c.benchmark_group("typing");
    let base = TextBuffer::from_lines(generate_lines(1000));

    group.bench_function("type_50_chars_grouped_then_undo", |b| {
        b.iter_with_setup(
            || (base.clone(), History::<()>::new(20)),
            |(mut buffer, mut history)| {
                history.begin_group();
                let mut cursor = Position::new(500, 0);
                for _ in 0..50 {
                    let edit = buffer.insert_char(cursor, 'x').unwrap();
                    history.record(buffer.lines(), &edit.lines, ());
                    buffer.replace(edit.lines);
                    cursor = edit.cursor;
                }
                history.end_group();
                let undone = history.undo(buffer.lines(), ());
                black_box(undone)
            },
        )
    });

    group.finish();
}

/// Benchmarks the tokenizer and the cached highlighter.
fn bench_highlight(c: &mut Criterion) {
    let mut group = c.benchmark_group("highlight");
    let lines = generate_lines(100);

    group.bench_function("tokenize_100_lines", |b| {
        b.iter(|| {
            for line in &lines {
                black_box(tokenize(black_box(line), Language::TypeScript));
            }
        })
    });

    group.bench_function("highlight_100_lines_cached", |b| {
        let mut highlighter = Highlighter::new(SyntaxConfig::default());
        highlighter.highlight_lines(Some("bench.ts"), lines.iter().map(String::as_str));
        b.iter(|| {
            black_box(highlighter.highlight_lines(Some("bench.ts"), lines.iter().map(String::as_str)))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_diff, bench_typing_and_undo, bench_highlight);
criterion_main!(benches);
