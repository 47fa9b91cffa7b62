use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use marksmith_engine::{MarkdownOptions, formula, markdown};
mod common;

fn bench_markdown(c: &mut Criterion) {
    let mut group = c.benchmark_group("markdown");
    group.sample_size(10);

    let opts = MarkdownOptions::default();
    let grammar = markdown::grammar(&opts);

    for size in [10, 100] {
        let content = common::generate_markdown_content(size);
        group.bench_with_input(BenchmarkId::new("mixed", size), &content, |b, content| {
            b.iter(|| std::hint::black_box(grammar.parse(std::hint::black_box(content))));
        });
    }

    let lists = common::generate_nested_lists(200, 5);
    group.bench_function("nested_lists", |b| {
        b.iter(|| std::hint::black_box(grammar.parse(std::hint::black_box(&lists))));
    });

    let references = common::generate_reference_heavy(200);
    group.bench_function("references", |b| {
        b.iter(|| std::hint::black_box(grammar.parse(std::hint::black_box(&references))));
    });

    group.finish();
}

fn bench_tokenize_only(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");
    group.sample_size(10);

    let grammar = markdown::grammar(&MarkdownOptions::default());
    let content = common::generate_markdown_content(100);
    group.bench_function("markdown", |b| {
        b.iter(|| std::hint::black_box(grammar.tokenizer.tokenize(std::hint::black_box(&content))));
    });

    group.finish();
}

fn bench_formula(c: &mut Criterion) {
    let mut group = c.benchmark_group("formula");
    group.sample_size(10);

    let grammar = formula::grammar();
    let source = common::generate_formula(100);
    group.bench_function("fractions", |b| {
        b.iter(|| std::hint::black_box(grammar.parse(std::hint::black_box(&source))));
    });

    group.finish();
}

criterion_group!(benches, bench_markdown, bench_tokenize_only, bench_formula);
criterion_main!(benches);
