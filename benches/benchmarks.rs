//! Benchmarks for the editor core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use paper_editor::layout::{compute_page_breaks, flow, EstimatingOracle, A4};
use paper_editor::{Document, Editor, PaginationHost};

fn long_document(paragraphs: usize) -> String {
    (0..paragraphs)
        .map(|i| {
            format!(
                "<p>Paragraph {} contains enough text to span multiple lines and test the line breaking algorithm.</p>",
                i
            )
        })
        .collect()
}

fn bench_insert_single_char(c: &mut Criterion) {
    c.bench_function("insert_single_char", |b| {
        let mut editor = Editor::new();
        b.iter(|| {
            editor.insert_text(1, black_box("x")).ok();
        });
    });
}

fn bench_flow_medium(c: &mut Criterion) {
    let html = long_document(200);
    c.bench_function("flow_medium_document", |b| {
        b.iter(|| flow(black_box(&html), &A4));
    });
}

fn bench_flow_large(c: &mut Criterion) {
    let html = long_document(2000);
    c.bench_function("flow_large_document", |b| {
        b.iter(|| flow(black_box(&html), &A4));
    });
}

fn bench_pagination_pass(c: &mut Criterion) {
    let doc = Document::from_html(&long_document(500)).unwrap();
    let oracle = EstimatingOracle::new(A4.usable_width());

    c.bench_function("pagination_pass_cold", |b| {
        b.iter(|| {
            let oracle = EstimatingOracle::new(A4.usable_width());
            compute_page_breaks(black_box(&doc), &oracle, &A4)
        });
    });

    c.bench_function("pagination_pass_cached", |b| {
        b.iter(|| compute_page_breaks(black_box(&doc), &oracle, &A4));
    });
}

fn bench_typing_with_pagination(c: &mut Criterion) {
    let oracle = EstimatingOracle::new(A4.usable_width());
    c.bench_function("type_and_repaginate", |b| {
        let mut editor = Editor::from_html(&long_document(100)).unwrap();
        b.iter(|| {
            editor.insert_text(1, "x").ok();
            let state = compute_page_breaks(editor.document(), &oracle, &A4);
            editor.apply_pagination(state).ok();
        });
    });
}

criterion_group!(
    benches,
    bench_insert_single_char,
    bench_flow_medium,
    bench_flow_large,
    bench_pagination_pass,
    bench_typing_with_pagination,
);
criterion_main!(benches);
