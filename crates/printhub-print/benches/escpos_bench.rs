// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for ESC/POS document encoding and charset conversion
// in the printhub-print crate.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use printhub_core::types::{PrintIntent, ReceiptItem, ReceiptJob, TextJob};
use printhub_print::charset::encode_text;
use printhub_print::encoder::encode;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A receipt with `count` lines, some long enough to be truncated.
fn build_receipt(count: usize) -> ReceiptJob {
    let items = (0..count)
        .map(|i| ReceiptItem {
            name: if i % 3 == 0 {
                format!("Seasonal blend coffee beans #{i}")
            } else {
                format!("Item {i}")
            },
            quantity: (i % 5 + 1) as u32,
            unit_price: 1.25 + i as f64,
        })
        .collect();
    ReceiptJob {
        items,
        total: 999.99,
        header: Some("Corner Shop".into()),
        footer: Some("Thank you!".into()),
        timestamp_label: Some("16 Oct 2026 09:30".into()),
        encoding: "utf-8".into(),
    }
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_receipt(c: &mut Criterion) {
    let small = PrintIntent::receipt(build_receipt(3)).expect("valid receipt");
    c.bench_function("encode_receipt (3 items)", |b| {
        b.iter(|| encode(black_box(&small)))
    });

    let large = PrintIntent::receipt(build_receipt(200)).expect("valid receipt");
    c.bench_function("encode_receipt (200 items)", |b| {
        b.iter(|| encode(black_box(&large)))
    });
}

fn bench_text(c: &mut Criterion) {
    let body = "The quick brown fox jumps over the lazy dog.\n".repeat(4096 / 45);
    let intent = PrintIntent::text(TextJob::new(body)).expect("valid text");
    c.bench_function("encode_text (4 KiB utf-8)", |b| {
        b.iter(|| encode(black_box(&intent)))
    });
}

fn bench_charset(c: &mut Criterion) {
    let latin = "Crème brûlée, façade, naïve — €4.50\n".repeat(100);
    c.bench_function("charset windows-1252 (mixed)", |b| {
        b.iter(|| encode_text(black_box(&latin), "windows-1252"))
    });

    let cjk = "中文收据 打印测试 ✓\n".repeat(100);
    c.bench_function("charset gbk (unmappable glyphs)", |b| {
        b.iter(|| encode_text(black_box(&cjk), "gbk"))
    });
}

criterion_group!(benches, bench_receipt, bench_text, bench_charset);
criterion_main!(benches);
