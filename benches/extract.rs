// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use lessonmap::format::mermaid::{distinct_labels, extract_nodes};

/// A `graph TD` chain of `nodes` declarations, each linked to its predecessor.
fn flowchart(nodes: usize, label_words: usize) -> String {
    let mut out = String::from("graph TD\n");
    for i in 0..nodes {
        let label = (0..label_words)
            .map(|w| format!("word{}", (i + w) % 17))
            .collect::<Vec<_>>()
            .join(" ");
        if i == 0 {
            out.push_str(&format!("    N{i}[{label}]\n"));
        } else {
            out.push_str(&format!("    N{}[Step {}] --> N{i}[{label}]\n", i - 1, i - 1));
        }
    }
    out
}

// Case IDs (the string after the `/`) stay stable so results remain comparable.
fn benches_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("format.extract_nodes");

    for (case_id, nodes, words) in [
        ("small", 12, 2),
        ("medium", 120, 4),
        ("large_long_labels", 1200, 24),
    ] {
        let mmd = flowchart(nodes, words);
        group.throughput(Throughput::Bytes(mmd.len() as u64));
        group.bench_function(case_id, move |b| {
            b.iter(|| {
                let found = extract_nodes(black_box(&mmd));
                black_box(distinct_labels(black_box(&found)).len())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benches_extract);
criterion_main!(benches);
