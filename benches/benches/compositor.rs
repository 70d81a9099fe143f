// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use thicket_styling::{
    IndexSet, NodeAppearance, NodeAppearanceCompositor, NodeAppearanceProvider, NodeCollection,
};

/// A provider with a ghosted default, a large in-front selection and a few
/// small recolored groups, roughly what a viewer with an active filter holds.
fn styled_provider(node_count: u32) -> (NodeAppearanceProvider, NodeCollection) {
    let provider = NodeAppearanceProvider::new();
    provider.set_default_appearance(NodeAppearance::GHOSTED);

    let selection = NodeCollection::from_range(0..node_count / 4);
    provider.assign_styled_node_collection(
        &selection,
        NodeAppearance::HIGHLIGHTED.with_render_ghosted(false),
    );

    for group in 0..8_u32 {
        let start = group * (node_count / 8);
        let members = IndexSet::from_range(start..start + node_count / 64);
        let channel = (group * 32) as u8;
        provider.assign_styled_node_collection(
            &NodeCollection::from_set(members),
            NodeAppearance::new().with_color([channel, 255 - channel, 128]),
        );
    }

    (provider, selection)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("compositor/build");
    group.sample_size(30);

    for node_count in [4_096_u32, 65_536, 1_048_576] {
        group.throughput(Throughput::Elements(u64::from(node_count)));

        let (provider, selection) = styled_provider(node_count);
        let mut compositor =
            NodeAppearanceCompositor::new(node_count as usize, &provider).unwrap();

        // Every iteration replaces the selection so the build is never skipped.
        let mut flip = false;
        group.bench_function(BenchmarkId::new("after_selection_change", node_count), |b| {
            b.iter(|| {
                flip = !flip;
                let end = if flip { node_count / 4 } else { node_count / 3 };
                selection.update_set(IndexSet::from_range(0..end));
                black_box(compositor.build());
            });
        });

        group.bench_function(BenchmarkId::new("clean", node_count), |b| {
            compositor.build();
            b.iter(|| black_box(compositor.build()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build);
criterion_main!(benches);
