//! Benchmarks for pattern matching and config merging
//!
//! These cover the per-entry hot paths of a composition run:
//! - Exclusion checks (every entry of every layer)
//! - Config parsing and addon merging (every config pair)
//! - Whole-tree composition on a synthetic layer pair

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use laminate_engine::{
    AbsPath, AddonNaming, ConfigDocument, ExclusionSet, LayerComposer, RealSystem, merge,
};
use std::fmt::Write as _;
use std::hint::black_box;
use tempfile::TempDir;

/// Build a config document with `sections` sections of `keys` keys each
fn make_document(sections: usize, keys: usize) -> String {
    let mut text = String::new();
    for s in 0..sections {
        let _ = writeln!(text, "[SECTION_{s}]");
        for k in 0..keys {
            let _ = writeln!(text, "KEY_{k}={}", s * keys + k);
        }
    }
    text
}

/// Benchmark exclusion checks against a realistic pattern set
fn bench_exclusion(c: &mut Criterion) {
    let set = ExclusionSet::new(&[
        "~*",
        "*.tmp",
        "Thumbs.db",
        "**/.git/**",
        "skins/**/*.psd",
        "texture/**/source_*",
    ]);

    let paths = [
        "data/car.ini",
        "data/~car.ini",
        "skins/red/sub/livery.psd",
        "skins/red/sub/livery.dds",
        "sfx/.git/objects/ab/cdef0123",
        "texture/a/b/c/d/e/f/body.png",
    ];

    c.bench_function("exclusion_check", |b| {
        b.iter(|| {
            for path in &paths {
                black_box(set.is_excluded_str(black_box(path)));
            }
        });
    });
}

/// Benchmark config parsing (done for every config pair)
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("config_parse");

    for sections in &[5, 50, 200] {
        let text = make_document(*sections, 10);
        group.bench_with_input(BenchmarkId::from_parameter(sections), &text, |b, text| {
            b.iter(|| black_box(ConfigDocument::parse(black_box(text))));
        });
    }

    group.finish();
}

/// Benchmark merging an addon over a base document
fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("config_merge");

    for sections in &[5, 50, 200] {
        let base = ConfigDocument::parse(&make_document(*sections, 10))
            .expect("Failed to parse base document");
        let mut addon_text = make_document(sections / 2, 4);
        addon_text.push_str("[SECTION_1]\nDELETE=1\n[EXTRA]\nON=1\n");
        let addon = ConfigDocument::parse(&addon_text).expect("Failed to parse addon");

        group.bench_with_input(BenchmarkId::from_parameter(sections), &base, |b, base| {
            b.iter(|| black_box(merge(base.clone(), black_box(&addon))));
        });
    }

    group.finish();
}

/// Create a base/variant pair with `num_files` files per layer
fn create_layers(num_files: usize) -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    for layer in ["base", "variant"] {
        let data = temp.path().join(layer).join("data");
        std::fs::create_dir_all(&data).expect("Failed to create layer directory");

        for i in 0..num_files {
            let filename = match (layer, i % 3) {
                ("variant", 0) => format!("config_{i}.addon.ini"),
                (_, 0) => format!("config_{i}.ini"),
                (_, 1) => format!("texture_{i}.dds"),
                _ => format!("~scratch_{i}.txt"),
            };
            let content = if filename.ends_with(".ini") {
                make_document(4, 6)
            } else {
                format!("Content for file {i}\n")
            };
            std::fs::write(data.join(&filename), content)
                .unwrap_or_else(|_| panic!("Failed to write file: {filename}"));
        }
    }
    temp
}

/// Benchmark a full composition run
fn bench_compose(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose");
    group.sample_size(20);

    let exclusions = ExclusionSet::new(&["~*"]);
    let naming = AddonNaming::default();

    for size in &[30, 300] {
        let temp = create_layers(*size);
        let root = AbsPath::new(temp.path().to_path_buf()).expect("Failed to create AbsPath");
        let base = root.join_name("base");
        let variant = root.join_name("variant");

        group.bench_with_input(BenchmarkId::from_parameter(size), &root, |b, root| {
            let mut run = 0usize;
            b.iter(|| {
                run += 1;
                let out = root.join_name(&format!("out_{run}"));
                let report = LayerComposer::new(&RealSystem, &exclusions, &naming)
                    .compose(&base, &variant, &out)
                    .expect("Composition failed");
                black_box(report)
            });
        });
    }

    group.finish();
}

// Allow missing docs for criterion-generated code
#[allow(missing_docs)]
#[allow(clippy::wildcard_imports)]
mod bench_groups {
    use super::*;

    criterion_group!(
        benches,
        bench_exclusion,
        bench_parse,
        bench_merge,
        bench_compose,
    );
}

criterion_main!(bench_groups::benches);
