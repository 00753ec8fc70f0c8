//! Criterion benchmarks for cell conversion and table compilation.
//!
//! Two benchmark groups:
//! - `convert`: single-cell conversion of scalars, vectors, and nested lists
//! - `compile`: binding a generated 2000-row table end to end

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tabula_core::compiler::{DEFAULT_NAMESPACE, TableCompiler};
use tabula_core::convert::ValueConverter;
use tabula_core::raw::RawTable;
use tabula_core::test_utils::sample_catalog;
use tabula_core::types::{CompositeKind, PrimitiveKind, TypeDescriptor};

// ===========================================================================
// Fixtures
// ===========================================================================

/// A `Heroes` sheet with `rows` data rows covering every column kind the
/// compiler binds in practice.
fn build_sheet(rows: usize) -> RawTable {
    let mut records: Vec<Vec<String>> = vec![
        ["Name", "Level", "Speed", "Spawn", "Drops", "Rarity"]
            .map(String::from)
            .to_vec(),
        ["string", "int", "float", "Vector3", "int[][]", "Rarity"]
            .map(String::from)
            .to_vec(),
    ];
    for i in 0..rows {
        records.push(vec![
            format!("Hero{i}"),
            (i % 100).to_string(),
            format!("{}.5", i % 10),
            format!("({i}, {}, 0)", i * 2),
            format!("[[{i},{}],[],[7]]", i + 1),
            ["Common", "Rare", "Epic"][i % 3].to_string(),
        ]);
    }
    RawTable::from_records("Heroes.csv", records)
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_convert(c: &mut Criterion) {
    let converter = ValueConverter::without_assets();
    let int = TypeDescriptor::Primitive(PrimitiveKind::I32);
    let vector = TypeDescriptor::Composite(CompositeKind::Vector3);
    let nested = TypeDescriptor::array_of(TypeDescriptor::array_of(int.clone()));
    let nested_text = "[[1,2,3],[4,5,6],[],[7,8,9,10,11,12]]";

    let mut group = c.benchmark_group("convert");
    group.bench_function("int", |b| {
        b.iter(|| converter.convert(black_box("12345"), &int))
    });
    group.bench_function("vector3", |b| {
        b.iter(|| converter.convert(black_box("(1.5, -2, 3.25)"), &vector))
    });
    group.bench_function("nested_list", |b| {
        b.iter(|| converter.convert(black_box(nested_text), &nested))
    });
    group.finish();
}

fn bench_compile(c: &mut Criterion) {
    let catalog = sample_catalog();
    let compiler = TableCompiler::new(&catalog);
    let sheet = build_sheet(2000);

    let mut group = c.benchmark_group("compile");
    group.sample_size(20);
    group.bench_function("bind_2000_rows", |b| {
        b.iter(|| compiler.compile_raw(black_box(&sheet), DEFAULT_NAMESPACE))
    });
    group.finish();
}

criterion_group!(benches, bench_convert, bench_compile);
criterion_main!(benches);
