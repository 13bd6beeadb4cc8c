//! Reshape and ranking throughput benchmarks over a synthetic wide table.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use vaxtrend::analysis::aggregate::{
    median_coverage_by_country, total_coverage_by_country_year,
};
use vaxtrend::data::reshape::melt;
use vaxtrend::data::workbook::{Cell, SheetTable};

const COUNTRIES: usize = 200;
const YEARS: usize = 40;

fn synthetic_wide() -> SheetTable {
    let mut header: Vec<String> = ["country", "iso3", "vaccine", "region"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    header.extend((0..YEARS).map(|offset| (1982 + offset).to_string()));

    let rows = (0..COUNTRIES)
        .map(|index| {
            let mut cells = vec![
                Cell::Text(format!("Country {index}")),
                Cell::Text(format!("C{index:02}")),
                Cell::Text("DTP3".to_string()),
                Cell::Text("Africa".to_string()),
            ];
            cells.extend((0..YEARS).map(|offset| {
                if (index + offset) % 7 == 0 {
                    Cell::Empty
                } else {
                    Cell::Number(((index * 13 + offset * 5) % 101) as f64)
                }
            }));
            cells
        })
        .collect();

    SheetTable {
        name: "DTP3".to_string(),
        header,
        rows,
    }
}

fn bench_melt(c: &mut Criterion) {
    let sheet = synthetic_wide();
    let mut group = c.benchmark_group("reshape");
    group.throughput(Throughput::Elements((COUNTRIES * YEARS) as u64));
    group.bench_function("melt_200x40", |b| {
        b.iter(|| melt(black_box(&sheet)).expect("synthetic sheet melts"))
    });
    group.finish();
}

fn bench_rankings(c: &mut Criterion) {
    let table = melt(&synthetic_wide()).expect("synthetic sheet melts");
    let mut group = c.benchmark_group("rankings");
    group.bench_function("median_by_country", |b| {
        b.iter(|| median_coverage_by_country(black_box(&table)))
    });
    group.bench_function("total_by_country_year", |b| {
        b.iter(|| total_coverage_by_country_year(black_box(&table), 2000))
    });
    group.finish();
}

criterion_group!(benches, bench_melt, bench_rankings);
criterion_main!(benches);
