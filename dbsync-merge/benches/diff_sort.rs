//! Diff and sort benchmarks.
//!
//! ```bash
//! cargo bench -p dbsync-merge --bench diff_sort
//! ```

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use dbsync_merge::{MergeDirection, MergerTokenFactory, SchemaDiffer, sort_tokens};
use dbsync_schema::{DataMap, DbAttribute, DbEntity, DbRelationship, SqlType};

/// `tables` tables of 12 columns, each but the first pointing at its predecessor.
fn schema(tables: usize, widen: bool) -> DataMap {
    let mut map = DataMap::new("bench");

    for t in 0..tables {
        let mut entity = DbEntity::new(format!("TABLE_{}", t))
            .with_attribute(DbAttribute::new("ID", SqlType::BigInt).primary_key());

        for c in 0..10 {
            let length = if widen && c % 3 == 0 { 200 } else { 100 };
            entity.add_attribute(
                DbAttribute::new(format!("COL_{}", c), SqlType::VarChar).with_max_length(length),
            );
        }

        if t > 0 {
            entity.add_attribute(DbAttribute::new("PARENT_ID", SqlType::BigInt).foreign_key());
            entity.add_relationship(
                DbRelationship::new("parent", format!("TABLE_{}", t - 1)).join("PARENT_ID", "ID"),
            );
        }

        map.add_db_entity(entity);
    }

    map
}

fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff");
    let factory = MergerTokenFactory::generic();

    for tables in [10, 100, 500] {
        let empty = DataMap::new("empty");
        let source = schema(tables, false);
        let target = schema(tables, true);

        group.bench_with_input(BenchmarkId::new("create_all", tables), &tables, |b, _| {
            b.iter(|| {
                SchemaDiffer::new(&factory).diff(
                    black_box(&empty),
                    black_box(&target),
                    MergeDirection::ToDb,
                )
            })
        });

        group.bench_with_input(BenchmarkId::new("alter_columns", tables), &tables, |b, _| {
            b.iter(|| {
                SchemaDiffer::new(&factory).diff(
                    black_box(&source),
                    black_box(&target),
                    MergeDirection::ToDb,
                )
            })
        });
    }

    group.finish();
}

fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort");
    let factory = MergerTokenFactory::generic();

    for tables in [10, 100, 500] {
        let mut tokens = SchemaDiffer::new(&factory).diff(
            &schema(tables, false),
            &schema(tables, true),
            MergeDirection::ToDb,
        );
        tokens.extend(SchemaDiffer::new(&factory).diff(
            &DataMap::new("empty"),
            &schema(tables, false),
            MergeDirection::ToDb,
        ));
        tokens.reverse();

        group.bench_with_input(BenchmarkId::from_parameter(tokens.len()), &tokens, |b, tokens| {
            b.iter(|| {
                let mut batch = tokens.clone();
                sort_tokens(black_box(&mut batch));
                batch
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_diff, bench_sort);
criterion_main!(benches);
