use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sched_items::{ItemDef, ItemRegistry, ItemSet, RegistryBuilder, RegistryDomain};

/// Registry with `count` primitive tags and one composite per block of eight.
fn registry(count: usize) -> Arc<ItemRegistry> {
	let builder = RegistryBuilder::new(RegistryDomain::Data);
	for i in 0..count {
		builder.register(ItemDef::tag(format!("t{i}"))).unwrap();
	}
	for block in 0..count / 8 {
		let parts: Vec<String> = (block * 8..block * 8 + 8).map(|i| format!("t{i}")).collect();
		builder
			.register(ItemDef::tag(format!("block{block}")).composed_of(parts))
			.unwrap();
	}
	Arc::new(builder.build().unwrap())
}

fn every_other(registry: &Arc<ItemRegistry>, count: usize) -> ItemSet {
	let mut set = ItemSet::new(registry);
	set.extend((0..count).step_by(2).map(|i| registry.lookup(&format!("t{i}")).unwrap()));
	set
}

fn bench_containment(c: &mut Criterion) {
	let mut group = c.benchmark_group("item_set/contains_all");
	for count in [64, 512, 4096] {
		let registry = registry(count);
		let full = every_other(&registry, count);
		let mut needle = ItemSet::new(&registry);
		needle.add(registry.lookup("t0").unwrap());
		needle.add(registry.lookup(&format!("t{}", count - 2)).unwrap());

		group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
			b.iter(|| black_box(&full).contains_all(black_box(&needle)))
		});
	}
	group.finish();
}

fn bench_apply_delta(c: &mut Criterion) {
	let mut group = c.benchmark_group("item_set/apply_delta");
	for count in [64, 512, 4096] {
		let registry = registry(count);
		let base = every_other(&registry, count);
		let remove = every_other(&registry, count / 2);
		let add = registry.set_of(["block0", "t1"]).unwrap();

		group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
			b.iter(|| {
				let mut live = base.clone();
				live.remove_all(black_box(&remove));
				live.add_all(black_box(&add));
				live
			})
		});
	}
	group.finish();
}

fn bench_compact(c: &mut Criterion) {
	let mut group = c.benchmark_group("item_set/compact");
	for count in [64, 512] {
		let registry = registry(count);
		let mut set = ItemSet::new(&registry);
		set.extend((0..count / 16).map(|b| registry.lookup(&format!("block{b}")).unwrap()));
		set.add(registry.lookup(&format!("t{}", count - 1)).unwrap());

		group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
			b.iter(|| black_box(&set).compact())
		});
	}
	group.finish();
}

criterion_group!(benches, bench_containment, bench_apply_delta, bench_compact);
criterion_main!(benches);
