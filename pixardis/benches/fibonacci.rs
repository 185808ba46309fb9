use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pixardis::prelude::*;

const FIBONACCI: &str = include_str!("../tests/fibonacci.pix");

fn criterion_benchmark(c: &mut Criterion) {
    let assembly = compile(FIBONACCI).assembly;

    c.bench_function("fibonacci compile", |b| {
        b.iter(|| compile(black_box(FIBONACCI)))
    });

    c.bench_function("fibonacci run", |b| {
        b.iter(|| {
            let mut vm = PixardisVm::with_conf(PixardisConf::default());
            vm.load_program(&assembly).unwrap();
            vm.step(black_box(100_000))
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
