use ssc_core::backend::{Backend, Native, Soft};
use ssc_core::stream::pipe;
use ssc_core::{KeySize, SymKey, DEFAULT_CHUNK_SIZE};

use futures::executor::block_on;
use futures::io::{AllowStdIo, Cursor};

use criterion::*;

fn bench_stream<B: Backend>(key: &SymKey<B>, plain: &[u8]) {
    let mut input = AllowStdIo::new(std::io::Cursor::new(plain));
    let mut output = futures::io::sink();

    block_on(pipe(&mut key.encrypt_stream(), &mut input, &mut output, DEFAULT_CHUNK_SIZE))
        .unwrap();
}

fn rand_vec(length: usize) -> Vec<u8> {
    (0..length).map(|_| rand::random::<u8>()).collect()
}

fn bench_backend<B: Backend>(c: &mut Criterion, name: &str) {
    let key = SymKey::<B>::generate(KeySize::Aes256).unwrap();

    let mut group = c.benchmark_group(format!("throughput-{name}"));
    group.sample_size(10);

    for blen in [10, 14, 18, 22] {
        let input = rand_vec(1 << blen);
        let ct = key.encrypt(&input).unwrap();
        let kib = input.len() / 1024;

        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_function(format!("encrypt {kib} KiB"), |b| {
            b.iter(|| key.encrypt(&input).unwrap())
        });
        group.bench_function(format!("decrypt {kib} KiB"), |b| {
            b.iter(|| key.decrypt(&ct).unwrap())
        });
        group.bench_function(format!("stream encrypt {kib} KiB"), |b| {
            b.iter(|| bench_stream(&key, &input))
        });
        group.bench_function(format!("stream decrypt {kib} KiB"), |b| {
            b.iter(|| {
                let mut out = Cursor::new(Vec::with_capacity(input.len()));
                block_on(pipe(
                    &mut key.decrypt_stream(),
                    Cursor::new(&ct),
                    &mut out,
                    DEFAULT_CHUNK_SIZE,
                ))
                .unwrap()
            })
        });
    }

    group.finish();
}

fn bench(c: &mut Criterion) {
    bench_backend::<Native>(c, "native");
    bench_backend::<Soft>(c, "soft");
}

criterion_group!(benches, bench);
criterion_main!(benches);
