//! Benchmarks for bytepool.
//!
//! Run with:
//!     cargo bench

use std::io::Read;

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use bytepool::{Buffer, BufferPool};

fn bench_write_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_read");

    for size in [512usize, 4096, 64 * 1024] {
        // Deterministic pseudo-random data
        let data: Vec<u8> = (0..size).map(|i| (i * 7 + 13) as u8).collect();
        let mut out = vec![0u8; size];

        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(format!("buffer_{}", size), |b| {
            let mut buf = Buffer::with_capacity(size);
            b.iter(|| {
                buf.write(black_box(&data)).unwrap();
                buf.read(&mut out).unwrap();
                buf.reset().unwrap();
            });
        });

        // Baseline: std Vec used as a FIFO
        group.bench_function(format!("vec_{}", size), |b| {
            let mut vec = Vec::with_capacity(size);
            b.iter(|| {
                vec.extend_from_slice(black_box(&data));
                let mut src = &vec[..];
                src.read_exact(&mut out).unwrap();
                vec.clear();
            });
        });
    }

    group.finish();
}

fn bench_borrow(c: &mut Criterion) {
    let mut group = c.benchmark_group("borrow");
    let data: Vec<u8> = (0..16 * 1024).map(|i| (i * 7 + 13) as u8).collect();

    group.throughput(Throughput::Bytes(data.len() as u64));

    // Fill straight from a reader into the borrowed region
    group.bench_function("borrow_fill", |b| {
        let mut buf = Buffer::new();
        b.iter(|| {
            let mut src = black_box(&data[..]);
            loop {
                let region = buf.borrow(4096).unwrap();
                let n = src.read(region).unwrap();
                buf.give_back(n).unwrap();
                if n == 0 {
                    break;
                }
            }
            black_box(buf.discard(usize::MAX))
        });
    });

    // Read into a scratch array, then copy into the buffer
    group.bench_function("copy_fill", |b| {
        let mut buf = Buffer::new();
        let mut scratch = [0u8; 4096];
        b.iter(|| {
            let mut src = black_box(&data[..]);
            loop {
                let n = src.read(&mut scratch).unwrap();
                if n == 0 {
                    break;
                }
                buf.write(&scratch[..n]).unwrap();
            }
            black_box(buf.discard(usize::MAX))
        });
    });

    group.finish();
}

fn bench_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool");
    let payload = vec![0x5au8; 4096];

    group.bench_function("acquire_release", |b| {
        let pool = BufferPool::default();
        b.iter(|| {
            let mut buf = pool.acquire();
            buf.write(black_box(&payload)).unwrap();
            pool.release(buf);
        });
    });

    group.bench_function("fresh_buffer", |b| {
        b.iter(|| {
            let mut buf = Buffer::with_capacity(64);
            buf.write(black_box(&payload)).unwrap();
            black_box(buf.len())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_write_read, bench_borrow, bench_pool);
criterion_main!(benches);
