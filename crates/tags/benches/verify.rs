use criterion::{black_box, criterion_group, criterion_main, Criterion};

use workpass_tags::{aes_cmac, verify};

const UID: &str = "042C6632A91190";
const KEY: &str = "169b35e5fd663d4042224323bc8ebc71";
const MAC: &str = "6B8B1F06C2B3B7C1";

fn bench_verify(c: &mut Criterion) {
    c.bench_function("tap_verify_known_answer", |b| {
        b.iter(|| verify(black_box(UID), black_box(54), black_box(MAC), black_box(KEY)))
    });

    c.bench_function("tap_verify_mismatch", |b| {
        b.iter(|| {
            verify(
                black_box(UID),
                black_box(54),
                black_box("FFFFFFFFFFFFFFFF"),
                black_box(KEY),
            )
        })
    });
}

fn bench_cmac(c: &mut Criterion) {
    let key = [0x2bu8; 16];
    let message = [0xa5u8; 20];

    c.bench_function("aes_cmac_20_bytes", |b| {
        b.iter(|| aes_cmac(black_box(&key), black_box(&message)))
    });
}

criterion_group!(benches, bench_verify, bench_cmac);
criterion_main!(benches);
