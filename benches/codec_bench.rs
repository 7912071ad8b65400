//! Codec Benchmarks - Transport and Index Serialization
//!
//! Every media upload is base64-encoded in full and every post creation
//! re-serializes the whole index, so these are the CPU-bound parts of a
//! publish.
//!
//! Run with: cargo bench --bench codec_bench

use chrono::{TimeZone, Utc};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use repoblog::adapters::github::codec;
use repoblog::domain::{Post, PostId, PostIndex};

const MIB: usize = 1024 * 1024;

/// Encode a 1 MiB media payload.
fn bench_encode(c: &mut Criterion) {
    let payload: Vec<u8> = (0..MIB).map(|i| (i % 251) as u8).collect();

    c.bench_function("base64_encode_1mib", |b| {
        b.iter(|| codec::encode(black_box(&payload)));
    });
}

/// Decode a 1 MiB payload wrapped the way the contents API returns it.
fn bench_decode_wrapped(c: &mut Criterion) {
    let payload: Vec<u8> = (0..MIB).map(|i| (i % 251) as u8).collect();
    let wrapped: String = codec::encode(&payload)
        .as_bytes()
        .chunks(60)
        .map(|line| format!("{}\n", String::from_utf8_lossy(line)))
        .collect();

    c.bench_function("base64_decode_1mib_wrapped", |b| {
        b.iter(|| codec::decode(black_box(&wrapped)));
    });
}

fn sample_index(n: u64) -> PostIndex {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..n)
        .rev()
        .map(|i| {
            Post::new(
                PostId::new((1_704_067_200_000 + i).to_string()),
                Some("A post title"),
                "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(8),
                vec![format!("media/images/{i}-abcdefghi.png")],
                base + chrono::Duration::minutes(i as i64),
            )
        })
        .collect::<Vec<_>>()
        .into()
}

/// Serialize a 500-post index (the write side of `create_post`).
fn bench_index_to_json(c: &mut Criterion) {
    let index = sample_index(500);

    c.bench_function("index_to_json_500", |b| {
        b.iter(|| black_box(&index).to_json());
    });
}

/// Parse a 500-post index (the read side of every listing).
fn bench_index_from_json(c: &mut Criterion) {
    let raw = sample_index(500).to_json().unwrap();

    c.bench_function("index_from_json_500", |b| {
        b.iter(|| PostIndex::from_json(black_box(&raw)));
    });
}

criterion_group!(
    benches,
    bench_encode,
    bench_decode_wrapped,
    bench_index_to_json,
    bench_index_from_json,
);
criterion_main!(benches);
