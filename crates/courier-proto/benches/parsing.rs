//! Benchmarks for command-line parsing and line decoding.

use bytes::BytesMut;
use courier_proto::{CommandRef, LineCodec};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tokio_util::codec::Decoder;

/// Shortest command
const EXIT: &str = "EXIT";

/// Typical direct message
const SEND: &str = "SEND user2 the quick brown fox jumps over the lazy dog";

/// Message with irregular spacing
const MSG_SPACED: &str = "MSG   spaced    out     text   with  tabs\tand   more";

fn benchmark_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Command Parsing");

    group.bench_function("exit", |b| {
        b.iter(|| black_box(CommandRef::parse(black_box(EXIT))))
    });

    group.bench_function("send", |b| {
        b.iter(|| {
            let cmd = CommandRef::parse(black_box(SEND));
            black_box(cmd.joined_from(1))
        })
    });

    group.bench_function("msg_spaced", |b| {
        b.iter(|| black_box(CommandRef::parse(black_box(MSG_SPACED)).tail()))
    });

    group.finish();
}

fn benchmark_decoding(c: &mut Criterion) {
    let stream: String = (0..64).map(|i| format!("SEND user{} message {}\n", i % 3, i)).collect();

    c.bench_function("decode_64_lines", |b| {
        b.iter(|| {
            let mut codec = LineCodec::new();
            let mut buf = BytesMut::from(stream.as_str());
            let mut count = 0;
            while let Ok(Some(line)) = codec.decode(&mut buf) {
                black_box(line);
                count += 1;
            }
            count
        })
    });
}

criterion_group!(benches, benchmark_parsing, benchmark_decoding);
criterion_main!(benches);
