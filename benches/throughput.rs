//! Throughput benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use hemolink_core::{extract, FramerConfig, StreamFramer};

const PACKET_BODY: &str = "NO. 123/4\n01/02/24 10h30mn15s\nUser ID: PATIENT42\n\
! 6.23\n2 4.51\n3 13.2\n4 40.1\n5 88.9\n6 29.3\n7 32.9\n8 13.1\n\
@ 250\nA 9.1\nB 0.21\nC 16.3\n# 32.1\n% 8.2\n' 59.7\n\" 2.0\n$ 0.5\n& 3.7\nK 0.8\n\
$FF result\n$FB MyInstrument\n$FE v1\n$FD 1A2B\n";

fn extractor_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("extractor");
    group.throughput(Throughput::Bytes(PACKET_BODY.len() as u64));

    group.bench_function("extract_full_packet", |b| {
        b.iter(|| {
            let record = extract(black_box(PACKET_BODY));
            black_box(record)
        })
    });

    let noisy: String = PACKET_BODY
        .bytes()
        .flat_map(|byte| [byte, 0x00])
        .map(|byte| byte as char)
        .collect();
    group.bench_function("extract_noisy_packet", |b| {
        b.iter(|| {
            let record = extract(black_box(&noisy));
            black_box(record)
        })
    });

    group.finish();
}

fn framer_benchmark(c: &mut Criterion) {
    let mut stream = Vec::new();
    for _ in 0..16 {
        stream.push(0x02);
        stream.extend_from_slice(PACKET_BODY.as_bytes());
        stream.push(0x03);
    }

    let mut group = c.benchmark_group("framer");
    group.throughput(Throughput::Bytes(stream.len() as u64));

    group.bench_function("feed_16_frames", |b| {
        b.iter(|| {
            let mut framer = StreamFramer::new(FramerConfig::default());
            let bodies = framer.feed(black_box(&stream));
            black_box(bodies)
        })
    });

    group.finish();
}

criterion_group!(benches, extractor_benchmark, framer_benchmark);
criterion_main!(benches);
