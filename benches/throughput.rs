//! Throughput Benchmark for BlazeKV
//!
//! This benchmark measures the performance of the request hot path:
//! decoding a wire frame, dispatching it through the command engine, and
//! encoding the response.

use blazekv::commands::CommandHandler;
use blazekv::protocol::{parse_message, ProtocolVersion, RespValue};
use blazekv::storage::Store;
use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;

fn make_command(args: &[&str]) -> RespValue {
    RespValue::Array(
        args.iter()
            .map(|s| RespValue::bulk_string(Bytes::from(s.to_string())))
            .collect(),
    )
}

/// Benchmark RESP decoding
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Elements(1));

    let set_frame = b"*3\r\n$3\r\nSET\r\n$8\r\nuser:101\r\n$4\r\nAriz\r\n";
    group.bench_function("parse_set", |b| {
        b.iter(|| black_box(parse_message(black_box(set_frame)).unwrap()));
    });

    let bulk_1k = make_command(&["SET", "key", &"x".repeat(1024)])
        .serialize(ProtocolVersion::Resp2);
    group.bench_function("parse_set_1k", |b| {
        b.iter(|| black_box(parse_message(black_box(&bulk_1k)).unwrap()));
    });

    group.finish();
}

/// Benchmark RESP encoding
fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");
    group.throughput(Throughput::Elements(1));

    let value = RespValue::bulk_string(Bytes::from("x".repeat(1024)));
    group.bench_function("serialize_bulk_1k", |b| {
        b.iter(|| black_box(value.serialize(ProtocolVersion::Resp2)));
    });

    let pairs = RespValue::Map(
        (0..16)
            .flat_map(|i| {
                [
                    RespValue::bulk_string(Bytes::from(format!("field{}", i))),
                    RespValue::bulk_string(Bytes::from(format!("value{}", i))),
                ]
            })
            .collect(),
    );
    group.bench_function("serialize_map_16", |b| {
        b.iter(|| black_box(pairs.serialize(ProtocolVersion::Resp3)));
    });

    group.finish();
}

/// Benchmark command dispatch against the store
fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    group.bench_function("set_small", |b| {
        let mut handler = CommandHandler::new(Arc::new(Store::new()));
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("key:{}", i);
            black_box(handler.execute(make_command(&["SET", &key, "small_value"])));
            i += 1;
        });
    });

    group.bench_function("set_1k", |b| {
        let mut handler = CommandHandler::new(Arc::new(Store::new()));
        let value = "x".repeat(1024);
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("key:{}", i);
            black_box(handler.execute(make_command(&["SET", &key, &value])));
            i += 1;
        });
    });

    group.bench_function("get_existing", |b| {
        let mut handler = CommandHandler::new(Arc::new(Store::new()));
        for i in 0..100_000 {
            let key = format!("key:{}", i);
            let value = format!("value:{}", i);
            handler.execute(make_command(&["SET", &key, &value]));
        }
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("key:{}", i % 100_000);
            black_box(handler.execute(make_command(&["GET", &key])));
            i += 1;
        });
    });

    group.bench_function("get_missing", |b| {
        let mut handler = CommandHandler::new(Arc::new(Store::new()));
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("missing:{}", i);
            black_box(handler.execute(make_command(&["GET", &key])));
            i += 1;
        });
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_serialize, bench_dispatch);
criterion_main!(benches);
