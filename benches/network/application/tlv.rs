use criterion::{Criterion, Throughput};
use iotlink::network::application::tlv::{
    decode, encode, tags, Flags, Header, OutgoingBuffer, Packet, Value,
};
use std::hint::black_box;

pub fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("tlv_encode");
    let header = Header::new(Flags::REQUEST, 1234);
    let mut buf = [0u8; 64];

    group.throughput(Throughput::Elements(1));
    group.bench_function("string", |b| {
        b.iter(|| encode(header, black_box(4567), &Value::String(black_box("hello")), &mut buf))
    });
    group.bench_function("double", |b| {
        b.iter(|| encode(header, black_box(99), &Value::Double(black_box(3.1415)), &mut buf))
    });
    group.finish();
}

pub fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("tlv_decode");
    let mut buf = [0u8; 64];
    let len = encode(
        Header::new(Flags::REQUEST, 1234),
        tags::ACCELERATION,
        &Value::String("0.01 0.02 9.81"),
        &mut buf,
    )
    .unwrap();

    group.throughput(Throughput::Bytes(len as u64));
    group.bench_function("string", |b| {
        b.iter(|| decode(black_box(&buf[..len])).and_then(|frame| frame.record.value()))
    });
    group.finish();
}

pub fn bench_telemetry_packet(c: &mut Criterion) {
    let mut group = c.benchmark_group("telemetry_packet");
    group.throughput(Throughput::Elements(1));

    group.bench_function("build", |b| {
        let mut buffer: OutgoingBuffer = OutgoingBuffer::new();
        b.iter(|| {
            buffer.start(Flags::REQUEST, black_box(7));
            buffer.append_string(tags::ACCELERATION, "0.01 0.02 9.81").unwrap();
            buffer.append_double(tags::TEMPERATURE, 21.5).unwrap();
            buffer.append_double(tags::HUMIDITY, 40.0).unwrap();
            buffer.append_double(tags::BAROMETER, 1013.25).unwrap();
            buffer.append_string(tags::TIMESTAMP, "1700000000").unwrap();
            let len = buffer.bytes().map(|bytes| bytes.len());
            buffer.release();
            len
        })
    });

    let mut buffer: OutgoingBuffer = OutgoingBuffer::new();
    buffer.start(Flags::REQUEST, 7);
    buffer.append_string(tags::ACCELERATION, "0.01 0.02 9.81").unwrap();
    buffer.append_double(tags::TEMPERATURE, 21.5).unwrap();
    buffer.append_string(tags::TIMESTAMP, "1700000000").unwrap();
    let bytes = buffer.bytes().unwrap();

    group.bench_function("parse", |b| {
        b.iter(|| {
            Packet::parse(black_box(bytes))
                .map(|packet| packet.records().filter(|r| r.is_ok()).count())
        })
    });
    group.finish();
}
