use criterion::{criterion_group, criterion_main};

mod network;

criterion_group!(
    benches,
    network::application::tlv::bench_encode,
    network::application::tlv::bench_decode,
    network::application::tlv::bench_telemetry_packet
);
criterion_main!(benches);
