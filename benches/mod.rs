use criterion::{criterion_group, criterion_main};

mod channel;

criterion_group!(
    benches,
    channel::request::bench_content_length,
    channel::request::bench_emit_staged,
    channel::feed::bench_parse_json,
    channel::feed::bench_parse_fallback
);
criterion_main!(benches);
