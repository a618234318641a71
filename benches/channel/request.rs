use criterion::{Criterion, Throughput};
use libthingspeak::channel::{FieldValue, PendingUpdate, UpdateBody};
use libthingspeak::network::application::http::Payload;
use std::hint::black_box;

fn staged_update() -> PendingUpdate {
    let mut update = PendingUpdate::default();
    for field in 1..=8 {
        let value = FieldValue::try_from("temperature 21.50 C").unwrap();
        update.set_field(field, value).unwrap();
    }
    update.set_latitude(40.416775).unwrap();
    update.set_longitude(-3.703790).unwrap();
    update.set_elevation(650.0).unwrap();
    update.set_status("sensor ok, battery 87%").unwrap();
    update.set_created_at("2024-01-01T00:00:00Z").unwrap();
    update
}

pub fn bench_content_length(c: &mut Criterion) {
    let update = staged_update();
    let body = UpdateBody::Staged(&update);
    let mut group = c.benchmark_group("content_length");
    group.throughput(Throughput::Bytes(body.content_length() as u64));
    group.bench_function("staged", |b| b.iter(|| black_box(&body).content_length()));
    group.finish();
}

pub fn bench_emit_staged(c: &mut Criterion) {
    let update = staged_update();
    let body = UpdateBody::Staged(&update);
    let mut group = c.benchmark_group("emit");
    group.throughput(Throughput::Bytes(body.content_length() as u64));
    group.bench_function("staged", |b| {
        let mut out: Vec<u8> = Vec::with_capacity(1024);
        b.iter(|| {
            out.clear();
            black_box(&body)
                .emit(&mut |chunk: &[u8]| {
                    out.extend_from_slice(chunk);
                    Ok(())
                })
                .expect("emit into a Vec failed");
            black_box(out.len())
        })
    });
    group.finish();
}
