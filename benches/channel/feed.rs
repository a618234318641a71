use criterion::{Criterion, Throughput};
use libthingspeak::channel::FeedSnapshot;
use std::hint::black_box;

const FEED: &str = r#"{"created_at":"2024-01-01T00:00:00Z","entry_id":1042,"field1":"21.50000","field2":"48","field3":"1013.25","field4":"open","field5":"0","field6":"-3","field7":"12.5","field8":"ok","latitude":"40.416775","longitude":"-3.703790","elevation":"650","status":"sensor ok"}"#;

pub fn bench_parse_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("feed_parse");
    group.throughput(Throughput::Bytes(FEED.len() as u64));
    group.bench_function("json", |b| b.iter(|| FeedSnapshot::parse(black_box(FEED))));
    group.finish();
}

pub fn bench_parse_fallback(c: &mut Criterion) {
    // A numeric elevation sends the parse down the key-search path.
    let feed = FEED.replace(r#""elevation":"650""#, r#""elevation":650"#);
    let mut group = c.benchmark_group("feed_parse");
    group.throughput(Throughput::Bytes(feed.len() as u64));
    group.bench_function("key_search", |b| {
        b.iter(|| FeedSnapshot::parse(black_box(feed.as_str())))
    });
    group.finish();
}
