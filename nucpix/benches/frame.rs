use criterion::{criterion_group, criterion_main, Criterion};
use nucpix::_internal_test_data::MULTI_RECORD_FASTA;
use nucpix::frame::{encode_record, parse_frame, strip_zero_groups};
use nucpix::sequence::Record;

const CHECKSUM: &str = "0123456789abcdef0123456789abcdef";

fn long_record() -> Record {
    let sequence = "ACGTNRYKMSWBDHV".repeat(10_000);
    Record::new("chr1", "Benchmark organism chromosome 1", sequence)
}

fn encode_150k(c: &mut Criterion) {
    let record = long_record();

    c.bench_function("Encode 150k symbol record", |b| {
        b.iter(|| {
            let bits = encode_record(&record, CHECKSUM).unwrap();
            assert!(bits.len() > 600_000);
        })
    });
}

fn parse_150k(c: &mut Criterion) {
    let record = long_record();
    let mut bits = encode_record(&record, CHECKSUM).unwrap();
    bits.extend(std::iter::repeat(false).take(100_000));

    c.bench_function("Strip and parse 150k symbol frame", |b| {
        b.iter(|| {
            let frame = parse_frame(&strip_zero_groups(&bits)).unwrap();
            assert_eq!(frame.into_record(), record);
        })
    });
}

fn encode_small(c: &mut Criterion) {
    c.bench_function("Encode small records", |b| {
        b.iter(|| {
            for record in MULTI_RECORD_FASTA.iter() {
                encode_record(record, CHECKSUM).unwrap();
            }
        })
    });
}

criterion_group!(benches, encode_150k, parse_150k, encode_small);
criterion_main!(benches);
