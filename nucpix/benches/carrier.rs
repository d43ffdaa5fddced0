use criterion::{criterion_group, criterion_main, Criterion};
use nucpix::_internal_test_data::test_image;
use nucpix::bits::Bits;
use nucpix::carrier::embed::embed;
use nucpix::carrier::extract::extract;
use nucpix::carrier::image_store::quantize;

fn pattern_bits(len: usize) -> Bits {
    (0..len).map(|i| i % 3 == 0 || i % 7 == 0).collect()
}

fn embed_1024(c: &mut Criterion) {
    let carrier = test_image(1024, 1024);
    let bits = pattern_bits(4 * 1024 * 1024);

    c.bench_function("Embed into 1024x1024 carrier", |b| {
        b.iter(|| {
            let encoded = embed(&carrier, &bits).unwrap();
            assert_eq!(encoded.dimensions(), (1024, 1024));
        })
    });
}

fn extract_1024(c: &mut Criterion) {
    let carrier = test_image(1024, 1024);
    let bits = pattern_bits(4 * 1024 * 1024);
    let encoded = embed(&carrier, &bits).unwrap();

    c.bench_function("Extract from 1024x1024 carrier", |b| {
        b.iter(|| {
            let extracted = extract(&carrier, &encoded).unwrap();
            assert_eq!(extracted, bits);
        })
    });
}

fn quantize_256(c: &mut Criterion) {
    let image = test_image(256, 256);

    c.bench_function("Quantize 256x256 image", |b| {
        b.iter(|| {
            let quantized = quantize(&image);
            assert_eq!(quantized.dimensions(), (256, 256));
        })
    });
}

criterion_group!(benches, embed_1024, extract_1024, quantize_256);
criterion_main!(benches);
