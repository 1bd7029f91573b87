//! Benchmarks for LUT evaluation and software pipeline evaluation.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use colorop_core::{
    build_pipeline, hdr_plane_pipeline, ColorMatrix, ColorOpProperty, ColorOpRegistry,
    PropertyValue, SurfaceId,
};
use colorop_lut::{curve_lut, lerp_u16, Channel, ColorLut, CurveType, Fixed, LutInterpolation};

fn ramp(n: usize) -> Vec<u16> {
    (0..n).map(|i| (i * 0xffff / (n - 1)) as u16).collect()
}

/// Benchmark the raw interpolation primitive.
fn bench_lerp(c: &mut Criterion) {
    let weights: Vec<Fixed> = (0..1024).map(|i| Fixed::from_raw((i as i64) << 22)).collect();
    c.bench_function("lerp_u16", |b| {
        b.iter(|| {
            weights
                .iter()
                .map(|&t| lerp_u16(black_box(0x1234), black_box(0xfedc), t) as u32)
                .sum::<u32>()
        })
    });
}

/// Benchmark 1D LUT channel evaluation at several sizes.
fn bench_lut(c: &mut Criterion) {
    let mut group = c.benchmark_group("lut1d");
    let values = ramp(10000);
    group.throughput(Throughput::Elements(values.len() as u64));

    for size in [17usize, 256, 4096] {
        let lut = ColorLut::from_fn(size, |x| x.powf(2.2)).expect("valid size");

        group.bench_with_input(BenchmarkId::new("linear", size), &values, |b, v| {
            b.iter(|| {
                v.iter()
                    .map(|&x| lut.apply_channel(black_box(x), Channel::Green))
                    .collect::<Vec<_>>()
            })
        });

        group.bench_with_input(BenchmarkId::new("nearest", size), &values, |b, v| {
            b.iter(|| {
                v.iter()
                    .map(|&x| lut.apply_with(black_box([x, x, x]), LutInterpolation::Nearest))
                    .collect::<Vec<_>>()
            })
        });
    }

    group.finish();
}

/// Benchmark the named curve tables.
fn bench_curves(c: &mut Criterion) {
    let mut group = c.benchmark_group("curves");
    let values = ramp(10000);
    group.throughput(Throughput::Elements(values.len() as u64));

    for curve in [CurveType::SrgbEotf, CurveType::Pq125InvEotf, CurveType::Bt2020Oetf] {
        let lut = curve_lut(curve);
        group.bench_with_input(BenchmarkId::new("apply", curve.name()), &values, |b, v| {
            b.iter(|| v.iter().map(|&x| lut.apply(black_box([x, x, x]))).collect::<Vec<_>>())
        });
    }

    group.finish();
}

/// Benchmark the fixed-point matrix.
fn bench_matrix(c: &mut Criterion) {
    let bt709_to_bt2020 = ColorMatrix::from_f64([
        [0.6274, 0.3293, 0.0433, 0.0],
        [0.0691, 0.9195, 0.0114, 0.0],
        [0.0164, 0.0880, 0.8956, 0.0],
    ]);
    let values = ramp(10000);
    c.bench_function("matrix_3x4", |b| {
        b.iter(|| {
            values
                .iter()
                .map(|&x| bt709_to_bt2020.apply(black_box([x, x / 2, x / 3])))
                .collect::<Vec<_>>()
        })
    });
}

/// Benchmark software evaluation of a fully enabled HDR plane pipeline.
fn bench_pipeline(c: &mut Criterion) {
    let mut reg = ColorOpRegistry::new();
    let entry = build_pipeline(&mut reg, SurfaceId(1), &hdr_plane_pipeline()).expect("build");
    let ids = reg.chain_from(entry.head).expect("chain");

    let mut tx = reg.begin();
    for id in &ids {
        tx.set_property(*id, ColorOpProperty::Bypass, PropertyValue::Bool(false))
            .expect("bypass");
    }
    tx.set_property(ids[1], ColorOpProperty::Data, PropertyValue::Blob(Some(ColorMatrix::identity().to_blob_3x4())))
        .expect("matrix");
    tx.set_property(ids[2], ColorOpProperty::Multiplier, PropertyValue::U64(1 << 32))
        .expect("gain");
    let lut = ColorLut::identity(4096).expect("lut").to_blob();
    tx.set_property(ids[4], ColorOpProperty::Data, PropertyValue::Blob(Some(lut.clone())))
        .expect("shaper lut");
    tx.set_property(ids[6], ColorOpProperty::Data, PropertyValue::Blob(Some(lut)))
        .expect("blend lut");
    tx.commit().expect("commit");

    let values = ramp(1000);
    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Elements(values.len() as u64));
    group.bench_function("hdr_plane_per_pixel", |b| {
        b.iter(|| {
            values
                .iter()
                .map(|&x| reg.apply_pipeline(entry.head, black_box([x, x, x])))
                .collect::<Vec<_>>()
        })
    });

    let compiled = reg.compile_pipeline(entry.head).expect("compile");
    let pixels: Vec<[u16; 3]> = values.iter().map(|&x| [x, x, x]).collect();
    group.bench_function("hdr_plane_compiled", |b| {
        b.iter(|| {
            let mut buf = pixels.clone();
            compiled.apply_all(black_box(&mut buf));
            buf
        })
    });
    group.finish();
}

criterion_group!(benches, bench_lerp, bench_lut, bench_curves, bench_matrix, bench_pipeline);
criterion_main!(benches);
