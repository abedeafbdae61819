use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use voxform_image::{Volume, VoxelBuffer};
use voxform_interp::ResampleOptions;
use voxform_linalg::IDENTITY;
use voxform_transform::{AffineTransform, Transform};

fn bench_resample(c: &mut Criterion) {
    let mut group = c.benchmark_group("Resample");

    for size in [16, 32, 64].iter() {
        let nvox = size * size * size;
        group.throughput(criterion::Throughput::Elements(nvox as u64));

        let parameter_string = format!("{size}x{size}x{size}");

        // moving volume
        let data: Vec<f32> = (0..nvox).map(|x| (x % 255) as f32).collect();
        let moving = Volume::new(vec![*size; 3], VoxelBuffer::from(data), IDENTITY).unwrap();

        // rotate about the volume center
        let (s, co) = 15f64.to_radians().sin_cos();
        let center = *size as f64 / 2.0;
        let matrix = [
            [co, -s, 0.0, center - co * center + s * center],
            [s, co, 0.0, center - s * center - co * center],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let mut xfm = AffineTransform::new(matrix);
        xfm.set_reference(&moving).unwrap();

        for order in [0, 1, 3] {
            let options = ResampleOptions::default().with_order(order);
            group.bench_with_input(
                BenchmarkId::new(format!("order_{order}"), &parameter_string),
                &(&xfm, &moving),
                |b, i| {
                    let (xfm, moving) = (i.0, i.1);
                    b.iter(|| xfm.resample(black_box(moving), black_box(&options)))
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_resample);
criterion_main!(benches);
