use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use yardview_core::{Equipment, EquipmentType, LayerTable, Rgb, ShapeParams};
use yardview_scene::{ColorMode, Pipeline};
use yardview_settings::SceneConfig;

/// Tank farm on a grid, `n` tanks per side.
fn farm(n: usize) -> Vec<Equipment> {
    (0..n * n)
        .map(|i| {
            let (x, z) = ((i % n) as f32 * 10.0, (i / n) as f32 * 10.0);
            Equipment::new(
                format!("T-{i:04}"),
                EquipmentType::Tank,
                [x, 2.5, z],
                ShapeParams::Cylinder {
                    radius: 3.0,
                    height: 5.0,
                },
                Rgb::from_bytes(0x4F, 0xC3, 0xF7),
            )
            .with_state(if i % 3 == 0 { "Operando" } else { "Parado" })
        })
        .collect()
}

fn bench_reconcile(c: &mut Criterion) {
    let layers = LayerTable::with_default_layers();
    let equipment = farm(20);

    c.bench_function("reconcile_400_cold", |b| {
        b.iter_batched(
            || Pipeline::new(&SceneConfig::default()),
            |mut pipeline| {
                black_box(pipeline.reconcile(&equipment, &layers, ColorMode::Base));
            },
            BatchSize::SmallInput,
        )
    });

    let mut pipeline = Pipeline::new(&SceneConfig::default());
    pipeline.reconcile(&equipment, &layers, ColorMode::Base);
    c.bench_function("reconcile_400_unchanged", |b| {
        b.iter(|| black_box(pipeline.reconcile(&equipment, &layers, ColorMode::Base)))
    });

    let mut mode = ColorMode::Base;
    c.bench_function("reconcile_400_recolor", |b| {
        b.iter(|| {
            mode = if mode == ColorMode::Base {
                ColorMode::OperationalState
            } else {
                ColorMode::Base
            };
            black_box(pipeline.reconcile(&equipment, &layers, mode))
        })
    });
}

criterion_group!(benches, bench_reconcile);
criterion_main!(benches);
