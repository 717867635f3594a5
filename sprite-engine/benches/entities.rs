// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Benchmarks for the per-tick entity pipeline
//!
//! These benchmarks measure a game state update pass (position integration
//! plus gravity) and a render pass against a headless stage.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sprite_engine::ecs::components::{GravityComponent, ImageRenderComponent, PositionComponent};
use sprite_engine::ecs::{Entity, GameState};
use sprite_engine::stage::{HeadlessStage, Image, Stage};
use std::rc::Rc;

fn populated(count: usize) -> (Rc<HeadlessStage>, GameState) {
    let headless = Rc::new(HeadlessStage::new(800.0, 600.0));
    let stage: Rc<dyn Stage> = headless.clone();
    let mut state = GameState::new(stage.clone());
    for i in 0..count {
        let entity = Entity::builder(stage.clone())
            .with(PositionComponent::new((i % 800) as f64, (i % 600) as f64).with_velocity(30.0, -10.0))
            .with(GravityComponent::default())
            .with(ImageRenderComponent::new(Image::new(1, 16.0, 16.0)))
            .build()
            .unwrap();
        state.add_entity(entity);
    }
    (headless, state)
}

/// Benchmark: one update pass
fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("state_update");

    for count in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        let (_, mut state) = populated(*count);
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| state.update(16.0).unwrap());
        });
    }

    group.finish();
}

/// Benchmark: one render pass including the stage clear
fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("state_render");

    for count in [100, 1000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        let (stage, mut state) = populated(*count);
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| {
                stage.clear();
                state.render(16.0).unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(entity_benches, bench_update, bench_render);
criterion_main!(entity_benches);
