//! Arbitration hot-path benchmarks.
//!
//! Measures a single `decide` call and a full engine tick against the
//! simulation backend. Target: well under the default 1 ms tick.

use criterion::{Criterion, criterion_group, criterion_main};
use robodrive_common::control::{DirectionFlags, Key, MotionCommand};
use robodrive_control::command::arbitration::{ArbitrationPolicy, decide};
use robodrive_control::cycle::ArbitrationEngine;
use robodrive_control::protocol::{Demultiplexer, WireFormat};
use robodrive_control::state::ControlState;
use robodrive_hal::SimulationActuator;
use std::hint::black_box;
use std::sync::Arc;

fn all_inputs() -> Vec<(DirectionFlags, MotionCommand)> {
    (0u8..16)
        .flat_map(|bits| {
            MotionCommand::ALL
                .into_iter()
                .map(move |prev| (DirectionFlags::from_bits_truncate(bits), prev))
        })
        .collect()
}

fn bench_decide(c: &mut Criterion) {
    let inputs = all_inputs();
    for policy in [ArbitrationPolicy::Table, ArbitrationPolicy::PriorityFallback] {
        c.bench_function(&format!("decide_all_80_{policy}"), |b| {
            b.iter(|| {
                for &(flags, prev) in &inputs {
                    black_box(decide(policy, black_box(flags), black_box(prev)));
                }
            });
        });
    }
}

fn bench_tick_hold(c: &mut Criterion) {
    let state = ControlState::shared();
    let mut engine = ArbitrationEngine::new(
        Arc::clone(&state),
        Box::new(SimulationActuator::new()),
        ArbitrationPolicy::Table,
    );
    state.set_key(Key::W, true);
    engine.tick().unwrap();

    c.bench_function("engine_tick_hold", |b| {
        b.iter(|| black_box(engine.tick().unwrap()));
    });
}

fn bench_demux(c: &mut Criterion) {
    let demux = Demultiplexer::new(ControlState::shared());
    c.bench_function("demux_text_key", |b| {
        b.iter(|| black_box(demux.handle(WireFormat::Text, black_box("'w' press"))));
    });
    c.bench_function("demux_json_key", |b| {
        b.iter(|| {
            black_box(demux.handle(
                WireFormat::Json,
                black_box(r#"{"type":"key","key":"w","action":"down"}"#),
            ))
        });
    });
}

criterion_group!(benches, bench_decide, bench_tick_hold, bench_demux);
criterion_main!(benches);
