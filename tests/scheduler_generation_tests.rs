//! Integration tests driving the generation scheduler directly, without the
//! streaming facade: the raw `schedule_generation` contract and dependency
//! chaining between units of work.

use std::sync::Arc;
use std::time::{Duration, Instant};

use cgmath::Point3;
use voxel_streaming::generation::{
    schedule_generation, schedule_generation_after, SineWaveConfig,
};
use voxel_streaming::scheduler::handle::CompletionHandle;
use voxel_streaming::scheduler::GenerationScheduler;
use voxel_streaming::{ChunkBuffer, ChunkFlags, Shared, SineWaveGenerator};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn test_generator() -> Arc<SineWaveGenerator> {
    Arc::new(
        SineWaveGenerator::new(SineWaveConfig {
            wavelength: 64.0,
            amplitude: 4.0,
            vertical_offset: 8.0,
            ..SineWaveConfig::default()
        })
        .unwrap(),
    )
}

fn wait_and_drain(scheduler: &mut GenerationScheduler, handle: &CompletionHandle) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !handle.is_complete() || scheduler.num_tasks_outstanding() > 0 {
        assert!(Instant::now() < deadline, "scheduler failed to drain");
        scheduler.process_completed_tasks();
        scheduler.process_queued_tasks();
        std::thread::yield_now();
    }
}

#[test]
fn flags_are_published_before_the_handle_completes() {
    init_logging();
    let mut scheduler = GenerationScheduler::new(2);
    let coordinate = Point3::new(0, 0, 0);
    let buffer = Shared::new(ChunkBuffer::new(coordinate));

    let handle = schedule_generation(
        &mut scheduler,
        test_generator(),
        buffer.clone(),
        coordinate,
        true,
    );
    handle.wait();

    // The handle signal happens after publication, so the flags slot must
    // already be valid here even though the scheduler has not been pumped.
    let flags = buffer.read().flags();
    assert_ne!(flags, ChunkFlags::NONE);
    assert!(flags.contains(ChunkFlags::SOLID));

    wait_and_drain(&mut scheduler, &handle);
}

#[test]
fn a_dependent_task_runs_only_after_its_dependency_completes() {
    init_logging();
    let generator = test_generator();
    let mut scheduler = GenerationScheduler::new(2);

    let first_coord = Point3::new(0, 0, 0);
    let first_buffer = Shared::new(ChunkBuffer::new(first_coord));
    let first = schedule_generation(
        &mut scheduler,
        generator.clone(),
        first_buffer,
        first_coord,
        true,
    );

    // A consumer of the first chunk: here simply the neighbouring chunk,
    // gated on the first one being complete.
    let second_coord = Point3::new(1, 0, 0);
    let second_buffer = Shared::new(ChunkBuffer::new(second_coord));
    let second = schedule_generation_after(
        &mut scheduler,
        first.clone(),
        generator,
        second_buffer.clone(),
        second_coord,
        true,
    );

    wait_and_drain(&mut scheduler, &second);

    assert!(first.is_complete());
    assert!(second.is_complete());
    assert_ne!(second_buffer.read().flags(), ChunkFlags::NONE);
}
