//! Segment tasks and the scheduler that runs them.

pub mod scheduler;
pub mod task;

pub use scheduler::Scheduler;
pub use task::{SegmentTask, TaskContext, TaskOutcome};

use crate::project::Project;

/// One task per segment of `project`, in index order.
pub fn segment_tasks<'a>(project: &'a Project, ctx: TaskContext<'a>) -> Vec<SegmentTask<'a>> {
    project
        .segments()
        .enumerate()
        .map(|(index, (frame, text))| SegmentTask::new(index, frame, text, ctx))
        .collect()
}
