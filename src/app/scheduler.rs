use std::cell::RefCell;
use std::mem;
use std::rc::{Rc, Weak};
use std::time::Instant;

use crate::app::backdrop::Backdrop;

/// Work a board asks to have run on the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameTask {
    Tick,
    LossFrame,
}

struct Scheduled {
    target: Weak<RefCell<Backdrop>>,
    task: FrameTask,
    epoch: u64,
}

/// Per-frame callback queue. Every continuation carries the epoch of the
/// board that armed it and is dropped when the board has since been reset.
#[derive(Default)]
pub struct FrameScheduler {
    queue: Vec<Scheduled>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `task` for `backdrop`'s current epoch.
    pub fn arm(&mut self, backdrop: &Rc<RefCell<Backdrop>>, task: FrameTask) {
        let epoch = backdrop.borrow().epoch();
        self.queue.push(Scheduled {
            target: Rc::downgrade(backdrop),
            task,
            epoch,
        });
    }

    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Runs everything armed before this frame. Continuations a task asks
    /// for are queued for the following frame. Returns how many tasks ran.
    pub fn run_frame(&mut self, now: Instant) -> usize {
        let mut ran = 0;
        for scheduled in mem::take(&mut self.queue) {
            let Some(target) = scheduled.target.upgrade() else {
                continue;
            };
            let mut backdrop = target.borrow_mut();
            if backdrop.epoch() != scheduled.epoch {
                continue;
            }
            ran += 1;
            if let Some(task) = backdrop.run(scheduled.task, now) {
                self.queue.push(Scheduled {
                    target: scheduled.target,
                    task,
                    epoch: scheduled.epoch,
                });
            }
        }
        ran
    }
}
