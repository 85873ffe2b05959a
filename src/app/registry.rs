use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use crate::app::backdrop::{Backdrop, PageSize};

/// Weak index of the boards on a page plus a debounced "page changed" timer.
pub struct Registry {
    instances: Vec<Weak<RefCell<Backdrop>>>,
    debounce: Duration,
    refresh_at: Option<Instant>,
}

impl Registry {
    pub fn new(debounce: Duration) -> Self {
        Self {
            instances: Vec::new(),
            debounce,
            refresh_at: None,
        }
    }

    pub fn register(&mut self, backdrop: &Rc<RefCell<Backdrop>>) {
        self.instances.push(Rc::downgrade(backdrop));
    }

    /// Live boards, in registration order. Dead entries are pruned.
    pub fn live(&mut self) -> Vec<Rc<RefCell<Backdrop>>> {
        self.instances.retain(|weak| weak.strong_count() > 0);
        self.instances.iter().filter_map(Weak::upgrade).collect()
    }

    /// Restarts the debounce window.
    pub fn notify(&mut self, now: Instant) {
        self.refresh_at = Some(now + self.debounce);
    }

    #[cfg(test)]
    pub fn refresh_pending(&self) -> bool {
        self.refresh_at.is_some()
    }

    /// Once the window has elapsed, resizes every live board to the page
    /// and returns how many actually changed.
    pub fn poll(&mut self, now: Instant, page: PageSize) -> Option<usize> {
        match self.refresh_at {
            Some(at) if now >= at => {
                self.refresh_at = None;
                Some(self.refresh_all(page))
            }
            _ => None,
        }
    }

    pub fn refresh_all(&mut self, page: PageSize) -> usize {
        self.live()
            .iter()
            .filter(|backdrop| backdrop.borrow_mut().update_size_from_document(page))
            .count()
    }
}
