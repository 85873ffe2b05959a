use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use crate::RESIZE_DEBOUNCE;
use crate::app::backdrop::{Backdrop, PageSize, Placement};
use crate::app::registry::Registry;
use crate::app::scheduler::{FrameScheduler, FrameTask};
use crate::config::Settings;
use crate::game::{Input, ScoreSink, Scoreboard};

/// Everything on one page: the boards, their frame scheduler, the resize
/// registry and the shared score.
pub struct Stage {
    boards: Vec<Rc<RefCell<Backdrop>>>,
    registry: Registry,
    scheduler: FrameScheduler,
    scoreboard: Scoreboard,
    settings: Settings,
    page: PageSize,
}

impl Stage {
    pub fn new(settings: Settings, page: PageSize) -> Self {
        Self {
            boards: Vec::new(),
            registry: Registry::new(RESIZE_DEBOUNCE),
            scheduler: FrameScheduler::new(),
            scoreboard: Scoreboard::default(),
            settings,
            page,
        }
    }

    pub fn score(&self) -> u64 {
        self.scoreboard.total()
    }

    #[cfg(test)]
    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn boards(&self) -> &[Rc<RefCell<Backdrop>>] {
        &self.boards
    }

    /// Creates and starts a board.
    pub fn spawn(&mut self, placement: Placement, now: Instant) -> Rc<RefCell<Backdrop>> {
        let mut settings = self.settings;
        settings.seed = settings.seed.map(|seed| seed.wrapping_add(self.boards.len() as u64));
        let sink: Rc<dyn ScoreSink> = Rc::new(self.scoreboard.clone());
        let backdrop = Rc::new(RefCell::new(Backdrop::new(
            placement,
            self.page,
            &settings,
            Some(sink),
            now,
        )));
        self.registry.register(&backdrop);
        self.scheduler.arm(&backdrop, FrameTask::Tick);
        self.boards.push(Rc::clone(&backdrop));
        backdrop
    }

    /// Lays `count` boards side by side across the page.
    pub fn spawn_columns(&mut self, count: u32, placement: Placement, now: Instant) {
        let count = count.max(1);
        let total = placement.width.filter(|w| *w > 0).unwrap_or(self.page.width);
        let each = total / count;
        for i in 0..count {
            let column = Placement {
                x: placement.x.saturating_add(i * each),
                width: Some(each),
                ..placement
            };
            self.spawn(column, now);
        }
    }

    pub fn reset_all(&mut self, now: Instant) {
        for backdrop in self.registry.live() {
            backdrop.borrow_mut().reset(now);
            self.scheduler.arm(&backdrop, FrameTask::Tick);
        }
    }

    pub fn set_prepopulate(&mut self, enabled: bool) {
        self.settings.prepopulate = enabled;
        for backdrop in self.registry.live() {
            backdrop.borrow_mut().set_prepopulate(enabled);
        }
    }

    pub fn toggle_prepopulate(&mut self) {
        self.set_prepopulate(!self.settings.prepopulate);
    }

    pub fn set_speed_factor(&mut self, factor: f64) {
        self.settings.speed_factor = Settings::sanitized_speed_factor(factor);
        for backdrop in self.registry.live() {
            backdrop.borrow_mut().set_speed_factor(factor);
        }
    }

    pub fn adjust_size(&mut self, width: u32, height: u32) -> usize {
        self.registry
            .live()
            .iter()
            .filter(|backdrop| backdrop.borrow_mut().adjust_size(width, height))
            .count()
    }

    /// Records a new page size; boards follow once the debounce window passes.
    pub fn page_resized(&mut self, page: PageSize, now: Instant) {
        self.page = page;
        self.registry.notify(now);
    }

    pub fn refresh_from_document(&mut self) -> usize {
        self.registry.refresh_all(self.page)
    }

    pub fn handle_input(&mut self, input: Input) {
        for backdrop in self.registry.live() {
            backdrop.borrow_mut().handle_input(input);
        }
    }

    /// One display refresh: pending resize, then every scheduled continuation.
    pub fn frame(&mut self, now: Instant) -> usize {
        self.registry.poll(now, self.page);
        self.scheduler.run_frame(now)
    }
}
