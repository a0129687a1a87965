use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::data::SnapshotCell;
use crate::display::{Display, Frame};
use crate::refresh::RefreshTrigger;
use crate::screens::{Screen, ScreenContext};

pub type SharedLog = Rc<RefCell<Vec<String>>>;

pub fn shared_log() -> SharedLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Display that records shown frames instead of drawing anything.
#[derive(Default)]
pub struct RecordingDisplay {
    pub shown: RefCell<Vec<Frame>>,
    pub cleared: Cell<u32>,
}

impl RecordingDisplay {
    /// The most recently shown frame.
    pub fn last_frame(&self) -> Frame {
        self.shown.borrow().last().cloned().expect("nothing was shown")
    }
}

impl Display for RecordingDisplay {
    fn show(&self, frame: &Frame) {
        self.shown.borrow_mut().push(frame.clone());
    }

    fn clear(&self) {
        self.cleared.set(self.cleared.get() + 1);
    }
}

/// A screen context wired to a recording display, empty snapshot cells and
/// detached refresh triggers.
pub fn test_context() -> (ScreenContext, Rc<RecordingDisplay>) {
    let display = Rc::new(RecordingDisplay::default());
    let ctx = ScreenContext {
        display: display.clone(),
        calendar: SnapshotCell::default(),
        weather: SnapshotCell::default(),
        calendar_refresh: RefreshTrigger::disconnected(),
        weather_refresh: RefreshTrigger::disconnected(),
        weather_city: "Testville".to_string(),
    };
    (ctx, display)
}

/// Screen that records every lifecycle call into a shared log.
pub struct FakeScreen {
    tag: String,
    log: SharedLog,
}

impl FakeScreen {
    pub fn boxed(tag: &str, log: &SharedLog) -> Box<dyn Screen> {
        Box::new(FakeScreen {
            tag: tag.to_string(),
            log: log.clone(),
        })
    }

    fn record(&self, entry: String) {
        self.log.borrow_mut().push(entry);
    }
}

impl Screen for FakeScreen {
    fn reload(&mut self) {
        self.record(format!("reload:{}", self.tag));
    }

    fn show(&self) {
        self.record(format!("show:{}", self.tag));
    }

    fn handle_input(&mut self, button: u8) {
        self.record(format!("input:{}:{button}", self.tag));
    }

    fn on_tick(&mut self) {
        self.record(format!("tick:{}", self.tag));
    }
}
