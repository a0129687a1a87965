use std::rc::Rc;

use chrono::Local;

use crate::data::SnapshotCell;
use crate::data::calendar::{CalendarSnapshot, humanized_datetime};
use crate::display::{Display, Frame};
use crate::refresh::RefreshTrigger;
use crate::screens::{ReloadTimer, Screen, ScreenContext};

const MAX_EVENTS: usize = 5;
const MAX_TASKS: usize = 3;
const MAX_SUMMARY_LEN: usize = 34;
/// Redraw once a minute so humanized timestamps stay honest.
const RELOAD_TICKS: u32 = 60;

pub struct CalendarScreen {
    display: Rc<dyn Display>,
    calendar: SnapshotCell<CalendarSnapshot>,
    refresh: RefreshTrigger,
    frame: Frame,
    timer: ReloadTimer,
}

impl CalendarScreen {
    pub fn create(ctx: &ScreenContext) -> Box<dyn Screen> {
        Box::new(CalendarScreen {
            display: ctx.display.clone(),
            calendar: ctx.calendar.clone(),
            refresh: ctx.calendar_refresh.clone(),
            frame: Frame::new("Calendar"),
            timer: ReloadTimer::new(RELOAD_TICKS),
        })
    }
}

fn truncated(summary: &str) -> String {
    let flat = summary.replace('\n', " ");
    let trimmed = flat.trim();
    if trimmed.chars().count() > MAX_SUMMARY_LEN {
        let head: String = trimmed.chars().take(MAX_SUMMARY_LEN - 3).collect();
        format!("{head}...")
    } else {
        trimmed.to_string()
    }
}

impl Screen for CalendarScreen {
    fn reload(&mut self) {
        let snapshot = self.calendar.load();
        let now = Local::now();
        self.frame.blank();

        if snapshot.events.is_empty() {
            self.frame.push_line("No current events");
        }
        for event in snapshot.events.iter().take(MAX_EVENTS) {
            let mut when = humanized_datetime(&event.start, &now);
            if let Some(end) = &event.end {
                // All-day entries carry a midnight-to-midnight range that
                // is not worth printing.
                let all_day = event.start.format("%H%M").to_string() == "0000"
                    && end.format("%H%M").to_string() == "0000";
                if !all_day {
                    when.push_str(&format!(
                        " {}-{}",
                        event.start.format("%H:%M"),
                        end.format("%H:%M")
                    ));
                }
            }
            self.frame.push_line(when);
            self.frame.push_line(format!("  {}", truncated(&event.summary)));
        }

        for task in snapshot.tasks.iter().take(MAX_TASKS) {
            let mut line = format!("* {}", truncated(&task.summary));
            if let Some(due) = &task.due {
                line.push_str(&format!(" (due {})", humanized_datetime(due, &now)));
            }
            self.frame.push_line(line);
        }
    }

    fn show(&self) {
        self.display.show(&self.frame);
    }

    fn handle_input(&mut self, button: u8) {
        match button {
            0 | 3 => {}
            1 => {
                self.reload();
                self.show();
            }
            2 => {
                self.refresh.force_refresh();
                self.reload();
                self.show();
            }
            other => log::error!("Unknown button pressed: KEY{}", other + 1),
        }
    }

    fn on_tick(&mut self) {
        if self.timer.due() {
            self.reload();
            self.show();
        }
    }
}
