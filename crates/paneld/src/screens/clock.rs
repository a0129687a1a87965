use std::rc::Rc;

use chrono::{Local, Timelike};

use crate::data::SnapshotCell;
use crate::data::calendar::{CalendarSnapshot, humanized_datetime};
use crate::data::weather::WeatherSnapshot;
use crate::display::{Display, Frame};
use crate::screens::{Screen, ScreenContext};

/// Landing screen: big clock plus a one-line glance at the next event and
/// the current weather.
pub struct ClockScreen {
    display: Rc<dyn Display>,
    calendar: SnapshotCell<CalendarSnapshot>,
    weather: SnapshotCell<WeatherSnapshot>,
    frame: Frame,
    shown_minute: Option<u32>,
}

impl ClockScreen {
    pub fn create(ctx: &ScreenContext) -> Box<dyn Screen> {
        Box::new(ClockScreen {
            display: ctx.display.clone(),
            calendar: ctx.calendar.clone(),
            weather: ctx.weather.clone(),
            frame: Frame::new("Clock"),
            shown_minute: None,
        })
    }
}

fn minute_of_day(now: &chrono::DateTime<Local>) -> u32 {
    now.hour() * 60 + now.minute()
}

impl Screen for ClockScreen {
    fn reload(&mut self) {
        let now = Local::now();
        self.frame.blank();
        self.frame.push_line(now.format("%H:%M").to_string());
        self.frame.push_line(now.format("%A, %B %d").to_string());

        if let Some(event) = self.calendar.load().events.first() {
            self.frame.push_line(format!(
                "next: {} ({})",
                event.summary,
                humanized_datetime(&event.start, &now)
            ));
        }
        if let Some(reading) = &self.weather.load().reading {
            self.frame.push_line(format!(
                "{}° {}",
                reading.temperature_c.round(),
                reading.description
            ));
        }
        self.shown_minute = Some(minute_of_day(&now));
    }

    fn show(&self) {
        self.display.show(&self.frame);
    }

    fn handle_input(&mut self, button: u8) {
        match button {
            1 => {
                self.reload();
                self.show();
            }
            _ => log::debug!("Clock screen ignores button {button}"),
        }
    }

    fn on_tick(&mut self) {
        // Redraw when the displayed minute goes stale.
        let now = Local::now();
        if self.shown_minute != Some(minute_of_day(&now)) {
            self.reload();
            self.show();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::calendar::Event;
    use crate::data::weather::{WeatherReading, WeatherSnapshot};
    use crate::tests::utils::test_context;

    #[test]
    fn glances_at_calendar_and_weather_when_available() {
        let (ctx, display) = test_context();
        let mut screen = ClockScreen::create(&ctx);

        screen.reload();
        screen.show();
        // Time and date only while both snapshots are empty.
        assert_eq!(display.last_frame().lines.len(), 2);

        ctx.calendar.publish(crate::data::calendar::CalendarSnapshot {
            events: vec![Event {
                start: Local::now() + chrono::Duration::hours(3),
                end: None,
                summary: "dentist".into(),
            }],
            tasks: Vec::new(),
        });
        ctx.weather.publish(WeatherSnapshot {
            reading: Some(WeatherReading {
                temperature_c: 8.2,
                high_c: 9.0,
                low_c: 2.0,
                description: "fog".into(),
                icon: "fog".into(),
                fetched_at: Local::now(),
            }),
        });
        screen.reload();
        screen.show();

        let frame = display.last_frame();
        assert_eq!(frame.lines.len(), 4);
        assert!(frame.lines[2].contains("dentist"));
        assert!(frame.lines[3].contains("fog"));
    }

    #[test]
    fn ticking_within_the_same_minute_does_not_redraw() {
        let (ctx, display) = test_context();
        let mut screen = ClockScreen::create(&ctx);
        screen.reload();
        screen.show();
        let shown_before = display.shown.borrow().len();

        screen.on_tick();
        // The minute can only have changed if the test straddled a minute
        // boundary; one extra redraw is the most that allows.
        assert!(display.shown.borrow().len() <= shown_before + 1);
    }
}
