use std::rc::Rc;

use crate::data::SnapshotCell;
use crate::data::weather::WeatherSnapshot;
use crate::display::{Display, Frame};
use crate::refresh::RefreshTrigger;
use crate::screens::{ReloadTimer, Screen, ScreenContext};

const RELOAD_TICKS: u32 = 60;

pub struct WeatherScreen {
    display: Rc<dyn Display>,
    weather: SnapshotCell<WeatherSnapshot>,
    refresh: RefreshTrigger,
    city: String,
    frame: Frame,
    timer: ReloadTimer,
}

impl WeatherScreen {
    pub fn create(ctx: &ScreenContext) -> Box<dyn Screen> {
        Box::new(WeatherScreen {
            display: ctx.display.clone(),
            weather: ctx.weather.clone(),
            refresh: ctx.weather_refresh.clone(),
            city: ctx.weather_city.clone(),
            frame: Frame::new("Weather"),
            timer: ReloadTimer::new(RELOAD_TICKS),
        })
    }
}

impl Screen for WeatherScreen {
    fn reload(&mut self) {
        self.frame.blank();
        match &self.weather.load().reading {
            Some(reading) => {
                self.frame
                    .push_line(format!("{}°", reading.temperature_c.round()));
                self.frame.push_line(reading.description.clone());
                self.frame.push_line(reading.high_low());
                self.frame.push_line(self.city.clone());
            }
            None => self.frame.push_line("No data"),
        }
    }

    fn show(&self) {
        self.display.show(&self.frame);
    }

    fn handle_input(&mut self, button: u8) {
        match button {
            0 | 2 | 3 => {}
            1 => {
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
