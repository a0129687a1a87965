use std::rc::Rc;
use std::time::Duration;

use psutil::cpu::CpuPercentCollector;

use crate::display::{Display, Frame};
use crate::screens::{ReloadTimer, Screen, ScreenContext};

/// System vitals: hostname, uptime, load, cpu/memory/disk usage.
pub struct SystemScreen {
    display: Rc<dyn Display>,
    frame: Frame,
    cpu: Option<CpuPercentCollector>,
    timer: ReloadTimer,
}

const RELOAD_TICKS: u32 = 30;

impl SystemScreen {
    pub fn create(ctx: &ScreenContext) -> Box<dyn Screen> {
        let cpu = match CpuPercentCollector::new() {
            Ok(collector) => Some(collector),
            Err(error) => {
                log::warn!("CPU usage unavailable: {error}");
                None
            }
        };
        Box::new(SystemScreen {
            display: ctx.display.clone(),
            frame: Frame::new("System"),
            cpu,
            timer: ReloadTimer::new(RELOAD_TICKS),
        })
    }
}

impl Screen for SystemScreen {
    fn reload(&mut self) {
        self.frame.blank();

        let hostname = gethostname::gethostname().to_string_lossy().into_owned();
        self.frame.push_line(hostname);

        if let Ok(uptime) = psutil::host::uptime() {
            let whole_seconds = Duration::from_secs(uptime.as_secs());
            self.frame
                .push_line(format!("up {}", humantime::format_duration(whole_seconds)));
        }
        if let Ok(load) = psutil::host::loadavg() {
            self.frame.push_line(format!(
                "load {:.2} {:.2} {:.2}",
                load.one, load.five, load.fifteen
            ));
        }
        if let Some(cpu) = self.cpu.as_mut() {
            if let Ok(percent) = cpu.cpu_percent() {
                self.frame.push_line(format!("cpu {percent:.0}%"));
            }
        }
        if let Ok(memory) = psutil::memory::virtual_memory() {
            self.frame
                .push_line(format!("mem {:.0}%", memory.percent()));
        }
        if let Ok(disk) = psutil::disk::disk_usage("/") {
            self.frame.push_line(format!("disk {:.0}%", disk.percent()));
        }
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
            _ => log::debug!("System screen ignores button {button}"),
        }
    }

    fn on_tick(&mut self) {
        if self.timer.due() {
            self.reload();
            self.show();
        }
    }
}
