use crate::daemon::command::Command;
use crate::daemon::registry::ScreenRegistry;
use crate::screens::{Screen, ScreenContext};

/// The daemon's screen state: the registry plus the active-screen index,
/// driven by dispatched commands.
///
/// The active index is always within `0..registry.len()` while the registry
/// is non-empty. Every transition runs the new screen's `reload` before its
/// `show`, so a transition never displays stale content.
pub struct App {
    registry: ScreenRegistry,
    active: usize,
    page_buttons: bool,
    ctx: ScreenContext,
}

impl App {
    pub fn new(ctx: ScreenContext, page_buttons: bool) -> Self {
        App {
            registry: ScreenRegistry::new(),
            active: 0,
            page_buttons,
            ctx,
        }
    }

    pub fn registry(&self) -> &ScreenRegistry {
        &self.registry
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Resolve and append a screen. Duplicates are rejected with a logged
    /// error, matching the dispatcher contract for `add_screen`.
    pub fn add_screen(&mut self, name: &str) -> bool {
        if self.registry.find_index(name).is_some() {
            log::error!("Screen \"{name}\" already added");
            return false;
        }
        self.registry.add(name, &self.ctx)
    }

    /// Append a ready-made screen instance (custom screens, tests).
    pub fn insert_screen(&mut self, name: &str, screen: Box<dyn Screen>) -> bool {
        self.registry.insert(name, screen)
    }

    fn after_transition(&mut self) {
        if let Some(name) = self.registry.name_at(self.active) {
            log::debug!("Current screen: {name}");
        }
        if let Some(screen) = self.registry.get_by_index_mut(self.active) {
            screen.reload();
            screen.show();
        }
    }

    pub fn next_screen(&mut self) {
        if self.registry.is_empty() {
            return;
        }
        self.active = (self.active + 1) % self.registry.len();
        self.after_transition();
    }

    pub fn previous_screen(&mut self) {
        if self.registry.is_empty() {
            return;
        }
        self.active = if self.active == 0 {
            self.registry.len() - 1
        } else {
            self.active - 1
        };
        self.after_transition();
    }

    /// Switch to the named screen; an unknown name falls back to index 0
    /// with a logged error.
    pub fn select_screen(&mut self, name: &str) {
        match self.registry.find_index(name) {
            Some(index) => self.active = index,
            None => {
                log::error!("Couldn't find screen \"{name}\"");
                self.active = 0;
            }
        }
        self.after_transition();
    }

    pub fn reload_active(&mut self) {
        if let Some(screen) = self.registry.get_by_index_mut(self.active) {
            screen.reload();
            screen.show();
        }
    }

    pub fn show_active(&self) {
        if let Some(screen) = self.registry.get_by_index(self.active) {
            screen.show();
        }
    }

    pub fn tick_active(&mut self) {
        if let Some(screen) = self.registry.get_by_index_mut(self.active) {
            screen.on_tick();
        }
    }

    /// Buttons 0 and 3 page between screens when page-button mode is on
    /// (fixed at startup); everything else goes to the active screen.
    pub fn handle_button(&mut self, button: u8) {
        match button {
            0 if self.page_buttons => self.previous_screen(),
            3 if self.page_buttons => self.next_screen(),
            _ => {
                log::debug!("Active screen handling button {button}");
                if let Some(screen) = self.registry.get_by_index_mut(self.active) {
                    screen.handle_input(button);
                }
            }
        }
    }

    pub fn remove_screen(&mut self, name: &str) {
        let Some(index) = self.registry.find_index(name) else {
            log::error!("Cannot remove screen \"{name}\": not found");
            return;
        };
        if self.registry.len() == 1 {
            log::error!("Refusing to remove \"{name}\": it is the last screen");
            return;
        }
        let was_active = index == self.active;
        self.registry.remove(name);
        if was_active {
            self.active = 0;
            if let Some(screen) = self.registry.get_by_index_mut(0) {
                screen.reload();
            }
        } else if index < self.active {
            // The entries shifted down; keep pointing at the same screen.
            self.active -= 1;
        }
    }

    pub fn dispatch(&mut self, command: Command) {
        match command {
            Command::Button(button) => self.handle_button(button),
            Command::Previous => self.previous_screen(),
            Command::Next => self.next_screen(),
            Command::Reload => self.reload_active(),
            Command::SelectScreen(name) => self.select_screen(&name),
            Command::AddScreen(name) => {
                self.add_screen(&name);
            }
            Command::RemoveScreen(name) => self.remove_screen(&name),
        }
    }

    /// Parse and dispatch one raw IPC message. Malformed input is logged and
    /// ignored; it can never take the loop down.
    pub fn dispatch_message(&mut self, message: &str) {
        log::debug!("Received command: {message}");
        match message.parse::<Command>() {
            Ok(command) => self.dispatch(command),
            Err(error) => log::error!("{error}"),
        }
    }
}
