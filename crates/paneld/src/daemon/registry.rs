use crate::screens::{Screen, ScreenContext, resolve_factory, simple_name};

struct ScreenEntry {
    name: String,
    screen: Box<dyn Screen>,
}

/// Ordered collection of named screens; insertion order is cycling order.
/// Names are unique. Screens are owned here exclusively: created on add,
/// dropped on remove.
#[derive(Default)]
pub struct ScreenRegistry {
    entries: Vec<ScreenEntry>,
}

impl ScreenRegistry {
    pub fn new() -> Self {
        ScreenRegistry::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// Resolve a screen implementation by name and append it. Resolution
    /// failure is logged and leaves the registry unchanged; it never
    /// propagates to the caller.
    pub fn add(&mut self, name: &str, ctx: &ScreenContext) -> bool {
        let Some(factory) = resolve_factory(name) else {
            log::error!("Failed to resolve screen \"{name}\"");
            return false;
        };
        self.insert(name, factory(ctx))
    }

    /// Append a ready-made screen instance under `name`.
    pub fn insert(&mut self, name: &str, screen: Box<dyn Screen>) -> bool {
        if self.find_index(name).is_some() {
            log::error!("Screen \"{name}\" already registered");
            return false;
        }
        self.entries.push(ScreenEntry {
            name: name.to_string(),
            screen,
        });
        log::info!("Added screen \"{name}\"");
        true
    }

    pub fn remove(&mut self, name: &str) -> Option<usize> {
        match self.find_index(name) {
            Some(index) => {
                self.entries.remove(index);
                log::info!("Removed screen \"{name}\"");
                Some(index)
            }
            None => {
                log::error!("Cannot remove screen \"{name}\": not found");
                None
            }
        }
    }

    /// Position of the first entry matching `name`, either exactly or by its
    /// unqualified suffix. Not finding anything is not logged here; the
    /// caller decides how severe that is.
    pub fn find_index(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.name == name || simple_name(&entry.name) == name)
    }

    pub fn get(&self, name: &str) -> Option<&dyn Screen> {
        self.find_index(name).and_then(|i| self.get_by_index(i))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut dyn Screen> {
        self.find_index(name).and_then(|i| self.get_by_index_mut(i))
    }

    pub fn get_by_index(&self, index: usize) -> Option<&dyn Screen> {
        self.entries.get(index).map(|entry| entry.screen.as_ref())
    }

    pub fn get_by_index_mut(&mut self, index: usize) -> Option<&mut (dyn Screen + '_)> {
        match self.entries.get_mut(index) {
            Some(entry) => Some(entry.screen.as_mut()),
            None => None,
        }
    }

    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|entry| entry.name.as_str())
    }
}
