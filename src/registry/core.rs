use std::any::{TypeId, type_name};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwap;
use serde_json::json;

use crate::error::{Result, ScreenError};
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::screen::{ScreenBehavior, ScreenDefinition};

const LOG_TARGET: &str = "grid_screens::registry";

type Entries = Vec<Arc<ScreenDefinition>>;

pub(crate) struct RegistryShared {
    entries: ArcSwap<Entries>,
    // Serializes writers; readers only ever load the current snapshot. Guards
    // no data, so poisoning is ignored.
    writer: Mutex<()>,
    logger: Option<Logger>,
}

impl RegistryShared {
    fn new(logger: Option<Logger>) -> Self {
        Self {
            entries: ArcSwap::from_pointee(Vec::new()),
            writer: Mutex::new(()),
            logger,
        }
    }
}

/// Live screen definitions, at most one per behavior type.
///
/// Cloning the registry shares the same entries. Readers get immutable
/// snapshots that later registrations or removals never touch.
#[derive(Clone)]
pub struct ScreenRegistry {
    shared: Arc<RegistryShared>,
}

impl Default for ScreenRegistry {
    fn default() -> Self {
        Self {
            shared: Arc::new(RegistryShared::new(None)),
        }
    }
}

impl ScreenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logger(logger: Logger) -> Self {
        Self {
            shared: Arc::new(RegistryShared::new(Some(logger))),
        }
    }

    pub(crate) fn from_shared(shared: Arc<RegistryShared>) -> Self {
        Self { shared }
    }

    /// Return the screen registered for `B`, building it with `factory` if absent.
    ///
    /// The factory runs at most once per type even under concurrent callers. It
    /// must not call back into this registry. A panicking factory unwinds to the
    /// caller and leaves the registry as it was.
    pub fn get_or_create<B, F>(&self, factory: F) -> Result<Arc<ScreenDefinition>>
    where
        B: ScreenBehavior,
        F: FnOnce() -> Result<ScreenDefinition>,
    {
        let type_id = TypeId::of::<B>();
        if let Some(found) = self.lookup(type_id) {
            return Ok(found);
        }

        let _writer = self.writer();
        if let Some(found) = self.lookup(type_id) {
            return Ok(found);
        }

        let screen = type_name::<B>();
        let definition = factory().map_err(|err| ScreenError::construction(screen, err))?;
        if definition.behavior_type() != type_id {
            return Err(ScreenError::construction(
                screen,
                ScreenError::Validation(format!(
                    "factory built a `{}` screen",
                    definition.behavior_name()
                )),
            ));
        }

        let definition = Arc::new(definition);
        self.insert_locked(Arc::clone(&definition));
        Ok(definition)
    }

    /// Register an already built definition.
    pub fn register(&self, definition: ScreenDefinition) -> Result<Arc<ScreenDefinition>> {
        let _writer = self.writer();
        if self.lookup(definition.behavior_type()).is_some() {
            return Err(ScreenError::AlreadyRegistered(definition.behavior_name()));
        }
        let definition = Arc::new(definition);
        self.insert_locked(Arc::clone(&definition));
        Ok(definition)
    }

    pub fn get<B: ScreenBehavior>(&self) -> Option<Arc<ScreenDefinition>> {
        self.lookup(TypeId::of::<B>())
    }

    pub fn find(&self, name: &str) -> Option<Arc<ScreenDefinition>> {
        self.shared
            .entries
            .load()
            .iter()
            .find(|definition| definition.name() == name)
            .cloned()
    }

    pub fn list(&self) -> ScreenSnapshot {
        ScreenSnapshot {
            entries: self.shared.entries.load_full(),
        }
    }

    pub fn len(&self) -> usize {
        self.shared.entries.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.entries.load().is_empty()
    }

    /// Forget `definition`. Returns `false` when it was not listed here.
    pub fn remove(&self, definition: &ScreenDefinition) -> bool {
        let _writer = self.writer();
        let current = self.shared.entries.load_full();
        let Some(position) = current
            .iter()
            .position(|entry| std::ptr::eq(Arc::as_ptr(entry), definition))
        else {
            return false;
        };

        let mut next = Entries::clone(&current);
        let removed = next.remove(position);
        self.shared.entries.store(Arc::new(next));
        removed.detach();
        self.log("screen_removed", &removed);
        true
    }

    /// Remove every entry. Used when the host integration shuts down.
    pub fn clear(&self) {
        let _writer = self.writer();
        let previous = self.shared.entries.swap(Arc::new(Vec::new()));
        for definition in previous.iter() {
            definition.detach();
            self.log("screen_removed", definition);
        }
    }

    fn writer(&self) -> MutexGuard<'_, ()> {
        self.shared
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup(&self, type_id: TypeId) -> Option<Arc<ScreenDefinition>> {
        self.shared
            .entries
            .load()
            .iter()
            .find(|definition| definition.behavior_type() == type_id)
            .cloned()
    }

    fn insert_locked(&self, definition: Arc<ScreenDefinition>) {
        definition.attach(Arc::downgrade(&self.shared));
        let mut next = Entries::clone(&self.shared.entries.load());
        next.push(Arc::clone(&definition));
        self.shared.entries.store(Arc::new(next));
        self.log("screen_registered", &definition);
    }

    fn log(&self, message: &str, definition: &ScreenDefinition) {
        if let Some(logger) = self.shared.logger.as_ref() {
            let event = event_with_fields(
                LogLevel::Debug,
                LOG_TARGET,
                message,
                [
                    json_kv("screen", json!(definition.name())),
                    json_kv("behavior", json!(definition.behavior_name())),
                ],
            );
            let _ = logger.log_event(event);
        }
    }
}

/// Point-in-time view of the registered screens.
#[derive(Clone)]
pub struct ScreenSnapshot {
    entries: Arc<Entries>,
}

impl ScreenSnapshot {
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<ScreenDefinition>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name()).collect()
    }
}

impl<'a> IntoIterator for &'a ScreenSnapshot {
    type Item = &'a Arc<ScreenDefinition>;
    type IntoIter = std::slice::Iter<'a, Arc<ScreenDefinition>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
