//! Screen definitions: identity, slot layout, opener and interaction hooks.

use std::any::{TypeId, type_name};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use crate::error::{HookError, Result, ScreenError};
use crate::host::{SurfaceHandle, SurfaceHost, ViewerId};
use crate::item::{ItemSignature, matches_opener};
use crate::registry::{RegistryShared, ScreenRegistry};
use crate::router::{ClickEvent, HostEvent, InteractEvent, ItemClick};
use crate::slots::{SlotAssignment, is_valid_slot_count};

pub type HookResult = std::result::Result<(), HookError>;

/// Reactions attached to a screen. The implementing type is also the key the
/// registry uses, so each behavior type owns at most one live screen.
///
/// Both hooks suppress the host's default reaction unless overridden.
/// Overrides that want to keep the suppression call `event.mark_handled()`.
pub trait ScreenBehavior: Send + Sync + 'static {
    fn on_item_click(
        &self,
        _screen: &ScreenDefinition,
        _click: &ItemClick,
        event: &mut ClickEvent,
    ) -> HookResult {
        event.mark_handled();
        Ok(())
    }

    fn on_item_interact(
        &self,
        _screen: &ScreenDefinition,
        _viewer: &ViewerId,
        event: &mut InteractEvent,
    ) -> HookResult {
        event.mark_handled();
        Ok(())
    }
}

#[derive(Clone)]
struct SurfaceBinding {
    handle: SurfaceHandle,
    host: Arc<dyn SurfaceHost>,
}

impl SurfaceBinding {
    /// Write the changed slots and refresh everyone currently viewing.
    fn sync(&self, changed: &[SlotAssignment]) -> Result<()> {
        for assignment in changed {
            self.host
                .set_slot(self.handle, assignment.index(), assignment.item())?;
        }
        for viewer in self.host.list_viewers(self.handle)? {
            self.host.refresh_view(&viewer)?;
        }
        Ok(())
    }
}

struct ScreenState {
    display_name: String,
    opener: Option<ItemSignature>,
    slots: Vec<SlotAssignment>,
    surface: Option<SurfaceBinding>,
}

impl ScreenState {
    /// Occupied indices are overwritten in place so each index appears once.
    fn assign(&mut self, assignment: SlotAssignment) {
        match self
            .slots
            .iter_mut()
            .find(|existing| existing.index() == assignment.index())
        {
            Some(existing) => *existing = assignment,
            None => self.slots.push(assignment),
        }
    }

    fn is_occupied(&self, index: usize) -> bool {
        self.slots.iter().any(|slot| slot.index() == index)
    }
}

pub struct ScreenDefinition {
    name: String,
    slot_count: usize,
    state: RwLock<ScreenState>,
    behavior: Box<dyn ScreenBehavior>,
    behavior_type: TypeId,
    behavior_name: &'static str,
    registry: Mutex<Weak<RegistryShared>>,
    // Held only while the first surface is created.
    opening: Mutex<()>,
}

impl std::fmt::Debug for ScreenDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenDefinition")
            .field("name", &self.name)
            .field("slot_count", &self.slot_count)
            .field("behavior", &self.behavior_name)
            .finish_non_exhaustive()
    }
}

impl ScreenDefinition {
    /// Build a definition. `display_name` falls back to `name` when absent or empty.
    pub fn new<B>(
        slot_count: usize,
        name: impl Into<String>,
        display_name: Option<&str>,
        behavior: B,
    ) -> Result<Self>
    where
        B: ScreenBehavior,
    {
        if !is_valid_slot_count(slot_count) {
            return Err(ScreenError::Validation(format!(
                "slot count {slot_count} must be 5 or a positive multiple of 9"
            )));
        }
        let name = name.into();
        if name.is_empty() {
            return Err(ScreenError::Validation(
                "name cannot be empty".to_string(),
            ));
        }
        let display_name = match display_name {
            Some(display) if !display.is_empty() => display.to_string(),
            _ => name.clone(),
        };

        Ok(Self {
            name,
            slot_count,
            state: RwLock::new(ScreenState {
                display_name,
                opener: None,
                slots: Vec::new(),
                surface: None,
            }),
            behavior: Box::new(behavior),
            behavior_type: TypeId::of::<B>(),
            behavior_name: type_name::<B>(),
            registry: Mutex::new(Weak::new()),
            opening: Mutex::new(()),
        })
    }

    pub fn with_opener(self, opener: ItemSignature) -> Result<Self> {
        self.set_opener(opener)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub fn behavior_name(&self) -> &'static str {
        self.behavior_name
    }

    pub(crate) fn behavior_type(&self) -> TypeId {
        self.behavior_type
    }

    pub fn display_name(&self) -> Result<String> {
        Ok(self.read()?.display_name.clone())
    }

    pub fn set_display_name(&self, display_name: impl Into<String>) -> Result<()> {
        let display_name = display_name.into();
        if display_name.is_empty() {
            return Err(ScreenError::Validation(
                "display name cannot be empty".to_string(),
            ));
        }
        self.write()?.display_name = display_name;
        Ok(())
    }

    pub fn opener(&self) -> Result<Option<ItemSignature>> {
        Ok(self.read()?.opener.clone())
    }

    pub fn set_opener(&self, opener: ItemSignature) -> Result<()> {
        self.write()?.opener = Some(opener);
        Ok(())
    }

    pub fn clear_opener(&self) -> Result<()> {
        self.write()?.opener = None;
        Ok(())
    }

    /// Assignments in insertion order.
    pub fn items(&self) -> Result<Vec<SlotAssignment>> {
        Ok(self.read()?.slots.clone())
    }

    pub fn item_at(&self, index: usize) -> Result<Option<ItemSignature>> {
        Ok(self
            .read()?
            .slots
            .iter()
            .find(|slot| slot.index() == index)
            .map(|slot| slot.item().clone()))
    }

    pub fn surface_handle(&self) -> Result<Option<SurfaceHandle>> {
        Ok(self.read()?.surface.as_ref().map(|binding| binding.handle))
    }

    pub fn is_open(&self) -> bool {
        matches!(self.surface_handle(), Ok(Some(_)))
    }

    /// Whether a registry currently lists this definition.
    pub fn is_registered(&self) -> bool {
        self.registry_ref().is_some()
    }

    /// Assign `item` to `index`, overwriting any previous occupant.
    ///
    /// Once a surface exists the slot is written to it and every current viewer
    /// is refreshed. Host errors are returned after the assignment has been
    /// committed; the screen keeps the new item either way.
    pub fn add_item(&self, index: usize, item: ItemSignature) -> Result<()> {
        let assignment = self.checked(index, item)?;
        self.apply(vec![assignment])
    }

    /// Place items at explicit indices, e.g. from a map of index to item.
    /// Validation happens before any change; host errors follow the commit as
    /// in [`ScreenDefinition::add_item`].
    pub fn add_items<I>(&self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = (usize, ItemSignature)>,
    {
        let batch = items
            .into_iter()
            .map(|(index, item)| self.checked(index, item))
            .collect::<Result<Vec<_>>>()?;
        self.apply(batch)
    }

    pub fn add_assignments<I>(&self, assignments: I) -> Result<()>
    where
        I: IntoIterator<Item = SlotAssignment>,
    {
        self.add_items(assignments.into_iter().map(SlotAssignment::into_parts))
    }

    /// Fill the lowest free indices in input order and return where each item landed.
    pub fn place_items<I>(&self, items: I) -> Result<Vec<usize>>
    where
        I: IntoIterator<Item = ItemSignature>,
    {
        let items = items.into_iter().collect::<Vec<_>>();
        if let Some(empty) = items.iter().find(|item| item.is_empty()) {
            return Err(ScreenError::Validation(format!(
                "cannot place empty item `{}`",
                empty.kind
            )));
        }
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let (placed, binding) = {
            let mut state = self.write()?;
            let free = (0..self.slot_count)
                .filter(|index| !state.is_occupied(*index))
                .collect::<Vec<_>>();
            if items.len() > free.len() {
                return Err(ScreenError::Capacity {
                    requested: items.len(),
                    available: free.len(),
                });
            }
            let placed = free
                .into_iter()
                .zip(items)
                .map(|(index, item)| SlotAssignment::new(index, item))
                .collect::<Vec<_>>();
            for assignment in &placed {
                state.assign(assignment.clone());
            }
            (placed, state.surface.clone())
        };

        if let Some(binding) = binding {
            binding.sync(&placed)?;
        }
        Ok(placed.iter().map(SlotAssignment::index).collect())
    }

    /// Present the screen to `viewer`, creating the host surface on first use.
    ///
    /// Concurrent first opens create a single surface; later opens reuse it.
    pub fn open(&self, host: &Arc<dyn SurfaceHost>, viewer: &ViewerId) -> Result<SurfaceHandle> {
        let existing = self.read()?.surface.clone();
        let binding = match existing {
            Some(binding) => binding,
            None => self.bind_surface(host)?,
        };

        let mut slots = self.items()?;
        slots.sort_by_key(SlotAssignment::index);
        for assignment in &slots {
            binding
                .host
                .set_slot(binding.handle, assignment.index(), assignment.item())?;
        }
        binding.host.present(binding.handle, viewer)?;
        Ok(binding.handle)
    }

    pub fn is_valid_opener(&self, candidate: Option<&ItemSignature>) -> bool {
        let Some(candidate) = candidate.filter(|item| !item.is_empty()) else {
            return false;
        };
        match self.read() {
            Ok(state) => match state.opener.as_ref() {
                None => true,
                Some(opener) => matches_opener(opener, candidate),
            },
            Err(_) => false,
        }
    }

    /// Drop this definition from the registry that lists it. The definition
    /// itself stays usable through retained references.
    pub fn remove(&self) -> bool {
        match self.registry_ref() {
            Some(shared) => ScreenRegistry::from_shared(shared).remove(self),
            None => false,
        }
    }

    fn bind_surface(&self, host: &Arc<dyn SurfaceHost>) -> Result<SurfaceBinding> {
        let _opening = self.opening.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(binding) = self.read()?.surface.clone() {
            return Ok(binding);
        }
        let title = self.display_name()?;
        let handle = host.create_surface(self.slot_count, &title)?;
        let binding = SurfaceBinding {
            handle,
            host: Arc::clone(host),
        };
        self.write()?.surface = Some(binding.clone());
        Ok(binding)
    }

    pub(crate) fn owns_click(
        &self,
        title: &str,
        surface: Option<SurfaceHandle>,
        slot: usize,
        item: &ItemSignature,
    ) -> Result<bool> {
        let state = self.read()?;
        let surface_matches = match surface {
            Some(handle) => state.surface.as_ref().map(|binding| binding.handle) == Some(handle),
            None => state.display_name == title || self.name == title,
        };
        Ok(surface_matches && state.slots.iter().any(|assigned| assigned.is(slot, item)))
    }

    pub(crate) fn click_hook(&self, click: &ItemClick, event: &mut ClickEvent) -> HookResult {
        self.behavior.on_item_click(self, click, event)
    }

    pub(crate) fn interact_hook(&self, viewer: &ViewerId, event: &mut InteractEvent) -> HookResult {
        self.behavior.on_item_interact(self, viewer, event)
    }

    pub(crate) fn attach(&self, registry: Weak<RegistryShared>) {
        if let Ok(mut guard) = self.registry.lock() {
            *guard = registry;
        }
    }

    pub(crate) fn detach(&self) {
        self.attach(Weak::new());
    }

    fn registry_ref(&self) -> Option<Arc<RegistryShared>> {
        self.registry.lock().ok().and_then(|guard| guard.upgrade())
    }

    fn checked(&self, index: usize, item: ItemSignature) -> Result<SlotAssignment> {
        if index >= self.slot_count {
            return Err(ScreenError::Range {
                index,
                slot_count: self.slot_count,
            });
        }
        if item.is_empty() {
            return Err(ScreenError::Validation(format!(
                "cannot place empty item `{}` at slot {index}",
                item.kind
            )));
        }
        Ok(SlotAssignment::new(index, item))
    }

    /// Commit `batch`, then push it to the bound surface.
    fn apply(&self, batch: Vec<SlotAssignment>) -> Result<()> {
        let binding = {
            let mut state = self.write()?;
            for assignment in &batch {
                state.assign(assignment.clone());
            }
            state.surface.clone()
        };
        match binding {
            Some(binding) => binding.sync(&batch),
            None => Ok(()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, ScreenState>> {
        self.state.read().map_err(|_| ScreenError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, ScreenState>> {
        self.state.write().map_err(|_| ScreenError::Poisoned)
    }
}
