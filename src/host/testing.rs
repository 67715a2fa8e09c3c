use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{HostError, HostResult, SurfaceHandle, SurfaceHost, ViewRefresher, ViewerId};
use crate::item::ItemSignature;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HostCall {
    Create { slot_count: usize, title: String },
    SetSlot { handle: SurfaceHandle, index: usize, item: ItemSignature },
    Present { handle: SurfaceHandle, viewer: ViewerId },
    Refresh { viewer: ViewerId },
}

/// Host double that records every call and tracks viewers per surface.
#[derive(Default)]
pub(crate) struct RecordingHost {
    calls: Mutex<Vec<HostCall>>,
    viewers: Mutex<HashMap<SurfaceHandle, Vec<ViewerId>>>,
    next: Mutex<u64>,
    reject_writes: AtomicBool,
}

impl RecordingHost {
    pub(crate) fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn creates(&self) -> Vec<(usize, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Create { slot_count, title } => Some((slot_count, title)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn refreshes(&self) -> Vec<ViewerId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Refresh { viewer } => Some(viewer),
                _ => None,
            })
            .collect()
    }

    /// Stop showing `handle` to `viewer`, as when they close it.
    pub(crate) fn leave(&self, handle: SurfaceHandle, viewer: &ViewerId) {
        if let Some(list) = self.viewers.lock().unwrap().get_mut(&handle) {
            list.retain(|current| current != viewer);
        }
    }

    /// Make every following `set_slot` fail.
    pub(crate) fn reject_writes(&self) {
        self.reject_writes.store(true, Ordering::SeqCst);
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn push(&self, call: HostCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ViewRefresher for RecordingHost {
    fn list_viewers(&self, handle: SurfaceHandle) -> HostResult<Vec<ViewerId>> {
        Ok(self
            .viewers
            .lock()
            .unwrap()
            .get(&handle)
            .cloned()
            .unwrap_or_default())
    }

    fn refresh_view(&self, viewer: &ViewerId) -> HostResult<()> {
        self.push(HostCall::Refresh {
            viewer: viewer.clone(),
        });
        Ok(())
    }
}

impl SurfaceHost for RecordingHost {
    fn create_surface(&self, slot_count: usize, title: &str) -> HostResult<SurfaceHandle> {
        let handle = {
            let mut next = self.next.lock().unwrap();
            *next += 1;
            SurfaceHandle::from_raw(*next)
        };
        self.viewers.lock().unwrap().insert(handle, Vec::new());
        self.push(HostCall::Create {
            slot_count,
            title: title.to_string(),
        });
        Ok(handle)
    }

    fn set_slot(&self, handle: SurfaceHandle, index: usize, item: &ItemSignature) -> HostResult<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(HostError::Rejected("writes disabled".to_string()));
        }
        self.push(HostCall::SetSlot {
            handle,
            index,
            item: item.clone(),
        });
        Ok(())
    }

    fn present(&self, handle: SurfaceHandle, viewer: &ViewerId) -> HostResult<()> {
        let mut viewers = self.viewers.lock().unwrap();
        let list = viewers
            .get_mut(&handle)
            .ok_or(HostError::UnknownSurface(handle))?;
        if !list.contains(viewer) {
            list.push(viewer.clone());
        }
        drop(viewers);
        self.push(HostCall::Present {
            handle,
            viewer: viewer.clone(),
        });
        Ok(())
    }
}
