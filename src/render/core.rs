use std::collections::HashMap;
use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::Print;

use unicode_width::UnicodeWidthChar;

use crate::error::{Result, ScreenError};
use crate::host::{HostError, HostResult, SurfaceHandle, SurfaceHost, ViewRefresher, ViewerId};
use crate::item::ItemSignature;
use crate::width::{display_width, plain_text};

/// Columns per grid row; the compact five-slot layout is a single row.
const GRID_COLUMNS: usize = 9;

/// Largest cursor coordinate `MoveTo` can encode (it writes one-based positions).
const MAX_POSITION: u16 = u16::MAX - 1;

/// Renderer parameters.
#[derive(Debug, Clone)]
pub struct RendererSettings {
    /// Display cells reserved for each slot, excluding borders.
    pub cell_width: usize,
    /// Top-left terminal position (column, row) of the title line.
    pub origin: (u16, u16),
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            cell_width: 8,
            origin: (0, 0),
        }
    }
}

struct SurfaceFrame {
    title: String,
    cells: Vec<Option<ItemSignature>>,
    viewers: Vec<ViewerId>,
}

impl SurfaceFrame {
    fn columns(&self) -> usize {
        self.cells.len().min(GRID_COLUMNS)
    }
}

/// In-memory [`SurfaceHost`] that draws grids as ANSI text.
///
/// Terminal front ends use it directly; it also serves as the reference
/// collaborator for the router.
pub struct AnsiSurfaceHost {
    settings: RendererSettings,
    next_handle: AtomicU64,
    frames: Mutex<HashMap<SurfaceHandle, SurfaceFrame>>,
    refreshes: Mutex<HashMap<ViewerId, u64>>,
}

impl AnsiSurfaceHost {
    pub fn new(settings: RendererSettings) -> Self {
        Self {
            settings,
            next_handle: AtomicU64::new(1),
            frames: Mutex::new(HashMap::new()),
            refreshes: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_default() -> Self {
        Self::new(RendererSettings::default())
    }

    /// Number of refreshes pushed to `viewer` so far.
    pub fn refresh_count(&self, viewer: &ViewerId) -> u64 {
        self.refreshes
            .lock()
            .ok()
            .and_then(|counts| counts.get(viewer).copied())
            .unwrap_or(0)
    }

    pub fn title(&self, handle: SurfaceHandle) -> Option<String> {
        let frames = self.frames.lock().ok()?;
        frames.get(&handle).map(|frame| frame.title.clone())
    }

    pub fn slot(&self, handle: SurfaceHandle, index: usize) -> Option<ItemSignature> {
        let frames = self.frames.lock().ok()?;
        frames.get(&handle)?.cells.get(index)?.clone()
    }

    /// Resolve a terminal position to the slot drawn there, if any.
    pub fn slot_at(&self, handle: SurfaceHandle, column: u16, row: u16) -> Option<usize> {
        let frames = self.frames.lock().ok()?;
        let frame = frames.get(&handle)?;
        let (origin_col, origin_row) = self.settings.origin;
        // Title line, then the top border.
        let grid_row = usize::from(row.checked_sub(origin_row.checked_add(2)?)?);
        let rel_col = usize::from(column.checked_sub(origin_col)?);
        let stride = self.settings.cell_width + 1;
        if rel_col % stride == 0 {
            return None;
        }
        let grid_col = rel_col / stride;
        if grid_col >= frame.columns() {
            return None;
        }
        let index = grid_row * frame.columns() + grid_col;
        (index < frame.cells.len()).then_some(index)
    }

    /// Draw the surface: title, then one bordered line per grid row.
    pub fn render(&self, writer: &mut impl Write, handle: SurfaceHandle) -> Result<()> {
        let lines = {
            let frames = self.frames.lock().map_err(|_| ScreenError::Poisoned)?;
            let frame = frames
                .get(&handle)
                .ok_or(HostError::UnknownSurface(handle))?;
            self.layout(frame)
        };

        let (col, row) = self.settings.origin;
        let col = col.min(MAX_POSITION);
        for (offset, line) in lines.iter().enumerate() {
            let offset = u16::try_from(offset).unwrap_or(u16::MAX);
            let line_row = row.saturating_add(offset).min(MAX_POSITION);
            queue!(writer, MoveTo(col, line_row), Print(line))?;
        }
        writer.flush()?;
        Ok(())
    }

    fn layout(&self, frame: &SurfaceFrame) -> Vec<String> {
        let width = self.settings.cell_width;
        let columns = frame.columns();
        let border = format!("+{}", format!("{}+", "-".repeat(width)).repeat(columns));

        let mut lines = vec![fit(&frame.title, display_width(&border)), border.clone()];
        for row in frame.cells.chunks(columns.max(1)) {
            let mut line = String::from("|");
            for cell in row {
                let text = cell.as_ref().map(cell_text).unwrap_or_default();
                line.push_str(&fit(&text, width));
                line.push('|');
            }
            lines.push(line);
        }
        lines.push(border);
        lines
    }

    fn with_frame<T>(
        &self,
        handle: SurfaceHandle,
        f: impl FnOnce(&mut SurfaceFrame) -> HostResult<T>,
    ) -> HostResult<T> {
        let mut frames = self
            .frames
            .lock()
            .map_err(|_| HostError::Rejected("surface table poisoned".to_string()))?;
        let frame = frames
            .get_mut(&handle)
            .ok_or(HostError::UnknownSurface(handle))?;
        f(frame)
    }
}

fn cell_text(item: &ItemSignature) -> String {
    let name = item.label().unwrap_or(&item.kind);
    if item.quantity > 1 {
        format!("{name} x{}", item.quantity)
    } else {
        name.to_string()
    }
}

/// Truncate or pad `text` to exactly `width` display cells. Colour codes are dropped.
fn fit(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in plain_text(text).chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > width {
            break;
        }
        out.push(ch);
        used += ch_width;
    }
    out.push_str(&" ".repeat(width - used));
    out
}

impl ViewRefresher for AnsiSurfaceHost {
    fn list_viewers(&self, handle: SurfaceHandle) -> HostResult<Vec<ViewerId>> {
        self.with_frame(handle, |frame| Ok(frame.viewers.clone()))
    }

    fn refresh_view(&self, viewer: &ViewerId) -> HostResult<()> {
        let mut counts = self
            .refreshes
            .lock()
            .map_err(|_| HostError::Rejected("refresh table poisoned".to_string()))?;
        *counts.entry(viewer.clone()).or_insert(0) += 1;
        Ok(())
    }
}

impl SurfaceHost for AnsiSurfaceHost {
    fn create_surface(&self, slot_count: usize, title: &str) -> HostResult<SurfaceHandle> {
        if slot_count == 0 {
            return Err(HostError::Rejected("surface needs at least one slot".to_string()));
        }
        let handle = SurfaceHandle::from_raw(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let mut frames = self
            .frames
            .lock()
            .map_err(|_| HostError::Rejected("surface table poisoned".to_string()))?;
        frames.insert(
            handle,
            SurfaceFrame {
                title: title.to_string(),
                cells: vec![None; slot_count],
                viewers: Vec::new(),
            },
        );
        Ok(handle)
    }

    fn set_slot(&self, handle: SurfaceHandle, index: usize, item: &ItemSignature) -> HostResult<()> {
        self.with_frame(handle, |frame| {
            let cell = frame
                .cells
                .get_mut(index)
                .ok_or(HostError::InvalidSlot { handle, index })?;
            *cell = Some(item.clone());
            Ok(())
        })
    }

    fn present(&self, handle: SurfaceHandle, viewer: &ViewerId) -> HostResult<()> {
        self.with_frame(handle, |frame| {
            if !frame.viewers.contains(viewer) {
                frame.viewers.push(viewer.clone());
            }
            Ok(())
        })
    }
}
