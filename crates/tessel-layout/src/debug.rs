#![forbid(unsafe_code)]

//! Split recording for layout introspection.
//!
//! [`LayoutDebugger`] collects a [`LayoutRecord`] for every split made
//! through [`Layout::split_debug`](crate::Layout::split_debug) while it is
//! enabled. Records flag over-constrained layouts (fixed sizes running past
//! the usable region) and badly under-used ones, and render to a plain-text
//! report the dashboard can dump behind a debug key.
//!
//! Recording is a no-op unless explicitly enabled at runtime.
//!
//! # Usage
//!
//! ```
//! use tessel_layout::{Constraint, Layout, LayoutDebugger, Rect};
//!
//! let debugger = LayoutDebugger::new();
//! debugger.set_enabled(true);
//!
//! let layout = Layout::horizontal([Constraint::Length(80), Constraint::Length(80)]);
//! layout.split_debug(Rect::from_size(100, 10), "status_row", &debugger).unwrap();
//!
//! let overflows = debugger.overflows();
//! assert_eq!(overflows.len(), 1);
//! assert_eq!(overflows[0].overflow(), 60);
//! ```

use crate::{Constraint, Direction};
use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tessel_core::geometry::Rect;

/// Fraction of the usable length that may go unused before a record is
/// reported as under-used.
const UNDERFLOW_THRESHOLD: f32 = 0.2;

/// A record of a single split.
#[derive(Debug, Clone)]
pub struct LayoutRecord {
    /// Caller-provided name, e.g. the panel group being laid out.
    pub name: String,
    /// The constraints that were solved.
    pub constraints: Vec<Constraint>,
    /// Primary-axis length after the margin, before spacing.
    pub usable_size: u16,
    /// Primary-axis length left for the constraints after spacing.
    pub allocatable: u16,
    /// Resolved size of each region.
    pub computed_sizes: Vec<u16>,
    /// Layout direction.
    pub direction: Direction,
    /// Outer margin.
    pub margin: u16,
    /// Spacing between regions.
    pub spacing: u16,
    /// The input area.
    pub input_area: Rect,
    /// The resulting rectangles.
    pub result_rects: Vec<Rect>,
    /// Time taken to solve (if measured).
    pub solve_time: Option<Duration>,
}

impl LayoutRecord {
    /// Create an empty record.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraints: Vec::new(),
            usable_size: 0,
            allocatable: 0,
            computed_sizes: Vec::new(),
            direction: Direction::default(),
            margin: 0,
            spacing: 0,
            input_area: Rect::default(),
            result_rects: Vec::new(),
            solve_time: None,
        }
    }

    /// Cells occupied along the primary axis: region sizes plus spacing.
    pub fn used(&self) -> u32 {
        let sizes: u32 = self.computed_sizes.iter().map(|&s| u32::from(s)).sum();
        let gaps = self.computed_sizes.len().saturating_sub(1) as u32;
        sizes + gaps * u32::from(self.spacing)
    }

    /// Cells by which the regions run past the usable length.
    pub fn overflow(&self) -> u32 {
        self.used().saturating_sub(u32::from(self.usable_size))
    }

    /// Whether the layout was over-constrained for this area.
    pub fn has_overflow(&self) -> bool {
        self.overflow() > 0
    }

    /// Whether more than 20% of the usable length went unused.
    pub fn has_underflow(&self) -> bool {
        if self.usable_size == 0 {
            return false;
        }
        let unused = u32::from(self.usable_size).saturating_sub(self.used());
        unused as f32 / f32::from(self.usable_size) > UNDERFLOW_THRESHOLD
    }

    /// Percentage of the usable length occupied, capped at 100.
    pub fn utilization(&self) -> f32 {
        if self.usable_size == 0 {
            return 0.0;
        }
        (self.used() as f32 / f32::from(self.usable_size)).min(1.0) * 100.0
    }

    /// Generate a human-readable summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "{} ({:?}):", self.name, self.direction);
        let _ = writeln!(s, "  Input: {}", self.input_area);
        let _ = writeln!(
            s,
            "  Usable: {} (margin {}), allocatable: {} (spacing {})",
            self.usable_size, self.margin, self.allocatable, self.spacing
        );

        for (i, (constraint, size)) in self
            .constraints
            .iter()
            .zip(self.computed_sizes.iter())
            .enumerate()
        {
            let rect = self
                .result_rects
                .get(i)
                .map_or_else(|| "?".to_string(), Rect::to_string);
            let _ = writeln!(s, "  [{i}] {constraint} -> {size} @ {rect}");
        }

        let _ = writeln!(s, "  Utilization: {:.1}%", self.utilization());
        if self.has_overflow() {
            let _ = writeln!(s, "  OVER-CONSTRAINED by {} cells", self.overflow());
        }
        if self.has_underflow() {
            let _ = writeln!(s, "  UNDERFLOW (>20% unused)");
        }
        if let Some(t) = self.solve_time {
            let _ = writeln!(s, "  Solve time: {t:?}");
        }
        s
    }
}

/// Split recorder.
///
/// Thread-safe via internal synchronization; share it across the
/// application behind the returned `Arc`.
#[derive(Debug)]
pub struct LayoutDebugger {
    enabled: AtomicBool,
    records: Mutex<Vec<LayoutRecord>>,
}

impl LayoutDebugger {
    /// Create a new debugger wrapped in Arc (disabled by default).
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            enabled: AtomicBool::new(false),
            records: Mutex::new(Vec::new()),
        })
    }

    /// Check if recording is enabled.
    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Enable or disable recording.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Toggle recording; returns the new state.
    pub fn toggle(&self) -> bool {
        !self.enabled.fetch_xor(true, Ordering::Relaxed)
    }

    /// Drop all records.
    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
    }

    /// Store a record (ignored while disabled).
    pub fn record(&self, record: LayoutRecord) {
        if !self.enabled() {
            return;
        }
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }

    /// Copy of all records, oldest first.
    pub fn snapshot(&self) -> Vec<LayoutRecord> {
        self.records
            .lock()
            .ok()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Records of over-constrained splits.
    pub fn overflows(&self) -> Vec<LayoutRecord> {
        self.snapshot()
            .into_iter()
            .filter(LayoutRecord::has_overflow)
            .collect()
    }

    /// Records of splits leaving more than 20% unused.
    pub fn underflows(&self) -> Vec<LayoutRecord> {
        self.snapshot()
            .into_iter()
            .filter(LayoutRecord::has_underflow)
            .collect()
    }

    /// Plain-text report of all records.
    pub fn report(&self) -> String {
        let records = self.snapshot();

        let mut s = String::new();
        let _ = writeln!(s, "=== Layout Debug Report ({} splits) ===", records.len());

        let overflows: Vec<_> = records.iter().filter(|r| r.has_overflow()).collect();
        if !overflows.is_empty() {
            let _ = writeln!(s, "\n{} layouts are OVER-CONSTRAINED:", overflows.len());
            for r in &overflows {
                let _ = writeln!(s, "  - {} (+{} cells)", r.name, r.overflow());
            }
        }

        let underflows: Vec<_> = records.iter().filter(|r| r.has_underflow()).collect();
        if !underflows.is_empty() {
            let _ = writeln!(s, "\n{} layouts have UNDERFLOW:", underflows.len());
            for r in &underflows {
                let _ = writeln!(s, "  - {} ({:.1}% utilization)", r.name, r.utilization());
            }
        }

        for record in &records {
            let _ = write!(s, "\n{}", record.summary());
        }
        s
    }
}
