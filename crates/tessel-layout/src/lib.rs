#![forbid(unsafe_code)]

//! Layout primitives and the space-allocation solver.
//!
//! This crate divides a terminal region into an ordered row or column of
//! sub-regions, one per [`Constraint`], for the dashboard's panels:
//!
//! - [`Layout`] - immutable 1D layout configuration (direction, constraints,
//!   margin, spacing) and its [`split`](Layout::split) solver
//! - [`Constraint`] - sizing rules (Length, Percentage, Ratio, Fill)
//! - [`cache`] - caller-owned memoization of split results
//! - [`debug`] - opt-in recording of solve operations for introspection
//!
//! # Example
//!
//! ```
//! use tessel_layout::{Constraint, Layout, Rect};
//!
//! let layout = Layout::horizontal([
//!     Constraint::Length(20),
//!     Constraint::Fill(1),
//!     Constraint::Percentage(30.0),
//! ]);
//!
//! let rects = layout.split(Rect::new(0, 0, 100, 50)).unwrap();
//! assert_eq!(rects[0], Rect::new(0, 0, 20, 50));
//! assert_eq!(rects[1], Rect::new(20, 0, 50, 50));
//! assert_eq!(rects[2], Rect::new(70, 0, 30, 50));
//! ```
//!
//! # Invariants
//!
//! 1. `split` returns exactly one rect per constraint, in declaration order.
//! 2. Every rect spans the full margin-inset cross axis.
//! 3. Consecutive rects are separated by exactly `spacing` cells.
//! 4. Fill shares sum exactly to the space left by the fixed constraints.
//! 5. `split` is pure: identical inputs give identical outputs.
//!
//! # Failure Modes
//!
//! - `Ratio(_, 0)` is rejected with [`LayoutError::ZeroDenominator`].
//! - Fixed constraints that exceed the allocatable length are kept literally
//!   (no shrink-to-fit); Fill constraints then receive 0 and the output runs
//!   past the region. Such layouts are logged as over-constrained.

pub mod cache;
pub mod debug;

pub use cache::{LayoutCache, LayoutCacheKey, LayoutCacheStats};
pub use debug::{LayoutDebugger, LayoutRecord};
pub use tessel_core::geometry::Rect;

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::time::Instant;
use tessel_core::{debug_span, warn};

/// A constraint on the size of one layout region along the primary axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// An exact size in cells, clamped to the allocatable length.
    Length(u16),
    /// A percentage of the allocatable length (0.0 to 100.0).
    Percentage(f32),
    /// An exact fraction of the allocatable length (numerator, denominator).
    Ratio(u32, u32),
    /// A weighted share of whatever the other constraints leave over.
    Fill(u32),
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length(n) => write!(f, "Length({n})"),
            Self::Percentage(p) => write!(f, "Pct({p:.0}%)"),
            Self::Ratio(n, d) => write!(f, "Ratio({n}/{d})"),
            Self::Fill(w) => write!(f, "Fill({w})"),
        }
    }
}

/// The direction to lay out items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Top to bottom; regions split the height and share the width.
    #[default]
    Vertical,
    /// Left to right; regions split the width and share the height.
    Horizontal,
}

impl Direction {
    /// Length of `area` along the split axis.
    #[inline]
    pub const fn primary_len(self, area: Rect) -> u16 {
        match self {
            Self::Horizontal => area.width,
            Self::Vertical => area.height,
        }
    }

    /// Length of `area` along the shared axis.
    #[inline]
    pub const fn cross_len(self, area: Rect) -> u16 {
        match self {
            Self::Horizontal => area.height,
            Self::Vertical => area.width,
        }
    }

    /// Origin of `area` along the split axis.
    #[inline]
    pub const fn primary_origin(self, area: Rect) -> u16 {
        match self {
            Self::Horizontal => area.x,
            Self::Vertical => area.y,
        }
    }

    /// Carve a slice of `area` starting at `offset` with `size` cells on the
    /// split axis and the full extent of the shared axis.
    #[inline]
    const fn slice(self, area: Rect, offset: u16, size: u16) -> Rect {
        match self {
            Self::Horizontal => Rect::new(offset, area.y, size, area.height),
            Self::Vertical => Rect::new(area.x, offset, area.width, size),
        }
    }
}

/// Error returned when a layout cannot be solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// A `Ratio` constraint has a zero denominator.
    ZeroDenominator {
        /// Index of the offending constraint.
        index: usize,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDenominator { index } => {
                write!(f, "constraint {index}: ratio denominator must be non-zero")
            }
        }
    }
}

impl std::error::Error for LayoutError {}

/// Standard result type for layout APIs.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// An immutable 1D layout configuration.
///
/// Built once per region definition and reused for every resize. The
/// `with_*` methods return a new layout and leave the receiver untouched, so
/// a layout can be shared by reference (or behind an `Arc`) between threads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default)]
    direction: Direction,
    #[serde(default)]
    constraints: Vec<Constraint>,
    #[serde(default, deserialize_with = "deserialize_cells")]
    margin: u16,
    #[serde(default, deserialize_with = "deserialize_cells")]
    spacing: u16,
}

impl Layout {
    /// Create a layout with zero margin and zero spacing.
    pub fn new(direction: Direction, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        Self {
            direction,
            constraints: constraints.into_iter().collect(),
            margin: 0,
            spacing: 0,
        }
    }

    /// Create a left-to-right layout.
    pub fn horizontal(constraints: impl IntoIterator<Item = Constraint>) -> Self {
        Self::new(Direction::Horizontal, constraints)
    }

    /// Create a top-to-bottom layout.
    pub fn vertical(constraints: impl IntoIterator<Item = Constraint>) -> Self {
        Self::new(Direction::Vertical, constraints)
    }

    /// Return a copy with the outer margin set to `max(0, margin)`.
    #[must_use]
    pub fn with_margin(&self, margin: i32) -> Self {
        Self {
            margin: cells(i64::from(margin)),
            ..self.clone()
        }
    }

    /// Return a copy with the inter-region spacing set to `max(0, spacing)`.
    #[must_use]
    pub fn with_spacing(&self, spacing: i32) -> Self {
        Self {
            spacing: cells(i64::from(spacing)),
            ..self.clone()
        }
    }

    /// The split direction.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The constraints, in declaration order.
    #[inline]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Outer margin applied on every side.
    #[inline]
    pub fn margin(&self) -> u16 {
        self.margin
    }

    /// Cells between consecutive regions.
    #[inline]
    pub fn spacing(&self) -> u16 {
        self.spacing
    }

    /// Number of constraints (and thus output rects from [`split`](Self::split)).
    #[must_use]
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Check the constraints for configuration errors.
    pub fn validate(&self) -> Result<()> {
        match self
            .constraints
            .iter()
            .position(|c| matches!(c, Constraint::Ratio(_, 0)))
        {
            Some(index) => Err(LayoutError::ZeroDenominator { index }),
            None => Ok(()),
        }
    }

    /// Primary-axis length left for the constraints once the margin and
    /// the spacing between regions are taken out of `area`.
    pub fn allocatable(&self, area: Rect) -> u16 {
        let usable = self.direction.primary_len(area.inset(self.margin));
        usable.saturating_sub(self.total_spacing())
    }

    fn total_spacing(&self) -> u16 {
        let gaps = self.constraints.len().saturating_sub(1) as u64;
        (gaps * u64::from(self.spacing)).min(u64::from(u16::MAX)) as u16
    }

    /// Split `area` into one rect per constraint.
    ///
    /// The rects are laid out in declaration order starting at the
    /// margin-inset origin, each sharing the full inset cross axis.
    pub fn split(&self, area: Rect) -> Result<Vec<Rect>> {
        let _span = debug_span!(
            "layout.split",
            direction = ?self.direction,
            constraints = self.constraints.len(),
            width = area.width,
            height = area.height
        )
        .entered();

        self.validate()?;
        if self.constraints.is_empty() {
            return Ok(Vec::new());
        }

        // A zero-area input, or a margin that leaves nothing along the split
        // axis, yields zero-size rects. A collapsed cross axis alone does not:
        // the primary axis is still allocated and the rects get cross size 0.
        let inner = area.inset(self.margin);
        if area.is_empty() || self.direction.primary_len(inner) == 0 {
            let origin = Rect::new(inner.x, inner.y, 0, 0);
            return Ok(vec![origin; self.constraints.len()]);
        }

        let sizes = solve_constraints(&self.constraints, self.allocatable(area))?;
        Ok(self.sizes_to_rects(inner, &sizes))
    }

    /// Split through a [`LayoutCache`], reusing the result of an earlier
    /// identical split when one is cached.
    pub fn split_cached(&self, area: Rect, cache: &mut LayoutCache) -> Result<Vec<Rect>> {
        let key = LayoutCacheKey::new(area, self);
        cache.get_or_try_compute(key, || self.split(area))
    }

    /// Split and, when `debugger` is enabled, record the solve under `name`.
    pub fn split_debug(
        &self,
        area: Rect,
        name: &str,
        debugger: &LayoutDebugger,
    ) -> Result<Vec<Rect>> {
        if !debugger.enabled() {
            return self.split(area);
        }

        let start = Instant::now();
        let rects = self.split(area)?;
        let solve_time = start.elapsed();

        let mut record = LayoutRecord::new(name);
        record.constraints = self.constraints.clone();
        record.usable_size = self.direction.primary_len(area.inset(self.margin));
        record.allocatable = self.allocatable(area);
        record.computed_sizes = rects
            .iter()
            .map(|r| self.direction.primary_len(*r))
            .collect();
        record.direction = self.direction;
        record.margin = self.margin;
        record.spacing = self.spacing;
        record.input_area = area;
        record.result_rects = rects.clone();
        record.solve_time = Some(solve_time);
        debugger.record(record);

        Ok(rects)
    }

    fn sizes_to_rects(&self, inner: Rect, sizes: &[u16]) -> Vec<Rect> {
        let mut rects = Vec::with_capacity(sizes.len());
        let mut offset = self.direction.primary_origin(inner);

        for &size in sizes {
            rects.push(self.direction.slice(inner, offset, size));
            offset = offset.saturating_add(size).saturating_add(self.spacing);
        }

        rects
    }
}

/// Clamp a signed cell count into `0..=u16::MAX`.
fn cells(n: i64) -> u16 {
    u16::try_from(n.max(0)).unwrap_or(u16::MAX)
}

fn deserialize_cells<'de, D>(deserializer: D) -> std::result::Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    i64::deserialize(deserializer).map(cells)
}

/// Solve 1D constraints against `allocatable` cells.
///
/// Fixed constraints (Length, Percentage, Ratio) resolve independently;
/// Fill constraints then share what is left by weight. The remainder of the
/// weighted division goes one cell at a time, in declaration order, to the
/// Fills whose exact share was rounded down.
pub(crate) fn solve_constraints(constraints: &[Constraint], allocatable: u16) -> Result<Vec<u16>> {
    let mut sizes = vec![0u16; constraints.len()];
    let mut fixed_sum = 0u32;
    let mut fills: Vec<(usize, u32)> = Vec::new();

    // 1. Fixed constraints
    for (i, &constraint) in constraints.iter().enumerate() {
        let size = match constraint {
            Constraint::Length(len) => len.min(allocatable),
            Constraint::Percentage(p) => percentage_of(allocatable, p),
            Constraint::Ratio(_, 0) => return Err(LayoutError::ZeroDenominator { index: i }),
            Constraint::Ratio(n, d) => ratio_of(allocatable, n, d),
            Constraint::Fill(weight) => {
                fills.push((i, weight));
                continue;
            }
        };
        sizes[i] = size;
        fixed_sum += u32::from(size);
    }

    if fixed_sum > u32::from(allocatable) {
        warn!(
            message = "layout.over_constrained",
            fixed_sum,
            allocatable,
            overflow = fixed_sum - u32::from(allocatable)
        );
    }

    // 2. Weighted fill distribution
    let remaining = u64::from(allocatable).saturating_sub(u64::from(fixed_sum));
    let weight_sum: u64 = fills.iter().map(|&(_, w)| u64::from(w)).sum();
    if remaining == 0 || weight_sum == 0 {
        return Ok(sizes);
    }

    let mut distributed = 0u64;
    let mut rounded_down = Vec::with_capacity(fills.len());
    for &(i, weight) in &fills {
        let exact = remaining * u64::from(weight);
        let base = exact / weight_sum;
        sizes[i] = base as u16;
        distributed += base;
        if exact % weight_sum != 0 {
            rounded_down.push(i);
        }
    }

    let leftover = (remaining - distributed) as usize;
    for &i in rounded_down.iter().take(leftover) {
        sizes[i] += 1;
    }

    Ok(sizes)
}

/// `round(total * p / 100)` with `p` clamped into `0..=100`.
fn percentage_of(total: u16, p: f32) -> u16 {
    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 100.0) };
    (f64::from(total) * f64::from(p) / 100.0).round() as u16
}

/// `round(total * n / d)`, half away from zero, saturating at `u16::MAX`.
fn ratio_of(total: u16, n: u32, d: u32) -> u16 {
    let d = u64::from(d);
    let scaled = u64::from(total) * u64::from(n);
    ((scaled * 2 + d) / (d * 2)).min(u64::from(u16::MAX)) as u16
}
