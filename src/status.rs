use std::sync::{Arc, RwLock};

use crate::error::RefreshFailure;
use crate::procmon::ProcmonReport;

/// Number of per-core slots on the bar.
pub const CPU_FIELDS: usize = 4;
/// CPU slots plus the RAM slot.
pub const FIELD_COUNT: usize = CPU_FIELDS + 1;

pub fn format_cpu(index: usize, usage: f64) -> String {
    format!("CPU {}: {}%", index, percent(usage))
}

pub fn format_ram(usage: f64) -> String {
    format!("RAM Usage: {}%", percent(usage))
}

/// Two decimals, with exact ties rounded away from zero and negative zero
/// shown as `0.00`.
///
/// `{:.2}` already rounds every non-tie correctly from the exact binary
/// value. The only values sitting exactly halfway between two hundredths
/// are odd multiples of 1/8 (0.125, 37.625, ...), and those are the ones
/// `{:.2}` sends to even.
fn percent(usage: f64) -> String {
    let usage = usage + 0.0;
    let eighths = usage * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        // usage * 100 is exactly k + 0.5 here, so round() is exact too
        format!("{:.2}", (usage * 100.0).round() / 100.0)
    } else {
        format!("{:.2}", usage)
    }
}

// ---------------------------------------------------------------------------
// FieldSlot — one display slot on the bar
// ---------------------------------------------------------------------------

/// Shared handle to the text of a single status bar field.
///
/// Clones point at the same slot, so the refresh side writes through one
/// handle while the renderer reads through another.
#[derive(Clone, Debug, Default)]
pub struct FieldSlot(Arc<RwLock<String>>);

impl FieldSlot {
    pub fn new(text: impl Into<String>) -> Self {
        Self(Arc::new(RwLock::new(text.into())))
    }

    pub fn set_text(&self, text: &str) {
        let mut slot = self.0.write().unwrap_or_else(|e| e.into_inner());
        slot.clear();
        slot.push_str(text);
    }

    pub fn text(&self) -> String {
        self.0.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

// ---------------------------------------------------------------------------
// StatusLines — the five formatted strings from one report
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusLines {
    pub cpu: [String; CPU_FIELDS],
    pub ram: String,
}

impl StatusLines {
    /// Format a report, refusing it before anything is produced when it
    /// carries fewer than [`CPU_FIELDS`] cpu entries. Extra cores are ignored.
    pub fn from_report(report: &ProcmonReport) -> Result<Self, RefreshFailure> {
        let usage = &report.cpu_usage;
        if usage.len() < CPU_FIELDS {
            return Err(RefreshFailure::MissingCpu { found: usage.len() });
        }

        Ok(Self {
            cpu: std::array::from_fn(|i| format_cpu(i, usage[i])),
            ram: format_ram(report.ram_usage),
        })
    }

    /// Slot order: CPU 0..3, then RAM.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.cpu
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.ram.as_str()))
    }

    pub fn join(&self, separator: &str) -> String {
        self.iter().collect::<Vec<_>>().join(separator)
    }
}

// ---------------------------------------------------------------------------
// StatusFields — the bar's slots, handed in by whoever owns the display
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct StatusFields {
    slots: [FieldSlot; FIELD_COUNT],
}

impl StatusFields {
    pub fn new(slots: [FieldSlot; FIELD_COUNT]) -> Self {
        Self { slots }
    }

    /// Fresh slots showing placeholders until the first successful refresh.
    pub fn with_placeholders() -> Self {
        Self::new(std::array::from_fn(|i| {
            if i < CPU_FIELDS {
                FieldSlot::new(format!("CPU {}: --", i))
            } else {
                FieldSlot::new("RAM Usage: --")
            }
        }))
    }

    pub fn apply(&self, lines: &StatusLines) {
        for (slot, text) in self.slots.iter().zip(lines.iter()) {
            slot.set_text(text);
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.slots.iter().map(FieldSlot::text).collect()
    }
}
