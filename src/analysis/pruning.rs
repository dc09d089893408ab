//! Elimination of weak constituents after the regression.
//!
//! Three passes, in order:
//!
//! 1. amplitudes below [`AMPLITUDE_EPSILON`] are removed silently, they would
//!    round to zero in a tide database anyway;
//! 2. when a maximum count is set, the weakest survivor is removed until the
//!    count fits;
//! 3. survivors below the minimum amplitude are removed.
//!
//! Passes 2 and 3 account for what they remove in [`DroppedStats`].
use itertools::Itertools;

use crate::constants::AMPLITUDE_EPSILON;
use crate::tidegen_errors::TidegenError;

use super::HarmonicEntry;

/// Amplitude lost to pruning, in the units of the time series.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DroppedStats {
    /// Largest amplitude removed by the count or amplitude limits
    pub max_amplitude: f64,
    /// Sum of the amplitudes removed by the count or amplitude limits
    pub total_amplitude: f64,
    /// Number of constituents removed by the count or amplitude limits
    pub count: usize,
}

impl DroppedStats {
    fn record_capped(&mut self, amplitude: f64) {
        // the cap removes in increasing order, the last one is the largest
        self.total_amplitude += amplitude;
        self.max_amplitude = amplitude;
        self.count += 1;
    }

    fn record_below_minimum(&mut self, amplitude: f64) {
        self.total_amplitude += amplitude;
        self.max_amplitude = self.max_amplitude.max(amplitude);
        self.count += 1;
    }
}

/// Apply the elimination passes to `entries`, keeping the order of the survivors.
///
/// Arguments
/// ---------
/// * `entries`: regression output, one entry per constituent
/// * `max_constituents`: optional cap on the number of survivors
/// * `min_amplitude`: survivors must reach this amplitude (0 disables the pass)
///
/// Return
/// ------
/// * the survivors and the accounting of what passes 2 and 3 removed
/// * [`TidegenError::AllConstituentsEliminated`] when nothing survives
pub fn prune(
    mut entries: Vec<HarmonicEntry>,
    max_constituents: Option<usize>,
    min_amplitude: f64,
) -> Result<(Vec<HarmonicEntry>, DroppedStats), TidegenError> {
    let mut dropped = DroppedStats::default();

    entries.retain(|e| e.amplitude >= AMPLITUDE_EPSILON);

    if let Some(max) = max_constituents {
        while entries.len() > max {
            let Some(victim) = entries
                .iter()
                .position_min_by(|a, b| a.amplitude.total_cmp(&b.amplitude))
            else {
                break;
            };
            dropped.record_capped(entries.remove(victim).amplitude);
        }
    }

    entries.retain(|e| {
        let keep = e.amplitude >= min_amplitude;
        if !keep {
            dropped.record_below_minimum(e.amplitude);
        }
        keep
    });

    if entries.is_empty() {
        return Err(TidegenError::AllConstituentsEliminated);
    }
    Ok((entries, dropped))
}
