use super::config::ADC_SPAN;

const ACC_MIN_RESET: u16 = ADC_SPAN as u16;
const ACC_MAX_RESET: u16 = 0;

/// Running min/max window of the peak-detect resampler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecimationState {
    pub acc_min: u16,
    pub acc_max: u16,
    /// Hardware samples accumulated toward the next window, fractional part carried over.
    pub progress: f64,
    pub target_count: f64,
}

impl DecimationState {
    pub fn new(target_count: f64) -> Self {
        Self {
            acc_min: ACC_MIN_RESET,
            acc_max: ACC_MAX_RESET,
            progress: 0.0,
            target_count: target_count.max(1.0),
        }
    }

    fn clear_window(&mut self) {
        self.acc_min = ACC_MIN_RESET;
        self.acc_max = ACC_MAX_RESET;
    }
}

impl Default for DecimationState {
    fn default() -> Self {
        DecimationState::new(1.0)
    }
}

/// Peak-detect resampler from the hardware rate down to the requested display rate.
///
/// With a ratio of one every sample passes straight through. Above that, every
/// `target_count` input samples collapse into a `(min, max)` pair so that spikes
/// narrower than one window stay visible.
#[derive(Clone, Debug, Default)]
pub struct Decimator {
    state: DecimationState,
}

impl Decimator {
    pub fn new(target_count: f64) -> Self {
        Self {
            state: DecimationState::new(target_count),
        }
    }

    pub fn state(&self) -> &DecimationState {
        &self.state
    }

    pub fn target_count(&self) -> f64 {
        self.state.target_count
    }

    pub fn is_passthrough(&self) -> bool {
        self.state.target_count <= 1.0
    }

    /// Drops any partial window and phase.
    pub fn reset(&mut self) {
        self.state = DecimationState::new(self.state.target_count);
    }

    pub fn retarget(&mut self, target_count: f64) {
        log::debug!("decimator retarget {:.3} -> {:.3}", self.state.target_count, target_count);
        self.state = DecimationState::new(target_count);
    }

    pub fn process(&mut self, batch: &[u16]) -> Vec<u16> {
        if self.is_passthrough() {
            return batch.to_vec();
        }
        let mut out = Vec::with_capacity(2 * (batch.len() as f64 / self.state.target_count) as usize + 2);
        let state = &mut self.state;
        for &val in batch {
            state.acc_min = state.acc_min.min(val);
            state.acc_max = state.acc_max.max(val);
            state.progress += 1.0;
            if state.progress >= state.target_count {
                out.push(state.acc_min);
                out.push(state.acc_max);
                state.clear_window();
                // Keep the remainder so non-integer ratios do not drift.
                state.progress -= state.target_count;
            }
        }
        out
    }
}
