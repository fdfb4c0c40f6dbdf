/// Number of display points retained by the ring buffer.
pub const BUFFER_CAPACITY: usize = 4000;
/// Points drawn per frame. The other half of the buffer is history for the trigger search.
pub const DISPLAY_WIDTH: usize = BUFFER_CAPACITY / 2;
/// The ADC cannot run slower than this; lower rates are reached by decimation.
pub const MIN_HARDWARE_RATE: u32 = 1000;
/// Full 12-bit code span. Trigger levels are measured down from here.
pub const ADC_SPAN: u32 = 4096;
pub const SAMPLE_MAX: u16 = 4095;
/// Approximate full-scale voltage for each attenuation step.
pub const ATTENUATION_FULL_SCALE: [f32; 4] = [0.95, 1.25, 1.75, 3.3];
const DEFAULT_FULL_SCALE: f32 = 3.3;

pub fn max_voltage_for(attenuation: usize) -> f32 {
    ATTENUATION_FULL_SCALE
        .get(attenuation)
        .copied()
        .unwrap_or(DEFAULT_FULL_SCALE)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScopeConfig {
    /// Rate the user asked to see, in samples per second.
    pub desired_rate: u32,
    /// Rate the ADC actually runs at. Never below `MIN_HARDWARE_RATE` or `desired_rate`.
    pub hardware_sample_rate: u32,
    pub attenuation: usize,
    pub bit_width: u8,
    /// Trigger level in "distance from top" code units (0..=4095).
    pub trigger_level: u16,
    pub trigger_invert: bool,
    /// Frequency of the device's built-in test signal.
    pub test_hz: u32,
}

impl ScopeConfig {
    pub fn new(desired_rate: u32, attenuation: usize, bit_width: u8, test_hz: u32) -> Self {
        let desired_rate = desired_rate.max(1);
        Self {
            desired_rate,
            hardware_sample_rate: desired_rate.max(MIN_HARDWARE_RATE),
            attenuation,
            bit_width,
            trigger_level: 2048,
            trigger_invert: false,
            test_hz,
        }
    }

    pub fn with_trigger(mut self, level: u16, invert: bool) -> Self {
        self.trigger_level = level.min(SAMPLE_MAX);
        self.trigger_invert = invert;
        self
    }

    pub fn is_decimated(&self) -> bool {
        self.desired_rate < MIN_HARDWARE_RATE
    }

    /// Hardware samples folded into one min/max window.
    pub fn target_count(&self) -> f64 {
        if self.is_decimated() {
            self.hardware_sample_rate as f64 / self.desired_rate as f64
        } else {
            1.0
        }
    }

    pub fn max_voltage(&self) -> f32 {
        max_voltage_for(self.attenuation)
    }

    /// Rate at which windows (or raw samples, when undecimated) arrive.
    pub fn effective_rate(&self) -> u32 {
        if self.is_decimated() {
            self.desired_rate
        } else {
            self.hardware_sample_rate
        }
    }

    /// Time covered by one buffer point. A decimated window spans
    /// `target_count` hardware samples and yields two points.
    pub fn point_period_ms(&self) -> f64 {
        let samples_per_point = if self.is_decimated() {
            self.target_count() / 2.0
        } else {
            1.0
        };
        samples_per_point / self.hardware_sample_rate as f64 * 1000.0
    }

    /// Time covered by the `DISPLAY_WIDTH` points drawn each frame.
    pub fn visible_time_span_ms(&self) -> f64 {
        DISPLAY_WIDTH as f64 * self.point_period_ms()
    }
}

impl Default for ScopeConfig {
    fn default() -> Self {
        ScopeConfig::new(MIN_HARDWARE_RATE, 3, 12, 50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn slow_rates_force_hardware_minimum() {
        let cfg = ScopeConfig::new(100, 3, 12, 10);
        assert_eq!(cfg.hardware_sample_rate, 1000);
        assert!(cfg.is_decimated());
        assert_relative_eq!(cfg.target_count(), 10.0);
        assert_eq!(cfg.effective_rate(), 100);
    }

    #[test]
    fn fast_rates_pass_through() {
        let cfg = ScopeConfig::new(20_000, 0, 12, 10);
        assert_eq!(cfg.hardware_sample_rate, 20_000);
        assert!(!cfg.is_decimated());
        assert_relative_eq!(cfg.target_count(), 1.0);
        assert_relative_eq!(cfg.point_period_ms(), 0.05);
        assert_relative_eq!(cfg.visible_time_span_ms(), 100.0);
    }

    #[test]
    fn decimated_points_are_half_a_window_apart() {
        let cfg = ScopeConfig::new(100, 3, 12, 10);
        // 10 ms per window, two points each
        assert_relative_eq!(cfg.point_period_ms(), 5.0);
        assert_relative_eq!(cfg.visible_time_span_ms(), 10_000.0);
    }

    #[test]
    fn undecimated_points_follow_hardware_rate() {
        let cfg = ScopeConfig::new(1000, 3, 12, 10);
        assert_relative_eq!(cfg.point_period_ms(), 1.0);
        assert_relative_eq!(cfg.visible_time_span_ms(), 2000.0);
    }

    #[test]
    fn zero_rate_is_coerced() {
        let cfg = ScopeConfig::new(0, 3, 12, 10);
        assert_eq!(cfg.desired_rate, 1);
        assert_relative_eq!(cfg.target_count(), 1000.0);
    }

    #[test]
    fn attenuation_table_falls_back_to_full_range() {
        assert_relative_eq!(max_voltage_for(0), 0.95);
        assert_relative_eq!(max_voltage_for(2), 1.75);
        assert_relative_eq!(max_voltage_for(3), 3.3);
        assert_relative_eq!(max_voltage_for(9), 3.3);
    }

    #[test]
    fn trigger_level_is_clamped() {
        let cfg = ScopeConfig::default().with_trigger(9000, true);
        assert_eq!(cfg.trigger_level, 4095);
        assert!(cfg.trigger_invert);
    }
}
