use super::config::SAMPLE_MAX;

/// Multiplicative step for one wheel notch.
pub const ZOOM_STEP: f32 = 1.1;
pub const MAX_SCALE: f32 = 50.0;
/// Zooming out below this snaps back to the unzoomed view.
const SNAP_SCALE: f32 = 1.001;

/// Zoom and pan applied on top of the base data-to-screen mapping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl ViewState {
    pub fn is_reset(&self) -> bool {
        self.scale == 1.0
    }

    pub fn reset(&mut self) {
        *self = ViewState::default();
    }

    /// Wheel zoom around the cursor. Negative `delta` zooms in.
    ///
    /// Returns whether the state changed.
    pub fn zoom(&mut self, delta: f32, cursor_x: f32, cursor_y: f32) -> bool {
        if delta == 0.0 || !delta.is_finite() {
            return false;
        }
        let factor = if delta < 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
        let next = self.scale * factor;
        if next < SNAP_SCALE {
            let changed = !self.is_reset() || self.offset_x != 0.0 || self.offset_y != 0.0;
            self.reset();
            return changed;
        }
        if next > MAX_SCALE {
            return false;
        }
        self.scale = next;
        self.offset_x = cursor_x - (cursor_x - self.offset_x) * factor;
        self.offset_y = cursor_y - (cursor_y - self.offset_y) * factor;
        true
    }

    /// Drag by a pixel delta. The unzoomed view is pinned to the origin.
    pub fn pan(&mut self, dx: f32, dy: f32) -> bool {
        if self.is_reset() {
            return false;
        }
        self.offset_x += dx;
        self.offset_y += dy;
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport::new(800.0, 400.0)
    }
}

/// Maps buffer points to time/voltage and time/voltage to pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub state: ViewState,
    pub viewport: Viewport,
    /// Milliseconds covered by the unzoomed width.
    pub time_span_ms: f32,
    /// Number of buffer points the unzoomed width holds.
    pub window_points: usize,
    pub max_voltage: f32,
}

impl ViewTransform {
    pub fn time_to_screen(&self, t_ms: f32) -> f32 {
        (t_ms / self.time_span_ms * self.viewport.width) * self.state.scale + self.state.offset_x
    }

    pub fn screen_to_time(&self, x: f32) -> f32 {
        (x - self.state.offset_x) / self.state.scale / self.viewport.width * self.time_span_ms
    }

    pub fn volts_to_screen(&self, volts: f32) -> f32 {
        (self.viewport.height * (1.0 - volts / self.max_voltage)) * self.state.scale
            + self.state.offset_y
    }

    pub fn screen_to_volts(&self, y: f32) -> f32 {
        (1.0 - (y - self.state.offset_y) / self.state.scale / self.viewport.height)
            * self.max_voltage
    }

    pub fn raw_to_volts(&self, raw: u16) -> f32 {
        raw as f32 / SAMPLE_MAX as f32 * self.max_voltage
    }

    /// Time of the `index`-th point of the drawn window.
    pub fn index_to_time(&self, index: usize) -> f32 {
        index as f32 / self.window_points.max(1) as f32 * self.time_span_ms
    }

    /// Screen position of a window point.
    pub fn point_to_screen(&self, index: usize, raw: u16) -> (f32, f32) {
        (
            self.time_to_screen(self.index_to_time(index)),
            self.volts_to_screen(self.raw_to_volts(raw)),
        )
    }

    /// Time range currently on screen, in ms.
    pub fn visible_time_range(&self) -> (f32, f32) {
        (self.screen_to_time(0.0), self.screen_to_time(self.viewport.width))
    }

    /// Voltage range currently on screen, low to high.
    pub fn visible_volt_range(&self) -> (f32, f32) {
        (
            self.screen_to_volts(self.viewport.height),
            self.screen_to_volts(0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn transform(state: ViewState) -> ViewTransform {
        ViewTransform {
            state,
            viewport: Viewport::new(1000.0, 500.0),
            time_span_ms: 200.0,
            window_points: 2000,
            max_voltage: 3.3,
        }
    }

    #[test]
    fn unzoomed_mapping_spans_viewport() {
        let t = transform(ViewState::default());
        assert_relative_eq!(t.time_to_screen(0.0), 0.0);
        assert_relative_eq!(t.time_to_screen(200.0), 1000.0);
        assert_relative_eq!(t.volts_to_screen(0.0), 500.0);
        assert_relative_eq!(t.volts_to_screen(3.3), 0.0, epsilon = 1e-4);
        assert_relative_eq!(t.raw_to_volts(4095), 3.3);
        assert_relative_eq!(t.index_to_time(1000), 100.0);
    }

    #[test]
    fn round_trips_under_zoom_and_pan() {
        let state = ViewState {
            scale: 3.7,
            offset_x: -812.5,
            offset_y: 41.0,
        };
        let t = transform(state);
        for ms in [0.0f32, 12.5, 99.0, 200.0] {
            assert_relative_eq!(t.screen_to_time(t.time_to_screen(ms)), ms, epsilon = 1e-3);
        }
        for v in [0.0f32, 0.8, 1.65, 3.3] {
            assert_relative_eq!(t.screen_to_volts(t.volts_to_screen(v)), v, epsilon = 1e-4);
        }
    }

    #[test]
    fn voltage_grows_upward() {
        let t = transform(ViewState::default());
        assert!(t.volts_to_screen(2.0) < t.volts_to_screen(1.0));
        let (lo, hi) = t.visible_volt_range();
        assert_relative_eq!(lo, 0.0, epsilon = 1e-5);
        assert_relative_eq!(hi, 3.3);
    }

    #[test]
    fn zoom_keeps_cursor_point_fixed() {
        let mut state = ViewState::default();
        let before = transform(state);
        let (cx, cy) = (250.0, 100.0);
        let t_under = before.screen_to_time(cx);
        let v_under = before.screen_to_volts(cy);
        assert!(state.zoom(-1.0, cx, cy));
        assert!(state.zoom(-1.0, cx, cy));
        let after = transform(state);
        assert_relative_eq!(after.time_to_screen(t_under), cx, epsilon = 1e-3);
        assert_relative_eq!(after.volts_to_screen(v_under), cy, epsilon = 1e-3);
    }

    #[test]
    fn zoom_out_snaps_to_reset() {
        let mut state = ViewState {
            scale: 2.0,
            offset_x: -300.0,
            offset_y: -20.0,
        };
        let mut steps = 0;
        while !state.is_reset() {
            assert!(state.zoom(1.0, 400.0, 200.0));
            steps += 1;
            assert!(steps < 20);
        }
        assert_eq!(state.scale, 1.0);
        assert_eq!(state.offset_x, 0.0);
        assert_eq!(state.offset_y, 0.0);
        assert!(!state.zoom(1.0, 400.0, 200.0));
    }

    #[test]
    fn zoom_in_stops_at_limit() {
        let mut state = ViewState::default();
        while state.zoom(-1.0, 10.0, 10.0) {}
        assert!(state.scale <= MAX_SCALE);
        assert!(state.scale * ZOOM_STEP > MAX_SCALE);
        let frozen = state;
        assert!(!state.zoom(-1.0, 500.0, 500.0));
        assert_eq!(state, frozen);
    }

    #[test]
    fn pan_only_moves_zoomed_view() {
        let mut state = ViewState::default();
        assert!(!state.pan(10.0, 10.0));
        assert_eq!(state, ViewState::default());
        state.zoom(-1.0, 0.0, 0.0);
        assert!(state.pan(10.0, -5.0));
        assert_relative_eq!(state.offset_x, 10.0);
        assert_relative_eq!(state.offset_y, -5.0);
    }

    #[test]
    fn zero_delta_is_ignored() {
        let mut state = ViewState::default();
        assert!(!state.zoom(0.0, 1.0, 1.0));
    }
}
