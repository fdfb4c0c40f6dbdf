/// Point pinned on a frozen trace, in data coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReferencePoint {
    pub t_ms: f32,
    pub volts: f32,
}

/// Cursor read-out relative to a reference point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    pub dt_ms: f32,
    pub dv: f32,
    /// `1 / |dt|`, absent when both points share a time.
    pub frequency_hz: Option<f32>,
}

impl Measurement {
    pub fn between(reference: ReferencePoint, t_ms: f32, volts: f32) -> Self {
        let dt_ms = t_ms - reference.t_ms;
        let frequency_hz = if dt_ms != 0.0 {
            Some(1000.0 / dt_ms.abs())
        } else {
            None
        };
        Self {
            dt_ms,
            dv: volts - reference.volts,
            frequency_hz,
        }
    }
}
