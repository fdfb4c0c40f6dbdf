use std::collections::VecDeque;
use super::{
    buffer::SampleRing,
    config::{ScopeConfig, DISPLAY_WIDTH, SAMPLE_MAX},
    decimator::Decimator,
    measure::{Measurement, ReferencePoint},
    ticks::nice_ticks,
    trigger::{find_trigger_index, threshold_for, TriggerSearch},
    view::{ViewState, ViewTransform, Viewport},
};

const TIME_TICKS: usize = 10;
const VOLT_TICKS: usize = 8;

/// User interaction queued between frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewCommand {
    /// Wheel notch at a screen position; negative `delta` zooms in.
    Zoom { delta: f32, x: f32, y: f32 },
    Pan { dx: f32, dy: f32 },
    ResetView,
    Resize { width: f32, height: f32 },
    Freeze(bool),
    /// Pins a reference point under the cursor. Ignored unless frozen.
    MarkReference { x: f32, y: f32 },
    SetTrigger { level: u16, invert: bool },
}

/// Everything a renderer needs for one draw.
#[derive(Clone, Debug)]
pub struct ScopeFrame {
    /// Raw codes of the drawn window, oldest first.
    pub samples: Vec<u16>,
    pub trigger: TriggerSearch,
    pub transform: ViewTransform,
    pub time_ticks: Vec<f64>,
    pub volt_ticks: Vec<f64>,
    pub trigger_volts: f32,
    pub reference: Option<ReferencePoint>,
    pub frozen: bool,
}

impl ScopeFrame {
    pub fn screen_points(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.samples
            .iter()
            .enumerate()
            .map(|(i, &raw)| self.transform.point_to_screen(i, raw))
    }
}

/// Owns all scope state. Batches go in through [`ScopePipeline::ingest`], view
/// interaction through [`ScopePipeline::enqueue`], and [`ScopePipeline::frame`]
/// applies queued interaction before producing the next draw.
pub struct ScopePipeline {
    config: ScopeConfig,
    decimator: Decimator,
    ring: SampleRing,
    view: ViewState,
    viewport: Viewport,
    frozen: bool,
    reference: Option<ReferencePoint>,
    pending: VecDeque<ViewCommand>,
}

impl ScopePipeline {
    pub fn new(config: ScopeConfig) -> Self {
        Self {
            config,
            decimator: Decimator::new(config.target_count()),
            ring: SampleRing::default(),
            view: ViewState::default(),
            viewport: Viewport::default(),
            frozen: false,
            reference: None,
            pending: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    pub fn decimator(&self) -> &Decimator {
        &self.decimator
    }

    pub fn ring(&self) -> &SampleRing {
        &self.ring
    }

    pub fn view_state(&self) -> ViewState {
        self.view
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn reference(&self) -> Option<ReferencePoint> {
        self.reference
    }

    /// Swaps in a new configuration and restarts decimation from an empty window.
    pub fn reconfigure(&mut self, config: ScopeConfig) {
        log::info!(
            "reconfigure: desired {} Hz, hardware {} Hz, ratio {:.3}",
            config.desired_rate,
            config.hardware_sample_rate,
            config.target_count()
        );
        self.config = config;
        self.decimator.retarget(config.target_count());
    }

    /// Decimates a raw batch into the ring. Returns the number of points appended.
    pub fn ingest(&mut self, batch: &[u16]) -> usize {
        if self.frozen {
            return 0;
        }
        let points = self.decimator.process(batch);
        self.ring.push(&points);
        log::trace!("ingest {} samples -> {} points", batch.len(), points.len());
        points.len()
    }

    pub fn enqueue(&mut self, command: ViewCommand) {
        self.pending.push_back(command);
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    fn apply(&mut self, command: ViewCommand) {
        match command {
            ViewCommand::Zoom { delta, x, y } => {
                self.view.zoom(delta, x, y);
            }
            ViewCommand::Pan { dx, dy } => {
                self.view.pan(dx, dy);
            }
            ViewCommand::ResetView => self.view.reset(),
            ViewCommand::Resize { width, height } => self.viewport = Viewport::new(width, height),
            ViewCommand::Freeze(frozen) => {
                if !frozen {
                    self.reference = None;
                    if self.frozen {
                        self.decimator.reset();
                    }
                }
                self.frozen = frozen;
            }
            ViewCommand::MarkReference { x, y } => {
                if self.frozen {
                    let transform = self.transform();
                    self.reference = Some(ReferencePoint {
                        t_ms: transform.screen_to_time(x),
                        volts: transform.screen_to_volts(y),
                    });
                }
            }
            ViewCommand::SetTrigger { level, invert } => {
                self.config = self.config.with_trigger(level, invert);
            }
        }
    }

    pub fn transform(&self) -> ViewTransform {
        ViewTransform {
            state: self.view,
            viewport: self.viewport,
            time_span_ms: self.config.visible_time_span_ms() as f32,
            window_points: DISPLAY_WIDTH,
            max_voltage: self.config.max_voltage(),
        }
    }

    /// Delta read-out between the reference point and a screen position.
    pub fn measure_at(&self, x: f32, y: f32) -> Option<Measurement> {
        let transform = self.transform();
        self.reference.map(|reference| {
            Measurement::between(
                reference,
                transform.screen_to_time(x),
                transform.screen_to_volts(y),
            )
        })
    }

    pub fn frame(&mut self) -> ScopeFrame {
        while let Some(command) = self.pending.pop_front() {
            self.apply(command);
        }
        let snapshot = self.ring.snapshot();
        let trigger = find_trigger_index(
            &snapshot,
            DISPLAY_WIDTH,
            self.config.trigger_level,
            self.config.trigger_invert,
        );
        let end = (trigger.index + DISPLAY_WIDTH).min(snapshot.len());
        let samples = snapshot[trigger.index.min(end)..end].to_vec();
        let transform = self.transform();
        let (t_lo, t_hi) = transform.visible_time_range();
        let (v_lo, v_hi) = transform.visible_volt_range();
        let threshold = threshold_for(self.config.trigger_level).clamp(0, SAMPLE_MAX as i32);
        ScopeFrame {
            samples,
            trigger,
            transform,
            time_ticks: nice_ticks(t_lo as f64, t_hi as f64, TIME_TICKS),
            volt_ticks: nice_ticks(v_lo as f64, v_hi as f64, VOLT_TICKS),
            trigger_volts: transform.raw_to_volts(threshold as u16),
            reference: self.reference,
            frozen: self.frozen,
        }
    }
}

impl Default for ScopePipeline {
    fn default() -> Self {
        ScopePipeline::new(ScopeConfig::default())
    }
}
