// src/gui.rs
use anyhow::Context as _;
use eframe::egui;
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Vec2};
use std::fs;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Duration;
use crate::drivers::*;
use crate::engine::{self, Engine};
use crate::scope::{max_voltage_for, ScopeConfig, ScopeFrame, ScopePipeline, ViewCommand};
use crate::types::*;

const FRAME_INTERVAL: Duration = Duration::from_millis(16);
// While frozen the timer only drains the engine channel; nothing is redrawn.
const FROZEN_DRAIN_INTERVAL: Duration = Duration::from_millis(250);
const SNAPSHOT_PATH: &str = "scope_snapshot.png";
const MAX_LOG_LINES: usize = 8;

const BACKGROUND: Color32 = Color32::from_rgb(12, 12, 14);
const GRID: Color32 = Color32::from_rgb(45, 45, 50);
const LABEL: Color32 = Color32::from_rgb(150, 150, 155);
const TRACE: Color32 = Color32::from_rgb(80, 230, 120);
const TRIGGER: Color32 = Color32::from_rgb(230, 160, 40);
const CROSSHAIR: Color32 = Color32::from_rgb(110, 110, 200);
const REFERENCE: Color32 = Color32::from_rgb(230, 60, 60);

pub struct ScopeApp {
    pipeline: ScopePipeline,
    // Values in the form; only adopted by the pipeline once the device acknowledges them.
    form: StoredConfig,
    store: ConfigStore,
    is_connected: bool,
    error_popup: Option<String>,
    log_messages: Vec<String>,
    canvas_size: Vec2,
    last_frame: Option<ScopeFrame>,
    rx: Receiver<EngineMessage>,
    tx_cmd: Sender<GuiCommand>,
}

impl ScopeApp {
    pub fn new(settings: AppSettings) -> Self {
        let store = ConfigStore::new(settings.config_path.clone());
        let stored = store.load();
        let initial = stored.unwrap_or_default();

        let (source, link): (Box<dyn SampleSource>, Box<dyn DeviceLink>) = match &settings.mode {
            ConnectionMode::Simulation => {
                let request = StoredConfig::default().device_request();
                (
                    Box::new(SimulatedSource::new(request.sample_rate, request.test_hz)),
                    Box::new(SimulatedDevice::default()),
                )
            }
            ConnectionMode::Network {
                data_addr,
                control_addr,
            } => (
                Box::new(TcpSource::new(data_addr.clone())),
                Box::new(TcpDeviceLink::new(control_addr.clone())),
            ),
        };
        let (tx, rx) = channel();
        let (tx_cmd, rx_cmd) = channel();
        engine::spawn_thread(Engine::new(source, link, tx), rx_cmd);

        // Local-only settings apply right away; acquisition settings wait for the device.
        let config = ScopeConfig::default().with_trigger(initial.trigger, initial.invert);
        if let Some(stored) = stored {
            log::info!("reapplying stored config from {}", store.path().display());
            tx_cmd.send(GuiCommand::ApplyConfig(stored)).ok();
        }

        Self {
            pipeline: ScopePipeline::new(config),
            form: initial,
            store,
            is_connected: false,
            error_popup: None,
            log_messages: vec!["ADC Scope ready.".to_owned()],
            canvas_size: Vec2::ZERO,
            last_frame: None,
            rx,
            tx_cmd,
        }
    }

    fn log(&mut self, msg: &str) {
        self.log_messages.push(format!("> {}", msg));
        if self.log_messages.len() > MAX_LOG_LINES {
            self.log_messages.remove(0);
        }
    }

    fn drain_engine(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                EngineMessage::Frame(bytes) => match decode_frame(&bytes) {
                    Ok(samples) => {
                        self.pipeline.ingest(&samples);
                    }
                    Err(err) => log::warn!("dropping frame: {err}"),
                },
                EngineMessage::Status(connected) => self.is_connected = connected,
                EngineMessage::Log(text) => self.log(&text),
                EngineMessage::ConfigApplied(stored) => {
                    self.pipeline.reconfigure(stored.scope_config());
                    self.form = stored;
                    if let Err(err) = self.store.save(&stored) {
                        log::warn!("could not persist config: {err}");
                    }
                    self.log(&format!(
                        "Config applied: {} Hz (hw {} Hz)",
                        stored.desired_rate,
                        stored.device_request().sample_rate
                    ));
                }
                EngineMessage::ConfigRejected(reason) => {
                    self.form = StoredConfig::from_scope(self.pipeline.config());
                    self.log(&format!("Config rejected: {reason}"));
                    self.error_popup = Some(reason);
                }
            }
        }
    }

    fn persist_local(&mut self) {
        let stored = StoredConfig::from_scope(self.pipeline.config());
        self.form.trigger = stored.trigger;
        self.form.invert = stored.invert;
        if let Err(err) = self.store.save(&stored) {
            log::warn!("could not persist trigger: {err}");
        }
    }

    fn save_snapshot(&mut self) {
        let result = self
            .last_frame
            .as_ref()
            .context("nothing has been drawn yet")
            .and_then(|frame| {
                let png = render_frame_png(frame, PlotStyle::default())?;
                fs::write(SNAPSHOT_PATH, png).with_context(|| format!("writing {SNAPSHOT_PATH}"))
            });
        match result {
            Ok(()) => self.log(&format!("Snapshot saved to {SNAPSHOT_PATH}")),
            Err(err) => {
                log::warn!("snapshot failed: {err:#}");
                self.log(&format!("Snapshot failed: {err:#}"));
            }
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Rate (Hz)");
            ui.add(egui::DragValue::new(&mut self.form.desired_rate).clamp_range(1..=2_000_000));
            egui::ComboBox::from_label("Atten")
                .selected_text(format!("{:.2} V", max_voltage_for(self.form.atten as usize)))
                .show_ui(ui, |ui| {
                    for atten in 0..4u8 {
                        let label = format!("{:.2} V", max_voltage_for(atten as usize));
                        ui.selectable_value(&mut self.form.atten, atten, label);
                    }
                });
            ui.label("Bits");
            ui.add(egui::DragValue::new(&mut self.form.bit_width).clamp_range(9..=12));
            ui.label("Test Hz");
            ui.add(egui::DragValue::new(&mut self.form.test_hz).clamp_range(0..=100_000));
            if ui.button("Apply").clicked() {
                self.tx_cmd.send(GuiCommand::ApplyConfig(self.form)).ok();
            }
            ui.separator();

            let mut level = self.pipeline.config().trigger_level;
            let mut invert = self.pipeline.config().trigger_invert;
            let level_changed = ui
                .add(egui::Slider::new(&mut level, 0..=4095).text("Trigger"))
                .changed();
            let invert_changed = ui.checkbox(&mut invert, "Invert").changed();
            if level_changed || invert_changed {
                self.pipeline.enqueue(ViewCommand::SetTrigger { level, invert });
                self.form.trigger = level;
                self.form.invert = invert;
            }
            ui.separator();

            let frozen = self.pipeline.is_frozen();
            if ui.button(if frozen { "Run" } else { "Freeze" }).clicked() {
                self.pipeline.enqueue(ViewCommand::Freeze(!frozen));
            }
            if ui.button("Reset view").clicked() {
                self.pipeline.enqueue(ViewCommand::ResetView);
            }
            if ui.button("Snapshot").clicked() {
                self.save_snapshot();
            }
            ui.separator();
            if self.is_connected {
                ui.colored_label(Color32::GREEN, "● connected");
            } else {
                ui.colored_label(Color32::RED, "● offline");
            }
        });
    }

    fn scope_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let rect = response.rect;
        if rect.size() != self.canvas_size {
            self.canvas_size = rect.size();
            self.pipeline.enqueue(ViewCommand::Resize {
                width: rect.width(),
                height: rect.height(),
            });
        }

        let hover = response.hover_pos().map(|p| p - rect.min);
        if let Some(local) = hover {
            let scroll = ui.input(|i| i.scroll_delta.y);
            if scroll != 0.0 {
                // Scrolling up zooms in.
                self.pipeline.enqueue(ViewCommand::Zoom {
                    delta: -scroll.signum(),
                    x: local.x,
                    y: local.y,
                });
            }
        }
        if response.dragged() {
            let d = response.drag_delta();
            if d != Vec2::ZERO {
                self.pipeline.enqueue(ViewCommand::Pan { dx: d.x, dy: d.y });
            }
        }
        if response.double_clicked() {
            self.pipeline.enqueue(ViewCommand::ResetView);
        } else if response.clicked() && self.pipeline.is_frozen() {
            if let Some(pos) = response.interact_pointer_pos() {
                let local = pos - rect.min;
                self.pipeline.enqueue(ViewCommand::MarkReference { x: local.x, y: local.y });
            }
        }

        let redraw = !self.pipeline.is_frozen() || self.pipeline.has_pending();
        if redraw || self.last_frame.is_none() {
            self.last_frame = Some(self.pipeline.frame());
        }
        let Some(frame) = self.last_frame.as_ref() else {
            return;
        };
        draw_frame(&painter, rect, frame);
        if let Some(local) = hover {
            draw_crosshair(&painter, rect, frame, local);
            if let Some(m) = self.pipeline.measure_at(local.x, local.y) {
                let mut text = format!(
                    "Δt {}  ΔV {}",
                    format_time(m.dt_ms as f64),
                    format_volts(m.dv as f64)
                );
                if let Some(hz) = m.frequency_hz {
                    text.push_str(&format!("  f {hz:.2} Hz"));
                }
                painter.text(
                    rect.right_top() + Vec2::new(-8.0, 8.0),
                    Align2::RIGHT_TOP,
                    text,
                    FontId::monospace(12.0),
                    REFERENCE,
                );
            }
        }
    }
}

fn draw_frame(painter: &egui::Painter, rect: Rect, frame: &ScopeFrame) {
    let t = &frame.transform;
    let at = |x: f32, y: f32| Pos2::new(rect.left() + x, rect.top() + y);
    painter.rect_filled(rect, 0.0, BACKGROUND);

    for &tick in &frame.time_ticks {
        let x = t.time_to_screen(tick as f32);
        if !(0.0..=rect.width()).contains(&x) {
            continue;
        }
        painter.line_segment([at(x, 0.0), at(x, rect.height())], Stroke::new(1.0, GRID));
        painter.text(
            at(x + 3.0, rect.height() - 3.0),
            Align2::LEFT_BOTTOM,
            format_time(tick),
            FontId::monospace(11.0),
            LABEL,
        );
    }
    for &tick in &frame.volt_ticks {
        let y = t.volts_to_screen(tick as f32);
        if !(0.0..=rect.height()).contains(&y) {
            continue;
        }
        painter.line_segment([at(0.0, y), at(rect.width(), y)], Stroke::new(1.0, GRID));
        painter.text(
            at(3.0, y - 2.0),
            Align2::LEFT_BOTTOM,
            format_volts(tick),
            FontId::monospace(11.0),
            LABEL,
        );
    }

    let ty = t.volts_to_screen(frame.trigger_volts);
    painter.line_segment([at(0.0, ty), at(rect.width(), ty)], Stroke::new(1.0, TRIGGER));
    if frame.trigger.found {
        let tx = t.time_to_screen(0.0);
        painter.circle_filled(at(tx, ty), 3.5, TRIGGER);
    }

    let points: Vec<Pos2> = frame.screen_points().map(|(x, y)| at(x, y)).collect();
    if points.len() > 1 {
        painter.add(Shape::line(points, Stroke::new(1.2, TRACE)));
    }

    if let Some(reference) = frame.reference {
        let p = at(t.time_to_screen(reference.t_ms), t.volts_to_screen(reference.volts));
        painter.circle_stroke(p, 5.0, Stroke::new(1.5, REFERENCE));
    }
    if frame.frozen {
        painter.text(
            rect.left_top() + Vec2::new(8.0, 8.0),
            Align2::LEFT_TOP,
            "FROZEN",
            FontId::proportional(13.0),
            REFERENCE,
        );
    }
}

fn draw_crosshair(painter: &egui::Painter, rect: Rect, frame: &ScopeFrame, local: Vec2) {
    let t = &frame.transform;
    let p = rect.min + local;
    let stroke = Stroke::new(1.0, CROSSHAIR);
    painter.line_segment([Pos2::new(p.x, rect.top()), Pos2::new(p.x, rect.bottom())], stroke);
    painter.line_segment([Pos2::new(rect.left(), p.y), Pos2::new(rect.right(), p.y)], stroke);
    painter.text(
        p + Vec2::new(6.0, -6.0),
        Align2::LEFT_BOTTOM,
        format!(
            "{}  {}",
            format_time(t.screen_to_time(local.x) as f64),
            format_volts(t.screen_to_volts(local.y) as f64)
        ),
        FontId::monospace(11.0),
        CROSSHAIR,
    );
}

fn format_time(ms: f64) -> String {
    if ms.abs() >= 1000.0 {
        format!("{:.3} s", ms / 1000.0)
    } else if ms.abs() >= 10.0 || ms == 0.0 {
        format!("{:.1} ms", ms)
    } else {
        format!("{:.3} ms", ms)
    }
}

fn format_volts(v: f64) -> String {
    if v != 0.0 && v.abs() < 1.0 {
        format!("{:.0} mV", v * 1000.0)
    } else {
        format!("{:.2} V", v)
    }
}

impl eframe::App for ScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_engine();
        let trigger_before = (
            self.pipeline.config().trigger_level,
            self.pipeline.config().trigger_invert,
        );

        let blocked = self.error_popup.is_some();
        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.add_enabled_ui(!blocked, |ui| self.controls(ui));
        });
        egui::TopBottomPanel::bottom("log").show(ctx, |ui| {
            for line in &self.log_messages {
                ui.monospace(line.as_str());
            }
        });
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| self.scope_canvas(ui));

        if let Some(reason) = self.error_popup.clone() {
            egui::Window::new("Configuration rejected")
                .collapsible(false)
                .resizable(false)
                .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label(reason);
                    ui.label("The previous configuration is still active.");
                    if ui.button("OK").clicked() {
                        self.error_popup = None;
                    }
                });
        }

        let trigger_after = (
            self.pipeline.config().trigger_level,
            self.pipeline.config().trigger_invert,
        );
        if trigger_after != trigger_before {
            self.persist_local();
        }
        if self.pipeline.is_frozen() {
            ctx.request_repaint_after(FROZEN_DRAIN_INTERVAL);
        } else {
            ctx.request_repaint_after(FRAME_INTERVAL);
        }
    }
}
