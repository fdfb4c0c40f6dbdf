// src/engine.rs
use crate::drivers::{DeviceLink, SampleSource};
use crate::types::*;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Fixed delay between connection attempts; it never grows.
pub const RECONNECT_INTERVAL: Duration = Duration::from_secs(2);
const IDLE_POLL: Duration = Duration::from_millis(5);
const MAX_COMMANDS_PER_TICK: usize = 10;

/// Transport side of the scope. Owns the sample source and the control link and
/// forwards raw frames to the GUI thread, which owns all pipeline state.
pub struct Engine {
    source: Box<dyn SampleSource>,
    link: Box<dyn DeviceLink>,
    tx: Sender<EngineMessage>,
    connected: bool,
    next_attempt: Instant,
}

impl Engine {
    pub fn new(
        source: Box<dyn SampleSource>,
        link: Box<dyn DeviceLink>,
        tx: Sender<EngineMessage>,
    ) -> Self {
        Self {
            source,
            link,
            tx,
            connected: false,
            next_attempt: Instant::now(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    fn send(&self, msg: EngineMessage) -> bool {
        self.tx.send(msg).is_ok()
    }

    /// Returns false once the engine should stop.
    pub fn handle_command(&mut self, cmd: GuiCommand) -> bool {
        match cmd {
            GuiCommand::ApplyConfig(stored) => {
                let request = stored.device_request();
                match self.link.send_config(&request) {
                    Ok(()) => {
                        log::info!("device accepted {request:?}");
                        self.source.apply(&request);
                        self.send(EngineMessage::ConfigApplied(stored))
                    }
                    Err(err) => {
                        log::warn!("device rejected {request:?}: {err}");
                        self.send(EngineMessage::ConfigRejected(err.to_string()))
                    }
                }
            }
            GuiCommand::Shutdown => false,
        }
    }

    /// One connect-or-read step. Returns false once the GUI side has gone away.
    pub fn pump(&mut self, now: Instant) -> bool {
        if !self.connected {
            if now < self.next_attempt {
                return true;
            }
            match self.source.connect() {
                Ok(()) => {
                    self.connected = true;
                    log::info!("sample source connected");
                    return self.send(EngineMessage::Status(true))
                        && self.send(EngineMessage::Log("Connected".to_owned()));
                }
                Err(err) => {
                    self.next_attempt = now + RECONNECT_INTERVAL;
                    log::warn!("connect failed, retrying in {RECONNECT_INTERVAL:?}: {err}");
                    return self.send(EngineMessage::Log(format!("Connect failed: {err}")));
                }
            }
        }
        match self.source.next_frame() {
            Ok(Some(frame)) => self.send(EngineMessage::Frame(frame)),
            Ok(None) => true,
            Err(err) => {
                log::warn!("sample source lost: {err}");
                self.source.disconnect();
                self.connected = false;
                self.next_attempt = now + RECONNECT_INTERVAL;
                self.send(EngineMessage::Status(false))
                    && self.send(EngineMessage::Log(format!("Disconnected: {err}")))
            }
        }
    }
}

pub fn spawn_thread(mut engine: Engine, rx_cmd: Receiver<GuiCommand>) -> JoinHandle<()> {
    thread::spawn(move || {
        engine.send(EngineMessage::Log("Scope engine ready.".to_owned()));
        loop {
            for _ in 0..MAX_COMMANDS_PER_TICK {
                match rx_cmd.try_recv() {
                    Ok(cmd) => {
                        if !engine.handle_command(cmd) {
                            return;
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => return,
                }
            }
            if !engine.pump(Instant::now()) {
                return;
            }
            thread::sleep(IDLE_POLL);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::{encode_frame, ManualSource, ScopeError, SimulatedDevice, StoredConfig};
    use std::sync::mpsc::channel;

    struct FlakySource {
        connect_attempts: usize,
        fail_connects: usize,
        frames: Vec<Result<Vec<u8>, ()>>,
    }

    impl SampleSource for FlakySource {
        fn next_frame(&mut self) -> Result<Option<Vec<u8>>, ScopeError> {
            if self.frames.is_empty() {
                return Ok(None);
            }
            match self.frames.remove(0) {
                Ok(frame) => Ok(Some(frame)),
                Err(()) => Err(std::io::Error::from(std::io::ErrorKind::ConnectionReset).into()),
            }
        }
        fn connect(&mut self) -> Result<(), ScopeError> {
            self.connect_attempts += 1;
            if self.connect_attempts <= self.fail_connects {
                Err(std::io::Error::from(std::io::ErrorKind::ConnectionRefused).into())
            } else {
                Ok(())
            }
        }
    }

    fn drain(rx: &Receiver<EngineMessage>) -> Vec<EngineMessage> {
        rx.try_iter().collect()
    }

    #[test]
    fn forwards_frames_in_order() {
        let (tx, rx) = channel();
        let frames = vec![encode_frame(&[1, 2]), encode_frame(&[3])];
        let mut engine = Engine::new(
            Box::new(ManualSource::new(frames.clone())),
            Box::new(SimulatedDevice::default()),
            tx,
        );
        let now = Instant::now();
        for _ in 0..4 {
            assert!(engine.pump(now));
        }
        let received: Vec<Vec<u8>> = drain(&rx)
            .into_iter()
            .filter_map(|m| match m {
                EngineMessage::Frame(f) => Some(f),
                _ => None,
            })
            .collect();
        assert_eq!(received, frames);
    }

    #[test]
    fn reconnects_on_fixed_interval() {
        let (tx, rx) = channel();
        let source = FlakySource {
            connect_attempts: 0,
            fail_connects: 1,
            frames: vec![Err(())],
        };
        let mut engine = Engine::new(Box::new(source), Box::new(SimulatedDevice::default()), tx);
        let t0 = Instant::now();
        engine.pump(t0);
        assert!(!engine.is_connected());
        engine.pump(t0 + Duration::from_millis(1500));
        assert!(!engine.is_connected());
        engine.pump(t0 + RECONNECT_INTERVAL);
        assert!(engine.is_connected());
        // The read error drops the link and schedules the next attempt 2 s later.
        let t1 = t0 + RECONNECT_INTERVAL + Duration::from_millis(10);
        engine.pump(t1);
        assert!(!engine.is_connected());
        engine.pump(t1 + Duration::from_millis(1999));
        assert!(!engine.is_connected());
        engine.pump(t1 + RECONNECT_INTERVAL);
        assert!(engine.is_connected());
        let statuses: Vec<bool> = drain(&rx)
            .into_iter()
            .filter_map(|m| match m {
                EngineMessage::Status(s) => Some(s),
                _ => None,
            })
            .collect();
        assert_eq!(statuses, vec![true, false, true]);
    }

    #[test]
    fn config_acknowledgement_and_rejection() {
        let (tx, rx) = channel();
        let mut engine = Engine::new(
            Box::new(ManualSource::new(Vec::new())),
            Box::new(SimulatedDevice::default()),
            tx,
        );
        let good = StoredConfig::default();
        assert!(engine.handle_command(GuiCommand::ApplyConfig(good)));
        let bad = StoredConfig {
            atten: 9,
            ..StoredConfig::default()
        };
        assert!(engine.handle_command(GuiCommand::ApplyConfig(bad)));
        let msgs = drain(&rx);
        assert!(matches!(msgs[0], EngineMessage::ConfigApplied(c) if c == good));
        assert!(matches!(msgs[1], EngineMessage::ConfigRejected(_)));
        assert!(!engine.handle_command(GuiCommand::Shutdown));
    }

    #[test]
    fn thread_stops_when_gui_hangs_up() {
        let (tx, rx) = channel();
        let (tx_cmd, rx_cmd) = channel();
        let engine = Engine::new(
            Box::new(ManualSource::new(Vec::new())),
            Box::new(SimulatedDevice::default()),
            tx,
        );
        let handle = spawn_thread(engine, rx_cmd);
        tx_cmd.send(GuiCommand::Shutdown).unwrap();
        handle.join().unwrap();
        drop(rx);
    }
}
