use std::collections::VecDeque;
use std::io::{ErrorKind, Read};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};
use rand::{rngs::StdRng, Rng, SeedableRng};
use crate::drivers::{encode_frame, DeviceRequest, FrameAssembler, ScopeError};
/// Connects to the first resolved address that answers within `timeout`.
pub(crate) fn dial(addr: &str, timeout: Duration) -> std::io::Result<TcpStream> {
    let mut last_err = None;
    for addr in addr.to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err
        .unwrap_or_else(|| std::io::Error::new(ErrorKind::NotFound, "address did not resolve")))
}
/// Producer of raw inbound frames (little-endian 16-bit samples).
pub trait SampleSource: Send {
    /// `Ok(None)` means nothing is ready yet.
    fn next_frame(&mut self) -> Result<Option<Vec<u8>>, ScopeError>;
    fn connect(&mut self) -> Result<(), ScopeError> {
        Ok(())
    }
    fn disconnect(&mut self) {}
    /// Follows an acknowledged device configuration.
    fn apply(&mut self, _request: &DeviceRequest) {}
}
/// In-memory source useful for tests and deterministic playback.
pub struct ManualSource {
    queue: VecDeque<Vec<u8>>,
}
impl ManualSource {
    pub fn new(frames: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Self {
            queue: frames.into_iter().collect(),
        }
    }
}
impl SampleSource for ManualSource {
    fn next_frame(&mut self) -> Result<Option<Vec<u8>>, ScopeError> {
        Ok(self.queue.pop_front())
    }
}
const SIM_HIGH: f64 = 3200.0;
const SIM_LOW: f64 = 900.0;
const SIM_NOISE: f64 = 40.0;
/// Longest stretch produced in one call, so a stalled thread does not flood the UI.
const SIM_MAX_CHUNK: Duration = Duration::from_millis(100);
/// Square-wave test signal paced against the wall clock at the hardware rate.
pub struct SimulatedSource {
    sample_rate: u32,
    test_hz: u32,
    phase: f64,
    owed: f64,
    last_tick: Instant,
    rng: StdRng,
}
impl SimulatedSource {
    pub fn new(sample_rate: u32, test_hz: u32) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            test_hz,
            phase: 0.0,
            owed: 0.0,
            last_tick: Instant::now(),
            rng: StdRng::from_entropy(),
        }
    }
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
    pub fn generate(&mut self, count: usize) -> Vec<u16> {
        let step = self.test_hz as f64 / self.sample_rate as f64;
        (0..count)
            .map(|_| {
                let level = if self.phase < 0.5 { SIM_HIGH } else { SIM_LOW };
                self.phase = (self.phase + step).fract();
                let noise = self.rng.gen_range(-SIM_NOISE..=SIM_NOISE);
                (level + noise).round().clamp(0.0, 4095.0) as u16
            })
            .collect()
    }
}
impl SampleSource for SimulatedSource {
    fn next_frame(&mut self) -> Result<Option<Vec<u8>>, ScopeError> {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick).min(SIM_MAX_CHUNK);
        self.last_tick = now;
        self.owed += elapsed.as_secs_f64() * self.sample_rate as f64;
        let due = self.owed.floor();
        if due < 1.0 {
            return Ok(None);
        }
        self.owed -= due;
        Ok(Some(encode_frame(&self.generate(due as usize))))
    }
    fn apply(&mut self, request: &DeviceRequest) {
        self.sample_rate = request.sample_rate.max(1);
        self.test_hz = request.test_hz;
        self.owed = 0.0;
    }
}
const READ_TIMEOUT: Duration = Duration::from_millis(20);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const READ_CHUNK: usize = 8192;
/// Raw sample stream over TCP with no framing beyond the byte stream itself.
pub struct TcpSource {
    addr: String,
    stream: Option<TcpStream>,
    assembler: FrameAssembler,
    buf: Vec<u8>,
}
impl TcpSource {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            stream: None,
            assembler: FrameAssembler::new(),
            buf: vec![0; READ_CHUNK],
        }
    }
}
impl SampleSource for TcpSource {
    fn connect(&mut self) -> Result<(), ScopeError> {
        let stream = dial(&self.addr, CONNECT_TIMEOUT)?;
        stream.set_read_timeout(Some(READ_TIMEOUT))?;
        self.stream = Some(stream);
        self.assembler.reset();
        Ok(())
    }
    fn disconnect(&mut self) {
        self.stream = None;
        self.assembler.reset();
    }
    fn next_frame(&mut self) -> Result<Option<Vec<u8>>, ScopeError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(std::io::Error::from(ErrorKind::NotConnected).into());
        };
        match stream.read(&mut self.buf) {
            Ok(0) => Err(std::io::Error::from(ErrorKind::UnexpectedEof).into()),
            Ok(n) => Ok(self.assembler.push(&self.buf[..n])),
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}
