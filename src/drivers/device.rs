use std::io::{BufRead, BufReader, Write};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::drivers::source::dial;
use crate::drivers::ScopeError;
const MAX_SAMPLE_RATE: u32 = 2_000_000;
const CONTROL_TIMEOUT: Duration = Duration::from_secs(3);
/// Acquisition settings sent to the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRequest {
    pub sample_rate: u32,
    pub bit_width: u8,
    pub atten: u8,
    pub test_hz: u32,
}
impl DeviceRequest {
    pub fn validate(&self) -> Result<(), ScopeError> {
        if self.sample_rate == 0 || self.sample_rate > MAX_SAMPLE_RATE {
            return Err(ScopeError::InvalidConfig(format!(
                "sample_rate {} outside 1..={MAX_SAMPLE_RATE}",
                self.sample_rate
            )));
        }
        if self.atten > 3 {
            return Err(ScopeError::InvalidConfig(format!(
                "atten {} outside 0..=3",
                self.atten
            )));
        }
        if !(9..=12).contains(&self.bit_width) {
            return Err(ScopeError::InvalidConfig(format!(
                "bit_width {} outside 9..=12",
                self.bit_width
            )));
        }
        Ok(())
    }
}
/// Outbound half of the device connection.
pub trait DeviceLink: Send {
    fn send_config(&mut self, request: &DeviceRequest) -> Result<(), ScopeError>;
}
/// Accepts anything the hardware would accept. Pairs with `SimulatedSource`.
#[derive(Debug, Default)]
pub struct SimulatedDevice {
    pub last_applied: Option<DeviceRequest>,
}
impl DeviceLink for SimulatedDevice {
    fn send_config(&mut self, request: &DeviceRequest) -> Result<(), ScopeError> {
        request.validate()?;
        self.last_applied = Some(*request);
        Ok(())
    }
}
#[derive(Debug, Deserialize)]
struct DeviceReply {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}
/// Sends one JSON line per request on a fresh control connection and waits for
/// a single-line `{"ok": bool, "error": "..."}` reply.
pub struct TcpDeviceLink {
    addr: String,
}
impl TcpDeviceLink {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}
impl DeviceLink for TcpDeviceLink {
    fn send_config(&mut self, request: &DeviceRequest) -> Result<(), ScopeError> {
        request.validate()?;
        let mut stream = dial(&self.addr, CONTROL_TIMEOUT)?;
        stream.set_read_timeout(Some(CONTROL_TIMEOUT))?;
        stream.set_write_timeout(Some(CONTROL_TIMEOUT))?;
        let mut line = serde_json::to_string(request)?;
        line.push('\n');
        stream.write_all(line.as_bytes())?;
        let mut reply = String::new();
        BufReader::new(stream).read_line(&mut reply)?;
        let reply: DeviceReply = serde_json::from_str(reply.trim())?;
        if reply.ok {
            Ok(())
        } else {
            Err(ScopeError::ConfigRejected(
                reply.error.unwrap_or_else(|| "no reason given".into()),
            ))
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;
    fn request() -> DeviceRequest {
        DeviceRequest {
            sample_rate: 1000,
            bit_width: 12,
            atten: 3,
            test_hz: 50,
        }
    }
    #[test]
    fn wire_format_uses_device_keys() {
        let json = serde_json::to_value(request()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"sample_rate": 1000, "bit_width": 12, "atten": 3, "test_hz": 50})
        );
    }
    #[test]
    fn simulated_device_validates() {
        let mut dev = SimulatedDevice::default();
        assert!(dev.send_config(&request()).is_ok());
        assert_eq!(dev.last_applied, Some(request()));
        let bad = DeviceRequest { atten: 7, ..request() };
        assert!(matches!(dev.send_config(&bad), Err(ScopeError::InvalidConfig(_))));
        assert_eq!(dev.last_applied, Some(request()));
    }
    fn serve_once(reply: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let mut stream = stream;
            stream.write_all(reply.as_bytes()).unwrap();
            line
        });
        (addr, handle)
    }
    #[test]
    fn tcp_link_round_trip() {
        let (addr, server) = serve_once("{\"ok\":true}\n");
        let mut link = TcpDeviceLink::new(addr);
        link.send_config(&request()).unwrap();
        let sent: DeviceRequest = serde_json::from_str(server.join().unwrap().trim()).unwrap();
        assert_eq!(sent, request());
    }
    #[test]
    fn tcp_link_surfaces_rejection() {
        let (addr, server) = serve_once("{\"ok\":false,\"error\":\"busy\"}\n");
        let mut link = TcpDeviceLink::new(addr);
        let err = link.send_config(&request()).unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, ScopeError::ConfigRejected(ref msg) if msg == "busy"));
    }
    #[test]
    fn tcp_link_reports_unreachable_host() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);
        let started = std::time::Instant::now();
        let err = TcpDeviceLink::new(addr).send_config(&request()).unwrap_err();
        assert!(matches!(err, ScopeError::Io(_)));
        assert!(started.elapsed() <= CONTROL_TIMEOUT + Duration::from_secs(1));
        let err = TcpDeviceLink::new("no-port").send_config(&request()).unwrap_err();
        assert!(matches!(err, ScopeError::Io(_)));
    }
}
