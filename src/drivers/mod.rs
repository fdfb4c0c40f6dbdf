// src/drivers/mod.rs
pub mod device;
pub mod error;
pub mod frame;
pub mod plot;
pub mod settings;
pub mod source;
pub mod store;
pub use device::{DeviceLink, DeviceRequest, SimulatedDevice, TcpDeviceLink};
pub use error::ScopeError;
pub use frame::{decode_frame, encode_frame, FrameAssembler};
pub use plot::{render_frame_png, PlotStyle};
pub use settings::AppSettings;
pub use source::{ManualSource, SampleSource, SimulatedSource, TcpSource};
pub use store::{ConfigStore, StoredConfig};
