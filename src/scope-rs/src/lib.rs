pub mod buffer;
pub mod config;
pub mod decimator;
pub mod measure;
pub mod pipeline;
pub mod ticks;
pub mod trigger;
pub mod view;
pub use buffer::SampleRing;
pub use config::{max_voltage_for, ScopeConfig, BUFFER_CAPACITY, DISPLAY_WIDTH, SAMPLE_MAX};
pub use decimator::{DecimationState, Decimator};
pub use measure::{Measurement, ReferencePoint};
pub use pipeline::{ScopeFrame, ScopePipeline, ViewCommand};
pub use ticks::{nice_number, nice_ticks};
pub use trigger::{find_trigger_index, TriggerEdge, TriggerSearch};
pub use view::{ViewState, ViewTransform, Viewport};
