pub mod channels;
pub mod perf;

pub use channels::{EventSink, SessionChannels, Waker};
pub use perf::FrameTimer;
