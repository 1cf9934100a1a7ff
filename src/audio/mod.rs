pub mod capture;
pub mod wav;

#[cfg(feature = "microphone")]
pub mod device;

pub use capture::{
    browser_clip, default_sample_source, CaptureMode, MicrophoneCapture, MicrophoneConfig,
    SampleSource,
};
pub use wav::WavClip;
