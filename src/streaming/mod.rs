//! Real audio output
//!
//! Plays decoded PCM through the system's default output device.

pub mod audio_device;

pub use audio_device::AudioDevice;
