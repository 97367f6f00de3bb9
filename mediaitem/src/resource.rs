use serde::{Deserialize, Serialize};

use crate::duration::parse_duration;
use crate::protocol::ProtocolInfo;

/// One playable rendition of a media item (a DIDL-Lite `<res>` element).
///
/// The same item can be offered at several bitrates, in several formats or
/// through several transports; each of those is a separate resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItemResource {
    uri: String,
    protocol_info: ProtocolInfo,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    bitrate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    sample_frequency: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    nr_audio_channels: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    bits_per_sample: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    resolution: Option<String>,
}

impl MediaItemResource {
    pub fn new(uri: impl Into<String>, protocol_info: ProtocolInfo) -> Self {
        Self {
            uri: uri.into(),
            protocol_info,
            size: None,
            duration: None,
            bitrate: None,
            sample_frequency: None,
            nr_audio_channels: None,
            bits_per_sample: None,
            resolution: None,
        }
    }

    /// Size in bytes.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    /// Bitrate in bytes per second, as DIDL-Lite defines it.
    pub fn with_bitrate(mut self, bitrate: u32) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    pub fn with_sample_frequency(mut self, hz: u32) -> Self {
        self.sample_frequency = Some(hz);
        self
    }

    pub fn with_nr_audio_channels(mut self, channels: u32) -> Self {
        self.nr_audio_channels = Some(channels);
        self
    }

    pub fn with_bits_per_sample(mut self, bits: u32) -> Self {
        self.bits_per_sample = Some(bits);
        self
    }

    /// Video or image resolution, `WIDTHxHEIGHT`.
    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = Some(resolution.into());
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn protocol_info(&self) -> &ProtocolInfo {
        &self.protocol_info
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn duration(&self) -> Option<&str> {
        self.duration.as_deref()
    }

    /// Duration in whole seconds, when the duration string parses.
    pub fn duration_in_seconds(&self) -> Option<u32> {
        self.duration
            .as_deref()
            .and_then(|d| parse_duration(d).ok())
    }

    pub fn bitrate(&self) -> Option<u32> {
        self.bitrate
    }

    pub fn sample_frequency(&self) -> Option<u32> {
        self.sample_frequency
    }

    pub fn nr_audio_channels(&self) -> Option<u32> {
        self.nr_audio_channels
    }

    pub fn bits_per_sample(&self) -> Option<u32> {
        self.bits_per_sample
    }

    pub fn resolution(&self) -> Option<&str> {
        self.resolution.as_deref()
    }

    pub fn is_audio(&self) -> bool {
        self.protocol_info.is_audio()
    }
}
