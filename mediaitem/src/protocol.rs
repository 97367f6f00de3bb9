//! UPnP `protocolInfo` strings.
//!
//! A protocolInfo has four colon-separated fields:
//! `protocol:network:contentFormat:additionalInfo`, for example
//! `http-get:*:audio/flac:DLNA.ORG_PN=FLAC;DLNA.ORG_OP=01`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MediaItemError;

/// Known audio format subtypes, matched regardless of the MIME type prefix.
const AUDIO_FORMATS: &[&str] = &[
    "flac", "ogg", "opus", "vorbis", "mp3", "mpeg", "mp4", "m4a", "aac", "wav", "wave", "pcm",
    "wma", "webm", "ape", "alac", "aiff", "dsd", "dsf", "dff", "l16",
];

/// Parsed protocolInfo.
///
/// Strings that do not have four fields are kept as received (see
/// [`ProtocolInfo::opaque`]) and print back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ProtocolInfo {
    protocol: String,
    network: String,
    content_format: String,
    additional_info: String,
    raw: Option<String>,
}

impl ProtocolInfo {
    pub fn new(
        protocol: impl Into<String>,
        network: impl Into<String>,
        content_format: impl Into<String>,
        additional_info: impl Into<String>,
    ) -> Self {
        Self {
            protocol: protocol.into(),
            network: network.into(),
            content_format: content_format.into(),
            additional_info: additional_info.into(),
            raw: None,
        }
    }

    /// Keeps a malformed protocolInfo verbatim. The fields that are present
    /// are still read, so `http-get:*:audio/mpeg` keeps its MIME type.
    pub fn opaque(raw: &str) -> Self {
        let raw = raw.trim();
        let mut fields = raw.splitn(4, ':');
        let mut next = || fields.next().unwrap_or_default().to_string();
        Self {
            protocol: next(),
            network: next(),
            content_format: next(),
            additional_info: next(),
            raw: Some(raw.to_string()),
        }
    }

    /// True when the string did not parse and is kept verbatim.
    pub fn is_opaque(&self) -> bool {
        self.raw.is_some()
    }

    /// `http-get:*:<mime>:*`, the most common form.
    pub fn http_get(mime_type: impl Into<String>) -> Self {
        Self::new("http-get", "*", mime_type, "*")
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn content_format(&self) -> &str {
        &self.content_format
    }

    pub fn additional_info(&self) -> &str {
        &self.additional_info
    }

    /// MIME type of the content, when the third field is a MIME type.
    pub fn mime_type(&self) -> Option<&str> {
        if self.content_format.contains('/') {
            Some(self.content_format.as_str())
        } else {
            None
        }
    }

    /// Value of the `DLNA.ORG_PN` parameter in the fourth field.
    pub fn dlna_profile(&self) -> Option<&str> {
        self.additional_info
            .split(';')
            .find_map(|param| param.trim().strip_prefix("DLNA.ORG_PN="))
            .filter(|profile| !profile.is_empty())
    }

    /// Returns true if this protocolInfo describes audio content.
    pub fn is_audio(&self) -> bool {
        let mime = self.content_format.to_ascii_lowercase();

        if mime.starts_with("audio/") {
            return true;
        }

        if mime.starts_with("video/") || mime.starts_with("image/") {
            return false;
        }

        // Some servers advertise audio as application/flac, application/ogg...
        match mime.split('/').nth(1) {
            Some(subtype) => {
                let subtype = subtype.split(';').next().unwrap_or(subtype);
                AUDIO_FORMATS.iter().any(|format| subtype.contains(format))
            }
            None => false,
        }
    }

    pub fn is_video(&self) -> bool {
        self.content_format
            .to_ascii_lowercase()
            .starts_with("video/")
    }

    pub fn is_image(&self) -> bool {
        self.content_format
            .to_ascii_lowercase()
            .starts_with("image/")
    }
}

impl FromStr for ProtocolInfo {
    type Err = MediaItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let fields: Vec<&str> = trimmed.splitn(4, ':').collect();
        if fields.len() != 4 || fields[0].is_empty() {
            return Err(MediaItemError::InvalidProtocolInfo(s.to_string()));
        }
        Ok(Self::new(fields[0], fields[1], fields[2], fields[3]))
    }
}

impl From<String> for ProtocolInfo {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| Self::opaque(&value))
    }
}

impl From<ProtocolInfo> for String {
    fn from(value: ProtocolInfo) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ProtocolInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(raw) = &self.raw {
            return f.write_str(raw);
        }
        write!(
            f,
            "{}:{}:{}:{}",
            self.protocol, self.network, self.content_format, self.additional_info
        )
    }
}
