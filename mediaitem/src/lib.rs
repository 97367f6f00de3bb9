//! # mediaitem - UPnP/DLNA media item model
//!
//! Typed representation of the playable items a ContentDirectory service
//! returns, plus the DIDL-Lite codec used to read them from Browse/Search
//! results and write them back.
//!
//! ```
//! use mediaitem::{MediaItem, MediaItemResource, MediaObject, ProtocolInfo};
//!
//! let mut item = MediaItem::builder(MediaObject::new(
//!     "64$1",
//!     "64",
//!     "So What",
//!     "object.item.audioItem.musicTrack",
//! ))
//! .album("Kind of Blue")
//! .insert_uri("http-get:*:audio/flac:*", "http://10.0.0.2/so_what.flac")
//! .build();
//!
//! item.add_res(MediaItemResource::new(
//!     "http://10.0.0.2/so_what.flac",
//!     ProtocolInfo::http_get("audio/flac"),
//! ));
//!
//! assert_eq!(item.uri(), Some("http://10.0.0.2/so_what.flac"));
//! assert_eq!(item.resources().len(), 1);
//! ```

pub mod didl;
pub mod duration;
pub mod error;
pub mod item;
pub mod object;
pub mod protocol;
pub mod resource;
pub mod uri_collection;

pub use didl::{parse_items, to_xml};
pub use duration::{format_duration, parse_duration};
pub use error::{MediaItemError, Result};
pub use item::{MediaItem, MediaItemBuilder};
pub use object::MediaObject;
pub use protocol::ProtocolInfo;
pub use resource::MediaItemResource;
pub use uri_collection::{UriCollection, UriEntry};

// ============= Generic parsing layer =============

/// Parser for a media metadata document format
pub trait MediaMetadataParser: Sized {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Parses a metadata document
    fn parse(input: &str) -> std::result::Result<Self, Self::Error>;

    /// Name of the format handled by this parser
    fn format_name() -> &'static str;
}

/// Parsed document tagged with its format and parse time
#[derive(Debug, Clone)]
pub struct ParsedMetadata<T> {
    /// Document format (e.g. "DIDL-Lite")
    pub format: String,

    pub data: T,

    pub parsed_at: Option<std::time::SystemTime>,
}

impl<T> ParsedMetadata<T> {
    pub fn new(format: impl Into<String>, data: T) -> Self {
        Self {
            format: format.into(),
            data,
            parsed_at: Some(std::time::SystemTime::now()),
        }
    }

    /// Transforms the parsed data, keeping format and timestamp
    pub fn map<U, F>(self, f: F) -> ParsedMetadata<U>
    where
        F: FnOnce(T) -> U,
    {
        ParsedMetadata {
            format: self.format,
            data: f(self.data),
            parsed_at: self.parsed_at,
        }
    }
}

/// Parses `input` with `P` and wraps the result
pub fn parse_metadata<P: MediaMetadataParser>(
    input: &str,
) -> std::result::Result<ParsedMetadata<P>, P::Error> {
    let data = P::parse(input)?;
    Ok(ParsedMetadata::new(P::format_name(), data))
}
