//! The media item record and its builder.

use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};

use crate::duration::parse_duration;
use crate::object::MediaObject;
use crate::resource::MediaItemResource;
use crate::uri_collection::UriCollection;

/// Generates `Option<&str>` getters for optional string fields.
macro_rules! impl_str_getters {
    ($($field:ident),* $(,)?) => {
        $(
            pub fn $field(&self) -> Option<&str> {
                self.$field.as_deref()
            }
        )*
    };
}

/// Generates chained setters on the builder for optional string fields.
macro_rules! impl_str_setters {
    ($($field:ident),* $(,)?) => {
        $(
            pub fn $field(mut self, value: impl Into<String>) -> Self {
                self.item.$field = Some(value.into());
                self
            }
        )*
    };
}

/// Generates slice getters for string list fields.
macro_rules! impl_list_getters {
    ($($field:ident),* $(,)?) => {
        $(
            pub fn $field(&self) -> &[String] {
                &self.$field
            }
        )*
    };
}

/// Generates a replace-all setter and an append helper for string list fields.
macro_rules! impl_list_setters {
    ($($field:ident / $push:ident),* $(,)?) => {
        $(
            pub fn $field<I, S>(mut self, values: I) -> Self
            where
                I: IntoIterator<Item = S>,
                S: Into<String>,
            {
                self.item.$field = values.into_iter().map(Into::into).collect();
                self
            }

            pub fn $push(mut self, value: impl Into<String>) -> Self {
                self.item.$field.push(value.into());
                self
            }
        )*
    };
}

/// Metadata of one playable ContentDirectory item.
///
/// Values are built with [`MediaItemBuilder`] and read through getters. The
/// only in-place mutation is [`MediaItem::add_res`]; anything else goes
/// through [`MediaItem::to_builder`].
///
/// `uri` and `protocol_info` are not stored: they always reflect the last
/// entry of the uri collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    #[serde(flatten)]
    object: MediaObject,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    original_track_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    long_description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    frequency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    audio_channels: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    duration_in_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    bitrate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    icon: Option<String>,

    #[serde(skip_serializing_if = "UriCollection::is_empty", default)]
    uri_collection: UriCollection,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    resources: Vec<MediaItemResource>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    creators: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    authors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    directors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    artists: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    last_playback_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    last_playback_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    playback_count: Option<String>,
}

impl MediaItem {
    pub fn builder(object: MediaObject) -> MediaItemBuilder {
        MediaItemBuilder::new(object)
    }

    /// Builder seeded with a copy of this item.
    pub fn to_builder(&self) -> MediaItemBuilder {
        MediaItemBuilder { item: self.clone() }
    }

    /// Appends a resource. No deduplication; order is append order.
    pub fn add_res(&mut self, res: MediaItemResource) {
        self.resources.push(res);
    }

    pub fn object(&self) -> &MediaObject {
        &self.object
    }

    pub fn id(&self) -> &str {
        &self.object.id
    }

    pub fn title(&self) -> &str {
        &self.object.title
    }

    impl_str_getters!(
        album,
        date,
        genre,
        original_track_number,
        long_description,
        frequency,
        audio_channels,
        size,
        duration,
        bitrate,
        icon,
        last_playback_position,
        last_playback_time,
        playback_count,
    );

    impl_list_getters!(creators, authors, directors, artists);

    /// URI of the last uri collection entry.
    pub fn uri(&self) -> Option<&str> {
        self.uri_collection.last().map(|e| e.uri.as_str())
    }

    /// protocolInfo of the last uri collection entry.
    pub fn protocol_info(&self) -> Option<&str> {
        self.uri_collection.last().map(|e| e.protocol_info.as_str())
    }

    /// Explicit value when one was set, otherwise derived from `duration`.
    pub fn duration_in_seconds(&self) -> Option<u32> {
        self.duration_in_seconds.or_else(|| {
            self.duration
                .as_deref()
                .and_then(|d| parse_duration(d).ok())
        })
    }

    pub fn uri_collection(&self) -> &UriCollection {
        &self.uri_collection
    }

    pub fn resources(&self) -> &[MediaItemResource] {
        &self.resources
    }

    pub fn audio_resources(&self) -> impl Iterator<Item = &MediaItemResource> {
        self.resources.iter().filter(|r| r.is_audio())
    }

    /// First resource, if any.
    pub fn primary_resource(&self) -> Option<&MediaItemResource> {
        self.resources.first()
    }

    /// Picks the first resource matching the earliest MIME type in
    /// `mime_preferences`. Falls back to the primary resource.
    pub fn preferred_resource<S: AsRef<str>>(
        &self,
        mime_preferences: &[S],
    ) -> Option<&MediaItemResource> {
        mime_preferences
            .iter()
            .find_map(|wanted| {
                self.resources.iter().find(|r| {
                    r.protocol_info()
                        .mime_type()
                        .is_some_and(|mime| mime.eq_ignore_ascii_case(wanted.as_ref()))
                })
            })
            .or_else(|| self.primary_resource())
    }

    pub fn has_audio(&self) -> bool {
        self.resources.iter().any(|r| r.is_audio())
    }

    /// Descriptive fields as key/value pairs, unset fields omitted.
    pub fn metadata(&self) -> impl Iterator<Item = (&str, &str)> {
        let mut pairs = vec![("title", self.object.title.as_str())];

        for artist in &self.artists {
            pairs.push(("artist", artist.as_str()));
        }
        for creator in &self.creators {
            pairs.push(("creator", creator.as_str()));
        }

        let optional = [
            ("album", &self.album),
            ("genre", &self.genre),
            ("date", &self.date),
            ("trackNumber", &self.original_track_number),
            ("duration", &self.duration),
            ("longDescription", &self.long_description),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                pairs.push((key, value.as_str()));
            }
        }

        pairs.into_iter()
    }

    /// Markdown rendering used by the inspection tool.
    pub fn to_markdown(&self) -> String {
        let mut buf = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_markdown(&mut buf);
        buf
    }

    fn write_markdown(&self, buf: &mut String) -> fmt::Result {
        writeln!(buf, "- **Item**: {}", self.object.title)?;
        writeln!(buf, "  - ID: `{}`", self.object.id)?;
        writeln!(buf, "  - ParentID: `{}`", self.object.parent_id)?;
        writeln!(buf, "  - Class: `{}`", self.object.object_class)?;

        for (key, value) in self.metadata().skip(1) {
            writeln!(buf, "  - {}: {}", key, value)?;
        }
        for author in &self.authors {
            writeln!(buf, "  - Author: {}", author)?;
        }
        for director in &self.directors {
            writeln!(buf, "  - Director: {}", director)?;
        }
        if let Some(ref art) = self.object.album_art_uri {
            writeln!(buf, "  - Album Art: ![Cover]({})", art)?;
        }
        if let Some(secs) = self.duration_in_seconds() {
            writeln!(buf, "  - Seconds: `{}`", secs)?;
        }
        if let Some(uri) = self.uri() {
            writeln!(buf, "  - URI: {}", uri)?;
        }
        if let Some(count) = self.playback_count.as_deref() {
            writeln!(buf, "  - Played: `{}` times", count)?;
        }

        if !self.resources.is_empty() {
            writeln!(buf, "  - Resources:")?;
            for res in &self.resources {
                writeln!(buf, "    - URL: {}", res.uri())?;
                writeln!(buf, "      - Protocol: `{}`", res.protocol_info())?;
                if let Some(dur) = res.duration() {
                    writeln!(buf, "      - Duration: `{}`", dur)?;
                }
                if let Some(size) = res.size() {
                    writeln!(buf, "      - Size: `{}`", size)?;
                }
                if let Some(bitrate) = res.bitrate() {
                    writeln!(buf, "      - Bitrate: `{}`", bitrate)?;
                }
                if let Some(freq) = res.sample_frequency() {
                    writeln!(buf, "      - SampleFrequency: `{}`", freq)?;
                }
                if let Some(channels) = res.nr_audio_channels() {
                    writeln!(buf, "      - Channels: `{}`", channels)?;
                }
                if let Some(bits) = res.bits_per_sample() {
                    writeln!(buf, "      - BitsPerSample: `{}`", bits)?;
                }
                if let Some(resolution) = res.resolution() {
                    writeln!(buf, "      - Resolution: `{}`", resolution)?;
                }
            }
        }

        buf.push('\n');
        Ok(())
    }
}

/// Builder for [`MediaItem`].
#[derive(Debug, Clone, Default)]
pub struct MediaItemBuilder {
    item: MediaItem,
}

impl MediaItemBuilder {
    pub fn new(object: MediaObject) -> Self {
        Self {
            item: MediaItem {
                object,
                ..MediaItem::default()
            },
        }
    }

    pub fn object(mut self, object: MediaObject) -> Self {
        self.item.object = object;
        self
    }

    impl_str_setters!(
        album,
        date,
        genre,
        original_track_number,
        long_description,
        frequency,
        audio_channels,
        size,
        bitrate,
        icon,
        last_playback_position,
        last_playback_time,
        playback_count,
    );

    /// Sets the `H+:MM:SS` duration. Drops an explicit `duration_in_seconds`
    /// so the seconds follow the new value.
    pub fn duration(mut self, value: impl Into<String>) -> Self {
        self.item.duration = Some(value.into());
        self.item.duration_in_seconds = None;
        self
    }

    impl_list_setters!(
        creators / add_creator,
        authors / add_author,
        directors / add_director,
        artists / add_artist,
    );

    pub fn duration_in_seconds(mut self, seconds: u32) -> Self {
        self.item.duration_in_seconds = Some(seconds);
        self
    }

    pub fn uri_collection(mut self, uris: UriCollection) -> Self {
        self.item.uri_collection = uris;
        self
    }

    /// Inserts one protocolInfo → URI pair; it becomes the item's `uri`.
    pub fn insert_uri(mut self, protocol_info: impl Into<String>, uri: impl Into<String>) -> Self {
        self.item.uri_collection.insert(protocol_info, uri);
        self
    }

    pub fn add_res(mut self, res: MediaItemResource) -> Self {
        self.item.add_res(res);
        self
    }

    pub fn build(self) -> MediaItem {
        self.item
    }
}
