//! DIDL-Lite wire format.
//!
//! The structs in this module mirror the XML of a ContentDirectory Browse or
//! Search result. Element names carry their namespace prefix on output; the
//! prefix-less aliases let lax servers that omit namespaces parse too.
//!
//! [`parse_items`] and [`to_xml`] convert between documents and
//! [`MediaItem`] values.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::item::{MediaItem, MediaItemBuilder};
use crate::object::MediaObject;
use crate::protocol::ProtocolInfo;
use crate::resource::MediaItemResource;
use crate::{MediaMetadataParser, parse_metadata};

pub const DIDL_LITE_NS: &str = "urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/";
pub const UPNP_NS: &str = "urn:schemas-upnp-org:metadata-1-0/upnp/";
pub const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
pub const DLNA_NS: &str = "urn:schemas-dlna-org:metadata-1-0/";

// ============= Wire structures =============

/// Root of a DIDL-Lite document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename = "DIDL-Lite")]
pub struct DidlLite {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,

    #[serde(rename = "@xmlns:upnp", skip_serializing_if = "Option::is_none")]
    pub xmlns_upnp: Option<String>,

    #[serde(rename = "@xmlns:dc", skip_serializing_if = "Option::is_none")]
    pub xmlns_dc: Option<String>,

    #[serde(rename = "@xmlns:dlna", skip_serializing_if = "Option::is_none")]
    pub xmlns_dlna: Option<String>,

    #[serde(rename = "container", default)]
    pub containers: Vec<Container>,

    #[serde(rename = "item", default)]
    pub items: Vec<Item>,
}

/// Container; only walked to reach the items it holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@parentID", default)]
    pub parent_id: String,

    #[serde(rename = "dc:title", alias = "title", default)]
    pub title: String,

    #[serde(rename = "upnp:class", alias = "class", default)]
    pub class: String,

    #[serde(rename = "container", default)]
    pub containers: Vec<Container>,

    #[serde(rename = "item", default)]
    pub items: Vec<Item>,
}

/// `<item>` element
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@parentID", default)]
    pub parent_id: String,

    #[serde(rename = "@restricted", skip_serializing_if = "Option::is_none")]
    pub restricted: Option<String>,

    #[serde(rename = "dc:title", alias = "title", default)]
    pub title: String,

    #[serde(rename = "dc:creator", alias = "creator", default)]
    pub creators: Vec<String>,

    #[serde(rename = "upnp:class", alias = "class", default)]
    pub class: String,

    #[serde(rename = "upnp:artist", alias = "artist", default)]
    pub artists: Vec<String>,

    #[serde(rename = "upnp:author", alias = "author", default)]
    pub authors: Vec<String>,

    #[serde(rename = "upnp:director", alias = "director", default)]
    pub directors: Vec<String>,

    #[serde(
        rename = "upnp:album",
        alias = "album",
        skip_serializing_if = "Option::is_none"
    )]
    pub album: Option<String>,

    #[serde(
        rename = "upnp:genre",
        alias = "genre",
        skip_serializing_if = "Option::is_none"
    )]
    pub genre: Option<String>,

    #[serde(
        rename = "upnp:albumArtURI",
        alias = "albumArtURI",
        skip_serializing_if = "Option::is_none"
    )]
    pub album_art: Option<String>,

    #[serde(
        rename = "upnp:icon",
        alias = "icon",
        skip_serializing_if = "Option::is_none"
    )]
    pub icon: Option<String>,

    #[serde(
        rename = "dc:date",
        alias = "date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,

    #[serde(
        rename = "upnp:originalTrackNumber",
        alias = "originalTrackNumber",
        skip_serializing_if = "Option::is_none"
    )]
    pub original_track_number: Option<String>,

    #[serde(
        rename = "upnp:longDescription",
        alias = "longDescription",
        skip_serializing_if = "Option::is_none"
    )]
    pub long_description: Option<String>,

    #[serde(
        rename = "upnp:lastPlaybackPosition",
        alias = "lastPlaybackPosition",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_playback_position: Option<String>,

    #[serde(
        rename = "upnp:lastPlaybackTime",
        alias = "lastPlaybackTime",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_playback_time: Option<String>,

    #[serde(
        rename = "upnp:playbackCount",
        alias = "playbackCount",
        skip_serializing_if = "Option::is_none"
    )]
    pub playback_count: Option<String>,

    #[serde(rename = "res", default)]
    pub resources: Vec<Resource>,
}

/// `<res>` element. Attributes stay strings on the wire; numeric values are
/// parsed when converting to [`MediaItemResource`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "@protocolInfo", default)]
    pub protocol_info: String,

    #[serde(rename = "@size", skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(rename = "@duration", skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(rename = "@bitrate", skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<String>,

    #[serde(rename = "@sampleFrequency", skip_serializing_if = "Option::is_none")]
    pub sample_frequency: Option<String>,

    #[serde(rename = "@nrAudioChannels", skip_serializing_if = "Option::is_none")]
    pub nr_audio_channels: Option<String>,

    #[serde(rename = "@bitsPerSample", skip_serializing_if = "Option::is_none")]
    pub bits_per_sample: Option<String>,

    #[serde(rename = "@resolution", skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,

    #[serde(rename = "$text", default)]
    pub url: String,
}

impl MediaMetadataParser for DidlLite {
    type Error = quick_xml::de::DeError;

    fn parse(input: &str) -> std::result::Result<Self, Self::Error> {
        quick_xml::de::from_str(input)
    }

    fn format_name() -> &'static str {
        "DIDL-Lite"
    }
}

impl DidlLite {
    /// Empty document with the standard namespace declarations.
    pub fn new() -> Self {
        Self {
            xmlns: DIDL_LITE_NS.to_string(),
            xmlns_upnp: Some(UPNP_NS.to_string()),
            xmlns_dc: Some(DC_NS.to_string()),
            xmlns_dlna: Some(DLNA_NS.to_string()),
            containers: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Iterates over every item, top-level ones first, then those nested in
    /// containers.
    pub fn all_items(&self) -> impl Iterator<Item = &Item> {
        AllItemsIter::new(&self.containers, &self.items)
    }
}

impl Default for DidlLite {
    fn default() -> Self {
        Self::new()
    }
}

// ============= Conversion =============

/// Parses a DIDL-Lite document and returns every item it contains.
///
/// An empty or whitespace-only payload yields no items.
pub fn parse_items(xml: &str) -> Result<Vec<MediaItem>> {
    let trimmed = xml.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let parsed = parse_metadata::<DidlLite>(trimmed)?
        .map(|didl| didl.all_items().map(MediaItem::from).collect::<Vec<_>>());
    debug!(format = %parsed.format, count = parsed.data.len(), "Parsed items");
    Ok(parsed.data)
}

/// Serializes items into a DIDL-Lite document (without XML declaration).
pub fn to_xml<'a, I>(items: I) -> Result<String>
where
    I: IntoIterator<Item = &'a MediaItem>,
{
    let mut didl = DidlLite::new();
    didl.items = items.into_iter().map(Item::from).collect();
    Ok(quick_xml::se::to_string(&didl)?)
}

fn parse_number<T: std::str::FromStr>(
    item_id: &str,
    attribute: &'static str,
    value: Option<&str>,
) -> Option<T> {
    let raw = value?.trim();
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(
                item_id,
                attribute,
                value = raw,
                "Ignoring unparseable res attribute"
            );
            None
        }
    }
}

fn parse_restricted(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1") | Some("true")
    )
}

fn resource_from_wire(item_id: &str, res: &Resource) -> Option<MediaItemResource> {
    let url = res.url.trim();
    if url.is_empty() {
        debug!(item_id, protocol_info = res.protocol_info.as_str(), "Skipping res without URL");
        return None;
    }

    let protocol_info = match res.protocol_info.parse::<ProtocolInfo>() {
        Ok(info) => info,
        Err(err) => {
            warn!(item_id, error = %err, "Keeping res with malformed protocolInfo as received");
            ProtocolInfo::opaque(&res.protocol_info)
        }
    };

    let mut out = MediaItemResource::new(url, protocol_info);
    if let Some(size) = parse_number(item_id, "size", res.size.as_deref()) {
        out = out.with_size(size);
    }
    if let Some(duration) = res.duration.as_deref() {
        out = out.with_duration(duration.trim());
    }
    if let Some(bitrate) = parse_number(item_id, "bitrate", res.bitrate.as_deref()) {
        out = out.with_bitrate(bitrate);
    }
    if let Some(freq) = parse_number(item_id, "sampleFrequency", res.sample_frequency.as_deref()) {
        out = out.with_sample_frequency(freq);
    }
    if let Some(channels) =
        parse_number(item_id, "nrAudioChannels", res.nr_audio_channels.as_deref())
    {
        out = out.with_nr_audio_channels(channels);
    }
    if let Some(bits) = parse_number(item_id, "bitsPerSample", res.bits_per_sample.as_deref()) {
        out = out.with_bits_per_sample(bits);
    }
    if let Some(resolution) = res.resolution.as_deref() {
        out = out.with_resolution(resolution.trim());
    }
    Some(out)
}

type Setter = fn(MediaItemBuilder, String) -> MediaItemBuilder;

impl From<&Item> for MediaItem {
    /// Every kept `<res>` is appended to the resources and recorded in the
    /// uri collection. The item-level technical fields come from the last one.
    fn from(item: &Item) -> Self {
        let object = MediaObject {
            id: item.id.clone(),
            parent_id: item.parent_id.clone(),
            title: item.title.trim().to_string(),
            object_class: item.class.trim().to_string(),
            restricted: parse_restricted(item.restricted.as_deref()),
            album_art_uri: item.album_art.clone(),
        };

        let mut builder = MediaItem::builder(object)
            .creators(item.creators.iter().cloned())
            .artists(item.artists.iter().cloned())
            .authors(item.authors.iter().cloned())
            .directors(item.directors.iter().cloned());

        let descriptive: [(&Option<String>, Setter); 9] = [
            (&item.album, |b, v| b.album(v)),
            (&item.genre, |b, v| b.genre(v)),
            (&item.date, |b, v| b.date(v)),
            (&item.icon, |b, v| b.icon(v)),
            (&item.original_track_number, |b, v| b.original_track_number(v)),
            (&item.long_description, |b, v| b.long_description(v)),
            (&item.last_playback_position, |b, v| b.last_playback_position(v)),
            (&item.last_playback_time, |b, v| b.last_playback_time(v)),
            (&item.playback_count, |b, v| b.playback_count(v)),
        ];
        for (value, set) in descriptive {
            if let Some(value) = value {
                builder = set(builder, value.trim().to_string());
            }
        }

        let mut last_res: Option<&Resource> = None;
        for res in &item.resources {
            if let Some(parsed) = resource_from_wire(&item.id, res) {
                builder = builder
                    .insert_uri(res.protocol_info.trim(), parsed.uri())
                    .add_res(parsed);
                last_res = Some(res);
            }
        }

        if let Some(res) = last_res {
            let technical: [(&Option<String>, Setter); 5] = [
                (&res.sample_frequency, |b, v| b.frequency(v)),
                (&res.nr_audio_channels, |b, v| b.audio_channels(v)),
                (&res.size, |b, v| b.size(v)),
                (&res.duration, |b, v| b.duration(v)),
                (&res.bitrate, |b, v| b.bitrate(v)),
            ];
            for (value, set) in technical {
                if let Some(value) = value {
                    builder = set(builder, value.trim().to_string());
                }
            }
        }

        builder.build()
    }
}

impl From<&MediaItemResource> for Resource {
    fn from(res: &MediaItemResource) -> Self {
        Resource {
            protocol_info: res.protocol_info().to_string(),
            size: res.size().map(|v| v.to_string()),
            duration: res.duration().map(str::to_string),
            bitrate: res.bitrate().map(|v| v.to_string()),
            sample_frequency: res.sample_frequency().map(|v| v.to_string()),
            nr_audio_channels: res.nr_audio_channels().map(|v| v.to_string()),
            bits_per_sample: res.bits_per_sample().map(|v| v.to_string()),
            resolution: res.resolution().map(str::to_string),
            url: res.uri().to_string(),
        }
    }
}

impl From<&MediaItem> for Item {
    fn from(item: &MediaItem) -> Self {
        let object = item.object();

        let backed = |protocol_info: &str, uri: &str| {
            item.resources()
                .iter()
                .any(|r| r.uri() == uri && r.protocol_info().to_string() == protocol_info)
        };

        // Uri collection entries no resource stands for get a bare <res>
        let unbacked: Vec<Resource> = item
            .uri_collection()
            .iter()
            .filter(|&(protocol_info, uri)| !backed(protocol_info, uri))
            .map(|(protocol_info, uri)| Resource {
                protocol_info: protocol_info.to_string(),
                url: uri.to_string(),
                ..Resource::default()
            })
            .collect();

        // The entry behind `uri()` is written last so it is still last once parsed
        let last_is_unbacked = item
            .uri_collection()
            .last()
            .is_some_and(|e| !backed(&e.protocol_info, &e.uri));
        let written = item.resources().iter().map(Resource::from);
        let resources = if last_is_unbacked {
            written.chain(unbacked).collect()
        } else {
            unbacked.into_iter().chain(written).collect()
        };

        Item {
            id: object.id.clone(),
            parent_id: object.parent_id.clone(),
            restricted: Some(if object.restricted { "1" } else { "0" }.to_string()),
            title: object.title.clone(),
            creators: item.creators().to_vec(),
            class: object.object_class.clone(),
            artists: item.artists().to_vec(),
            authors: item.authors().to_vec(),
            directors: item.directors().to_vec(),
            album: item.album().map(str::to_string),
            genre: item.genre().map(str::to_string),
            album_art: object.album_art_uri.clone(),
            icon: item.icon().map(str::to_string),
            date: item.date().map(str::to_string),
            original_track_number: item.original_track_number().map(str::to_string),
            long_description: item.long_description().map(str::to_string),
            last_playback_position: item.last_playback_position().map(str::to_string),
            last_playback_time: item.last_playback_time().map(str::to_string),
            playback_count: item.playback_count().map(str::to_string),
            resources,
        }
    }
}

// ============= Iterators =============

struct AllItemsIter<'a> {
    containers: Vec<&'a Container>,
    current_items: std::slice::Iter<'a, Item>,
}

impl<'a> AllItemsIter<'a> {
    fn new(containers: &'a [Container], items: &'a [Item]) -> Self {
        Self {
            // Reversed so that popping visits containers in document order
            containers: containers.iter().rev().collect(),
            current_items: items.iter(),
        }
    }
}

impl<'a> Iterator for AllItemsIter<'a> {
    type Item = &'a Item;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.current_items.next() {
                return Some(item);
            }

            let container = self.containers.pop()?;
            self.containers.extend(container.containers.iter().rev());
            self.current_items = container.items.iter();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_didl() {
        let xml = r#"
        <DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"
                   xmlns:dc="http://purl.org/dc/elements/1.1/"
                   xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/">
            <item id="1" parentID="0" restricted="1">
                <dc:title>Test Song</dc:title>
                <upnp:class>object.item.audioItem.musicTrack</upnp:class>
                <res protocolInfo="http-get:*:audio/mpeg:*">http://example.com/song.mp3</res>
            </item>
        </DIDL-Lite>
        "#;

        let items = parse_items(xml).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title(), "Test Song");
        assert!(items[0].object().restricted);
        assert_eq!(items[0].uri(), Some("http://example.com/song.mp3"));
        assert_eq!(items[0].protocol_info(), Some("http-get:*:audio/mpeg:*"));
    }

    #[test]
    fn test_parse_without_namespaces() {
        let xml = r#"
        <DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/">
            <item id="1" parentID="0">
                <title>Test Song</title>
                <class>object.item.audioItem.musicTrack</class>
                <res protocolInfo="http-get:*:audio/mpeg:*">http://example.com/song.mp3</res>
            </item>
        </DIDL-Lite>
        "#;

        let items = parse_items(xml).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title(), "Test Song");
        assert!(!items[0].object().restricted);
    }

    #[test]
    fn test_empty_payload() {
        assert!(parse_items("").unwrap().is_empty());
        assert!(parse_items("   \n").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        assert!(parse_items("<DIDL-Lite><item id=").is_err());
    }

    #[test]
    fn test_nested_items_in_document_order() {
        let xml = r#"
        <DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/">
            <container id="A" parentID="0">
                <title>A</title>
                <class>object.container</class>
                <item id="a1" parentID="A"><title>a1</title><class>object.item</class></item>
                <container id="B" parentID="A">
                    <title>B</title>
                    <class>object.container</class>
                    <item id="b1" parentID="B"><title>b1</title><class>object.item</class></item>
                </container>
            </container>
            <container id="C" parentID="0">
                <title>C</title>
                <class>object.container</class>
                <item id="c1" parentID="C"><title>c1</title><class>object.item</class></item>
            </container>
        </DIDL-Lite>
        "#;

        let ids: Vec<String> = parse_items(xml)
            .unwrap()
            .iter()
            .map(|i| i.id().to_string())
            .collect();
        assert_eq!(ids, ["a1", "b1", "c1"]);
    }

    #[test]
    fn test_generic_parser_envelope() {
        let xml = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"></DIDL-Lite>"#;

        let metadata = parse_metadata::<DidlLite>(xml).unwrap();
        assert_eq!(metadata.format, "DIDL-Lite");
        assert!(metadata.parsed_at.is_some());

        let count = metadata.map(|didl| didl.items.len());
        assert_eq!(count.data, 0);
    }

    #[test]
    fn test_short_protocol_info_kept_as_received() {
        let xml = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/">
            <item id="1" parentID="0">
                <title>Short</title>
                <class>object.item.audioItem.musicTrack</class>
                <res protocolInfo=" http-get:*:audio/mpeg ">http://h/short.mp3</res>
            </item>
        </DIDL-Lite>"#;

        let items = parse_items(xml).unwrap();
        let item = &items[0];
        assert_eq!(item.protocol_info(), Some("http-get:*:audio/mpeg"));
        assert_eq!(
            item.uri_collection().get("http-get:*:audio/mpeg"),
            Some("http://h/short.mp3")
        );
        assert!(item.resources()[0].protocol_info().is_opaque());
        assert!(item.has_audio());
    }

    #[test]
    fn test_malformed_protocol_info_is_stable_across_rewrites() {
        let xml = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/">
            <item id="1" parentID="0">
                <title>Odd</title>
                <class>object.item</class>
                <res protocolInfo="">http://h/empty</res>
                <res protocolInfo="http-get:*:audio/flac">http://h/short.flac</res>
            </item>
        </DIDL-Lite>"#;

        let first = parse_items(xml).unwrap();
        let mut current = first.clone();
        for _ in 0..3 {
            current = parse_items(&to_xml(&current).unwrap()).unwrap();
        }

        assert_eq!(current, first);
        let keys: Vec<&str> = current[0].uri_collection().iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["", "http-get:*:audio/flac"]);
        assert_eq!(current[0].protocol_info(), Some("http-get:*:audio/flac"));
    }

    #[test]
    fn test_unbacked_uri_entries_are_written() {
        let mut item = MediaItem::builder(MediaObject::new("9", "0", "Live", "object.item.audioItem"))
            .insert_uri("http-get:*:audio/flac:*", "http://h/a.flac")
            .insert_uri("http-get:*:audio/aac:*", "http://h/live.aac")
            .build();
        item.add_res(MediaItemResource::new(
            "http://h/a.flac",
            ProtocolInfo::http_get("audio/flac"),
        ));

        let back = parse_items(&to_xml([&item]).unwrap()).unwrap();
        assert_eq!(back[0].uri_collection(), item.uri_collection());
        assert_eq!(back[0].uri(), Some("http://h/live.aac"));
        assert_eq!(back[0].resources().len(), 2);
    }

    #[test]
    fn test_backed_last_entry_stays_last() {
        let item = MediaItem::builder(MediaObject::new("9", "0", "Track", "object.item.audioItem"))
            .insert_uri("http-get:*:audio/aac:*", "http://h/extra.aac")
            .insert_uri("http-get:*:audio/flac:*", "http://h/a.flac")
            .add_res(MediaItemResource::new(
                "http://h/a.flac",
                ProtocolInfo::http_get("audio/flac"),
            ))
            .build();

        let back = parse_items(&to_xml([&item]).unwrap()).unwrap();
        assert_eq!(back[0].uri(), Some("http://h/a.flac"));
        assert_eq!(back[0].uri_collection().len(), 2);
    }

    #[test]
    fn test_hand_built_item_without_resources_writes_uri_collection() {
        let item = MediaItem::builder(MediaObject::new("7", "0", "Radio", "object.item.audioItem"))
            .insert_uri("http-get:*:audio/aac:*", "http://h/live.aac")
            .build();

        let wire = Item::from(&item);
        assert_eq!(wire.resources.len(), 1);
        assert_eq!(wire.resources[0].url, "http://h/live.aac");
        assert_eq!(wire.resources[0].protocol_info, "http-get:*:audio/aac:*");
        assert_eq!(wire.restricted.as_deref(), Some("0"));
    }
}
