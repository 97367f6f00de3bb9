//! Output rendering for inspected documents

use std::fmt::Write;

use anyhow::Result;
use mediaitem::MediaItem;

use crate::cli::OutputFormat;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Items read from one input
#[derive(Debug)]
pub struct Document {
    pub source: String,
    pub items: Vec<MediaItem>,
}

/// Renders `documents` in `format`
///
/// Markdown keeps one section per input. The other formats merge the items
/// of every input into a single list or DIDL-Lite document.
pub fn render(
    format: OutputFormat,
    documents: &[Document],
    preferred_mime_types: &[String],
) -> Result<String> {
    let items = || documents.iter().flat_map(|doc| doc.items.iter());

    let output = match format {
        OutputFormat::Markdown => markdown(documents, preferred_mime_types),
        OutputFormat::Json => {
            let items: Vec<&MediaItem> = items().collect();
            let mut json = serde_json::to_string_pretty(&items)?;
            json.push('\n');
            json
        }
        OutputFormat::Yaml => {
            let items: Vec<&MediaItem> = items().collect();
            serde_yaml::to_string(&items)?
        }
        OutputFormat::Didl => {
            format!("{}\n{}\n", XML_DECLARATION, mediaitem::to_xml(items())?)
        }
    };

    Ok(output)
}

fn markdown(documents: &[Document], preferred_mime_types: &[String]) -> String {
    let mut buf = String::new();

    for doc in documents {
        let _ = writeln!(buf, "# {} ({} items)\n", doc.source, doc.items.len());
        for item in &doc.items {
            buf.push_str(item.to_markdown().trim_end());
            buf.push('\n');
            if let Some(res) = item.preferred_resource(preferred_mime_types) {
                let _ = writeln!(
                    buf,
                    "  - Preferred: {} (`{}`)",
                    res.uri(),
                    res.protocol_info().content_format()
                );
            }
            buf.push('\n');
        }
    }

    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediaitem::parse_items;

    const TRACKS: &str = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/">
<item id="t1" parentID="album" restricted="1">
  <dc:title>So What</dc:title>
  <upnp:class>object.item.audioItem.musicTrack</upnp:class>
  <res protocolInfo="http-get:*:audio/mpeg:*" duration="0:09:22">http://srv/1.mp3</res>
  <res protocolInfo="http-get:*:audio/flac:*" duration="0:09:22">http://srv/1.flac</res>
</item>
</DIDL-Lite>"#;

    fn documents() -> Vec<Document> {
        vec![Document {
            source: "album.xml".to_string(),
            items: parse_items(TRACKS).unwrap(),
        }]
    }

    #[test]
    fn test_markdown_lists_items_per_source() {
        let prefs = vec!["audio/flac".to_string()];
        let out = render(OutputFormat::Markdown, &documents(), &prefs).unwrap();

        assert!(out.starts_with("# album.xml (1 items)\n"));
        assert!(out.contains("- **Item**: So What"));
        assert!(out.contains("  - Preferred: http://srv/1.flac (`audio/flac`)"));
    }

    #[test]
    fn test_markdown_falls_back_to_first_resource() {
        let out = render(OutputFormat::Markdown, &documents(), &[]).unwrap();
        assert!(out.contains("  - Preferred: http://srv/1.mp3 (`audio/mpeg`)"));
    }

    #[test]
    fn test_json_output_is_an_array() {
        let out = render(OutputFormat::Json, &documents(), &[]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "So What");
    }

    #[test]
    fn test_yaml_output_mentions_resources() {
        let out = render(OutputFormat::Yaml, &documents(), &[]).unwrap();
        assert!(out.contains("So What"));
        assert!(out.contains("http://srv/1.flac"));
    }

    #[test]
    fn test_didl_output_parses_back() {
        let out = render(OutputFormat::Didl, &documents(), &[]).unwrap();
        assert!(out.starts_with(XML_DECLARATION));

        let items = parse_items(&out).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].uri(), Some("http://srv/1.flac"));
    }
}
