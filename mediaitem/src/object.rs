use serde::{Deserialize, Serialize};

/// Fields shared by every ContentDirectory object (items and containers).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaObject {
    pub id: String,
    pub parent_id: String,
    pub title: String,
    /// UPnP class, e.g. `object.item.audioItem.musicTrack`
    pub object_class: String,
    pub restricted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_art_uri: Option<String>,
}

impl MediaObject {
    pub fn new(
        id: impl Into<String>,
        parent_id: impl Into<String>,
        title: impl Into<String>,
        object_class: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            title: title.into(),
            object_class: object_class.into(),
            restricted: false,
            album_art_uri: None,
        }
    }

    pub fn is_audio_item(&self) -> bool {
        self.object_class.starts_with("object.item.audioItem")
    }

    pub fn is_video_item(&self) -> bool {
        self.object_class.starts_with("object.item.videoItem")
    }
}
