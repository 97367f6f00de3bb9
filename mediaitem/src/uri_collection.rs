use serde::{Deserialize, Serialize};

/// One protocolInfo → URI pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UriEntry {
    pub protocol_info: String,
    pub uri: String,
}

/// Mapping from protocolInfo string to URI.
///
/// Keys are unique. The collection keeps track of the most recent insertion:
/// inserting an existing key replaces its URI and moves it to the end, so
/// [`UriCollection::last`] is always the entry written last.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UriCollection {
    entries: Vec<UriEntry>,
}

impl UriCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the URI for `protocol_info`, returning the previous URI.
    pub fn insert(
        &mut self,
        protocol_info: impl Into<String>,
        uri: impl Into<String>,
    ) -> Option<String> {
        let protocol_info = protocol_info.into();
        let previous = self
            .entries
            .iter()
            .position(|e| e.protocol_info == protocol_info)
            .map(|idx| self.entries.remove(idx).uri);

        self.entries.push(UriEntry {
            protocol_info,
            uri: uri.into(),
        });
        previous
    }

    pub fn get(&self, protocol_info: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.protocol_info == protocol_info)
            .map(|e| e.uri.as_str())
    }

    pub fn remove(&mut self, protocol_info: &str) -> Option<String> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.protocol_info == protocol_info)?;
        Some(self.entries.remove(idx).uri)
    }

    /// Most recently inserted entry.
    pub fn last(&self) -> Option<&UriEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.protocol_info.as_str(), e.uri.as_str()))
    }
}

// Equality compares the mapping, not the insertion history.
impl PartialEq for UriCollection {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|e| other.get(&e.protocol_info) == Some(e.uri.as_str()))
    }
}

impl Eq for UriCollection {}

impl<K, V> FromIterator<(K, V)> for UriCollection
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut collection = UriCollection::new();
        for (protocol_info, uri) in iter {
            collection.insert(protocol_info, uri);
        }
        collection
    }
}
