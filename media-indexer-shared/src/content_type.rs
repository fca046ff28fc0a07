//! Catalog content types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the catalog categories that partition a sync run.
///
/// The serialized form matches the source's `Type` field verbatim, which is
/// also the value stored in the index and used in filter expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    Movie,
    Series,
    Episode,
    MusicArtist,
    MusicAlbum,
    Audio,
}

impl ContentType {
    /// Every supported type, in the order a sync run visits them.
    pub const ALL: [ContentType; 6] = [
        ContentType::Movie,
        ContentType::Series,
        ContentType::Episode,
        ContentType::MusicArtist,
        ContentType::MusicAlbum,
        ContentType::Audio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Movie => "Movie",
            ContentType::Series => "Series",
            ContentType::Episode => "Episode",
            ContentType::MusicArtist => "MusicArtist",
            ContentType::MusicAlbum => "MusicAlbum",
            ContentType::Audio => "Audio",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a supported content type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown content type: {0}")]
pub struct UnknownContentType(pub String);

impl FromStr for ContentType {
    type Err = UnknownContentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownContentType(s.to_string()))
    }
}
