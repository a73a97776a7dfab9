//! Song index records as served by the song store.

use crate::document::Document;
use crate::parser::{ParseOutput, ParserOptions, parse_song_with_options};
use crate::render::{RenderOptions, RenderedSong, render};
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::{debug, warn};

fn id_from_string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRecord {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub composer: String,
    /// Raw ChordPro markup.
    pub content: String,
    #[serde(default)]
    pub first_line: String,
}

impl SongRecord {
    pub fn parse(&self) -> ParseOutput {
        self.parse_with_options(ParserOptions::default())
    }

    /// Parses `content`, filling title, artist and composer from the record
    /// where the markup does not set them.
    pub fn parse_with_options(&self, options: ParserOptions) -> ParseOutput {
        let mut output = parse_song_with_options(&self.content, options);
        let document = &mut output.document;
        for (key, value) in [
            ("title", &self.title),
            ("artist", &self.artist),
            ("composer", &self.composer),
        ] {
            if !value.is_empty() && document.meta(key).is_none() {
                document.set_meta(key, value.clone());
            }
        }
        if !output.diagnostics.is_empty() {
            debug!(
                "Song {}: {} parse diagnostic(s)",
                self.id,
                output.diagnostics.len()
            );
        }
        output
    }

    pub fn document(&self) -> Document {
        self.parse().document
    }

    pub fn render(&self, options: &RenderOptions) -> RenderedSong {
        let mut song = render(&self.document(), options);
        song.id = Some(self.id.clone());
        song
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IndexFile {
    List(Vec<SongRecord>),
    Wrapped { songs: Vec<SongRecord> },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SongIndex {
    songs: Vec<SongRecord>,
}

impl SongIndex {
    pub fn new(songs: Vec<SongRecord>) -> Self {
        Self { songs }
    }

    /// Reads either a bare JSON array of records or `{"songs": [...]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: IndexFile = serde_json::from_str(json).context("Failed to parse song index")?;
        let songs = match file {
            IndexFile::List(songs) | IndexFile::Wrapped { songs } => songs,
        };
        Ok(Self { songs })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read song index: {}", path.display()))?;
        let index = Self::from_json(&json)
            .with_context(|| format!("Invalid song index: {}", path.display()))?;
        debug!("Loaded {} song(s) from {}", index.len(), path.display());
        Ok(index)
    }

    pub fn get(&self, id: &str) -> Option<&SongRecord> {
        let found = self.songs.iter().find(|song| song.id == id);
        if found.is_none() {
            warn!("Song {} not found in index", id);
        }
        found
    }

    pub fn iter(&self) -> impl Iterator<Item = &SongRecord> {
        self.songs.iter()
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}
