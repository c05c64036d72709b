use std::io::Cursor;

use id3::TagLike;

use crate::chunks::{DecodedChunk, payload};
use crate::errors::ChunkDecodeError;
use crate::registry::DecodeContext;
use crate::walker::ChunkRecord;

/// * An ID3v2 tag stored in an `id3 ` or `ID3 ` chunk.
#[derive(Debug, Clone)]
pub struct Id3Chunk {
    pub tag: id3::Tag,
}

impl Id3Chunk {
    pub fn title(&self) -> Option<&str> {
        self.tag.title()
    }

    pub fn artist(&self) -> Option<&str> {
        self.tag.artist()
    }

    pub fn album(&self) -> Option<&str> {
        self.tag.album()
    }
}

pub(crate) fn decode_id3(record: &ChunkRecord, _ctx: &DecodeContext) -> Result<DecodedChunk, ChunkDecodeError> {
    let tag = id3::Tag::read_from2(Cursor::new(payload(record)?))
        .map_err(|err| ChunkDecodeError::Tag(err.to_string()))?;
    Ok(DecodedChunk::Id3(Id3Chunk { tag }))
}
