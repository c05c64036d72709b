use crate::chunks::{DecodedChunk, LtxtChunk, payload};
use crate::errors::ChunkDecodeError;
use crate::fourcc::FourCC;
use crate::registry::DecodeContext;
use crate::walker::ChunkRecord;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CueChunk {
    pub cue_points: Vec<Cue>,
}

/// * A cue point. The label, note and labeled text come from `LIST adtl` chunks once the walk is done.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub identifier: u32,
    pub position: u32,
    pub data_chunk_id: FourCC,
    pub chunk_start: u32,
    pub block_start: u32,
    pub sample_offset: u32,
    pub label: Option<String>,
    pub note: Option<String>,
    pub labeled_text: Option<LtxtChunk>,
}

impl CueChunk {
    pub fn get(&self, identifier: u32) -> Option<&Cue> {
        self.cue_points.iter().find(|cue| cue.identifier == identifier)
    }
}

pub(crate) fn decode_cue(record: &ChunkRecord, ctx: &DecodeContext) -> Result<DecodedChunk, ChunkDecodeError> {
    let mut r = ctx.fields(record.id, payload(record)?);
    let count = r.u32()? as usize;
    if count > r.remaining() / 24 {
        return Err(ChunkDecodeError::InvalidData(format!(
            "{count} cue points don't fit in {} bytes",
            r.remaining()
        )));
    }
    let mut cue_points = Vec::with_capacity(count);
    for _ in 0..count {
        cue_points.push(Cue {
            identifier: r.u32()?,
            position: r.u32()?,
            data_chunk_id: r.fourcc()?,
            chunk_start: r.u32()?,
            block_start: r.u32()?,
            sample_offset: r.u32()?,
            label: None,
            note: None,
            labeled_text: None,
        });
    }
    Ok(DecodedChunk::Cue(CueChunk { cue_points }))
}
