use savagestr::{CODE_PAGE_ASCII, CODE_PAGE_UTF8};

use crate::chunks::{DecodedChunk, payload};
use crate::errors::ChunkDecodeError;
use crate::fields::FieldReader;
use crate::registry::DecodeContext;
use crate::resolver::Endianness;
use crate::walker::ChunkRecord;

/// * The peak envelope chunk `levl` (EBU Tech 3285 supplement 3). Always little-endian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevlChunk {
    pub version: u32,

    /// * 1: 8-bit peak points, 2: 16-bit peak points
    pub format: u32,

    /// * 1: only positive peaks, 2: positive and negative
    pub points_per_value: u32,

    /// * Audio frames per peak value, 256 by default.
    pub block_size: u32,
    pub channel_count: u32,
    pub frame_count: u32,
    pub position: u32,
    pub offset: u32,

    /// * `YYYY:MM:DD:hh:mm:ss:uuu`
    pub timestamp: String,
    pub peak_envelope_data: Vec<u8>,
}

impl LevlChunk {
    pub const PEAK_DATA_OFFSET: usize = 120;
}

pub(crate) fn decode_levl(record: &ChunkRecord, ctx: &DecodeContext) -> Result<DecodedChunk, ChunkDecodeError> {
    let mut r = FieldReader::new(record.id, payload(record)?, Endianness::Little);
    let version = r.u32()?;
    let format = r.u32()?;
    let points_per_value = r.u32()?;
    let block_size = r.u32()?;
    let channel_count = r.u32()?;
    let frame_count = r.u32()?;
    let position = r.u32()?;
    let offset = r.u32()?;
    let timestamp = ctx.text_in_code_page(r.bytes(28)?, CODE_PAGE_ASCII);
    r.skip(60)?;
    Ok(DecodedChunk::Levl(LevlChunk {
        version,
        format,
        points_per_value,
        block_size,
        channel_count,
        frame_count,
        position,
        offset,
        timestamp,
        peak_envelope_data: r.rest().to_vec(),
    }))
}

/// * The ADM `chna` chunk: which track carries which audio object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChnaChunk {
    pub track_count: u16,
    pub uid_count: u16,
    pub tracks: Vec<ChnaTrack>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChnaTrack {
    pub track_index: u16,
    pub uid: String,
    pub track_reference: String,
    pub pack_reference: String,
}

pub(crate) fn decode_chna(record: &ChunkRecord, ctx: &DecodeContext) -> Result<DecodedChunk, ChunkDecodeError> {
    let mut r = ctx.fields(record.id, payload(record)?);
    let track_count = r.u16()?;
    let uid_count = r.u16()?;
    let mut tracks = Vec::with_capacity((uid_count as usize).min(r.remaining() / 40));
    for _ in 0..uid_count {
        let track_index = r.u16()?;
        let uid = ctx.text_in_code_page(r.bytes(12)?, CODE_PAGE_ASCII);
        let track_reference = ctx.text_in_code_page(r.bytes(14)?, CODE_PAGE_ASCII);
        let pack_reference = ctx.text_in_code_page(r.bytes(11)?, CODE_PAGE_ASCII);
        r.skip(1)?;
        tracks.push(ChnaTrack {
            track_index,
            uid,
            track_reference,
            pack_reference,
        });
    }
    Ok(DecodedChunk::Chna(ChnaChunk {
        track_count,
        uid_count,
        tracks,
    }))
}

/// * The `DISP` chunk: something to display for the file, tagged with a Windows clipboard format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispChunk {
    pub clipboard_type: u32,

    /// * The decoded text for `CF_TEXT`
    pub text: Option<String>,
    pub data: Vec<u8>,
}

impl DispChunk {
    pub const CF_TEXT: u32 = 1;
    pub const CF_BITMAP: u32 = 2;
    pub const CF_METAFILE: u32 = 3;
    pub const CF_DIB: u32 = 8;
    pub const CF_PALETTE: u32 = 9;

    pub fn clipboard_type_name(&self) -> &'static str {
        match self.clipboard_type {
            Self::CF_TEXT => "CF_TEXT",
            Self::CF_BITMAP => "CF_BITMAP",
            Self::CF_METAFILE => "CF_METAFILE",
            Self::CF_DIB => "CF_DIB",
            Self::CF_PALETTE => "CF_PALETTE",
            _ => "UNKNOWN_TYPE",
        }
    }
}

pub(crate) fn decode_disp(record: &ChunkRecord, ctx: &DecodeContext) -> Result<DecodedChunk, ChunkDecodeError> {
    let mut r = ctx.fields(record.id, payload(record)?);
    let clipboard_type = r.u32()?;
    let data = r.rest();
    let text = match clipboard_type {
        DispChunk::CF_TEXT => Some(ctx.text(data)),
        _ => None,
    };
    Ok(DecodedChunk::Disp(DispChunk {
        clipboard_type,
        text,
        data: data.to_vec(),
    }))
}

/// * `axml`, `iXML` and `_PMX` carry XML documents, always UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlChunk {
    pub xml: String,
}

pub(crate) fn decode_xml(record: &ChunkRecord, ctx: &DecodeContext) -> Result<DecodedChunk, ChunkDecodeError> {
    let xml = ctx.text_in_code_page(payload(record)?, CODE_PAGE_UTF8);
    let xml = xml.trim_start_matches('\u{feff}').trim().to_string();
    if !xml.is_empty() && !xml.starts_with('<') {
        return Err(ChunkDecodeError::InvalidData(format!(
            "the \"{}\" chunk doesn't contain an XML document",
            record.id
        )));
    }
    Ok(DecodedChunk::Xml(XmlChunk { xml }))
}

/// * The `MD5 ` chunk: the checksum of the `data` chunk payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Md5Chunk {
    pub checksum: u128,
}

impl Md5Chunk {
    pub fn hex(&self) -> String {
        format!("{:032x}", self.checksum)
    }
}

pub(crate) fn decode_md5(record: &ChunkRecord, ctx: &DecodeContext) -> Result<DecodedChunk, ChunkDecodeError> {
    let mut r = ctx.fields(record.id, payload(record)?);
    Ok(DecodedChunk::Md5(Md5Chunk { checksum: r.u128()? }))
}

/// * `JUNK`, `FLLR`, `PAD `: filler whose content doesn't matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JunkChunk {
    pub size: u64,
}

pub(crate) fn decode_junk(record: &ChunkRecord, _ctx: &DecodeContext) -> Result<DecodedChunk, ChunkDecodeError> {
    Ok(DecodedChunk::Junk(JunkChunk { size: record.size }))
}
