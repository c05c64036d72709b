use crate::chunks::{DecodedChunk, payload};
use crate::errors::ChunkDecodeError;
use crate::fourcc::FourCC;
use crate::registry::DecodeContext;
use crate::walker::ChunkRecord;

/// * The Broadcast Wave `bext` chunk (EBU Tech 3285)
#[derive(Debug, Clone, PartialEq)]
pub struct BextChunk {
    pub description: String,
    pub originator: String,
    pub originator_reference: String,
    pub origination_date: String,
    pub origination_time: String,

    /// * Samples since midnight of the first sample
    pub time_reference: u64,
    pub version: u16,

    /// * The SMPTE UMID, meaningful from version 1.
    pub umid: [u8; 64],

    /// * Present from version 2, all zero before.
    pub loudness: Option<BextLoudness>,
    pub coding_history: String,
}

/// * Loudness values of `bext` version 2, each is the value in LU/dB multiplied by 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BextLoudness {
    pub loudness_value: i16,
    pub loudness_range: i16,
    pub max_true_peak_level: i16,
    pub max_momentary_loudness: i16,
    pub max_short_term_loudness: i16,
}

impl BextChunk {
    /// * Where the coding history begins, after 180 reserved bytes.
    pub const CODING_HISTORY_OFFSET: usize = 602;

    /// * The UMID as a hex string without the trailing zero bytes, empty if it's all zero.
    pub fn umid_hex(&self) -> String {
        let len = self.umid.iter().rposition(|&b| b != 0).map_or(0, |pos| pos + 1);
        self.umid[..len].iter().map(|b| format!("{b:02x}")).collect()
    }
}

pub(crate) fn decode_bext(record: &ChunkRecord, ctx: &DecodeContext) -> Result<DecodedChunk, ChunkDecodeError> {
    let data = payload(record)?;
    let mut r = ctx.fields(record.id, data);
    let description = ctx.text(r.bytes(256)?);
    let originator = ctx.text(r.bytes(32)?);
    let originator_reference = ctx.text(r.bytes(32)?);
    let origination_date = ctx.text(r.bytes(10)?);
    let origination_time = ctx.text(r.bytes(8)?);
    let time_reference = r.u64_split()?;
    let version = r.u16()?;
    let umid = r.array::<64>()?;
    let loudness = BextLoudness {
        loudness_value: r.i16()?,
        loudness_range: r.i16()?,
        max_true_peak_level: r.i16()?,
        max_momentary_loudness: r.i16()?,
        max_short_term_loudness: r.i16()?,
    };
    r.skip(180)?;
    let coding_history = ctx.text(r.rest());
    Ok(DecodedChunk::Bext(BextChunk {
        description,
        originator,
        originator_reference,
        origination_date,
        origination_time,
        time_reference,
        version,
        umid,
        loudness: if version >= 2 { Some(loudness) } else { None },
        coding_history,
    }))
}

/// * The AES46 `cart` chunk
#[derive(Debug, Clone, PartialEq)]
pub struct CartChunk {
    pub version: String,
    pub title: String,
    pub artist: String,
    pub cut_id: String,
    pub client_id: String,
    pub category: String,
    pub classification: String,
    pub out_cue: String,
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
    pub producer_app_id: String,
    pub producer_app_version: String,
    pub user_def: String,
    pub level_reference: i32,

    /// * Only the timers in use, unused slots have a zeroed usage ID.
    pub post_timers: Vec<CartPostTimer>,
    pub url: String,
    pub tag_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartPostTimer {
    /// * e.g. `SEG1`, `INT1`, `AUD1`
    pub usage: FourCC,
    pub value: u32,
}

pub(crate) fn decode_cart(record: &ChunkRecord, ctx: &DecodeContext) -> Result<DecodedChunk, ChunkDecodeError> {
    let data = payload(record)?;
    let mut r = ctx.fields(record.id, data);
    let version = ctx.text(r.bytes(4)?);
    let title = ctx.text(r.bytes(64)?);
    let artist = ctx.text(r.bytes(64)?);
    let cut_id = ctx.text(r.bytes(64)?);
    let client_id = ctx.text(r.bytes(64)?);
    let category = ctx.text(r.bytes(64)?);
    let classification = ctx.text(r.bytes(64)?);
    let out_cue = ctx.text(r.bytes(64)?);
    let start_date = ctx.text(r.bytes(10)?);
    let start_time = ctx.text(r.bytes(8)?);
    let end_date = ctx.text(r.bytes(10)?);
    let end_time = ctx.text(r.bytes(8)?);
    let producer_app_id = ctx.text(r.bytes(64)?);
    let producer_app_version = ctx.text(r.bytes(64)?);
    let user_def = ctx.text(r.bytes(64)?);
    let level_reference = r.i32()?;
    let mut post_timers = Vec::new();
    for _ in 0..8 {
        let usage = r.fourcc()?;
        let value = r.u32()?;
        if !usage.is_null() {
            post_timers.push(CartPostTimer { usage, value });
        }
    }
    r.skip(276)?;
    let url = ctx.text(r.bytes(1024)?);
    let tag_text = ctx.text(r.rest());
    Ok(DecodedChunk::Cart(CartChunk {
        version,
        title,
        artist,
        cut_id,
        client_id,
        category,
        classification,
        out_cue,
        start_date,
        start_time,
        end_date,
        end_time,
        producer_app_id,
        producer_app_version,
        user_def,
        level_reference,
        post_timers,
        url,
        tag_text,
    }))
}
