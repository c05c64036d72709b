use crate::chunks::{DecodedChunk, payload};
use crate::errors::{ChunkDecodeError, SanityNote};
use crate::registry::DecodeContext;
use crate::walker::ChunkRecord;

/// * The `smpl` chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmplChunk {
    pub manufacturer: u32,
    pub product: u32,

    /// * Nanoseconds per sample
    pub sample_period: u32,
    pub midi_unity_note: u32,
    pub midi_pitch_fraction: u32,
    pub smpte_format: u32,

    /// * `hh mm ss ff`, one byte each from the most significant.
    pub smpte_offset: u32,
    pub loops: Vec<SmplSampleLoop>,
    pub sampler_data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmplSampleLoop {
    pub identifier: u32,

    /// * 0: forward, 1: alternating, 2: backward, 32+: manufacturer specific
    pub loop_type: u32,
    pub start: u32,
    pub end: u32,
    pub fraction: u32,

    /// * 0 for infinite
    pub play_count: u32,
}

impl SmplChunk {
    /// * The SMPTE offset as `hh:mm:ss:ff/format`. The hours byte is signed.
    pub fn smpte_offset_string(&self) -> String {
        let hours = (self.smpte_offset >> 24) as u8 as i8;
        let minutes = (self.smpte_offset >> 16) & 0xFF;
        let seconds = (self.smpte_offset >> 8) & 0xFF;
        let frames = self.smpte_offset & 0xFF;
        format!("{hours:02}:{minutes:02}:{seconds:02}:{frames:02}/{}", self.smpte_format)
    }
}

impl SmplSampleLoop {
    pub fn loop_type_name(&self) -> &'static str {
        match self.loop_type {
            0 => "forward",
            1 => "alternating",
            2 => "backward",
            3..=31 => "reserved",
            _ => "manufacturer specific",
        }
    }
}

pub(crate) fn decode_smpl(record: &ChunkRecord, ctx: &DecodeContext) -> Result<DecodedChunk, ChunkDecodeError> {
    let mut r = ctx.fields(record.id, payload(record)?);
    let manufacturer = r.u32()?;
    let product = r.u32()?;
    let sample_period = r.u32()?;
    let midi_unity_note = r.u32()?;
    let midi_pitch_fraction = r.u32()?;
    let smpte_format = r.u32()?;
    let smpte_offset = r.u32()?;
    let loop_count = r.u32()? as usize;
    let sampler_data_size = r.u32()? as usize;
    if loop_count > r.remaining() / 24 {
        return Err(ChunkDecodeError::InvalidData(format!(
            "{loop_count} sample loops don't fit in {} bytes",
            r.remaining()
        )));
    }
    let mut loops = Vec::with_capacity(loop_count);
    for _ in 0..loop_count {
        loops.push(SmplSampleLoop {
            identifier: r.u32()?,
            loop_type: r.u32()?,
            start: r.u32()?,
            end: r.u32()?,
            fraction: r.u32()?,
            play_count: r.u32()?,
        });
    }
    // Some samplers declare more data than they write.
    let sampler_data = r.bytes(sampler_data_size.min(r.remaining()))?.to_vec();
    Ok(DecodedChunk::Smpl(SmplChunk {
        manufacturer,
        product,
        sample_period,
        midi_unity_note,
        midi_pitch_fraction,
        smpte_format,
        smpte_offset,
        loops,
        sampler_data,
    }))
}

/// * The `inst` chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstChunk {
    pub base_note: u8,

    /// * Cents, -50 to 50
    pub detune: i8,

    /// * Decibels
    pub gain: i8,
    pub low_note: u8,
    pub high_note: u8,
    pub low_velocity: u8,
    pub high_velocity: u8,
}

pub(crate) fn decode_inst(record: &ChunkRecord, ctx: &DecodeContext) -> Result<DecodedChunk, ChunkDecodeError> {
    let mut r = ctx.fields(record.id, payload(record)?);
    Ok(DecodedChunk::Inst(InstChunk {
        base_note: r.u8()?,
        detune: r.i8()?,
        gain: r.i8()?,
        low_note: r.u8()?,
        high_note: r.u8()?,
        low_velocity: r.u8()?,
        high_velocity: r.u8()?,
    }))
}

/// * The ACID loop info chunk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcidChunk {
    pub flags: u32,
    pub root_note: u16,
    pub reserved1: u16,
    pub reserved2: f32,
    pub num_beats: u32,
    pub meter_denominator: u16,
    pub meter_numerator: u16,
    pub tempo: f32,
}

impl AcidChunk {
    pub fn is_one_shot(&self) -> bool {
        self.flags & 0x01 != 0
    }

    pub fn is_loop(&self) -> bool {
        !self.is_one_shot()
    }

    pub fn has_root_note(&self) -> bool {
        self.flags & 0x02 != 0
    }

    pub fn is_stretched(&self) -> bool {
        self.flags & 0x04 != 0
    }

    pub fn is_disk_based(&self) -> bool {
        self.flags & 0x08 != 0
    }

    pub fn is_ram_based(&self) -> bool {
        !self.is_disk_based()
    }

    /// * Set by some ACID versions, the meaning is unknown.
    pub fn unknown_flag(&self) -> bool {
        self.flags & 0x10 != 0
    }
}

pub(crate) fn decode_acid(record: &ChunkRecord, ctx: &DecodeContext) -> Result<DecodedChunk, ChunkDecodeError> {
    let mut r = ctx.fields(record.id, payload(record)?);
    Ok(DecodedChunk::Acid(AcidChunk {
        flags: r.u32()?,
        root_note: r.u16()?,
        reserved1: r.u16()?,
        reserved2: r.f32()?,
        num_beats: r.u32()?,
        meter_denominator: r.u16()?,
        meter_numerator: r.u16()?,
        tempo: r.f32()?,
    }))
}

/// * The ACID slice chunk. Undocumented, the field names say as much as is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrcChunk {
    pub unknown1: u32,
    pub slice_count: u32,
    pub unknown2: u32,
    pub unknown3: u32,
    pub unknown4: u32,
    pub unknown5: u32,
    pub unknown6: u32,
    pub slices: Vec<StrcSlice>,
    pub sanity: Vec<SanityNote>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrcSlice {
    pub data1: u32,
    pub data2: u32,
    pub sample_position: u64,
    pub sample_position2: u64,
    pub data3: u32,
    pub data4: u32,
}

const STRC_LOCATION: &str = "['strc']";

pub(crate) fn decode_strc(record: &ChunkRecord, ctx: &DecodeContext) -> Result<DecodedChunk, ChunkDecodeError> {
    let mut r = ctx.fields(record.id, payload(record)?);
    let unknown1 = r.u32()?;
    let slice_count = r.u32()?;
    let unknown2 = r.u32()?;
    let unknown3 = r.u32()?;
    let unknown4 = r.u32()?;
    let unknown5 = r.u32()?;
    let unknown6 = r.u32()?;
    let mut slices = Vec::new();
    let mut sanity = Vec::new();
    for i in 0..slice_count {
        if r.remaining() < 32 {
            sanity.push(SanityNote::new(
                format!("{STRC_LOCATION} -- SLICE {i}"),
                "NOT ENOUGH DATA TO UNPACK SLICE -- MISSING OR PADDED SLICE.",
            ));
            break;
        }
        slices.push(StrcSlice {
            data1: r.u32()?,
            data2: r.u32()?,
            sample_position: r.u64()?,
            sample_position2: r.u64()?,
            data3: r.u32()?,
            data4: r.u32()?,
        });
    }
    if slices.len() != slice_count as usize {
        sanity.push(SanityNote::new(
            format!("{STRC_LOCATION} -- SLICE BLOCKS"),
            format!("EXPECTED {slice_count} SLICES -- GOT {}.", slices.len()),
        ));
    }
    Ok(DecodedChunk::Strc(StrcChunk {
        unknown1,
        slice_count,
        unknown2,
        unknown3,
        unknown4,
        unknown5,
        unknown6,
        slices,
        sanity,
    }))
}
