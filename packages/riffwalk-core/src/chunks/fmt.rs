use std::fmt::{self, Display, Formatter};

use crate::chunks::{DecodedChunk, payload};
use crate::errors::{ChunkDecodeError, SanityNote};
use crate::fields::FieldReader;
use crate::fourcc::ids;
use crate::registry::DecodeContext;
use crate::resolver::{Endianness, SIZE_PLACEHOLDER};
use crate::walker::ChunkRecord;

const FMT_LOCATION: &str = "['fmt ' / FORMAT]";

pub const FORMAT_TAG_PCM: u16 = 0x0001;
pub const FORMAT_TAG_IEEE_FLOAT: u16 = 0x0003;
pub const FORMAT_TAG_EXTENSIBLE: u16 = 0xFFFE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GUID(pub u32, pub u16, pub u16, pub [u8; 8]);

pub const GUID_PCM_FORMAT: GUID = GUID(0x00000001, 0x0000, 0x0010, [0x80, 0x00, 0x00, 0xaa, 0x00, 0x38, 0x9b, 0x71]);
pub const GUID_IEEE_FLOAT_FORMAT: GUID = GUID(0x00000003, 0x0000, 0x0010, [0x80, 0x00, 0x00, 0xaa, 0x00, 0x38, 0x9b, 0x71]);
pub const GUID_PVOC_EX_FORMAT: GUID = GUID(0x8312b9c2, 0x2e6e, 0x11d4, [0xa8, 0x24, 0xde, 0x5b, 0x96, 0xc3, 0xab, 0x21]);

impl GUID {
    pub fn read(r: &mut FieldReader) -> Result<Self, ChunkDecodeError> {
        Ok(Self(r.u32()?, r.u16()?, r.u16()?, r.array::<8>()?))
    }
}

impl Display for GUID {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            self.0, self.1, self.2, self.3[0], self.3[1], self.3[2], self.3[3], self.3[4], self.3[5], self.3[6], self.3[7]
        )
    }
}

/// * The speaker bits of `WAVEFORMATEXTENSIBLE::dwChannelMask`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum SpeakerPosition {
    FrontLeft = 0x1,
    FrontRight = 0x2,
    FrontCenter = 0x4,
    LowFreq = 0x8,
    BackLeft = 0x10,
    BackRight = 0x20,
    FrontLeftOfCenter = 0x40,
    FrontRightOfCenter = 0x80,
    BackCenter = 0x100,
    SideLeft = 0x200,
    SideRight = 0x400,
    TopCenter = 0x800,
    TopFrontLeft = 0x1000,
    TopFrontCenter = 0x2000,
    TopFrontRight = 0x4000,
    TopBackLeft = 0x8000,
    TopBackCenter = 0x10000,
    TopBackRight = 0x20000,
}

impl SpeakerPosition {
    pub const ALL: [SpeakerPosition; 18] = [
        Self::FrontLeft,
        Self::FrontRight,
        Self::FrontCenter,
        Self::LowFreq,
        Self::BackLeft,
        Self::BackRight,
        Self::FrontLeftOfCenter,
        Self::FrontRightOfCenter,
        Self::BackCenter,
        Self::SideLeft,
        Self::SideRight,
        Self::TopCenter,
        Self::TopFrontLeft,
        Self::TopFrontCenter,
        Self::TopFrontRight,
        Self::TopBackLeft,
        Self::TopBackCenter,
        Self::TopBackRight,
    ];

    /// * The speakers present in a channel mask, in channel order. Reserved bits are ignored.
    pub fn from_mask(channel_mask: u32) -> Vec<SpeakerPosition> {
        Self::ALL
            .iter()
            .copied()
            .filter(|pos| channel_mask & (*pos as u32) != 0)
            .collect()
    }
}

/// * The human readable name of a `wFormatTag`
pub fn format_tag_name(format_tag: u16) -> &'static str {
    match format_tag {
        0x0000 => "Unknown",
        0x0001 => "PCM",
        0x0002 => "Microsoft ADPCM",
        0x0003 => "IEEE Float",
        0x0006 => "A-Law",
        0x0007 => "Mu-Law",
        0x0010 => "OKI ADPCM",
        0x0011 => "IMA ADPCM",
        0x0014 => "Yamaha ADPCM",
        0x0020 => "Yamaha ADPCM",
        0x0031 => "GSM 6.10",
        0x0040 => "G.721 ADPCM",
        0x0050 => "MPEG",
        0x0055 => "MPEG Layer 3",
        0x0092 => "Dolby AC3 SPDIF",
        0x00FF => "AAC",
        0x0161 => "Windows Media Audio",
        0x0162 => "Windows Media Audio Pro",
        0x0163 => "Windows Media Audio Lossless",
        0x1610 => "HE-AAC",
        0x2000 => "Dolby AC3",
        0x2001 => "DTS",
        0x674F => "Ogg Vorbis (mode 1)",
        0x6750 => "Ogg Vorbis (mode 2)",
        0x6751 => "Ogg Vorbis (mode 3)",
        0x676F => "Ogg Vorbis (mode 1+)",
        0x6770 => "Ogg Vorbis (mode 2+)",
        0x6771 => "Ogg Vorbis (mode 3+)",
        0x704F => "Opus",
        0xF1AC => "FLAC",
        0xFFFE => "Extensible",
        0xFFFF => "Experimental",
        _ => "Unknown",
    }
}

/// * How the `fmt ` chunk is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FmtMode {
    /// * `PCMWAVEFORMAT`, 16 bytes
    Pcm,

    /// * `WAVEFORMATEX`, 18 bytes plus the extension
    Extended,

    /// * `WAVEFORMATEXTENSIBLE`, 40 bytes
    Extensible,

    /// * `WAVEFORMATPVOCEX`, an extensible format of 80 bytes
    PvocEx,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FmtChunk {
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,

    /// * `None` for a non-PCM format without the extension field.
    pub mode: Option<FmtMode>,
    pub extension: Option<FmtChunkExtension>,
    pub sanity: Vec<SanityNote>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FmtChunkExtension {
    /// * `cbSize`
    pub ext_size: u16,
    pub data: ExtensionData,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionData {
    /// * The codec specific bytes after `cbSize`, e.g. the ADPCM coefficients.
    Extended(Vec<u8>),
    Extensible(FmtChunkExtensible),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FmtChunkExtensible {
    pub valid_bits_per_sample: u16,
    pub channel_mask: u32,
    pub sub_format: GUID,

    /// * The first two bytes of the sub format GUID, the `wFormatTag` it stands for.
    pub sub_format_code: u16,
    pub pvoc_ex: Option<PvocExData>,
}

/// * The phase vocoder fields after a PVOC-EX sub format.
#[derive(Debug, Clone, PartialEq)]
pub struct PvocExData {
    pub version: u32,
    pub pvoc_size: u32,
    pub word_format: u16,
    pub analysis_format: u16,
    pub source_format: u16,
    pub window_type: u16,
    pub bin_count: u32,
    pub window_length: u32,
    pub overlap: u32,
    pub frame_align: u32,
    pub analysis_rate: f32,
    pub window_param: f32,
}

impl PvocExData {
    fn read(r: &mut FieldReader) -> Result<Self, ChunkDecodeError> {
        Ok(Self {
            version: r.u32()?,
            pvoc_size: r.u32()?,
            word_format: r.u16()?,
            analysis_format: r.u16()?,
            source_format: r.u16()?,
            window_type: r.u16()?,
            bin_count: r.u32()?,
            window_length: r.u32()?,
            overlap: r.u32()?,
            frame_align: r.u32()?,
            analysis_rate: r.f32()?,
            window_param: r.f32()?,
        })
    }
}

impl FmtChunk {
    pub fn parse(data: &[u8], byte_order: Endianness) -> Result<Self, ChunkDecodeError> {
        let size = data.len();
        let mut r = FieldReader::new(ids::FMT_, data, byte_order);
        let format_tag = r.u16()?;
        let channels = r.u16()?;
        let sample_rate = r.u32()?;
        let byte_rate = r.u32()?;
        let block_align = r.u16()?;
        let bits_per_sample = r.u16()?;
        let mut sanity = Vec::<SanityNote>::new();
        let location = format!("{FMT_LOCATION} -- AUDIO FORMAT / SIZE");

        let (mode, extension) = if format_tag == FORMAT_TAG_EXTENSIBLE {
            let ext_size = r.u16()?;
            let valid_bits_per_sample = r.u16()?;
            let channel_mask = r.u32()?;
            let guid_bytes = r.bytes(16)?;
            let sub_format_code = FieldReader::new(ids::FMT_, guid_bytes, byte_order).u16()?;
            let sub_format = GUID::read(&mut FieldReader::new(ids::FMT_, guid_bytes, byte_order))?;
            let mut mode = FmtMode::Extensible;
            let mut pvoc_ex = None;
            if sub_format == GUID_PVOC_EX_FORMAT {
                if size == 80 {
                    pvoc_ex = Some(PvocExData::read(&mut r)?);
                    mode = FmtMode::PvocEx;
                } else {
                    sanity.push(SanityNote::new(
                        location.clone(),
                        format!("PVOC-EX FORMAT MUST BE SIZE 80 NOT {size}."),
                    ));
                }
            } else if size != 40 {
                sanity.push(SanityNote::new(
                    location.clone(),
                    format!("AUDIO FORMAT (EXTENSIBLE / 65534 / 0xFFFE) MUST BE SIZE 40 NOT {size}."),
                ));
            }
            (
                Some(mode),
                Some(FmtChunkExtension {
                    ext_size,
                    data: ExtensionData::Extensible(FmtChunkExtensible {
                        valid_bits_per_sample,
                        channel_mask,
                        sub_format,
                        sub_format_code,
                        pvoc_ex,
                    }),
                }),
            )
        } else if size == 16 {
            if format_tag != FORMAT_TAG_PCM {
                sanity.push(SanityNote::new(
                    location.clone(),
                    "NON-PCM FORMATS MUST CONTAIN AN EXTENSION FIELD.",
                ));
                (None, None)
            } else {
                (Some(FmtMode::Pcm), None)
            }
        } else if size >= 18 && (format_tag != FORMAT_TAG_PCM || size == 18) {
            let ext_size = r.u16()?;
            let rest = r.rest();
            if ext_size as usize > rest.len() {
                sanity.push(SanityNote::new(
                    format!("{FMT_LOCATION} -- EXTENSION SIZE"),
                    format!("THE EXTENSION CLAIMS {ext_size} BYTES BUT ONLY {} ARE PRESENT.", rest.len()),
                ));
            }
            let extra = &rest[..rest.len().min(ext_size as usize)];
            (
                Some(FmtMode::Extended),
                Some(FmtChunkExtension {
                    ext_size,
                    data: ExtensionData::Extended(extra.to_vec()),
                }),
            )
        } else {
            sanity.push(SanityNote::new(
                location.clone(),
                format!("AUDIO FORMAT (PCM / 1 / 0x0001) MUST BE SIZE 16 NOT {size}."),
            ));
            let mode = if format_tag == FORMAT_TAG_PCM { Some(FmtMode::Pcm) } else { None };
            (mode, None)
        };

        Ok(Self {
            format_tag,
            channels,
            sample_rate,
            byte_rate,
            block_align,
            bits_per_sample,
            mode,
            extension,
            sanity,
        })
    }

    pub fn extensible(&self) -> Option<&FmtChunkExtensible> {
        match &self.extension {
            Some(FmtChunkExtension {
                data: ExtensionData::Extensible(extensible),
                ..
            }) => Some(extensible),
            _ => None,
        }
    }

    /// * The format tag that tells the sample encoding, taken from the sub format for extensible formats.
    pub fn effective_format_tag(&self) -> u16 {
        match self.extensible() {
            Some(extensible) => extensible.sub_format_code,
            None => self.format_tag,
        }
    }

    pub fn encoding_name(&self) -> &'static str {
        format_tag_name(self.effective_format_tag())
    }

    /// * PCM and IEEE float need no `fact` chunk to tell the sample count.
    pub fn is_uncompressed(&self) -> bool {
        matches!(self.effective_format_tag(), FORMAT_TAG_PCM | FORMAT_TAG_IEEE_FLOAT)
    }

    pub fn speaker_layout(&self) -> Vec<SpeakerPosition> {
        match self.extensible() {
            Some(extensible) => SpeakerPosition::from_mask(extensible.channel_mask),
            None => Vec::new(),
        }
    }

    /// * Bits per second
    pub fn bitrate(&self) -> u64 {
        self.byte_rate as u64 * 8
    }
}

pub(crate) fn decode_fmt(record: &ChunkRecord, ctx: &DecodeContext) -> Result<DecodedChunk, ChunkDecodeError> {
    Ok(DecodedChunk::Fmt(FmtChunk::parse(payload(record)?, ctx.byte_order())?))
}

/// * Whether the `fact` sample length means anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactSignificance {
    /// * The preceding `fmt ` chunk is compressed, the sample length is required to know the duration.
    Meaningful,

    /// * The preceding `fmt ` chunk is PCM or IEEE float, the chunk is only there because it was once required.
    Placeholder,

    /// * No `fmt ` chunk came before it.
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactChunk {
    pub sample_length: u64,
    pub significance: FactSignificance,
}

pub(crate) fn decode_fact(record: &ChunkRecord, ctx: &DecodeContext) -> Result<DecodedChunk, ChunkDecodeError> {
    let data = payload(record)?;
    let mut r = ctx.fields(record.id, data);
    let sample_length = if data.len() >= 8 {
        r.u64()?
    } else {
        let raw = r.u32()?;
        match ctx.size_table {
            Some(table) if raw == SIZE_PLACEHOLDER && ctx.header.is_64bit() => table.sample_count,
            _ => raw as u64,
        }
    };
    let significance = match ctx.format() {
        Some(fmt) if fmt.is_uncompressed() => FactSignificance::Placeholder,
        Some(_) => FactSignificance::Meaningful,
        None => FactSignificance::Unknown,
    };
    Ok(DecodedChunk::Fact(FactChunk {
        sample_length,
        significance,
    }))
}

/// * The `data` chunk, only its size is looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataChunk {
    pub byte_count: u64,

    /// * Known when a `fmt ` chunk with a non-zero block align came before.
    pub frame_count: Option<u64>,
}

pub(crate) fn decode_data(record: &ChunkRecord, ctx: &DecodeContext) -> Result<DecodedChunk, ChunkDecodeError> {
    let frame_count = ctx
        .format()
        .filter(|fmt| fmt.block_align != 0)
        .map(|fmt| record.size / fmt.block_align as u64);
    Ok(DecodedChunk::Data(DataChunk {
        byte_count: record.size,
        frame_count,
    }))
}
