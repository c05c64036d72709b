//! * The decoded chunk types. Each chunk family has its own module, `DecodedChunk` ties them together.

mod bext;
mod cue;
mod fmt;
mod list;
mod misc;
mod sampler;

#[cfg(feature = "id3")]
mod id3tag;

pub use bext::{BextChunk, BextLoudness, CartChunk, CartPostTimer};
pub use cue::{Cue, CueChunk};
pub use fmt::{
    DataChunk, ExtensionData, FORMAT_TAG_EXTENSIBLE, FORMAT_TAG_IEEE_FLOAT, FORMAT_TAG_PCM, FactChunk, FactSignificance,
    FmtChunk, FmtChunkExtensible, FmtChunkExtension, FmtMode, GUID, GUID_IEEE_FLOAT_FORMAT, GUID_PCM_FORMAT, GUID_PVOC_EX_FORMAT, PvocExData, SpeakerPosition, format_tag_name,
};
pub use list::{AdtlChunk, AdtlEntry, InfoChunk, LablChunk, ListChunk, ListContent, LtxtChunk, NoteChunk};
pub use misc::{ChnaChunk, ChnaTrack, DispChunk, JunkChunk, LevlChunk, Md5Chunk, XmlChunk};
pub use sampler::{AcidChunk, InstChunk, SmplChunk, SmplSampleLoop, StrcChunk, StrcSlice};

#[cfg(feature = "id3")]
pub use id3tag::Id3Chunk;

pub(crate) use bext::{decode_bext, decode_cart};
pub(crate) use cue::decode_cue;
pub(crate) use fmt::{decode_data, decode_fact, decode_fmt};
pub(crate) use list::decode_list;
pub(crate) use misc::{decode_chna, decode_disp, decode_junk, decode_levl, decode_md5, decode_xml};
pub(crate) use sampler::{decode_acid, decode_inst, decode_smpl, decode_strc};

#[cfg(feature = "id3")]
pub(crate) use id3tag::decode_id3;

use crate::errors::{ChunkDecodeError, SanityNote};
use crate::fourcc::FourCC;
use crate::walker::ChunkRecord;

/// * A chunk without a decoder, or one whose decoder failed. The raw bytes are kept either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericChunk {
    pub id: FourCC,
    pub size: u64,

    /// * Empty when the payload was deferred.
    pub data: Vec<u8>,

    /// * Why the decoder failed, `None` for chunks that simply have no decoder.
    pub error: Option<ChunkDecodeError>,
}

impl GenericChunk {
    pub fn from_record(record: &ChunkRecord, error: Option<ChunkDecodeError>) -> Self {
        Self {
            id: record.id,
            size: record.size,
            data: record.data().map(|data| data.to_vec()).unwrap_or_default(),
            error,
        }
    }
}

/// * A decoded chunk, one variant per chunk family.
#[derive(Debug, Clone)]
pub enum DecodedChunk {
    Fmt(FmtChunk),
    Fact(FactChunk),
    Data(DataChunk),
    List(ListChunk),
    Cue(CueChunk),
    Bext(BextChunk),
    Cart(CartChunk),
    Smpl(SmplChunk),
    Inst(InstChunk),
    Acid(AcidChunk),
    Levl(LevlChunk),
    Chna(ChnaChunk),
    Strc(StrcChunk),
    Disp(DispChunk),
    Xml(XmlChunk),
    Md5(Md5Chunk),
    #[cfg(feature = "id3")]
    Id3(Id3Chunk),
    Junk(JunkChunk),
    Generic(GenericChunk),
}

macro_rules! as_variant {
    ($func:ident, $variant:ident, $type:ty) => {
        pub fn $func(&self) -> Option<&$type> {
            match self {
                Self::$variant(chunk) => Some(chunk),
                _ => None,
            }
        }
    };
}

impl DecodedChunk {
    as_variant!(as_fmt, Fmt, FmtChunk);
    as_variant!(as_fact, Fact, FactChunk);
    as_variant!(as_data, Data, DataChunk);
    as_variant!(as_list, List, ListChunk);
    as_variant!(as_cue, Cue, CueChunk);
    as_variant!(as_bext, Bext, BextChunk);
    as_variant!(as_cart, Cart, CartChunk);
    as_variant!(as_smpl, Smpl, SmplChunk);
    as_variant!(as_inst, Inst, InstChunk);
    as_variant!(as_acid, Acid, AcidChunk);
    as_variant!(as_levl, Levl, LevlChunk);
    as_variant!(as_chna, Chna, ChnaChunk);
    as_variant!(as_strc, Strc, StrcChunk);
    as_variant!(as_disp, Disp, DispChunk);
    as_variant!(as_xml, Xml, XmlChunk);
    as_variant!(as_md5, Md5, Md5Chunk);
    as_variant!(as_junk, Junk, JunkChunk);
    as_variant!(as_generic, Generic, GenericChunk);

    #[cfg(feature = "id3")]
    as_variant!(as_id3, Id3, Id3Chunk);

    pub fn is_generic(&self) -> bool {
        matches!(self, Self::Generic(_))
    }

    /// * The decode failure of a downgraded chunk.
    pub fn error(&self) -> Option<&ChunkDecodeError> {
        match self {
            Self::Generic(generic) => generic.error.as_ref(),
            _ => None,
        }
    }

    /// * Non-fatal findings recorded while decoding.
    pub fn sanity(&self) -> &[SanityNote] {
        match self {
            Self::Fmt(fmt) => &fmt.sanity,
            Self::List(list) => &list.sanity,
            Self::Strc(strc) => &strc.sanity,
            _ => &[],
        }
    }
}

/// * The payload of a record, or `ChunkDecodeError::Deferred` if it was left in the stream.
pub(crate) fn payload(record: &ChunkRecord) -> Result<&[u8], ChunkDecodeError> {
    record.data().ok_or(ChunkDecodeError::Deferred(record.id))
}
