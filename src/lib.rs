//! * Walk and decode RIFF-family containers: `RIFF`, `RIFX`, `RF64`, `BW64` and Broadcast Wave.
//! * Every chunk is enumerated in stream order. The well-known ones are decoded, the rest are kept as generic records.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub use riffwalk_core::{ChunkRecord, ChunkWalker, DecodeResult, DecoderRegistry, MasterHeader, Payload, decode};
pub use riffwalk_core::{DecodeContext, ChunkDecoder, ChunkKey, ChunkMap, FieldReader};
pub use riffwalk_core::{Endianness, FourCC, MasterKind, SizeRole, SizeTable, SubChunks};

/// * Errors returned from most of the function in this library.
pub mod errors {
    pub use riffwalk_core::errors::{ChunkDecodeError, IOErrorInfo, SanityNote, WalkError};
}

/// * Walker and decoder options
pub mod options {
    pub use riffwalk_core::{DecodeOptions, WalkOptions};
}

/// * Well-known chunk identifiers
pub mod ids {
    pub use riffwalk_core::ids::*;
}

/// * Decoded chunks
pub mod chunks {
    pub use riffwalk_core::chunks::{
        DecodedChunk,
        GenericChunk,
        FmtChunk,
        FactChunk,
        FactSignificance,
        DataChunk,
        ListChunk,
        ListContent,
        InfoChunk,
        AdtlChunk,
        AdtlEntry,
        LablChunk,
        NoteChunk,
        LtxtChunk,
        CueChunk,
        Cue,
        BextChunk,
        BextLoudness,
        CartChunk,
        CartPostTimer,
        SmplChunk,
        SmplSampleLoop,
        InstChunk,
        AcidChunk,
        StrcChunk,
        StrcSlice,
        LevlChunk,
        ChnaChunk,
        ChnaTrack,
        DispChunk,
        XmlChunk,
        Md5Chunk,
        JunkChunk,
    };

    #[cfg(feature = "id3")]
    pub use riffwalk_core::chunks::Id3Chunk;

    /// * `fmt ` chunk extension data
    pub mod ext {
        pub use riffwalk_core::chunks::{ExtensionData, FmtChunkExtensible, FmtChunkExtension, FmtMode, PvocExData, SpeakerPosition};
    }

    /// * Format GUIDs of the extensible `fmt ` chunk
    pub mod guids {
        pub use riffwalk_core::chunks::{GUID, GUID_IEEE_FLOAT_FORMAT, GUID_PCM_FORMAT, GUID_PVOC_EX_FORMAT};
    }

    /// * Format tags of the `fmt ` chunk that change how it's read
    pub mod format_tags {
        pub use riffwalk_core::chunks::{FORMAT_TAG_EXTENSIBLE, FORMAT_TAG_IEEE_FLOAT, FORMAT_TAG_PCM, format_tag_name};
    }
}

/// * Misc utilities
pub mod utils {
    pub use riffwalk_core::{SIZE_PLACEHOLDER, CHUNK_HEADER_SIZE, MASTER_HEADER_SIZE, byte_order_for_master, resolve_size};

    // * A string encode/decode library that sometimes do things savagely
    pub use savagestr::{SavageStringCodecs, StringCodecMaps};
}

/// * Open a file and decode it with every built-in decoder.
pub fn open<P: AsRef<Path>>(path: P) -> Result<DecodeResult, errors::WalkError> {
    let file = File::open(path)?;
    decode(BufReader::new(file))
}

/// * Open a file and decode it with custom options.
pub fn open_with_options<P: AsRef<Path>>(path: P, options: options::DecodeOptions) -> Result<DecodeResult, errors::WalkError> {
    let file = File::open(path)?;
    DecoderRegistry::with_options(options).decode(BufReader::new(file))
}
