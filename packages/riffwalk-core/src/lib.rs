mod fields;
mod options;
mod registry;
mod resolver;
mod walker;

/// * Errors returned from most of the function in this library.
pub mod errors;

/// * Four-character chunk identifiers and the well-known ones.
pub mod fourcc;

/// * The decoded chunk types.
pub mod chunks;

pub use errors::{ChunkDecodeError, IOErrorInfo, SanityNote, WalkError};
pub use fields::FieldReader;
pub use fourcc::{FourCC, ids};
pub use options::{DecodeOptions, WalkOptions};
pub use registry::{ChunkDecoder, ChunkKey, ChunkMap, DecodeContext, DecodeResult, DecoderRegistry};
pub use resolver::{Endianness, MasterKind, SIZE_PLACEHOLDER, SizeRole, SizeTable, byte_order_for_master, resolve_size};
pub use walker::{CHUNK_HEADER_SIZE, ChunkRecord, ChunkWalker, MASTER_HEADER_SIZE, MasterHeader, Payload, SubChunks};

use std::io::{Read, Seek};

/// * Decode a stream with every built-in decoder and the default options.
pub fn decode<R>(reader: R) -> Result<DecodeResult, WalkError>
where
    R: Read + Seek,
{
    DecoderRegistry::new().decode(reader)
}
