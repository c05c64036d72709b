use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::errors::ChunkDecodeError;
use crate::fourcc::FourCC;
use crate::resolver::Endianness;

/// * Reads fixed-width fields from a chunk payload in the container's byte order.
/// * Running out of bytes gives `ChunkDecodeError::TooShort` naming the chunk.
#[derive(Debug, Clone)]
pub struct FieldReader<'a> {
    id: FourCC,
    data: &'a [u8],
    pos: usize,
    order: Endianness,
}

macro_rules! read_field {
    ($name:ident, $type:ty, $size:expr, $read:ident) => {
        pub fn $name(&mut self) -> Result<$type, ChunkDecodeError> {
            let bytes = self.bytes($size)?;
            Ok(match self.order {
                Endianness::Little => LittleEndian::$read(bytes),
                Endianness::Big => BigEndian::$read(bytes),
            })
        }
    };
}

impl<'a> FieldReader<'a> {
    pub fn new(id: FourCC, data: &'a [u8], order: Endianness) -> Self {
        Self { id, data, pos: 0, order }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// * Take `len` bytes.
    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8], ChunkDecodeError> {
        let end = self.pos + len;
        if end > self.data.len() {
            return Err(ChunkDecodeError::TooShort {
                id: self.id,
                needed: end,
                got: self.data.len(),
            });
        }
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], ChunkDecodeError> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.bytes(N)?);
        Ok(array)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), ChunkDecodeError> {
        self.bytes(len).map(|_| ())
    }

    /// * Everything left, may be empty.
    pub fn rest(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos..];
        self.pos = self.data.len();
        rest
    }

    pub fn fourcc(&mut self) -> Result<FourCC, ChunkDecodeError> {
        Ok(FourCC(self.array::<4>()?))
    }

    pub fn u8(&mut self) -> Result<u8, ChunkDecodeError> {
        Ok(self.bytes(1)?[0])
    }

    pub fn i8(&mut self) -> Result<i8, ChunkDecodeError> {
        Ok(self.u8()? as i8)
    }

    read_field!(u16, u16, 2, read_u16);
    read_field!(i16, i16, 2, read_i16);
    read_field!(u32, u32, 4, read_u32);
    read_field!(i32, i32, 4, read_i32);
    read_field!(u64, u64, 8, read_u64);
    read_field!(f32, f32, 4, read_f32);
    read_field!(u128, u128, 16, read_u128);

    /// * A 64-bit value stored as a low and a high 32-bit half, as in `bext` and `ds64`.
    pub fn u64_split(&mut self) -> Result<u64, ChunkDecodeError> {
        let low = self.u32()? as u64;
        let high = self.u32()? as u64;
        Ok(low | (high << 32))
    }
}
