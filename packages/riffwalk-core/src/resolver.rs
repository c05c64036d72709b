use std::fmt::{self, Display, Formatter};
use std::io::{self, Read};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};

use crate::errors::WalkError;
use crate::fourcc::{FourCC, ids};

/// * The 32-bit size value that means "look up the real size in the `ds64` chunk".
pub const SIZE_PLACEHOLDER: u32 = 0xFFFFFFFF;

/// * The byte order of every multi-byte field inside a container, fixed by the master identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    pub fn read_u16<R: Read + ?Sized>(self, reader: &mut R) -> io::Result<u16> {
        match self {
            Self::Little => reader.read_u16::<LittleEndian>(),
            Self::Big => reader.read_u16::<BigEndian>(),
        }
    }

    pub fn read_u32<R: Read + ?Sized>(self, reader: &mut R) -> io::Result<u32> {
        match self {
            Self::Little => reader.read_u32::<LittleEndian>(),
            Self::Big => reader.read_u32::<BigEndian>(),
        }
    }

    pub fn u32_bytes(self, value: u32) -> [u8; 4] {
        match self {
            Self::Little => value.to_le_bytes(),
            Self::Big => value.to_be_bytes(),
        }
    }
}

/// * Which RIFF family member a stream is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MasterKind {
    Riff,
    Rifx,
    Rf64,
    Bw64,
}

impl MasterKind {
    /// * `FIRR` is what a byte-swapped `RIFX` looks like, it's accepted as big-endian too.
    pub fn from_master_id(id: FourCC) -> Result<Self, WalkError> {
        match id.as_bytes() {
            b"RIFF" => Ok(Self::Riff),
            b"RIFX" | b"FIRR" => Ok(Self::Rifx),
            b"RF64" => Ok(Self::Rf64),
            b"BW64" => Ok(Self::Bw64),
            _ => Err(WalkError::UnknownMaster(id)),
        }
    }

    pub fn endianness(&self) -> Endianness {
        match self {
            Self::Rifx => Endianness::Big,
            _ => Endianness::Little,
        }
    }

    /// * Only these variants may carry placeholder sizes resolved through a size table.
    pub fn is_64bit(&self) -> bool {
        matches!(self, Self::Rf64 | Self::Bw64)
    }
}

/// * Determine the byte order from the master identifier.
pub fn byte_order_for_master(id: FourCC) -> Result<Endianness, WalkError> {
    Ok(MasterKind::from_master_id(id)?.endianness())
}

/// * Which size a placeholder stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeRole {
    Container,
    Data,
    SampleCount,
    Table(FourCC),
}

impl SizeRole {
    /// * The role of a chunk's own size field. `data` has a dedicated slot in the `ds64` chunk, others go through its table.
    pub fn of_chunk(id: FourCC) -> Self {
        if id == ids::DATA {
            Self::Data
        } else {
            Self::Table(id)
        }
    }
}

impl Display for SizeRole {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Container => write!(f, "container size"),
            Self::Data => write!(f, "data size"),
            Self::SampleCount => write!(f, "sample count"),
            Self::Table(id) => write!(f, "table entry for \"{id}\""),
        }
    }
}

/// * The content of a `ds64` chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeTable {
    pub riff_size: u64,
    pub data_size: u64,
    pub sample_count: u64,
    pub table: Vec<(FourCC, u64)>,
}

impl SizeTable {
    /// * The fixed part of a `ds64` chunk: three 64-bit values and the table length.
    pub const MIN_SIZE: usize = 28;

    /// * Parse the payload of a `ds64` chunk. Each 64-bit value is stored as a low and a high 32-bit half.
    pub fn parse(payload: &[u8], endianness: Endianness) -> Result<Self, WalkError> {
        if payload.len() < Self::MIN_SIZE {
            return Err(WalkError::Structural(format!(
                "the size of the \"ds64\" chunk is {} bytes, too small to contain the size table",
                payload.len()
            )));
        }
        let mut reader = payload;
        let read_u64 = |reader: &mut &[u8]| -> io::Result<u64> {
            let low = endianness.read_u32(reader)? as u64;
            let high = endianness.read_u32(reader)? as u64;
            Ok(low | (high << 32))
        };
        let riff_size = read_u64(&mut reader)?;
        let data_size = read_u64(&mut reader)?;
        let sample_count = read_u64(&mut reader)?;
        let entry_count = endianness.read_u32(&mut reader)? as usize;
        let available = reader.len() / 12;
        if entry_count > available {
            log::warn!(
                "The \"ds64\" chunk claims {entry_count} table entries but only {available} fit in it."
            );
        }
        let mut table = Vec::with_capacity(entry_count.min(available));
        for _ in 0..entry_count.min(available) {
            let mut id = [0u8; 4];
            reader.read_exact(&mut id)?;
            let size = read_u64(&mut reader)?;
            table.push((FourCC(id), size));
        }
        Ok(Self {
            riff_size,
            data_size,
            sample_count,
            table,
        })
    }

    /// * Find the 64-bit value for a role. The first table entry of an identifier wins.
    pub fn lookup(&self, role: SizeRole) -> Option<u64> {
        match role {
            SizeRole::Container => Some(self.riff_size),
            SizeRole::Data => Some(self.data_size),
            SizeRole::SampleCount => Some(self.sample_count),
            SizeRole::Table(id) => self
                .table
                .iter()
                .find(|(entry_id, _)| *entry_id == id)
                .map(|(_, size)| *size),
        }
    }
}

/// * Resolve a 32-bit size field into the real 64-bit size.
/// * A placeholder in a 64-bit variant must be found in the size table, anywhere else the value is zero-extended.
pub fn resolve_size(
    id: FourCC,
    raw: u32,
    role: SizeRole,
    is_64bit: bool,
    table: Option<&SizeTable>,
) -> Result<u64, WalkError> {
    if raw != SIZE_PLACEHOLDER || !is_64bit {
        return Ok(raw as u64);
    }
    match table.and_then(|table| table.lookup(role)) {
        Some(size) => Ok(size),
        None => Err(WalkError::UnresolvedSize { id, role }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ds64_payload(entries: &[(&[u8; 4], u64)]) -> Vec<u8> {
        let mut v = Vec::new();
        for value in [0x1_0000_0010u64, 0x1_0000_0000u64, 0x4000_0000u64] {
            v.extend_from_slice(&(value as u32).to_le_bytes());
            v.extend_from_slice(&((value >> 32) as u32).to_le_bytes());
        }
        v.extend_from_slice(&(entries.len() as u32).to_le_bytes());
        for (id, size) in entries {
            v.extend_from_slice(*id);
            v.extend_from_slice(&(*size as u32).to_le_bytes());
            v.extend_from_slice(&((*size >> 32) as u32).to_le_bytes());
        }
        v
    }

    #[test]
    fn master_byte_orders() {
        assert_eq!(byte_order_for_master(ids::RIFF), Ok(Endianness::Little));
        assert_eq!(byte_order_for_master(ids::RF64), Ok(Endianness::Little));
        assert_eq!(byte_order_for_master(ids::BW64), Ok(Endianness::Little));
        assert_eq!(byte_order_for_master(ids::RIFX), Ok(Endianness::Big));
        assert_eq!(byte_order_for_master(ids::FIRR), Ok(Endianness::Big));
        assert_eq!(
            byte_order_for_master(FourCC::new(b"FORM")),
            Err(WalkError::UnknownMaster(FourCC::new(b"FORM")))
        );
    }

    #[test]
    fn parse_size_table() {
        let table = SizeTable::parse(&ds64_payload(&[(b"JUNK", 0x2_0000_0000)]), Endianness::Little).unwrap();
        assert_eq!(table.riff_size, 0x1_0000_0010);
        assert_eq!(table.data_size, 0x1_0000_0000);
        assert_eq!(table.sample_count, 0x4000_0000);
        assert_eq!(table.lookup(SizeRole::Table(ids::JUNK)), Some(0x2_0000_0000));
        assert_eq!(table.lookup(SizeRole::Table(ids::LIST)), None);
    }

    #[test]
    fn short_size_table_is_structural() {
        assert!(matches!(
            SizeTable::parse(&[0u8; 20], Endianness::Little),
            Err(WalkError::Structural(_))
        ));
    }

    #[test]
    fn placeholder_resolution() {
        let table = SizeTable::parse(&ds64_payload(&[]), Endianness::Little).unwrap();
        assert_eq!(
            resolve_size(ids::DATA, SIZE_PLACEHOLDER, SizeRole::Data, true, Some(&table)),
            Ok(0x1_0000_0000)
        );
        assert_eq!(
            resolve_size(ids::DATA, 1234, SizeRole::Data, true, Some(&table)),
            Ok(1234)
        );
        // A plain RIFF never consults a size table.
        assert_eq!(
            resolve_size(ids::DATA, SIZE_PLACEHOLDER, SizeRole::Data, false, None),
            Ok(0xFFFFFFFF)
        );
        assert_eq!(
            resolve_size(ids::JUNK, SIZE_PLACEHOLDER, SizeRole::Table(ids::JUNK), true, Some(&table)),
            Err(WalkError::UnresolvedSize {
                id: ids::JUNK,
                role: SizeRole::Table(ids::JUNK)
            })
        );
        assert!(resolve_size(ids::DATA, SIZE_PLACEHOLDER, SizeRole::Data, true, None).is_err());
    }
}
