use std::io::{Cursor, Read, Seek, SeekFrom};

use crate::errors::WalkError;
use crate::fourcc::{FourCC, ids};
use crate::options::WalkOptions;
use crate::resolver::{Endianness, MasterKind, SIZE_PLACEHOLDER, SizeRole, SizeTable, resolve_size};

/// * Chunk ID + chunk size
pub const CHUNK_HEADER_SIZE: u64 = 8;

/// * Master ID + master size + form type
pub const MASTER_HEADER_SIZE: u64 = 12;

/// * The prologue of a RIFF-family stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterHeader {
    pub master_id: FourCC,
    pub kind: MasterKind,
    pub byte_order: Endianness,
    pub form_type: FourCC,

    /// * The size field as stored, `0xFFFFFFFF` for most RF64 files.
    pub size_field: u32,

    /// * The zero-extended size field. See `ChunkWalker::container_size()` for the resolved one.
    pub declared_size: u64,

    /// * Where the master header starts in the stream.
    pub offset: u64,
}

impl MasterHeader {
    pub fn read<R: Read + ?Sized>(reader: &mut R, offset: u64) -> Result<Self, WalkError> {
        let mut master_id = [0u8; 4];
        reader.read_exact(&mut master_id)?;
        let master_id = FourCC(master_id);
        let kind = MasterKind::from_master_id(master_id)?;
        let byte_order = kind.endianness();
        let size_field = byte_order.read_u32(reader)?;
        let mut form_type = [0u8; 4];
        reader.read_exact(&mut form_type)?;
        Ok(Self {
            master_id,
            kind,
            byte_order,
            form_type: FourCC(form_type),
            size_field,
            declared_size: size_field as u64,
            offset,
        })
    }

    /// * A placeholder master size turns any variant into one whose sizes come from `ds64`.
    pub fn is_64bit(&self) -> bool {
        self.kind.is_64bit() || self.size_field == SIZE_PLACEHOLDER
    }

    pub fn to_bytes(&self) -> [u8; 12] {
        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(self.master_id.as_bytes());
        bytes[4..8].copy_from_slice(&self.byte_order.u32_bytes(self.size_field));
        bytes[8..12].copy_from_slice(self.form_type.as_bytes());
        bytes
    }
}

/// * The payload of a chunk record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Loaded(Vec<u8>),

    /// * Left in the stream, see `ChunkRecord::load_payload()`
    Deferred,
}

/// * One chunk as found in the stream. Identifiers repeat, the arrival order is the only disambiguator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRecord {
    pub id: FourCC,

    /// * The resolved 64-bit size, the length of the payload.
    pub size: u64,

    /// * The size field as stored in the chunk header. For `afsp`, which has none, the four bytes after the identifier.
    pub size_field: u32,

    /// * Where the chunk header starts in the stream.
    pub offset: u64,

    pub payload: Payload,

    /// * The pad byte after an odd-sized payload, if there is one.
    pub pad_byte: Option<u8>,
}

impl ChunkRecord {
    pub fn data_offset(&self) -> u64 {
        self.offset + CHUNK_HEADER_SIZE
    }

    pub fn data(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::Loaded(data) => Some(data),
            Payload::Deferred => None,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self.payload, Payload::Deferred)
    }

    /// * The bytes this chunk occupies in the stream: header, payload and pad byte.
    pub fn stream_size(&self) -> u64 {
        CHUNK_HEADER_SIZE + self.size + self.pad_byte.map_or(0, |_| 1)
    }

    /// * Read the payload from the stream the record came from. Works for loaded records too.
    pub fn load_payload<R: Read + Seek + ?Sized>(&self, reader: &mut R) -> Result<Vec<u8>, WalkError> {
        if let Payload::Loaded(data) = &self.payload {
            return Ok(data.clone());
        }
        reader.seek(SeekFrom::Start(self.data_offset()))?;
        let mut data = vec![0u8; payload_len(self.id, self.size)?];
        reader.read_exact(&mut data)?;
        Ok(data)
    }

    /// * Re-emit the chunk with its stored size field and pad byte. Fails for deferred records.
    pub fn to_bytes(&self, byte_order: Endianness) -> Option<Vec<u8>> {
        let data = self.data()?;
        let mut bytes = Vec::with_capacity(data.len() + 9);
        bytes.extend_from_slice(self.id.as_bytes());
        bytes.extend_from_slice(&byte_order.u32_bytes(self.size_field));
        bytes.extend_from_slice(data);
        if let Some(pad) = self.pad_byte {
            bytes.push(pad);
        }
        Some(bytes)
    }
}

/// * How much of the stream is read at once while looking for the end of an `afsp` chunk.
const AFSP_SCAN_BLOCK: usize = 4096;

fn payload_len(id: FourCC, size: u64) -> Result<usize, WalkError> {
    usize::try_from(size).map_err(|_| {
        WalkError::Structural(format!(
            "the \"{id}\" chunk of {size} bytes can't be held in memory on this platform"
        ))
    })
}

/// * Reads consecutive chunk headers inside one window of a stream.
#[derive(Debug)]
struct ChunkStream<R> {
    reader: R,
    byte_order: Endianness,
    position: u64,
    end: u64,
    base: u64,
}

impl<R> ChunkStream<R>
where
    R: Read + Seek,
{
    fn next_record(
        &mut self,
        is_64bit: bool,
        table: Option<&SizeTable>,
        options: &WalkOptions,
    ) -> Result<Option<ChunkRecord>, WalkError> {
        loop {
            let remaining = self.end.saturating_sub(self.position);
            if remaining < CHUNK_HEADER_SIZE {
                if remaining > 0 {
                    log::warn!(
                        "Ignored {remaining} bytes of trailing slack at 0x{:x}.",
                        self.base + self.position
                    );
                }
                return Ok(None);
            }

            let offset = self.base + self.position;
            self.reader.seek(SeekFrom::Start(self.position))?;
            let mut id = [0u8; 4];
            self.reader.read_exact(&mut id)?;
            let id = FourCC(id);
            let size_field = self.byte_order.read_u32(&mut self.reader)?;
            if id == ids::AFSP {
                match self.afsp_record(offset, size_field, options)? {
                    Some(record) => return Ok(Some(record)),
                    None => continue,
                }
            }
            if id.is_null() {
                log::warn!("The chunk at 0x{offset:x} has a zeroed identifier.");
            }
            return self.sized_record(id, size_field, is_64bit, table, options).map(Some);
        }
    }

    // `afsp` is followed by text, not by a size. Its extent is up to the next `DISP` or `LIST`.
    fn afsp_record(
        &mut self,
        offset: u64,
        size_field: u32,
        options: &WalkOptions,
    ) -> Result<Option<ChunkRecord>, WalkError> {
        let start = self.position;
        let next = self.find_list_or_disp(start + 4)?.unwrap_or(self.end);
        if next < start + CHUNK_HEADER_SIZE {
            log::warn!(
                "Skipped {} bytes of an \"afsp\" chunk at 0x{offset:x}, a chunk starts inside its header.",
                next - start
            );
            self.position = next;
            return Ok(None);
        }

        let size = next - start - CHUNK_HEADER_SIZE;
        let payload = if options.is_deferred(ids::AFSP) {
            Payload::Deferred
        } else {
            let mut data = vec![0u8; payload_len(ids::AFSP, size)?];
            self.reader.seek(SeekFrom::Start(start + CHUNK_HEADER_SIZE))?;
            self.reader.read_exact(&mut data)?;
            Payload::Loaded(data)
        };
        self.position = next;
        log::debug!("Chunk \"afsp\" at 0x{offset:x}, size {size} (scanned)");
        Ok(Some(ChunkRecord {
            id: ids::AFSP,
            size,
            size_field,
            offset,
            payload,
            pad_byte: None,
        }))
    }

    // Position of the next `DISP` or `LIST` identifier at or after `from`, searching byte by byte.
    fn find_list_or_disp(&mut self, from: u64) -> Result<Option<u64>, WalkError> {
        let mut buf = vec![0u8; AFSP_SCAN_BLOCK];
        let mut pos = from;
        while self.end.saturating_sub(pos) >= 4 {
            let len = (self.end - pos).min(AFSP_SCAN_BLOCK as u64) as usize;
            self.reader.seek(SeekFrom::Start(pos))?;
            self.reader.read_exact(&mut buf[..len])?;
            let found = buf[..len]
                .windows(4)
                .position(|w| w == ids::DISP.as_bytes() || w == ids::LIST.as_bytes());
            if let Some(i) = found {
                return Ok(Some(pos + i as u64));
            }
            // Keep the last three bytes, an identifier may straddle the blocks.
            pos += len as u64 - 3;
        }
        Ok(None)
    }

    // Called with the reader right after the header at `self.position`.
    fn sized_record(
        &mut self,
        id: FourCC,
        size_field: u32,
        is_64bit: bool,
        table: Option<&SizeTable>,
        options: &WalkOptions,
    ) -> Result<ChunkRecord, WalkError> {
        let offset = self.base + self.position;
        let size = resolve_size(id, size_field, SizeRole::of_chunk(id), is_64bit, table)?;
        let available = self.end - self.position - CHUNK_HEADER_SIZE;
        if size > available {
            return Err(WalkError::Truncated {
                id,
                offset,
                declared: size,
                available,
            });
        }

        let payload = if options.is_deferred(id) {
            self.reader.seek(SeekFrom::Current(size as i64))?;
            Payload::Deferred
        } else {
            let mut data = vec![0u8; payload_len(id, size)?];
            self.reader.read_exact(&mut data)?;
            Payload::Loaded(data)
        };
        self.position += CHUNK_HEADER_SIZE + size;

        let pad_byte = if size & 1 == 1 && !options.is_unpadded(id) {
            if self.position < self.end {
                let mut pad = [0u8; 1];
                self.reader.read_exact(&mut pad)?;
                self.position += 1;
                Some(pad[0])
            } else {
                log::debug!("The pad byte of the \"{id}\" chunk at 0x{offset:x} is missing at the end of the stream.");
                None
            }
        } else {
            None
        };

        log::debug!("Chunk \"{id}\" at 0x{offset:x}, size {size}");
        Ok(ChunkRecord {
            id,
            size,
            size_field,
            offset,
            payload,
            pad_byte,
        })
    }
}

/// * The lazy chunk walker. Reads the master header on creation, then yields one record per chunk.
/// * After an error is yielded, the walker is exhausted.
#[derive(Debug)]
pub struct ChunkWalker<R> {
    stream: ChunkStream<R>,
    header: MasterHeader,
    size_table: Option<SizeTable>,
    size_table_offset: Option<u64>,
    options: WalkOptions,
    stream_end: u64,

    /// * The declared end of the container, until a chunk is found past it.
    container_end: Option<u64>,
    finished: bool,
}

impl<R> ChunkWalker<R>
where
    R: Read + Seek,
{
    pub fn new(reader: R) -> Result<Self, WalkError> {
        Self::with_options(reader, WalkOptions::default())
    }

    /// * The walk starts at the current position of the reader.
    pub fn with_options(mut reader: R, options: WalkOptions) -> Result<Self, WalkError> {
        let start = reader.stream_position()?;
        let stream_end = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(start))?;
        if stream_end.saturating_sub(start) < MASTER_HEADER_SIZE {
            return Err(WalkError::Structural(format!(
                "the stream is {} bytes long, too short for a master header",
                stream_end.saturating_sub(start)
            )));
        }

        let header = MasterHeader::read(&mut reader, start)?;
        let mut ret = Self {
            stream: ChunkStream {
                reader,
                byte_order: header.byte_order,
                position: start + MASTER_HEADER_SIZE,
                end: stream_end,
                base: 0,
            },
            header,
            size_table: None,
            size_table_offset: None,
            options,
            stream_end,
            container_end: None,
            finished: false,
        };
        if !ret.header.is_64bit() {
            ret.note_container_end(ret.header.declared_size);
        }
        log::debug!(
            "Master \"{}\" ({:?}), form \"{}\", declared size {}",
            ret.header.master_id,
            ret.header.byte_order,
            ret.header.form_type,
            ret.header.declared_size
        );
        Ok(ret)
    }

    // The declared size is only checked against, the walk always goes on to the end of the stream.
    // Zero sizes from streaming writers are not worth a warning.
    fn note_container_end(&mut self, container_size: u64) {
        self.container_end = None;
        if container_size < 4 {
            return;
        }
        let container_end = self
            .header
            .offset
            .checked_add(CHUNK_HEADER_SIZE)
            .and_then(|end| end.checked_add(container_size))
            .and_then(|end| end.checked_add(end & 1));
        match container_end {
            Some(container_end) if container_end <= self.stream_end => {
                self.container_end = Some(container_end);
            }
            _ => log::warn!(
                "The \"{}\" container claims {container_size} bytes, more than the stream has.",
                self.header.master_id
            ),
        }
    }

    fn check_container_end(&mut self, record: &ChunkRecord) {
        let chunk_end = record.offset + record.stream_size();
        if let Some(container_end) = self.container_end.filter(|&end| chunk_end > end) {
            log::warn!(
                "The \"{}\" chunk at 0x{:x} goes past the declared end of the \"{}\" container at 0x{container_end:x}.",
                record.id,
                record.offset,
                self.header.master_id
            );
            self.container_end = None;
        }
    }

    fn absorb_size_table(&mut self, record: &ChunkRecord) -> Result<(), WalkError> {
        if self.size_table.is_some() {
            log::warn!("Ignored a duplicated \"ds64\" chunk at 0x{:x}.", record.offset);
            return Ok(());
        }
        let Some(data) = record.data() else {
            return Err(WalkError::Structural(String::from("the \"ds64\" chunk was not loaded")));
        };
        let table = SizeTable::parse(data, self.header.byte_order)?;
        let riff_size = table.riff_size;
        self.size_table = Some(table);
        self.size_table_offset = Some(record.offset);
        if self.header.size_field == SIZE_PLACEHOLDER {
            self.note_container_end(riff_size);
        } else {
            self.note_container_end(self.header.declared_size);
        }
        Ok(())
    }

    pub fn header(&self) -> &MasterHeader {
        &self.header
    }

    pub fn master_id(&self) -> FourCC {
        self.header.master_id
    }

    pub fn byte_order(&self) -> Endianness {
        self.header.byte_order
    }

    pub fn form_type(&self) -> FourCC {
        self.header.form_type
    }

    /// * The `ds64` content, once the walk got past it.
    pub fn size_table(&self) -> Option<&SizeTable> {
        self.size_table.as_ref()
    }

    /// * Where the `ds64` record that became the size table starts. Other `ds64` records are plain chunks.
    pub fn size_table_offset(&self) -> Option<u64> {
        self.size_table_offset
    }

    /// * The container size, resolved through the size table when the master size is a placeholder.
    pub fn container_size(&self) -> Result<u64, WalkError> {
        resolve_size(
            self.header.master_id,
            self.header.size_field,
            SizeRole::Container,
            self.header.is_64bit(),
            self.size_table.as_ref(),
        )
    }

    pub fn options(&self) -> &WalkOptions {
        &self.options
    }

    /// * Load a deferred payload without disturbing the walk.
    pub fn load_payload(&mut self, record: &ChunkRecord) -> Result<Vec<u8>, WalkError> {
        let data = record.load_payload(&mut self.stream.reader)?;
        self.stream.reader.seek(SeekFrom::Start(self.stream.position))?;
        Ok(data)
    }

    pub fn into_inner(self) -> R {
        self.stream.reader
    }
}

impl<R> Iterator for ChunkWalker<R>
where
    R: Read + Seek,
{
    type Item = Result<ChunkRecord, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let is_64bit = self.header.is_64bit();
        let result = self
            .stream
            .next_record(is_64bit, self.size_table.as_ref(), &self.options)
            .and_then(|record| match record {
                Some(record) if record.id == ids::DS64 && is_64bit => {
                    self.absorb_size_table(&record)?;
                    Ok(Some(record))
                }
                other => Ok(other),
            });
        match result {
            Ok(Some(record)) => {
                self.check_container_end(&record);
                Some(Ok(record))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

impl<R> std::iter::FusedIterator for ChunkWalker<R> where R: Read + Seek {}

/// * Walks the sub-chunks of a list payload that is already in memory.
/// * Offsets of the records are absolute, `base_offset` is where the sub-chunks start in the outer stream.
#[derive(Debug)]
pub struct SubChunks<'a> {
    stream: ChunkStream<Cursor<&'a [u8]>>,
    options: WalkOptions,
    finished: bool,
}

impl<'a> SubChunks<'a> {
    pub fn new(data: &'a [u8], base_offset: u64, byte_order: Endianness) -> Self {
        Self {
            stream: ChunkStream {
                reader: Cursor::new(data),
                byte_order,
                position: 0,
                end: data.len() as u64,
                base: base_offset,
            },
            options: WalkOptions::default(),
            finished: false,
        }
    }
}

impl Iterator for SubChunks<'_> {
    type Item = Result<ChunkRecord, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.stream.next_record(false, None, &self.options) {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn chunk(id: &[u8; 4], data: &[u8]) -> Vec<u8> {
        let mut v = Vec::new();
        v.extend_from_slice(id);
        v.extend_from_slice(&(data.len() as u32).to_le_bytes());
        v.extend_from_slice(data);
        if data.len() & 1 == 1 {
            v.push(0);
        }
        v
    }

    fn riff(chunks: &[Vec<u8>]) -> Vec<u8> {
        let body: Vec<u8> = chunks.concat();
        let mut v = Vec::new();
        v.extend_from_slice(b"RIFF");
        v.extend_from_slice(&(body.len() as u32 + 4).to_le_bytes());
        v.extend_from_slice(b"WAVE");
        v.extend_from_slice(&body);
        v
    }

    #[test]
    fn walks_master_and_chunks() {
        let bytes = riff(&[chunk(b"fmt ", &[1u8; 16]), chunk(b"data", &[0u8; 4])]);
        let mut walker = ChunkWalker::new(Cursor::new(bytes)).unwrap();
        assert_eq!(walker.master_id(), ids::RIFF);
        assert_eq!(walker.form_type(), ids::WAVE);
        assert_eq!(walker.byte_order(), Endianness::Little);
        let first = walker.next().unwrap().unwrap();
        assert_eq!(first.id, ids::FMT_);
        assert_eq!(first.offset, 12);
        assert_eq!(first.data(), Some(&[1u8; 16][..]));
        let second = walker.next().unwrap().unwrap();
        assert_eq!(second.id, ids::DATA);
        assert_eq!(second.offset, 36);
        assert!(walker.next().is_none());
        assert!(walker.next().is_none());
    }

    #[test]
    fn odd_sizes_skip_the_pad_byte() {
        let bytes = riff(&[chunk(b"abcd", b"hello"), chunk(b"efgh", b"x!")]);
        let records: Vec<_> = ChunkWalker::new(Cursor::new(bytes))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].size, 5);
        assert_eq!(records[0].data().unwrap().len(), 5);
        assert_eq!(records[0].pad_byte, Some(0));
        assert_eq!(records[1].offset, 12 + 8 + 6);
    }

    #[test]
    fn trailing_slack_is_not_an_error() {
        let mut bytes = riff(&[chunk(b"data", &[0u8; 4])]);
        bytes.extend_from_slice(&[0u8; 5]);
        let records: Vec<_> = ChunkWalker::new(Cursor::new(bytes))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn zeroed_headers_are_walked_over() {
        let mut bytes = riff(&[chunk(b"data", &[0u8; 4])]);
        bytes.extend_from_slice(&[0u8; 32]);
        let len = bytes.len() as u32 - 8;
        bytes[4..8].copy_from_slice(&len.to_le_bytes());
        let records: Vec<_> = ChunkWalker::new(Cursor::new(bytes))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 5);
        assert!(records[1..].iter().all(|r| r.id.is_null() && r.size == 0));
        assert_eq!(records[4].offset, 12 + 12 + 24);
    }

    #[test]
    fn afsp_scan_crosses_read_blocks() {
        let mut afsp = b"afsp".to_vec();
        // The following "LIST" straddles the first two blocks read.
        afsp.extend(vec![b'x'; AFSP_SCAN_BLOCK - 2]);
        let bytes = riff(&[afsp, chunk(b"LIST", b"INFO")]);
        let records: Vec<_> = ChunkWalker::new(Cursor::new(bytes))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, ids::AFSP);
        assert_eq!(records[0].size, AFSP_SCAN_BLOCK as u64 - 6);
        assert_eq!(records[1].id, ids::LIST);
        assert_eq!(records[1].offset, 12 + 4 + AFSP_SCAN_BLOCK as u64 - 2);
    }

    #[test]
    fn afsp_cut_short_by_a_list_is_skipped() {
        let bytes = riff(&[b"afspxx".to_vec(), chunk(b"LIST", b"INFO")]);
        let records: Vec<_> = ChunkWalker::new(Cursor::new(bytes))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, ids::LIST);
        assert_eq!(records[0].offset, 12 + 6);
    }

    #[test]
    fn unknown_master_is_rejected() {
        let mut bytes = riff(&[]);
        bytes[0..4].copy_from_slice(b"FORM");
        assert!(matches!(
            ChunkWalker::new(Cursor::new(bytes)),
            Err(WalkError::UnknownMaster(_))
        ));
    }

    #[test]
    fn deferred_payload_loads_later() {
        let bytes = riff(&[chunk(b"data", &[7u8; 6]), chunk(b"tail", &[1u8; 2])]);
        let options = WalkOptions::default().with_deferred(ids::DATA);
        let mut walker = ChunkWalker::with_options(Cursor::new(bytes), options).unwrap();
        let data = walker.next().unwrap().unwrap();
        assert!(data.is_deferred());
        assert_eq!(data.size, 6);
        assert_eq!(walker.load_payload(&data).unwrap(), vec![7u8; 6]);
        let tail = walker.next().unwrap().unwrap();
        assert_eq!(tail.data(), Some(&[1u8; 2][..]));
    }

    #[test]
    fn skip_optional_defers_pro_tools_chunks() {
        let bytes = riff(&[chunk(b"minf", &[1u8; 16]), chunk(b"elm1", &[2u8; 8])]);
        let options = WalkOptions::default().with_skip_optional(true);
        let records: Vec<_> = ChunkWalker::with_options(Cursor::new(bytes), options)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert!(records.iter().all(|r| r.is_deferred()));
    }

    #[test]
    fn sub_chunks_carry_absolute_offsets() {
        let mut payload = chunk(b"INAM", b"abc");
        payload.extend(chunk(b"IART", b"de"));
        let records: Vec<_> = SubChunks::new(&payload, 100, Endianness::Little)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].offset, 100);
        assert_eq!(records[1].offset, 100 + 8 + 4);
        assert_eq!(records[1].data(), Some(&b"de"[..]));
    }
}
