use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Debug, Formatter};
use std::io::{Read, Seek};

use savagestr::{SavageStringCodecs, StringCodecMaps};

use crate::chunks::{self, AdtlEntry, DecodedChunk, FmtChunk, GenericChunk, ListContent, LtxtChunk};
use crate::errors::{ChunkDecodeError, WalkError};
use crate::fields::FieldReader;
use crate::fourcc::{FourCC, ids};
use crate::options::DecodeOptions;
use crate::resolver::{Endianness, SizeTable};
use crate::walker::{ChunkRecord, ChunkWalker, MasterHeader};

/// * Addresses a decoded chunk: identifiers repeat, so the occurrence index (from 0, in arrival order) tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkKey {
    pub id: FourCC,
    pub occurrence: usize,
}

impl ChunkKey {
    pub fn new(id: FourCC, occurrence: usize) -> Self {
        Self { id, occurrence }
    }
}

pub type ChunkMap = BTreeMap<ChunkKey, DecodedChunk>;

/// * Everything a decoder may look at besides its own chunk. Only chunks before the current one are visible.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    pub header: &'a MasterHeader,
    pub size_table: Option<&'a SizeTable>,

    /// * The raw records retained so far, in arrival order.
    pub records: &'a [ChunkRecord],

    /// * The chunks decoded so far.
    pub decoded: &'a ChunkMap,

    pub text_codec: &'a StringCodecMaps,

    /// * The code page of the fixed-width text fields.
    pub code_page: u32,
}

impl<'a> DecodeContext<'a> {
    pub fn byte_order(&self) -> Endianness {
        self.header.byte_order
    }

    /// * A field reader over `data` in the container's byte order.
    pub fn fields<'b>(&self, id: FourCC, data: &'b [u8]) -> FieldReader<'b> {
        FieldReader::new(id, data, self.header.byte_order)
    }

    /// * Decode a fixed-width text field with the configured code page.
    pub fn text(&self, bytes: &[u8]) -> String {
        self.text_codec.decode_field(bytes, self.code_page)
    }

    pub fn text_in_code_page(&self, bytes: &[u8], code_page: u32) -> String {
        self.text_codec.decode_field(bytes, code_page)
    }

    /// * The most recent decoded chunk of this identifier.
    pub fn latest(&self, id: FourCC) -> Option<&'a DecodedChunk> {
        self.decoded
            .range(ChunkKey::new(id, 0)..=ChunkKey::new(id, usize::MAX))
            .next_back()
            .map(|(_, chunk)| chunk)
    }

    /// * The most recent successfully decoded `fmt ` chunk.
    pub fn format(&self) -> Option<&'a FmtChunk> {
        self.latest(ids::FMT_).and_then(|chunk| chunk.as_fmt())
    }
}

/// * The contract of a chunk decoder: a raw record plus read-only context in, a decoded chunk or an error out.
pub trait ChunkDecoder {
    fn decode(&self, record: &ChunkRecord, ctx: &DecodeContext<'_>) -> Result<DecodedChunk, ChunkDecodeError>;
}

impl<F> ChunkDecoder for F
where
    F: Fn(&ChunkRecord, &DecodeContext<'_>) -> Result<DecodedChunk, ChunkDecodeError>,
{
    fn decode(&self, record: &ChunkRecord, ctx: &DecodeContext<'_>) -> Result<DecodedChunk, ChunkDecodeError> {
        self(record, ctx)
    }
}

/// * Maps chunk identifiers to decoders and drives the walk.
pub struct DecoderRegistry {
    decoders: HashMap<FourCC, Box<dyn ChunkDecoder>>,
    options: DecodeOptions,
    text_codec: StringCodecMaps,
}

impl Debug for DecoderRegistry {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut registered: Vec<String> = self.decoders.keys().map(|id| id.to_string()).collect();
        registered.sort();
        f.debug_struct("DecoderRegistry")
            .field("decoders", &registered)
            .field("options", &self.options)
            .field("text_codec", &self.text_codec)
            .finish()
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoderRegistry {
    /// * A registry with every built-in decoder.
    pub fn new() -> Self {
        Self::with_options(DecodeOptions::default())
    }

    pub fn with_options(options: DecodeOptions) -> Self {
        let mut ret = Self::empty(options);
        ret.register_defaults();
        ret
    }

    /// * A registry without decoders. Every chunk ends up generic until something is registered.
    pub fn empty(options: DecodeOptions) -> Self {
        Self {
            decoders: HashMap::new(),
            options,
            text_codec: StringCodecMaps::new(),
        }
    }

    fn register_defaults(&mut self) {
        self.register(ids::FMT_, chunks::decode_fmt);
        self.register(ids::FACT, chunks::decode_fact);
        self.register(ids::DATA, chunks::decode_data);
        self.register(ids::LIST, chunks::decode_list);
        self.register(ids::CUE_, chunks::decode_cue);
        self.register(ids::BEXT, chunks::decode_bext);
        self.register(ids::CART, chunks::decode_cart);
        self.register(ids::SMPL, chunks::decode_smpl);
        self.register(ids::INST, chunks::decode_inst);
        self.register(ids::ACID, chunks::decode_acid);
        self.register(ids::LEVL, chunks::decode_levl);
        self.register(ids::CHNA, chunks::decode_chna);
        self.register(ids::STRC, chunks::decode_strc);
        self.register(ids::DISP, chunks::decode_disp);
        self.register(ids::MD5_, chunks::decode_md5);
        for id in [ids::AXML, FourCC::new(b"aXML"), ids::IXML, FourCC::new(b"ixml"), ids::_PMX] {
            self.register(id, chunks::decode_xml);
        }
        for id in [ids::JUNK, ids::FLLR, ids::PAD_, FourCC::new(b"junk"), FourCC::new(b"fllr")] {
            self.register(id, chunks::decode_junk);
        }
        #[cfg(feature = "id3")]
        for id in [ids::ID3_, ids::ID3U] {
            self.register(id, chunks::decode_id3);
        }
    }

    /// * Register a decoder, returning the one it replaces.
    pub fn register<D>(&mut self, id: FourCC, decoder: D) -> Option<Box<dyn ChunkDecoder>>
    where
        D: ChunkDecoder + 'static,
    {
        self.decoders.insert(id, Box::new(decoder))
    }

    pub fn unregister(&mut self, id: FourCC) -> Option<Box<dyn ChunkDecoder>> {
        self.decoders.remove(&id)
    }

    pub fn has_decoder(&self, id: FourCC) -> bool {
        self.decoders.contains_key(&id)
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// * Walk the stream to the end and decode every chunk.
    /// * Only walk errors fail the call, a chunk whose decoder fails is kept as a generic record carrying the error.
    pub fn decode<R>(&self, reader: R) -> Result<DecodeResult, WalkError>
    where
        R: Read + Seek,
    {
        let mut walker = ChunkWalker::with_options(reader, self.options.walk.clone())?;
        let header = walker.header().clone();
        let mut records = Vec::<ChunkRecord>::new();
        let mut chunks = ChunkMap::new();
        let mut order = Vec::<ChunkKey>::new();
        let mut occurrences = HashMap::<FourCC, usize>::new();

        while let Some(record) = walker.next() {
            let record = record?;
            // The walker already consumed it as the size table.
            if record.id == ids::DS64 && walker.size_table_offset() == Some(record.offset) {
                records.push(record);
                continue;
            }
            let occurrence = occurrences.entry(record.id).or_insert(0);
            let key = ChunkKey::new(record.id, *occurrence);
            *occurrence += 1;

            let decoded = {
                let ctx = DecodeContext {
                    header: &header,
                    size_table: walker.size_table(),
                    records: &records,
                    decoded: &chunks,
                    text_codec: &self.text_codec,
                    code_page: self.options.code_page,
                };
                self.dispatch(&record, &ctx)
            };
            chunks.insert(key, decoded);
            order.push(key);
            records.push(record);
        }

        merge_cue_labels(&mut chunks, &order);

        Ok(DecodeResult {
            header,
            size_table: walker.size_table().cloned(),
            records,
            chunks,
            order,
        })
    }

    fn dispatch(&self, record: &ChunkRecord, ctx: &DecodeContext) -> DecodedChunk {
        let Some(decoder) = self.decoders.get(&record.id) else {
            log::debug!("No decoder for the \"{}\" chunk, kept as generic.", record.id);
            return DecodedChunk::Generic(GenericChunk::from_record(record, None));
        };
        log::debug!("Decoding the \"{}\" chunk at 0x{:x}", record.id, record.offset);
        match decoder.decode(record, ctx) {
            Ok(decoded) => {
                for note in decoded.sanity() {
                    log::warn!("{note}");
                }
                decoded
            }
            Err(err) => {
                log::warn!(
                    "Failed to decode the \"{}\" chunk at 0x{:x}, kept as generic: {err}",
                    record.id,
                    record.offset
                );
                DecodedChunk::Generic(GenericChunk::from_record(record, Some(err)))
            }
        }
    }
}

/// * Attach `labl`, `note` and `ltxt` entries from `LIST adtl` chunks to the cue points with the same ID.
/// * The first entry for an ID wins, a cue point without one is left without.
fn merge_cue_labels(chunks: &mut ChunkMap, order: &[ChunkKey]) {
    let mut labels = HashMap::<u32, String>::new();
    let mut notes = HashMap::<u32, String>::new();
    let mut labeled_texts = HashMap::<u32, LtxtChunk>::new();
    for key in order {
        let Some(DecodedChunk::List(list)) = chunks.get(key) else {
            continue;
        };
        let ListContent::Adtl(adtl) = &list.content else {
            continue;
        };
        for entry in adtl.entries.iter() {
            match entry {
                AdtlEntry::Labl(labl) => {
                    labels.entry(labl.cue_point_id).or_insert_with(|| labl.text.clone());
                }
                AdtlEntry::Note(note) => {
                    notes.entry(note.cue_point_id).or_insert_with(|| note.text.clone());
                }
                AdtlEntry::Ltxt(ltxt) => {
                    labeled_texts.entry(ltxt.cue_point_id).or_insert_with(|| ltxt.clone());
                }
                AdtlEntry::Other(_) => (),
            }
        }
    }
    if labels.is_empty() && notes.is_empty() && labeled_texts.is_empty() {
        return;
    }
    for chunk in chunks.values_mut() {
        let DecodedChunk::Cue(cue) = chunk else {
            continue;
        };
        for point in cue.cue_points.iter_mut() {
            point.label = labels.get(&point.identifier).cloned();
            point.note = notes.get(&point.identifier).cloned();
            point.labeled_text = labeled_texts.get(&point.identifier).cloned();
        }
    }
}

/// * The result of `DecoderRegistry::decode()`
#[derive(Debug, Clone)]
pub struct DecodeResult {
    pub header: MasterHeader,
    pub size_table: Option<SizeTable>,

    /// * Every chunk as encountered, `ds64` included.
    pub records: Vec<ChunkRecord>,

    /// * The decoded chunks, `ds64` excluded.
    pub chunks: ChunkMap,

    order: Vec<ChunkKey>,
}

impl DecodeResult {
    pub fn byte_order(&self) -> Endianness {
        self.header.byte_order
    }

    pub fn get(&self, id: FourCC, occurrence: usize) -> Option<&DecodedChunk> {
        self.chunks.get(&ChunkKey::new(id, occurrence))
    }

    pub fn first(&self, id: FourCC) -> Option<&DecodedChunk> {
        self.get(id, 0)
    }

    /// * Every occurrence of the identifier, in arrival order.
    pub fn all(&self, id: FourCC) -> impl Iterator<Item = &DecodedChunk> {
        self.chunks
            .range(ChunkKey::new(id, 0)..=ChunkKey::new(id, usize::MAX))
            .map(|(_, chunk)| chunk)
    }

    /// * The decoded chunks in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (&ChunkKey, &DecodedChunk)> {
        self.order
            .iter()
            .filter_map(|key| self.chunks.get_key_value(key))
    }

    pub fn format(&self) -> Option<&FmtChunk> {
        self.first(ids::FMT_).and_then(|chunk| chunk.as_fmt())
    }

    /// * The identifiers of all records in arrival order, each `LIST` followed by its list type.
    pub fn chunk_ids(&self) -> Vec<FourCC> {
        let mut ret = Vec::with_capacity(self.records.len());
        let mut lists = self.all(ids::LIST);
        for record in self.records.iter() {
            ret.push(record.id);
            if record.id == ids::LIST {
                if let Some(list) = lists.next().and_then(|chunk| chunk.as_list()) {
                    ret.push(list.list_type);
                }
            }
        }
        ret
    }

    /// * The chunks whose decoders failed, with the reasons.
    pub fn failures(&self) -> Vec<(ChunkKey, &ChunkDecodeError)> {
        self.iter()
            .filter_map(|(key, chunk)| chunk.error().map(|err| (*key, err)))
            .collect()
    }

    /// * The chunks kept as generic records, either for lack of a decoder or because it failed.
    pub fn generic(&self) -> impl Iterator<Item = (&ChunkKey, &GenericChunk)> {
        self.iter()
            .filter_map(|(key, chunk)| chunk.as_generic().map(|generic| (key, generic)))
    }
}
