use crate::chunks::{DecodedChunk, payload};
use crate::errors::{ChunkDecodeError, SanityNote};
use crate::fourcc::{FourCC, ids};
use crate::registry::DecodeContext;
use crate::walker::{ChunkRecord, SubChunks};

/// * A `LIST` chunk: a list type followed by sub-chunks.
#[derive(Debug, Clone, PartialEq)]
pub struct ListChunk {
    pub list_type: FourCC,
    pub content: ListContent,

    /// * Set when the sub-chunks end in a broken header, the entries before it are kept.
    pub sanity: Vec<SanityNote>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListContent {
    Info(InfoChunk),
    Adtl(AdtlChunk),

    /// * List types without a dedicated decoder keep their sub-chunks raw.
    Other(Vec<ChunkRecord>),
}

impl ListChunk {
    pub fn info(&self) -> Option<&InfoChunk> {
        match &self.content {
            ListContent::Info(info) => Some(info),
            _ => None,
        }
    }

    pub fn adtl(&self) -> Option<&AdtlChunk> {
        match &self.content {
            ListContent::Adtl(adtl) => Some(adtl),
            _ => None,
        }
    }
}

/// * `LIST INFO` metadata in the order it was stored. A key may appear more than once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoChunk {
    pub entries: Vec<(FourCC, String)>,
}

macro_rules! info_field {
    ($name:ident, $key:literal) => {
        pub fn $name(&self) -> Option<&str> {
            self.get(FourCC::new($key))
        }
    };
}

impl InfoChunk {
    /// * The first value of a key.
    pub fn get(&self, key: FourCC) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// * The descriptive name of a standard `INFO` key.
    pub fn key_name(key: FourCC) -> Option<&'static str> {
        Some(match key.as_bytes() {
            b"IARL" => "archival location",
            b"IART" => "artist",
            b"ICMS" => "commissioned",
            b"ICMT" => "comment",
            b"ICOP" => "copyright",
            b"ICRD" => "creation date",
            b"ICRP" => "cropped",
            b"IDIM" => "dimensions",
            b"IDPI" => "dots per inch",
            b"IENG" => "engineer",
            b"IGNR" => "genre",
            b"IKEY" => "keywords",
            b"ILGT" => "lightness",
            b"IMED" => "medium",
            b"INAM" => "title",
            b"IPLT" => "palette",
            b"IPRD" => "product",
            b"ISBJ" => "subject",
            b"ISFT" => "software",
            b"ISRC" => "source",
            b"ISRF" => "source form",
            b"ITCH" => "technician",
            _ => return None,
        })
    }

    info_field!(archival_location, b"IARL");
    info_field!(artist, b"IART");
    info_field!(commissioned, b"ICMS");
    info_field!(comment, b"ICMT");
    info_field!(copyright, b"ICOP");
    info_field!(creation_date, b"ICRD");
    info_field!(cropped, b"ICRP");
    info_field!(dimensions, b"IDIM");
    info_field!(dots_per_inch, b"IDPI");
    info_field!(engineer, b"IENG");
    info_field!(genre, b"IGNR");
    info_field!(keywords, b"IKEY");
    info_field!(lightness, b"ILGT");
    info_field!(medium, b"IMED");
    info_field!(title, b"INAM");
    info_field!(palette, b"IPLT");
    info_field!(product, b"IPRD");
    info_field!(subject, b"ISBJ");
    info_field!(software, b"ISFT");
    info_field!(source, b"ISRC");
    info_field!(source_form, b"ISRF");
    info_field!(technician, b"ITCH");

    /// * Taggers store the album name in `IPRD`.
    pub fn album(&self) -> Option<&str> {
        self.product()
    }
}

/// * `LIST adtl`, the associated data of cue points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdtlChunk {
    pub entries: Vec<AdtlEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdtlEntry {
    Labl(LablChunk),
    Note(NoteChunk),
    Ltxt(LtxtChunk),
    Other(ChunkRecord),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LablChunk {
    pub cue_point_id: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteChunk {
    pub cue_point_id: u32,
    pub text: String,
}

/// * A labeled text, the text is in the code page it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LtxtChunk {
    pub cue_point_id: u32,
    pub sample_length: u32,
    pub purpose_id: FourCC,
    pub country: u16,
    pub language: u16,
    pub dialect: u16,
    pub code_page: u16,
    pub text: String,
}

impl AdtlChunk {
    pub fn label(&self, cue_point_id: u32) -> Option<&LablChunk> {
        self.entries.iter().find_map(|entry| match entry {
            AdtlEntry::Labl(labl) if labl.cue_point_id == cue_point_id => Some(labl),
            _ => None,
        })
    }

    pub fn note(&self, cue_point_id: u32) -> Option<&NoteChunk> {
        self.entries.iter().find_map(|entry| match entry {
            AdtlEntry::Note(note) if note.cue_point_id == cue_point_id => Some(note),
            _ => None,
        })
    }

    pub fn labeled_text(&self, cue_point_id: u32) -> Option<&LtxtChunk> {
        self.entries.iter().find_map(|entry| match entry {
            AdtlEntry::Ltxt(ltxt) if ltxt.cue_point_id == cue_point_id => Some(ltxt),
            _ => None,
        })
    }
}

fn decode_adtl_entry(record: ChunkRecord, ctx: &DecodeContext) -> Result<AdtlEntry, ChunkDecodeError> {
    let data = payload(&record)?;
    let mut r = ctx.fields(record.id, data);
    Ok(match record.id.as_bytes() {
        b"labl" => AdtlEntry::Labl(LablChunk {
            cue_point_id: r.u32()?,
            text: ctx.text(r.rest()),
        }),
        b"note" => AdtlEntry::Note(NoteChunk {
            cue_point_id: r.u32()?,
            text: ctx.text(r.rest()),
        }),
        b"ltxt" => {
            let cue_point_id = r.u32()?;
            let sample_length = r.u32()?;
            let purpose_id = r.fourcc()?;
            let country = r.u16()?;
            let language = r.u16()?;
            let dialect = r.u16()?;
            let code_page = r.u16()?;
            // Code page 0 is "the system default", use the configured one.
            let text = match code_page {
                0 => ctx.text(r.rest()),
                cp => ctx.text_in_code_page(r.rest(), cp as u32),
            };
            AdtlEntry::Ltxt(LtxtChunk {
                cue_point_id,
                sample_length,
                purpose_id,
                country,
                language,
                dialect,
                code_page,
                text,
            })
        }
        _ => AdtlEntry::Other(record),
    })
}

pub(crate) fn decode_list(record: &ChunkRecord, ctx: &DecodeContext) -> Result<DecodedChunk, ChunkDecodeError> {
    let data = payload(record)?;
    let list_type = ctx.fields(record.id, data).fourcc()?;
    let location = format!("['LIST' / {list_type}]");
    let mut sanity = Vec::<SanityNote>::new();
    let mut sub_chunks = Vec::<ChunkRecord>::new();
    for sub_chunk in SubChunks::new(&data[4..], record.data_offset() + 4, ctx.byte_order()) {
        match sub_chunk {
            Ok(sub_chunk) => sub_chunks.push(sub_chunk),
            Err(err) => {
                sanity.push(SanityNote::new(location.clone(), format!("THE SUB-CHUNKS END IN A BROKEN HEADER: {err}")));
                break;
            }
        }
    }

    let content = match list_type {
        ids::INFO => ListContent::Info(InfoChunk {
            entries: sub_chunks
                .iter()
                .map(|sub_chunk| (sub_chunk.id, ctx.text(sub_chunk.data().unwrap_or_default())))
                .collect(),
        }),
        ids::ADTL => {
            let mut entries = Vec::with_capacity(sub_chunks.len());
            for sub_chunk in sub_chunks.into_iter() {
                let (id, offset) = (sub_chunk.id, sub_chunk.offset);
                match decode_adtl_entry(sub_chunk, ctx) {
                    Ok(entry) => entries.push(entry),
                    Err(err) => sanity.push(SanityNote::new(
                        format!("{location} -- '{id}' AT 0x{offset:x}"),
                        err.to_string(),
                    )),
                }
            }
            ListContent::Adtl(AdtlChunk { entries })
        }
        _ => ListContent::Other(sub_chunks),
    };

    Ok(DecodedChunk::List(ListChunk {
        list_type,
        content,
        sanity,
    }))
}
