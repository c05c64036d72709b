use std::fmt::{self, Debug, Display, Formatter};

/// * A four-character chunk identifier, kept as raw bytes so that any value read from a stream survives.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub const fn new(bytes: &[u8; 4]) -> Self {
        Self(*bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// * Zeroed identifiers show up in the slack at the end of truncated recordings.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 4]
    }

    /// * The identifier without its trailing space padding, e.g. `"fmt"` for `"fmt "`.
    pub fn trimmed(&self) -> String {
        self.to_string().trim_end().to_string()
    }
}

impl From<[u8; 4]> for FourCC {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl From<&[u8; 4]> for FourCC {
    fn from(bytes: &[u8; 4]) -> Self {
        Self(*bytes)
    }
}

impl PartialEq<[u8; 4]> for FourCC {
    fn eq(&self, other: &[u8; 4]) -> bool {
        &self.0 == other
    }
}

impl PartialEq<&[u8; 4]> for FourCC {
    fn eq(&self, other: &&[u8; 4]) -> bool {
        &self.0 == *other
    }
}

impl Display for FourCC {
    // Latin-1, every byte maps to one char.
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for b in self.0 {
            write!(f, "{}", char::from(b))?;
        }
        Ok(())
    }
}

impl Debug for FourCC {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "FourCC(\"{}\")", self.to_string().escape_debug())
    }
}

/// * Identifiers of the chunks this crate knows about.
pub mod ids {
    use super::FourCC;

    pub const RIFF: FourCC = FourCC::new(b"RIFF");
    pub const RIFX: FourCC = FourCC::new(b"RIFX");
    pub const FIRR: FourCC = FourCC::new(b"FIRR");
    pub const RF64: FourCC = FourCC::new(b"RF64");
    pub const BW64: FourCC = FourCC::new(b"BW64");
    pub const WAVE: FourCC = FourCC::new(b"WAVE");

    pub const DS64: FourCC = FourCC::new(b"ds64");
    pub const FMT_: FourCC = FourCC::new(b"fmt ");
    pub const FACT: FourCC = FourCC::new(b"fact");
    pub const DATA: FourCC = FourCC::new(b"data");
    pub const LIST: FourCC = FourCC::new(b"LIST");
    pub const INFO: FourCC = FourCC::new(b"INFO");
    pub const ADTL: FourCC = FourCC::new(b"adtl");
    pub const LABL: FourCC = FourCC::new(b"labl");
    pub const NOTE: FourCC = FourCC::new(b"note");
    pub const LTXT: FourCC = FourCC::new(b"ltxt");
    pub const CUE_: FourCC = FourCC::new(b"cue ");
    pub const BEXT: FourCC = FourCC::new(b"bext");
    pub const CART: FourCC = FourCC::new(b"cart");
    pub const SMPL: FourCC = FourCC::new(b"smpl");
    pub const INST: FourCC = FourCC::new(b"inst");
    pub const ACID: FourCC = FourCC::new(b"acid");
    pub const LEVL: FourCC = FourCC::new(b"levl");
    pub const CHNA: FourCC = FourCC::new(b"chna");
    pub const STRC: FourCC = FourCC::new(b"strc");
    pub const DISP: FourCC = FourCC::new(b"DISP");
    pub const AXML: FourCC = FourCC::new(b"axml");
    pub const IXML: FourCC = FourCC::new(b"iXML");
    pub const _PMX: FourCC = FourCC::new(b"_PMX");
    pub const MD5_: FourCC = FourCC::new(b"MD5 ");
    pub const ID3_: FourCC = FourCC::new(b"id3 ");
    pub const ID3U: FourCC = FourCC::new(b"ID3 ");
    pub const JUNK: FourCC = FourCC::new(b"JUNK");
    pub const FLLR: FourCC = FourCC::new(b"FLLR");
    pub const PAD_: FourCC = FourCC::new(b"PAD ");

    /// * AFsp metadata, written without a size field. It ends where the next `DISP` or `LIST` starts.
    pub const AFSP: FourCC = FourCC::new(b"afsp");

    /// * Undocumented Pro Tools chunks whose payloads are only worth reading on demand.
    pub const OPTIONAL_IGNORE: [FourCC; 7] = [
        FourCC::new(b"minf"),
        FourCC::new(b"elm1"),
        FourCC::new(b"regn"),
        FourCC::new(b"umid"),
        FourCC::new(b"elmo"),
        FourCC::new(b"DGDA"),
        FourCC::new(b"ovwf"),
    ];
}
