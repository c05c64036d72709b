use savagestr::CODE_PAGE_LATIN1;

use crate::fourcc::{FourCC, ids};

/// * How the walker treats individual chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOptions {
    /// * Chunks whose odd declared size is NOT followed by a pad byte. `bext` by default.
    pub unpadded: Vec<FourCC>,

    /// * Chunks whose payload stays in the stream. Their records keep the offset so the payload can be loaded later.
    pub deferred: Vec<FourCC>,

    /// * Also defer the undocumented Pro Tools chunks listed in `ids::OPTIONAL_IGNORE`.
    pub skip_optional: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            unpadded: vec![ids::BEXT],
            deferred: Vec::new(),
            skip_optional: false,
        }
    }
}

impl WalkOptions {
    pub fn with_unpadded(mut self, id: FourCC) -> Self {
        if !self.unpadded.contains(&id) {
            self.unpadded.push(id);
        }
        self
    }

    /// * Every odd-sized chunk gets its pad byte, `bext` included.
    pub fn always_padded(mut self) -> Self {
        self.unpadded.clear();
        self
    }

    pub fn with_deferred(mut self, id: FourCC) -> Self {
        if !self.deferred.contains(&id) {
            self.deferred.push(id);
        }
        self
    }

    pub fn with_skip_optional(mut self, skip_optional: bool) -> Self {
        self.skip_optional = skip_optional;
        self
    }

    pub fn is_unpadded(&self, id: FourCC) -> bool {
        self.unpadded.contains(&id)
    }

    /// * The `ds64` chunk is always loaded, the walker needs it to resolve sizes.
    pub fn is_deferred(&self, id: FourCC) -> bool {
        if id == ids::DS64 {
            return false;
        }
        self.deferred.contains(&id) || (self.skip_optional && ids::OPTIONAL_IGNORE.contains(&id))
    }
}

/// * Options for `DecoderRegistry::decode()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// * The walker options. The `data` chunk is deferred by default since its decoder only needs the size.
    pub walk: WalkOptions,

    /// * The code page of the fixed-width text fields. ISO-8859-1 by default.
    pub code_page: u32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            walk: WalkOptions::default().with_deferred(ids::DATA),
            code_page: CODE_PAGE_LATIN1,
        }
    }
}

impl DecodeOptions {
    pub fn with_walk_options(mut self, walk: WalkOptions) -> Self {
        self.walk = walk;
        self
    }

    pub fn with_code_page(mut self, code_page: u32) -> Self {
        self.code_page = code_page;
        self
    }
}
