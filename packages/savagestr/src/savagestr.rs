use std::fmt::Debug;

/// * ISO-8859-1, the code page RIFF text fields are read with unless told otherwise.
pub const CODE_PAGE_LATIN1: u32 = 28591;

/// * US-ASCII
pub const CODE_PAGE_ASCII: u32 = 20127;

/// * UTF-8
pub const CODE_PAGE_UTF8: u32 = 65001;

fn savage_decode(bytes: &[u8]) -> String {
    format!("{}", String::from_utf8_lossy(bytes))
}

/// * Latin-1 maps every byte to the code point of the same value, no table needed.
fn latin1_decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// * Fixed-width text fields end at the first NUL. Whatever follows it is stale buffer content.
pub fn strip_nuls(text: &str) -> String {
    match text.find(char::from(0)) {
        Some(end) => text[..end].to_string(),
        None => text.to_string(),
    }
}

pub use text_encoding::StringCodecMaps;

impl Default for StringCodecMaps {
    fn default() -> Self {
        Self::new()
    }
}

pub trait SavageStringCodecs: Debug {
    fn decode_bytes_by_format_name(&self, bytes: &[u8], format_name: &str) -> String;
    fn decode_bytes_by_code_page(&self, bytes: &[u8], code_page: u32) -> String;

    /// * Decode a fixed-width text field and strip its NUL padding.
    fn decode_field(&self, bytes: &[u8], code_page: u32) -> String {
        strip_nuls(&self.decode_bytes_by_code_page(bytes, code_page))
    }

    /// * Chunk identifiers are always decoded as Latin-1 so that every byte survives.
    fn decode_flags(&self, bytes: &[u8; 4]) -> String {
        latin1_decode(bytes)
    }

    fn savage_decode(&self, bytes: &[u8]) -> String {
        savage_decode(bytes)
    }
}

#[cfg(feature = "text_encoding")]
pub mod text_encoding {
    use super::SavageStringCodecs;
    use encoding::{DecoderTrap, EncodingRef, all::*};
    use std::collections::HashMap;
    use std::fmt::Debug;

    // The code pages a RIFF `ltxt` chunk or a `DecodeOptions` may realistically carry.
    const CODE_PAGE_DATA: [(u32, &str, &str); 30] = [
        (437, "IBM437", "OEM United States"),
        (850, "ibm850", "OEM Multilingual Latin 1; Western European (DOS)"),
        (866, "cp866", "OEM Russian; Cyrillic (DOS)"),
        (874, "windows-874", "Thai (Windows)"),
        (932, "shift_jis", "ANSI/OEM Japanese; Japanese (Shift-JIS)"),
        (936, "gb2312", "ANSI/OEM Simplified Chinese (PRC, Singapore); Chinese Simplified (GB2312)"),
        (949, "ks_c_5601-1987", "ANSI/OEM Korean (Unified Hangul Code)"),
        (950, "big5", "ANSI/OEM Traditional Chinese (Taiwan; Hong Kong SAR, PRC); Chinese Traditional (Big5)"),
        (1200, "utf-16", "Unicode UTF-16, little endian byte order"),
        (1201, "unicodeFFFE", "Unicode UTF-16, big endian byte order"),
        (1250, "windows-1250", "ANSI Central European; Central European (Windows)"),
        (1251, "windows-1251", "ANSI Cyrillic; Cyrillic (Windows)"),
        (1252, "windows-1252", "ANSI Latin 1; Western European (Windows)"),
        (1253, "windows-1253", "ANSI Greek; Greek (Windows)"),
        (1254, "windows-1254", "ANSI Turkish; Turkish (Windows)"),
        (1255, "windows-1255", "ANSI Hebrew; Hebrew (Windows)"),
        (1256, "windows-1256", "ANSI Arabic; Arabic (Windows)"),
        (1257, "windows-1257", "ANSI Baltic; Baltic (Windows)"),
        (1258, "windows-1258", "ANSI/OEM Vietnamese; Vietnamese (Windows)"),
        (10000, "macintosh", "MAC Roman; Western European (Mac)"),
        (20127, "us-ascii", "US-ASCII (7-bit)"),
        (20866, "koi8-r", "Russian (KOI8-R); Cyrillic (KOI8-R)"),
        (21866, "koi8-u", "Ukrainian (KOI8-U); Cyrillic (KOI8-U)"),
        (28591, "iso-8859-1", "ISO 8859-1 Latin 1; Western European (ISO)"),
        (28592, "iso-8859-2", "ISO 8859-2 Central European; Central European (ISO)"),
        (28595, "iso-8859-5", "ISO 8859-5 Cyrillic"),
        (28597, "iso-8859-7", "ISO 8859-7 Greek"),
        (28605, "iso-8859-15", "ISO 8859-15 Latin 9"),
        (51932, "euc-jp", "EUC Japanese"),
        (65001, "utf-8", "Unicode (UTF-8)"),
    ];

    const CODE_PAGE_ALTNAME: [(&str, &str); 9] = [
        ("gb2312", "gb18030"),
        ("us-ascii", "ascii"),
        ("big5", "big5-2003"),
        ("shift_jis", "windows-31j"),
        ("ks_c_5601-1987", "windows-949"),
        ("utf-16", "utf-16le"),
        ("unicodefffe", "utf-16be"),
        ("macintosh", "mac-roman"),
        ("cp866", "ibm866"),
    ];

    /// Savage string parser
    #[derive(Clone)]
    pub struct StringCodecMaps {
        codepage_map: HashMap<u32, (String, String)>,
        codename_alt: HashMap<String, String>,
        coder_map: HashMap<String, EncodingRef>,
    }

    impl Debug for StringCodecMaps {
        /// The debugging information dominates the screen, so it is changed to display "..."
        fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
            fmt.debug_struct("StringCodecMaps")
                .field("codepage_map", &"...")
                .field("codename_alt", &"...")
                .field("coder_map", &"...")
                .finish()
        }
    }

    impl StringCodecMaps {
        pub fn new() -> Self {
            // Code page, encoding name, encoding description
            let mut codepage_map = HashMap::<u32, (String, String)>::new();
            for (cp, name, desc) in CODE_PAGE_DATA {
                codepage_map.insert(cp, (name.to_lowercase(), desc.to_string()));
            }
            let mut codename_alt = HashMap::<String, String>::new();
            for (orig, alt) in CODE_PAGE_ALTNAME {
                codename_alt.insert(orig.to_string(), alt.to_string());
            }
            let mut coder_map = HashMap::<String, EncodingRef>::new();
            for coder in encodings() {
                coder_map.insert(coder.name().to_string(), *coder);
            }
            Self {
                codepage_map,
                codename_alt,
                coder_map,
            }
        }

        /// * The human readable description of a code page, if it is known.
        pub fn describe_code_page(&self, code_page: u32) -> Option<&str> {
            self.codepage_map.get(&code_page).map(|(_, desc)| desc.as_str())
        }

        // Look for a codec, or if not found look for it by its alias.
        fn find_coder(&self, format_name: &str) -> Option<&EncodingRef> {
            let format_name = format_name.to_lowercase();
            match self.coder_map.get(&format_name) {
                Some(coder) => Some(coder),
                None => self
                    .codename_alt
                    .get(&format_name)
                    .and_then(|alt_name| self.coder_map.get(alt_name)),
            }
        }
    }

    impl SavageStringCodecs for StringCodecMaps {
        fn decode_bytes_by_format_name(&self, bytes: &[u8], format_name: &str) -> String {
            match self.find_coder(format_name) {
                Some(coder) => match coder.decode(bytes, DecoderTrap::Replace) {
                    Ok(ret) => ret,
                    Err(_) => self.savage_decode(bytes),
                },
                None => self.savage_decode(bytes),
            }
        }

        fn decode_bytes_by_code_page(&self, bytes: &[u8], code_page: u32) -> String {
            match self.codepage_map.get(&code_page) {
                Some((name, _desc)) => self.decode_bytes_by_format_name(bytes, name),
                None => self.savage_decode(bytes),
            }
        }
    }
}

#[cfg(not(feature = "text_encoding"))]
pub mod text_encoding {
    use super::{CODE_PAGE_ASCII, CODE_PAGE_LATIN1, SavageStringCodecs, latin1_decode};

    #[derive(Debug, Clone)]
    pub struct StringCodecMaps;

    impl StringCodecMaps {
        pub fn new() -> Self {
            Self {}
        }

        pub fn describe_code_page(&self, _code_page: u32) -> Option<&str> {
            None
        }
    }

    impl SavageStringCodecs for StringCodecMaps {
        fn decode_bytes_by_format_name(&self, bytes: &[u8], format_name: &str) -> String {
            match format_name.to_lowercase().as_str() {
                "iso-8859-1" | "latin-1" | "latin1" => latin1_decode(bytes),
                _ => self.savage_decode(bytes),
            }
        }

        fn decode_bytes_by_code_page(&self, bytes: &[u8], code_page: u32) -> String {
            match code_page {
                CODE_PAGE_LATIN1 | CODE_PAGE_ASCII => latin1_decode(bytes),
                _ => self.savage_decode(bytes),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_keeps_high_bytes() {
        let maps = StringCodecMaps::new();
        assert_eq!(maps.decode_field(b"Caf\xe9\0\0\0", CODE_PAGE_LATIN1), "Café");
    }

    #[test]
    fn text_ends_at_the_first_nul() {
        let maps = StringCodecMaps::new();
        assert_eq!(maps.decode_field(b"AB\0CD\0\0", CODE_PAGE_ASCII), "AB");
        assert_eq!(maps.decode_field(b"Take 2\0old take name", CODE_PAGE_LATIN1), "Take 2");
        assert_eq!(maps.decode_field(b"no terminator", CODE_PAGE_LATIN1), "no terminator");
    }

    #[test]
    fn unknown_code_page_falls_back_to_utf8() {
        let maps = StringCodecMaps::new();
        assert_eq!(maps.decode_field("héllo".as_bytes(), 4242), "héllo");
    }

    #[test]
    fn flags_survive_any_byte() {
        let maps = StringCodecMaps::new();
        assert_eq!(maps.decode_flags(b"fmt "), "fmt ");
        assert_eq!(maps.decode_flags(&[0xff, b'a', b'b', b'c']), "\u{ff}abc");
    }
}
