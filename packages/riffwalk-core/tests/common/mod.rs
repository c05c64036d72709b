#![allow(dead_code)]

use riffwalk_core::Endianness;

/// * Assembles RIFF-family streams chunk by chunk.
pub struct StreamBuilder {
    master: [u8; 4],
    form: [u8; 4],
    order: Endianness,
    master_size: Option<u32>,
    body: Vec<u8>,
}

impl StreamBuilder {
    pub fn new(master: &[u8; 4], order: Endianness) -> Self {
        Self {
            master: *master,
            form: *b"WAVE",
            order,
            master_size: None,
            body: Vec::new(),
        }
    }

    pub fn riff() -> Self {
        Self::new(b"RIFF", Endianness::Little)
    }

    pub fn rifx() -> Self {
        Self::new(b"RIFX", Endianness::Big)
    }

    pub fn rf64() -> Self {
        Self::new(b"RF64", Endianness::Little).master_size(0xFFFFFFFF)
    }

    pub fn master_size(mut self, size: u32) -> Self {
        self.master_size = Some(size);
        self
    }

    pub fn order(&self) -> Endianness {
        self.order
    }

    /// * A chunk with its real size, padded when odd.
    pub fn chunk(self, id: &[u8; 4], data: &[u8]) -> Self {
        let size = data.len() as u32;
        self.chunk_with_size_field(id, size, data, data.len() & 1 == 1)
    }

    /// * A chunk whose odd size is not followed by a pad byte.
    pub fn chunk_unpadded(self, id: &[u8; 4], data: &[u8]) -> Self {
        let size = data.len() as u32;
        self.chunk_with_size_field(id, size, data, false)
    }

    pub fn chunk_with_size_field(mut self, id: &[u8; 4], size_field: u32, data: &[u8], pad: bool) -> Self {
        self.body.extend_from_slice(id);
        self.body.extend_from_slice(&self.order.u32_bytes(size_field));
        self.body.extend_from_slice(data);
        if pad {
            self.body.push(0);
        }
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let size = self.master_size.unwrap_or(self.body.len() as u32 + 4);
        let mut v = Vec::with_capacity(self.body.len() + 12);
        v.extend_from_slice(&self.master);
        v.extend_from_slice(&self.order.u32_bytes(size));
        v.extend_from_slice(&self.form);
        v.extend_from_slice(&self.body);
        v
    }
}

/// * Byte writer for chunk payloads in a given byte order.
pub struct Payload {
    order: Endianness,
    pub bytes: Vec<u8>,
}

impl Payload {
    pub fn new(order: Endianness) -> Self {
        Self { order, bytes: Vec::new() }
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.bytes.push(v);
        self
    }

    pub fn u16(mut self, v: u16) -> Self {
        match self.order {
            Endianness::Little => self.bytes.extend_from_slice(&v.to_le_bytes()),
            Endianness::Big => self.bytes.extend_from_slice(&v.to_be_bytes()),
        }
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.bytes.extend_from_slice(&self.order.u32_bytes(v));
        self
    }

    pub fn f32(self, v: f32) -> Self {
        self.u32(v.to_bits())
    }

    pub fn bytes(mut self, v: &[u8]) -> Self {
        self.bytes.extend_from_slice(v);
        self
    }

    /// * A fixed-width text field padded with NULs.
    pub fn text(mut self, text: &str, width: usize) -> Self {
        let mut field = text.as_bytes().to_vec();
        field.resize(width, 0);
        self.bytes.extend_from_slice(&field);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

pub fn fmt_pcm(order: Endianness, channels: u16, sample_rate: u32, bits: u16) -> Vec<u8> {
    fmt_with_tag(order, 1, channels, sample_rate, bits)
}

pub fn fmt_with_tag(order: Endianness, format_tag: u16, channels: u16, sample_rate: u32, bits: u16) -> Vec<u8> {
    let block_align = channels * bits.div_ceil(8);
    Payload::new(order)
        .u16(format_tag)
        .u16(channels)
        .u32(sample_rate)
        .u32(sample_rate * block_align as u32)
        .u16(block_align)
        .u16(bits)
        .build()
}

/// * A `cue ` payload with one point per ID, positions are ID * 1000.
pub fn cue_payload(order: Endianness, ids: &[u32]) -> Vec<u8> {
    let mut p = Payload::new(order).u32(ids.len() as u32);
    for &id in ids {
        p = p
            .u32(id)
            .u32(id * 1000)
            .bytes(b"data")
            .u32(0)
            .u32(0)
            .u32(id * 1000);
    }
    p.build()
}

/// * A sub-chunk inside a `LIST` payload, padded when odd.
pub fn sub_chunk(order: Endianness, id: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(id);
    v.extend_from_slice(&order.u32_bytes(data.len() as u32));
    v.extend_from_slice(data);
    if data.len() & 1 == 1 {
        v.push(0);
    }
    v
}

pub fn list_payload(list_type: &[u8; 4], sub_chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut v = list_type.to_vec();
    for sub_chunk in sub_chunks {
        v.extend_from_slice(sub_chunk);
    }
    v
}

pub fn labl(order: Endianness, cue_point_id: u32, text: &str) -> Vec<u8> {
    let mut data = Payload::new(order).u32(cue_point_id).bytes(text.as_bytes()).build();
    data.push(0);
    sub_chunk(order, b"labl", &data)
}

/// * A `ds64` payload with a table of extra sizes.
pub fn ds64_payload(riff_size: u64, data_size: u64, sample_count: u64, table: &[(&[u8; 4], u64)]) -> Vec<u8> {
    let mut p = Payload::new(Endianness::Little);
    for v in [riff_size, data_size, sample_count] {
        p = p.u32(v as u32).u32((v >> 32) as u32);
    }
    p = p.u32(table.len() as u32);
    for (id, size) in table {
        p = p.bytes(*id).u32(*size as u32).u32((*size >> 32) as u32);
    }
    p.build()
}
