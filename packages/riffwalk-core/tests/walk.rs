mod common;

use std::io::Cursor;

use common::{StreamBuilder, ds64_payload, fmt_pcm, list_payload, sub_chunk};
use riffwalk_core::*;

fn walk_all(bytes: Vec<u8>, options: WalkOptions) -> (MasterHeader, Result<Vec<ChunkRecord>, WalkError>) {
    let walker = ChunkWalker::with_options(Cursor::new(bytes), options).unwrap();
    let header = walker.header().clone();
    (header, walker.collect())
}

#[test]
fn re_emitting_the_records_reproduces_the_stream() {
    let order = Endianness::Little;
    let bytes = StreamBuilder::riff()
        .chunk(b"fmt ", &fmt_pcm(order, 2, 44100, 16))
        .chunk(b"odd!", b"abcde")
        .chunk(b"LIST", &list_payload(b"INFO", &[sub_chunk(order, b"INAM", b"Song\0")]))
        .chunk(b"data", &[1, 2, 3, 4, 5, 6, 7, 8])
        .build();
    let (header, records) = walk_all(bytes.clone(), WalkOptions::default());
    let records = records.unwrap();
    assert_eq!(records.len(), 4);

    let mut emitted = header.to_bytes().to_vec();
    for record in records.iter() {
        emitted.extend(record.to_bytes(header.byte_order).unwrap());
    }
    assert_eq!(emitted, bytes);
}

#[test]
fn rifx_reads_big_endian_sizes() {
    let order = Endianness::Big;
    let bytes = StreamBuilder::rifx()
        .chunk(b"fmt ", &fmt_pcm(order, 1, 48000, 24))
        .chunk(b"data", &[0u8; 300])
        .build();
    let (header, records) = walk_all(bytes.clone(), WalkOptions::default());
    let records = records.unwrap();
    assert_eq!(header.master_id, ids::RIFX);
    assert_eq!(header.byte_order, Endianness::Big);
    assert_eq!(header.declared_size, bytes.len() as u64 - 8);
    assert_eq!(records[0].size, 16);
    assert_eq!(records[1].size, 300);
    assert_eq!(records[1].offset, 12 + 8 + 16);
}

#[test]
fn rf64_placeholders_come_from_the_size_table() {
    let audio = [9u8; 10];
    let ds64 = ds64_payload(0, audio.len() as u64, 5, &[(b"big1", 3)]);
    // ds64 + big1 + data, each with an 8-byte header
    let riff_size = 4 + (8 + ds64.len() as u64) + (8 + 3 + 1) + (8 + audio.len() as u64);
    let ds64 = ds64_payload(riff_size, audio.len() as u64, 5, &[(b"big1", 3)]);
    let bytes = StreamBuilder::rf64()
        .chunk(b"ds64", &ds64)
        .chunk_with_size_field(b"big1", SIZE_PLACEHOLDER, b"xyz", true)
        .chunk_with_size_field(b"data", SIZE_PLACEHOLDER, &audio, false)
        .build();
    assert_eq!(bytes.len() as u64, riff_size + 8);

    let mut walker = ChunkWalker::new(Cursor::new(bytes)).unwrap();
    assert!(walker.header().is_64bit());
    let records: Vec<_> = walker.by_ref().collect::<Result<_, _>>().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].id, ids::DS64);
    assert_eq!(records[1].size, 3);
    assert_eq!(records[1].size_field, SIZE_PLACEHOLDER);
    assert_eq!(records[2].size, audio.len() as u64);
    assert_eq!(records[2].data(), Some(&audio[..]));

    let table = walker.size_table().unwrap();
    assert_eq!(table.data_size, audio.len() as u64);
    assert_eq!(table.sample_count, 5);
    assert_eq!(walker.container_size().unwrap(), riff_size);
}

#[test]
fn placeholder_without_table_entry_is_an_error() {
    let ds64 = ds64_payload(0, 0, 0, &[]);
    let bytes = StreamBuilder::rf64()
        .chunk(b"ds64", &ds64)
        .chunk_with_size_field(b"big1", SIZE_PLACEHOLDER, b"xyzw", false)
        .build();
    let mut walker = ChunkWalker::new(Cursor::new(bytes)).unwrap();
    assert_eq!(walker.next().unwrap().unwrap().id, ids::DS64);
    match walker.next() {
        Some(Err(WalkError::UnresolvedSize { id, role })) => {
            assert_eq!(id, FourCC::new(b"big1"));
            assert_eq!(role, SizeRole::Table(FourCC::new(b"big1")));
        }
        other => panic!("expected an unresolved size, got {other:?}"),
    }
    assert!(walker.next().is_none());
}

#[test]
fn placeholder_in_a_plain_riff_is_taken_literally() {
    let bytes = StreamBuilder::riff()
        .chunk_with_size_field(b"data", SIZE_PLACEHOLDER, &[0u8; 4], false)
        .build();
    let (_, records) = walk_all(bytes, WalkOptions::default());
    match records {
        Err(WalkError::Truncated { id, declared, available, .. }) => {
            assert_eq!(id, ids::DATA);
            assert_eq!(declared, SIZE_PLACEHOLDER as u64);
            assert_eq!(available, 4);
        }
        other => panic!("expected a truncation, got {other:?}"),
    }
}

#[test]
fn truncated_chunk_yields_no_record() {
    let order = Endianness::Little;
    let bytes = StreamBuilder::riff()
        .chunk(b"fmt ", &fmt_pcm(order, 2, 44100, 16))
        .chunk_with_size_field(b"data", 100, &[0u8; 10], false)
        .build();
    let mut walker = ChunkWalker::new(Cursor::new(bytes)).unwrap();
    assert_eq!(walker.next().unwrap().unwrap().id, ids::FMT_);
    let err = walker.next().unwrap().unwrap_err();
    assert!(err.is_truncation());
    assert_eq!(
        err,
        WalkError::Truncated {
            id: ids::DATA,
            offset: 36,
            declared: 100,
            available: 10,
        }
    );
    assert!(walker.next().is_none());
}

#[test]
fn odd_size_consumes_the_pad_byte() {
    let bytes = StreamBuilder::riff()
        .chunk(b"abcd", b"12345")
        .chunk(b"next", b"zz")
        .build();
    let (_, records) = walk_all(bytes, WalkOptions::default());
    let records = records.unwrap();
    assert_eq!(records[0].size, 5);
    assert_eq!(records[0].data().unwrap().len(), 5);
    assert_eq!(records[0].stream_size(), 14);
    assert_eq!(records[1].id, FourCC::new(b"next"));
    assert_eq!(records[1].offset, 12 + 14);
}

#[test]
fn odd_bext_has_no_pad_byte() {
    let bext = vec![b'b'; 603];
    let bytes = StreamBuilder::riff()
        .chunk_unpadded(b"bext", &bext)
        .chunk(b"next", b"zz")
        .build();
    let (_, records) = walk_all(bytes.clone(), WalkOptions::default());
    let records = records.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].pad_byte, None);
    assert_eq!(records[1].offset, 12 + 8 + 603);

    // Treated as padded, the walk lands one byte into the next header.
    let (_, records) = walk_all(bytes, WalkOptions::default().always_padded());
    assert_ne!(records.map(|records| records.len()).ok(), Some(2));
}

#[test]
fn missing_final_pad_byte_is_tolerated() {
    let bytes = StreamBuilder::riff().chunk_unpadded(b"last", b"abc").build();
    let (_, records) = walk_all(bytes, WalkOptions::default());
    let records = records.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].pad_byte, None);
}

#[test]
fn chunks_past_the_declared_container_end_are_walked() {
    let order = Endianness::Little;
    let fmt = fmt_pcm(order, 2, 44100, 16);
    let bytes = StreamBuilder::riff()
        .master_size(4 + 8 + fmt.len() as u32)
        .chunk(b"fmt ", &fmt)
        .chunk(b"data", &[0u8; 8])
        .chunk(b"id3 ", b"ID3 tag?")
        .build();
    let (header, records) = walk_all(bytes, WalkOptions::default());
    let records = records.unwrap();
    assert_eq!(header.declared_size, 28);
    let found: Vec<FourCC> = records.iter().map(|r| r.id).collect();
    assert_eq!(found, vec![ids::FMT_, ids::DATA, ids::ID3_]);
}

#[test]
fn container_end_inside_a_chunk_is_not_a_truncation() {
    let order = Endianness::Little;
    let fmt = fmt_pcm(order, 2, 44100, 16);
    // The declared size stops 4 bytes into the data payload.
    let bytes = StreamBuilder::riff()
        .master_size(4 + 8 + fmt.len() as u32 + 8 + 4)
        .chunk(b"fmt ", &fmt)
        .chunk(b"data", &[3u8; 16])
        .build();
    let (_, records) = walk_all(bytes, WalkOptions::default());
    let records = records.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].size, 16);
    assert_eq!(records[1].data(), Some(&[3u8; 16][..]));
}

#[test]
fn bytes_after_the_container_are_read_as_chunks() {
    let mut bytes = StreamBuilder::riff().chunk(b"data", &[0u8; 4]).build();
    bytes.extend_from_slice(b"TAG\0garbage that isn't a chunk");
    let (_, records) = walk_all(bytes, WalkOptions::default());
    match records {
        Err(WalkError::Truncated { id, offset, .. }) => {
            assert_eq!(id, FourCC::new(b"TAG\0"));
            assert_eq!(offset, 12 + 12);
        }
        other => panic!("expected a truncation, got {other:?}"),
    }
}

#[test]
fn rf64_with_an_absurd_riff_size_walks_to_the_stream_end() {
    let audio = [5u8; 6];
    let bytes = StreamBuilder::rf64()
        .chunk(b"ds64", &ds64_payload(u64::MAX, audio.len() as u64, 3, &[]))
        .chunk_with_size_field(b"data", SIZE_PLACEHOLDER, &audio, false)
        .chunk(b"tail", b"end!")
        .build();
    let mut walker = ChunkWalker::new(Cursor::new(bytes)).unwrap();
    let records: Vec<_> = walker.by_ref().collect::<Result<_, _>>().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[1].data(), Some(&audio[..]));
    assert_eq!(records[2].id, FourCC::new(b"tail"));
    assert_eq!(walker.container_size().unwrap(), u64::MAX);
    assert_eq!(walker.size_table_offset(), Some(12));
}

#[test]
fn zeroed_identifier_does_not_stop_the_walk() {
    let order = Endianness::Little;
    let bytes = StreamBuilder::riff()
        .chunk(b"fmt ", &fmt_pcm(order, 1, 8000, 8))
        .chunk(&[0u8; 4], &[0u8; 4])
        .chunk(b"data", &[1u8; 4])
        .build();
    let (header, records) = walk_all(bytes.clone(), WalkOptions::default());
    let records = records.unwrap();
    assert_eq!(records.len(), 3);
    assert!(records[1].id.is_null());
    assert_eq!(records[1].size, 4);
    assert_eq!(records[2].id, ids::DATA);

    let mut emitted = header.to_bytes().to_vec();
    for record in records.iter() {
        emitted.extend(record.to_bytes(header.byte_order).unwrap());
    }
    assert_eq!(emitted, bytes);
}

#[test]
fn afsp_runs_up_to_the_next_disp() {
    let order = Endianness::Little;
    let afsp = b"afspdate: 2003-01-30 03:28:46 UTC\0user: kabal@CAPELLA\0";
    let mut disp = 1u32.to_le_bytes().to_vec();
    disp.extend_from_slice(b"Title\0");
    let bytes = StreamBuilder::riff()
        .chunk(b"fmt ", &fmt_pcm(order, 1, 8000, 16))
        .raw(afsp)
        .chunk(b"DISP", &disp)
        .chunk(b"data", &[0u8; 2])
        .build();
    let (header, records) = walk_all(bytes.clone(), WalkOptions::default());
    let records = records.unwrap();
    let found: Vec<FourCC> = records.iter().map(|r| r.id).collect();
    assert_eq!(found, vec![ids::FMT_, ids::AFSP, ids::DISP, ids::DATA]);
    assert_eq!(records[1].offset, 12 + 24);
    assert_eq!(records[1].size, afsp.len() as u64 - 8);
    assert_eq!(records[1].data(), Some(&afsp[8..]));
    assert_eq!(records[2].offset, 12 + 24 + afsp.len() as u64);

    let mut emitted = header.to_bytes().to_vec();
    for record in records.iter() {
        emitted.extend(record.to_bytes(header.byte_order).unwrap());
    }
    assert_eq!(emitted, bytes);
}

#[test]
fn walk_starts_at_the_reader_position() {
    let mut bytes = vec![0xAAu8; 7];
    bytes.extend(StreamBuilder::riff().chunk(b"data", &[0u8; 2]).build());
    let mut cursor = Cursor::new(bytes);
    cursor.set_position(7);
    let mut walker = ChunkWalker::new(cursor).unwrap();
    assert_eq!(walker.header().offset, 7);
    let record = walker.next().unwrap().unwrap();
    assert_eq!(record.offset, 7 + 12);
    assert!(walker.next().is_none());
}

#[test]
fn too_short_for_a_master_header() {
    let err = ChunkWalker::new(Cursor::new(b"RIFF\x04\0\0".to_vec())).unwrap_err();
    assert!(matches!(err, WalkError::Structural(_)));
}
