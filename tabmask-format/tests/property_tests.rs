//! Property-based tests for container primitives

use proptest::prelude::*;
use tabmask_format::bitpack::{pack_bools, unpack_bools, PresenceBitmap, TagPacker, TagUnpacker};
use tabmask_format::varint::{decode_uleb128, encode_uleb128, zigzag_decode, zigzag_encode};
use tabmask_format::{ColumnDirectory, ColumnDirectoryEntry, FileHeader, Limits, TypeTag};

fn any_tag() -> impl Strategy<Value = TypeTag> {
    prop::sample::select(vec![
        TypeTag::Null,
        TypeTag::Bool,
        TypeTag::Int,
        TypeTag::Float,
        TypeTag::String,
        TypeTag::UInt,
    ])
}

proptest! {
    #[test]
    fn uleb128_roundtrip_property(value in 0u64..u64::MAX) {
        let encoded = encode_uleb128(value);
        let (decoded, _) = decode_uleb128(&encoded).expect("Failed to decode ULEB128");
        prop_assert_eq!(value, decoded);
    }

    #[test]
    fn zigzag_roundtrip_property(value in i64::MIN..i64::MAX) {
        prop_assert_eq!(value, zigzag_decode(zigzag_encode(value)));
    }

    #[test]
    fn presence_bitmap_roundtrip_property(
        presence in prop::collection::vec(any::<bool>(), 1..1000)
    ) {
        let bitmap = PresenceBitmap::from_bools(&presence);
        let unpacked = PresenceBitmap::from_bytes(&bitmap.to_bytes(), presence.len());

        for (i, expected) in presence.iter().enumerate() {
            prop_assert_eq!(unpacked.is_present(i), *expected);
        }
        prop_assert_eq!(
            unpacked.count_present(),
            presence.iter().filter(|p| **p).count()
        );
    }

    #[test]
    fn type_tags_roundtrip_property(tags in prop::collection::vec(any_tag(), 1..1000)) {
        let mut packer = TagPacker::new();
        for tag in &tags {
            packer.push(*tag);
        }
        let packed = packer.finish();
        prop_assert_eq!(packed.len(), TagPacker::byte_len(tags.len()));

        let unpacked = TagUnpacker::new(&packed, tags.len()).collect_tags().unwrap();
        prop_assert_eq!(unpacked, tags);
    }

    #[test]
    fn bools_roundtrip_property(values in prop::collection::vec(any::<bool>(), 0..500)) {
        let packed = pack_bools(&values);
        prop_assert_eq!(unpack_bools(&packed, values.len()).unwrap(), values);
    }

    #[test]
    fn header_decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = FileHeader::decode(&bytes, &Limits::default());
    }

    #[test]
    fn directory_decode_never_panics(
        bytes in prop::collection::vec(any::<u8>(), 0..128),
        columns in 0usize..8,
        rows in 0usize..64,
    ) {
        let _ = ColumnDirectory::decode(&bytes, columns, rows, &Limits::default());
    }

    #[test]
    fn directory_roundtrip_property(
        names in prop::collection::hash_set("[a-z_]{1,12}", 1..8),
        rows in 1usize..200,
    ) {
        let mut offset = 0;
        let entries: Vec<ColumnDirectoryEntry> = names
            .into_iter()
            .map(|name| {
                let len = name.len() * 3;
                let entry = ColumnDirectoryEntry {
                    column_name: name,
                    declared_type: Some(TypeTag::String),
                    compressor: 0,
                    compression_level: 0,
                    presence_bytes: (rows + 7) >> 3,
                    tag_bytes: ((3 * rows) + 7) >> 3,
                    value_count_present: rows,
                    segment_uncompressed_len: len,
                    segment_compressed_len: len,
                    segment_offset: offset,
                };
                offset += len;
                entry
            })
            .collect();
        let directory = ColumnDirectory { entries };

        let encoded = directory.encode();
        let (decoded, consumed) =
            ColumnDirectory::decode(&encoded, directory.entries.len(), rows, &Limits::default())
                .unwrap();
        prop_assert_eq!(consumed, encoded.len());
        prop_assert_eq!(decoded.segment_area_len().unwrap(), offset);
        prop_assert_eq!(decoded, directory);
    }
}
