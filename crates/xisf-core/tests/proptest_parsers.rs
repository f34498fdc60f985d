//! Property-based tests for the core codec primitives (C1-C4).
//!
//! These verify universal invariants: shuffle is its own inverse, every
//! codec round-trips, checksum digests are deterministic, and byte-order
//! conversion is an involution.

use proptest::prelude::*;
use xisf_core::byte_order::{convert, ByteOrder};
use xisf_core::checksum::{digest, ChecksumAlgorithm};
use xisf_core::compression::{compress, decompress, Codec};
use xisf_core::shuffle::{shuffle, unshuffle};

proptest! {
    /// Shuffle must never panic on arbitrary input and item sizes.
    #[test]
    fn shuffle_no_panic(data in prop::collection::vec(any::<u8>(), 0..512), item_size in 1usize..17) {
        let _ = shuffle(&data, item_size);
    }

    /// Shuffle is its own inverse whenever `len % item_size == 0`.
    #[test]
    fn shuffle_unshuffle_identity(
        item_size in 2usize..9,
        n_items in 0usize..64,
        tail in 0usize..17,
    ) {
        let len = n_items * item_size + (tail % item_size.max(1));
        let data: Vec<u8> = (0..len).map(|i| (i % 256) as u8).collect();
        let shuffled = shuffle(&data, item_size).unwrap();
        let restored = unshuffle(&shuffled, item_size).unwrap();
        prop_assert_eq!(restored, data);
    }

    /// Every compression codec round-trips arbitrary data.
    #[test]
    fn compression_round_trip(data in prop::collection::vec(any::<u8>(), 0..2048)) {
        for codec in [Codec::Zlib, Codec::Lz4, Codec::Lz4Hc] {
            let (compressed, meta) = compress(&data, codec, None).unwrap();
            let restored = decompress(&compressed, &meta).unwrap();
            prop_assert_eq!(restored, data.clone());
        }
    }

    /// Checksum digests are a pure function of (bytes, algorithm).
    #[test]
    fn checksum_deterministic(data in prop::collection::vec(any::<u8>(), 0..1024)) {
        for algo in [ChecksumAlgorithm::Sha1, ChecksumAlgorithm::Sha256, ChecksumAlgorithm::Sha512] {
            let a = digest(&data, algo).unwrap();
            let b = digest(&data, algo).unwrap();
            prop_assert_eq!(a, b);
        }
    }

    /// Byte-order conversion is an involution for valid item sizes.
    #[test]
    fn byte_order_involution(n_items in 0usize..64, item_size in prop::sample::select(vec![2usize, 4, 8, 16])) {
        let len = n_items * item_size;
        let data: Vec<u8> = (0..len).map(|i| (i % 256) as u8).collect();
        let swapped = convert(&data, ByteOrder::Little, ByteOrder::Big, item_size).unwrap();
        let restored = convert(&swapped, ByteOrder::Big, ByteOrder::Little, item_size).unwrap();
        prop_assert_eq!(restored, data);
    }
}

#[cfg(test)]
mod edge_cases {
    use xisf_core::byte_order::{convert, ByteOrder};
    use xisf_core::shuffle::shuffle;

    #[test]
    fn empty_data_shuffle() {
        assert_eq!(shuffle(&[], 4).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn invalid_item_size_rejected() {
        let data = vec![0u8; 8];
        assert!(convert(&data, ByteOrder::Little, ByteOrder::Big, 3).is_err());
    }

    #[test]
    fn same_order_is_noop() {
        let data = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
        let out = convert(&data, ByteOrder::Little, ByteOrder::Little, 4).unwrap();
        assert_eq!(out, data);
    }
}
