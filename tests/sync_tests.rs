//! Tests for ASM framing and the sliding correlator.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tmlink_rs::constants::{ASM_LENGTH_BITS, ASM_PATTERN};
use tmlink_rs::sync::{find_asm, frame_with_asm, ASM_BITS};

#[test]
fn test_pattern_constant() {
    assert_eq!(ASM_PATTERN, 0x1ACF_FC1D_0000_0000);
    assert_eq!(ASM_BITS.len(), 64);
    // MSB-first serialization of the four marker bytes
    let expected_head: Vec<u8> = [0x1Au8, 0xCF, 0xFC, 0x1D]
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |bit| (byte >> bit) & 1))
        .collect();
    assert_eq!(&ASM_BITS[..32], &expected_head[..]);
}

#[test]
fn test_lock_at_every_offset() {
    let mut rng = StdRng::seed_from_u64(0xA5A5);
    for offset in [0usize, 1, 63, 64, 500, 1000] {
        let mut stream: Vec<u8> = (0..offset).map(|_| rng.gen_range(0..=1)).collect();
        stream.extend_from_slice(&ASM_BITS[..]);
        stream.extend((0..128).map(|_| rng.gen_range(0..=1u8)));
        let (found, distance) = find_asm(&stream).expect("marker present");
        assert_eq!(found, offset);
        assert_eq!(distance, 0);
    }
}

#[test]
fn test_lock_with_one_and_two_flips() {
    let mut rng = StdRng::seed_from_u64(0x1234);
    for flips in [1usize, 2] {
        let mut stream: Vec<u8> = (0..300).map(|_| rng.gen_range(0..=1)).collect();
        let mark = stream.len();
        stream.extend_from_slice(&ASM_BITS[..]);
        let mut flipped = std::collections::HashSet::new();
        while flipped.len() < flips {
            flipped.insert(rng.gen_range(0..ASM_LENGTH_BITS));
        }
        for &f in &flipped {
            stream[mark + f] ^= 1;
        }
        let (found, distance) = find_asm(&stream).expect("marker within threshold");
        assert_eq!(found, mark);
        assert_eq!(distance as usize, flips);
    }
}

#[test]
fn test_three_flips_do_not_lock() {
    let mut stream = ASM_BITS.to_vec();
    stream[3] ^= 1;
    stream[17] ^= 1;
    stream[44] ^= 1;
    assert!(find_asm(&stream).is_none());
}

#[test]
fn test_framer_layout() {
    let codeword: Vec<u8> = (0..8192).map(|i| (i % 2) as u8).collect();
    let mut framed = vec![0u8; 64 + 8192];
    frame_with_asm(&codeword, &mut framed);
    assert_eq!(&framed[..64], &ASM_BITS[..]);
    assert_eq!(&framed[64..], &codeword[..]);
}
