// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SCALE byte-layout rules.
//!
//! Every byte the generated Solidity produces is decided here. The same
//! functions back [`crate::codegen::eval`], so the rules are checked
//! against a reference codec without going through text.

use crate::types::CompactWidth;

/// Option tag for an absent value.
pub const OPTION_NONE: u8 = 0x00;
/// Option tag preceding a present value.
pub const OPTION_SOME: u8 = 0x01;
/// `MultiAddress::Id` discriminant.
pub const MULTI_ADDRESS_ID: u8 = 0x00;

const SINGLE_BYTE_MAX: u128 = (1 << 6) - 1;
const TWO_BYTE_MAX: u128 = (1 << 14) - 1;
const FOUR_BYTE_MAX: u128 = (1 << 30) - 1;

/// How a single value is written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Encoding {
    Bool,
    /// Little-endian unsigned integer of the given bit width.
    Uint(u16),
    /// Two's complement, little-endian, of the given bit width.
    Int(u16),
    Compact(CompactWidth),
    /// Compact length prefix + raw bytes.
    Bytes,
    /// UTF-8 bytes, encoded like [`Encoding::Bytes`].
    Str,
    AccountId32,
    /// `MultiAddress::Id(AccountId32)`.
    MultiAddressId32,
    /// Raw bytes of exactly this length.
    FixedBytes(usize),
    /// Generated codec library, by library identifier.
    Codec(String),
}

/// Compact (variable-length) unsigned integer.
pub fn encode_compact(value: u128) -> Vec<u8> {
    if value <= SINGLE_BYTE_MAX {
        vec![(value as u8) << 2]
    } else if value <= TWO_BYTE_MAX {
        (((value as u16) << 2) | 0b01).to_le_bytes().to_vec()
    } else if value <= FOUR_BYTE_MAX {
        (((value as u32) << 2) | 0b10).to_le_bytes().to_vec()
    } else {
        let le = value.to_le_bytes();
        let significant = le.len() - le.iter().rev().take_while(|&&b| b == 0).count();
        let len = significant.max(4);
        let mut out = Vec::with_capacity(len + 1);
        out.push((((len - 4) as u8) << 2) | 0b11);
        out.extend_from_slice(&le[..len]);
        out
    }
}

/// Little-endian unsigned integer, `bits / 8` bytes wide.
///
/// Widths above 128 bits are zero-extended.
pub fn encode_uint(value: u128, bits: u16) -> Vec<u8> {
    let width = usize::from(bits / 8);
    let mut out = value.to_le_bytes().to_vec();
    out.resize(width, 0);
    out
}

/// Two's complement little-endian integer, `bits / 8` bytes wide.
pub fn encode_int(value: i128, bits: u16) -> Vec<u8> {
    let width = usize::from(bits / 8);
    let fill = if value < 0 { 0xff } else { 0x00 };
    let mut out = value.to_le_bytes().to_vec();
    out.resize(width, fill);
    out
}

pub fn encode_bool(value: bool) -> Vec<u8> {
    vec![u8::from(value)]
}

/// Compact length prefix followed by the bytes.
pub fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = encode_compact(bytes.len() as u128);
    out.extend_from_slice(bytes);
    out
}

pub fn encode_option(value: Option<Vec<u8>>) -> Vec<u8> {
    match value {
        None => vec![OPTION_NONE],
        Some(inner) => {
            let mut out = Vec::with_capacity(inner.len() + 1);
            out.push(OPTION_SOME);
            out.extend(inner);
            out
        }
    }
}

pub fn encode_multi_address_id32(account: &[u8; 32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(33);
    out.push(MULTI_ADDRESS_ID);
    out.extend_from_slice(account);
    out
}

/// Two raw bytes: group index, call index.
pub fn call_index(group: u8, call: u8) -> [u8; 2] {
    [group, call]
}

/// Largest value a compact of this width carries.
pub fn compact_max(width: CompactWidth) -> u128 {
    match width {
        CompactWidth::U128 => u128::MAX,
        other => (1u128 << other.bits()) - 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        hex::encode(bytes)
    }

    #[test]
    fn test_compact_boundaries() {
        let cases: &[(u128, &str)] = &[
            (0, "00"),
            (63, "fc"),
            (64, "0101"),
            (16383, "fdff"),
            (16384, "02000100"),
            (1073741823, "feffffff"),
            (1073741824, "0300000040"),
        ];
        for (value, expected) in cases {
            assert_eq!(hex(&encode_compact(*value)), *expected, "compact({value})");
        }
    }

    #[test]
    fn test_compact_big_integer_mode() {
        use parity_scale_codec::{Compact, Encode};
        for value in [1u128 << 32, u64::MAX as u128, 1 << 100, u128::MAX] {
            assert_eq!(encode_compact(value), Compact(value).encode());
        }
    }

    #[test]
    fn test_fixed_width_integers() {
        assert_eq!(hex(&encode_uint(255, 8)), "ff");
        assert_eq!(hex(&encode_uint(0x1234, 16)), "3412");
        assert_eq!(hex(&encode_uint(0xdeadbeef, 32)), "efbeadde");
        assert_eq!(hex(&encode_uint(1, 64)), "0100000000000000");
        assert_eq!(hex(&encode_uint(1, 128)), format!("01{}", "00".repeat(15)));
        assert_eq!(encode_uint(1, 256).len(), 32);
    }

    #[test]
    fn test_signed_integers() {
        assert_eq!(hex(&encode_int(-1, 8)), "ff");
        assert_eq!(hex(&encode_int(-2, 16)), "feff");
        assert_eq!(hex(&encode_int(i128::from(i32::MIN), 32)), "00000080");
        assert_eq!(encode_int(-1, 128), vec![0xff; 16]);
    }

    #[test]
    fn test_bytes_bool_option() {
        assert_eq!(hex(&encode_bytes(&[])), "00");
        assert_eq!(hex(&encode_bytes(&[1, 2, 3, 4])), "1001020304");
        assert_eq!(encode_bool(true), vec![0x01]);
        assert_eq!(encode_bool(false), vec![0x00]);
        assert_eq!(hex(&encode_option(None)), "00");
        assert_eq!(hex(&encode_option(Some(vec![0xde, 0xad]))), "01dead");
        assert_eq!(hex(&encode_option(Some(encode_bool(true)))), "0101");
        assert_eq!(hex(&encode_option(Some(encode_bool(false)))), "0100");
    }

    #[test]
    fn test_compact_max() {
        assert_eq!(compact_max(CompactWidth::U8), 255);
        assert_eq!(compact_max(CompactWidth::U32), u32::MAX as u128);
        assert_eq!(compact_max(CompactWidth::U128), u128::MAX);
    }
}
