// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-point wire serialization of built trees.
//!
//! A tree crosses process boundaries as a tagged, length-delimited record
//! (protobuf wire compatible) with four fields:
//!
//! | field | wire type        | content                               |
//! |-------|------------------|---------------------------------------|
//! | 1     | varint           | item count (u32)                      |
//! | 2     | length-delimited | `refs`, packed zigzag varints (i64)   |
//! | 3     | length-delimited | scaled boxes, packed zigzag varints   |
//! | 4     | varint           | precision (u32)                       |
//!
//! Coordinates are stored fixed-point: scaled by `10^precision` and rounded
//! to the nearest integer, so precision only bounds coordinate error
//! (`±10^-precision` after a round trip); the count and refs survive
//! exactly. Zero-valued and empty fields are elided, which makes the empty
//! tree a two-byte payload holding only its precision.

use alloc::vec::Vec;
use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::math;
use crate::tree::Tree;

const WIRE_VARINT: u8 = 0;
const WIRE_I64: u8 = 1;
const WIRE_LEN: u8 = 2;
const WIRE_I32: u8 = 5;

const FIELD_COUNT: u64 = 1;
const FIELD_REFS: u64 = 2;
const FIELD_BOXES: u64 = 3;
const FIELD_PRECISION: u64 = 4;

/// Encode `tree` with coordinates rounded to `precision` decimal digits.
///
/// Precision is lossy for coordinates only; see the module docs for the
/// format. Scaled coordinates that exceed the `i64` range saturate.
#[allow(
    clippy::cast_possible_truncation,
    reason = "float-to-int casts saturate, which is the intended overflow behavior"
)]
pub fn serialize(tree: &Tree, precision: u32) -> Bytes {
    let scale = math::pow10(precision);
    let mut buf = BytesMut::new();

    if tree.count > 0 {
        put_tag(&mut buf, FIELD_COUNT, WIRE_VARINT);
        put_uvarint(&mut buf, tree.count as u64);
    }

    if !tree.refs.is_empty() {
        let mut payload = BytesMut::new();
        for &item in &tree.refs {
            put_uvarint(&mut payload, zigzag(item));
        }
        put_tag(&mut buf, FIELD_REFS, WIRE_LEN);
        put_uvarint(&mut buf, payload.len() as u64);
        buf.put_slice(&payload);
    }

    if !tree.boxes.is_empty() {
        let mut payload = BytesMut::new();
        for &coord in &tree.boxes {
            put_uvarint(&mut payload, zigzag(math::round(coord * scale) as i64));
        }
        put_tag(&mut buf, FIELD_BOXES, WIRE_LEN);
        put_uvarint(&mut buf, payload.len() as u64);
        buf.put_slice(&payload);
    }

    if precision > 0 {
        put_tag(&mut buf, FIELD_PRECISION, WIRE_VARINT);
        put_uvarint(&mut buf, u64::from(precision));
    }

    buf.freeze()
}

/// Decode a tree from bytes produced by [`serialize`].
///
/// Empty input is the empty tree. Unknown fields are skipped by wire type;
/// wire-level damage (truncated or overlong varints, truncated payloads)
/// is [`Error::Malformed`].
///
/// The decoder validates the record, not the tree: a well-formed record
/// whose arrays do not describe a consistent tree produces a [`Tree`] whose
/// queries may panic on out-of-range indexing, exactly as if the in-memory
/// arrays had been corrupted.
#[allow(
    clippy::cast_possible_truncation,
    reason = "counts beyond usize::MAX cannot index memory anyway; parity with the format's u32 field"
)]
pub fn deserialize(mut data: &[u8]) -> Result<Tree> {
    let mut count = 0_u64;
    let mut refs: Vec<i64> = Vec::new();
    let mut scaled: Vec<i64> = Vec::new();
    let mut precision = 0_u32;

    while data.has_remaining() {
        let tag = get_uvarint(&mut data)?;
        let field = tag >> 3;
        let wire = (tag & 0x7) as u8;

        match (field, wire) {
            (FIELD_COUNT, WIRE_VARINT) => {
                count = get_uvarint(&mut data)?;
            }
            (FIELD_REFS, WIRE_LEN) => get_packed_sint64(&mut data, &mut refs)?,
            (FIELD_REFS, WIRE_VARINT) => refs.push(unzigzag(get_uvarint(&mut data)?)),
            (FIELD_BOXES, WIRE_LEN) => get_packed_sint64(&mut data, &mut scaled)?,
            (FIELD_BOXES, WIRE_VARINT) => scaled.push(unzigzag(get_uvarint(&mut data)?)),
            (FIELD_PRECISION, WIRE_VARINT) => {
                precision = u32::try_from(get_uvarint(&mut data)?)
                    .map_err(|_| Error::Malformed("precision exceeds 32 bits"))?;
            }
            (_, wire) => skip_field(&mut data, wire)?,
        }
    }

    let scale = math::pow10(precision);
    #[allow(
        clippy::cast_precision_loss,
        reason = "fixed-point decode; the format guarantees at most 10^-precision error"
    )]
    let boxes = scaled.iter().map(|&v| v as f64 / scale).collect();

    Ok(Tree {
        count: count as usize,
        refs,
        boxes,
    })
}

fn put_tag(buf: &mut BytesMut, field: u64, wire: u8) {
    put_uvarint(buf, (field << 3) | u64::from(wire));
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "the value is masked to its low seven bits before the cast"
)]
fn put_uvarint(buf: &mut BytesMut, mut value: u64) {
    while value >= 0x80 {
        buf.put_u8((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

fn get_uvarint(data: &mut &[u8]) -> Result<u64> {
    let mut value = 0_u64;
    let mut shift = 0_u32;
    loop {
        if !data.has_remaining() {
            return Err(Error::Malformed("truncated varint"));
        }
        let byte = data.get_u8();
        if shift == 63 && byte > 1 {
            return Err(Error::Malformed("varint exceeds 64 bits"));
        }
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
        if shift > 63 {
            return Err(Error::Malformed("varint exceeds 64 bits"));
        }
    }
}

fn get_packed_sint64(data: &mut &[u8], out: &mut Vec<i64>) -> Result<()> {
    let len = usize::try_from(get_uvarint(data)?)
        .map_err(|_| Error::Malformed("packed field length exceeds usize"))?;
    if data.remaining() < len {
        return Err(Error::Malformed("truncated packed field"));
    }
    // Copy the inner slice out so reassigning `*data` does not fight the
    // borrow of the split halves.
    let remainder: &[u8] = *data;
    let (mut payload, rest) = remainder.split_at(len);
    *data = rest;
    while payload.has_remaining() {
        out.push(unzigzag(get_uvarint(&mut payload)?));
    }
    Ok(())
}

fn skip_field(data: &mut &[u8], wire: u8) -> Result<()> {
    match wire {
        WIRE_VARINT => {
            get_uvarint(data)?;
        }
        WIRE_I64 => {
            if data.remaining() < 8 {
                return Err(Error::Malformed("truncated fixed64 field"));
            }
            data.advance(8);
        }
        WIRE_LEN => {
            let len = usize::try_from(get_uvarint(data)?)
                .map_err(|_| Error::Malformed("skipped field length exceeds usize"))?;
            if data.remaining() < len {
                return Err(Error::Malformed("truncated length-delimited field"));
            }
            data.advance(len);
        }
        WIRE_I32 => {
            if data.remaining() < 4 {
                return Err(Error::Malformed("truncated fixed32 field"));
            }
            data.advance(4);
        }
        _ => return Err(Error::Malformed("unsupported wire type")),
    }
    Ok(())
}

#[allow(
    clippy::cast_sign_loss,
    reason = "zigzag intentionally reinterprets the sign bit"
)]
const fn zigzag(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

#[allow(
    clippy::cast_possible_wrap,
    reason = "zigzag intentionally reinterprets the sign bit"
)]
const fn unzigzag(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

#[cfg(test)]
mod tests {
    use super::{deserialize, serialize, unzigzag, zigzag};
    use crate::builder::DEFAULT_DEGREE;
    use crate::error::Error;
    use crate::hilbert::HilbertBuilder;
    use crate::omt::OmtBuilder;
    use crate::test_support::{build, fixtures, random_boxes};
    use crate::types::Aabb;
    use alloc::vec::Vec;

    #[test]
    fn zigzag_round_trips_extremes() {
        for v in [0, -1, 1, i64::MIN, i64::MAX, 4611686018427387904] {
            assert_eq!(unzigzag(zigzag(v)), v);
        }
        // Small magnitudes must encode small.
        assert_eq!(zigzag(0), 0);
        assert_eq!(zigzag(-1), 1);
        assert_eq!(zigzag(1), 2);
        assert_eq!(zigzag(-2), 3);
    }

    #[test]
    fn empty_tree_is_two_bytes() {
        let tree = HilbertBuilder::new().finish(DEFAULT_DEGREE).unwrap();
        let data = serialize(&tree, 7);
        assert_eq!(data.as_ref(), &[0x20, 0x07]);

        let back = deserialize(&data).unwrap();
        assert_eq!(back.count(), 0);
        assert!(back.refs.is_empty());
        assert!(back.boxes.is_empty());
    }

    #[test]
    fn empty_input_is_the_empty_tree() {
        let tree = deserialize(&[]).unwrap();
        assert_eq!(tree.count(), 0);
        assert!(tree.refs.is_empty());
        assert!(tree.boxes.is_empty());
    }

    #[test]
    fn round_trip_is_exact_on_quantized_coordinates() {
        // Tenth-of-a-unit coordinates survive precision 1 bit for bit.
        let items: Vec<Aabb> = random_boxes(300, 31)
            .into_iter()
            .map(|b| {
                Aabb::new(
                    (b.min_x * 10.0).round() / 10.0,
                    (b.min_y * 10.0).round() / 10.0,
                    (b.max_x * 10.0).round() / 10.0,
                    (b.max_y * 10.0).round() / 10.0,
                )
            })
            .collect();

        let tree = build(&items, &mut OmtBuilder::new(), DEFAULT_DEGREE);
        let back = deserialize(&serialize(&tree, 1)).unwrap();

        assert_eq!(back.count, tree.count);
        assert_eq!(back.refs, tree.refs);
        assert_eq!(back.boxes, tree.boxes);
    }

    #[test]
    fn round_trip_bounds_coordinate_error_by_precision() {
        for fx in fixtures() {
            for precision in 0..6_u32 {
                let data = serialize(&fx.tree, precision);
                let back = deserialize(&data).unwrap();

                assert_eq!(back.count, fx.tree.count, "{}", fx.name);
                assert_eq!(back.refs, fx.tree.refs, "{}", fx.name);

                assert_eq!(back.boxes.len(), fx.tree.boxes.len(), "{}", fx.name);
                let tolerance = 10_f64.powi(-(precision as i32));
                for (a, b) in fx.tree.boxes.iter().zip(&back.boxes) {
                    assert!(
                        (a - b).abs() <= tolerance,
                        "{}: {a} vs {b} at precision {precision}",
                        fx.name
                    );
                }
            }
        }
    }

    #[test]
    fn unknown_fields_are_skipped() {
        // field 5 varint, field 6 fixed32, field 7 fixed64, field 8
        // length-delimited, then a real count field.
        let data = [
            0x28, 0x2a, // field 5, varint 42
            0x35, 0x01, 0x02, 0x03, 0x04, // field 6, fixed32
            0x39, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, // field 7, fixed64
            0x42, 0x02, 0xaa, 0xbb, // field 8, two bytes
            0x08, 0x09, // field 1, count = 9
        ];
        let tree = deserialize(&data).unwrap();
        assert_eq!(tree.count(), 9);
    }

    #[test]
    fn wire_damage_is_rejected() {
        // Truncated varint: continuation bit set at end of input.
        assert_eq!(
            deserialize(&[0x08, 0x80]).unwrap_err(),
            Error::Malformed("truncated varint")
        );
        // Overlong varint: eleven continuation bytes.
        assert_eq!(
            deserialize(&[0x08, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02])
                .unwrap_err(),
            Error::Malformed("varint exceeds 64 bits")
        );
        // Packed field promising more bytes than remain.
        assert_eq!(
            deserialize(&[0x12, 0x05, 0x01]).unwrap_err(),
            Error::Malformed("truncated packed field")
        );
        // Wire types 3/4 (group markers) are not part of this format.
        assert_eq!(
            deserialize(&[0x2b]).unwrap_err(),
            Error::Malformed("unsupported wire type")
        );
    }

    #[test]
    fn single_varint_encoding_of_repeated_fields_is_accepted() {
        // field 2 as one unpacked sint64 (= -3), field 1 count = 1.
        let data = [0x10, 0x05, 0x08, 0x01];
        let tree = deserialize(&data).unwrap();
        assert_eq!(tree.count(), 1);
        assert_eq!(tree.refs, [-3]);
    }
}
