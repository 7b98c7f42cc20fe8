//! Bit/byte decoder.
//!
//! Every cell of a frame carries one bit: white is `1`, black is `0`.
//! Eight horizontally adjacent cells form a byte, most significant bit
//! on the left. Rows are emitted bottom-up (`height - 1` first) because
//! the sampled surface is vertically flipped relative to the encoder.

use crate::error::VidlinkError;
use crate::grid::{GridGeometry, PixelGrid};

/// A cell decodes to `1` only when its grayscale is strictly above this.
pub const GRAY_THRESHOLD: f32 = 0.5;

/// Decode a grid into bytes.
///
/// Output length is always `(width * height) / 8`. Trailing cells of a
/// row that do not fill a whole group are dropped without error, which
/// leaves zero bytes at the end of the output.
pub fn decode(grid: &PixelGrid) -> Vec<u8> {
    let mut out = Vec::with_capacity(grid.geometry().payload_len());
    decode_into(grid, &mut out);
    out
}

/// Like [`decode`], appending to an existing buffer.
pub fn decode_into(grid: &PixelGrid, out: &mut Vec<u8>) {
    let start = out.len();
    let len = grid.geometry().payload_len();
    out.reserve(len);
    for y in (0..grid.height()).rev() {
        for group in grid.row(y).chunks_exact(8) {
            out.push(pack_group(group));
        }
    }
    out.resize(start + len, 0);
}

/// Decode a grid whose dimensions must be multiples of 8.
pub fn decode_checked(grid: &PixelGrid) -> Result<Vec<u8>, VidlinkError> {
    GridGeometry::new(grid.width(), grid.height())?;
    Ok(decode(grid))
}

/// Render `payload` into a grid of the given geometry.
///
/// Inverse of [`decode`]: set bits become `1.0`, everything else
/// (including unused capacity) `0.0`.
pub fn encode(payload: &[u8], geometry: GridGeometry) -> Result<PixelGrid, VidlinkError> {
    // Only whole groups carry data.
    let max = (geometry.width as usize / 8) * geometry.height as usize;
    if payload.len() > max {
        return Err(VidlinkError::PayloadTooLarge {
            size: payload.len(),
            max,
        });
    }

    let mut grid = PixelGrid::filled(geometry.width, geometry.height, 0.0);
    let groups_per_row = geometry.width as usize / 8;
    if groups_per_row == 0 {
        return Ok(grid);
    }

    for (index, &byte) in payload.iter().enumerate() {
        let y = geometry.height - 1 - (index / groups_per_row) as u32;
        let x0 = ((index % groups_per_row) * 8) as u32;
        for i in 0..8 {
            if byte & (1 << (7 - i)) != 0 {
                grid.set_gray(x0 + i, y, 1.0);
            }
        }
    }
    Ok(grid)
}

fn pack_group(group: &[f32]) -> u8 {
    group.iter().enumerate().fold(0u8, |byte, (i, &gray)| {
        if gray > GRAY_THRESHOLD {
            byte | (1 << (7 - i))
        } else {
            byte
        }
    })
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn output_length_is_cells_over_eight() {
        for (w, h) in [(8, 8), (16, 8), (64, 32), (128, 72)] {
            let grid = PixelGrid::filled(w, h, 0.0);
            assert_eq!(decode(&grid).len(), (w * h / 8) as usize, "{w}x{h}");
        }
    }

    #[test]
    fn all_white_is_ff_all_black_is_zero() {
        let white = PixelGrid::filled(32, 16, 1.0);
        assert!(decode(&white).iter().all(|&b| b == 0xFF));

        let black = PixelGrid::filled(32, 16, 0.0);
        assert!(decode(&black).iter().all(|&b| b == 0x00));
    }

    #[test]
    fn threshold_is_strict() {
        let at = PixelGrid::filled(8, 1, 0.5);
        assert_eq!(decode(&at), vec![0x00]);

        let above = PixelGrid::filled(8, 1, 0.5 + f32::EPSILON);
        assert_eq!(decode(&above), vec![0xFF]);
    }

    #[test]
    fn leftmost_cell_is_msb() {
        let mut grid = PixelGrid::filled(8, 1, 0.0);
        grid.set_gray(0, 0, 1.0);
        assert_eq!(decode(&grid), vec![0x80]);

        let mut grid = PixelGrid::filled(8, 1, 0.0);
        grid.set_gray(7, 0, 1.0);
        assert_eq!(decode(&grid), vec![0x01]);
    }

    #[test]
    fn bottom_row_decodes_first() {
        let mut grid = PixelGrid::filled(8, 16, 0.0);
        for x in 0..8 {
            grid.set_gray(x, 15, 1.0);
        }
        let bytes = decode(&grid);
        assert_eq!(bytes.len(), 16);
        assert_eq!(bytes[0], 0xFF);
        assert!(bytes[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn groups_left_to_right_within_row() {
        let mut grid = PixelGrid::filled(16, 8, 0.0);
        grid.set_gray(8, 7, 1.0);
        let bytes = decode(&grid);
        assert_eq!(&bytes[..2], &[0x00, 0x80]);
    }

    #[test]
    fn partial_group_is_dropped_and_zero_filled() {
        let grid = PixelGrid::filled(12, 2, 1.0);
        assert_eq!(decode(&grid), vec![0xFF, 0xFF, 0x00]);
        assert_eq!(decode(&grid).len(), (12 * 2) / 8);
    }

    #[test]
    fn unaligned_output_length_matches_cell_count() {
        for (w, h) in [(12, 2), (9, 8), (4, 4), (20, 3)] {
            let grid = PixelGrid::filled(w, h, 1.0);
            assert_eq!(decode(&grid).len(), (w * h) as usize / 8, "{w}x{h}");
        }
    }

    #[test]
    fn decode_into_pads_unaligned_grid_after_existing_bytes() {
        let mut out = vec![0xAA];
        decode_into(&PixelGrid::filled(12, 2, 1.0), &mut out);
        assert_eq!(out, vec![0xAA, 0xFF, 0xFF, 0x00]);
    }

    #[test]
    fn checked_decode_refuses_unaligned() {
        let grid = PixelGrid::filled(12, 8, 1.0);
        assert!(matches!(
            decode_checked(&grid),
            Err(VidlinkError::InvalidGeometry(_))
        ));
        assert!(decode_checked(&PixelGrid::filled(16, 8, 1.0)).is_ok());
    }

    #[test]
    fn decode_into_appends() {
        let mut out = vec![0xAA];
        decode_into(&PixelGrid::filled(8, 1, 1.0), &mut out);
        assert_eq!(out, vec![0xAA, 0xFF]);
    }

    #[test]
    fn encode_rejects_oversized_payload() {
        let geometry = GridGeometry::new(8, 8).unwrap();
        let err = encode(&[0u8; 9], geometry).unwrap_err();
        assert!(matches!(err, VidlinkError::PayloadTooLarge { size: 9, max: 8 }));
    }

    #[test]
    fn encode_pads_with_zeros() {
        let geometry = GridGeometry::new(16, 8).unwrap();
        let grid = encode(b"hi", geometry).unwrap();
        let bytes = decode(&grid);
        assert_eq!(&bytes[..2], b"hi");
        assert!(bytes[2..].iter().all(|&b| b == 0));
    }

    proptest! {
        #[test]
        fn encode_then_decode_reproduces_payload(
            payload in proptest::collection::vec(any::<u8>(), 0..=128),
        ) {
            let geometry = GridGeometry::new(64, 16).unwrap();
            let grid = encode(&payload, geometry).unwrap();
            let decoded = decode(&grid);
            prop_assert_eq!(&decoded[..payload.len()], &payload[..]);
        }
    }
}
