//! # Bitmap Graphics Commands
//!
//! This module implements the `DC2 *` bitmap transfer used by the printer.
//!
//! ## Bit Packing
//!
//! Bitmaps are 1 bit per pixel, row-major, `ceil(width / 8)` bytes per row:
//! - Bit 7 (MSB) = leftmost dot
//! - 1 = black (print), 0 = white
//!
//! ## Clipping
//!
//! The head is 384 dots (48 bytes) wide. Rows wider than that are clipped:
//! only the first 48 bytes of each row are sent and the rest of the row is
//! skipped.
//!
//! ```text
//! source row (50 bytes):  [ 48 bytes sent ........................ | 2 skipped ]
//! ```
//!
//! ## Chunking
//!
//! Rows are sent in chunks of at most 255 rows, each with its own header:
//!
//! | Format  | Bytes |
//! |---------|-------|
//! | ASCII   | DC2 * r n d1...dk |
//! | Decimal | 18 42 r n d1...dk |
//!
//! - `r`: rows in this chunk (1-255)
//! - `n`: bytes per row after clipping (1-48)
//! - `k = r × n`
//!
//! Large chunks leave visible feed gaps between chunks on tall images;
//! line-at-a-time mode sends one row per chunk, which prints smoothly at
//! the cost of a 4-byte header per row. The caller picks the tradeoff.

use super::commands::DC2;
use crate::error::ThermalError;

/// Printable width of the head in dots.
pub const MAX_WIDTH_DOTS: u16 = 384;

/// Printable width of the head in bytes.
pub const MAX_ROW_BYTES: usize = 48;

/// Maximum rows in one `DC2 *` chunk.
pub const MAX_CHUNK_ROWS: u16 = 255;

/// Geometry of a bitmap transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapLayout {
    /// Bytes per source row: `ceil(width / 8)`
    pub row_bytes: usize,
    /// Bytes per row actually sent: `min(row_bytes, 48)`
    pub clipped_row_bytes: usize,
    /// Number of rows
    pub height: u16,
    /// Rows per chunk: 1 in line-at-a-time mode, else 255
    pub max_chunk_rows: u16,
}

/// One `DC2 *` chunk of a bitmap transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// First source row of the chunk
    pub start_row: u16,
    /// Number of rows in the chunk
    pub rows: u16,
}

impl BitmapLayout {
    /// Compute the layout for a `width` × `height` bitmap.
    ///
    /// ```
    /// use thermald::protocol::graphics::BitmapLayout;
    ///
    /// let layout = BitmapLayout::new(400, 10, false);
    /// assert_eq!(layout.row_bytes, 50);
    /// assert_eq!(layout.clipped_row_bytes, 48);
    /// ```
    pub fn new(width: u16, height: u16, line_at_a_time: bool) -> Self {
        let row_bytes = (width as usize).div_ceil(8);
        Self {
            row_bytes,
            clipped_row_bytes: row_bytes.min(MAX_ROW_BYTES),
            height,
            max_chunk_rows: if line_at_a_time { 1 } else { MAX_CHUNK_ROWS },
        }
    }

    /// Bytes the source buffer must contain.
    pub fn required_len(&self) -> usize {
        self.row_bytes * self.height as usize
    }

    /// Reject buffers shorter than the declared geometry.
    pub fn validate(&self, bitmap: &[u8]) -> Result<(), ThermalError> {
        if bitmap.len() < self.required_len() {
            return Err(ThermalError::Bitmap(format!(
                "buffer holds {} bytes, {} rows of {} bytes need {}",
                bitmap.len(),
                self.height,
                self.row_bytes,
                self.required_len()
            )));
        }
        Ok(())
    }

    /// Chunks covering all rows, in order.
    pub fn chunks(&self) -> impl Iterator<Item = Chunk> + '_ {
        (0..self.height)
            .step_by(self.max_chunk_rows as usize)
            .map(|start_row| Chunk {
                start_row,
                rows: (self.height - start_row).min(self.max_chunk_rows),
            })
    }

    /// `DC2 * r n` header for a chunk.
    pub fn chunk_header(&self, chunk: &Chunk) -> Vec<u8> {
        vec![DC2, b'*', chunk.rows as u8, self.clipped_row_bytes as u8]
    }

    /// Row data of a chunk with each row clipped to 48 bytes.
    pub fn chunk_data(&self, bitmap: &[u8], chunk: &Chunk) -> Vec<u8> {
        let mut data = Vec::with_capacity(chunk.rows as usize * self.clipped_row_bytes);
        for row in chunk.start_row..chunk.start_row + chunk.rows {
            let start = row as usize * self.row_bytes;
            data.extend_from_slice(&bitmap[start..start + self.clipped_row_bytes]);
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_bytes_round_up() {
        assert_eq!(BitmapLayout::new(1, 1, false).row_bytes, 1);
        assert_eq!(BitmapLayout::new(8, 1, false).row_bytes, 1);
        assert_eq!(BitmapLayout::new(9, 1, false).row_bytes, 2);
        assert_eq!(BitmapLayout::new(384, 1, false).clipped_row_bytes, 48);
    }

    #[test]
    fn test_single_chunk() {
        let layout = BitmapLayout::new(400, 10, false);
        let chunks: Vec<_> = layout.chunks().collect();
        assert_eq!(chunks, vec![Chunk { start_row: 0, rows: 10 }]);
        assert_eq!(layout.chunk_header(&chunks[0]), vec![18, 42, 10, 48]);
    }

    #[test]
    fn test_chunks_split_at_255() {
        let layout = BitmapLayout::new(384, 600, false);
        let chunks: Vec<_> = layout.chunks().collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], Chunk { start_row: 0, rows: 255 });
        assert_eq!(chunks[1], Chunk { start_row: 255, rows: 255 });
        assert_eq!(chunks[2], Chunk { start_row: 510, rows: 90 });
    }

    #[test]
    fn test_line_at_a_time() {
        let layout = BitmapLayout::new(16, 3, true);
        let rows: Vec<_> = layout.chunks().map(|c| c.rows).collect();
        assert_eq!(rows, vec![1, 1, 1]);
    }

    #[test]
    fn test_empty_bitmap_has_no_chunks() {
        assert_eq!(BitmapLayout::new(384, 0, false).chunks().count(), 0);
    }

    #[test]
    fn test_chunk_data_skips_clipped_bytes() {
        // 50 bytes per row: row 0 is all 1s, row 1 is all 2s
        let layout = BitmapLayout::new(400, 2, false);
        let mut bitmap = vec![1u8; 50];
        bitmap.extend(vec![2u8; 50]);

        let chunk = layout.chunks().next().unwrap();
        let data = layout.chunk_data(&bitmap, &chunk);
        assert_eq!(data.len(), 96);
        assert!(data[..48].iter().all(|&b| b == 1));
        assert!(data[48..].iter().all(|&b| b == 2));
    }

    #[test]
    fn test_validate() {
        let layout = BitmapLayout::new(16, 4, false);
        assert!(layout.validate(&[0; 8]).is_ok());
        assert!(layout.validate(&[0; 7]).is_err());
    }
}
