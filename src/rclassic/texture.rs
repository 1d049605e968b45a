//! Column-major texture storage (spec §6, §9 "texture storage contract").
//!
//! The original stores wall textures transposed: `image[x * height + y]`
//! rather than the row-major `image[y * width + x]` a naive port would
//! reach for. The column rasterizer walks a texture column top-to-bottom
//! (really bottom-to-up, see `rclassic::wall::draw_column_lit`) for every
//! screen column it draws, so column-major storage makes that walk a
//! sequential memory scan instead of a strided one. `height` is required to
//! be a power of two so indexing can use a shift (`log_size_y`) instead of a
//! division.

use super::error::RclassicError;

/// An owned, column-major texture. `image.len() == width * height`.
#[derive(Clone, Debug)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    /// `log2(height)`, used by [`TextureFrame::texel`] to turn a `u << log_size_y`
    /// shift into the column's byte offset instead of a `u * height` multiply.
    pub log_size_y: u32,
    /// Column-major: `image[x * height + y]`.
    image: Vec<u8>,
}

impl Texture {
    pub fn new(width: u32, height: u32, image: Vec<u8>) -> Result<Self, RclassicError> {
        if !height.is_power_of_two() {
            return Err(RclassicError::NonPowerOfTwoHeight(height));
        }
        assert_eq!(
            image.len(),
            (width as usize) * (height as usize),
            "image buffer does not match width*height"
        );
        Ok(Self {
            width,
            height,
            log_size_y: height.trailing_zeros(),
            image,
        })
    }

    pub fn as_frame(&self) -> TextureFrame<'_> {
        TextureFrame {
            width: self.width,
            height: self.height,
            log_size_y: self.log_size_y,
            image: &self.image,
        }
    }
}

/// A borrowed view over a [`Texture`], the shape the original's
/// `TextureData*` pointer-plus-dimensions argument takes. Column rasterizers
/// only ever need a read-only view.
#[derive(Clone, Copy, Debug)]
pub struct TextureFrame<'a> {
    pub width: u32,
    pub height: u32,
    pub log_size_y: u32,
    pub image: &'a [u8],
}

impl<'a> TextureFrame<'a> {
    /// Reads the texel at column `x`, row `y`, both wrapped to the texture's
    /// dimensions (every wall texture tiles, spec §4.4).
    #[inline]
    pub fn texel(&self, x: i32, y: i32) -> u8 {
        let xw = x.rem_euclid(self.width as i32) as u32;
        let yw = y.rem_euclid(self.height as i32) as u32;
        let offset = (xw << self.log_size_y) + yw;
        self.image[offset as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(w: u32, h: u32) -> Texture {
        let mut img = vec![0u8; (w * h) as usize];
        for x in 0..w {
            for y in 0..h {
                img[(x * h + y) as usize] = ((x + y) % 2) as u8;
            }
        }
        Texture::new(w, h, img).unwrap()
    }

    #[test]
    fn rejects_non_power_of_two_height() {
        assert!(Texture::new(4, 3, vec![0; 12]).is_err());
    }

    #[test]
    fn log_size_y_matches_height() {
        let t = checker(16, 32);
        assert_eq!(t.log_size_y, 5);
    }

    #[test]
    fn texel_reads_column_major_layout() {
        let t = checker(4, 4);
        let f = t.as_frame();
        assert_eq!(f.texel(1, 0), 1);
        assert_eq!(f.texel(0, 1), 1);
        assert_eq!(f.texel(2, 2), 0);
    }

    #[test]
    fn texel_wraps_out_of_range_coords() {
        let t = checker(4, 4);
        let f = t.as_frame();
        assert_eq!(f.texel(4, 0), f.texel(0, 0));
        assert_eq!(f.texel(-1, 0), f.texel(3, 0));
    }
}
