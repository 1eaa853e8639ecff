use ndarray::ArrayView3;

const CHANNELS: usize = 3;

/// A decoded image: contiguous 8-bit RGB bytes in row-major order.
///
/// Format conversion happens at decode/encode boundaries only; everything
/// in between works on this type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl RasterImage {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
        }
    }

    /// An image filled with a single color.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take((width as usize) * (height as usize) * CHANNELS)
            .collect();
        Self::new(data, width, height)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = ((y as usize) * (self.width as usize) + x as usize) * CHANNELS;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(
            (self.height as usize, self.width as usize, CHANNELS),
            &self.data,
        )
        .expect("RasterImage data length must match dimensions")
    }

    /// FNV-1a hash over dimensions and pixels.
    pub fn checksum(&self) -> u64 {
        const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0100_0000_01b3;
        let header = self
            .width
            .to_le_bytes()
            .into_iter()
            .chain(self.height.to_le_bytes());
        header
            .chain(self.data.iter().copied())
            .fold(OFFSET, |hash, byte| (hash ^ byte as u64).wrapping_mul(PRIME))
    }

    pub fn into_rgb_image(self) -> image::RgbImage {
        image::RgbImage::from_raw(self.width, self.height, self.data)
            .expect("RasterImage data length must match dimensions")
    }

    /// RGBA bytes for display surfaces that want an alpha channel.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.data
            .chunks_exact(CHANNELS)
            .flat_map(|px| [px[0], px[1], px[2], u8::MAX])
            .collect()
    }
}

impl From<image::RgbImage> for RasterImage {
    fn from(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(img.into_raw(), width, height)
    }
}
