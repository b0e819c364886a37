use super::BoundingBox;

const CHANNELS: usize = 4;

// Decoded picture, always RGBA8 row-major
#[derive(Clone, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

// Pixel dumps are useless in test failures
impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Image({}x{})", self.width, self.height)
    }
}

impl Image {
    // None when the buffer length doesn't match the dimensions
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize * CHANNELS {
            return None;
        }

        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * CHANNELS)
            .collect();

        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let idx = self.offset(x, y);
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.pixels[idx..idx + CHANNELS]);

        Some(px)
    }

    // Copy of the box area, clamped to the picture
    pub fn crop(&self, bbox: &BoundingBox) -> Image {
        let (x1, y1, x2, y2) = self.clamp(bbox);
        let (w, h) = (x2 - x1, y2 - y1);

        let mut pixels = Vec::with_capacity(w as usize * h as usize * CHANNELS);
        for y in y1..y2 {
            let start = self.offset(x1, y);
            pixels.extend_from_slice(&self.pixels[start..start + w as usize * CHANNELS]);
        }

        Image {
            width: w,
            height: h,
            pixels,
        }
    }

    // Writes `other` with its top left corner at (x, y). Whatever falls
    // outside of the picture is dropped.
    pub fn paste(&mut self, other: &Image, x: u32, y: u32) {
        for oy in 0..other.height {
            let ty = y + oy;
            if ty >= self.height {
                break;
            }

            for ox in 0..other.width {
                let tx = x + ox;
                if tx >= self.width {
                    break;
                }

                let src = other.offset(ox, oy);
                let dst = self.offset(tx, ty);
                self.pixels[dst..dst + CHANNELS].copy_from_slice(&other.pixels[src..src + CHANNELS]);
            }
        }
    }

    // Box outline, used to annotate detections
    pub fn draw_box(&mut self, bbox: &BoundingBox, rgba: [u8; 4], thickness: u32) {
        let (x1, y1, x2, y2) = self.clamp(bbox);
        if x1 == x2 || y1 == y2 {
            return;
        }

        for y in y1..y2 {
            for x in x1..x2 {
                let on_edge = x < x1 + thickness
                    || x + thickness >= x2
                    || y < y1 + thickness
                    || y + thickness >= y2;

                if on_edge {
                    let dst = self.offset(x, y);
                    self.pixels[dst..dst + CHANNELS].copy_from_slice(&rgba);
                }
            }
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    // Box corners as pixel indices inside the picture, x1 <= x2 and y1 <= y2
    fn clamp(&self, bbox: &BoundingBox) -> (u32, u32, u32, u32) {
        let clamp_x = |v: f32| (v.max(0.) as u32).min(self.width);
        let clamp_y = |v: f32| (v.max(0.) as u32).min(self.height);

        let (x1, x2) = (clamp_x(bbox.x1), clamp_x(bbox.x2));
        let (y1, y2) = (clamp_y(bbox.y1), clamp_y(bbox.y2));

        (x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2))
    }
}
