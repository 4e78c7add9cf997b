use ndarray::ArrayView3;
use zeroize::Zeroize;

use crate::shared::face_region::FaceRegion;
use crate::shared::transient::{BufferKind, ReleaseHook};

/// A decoded image: contiguous 8-bit RGB samples in row-major order.
///
/// Owned by a single verification; the sample buffer is zeroed when the
/// array is dropped, and an attached [`ReleaseHook`] is told about it.
pub struct PixelArray {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    hook: Option<(ReleaseHook, BufferKind)>,
}

impl PixelArray {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            hook: None,
        }
    }

    /// Attach release tracking. Reports the acquisition immediately.
    pub fn tracked(mut self, hook: &ReleaseHook, kind: BufferKind) -> Self {
        hook.acquired(kind);
        self.hook = Some((hook.clone(), kind));
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("PixelArray data length must match dimensions")
    }

    /// Copy the pixels covered by `region` into a new array.
    ///
    /// The region is clamped to the image first. The copy inherits this
    /// array's release hook and is reported as a [`BufferKind::FaceCrop`].
    pub fn crop(&self, region: &FaceRegion) -> PixelArray {
        let clamped = region.clamp_to(self.width, self.height);
        let x = clamped.x as usize;
        let y = clamped.y as usize;
        let w = clamped.width as usize;
        let h = clamped.height as usize;
        let c = self.channels as usize;
        let stride = self.width as usize * c;

        let mut data = Vec::with_capacity(w * h * c);
        for row in y..y + h {
            let start = row * stride + x * c;
            data.extend_from_slice(&self.data[start..start + w * c]);
        }

        let crop = PixelArray::new(data, w as u32, h as u32, self.channels);
        match &self.hook {
            Some((hook, _)) => crop.tracked(hook, BufferKind::FaceCrop),
            None => crop,
        }
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

impl std::fmt::Debug for PixelArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelArray")
            .field("channels", &self.channels)
            .field("len", &self.data.len())
            .finish()
    }
}

impl Drop for PixelArray {
    fn drop(&mut self) {
        self.data.zeroize();
        if let Some((hook, kind)) = self.hook.take() {
            hook.released(kind);
        }
    }
}
