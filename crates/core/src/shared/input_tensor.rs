use std::ops::Deref;

use ndarray::{Array4, ArrayView4};
use zeroize::Zeroize;

/// NCHW float input built from image pixels for one inference call.
///
/// Holds a copy of image content, so it is zeroed on drop like
/// [`PixelArray`](crate::shared::pixel_array::PixelArray). The runtime only
/// ever sees a view of it.
pub struct InputTensor(Array4<f32>);

impl InputTensor {
    pub fn zeros(shape: (usize, usize, usize, usize)) -> Self {
        Self(Array4::zeros(shape))
    }

    pub fn filled(shape: (usize, usize, usize, usize), value: f32) -> Self {
        Self(Array4::from_elem(shape, value))
    }

    pub fn view(&self) -> ArrayView4<'_, f32> {
        self.0.view()
    }

    pub fn set(&mut self, index: [usize; 4], value: f32) {
        self.0[index] = value;
    }

    fn wipe(&mut self) {
        match self.0.as_slice_mut() {
            Some(values) => values.zeroize(),
            None => self.0.fill(0.0),
        }
    }
}

impl Deref for InputTensor {
    type Target = Array4<f32>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Drop for InputTensor {
    fn drop(&mut self) {
        self.wipe();
    }
}

impl std::fmt::Debug for InputTensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputTensor")
            .field("shape", &self.0.shape())
            .finish()
    }
}
