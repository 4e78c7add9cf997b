use zeroize::Zeroize;

use crate::shared::transient::{BufferKind, ReleaseHook};

/// The uploaded payload exactly as received: opaque bytes plus the content
/// type the client declared for them.
///
/// Zeroed on drop. Never cloned; one verification owns it.
pub struct RawUpload {
    bytes: Vec<u8>,
    content_type: String,
    hook: Option<ReleaseHook>,
}

impl RawUpload {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
            hook: None,
        }
    }

    /// Attach release tracking. Reports the acquisition immediately.
    pub fn tracked(mut self, hook: &ReleaseHook) -> Self {
        hook.acquired(BufferKind::Upload);
        self.hook = Some(hook.clone());
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for RawUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawUpload")
            .field("len", &self.bytes.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}

impl Drop for RawUpload {
    fn drop(&mut self) {
        self.bytes.zeroize();
        if let Some(hook) = self.hook.take() {
            hook.released(BufferKind::Upload);
        }
    }
}
