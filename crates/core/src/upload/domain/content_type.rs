/// Image formats the service accepts, identified by declared MIME type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageContentType {
    Jpeg,
    Png,
    Webp,
}

/// The upload allow-list. Anything else is an invalid file type.
pub const ALLOWED_CONTENT_TYPES: [ImageContentType; 3] = [
    ImageContentType::Jpeg,
    ImageContentType::Png,
    ImageContentType::Webp,
];

impl ImageContentType {
    /// Parse a declared content type against the allow-list.
    ///
    /// Case-insensitive; surrounding whitespace and `;` parameters are ignored.
    pub fn parse(declared: &str) -> Option<Self> {
        let essence = declared
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        ALLOWED_CONTENT_TYPES
            .into_iter()
            .find(|allowed| allowed.as_str() == essence)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageContentType::Jpeg => "image/jpeg",
            ImageContentType::Png => "image/png",
            ImageContentType::Webp => "image/webp",
        }
    }
}
