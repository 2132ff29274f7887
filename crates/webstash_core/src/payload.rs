//! Opaque byte payloads.

use bytes::Bytes;

/// Media type attached to payloads created from text.
pub const TEXT_PLAIN: &str = "text/plain";

/// An opaque byte payload with an optional media-type tag.
///
/// Cloning is cheap: the bytes are reference counted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Payload {
    data: Bytes,
    media_type: Option<String>,
}

impl Payload {
    /// Creates an untagged payload.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            media_type: None,
        }
    }

    /// Creates a payload tagged with `media_type`.
    pub fn with_media_type(data: impl Into<Bytes>, media_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            media_type: Some(media_type.into()),
        }
    }

    /// Encodes `text` as UTF-8 and tags it `text/plain`.
    pub fn text(text: &str) -> Self {
        Self::with_media_type(Bytes::copy_from_slice(text.as_bytes()), TEXT_PLAIN)
    }

    /// Returns the bytes.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Returns the media type, if tagged.
    #[must_use]
    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    /// Returns the payload size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Consumes the payload and returns its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}

impl From<Vec<u8>> for Payload {
    fn from(data: Vec<u8>) -> Self {
        Payload::new(data)
    }
}

impl From<&'static [u8]> for Payload {
    fn from(data: &'static [u8]) -> Self {
        Payload::new(Bytes::from_static(data))
    }
}

impl From<Bytes> for Payload {
    fn from(data: Bytes) -> Self {
        Payload::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_payload_is_tagged() {
        let payload = Payload::text("héllo");
        assert_eq!(payload.media_type(), Some(TEXT_PLAIN));
        assert_eq!(payload.size(), 6);
        assert_eq!(payload.data().as_ref(), "héllo".as_bytes());
    }

    #[test]
    fn conversions_are_untagged() {
        let payload = Payload::from(vec![1u8, 2, 3]);
        assert_eq!(payload.media_type(), None);
        assert_eq!(payload.into_bytes().as_ref(), &[1, 2, 3]);
    }
}
