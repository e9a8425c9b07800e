use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Image bytes attached to a turn, sent inline to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineImage {
    mime_type: String,
    data: Vec<u8>,
}

impl InlineImage {
    /// # Errors
    ///
    /// - `InvalidFormat` if `mime_type` is not an `image/*` type
    /// - `EmptyField` if `data` is empty
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Result<Self, ValidationError> {
        let mime_type = mime_type.into();
        if !mime_type.starts_with("image/") {
            return Err(ValidationError::invalid_format(
                "mime_type",
                format!("expected image/*, got {}", mime_type),
            ));
        }
        if data.is_empty() {
            return Err(ValidationError::empty_field("data"));
        }
        Ok(Self { mime_type, data })
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    /// `data:` URI accepted by multimodal chat APIs.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

/// One user turn: free text plus optional images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTurn {
    prompt: String,
    images: Vec<InlineImage>,
}

impl UserTurn {
    /// # Errors
    ///
    /// - `EmptyField` if the prompt is blank
    pub fn new(prompt: impl Into<String>) -> Result<Self, ValidationError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(ValidationError::empty_field("prompt"));
        }
        Ok(Self {
            prompt,
            images: Vec::new(),
        })
    }

    pub fn with_image(mut self, image: InlineImage) -> Self {
        self.images.push(image);
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn images(&self) -> &[InlineImage] {
        &self.images
    }

    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_requires_image_mime_type() {
        assert!(InlineImage::new("application/pdf", vec![1]).is_err());
        assert!(InlineImage::new("image/png", vec![]).is_err());
    }

    #[test]
    fn data_uri_embeds_base64() {
        let image = InlineImage::new("image/png", b"abc".to_vec()).unwrap();
        assert_eq!(image.data_uri(), "data:image/png;base64,YWJj");
    }

    #[test]
    fn turn_rejects_blank_prompt() {
        assert!(UserTurn::new("   ").is_err());
        let turn = UserTurn::new("check this").unwrap();
        assert!(!turn.has_images());
    }
}
