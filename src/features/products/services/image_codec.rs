//! Base64 transport encoding for product image payloads.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::prelude::*;

use crate::core::error::{AppError, Result};

/// Standard alphabet; trailing `=` padding may be present or omitted
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Drop a `data:<mime>;base64,` header, cutting at the first comma
pub fn strip_data_uri_prefix(encoded: &str) -> &str {
    if encoded.starts_with("data:") {
        if let Some((_, payload)) = encoded.split_once(',') {
            return payload;
        }
    }
    encoded
}

/// Decode the image at `index` of a submitted list
pub fn decode_image(index: usize, encoded: &str) -> Result<Vec<u8>> {
    LENIENT_STANDARD
        .decode(strip_data_uri_prefix(encoded))
        .map_err(|e| {
            AppError::invalid_field(
                format!("images[{}]", index),
                format!("Invalid base64 image data at index {}: {}", index, e),
            )
        })
}

pub fn encode_image(bytes: &[u8]) -> String {
    BASE64_STANDARD.encode(bytes)
}
