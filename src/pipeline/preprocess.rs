//! Image normalization for classifier input.
//!
//! Accepts a lesion photo as a tagged input variant (the caller decides the
//! encoding — no probing), decodes it, corrects EXIF orientation, and
//! produces a fixed-shape `[1, 224, 224, 3]` float tensor scaled to [0, 1].

use std::io::{Cursor, Read};

use base64::Engine;
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::debug;

use super::DecodeError;

/// Square input dimension required by the classifier.
pub const INPUT_SIZE: u32 = 224;

/// Color channels after normalization (RGB).
pub const CHANNELS: usize = 3;

/// Maximum input image size (in bytes) before rejecting.
/// Prevents OOM on corrupt/adversarial files.
const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024; // 50 MB

/// Minimum valid image size in bytes (smallest valid PNG is ~67 bytes).
const MIN_IMAGE_BYTES: usize = 67;

/// One lesion photo, tagged with how it was encoded by the caller.
pub enum ImageInput {
    /// Base64 data URI (`data:image/jpeg;base64,/9j/...`).
    DataUri(String),
    /// Raw encoded image bytes (JPEG, PNG, TIFF).
    Bytes(Vec<u8>),
    /// An opened file-like handle. Read to completion before decoding.
    Reader(Box<dyn Read + Send>),
}

impl std::fmt::Debug for ImageInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataUri(s) => write!(f, "ImageInput::DataUri({} chars)", s.len()),
            Self::Bytes(b) => write!(f, "ImageInput::Bytes({} bytes)", b.len()),
            Self::Reader(_) => write!(f, "ImageInput::Reader"),
        }
    }
}

/// Normalized classifier input: NHWC float data in [0, 1].
#[derive(Debug, Clone)]
pub struct ImageTensor {
    pub data: Vec<f32>,
    /// `[batch, height, width, channels]` — always `[1, 224, 224, 3]`.
    pub shape: [usize; 4],
}

impl ImageTensor {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Decode and normalize a lesion photo into classifier input.
///
/// Steps: materialize bytes → validate size bounds → decode → fix EXIF
/// orientation → convert to RGB → stretch-resize to 224×224 → scale to
/// [0, 1] with a leading batch dimension.
pub fn to_tensor(input: ImageInput) -> Result<ImageTensor, DecodeError> {
    let bytes = into_bytes(input)?;
    validate_image_bytes(&bytes)?;

    let img = image::load_from_memory(&bytes)
        .map_err(|e| DecodeError::InvalidImage(e.to_string()))?;
    let (orig_w, orig_h) = (img.width(), img.height());

    // Phone photos embed rotation in EXIF tag 0x0112 — without correction,
    // portrait shots reach the model sideways.
    let img = apply_orientation(img, read_exif_orientation(&bytes));

    let rgb = img.to_rgb8();
    // The classifier was trained on stretched squares, not letterboxed ones.
    let resized = image::imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom);

    let side = INPUT_SIZE as usize;
    let mut data = Vec::with_capacity(side * side * CHANNELS);
    for pixel in resized.pixels() {
        for channel in pixel.0 {
            data.push(channel as f32 / 255.0);
        }
    }

    debug!(
        original = format!("{orig_w}x{orig_h}"),
        output = format!("{INPUT_SIZE}x{INPUT_SIZE}"),
        "Image normalized for classifier"
    );

    Ok(ImageTensor {
        data,
        shape: [1, side, side, CHANNELS],
    })
}

/// Materialize the tagged input into raw encoded bytes.
fn into_bytes(input: ImageInput) -> Result<Vec<u8>, DecodeError> {
    match input {
        ImageInput::DataUri(uri) => decode_data_uri(&uri),
        ImageInput::Bytes(bytes) => Ok(bytes),
        ImageInput::Reader(mut reader) => {
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Decode a `data:image/...;base64,` URI into raw image bytes.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, DecodeError> {
    let (header, payload) = uri
        .split_once(',')
        .ok_or_else(|| DecodeError::DataUri("missing ',' separator".into()))?;

    if !header.starts_with("data:image") {
        return Err(DecodeError::DataUri(format!(
            "expected a data:image URI, got '{}'",
            truncate_for_log(header)
        )));
    }
    if !header.ends_with(";base64") {
        return Err(DecodeError::DataUri("only base64 payloads are supported".into()));
    }

    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| DecodeError::DataUri(format!("base64 decode failed: {e}")))
}

/// Validate image bytes before decoding.
/// Returns early error for clearly invalid input — saves decode time.
pub fn validate_image_bytes(bytes: &[u8]) -> Result<(), DecodeError> {
    if bytes.len() < MIN_IMAGE_BYTES {
        return Err(DecodeError::PayloadBounds(
            "image data too small to be valid".into(),
        ));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(DecodeError::PayloadBounds(format!(
            "image data exceeds {}MB limit",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Read EXIF orientation tag from raw image bytes.
/// Returns 1 (normal) if no EXIF data or tag not present.
fn read_exif_orientation(bytes: &[u8]) -> u32 {
    let mut cursor = Cursor::new(bytes);
    let reader = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(r) => r,
        Err(_) => return 1,
    };

    reader
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(1)
}

/// Apply EXIF orientation transform to a `DynamicImage`.
///
/// Orientation values: 1 = Normal, 2 = Mirrored, 3 = 180deg, 4 = Flipped V,
/// 5 = Mirrored + 90deg CW, 6 = 90deg CW, 7 = Mirrored + 270deg CW, 8 = 270deg CW
fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        1 => img,
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

fn truncate_for_log(s: &str) -> &str {
    &s[..s.len().min(32)]
}
