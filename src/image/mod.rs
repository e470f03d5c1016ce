//! Image encoding, loading and results.

mod source;
mod types;

pub use source::{HttpImageSource, ImageSource};
pub use types::{
    EncodedImage, GeneratedImage, GenerationMetadata, ImageFormat, DOWNLOAD_FILE_NAME,
};
