use crate::models::VariantSize;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::io::Cursor;

/// Every derived variant is re-encoded as JPEG.
pub const OUTPUT_CONTENT_TYPE: &str = "image/jpeg";
pub const OUTPUT_EXTENSION: &str = "jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeSpec {
    pub size: VariantSize,
    pub max_width: u32,
    pub quality: u8,
}

pub const SIZE_SPECS: [SizeSpec; 3] = [
    SizeSpec {
        size: VariantSize::Large,
        max_width: 1600,
        quality: 85,
    },
    SizeSpec {
        size: VariantSize::Medium,
        max_width: 900,
        quality: 85,
    },
    SizeSpec {
        size: VariantSize::Thumb,
        max_width: 400,
        quality: 80,
    },
];

pub fn spec_for(size: VariantSize) -> SizeSpec {
    match size {
        VariantSize::Large => SIZE_SPECS[0],
        VariantSize::Medium => SIZE_SPECS[1],
        VariantSize::Thumb => SIZE_SPECS[2],
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeriveError {
    #[error("could not decode source image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("could not encode {size} variant: {source}")]
    Encode {
        size: VariantSize,
        #[source]
        source: image::ImageError,
    },
    #[error("{0} derivation worker panicked")]
    Worker(VariantSize),
}

pub struct DerivedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl DerivedImage {
    pub fn byte_len(&self) -> u64 {
        self.data.len() as u64
    }
}

pub struct DerivedSet {
    pub large: DerivedImage,
    pub medium: DerivedImage,
    pub thumb: DerivedImage,
}

impl DerivedSet {
    pub fn get(&self, size: VariantSize) -> &DerivedImage {
        match size {
            VariantSize::Large => &self.large,
            VariantSize::Medium => &self.medium,
            VariantSize::Thumb => &self.thumb,
        }
    }
}

/// Fit `width` within `max_width`, keeping the aspect ratio. Never enlarges.
pub fn target_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 {
        return (width, height);
    }
    let scaled = (height as u64 * max_width as u64 + width as u64 / 2) / width as u64;
    (max_width, scaled.max(1) as u32)
}

/// Decode `data` once and produce all three renditions.
///
/// The renditions are resized and encoded on separate threads. Any failure
/// discards every rendition, so callers either get a full set or nothing.
pub fn derive_variants(data: &[u8]) -> Result<DerivedSet, DeriveError> {
    let img = image::load_from_memory(data).map_err(DeriveError::Decode)?;

    let img = &img;
    let [large, medium, thumb] = std::thread::scope(|scope| {
        let handles =
            SIZE_SPECS.map(|spec| (spec.size, scope.spawn(move || render(img, spec))));
        handles.map(|(size, handle)| handle.join().unwrap_or(Err(DeriveError::Worker(size))))
    });

    Ok(DerivedSet {
        large: large?,
        medium: medium?,
        thumb: thumb?,
    })
}

fn render(img: &DynamicImage, spec: SizeSpec) -> Result<DerivedImage, DeriveError> {
    let (orig_width, orig_height) = img.dimensions();
    let (width, height) = target_dimensions(orig_width, orig_height, spec.max_width);

    let resized = if (width, height) == (orig_width, orig_height) {
        DynamicImage::ImageRgb8(img.to_rgb8())
    } else {
        DynamicImage::ImageRgb8(
            img.resize_exact(width, height, FilterType::Lanczos3)
                .to_rgb8(),
        )
    };

    let data = encode_jpeg(&resized, spec.quality).map_err(|source| DeriveError::Encode {
        size: spec.size,
        source,
    })?;

    Ok(DerivedImage {
        data,
        width: resized.width(),
        height: resized.height(),
    })
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    img.write_with_encoder(encoder)?;
    Ok(buffer.into_inner())
}
