use image::RgbaImage;
use image::imageops::FilterType;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not decode image: {0}")]
pub struct DecodeError(pub String);

/// Decodes fetched bytes (PNG or JPEG) into an RGBA buffer.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, DecodeError> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|err| DecodeError(err.to_string()))
}

/// Decodes a tile and resamples it to `size × size` if the provider served a
/// different resolution.
pub fn decode_tile(bytes: &[u8], size: u32) -> Result<RgbaImage, DecodeError> {
    let tile = decode_image(bytes)?;
    if tile.width() == size && tile.height() == size {
        return Ok(tile);
    }
    Ok(image::imageops::resize(&tile, size, size, FilterType::Triangle))
}
