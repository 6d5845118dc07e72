//! PNG encoding for RGBA image data.
//!
//! Supports two encoding modes:
//! - **Indexed PNG (color type 3)**: used when the image has ≤256 unique
//!   colors. Heatmaps rendered without intensity interpolation and legend
//!   strips usually qualify.
//! - **RGBA PNG (color type 6)**: fallback for images with >256 colors.
//!
//! Use `create_png_auto` for automatic mode selection, or `create_png` for
//! explicit RGBA encoding.

use rayon::prelude::*;
use std::collections::HashMap;
use std::io::Write;

use seismic_common::{SeismicError, SeismicResult};

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

/// Minimum pixels to benefit from parallel palette extraction
const PARALLEL_THRESHOLD: usize = 4096; // 64x64 or larger

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

type Palette = Vec<(u8, u8, u8, u8)>;

/// Create a PNG image with automatic format selection.
///
/// # Errors
/// `Render` if the pixel buffer does not match the dimensions or
/// compression fails.
pub fn create_png_auto(pixels: &[u8], width: usize, height: usize) -> SeismicResult<Vec<u8>> {
    check_dimensions(pixels.len(), width, height, 4)?;
    let num_pixels = pixels.len() / 4;

    let palette_result = if num_pixels >= PARALLEL_THRESHOLD {
        extract_palette_parallel(pixels)
    } else {
        extract_palette_sequential(pixels)
    };

    match palette_result {
        Some((palette, indices)) => create_png_indexed(width, height, &palette, &indices),
        None => create_png(pixels, width, height),
    }
}

fn check_dimensions(len: usize, width: usize, height: usize, bytes_per_pixel: usize) -> SeismicResult<()> {
    if width == 0 || height == 0 {
        return Err(SeismicError::render(format!(
            "cannot encode a {}x{} image",
            width, height
        )));
    }
    if len != width * height * bytes_per_pixel {
        return Err(SeismicError::render(format!(
            "buffer of {} bytes does not match {}x{} image",
            len, width, height
        )));
    }
    Ok(())
}

/// Pack RGBA bytes into a u32 for faster hashing and comparison
#[inline(always)]
fn pack_color(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) | ((g as u32) << 8) | ((b as u32) << 16) | ((a as u32) << 24)
}

#[inline(always)]
fn unpack_color(packed: u32) -> (u8, u8, u8, u8) {
    (
        packed as u8,
        (packed >> 8) as u8,
        (packed >> 16) as u8,
        (packed >> 24) as u8,
    )
}

/// Sequential palette extraction for small images.
fn extract_palette_sequential(pixels: &[u8]) -> Option<(Palette, Vec<u8>)> {
    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices: Vec<u8> = Vec::with_capacity(pixels.len() / 4);

    for chunk in pixels.chunks_exact(4) {
        let packed = pack_color(chunk[0], chunk[1], chunk[2], chunk[3]);

        let index = match color_to_index.get(&packed) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push((chunk[0], chunk[1], chunk[2], chunk[3]));
                color_to_index.insert(packed, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Parallel palette extraction for larger images.
///
/// Unique colors are collected per chunk, merged, then pixels are mapped to
/// palette indices in a second parallel pass. Palette order follows the
/// chunk order, so output is deterministic.
fn extract_palette_parallel(pixels: &[u8]) -> Option<(Palette, Vec<u8>)> {
    let chunk_size = (pixels.len() / 4 / rayon::current_num_threads()).max(256) * 4;

    let unique_colors: Vec<u32> = pixels
        .par_chunks(chunk_size)
        .flat_map(|chunk| {
            let mut local: Vec<u32> = Vec::with_capacity(MAX_PALETTE_SIZE);
            let mut seen: HashMap<u32, ()> = HashMap::with_capacity(MAX_PALETTE_SIZE);
            for pixel in chunk.chunks_exact(4) {
                let packed = pack_color(pixel[0], pixel[1], pixel[2], pixel[3]);
                if seen.insert(packed, ()).is_none() {
                    local.push(packed);
                    if local.len() > MAX_PALETTE_SIZE {
                        break;
                    }
                }
            }
            local
        })
        .collect();

    let mut global_colors: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Palette = Vec::with_capacity(MAX_PALETTE_SIZE);

    for packed in unique_colors {
        if !global_colors.contains_key(&packed) {
            if palette.len() >= MAX_PALETTE_SIZE {
                return None;
            }
            let idx = palette.len() as u8;
            global_colors.insert(packed, idx);
            palette.push(unpack_color(packed));
        }
    }

    let indices: Vec<u8> = pixels
        .par_chunks_exact(4)
        .map(|p| {
            let packed = pack_color(p[0], p[1], p[2], p[3]);
            global_colors.get(&packed).copied().unwrap_or(0)
        })
        .collect();

    Some((palette, indices))
}

/// Create an indexed PNG (color type 3) from palette and indices.
pub fn create_png_indexed(
    width: usize,
    height: usize,
    palette: &[(u8, u8, u8, u8)],
    indices: &[u8],
) -> SeismicResult<Vec<u8>> {
    check_dimensions(indices.len(), width, height, 1)?;
    if palette.is_empty() || palette.len() > MAX_PALETTE_SIZE {
        return Err(SeismicError::render(format!(
            "palette must hold 1..={} colors, got {}",
            MAX_PALETTE_SIZE,
            palette.len()
        )));
    }

    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);

    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 3));

    let mut plte_data = Vec::with_capacity(palette.len() * 3);
    for (r, g, b, _) in palette {
        plte_data.extend_from_slice(&[*r, *g, *b]);
    }
    write_chunk(&mut png, b"PLTE", &plte_data);

    // tRNS only if any color has alpha < 255
    if palette.iter().any(|(_, _, _, a)| *a < 255) {
        let trns_data: Vec<u8> = palette.iter().map(|(_, _, _, a)| *a).collect();
        write_chunk(&mut png, b"tRNS", &trns_data);
    }

    let idat_data = deflate_scanlines(indices, width, height, 1)?;
    write_chunk(&mut png, b"IDAT", &idat_data);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Create a PNG image from RGBA pixel data (color type 6).
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> SeismicResult<Vec<u8>> {
    check_dimensions(pixels.len(), width, height, 4)?;

    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 6));

    let idat_data = deflate_scanlines(pixels, width, height, 4)?;
    write_chunk(&mut png, b"IDAT", &idat_data);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

fn ihdr(width: usize, height: usize, color_type: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(13);
    data.extend_from_slice(&(width as u32).to_be_bytes());
    data.extend_from_slice(&(height as u32).to_be_bytes());
    data.push(8); // bit depth
    data.push(color_type);
    data.push(0); // compression method
    data.push(0); // filter method
    data.push(0); // interlace method
    data
}

/// Write a PNG chunk
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Deflate scanlines for the IDAT chunk, each prefixed with filter type 0.
fn deflate_scanlines(
    data: &[u8],
    width: usize,
    height: usize,
    bytes_per_pixel: usize,
) -> SeismicResult<Vec<u8>> {
    let stride = width * bytes_per_pixel;
    let mut uncompressed = Vec::with_capacity(height * (1 + stride));
    for row in data.chunks_exact(stride) {
        uncompressed.push(0); // filter type: none
        uncompressed.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder
        .write_all(&uncompressed)
        .map_err(|e| SeismicError::render(format!("IDAT compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| SeismicError::render(format!("IDAT compression failed: {}", e)))
}
