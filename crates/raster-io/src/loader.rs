//! GeoTIFF raster loading.
//!
//! Reads the first image of a TIFF file, keeps band 1 as `f32` samples and
//! derives the affine georeferencing transform from the GeoTIFF model tags.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tracing::{debug, warn};

use seismic_common::{SeismicError, SeismicResult};

/// GeoKey ids used from the GeoKeyDirectoryTag.
const GT_RASTER_TYPE_GEO_KEY: u32 = 1025;
const GEOGRAPHIC_TYPE_GEO_KEY: u32 = 2048;
const PROJECTED_CS_TYPE_GEO_KEY: u32 = 3072;
const RASTER_PIXEL_IS_POINT: u32 = 2;
const USER_DEFINED: u32 = 32767;

/// Six-coefficient affine transform from (col, row) to (x, y).
///
/// `x = a * col + b * row + c`, `y = d * col + e * row + f`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl AffineTransform {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0)
    }

    /// Build from a GDAL-ordered geotransform `[c, a, b, f, d, e]`.
    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self::new(gt[1], gt[2], gt[0], gt[4], gt[5], gt[3])
    }

    /// North-up transform with the given upper-left corner and pixel size.
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self::new(pixel_width, 0.0, origin_x, 0.0, -pixel_height, origin_y)
    }

    /// Map a (col, row) position to geographic (x, y).
    #[inline]
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }

    /// Move the origin by half a pixel, turning a pixel-center reference
    /// into a pixel-corner one.
    pub fn shifted_half_pixel(&self) -> Self {
        Self {
            c: self.c - 0.5 * self.a - 0.5 * self.b,
            f: self.f - 0.5 * self.d - 0.5 * self.e,
            ..*self
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

/// Band 1 of a raster plus its georeferencing.
#[derive(Debug, Clone)]
pub struct RasterSample {
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
    /// Row-major sample values
    pub values: Vec<f32>,
    pub transform: AffineTransform,
    /// GDAL no-data sentinel, if the file declares one
    pub nodata: Option<f64>,
    /// EPSG code from the GeoKey directory, if present
    pub epsg: Option<u16>,
}

impl RasterSample {
    /// Build a sample from in-memory values.
    pub fn from_parts(
        width: usize,
        height: usize,
        values: Vec<f32>,
        transform: AffineTransform,
    ) -> SeismicResult<Self> {
        if width == 0 || height == 0 {
            return Err(SeismicError::decode(format!(
                "raster has zero size ({}x{})",
                width, height
            )));
        }
        if values.len() != width * height {
            return Err(SeismicError::decode(format!(
                "expected {} samples for a {}x{} raster, got {}",
                width * height,
                width,
                height,
                values.len()
            )));
        }
        Ok(Self {
            width,
            height,
            values,
            transform,
            nodata: None,
            epsg: None,
        })
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        Some(self.values[row * self.width + col])
    }

    /// Copy of this raster with no-data sentinel cells replaced by NaN.
    pub fn mask_nodata(&self) -> RasterSample {
        let mut masked = self.clone();
        if let Some(nodata) = self.nodata {
            let sentinel = nodata as f32;
            for v in masked.values.iter_mut() {
                if *v == sentinel {
                    *v = f32::NAN;
                }
            }
        }
        masked
    }
}

/// Load band 1 and the affine transform of a GeoTIFF.
///
/// The file handle lives only for the duration of this call.
pub fn load_raster(path: impl AsRef<Path>) -> SeismicResult<RasterSample> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SeismicError::FileNotFound(path.to_path_buf()),
        _ => SeismicError::Io(e),
    })?;

    let mut decoder = Decoder::new(BufReader::new(file)).map_err(|e| decode_error(path, e))?;

    let (width, height) = decoder.dimensions().map_err(|e| decode_error(path, e))?;
    let (width, height) = (width as usize, height as usize);
    if width == 0 || height == 0 {
        return Err(SeismicError::decode(format!(
            "{}: image has zero size",
            path.display()
        )));
    }

    let image = decoder.read_image().map_err(|e| decode_error(path, e))?;
    let values = first_band(image, width * height)
        .map_err(|msg| SeismicError::decode(format!("{}: {}", path.display(), msg)))?;

    let geo_keys = read_geo_keys(&mut decoder).map_err(|e| decode_error(path, e))?;
    let transform = read_transform(&mut decoder, &geo_keys, path)?;
    let nodata = read_nodata(&mut decoder, path);
    let epsg = epsg_from_keys(&geo_keys);

    debug!(
        path = %path.display(),
        width,
        height,
        ?transform,
        ?nodata,
        ?epsg,
        "Loaded raster"
    );

    Ok(RasterSample {
        width,
        height,
        values,
        transform,
        nodata,
        epsg,
    })
}

fn decode_error(path: &Path, err: tiff::TiffError) -> SeismicError {
    SeismicError::decode(format!("{}: {}", path.display(), err))
}

/// Extract band 1 from interleaved samples, converting to f32.
fn first_band(image: DecodingResult, pixels: usize) -> Result<Vec<f32>, String> {
    let samples: Vec<f32> = match image {
        DecodingResult::U8(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U16(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I8(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I16(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::F32(v) => v,
        DecodingResult::F64(v) => v.into_iter().map(|x| x as f32).collect(),
    };

    if samples.len() < pixels || samples.len() % pixels != 0 {
        return Err(format!(
            "{} samples do not divide into {} pixels",
            samples.len(),
            pixels
        ));
    }

    let samples_per_pixel = samples.len() / pixels;
    if samples_per_pixel == 1 {
        return Ok(samples);
    }
    Ok(samples.into_iter().step_by(samples_per_pixel).collect())
}

fn read_f64_tag<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    tag: Tag,
) -> tiff::TiffResult<Option<Vec<f64>>> {
    decoder
        .find_tag(tag)?
        .map(|value| value.into_f64_vec())
        .transpose()
}

/// GeoKey entries as (key id, inline value) pairs.
fn read_geo_keys<R: Read + Seek>(decoder: &mut Decoder<R>) -> tiff::TiffResult<Vec<(u32, u32)>> {
    let directory = match decoder.find_tag(Tag::GeoKeyDirectoryTag)? {
        Some(value) => value.into_u32_vec()?,
        None => return Ok(Vec::new()),
    };

    // Header: version, revision, minor revision, number of keys
    if directory.len() < 4 {
        return Ok(Vec::new());
    }
    let count = directory[3] as usize;

    Ok(directory[4..]
        .chunks_exact(4)
        .take(count)
        // Only inline values (location 0) are needed here
        .filter(|entry| entry[1] == 0)
        .map(|entry| (entry[0], entry[3]))
        .collect())
}

fn geo_key(keys: &[(u32, u32)], id: u32) -> Option<u32> {
    keys.iter().find(|(key, _)| *key == id).map(|(_, value)| *value)
}

fn epsg_from_keys(keys: &[(u32, u32)]) -> Option<u16> {
    [PROJECTED_CS_TYPE_GEO_KEY, GEOGRAPHIC_TYPE_GEO_KEY]
        .iter()
        .filter_map(|&id| geo_key(keys, id))
        .find(|&code| code != USER_DEFINED && code <= u16::MAX as u32)
        .map(|code| code as u16)
}

fn read_transform<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    geo_keys: &[(u32, u32)],
    path: &Path,
) -> SeismicResult<AffineTransform> {
    let err = |e| decode_error(path, e);

    let transform = if let Some(m) = read_f64_tag(decoder, Tag::ModelTransformationTag).map_err(err)? {
        if m.len() < 16 {
            return Err(SeismicError::decode(format!(
                "{}: ModelTransformationTag has {} values, expected 16",
                path.display(),
                m.len()
            )));
        }
        AffineTransform::new(m[0], m[1], m[3], m[4], m[5], m[7])
    } else {
        let scale = read_f64_tag(decoder, Tag::ModelPixelScaleTag).map_err(err)?;
        let tiepoint = read_f64_tag(decoder, Tag::ModelTiepointTag).map_err(err)?;

        match (scale, tiepoint) {
            (Some(scale), Some(tie)) if scale.len() >= 2 && tie.len() >= 6 => {
                let (sx, sy) = (scale[0], scale[1]);
                let (i, j, x, y) = (tie[0], tie[1], tie[3], tie[4]);
                AffineTransform::new(sx, 0.0, x - i * sx, 0.0, -sy, y + j * sy)
            }
            (None, None) => {
                warn!(
                    path = %path.display(),
                    "Raster has no georeferencing, using identity transform"
                );
                return Ok(AffineTransform::identity());
            }
            _ => {
                return Err(SeismicError::decode(format!(
                    "{}: incomplete ModelPixelScale/ModelTiepoint georeferencing",
                    path.display()
                )));
            }
        }
    };

    if geo_key(geo_keys, GT_RASTER_TYPE_GEO_KEY) == Some(RASTER_PIXEL_IS_POINT) {
        return Ok(transform.shifted_half_pixel());
    }
    Ok(transform)
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>, path: &Path) -> Option<f64> {
    let text = match decoder.find_tag(Tag::GdalNodata) {
        Ok(Some(value)) => value.into_string().ok()?,
        Ok(None) => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Unreadable GDAL_NODATA tag");
            return None;
        }
    };

    let trimmed = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    match trimmed.parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(path = %path.display(), nodata = trimmed, "Ignoring unparsable GDAL_NODATA");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affine_apply() {
        let t = AffineTransform::north_up(172.0, -36.0, 0.5, 0.25);
        assert_eq!(t.apply(0.0, 0.0), (172.0, -36.0));
        assert_eq!(t.apply(2.0, 4.0), (173.0, -37.0));
    }

    #[test]
    fn test_from_gdal_order() {
        let t = AffineTransform::from_gdal([10.0, 2.0, 0.0, 20.0, 0.0, -3.0]);
        assert_eq!(t, AffineTransform::new(2.0, 0.0, 10.0, 0.0, -3.0, 20.0));
    }

    #[test]
    fn test_half_pixel_shift() {
        let t = AffineTransform::north_up(10.0, 20.0, 2.0, 2.0).shifted_half_pixel();
        assert_eq!(t.c, 9.0);
        assert_eq!(t.f, 21.0);
    }

    #[test]
    fn test_first_band_interleaved() {
        // 2 pixels, 3 samples each
        let image = DecodingResult::U8(vec![1, 9, 9, 2, 9, 9]);
        assert_eq!(first_band(image, 2).unwrap(), vec![1.0, 2.0]);

        let short = DecodingResult::F32(vec![1.0]);
        assert!(first_band(short, 2).is_err());
    }

    #[test]
    fn test_epsg_prefers_projected() {
        let keys = vec![(GEOGRAPHIC_TYPE_GEO_KEY, 4326), (PROJECTED_CS_TYPE_GEO_KEY, 2193)];
        assert_eq!(epsg_from_keys(&keys), Some(2193));

        let user_defined = vec![(PROJECTED_CS_TYPE_GEO_KEY, USER_DEFINED), (GEOGRAPHIC_TYPE_GEO_KEY, 4326)];
        assert_eq!(epsg_from_keys(&user_defined), Some(4326));
    }

    #[test]
    fn test_mask_nodata() {
        let mut raster =
            RasterSample::from_parts(2, 1, vec![-9999.0, 3.5], AffineTransform::identity()).unwrap();
        raster.nodata = Some(-9999.0);
        let masked = raster.mask_nodata();
        assert!(masked.values[0].is_nan());
        assert_eq!(masked.values[1], 3.5);
    }

    #[test]
    fn test_from_parts_rejects_bad_length() {
        assert!(RasterSample::from_parts(2, 2, vec![0.0; 3], AffineTransform::identity()).is_err());
        assert!(RasterSample::from_parts(0, 2, vec![], AffineTransform::identity()).is_err());
    }
}
