//! GeoTIFF fixtures for raster loading and pipeline tests.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use seismic_common::Parameter;
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;
use tiff::TiffResult;

use crate::generators::{create_mmi_grid, create_shaking_grid};

/// How a fixture is georeferenced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeoReference {
    /// ModelPixelScale + ModelTiepoint with the upper-left corner at the origin.
    PixelScale {
        origin_x: f64,
        origin_y: f64,
        pixel_width: f64,
        pixel_height: f64,
    },
    /// ModelTransformation with coefficients `[a, b, c, d, e, f]`.
    Transformation([f64; 6]),
    /// No georeferencing tags at all.
    None,
}

/// Options for [`write_geotiff`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeoTiffOptions {
    pub georef: GeoReference,
    pub nodata: Option<f64>,
    pub epsg: Option<u16>,
    pub pixel_is_point: bool,
}

impl Default for GeoTiffOptions {
    fn default() -> Self {
        Self {
            georef: GeoReference::PixelScale {
                origin_x: 174.5,
                origin_y: -37.0,
                pixel_width: 0.1,
                pixel_height: 0.1,
            },
            nodata: None,
            epsg: Some(4326),
            pixel_is_point: false,
        }
    }
}

/// Write a single-band float32 GeoTIFF.
pub fn write_geotiff(
    path: &Path,
    width: usize,
    height: usize,
    data: &[f32],
    options: &GeoTiffOptions,
) -> TiffResult<()> {
    let file = File::create(path)?;
    let mut tiff = TiffEncoder::new(BufWriter::new(file))?;
    let mut image = tiff.new_image::<colortype::Gray32Float>(width as u32, height as u32)?;

    match options.georef {
        GeoReference::PixelScale {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        } => {
            image
                .encoder()
                .write_tag(Tag::ModelPixelScaleTag, &[pixel_width, pixel_height, 0.0][..])?;
            image.encoder().write_tag(
                Tag::ModelTiepointTag,
                &[0.0, 0.0, 0.0, origin_x, origin_y, 0.0][..],
            )?;
        }
        GeoReference::Transformation([a, b, c, d, e, f]) => {
            let matrix = [
                a, b, 0.0, c, //
                d, e, 0.0, f, //
                0.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ];
            image
                .encoder()
                .write_tag(Tag::ModelTransformationTag, &matrix[..])?;
        }
        GeoReference::None => {}
    }

    let mut keys: Vec<u16> = Vec::new();
    keys.extend_from_slice(&[1025, 0, 1, if options.pixel_is_point { 2 } else { 1 }]);
    if let Some(epsg) = options.epsg {
        keys.extend_from_slice(&[2048, 0, 1, epsg]);
    }
    if options.georef != GeoReference::None {
        let mut directory = vec![1u16, 1, 0, (keys.len() / 4) as u16];
        directory.extend_from_slice(&keys);
        image
            .encoder()
            .write_tag(Tag::GeoKeyDirectoryTag, &directory[..])?;
    }

    if let Some(nodata) = options.nodata {
        let text = format!("{}", nodata);
        image.encoder().write_tag(Tag::GdalNodata, text.as_str())?;
    }

    image.write_data(data)?;
    Ok(())
}

/// Write one synthetic raster per parameter into `dir` using the default
/// file names. Returns the written paths in `Parameter::ALL` order.
pub fn write_seismic_dataset(dir: &Path, width: usize, height: usize) -> TiffResult<Vec<PathBuf>> {
    let options = GeoTiffOptions::default();
    let mut paths = Vec::with_capacity(Parameter::ALL.len());

    for param in Parameter::ALL {
        let data = match param {
            Parameter::Mmi => create_mmi_grid(width, height),
            Parameter::Pga => create_shaking_grid(width, height, 1.0, 1.0, 0.8),
            Parameter::Pgv => create_shaking_grid(width, height, 2.0, 1.0, 60.0),
            Parameter::Psa10 => create_shaking_grid(width, height, 1.0, 2.0, 0.5),
        };
        let path = dir.join(param.info().file_name);
        write_geotiff(&path, width, height, &data, &options)?;
        paths.push(path);
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::temp_test_dir_with_prefix;

    #[test]
    fn test_write_geotiff_creates_file() {
        let dir = temp_test_dir_with_prefix("fixture_");
        let path = dir.path().join("grid.tif");
        write_geotiff(&path, 3, 2, &[0.0; 6], &GeoTiffOptions::default()).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_write_dataset_names() {
        let dir = temp_test_dir_with_prefix("dataset_");
        let paths = write_seismic_dataset(dir.path(), 4, 4).unwrap();
        assert_eq!(paths.len(), 4);
        assert!(paths[0].ends_with("intensity_mmi.tif"));
        assert!(paths.iter().all(|p| p.exists()));
    }
}
