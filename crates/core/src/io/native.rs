//! Native GeoTIFF reading/writing
//!
//! Uses the `tiff` crate. Georeferencing is limited to the
//! ModelPixelScale + ModelTiepoint pair and the GDAL_NODATA tag, which is
//! all the comparison pipeline needs from a raster file.

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::colortype::{Gray32Float, Gray8};
use tiff::encoder::{DirectoryEncoder, TiffEncoder, TiffKind};
use tiff::tags::Tag;

/// Sample type of the written band
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SampleFormat {
    /// 32-bit float, for continuous data
    #[default]
    Float32,
    /// 8-bit unsigned, for masks and category maps
    UInt8,
}

/// Options for writing GeoTIFF files
#[derive(Debug, Clone, Default)]
pub struct GeoTiffOptions {
    pub sample_format: SampleFormat,
}

impl GeoTiffOptions {
    pub fn uint8() -> Self {
        Self {
            sample_format: SampleFormat::UInt8,
        }
    }
}

/// Read one band of a GeoTIFF file into a Raster
///
/// `band` is 1-based; `None` reads the first band. The file is closed once
/// the raster has been decoded.
pub fn read_geotiff<T, P>(path: P, band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    decode_geotiff(BufReader::new(file), band)
}

/// Read a GeoTIFF from an in-memory buffer into a Raster
pub fn read_geotiff_from_buffer<T>(data: &[u8], band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
{
    decode_geotiff(Cursor::new(data), band)
}

fn cast_samples<S, T>(buf: Vec<S>) -> Vec<T>
where
    S: num_traits::NumCast + Copy,
    T: RasterElement,
{
    buf.into_iter()
        .map(|v| num_traits::cast(v).unwrap_or(T::default_nodata()))
        .collect()
}

fn decode_geotiff<T, R>(reader: R, band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
    R: Read + Seek,
{
    let mut decoder = Decoder::new(reader)?.with_limits(Limits::unlimited());

    let (width, height) = decoder.dimensions()?;
    let rows = height as usize;
    let cols = width as usize;
    if rows == 0 || cols == 0 {
        return Err(Error::InvalidDimensions { width: cols, height: rows });
    }

    let samples: Vec<T> = match decoder.read_image()? {
        DecodingResult::F32(buf) => cast_samples(buf),
        DecodingResult::F64(buf) => cast_samples(buf),
        DecodingResult::U8(buf) => cast_samples(buf),
        DecodingResult::U16(buf) => cast_samples(buf),
        DecodingResult::U32(buf) => cast_samples(buf),
        DecodingResult::I8(buf) => cast_samples(buf),
        DecodingResult::I16(buf) => cast_samples(buf),
        DecodingResult::I32(buf) => cast_samples(buf),
        _ => return Err(Error::UnsupportedDataType("Unsupported TIFF pixel format".to_string())),
    };

    let cells = rows * cols;
    if samples.len() % cells != 0 {
        return Err(Error::InvalidDimensions { width: cols, height: rows });
    }

    // Interleaved (chunky) samples: pick out the requested band
    let bands = samples.len() / cells;
    let band = band.unwrap_or(1);
    if band == 0 || band > bands {
        return Err(Error::InvalidParameter {
            name: "band",
            value: band.to_string(),
            reason: format!("file has {} band(s)", bands),
        });
    }
    let data = if bands == 1 {
        samples
    } else {
        samples.into_iter().skip(band - 1).step_by(bands).collect()
    };

    let mut raster = Raster::from_vec(data, rows, cols)?;

    if let Some(transform) = read_geotransform(&mut decoder) {
        raster.set_transform(transform);
    }
    raster.set_nodata(read_nodata(&mut decoder));

    Ok(raster)
}

/// Recover the GeoTransform from ModelTiepoint + ModelPixelScale
fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).ok()?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }

    // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];

    Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]))
}

/// GDAL stores the no-data sentinel as an ASCII number
fn read_nodata<T: RasterElement, R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<T> {
    let text = decoder.get_tag_ascii_string(Tag::GdalNodata).ok()?;
    let value: f64 = text.trim_matches(char::from(0)).trim().parse().ok()?;
    if value.is_nan() {
        return T::is_float().then(T::default_nodata);
    }
    T::from_f64(value)
}

/// Write a Raster to a GeoTIFF file
pub fn write_geotiff<T, P>(raster: &Raster<T>, path: P, options: Option<GeoTiffOptions>) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    encode_geotiff(raster, &mut writer, options.unwrap_or_default())?;
    writer.flush()?;
    Ok(())
}

/// Write a Raster to an in-memory GeoTIFF buffer
pub fn write_geotiff_to_buffer<T>(raster: &Raster<T>, options: Option<GeoTiffOptions>) -> Result<Vec<u8>>
where
    T: RasterElement,
{
    let mut buf = Vec::new();
    encode_geotiff(raster, Cursor::new(&mut buf), options.unwrap_or_default())?;
    Ok(buf)
}

fn encode_geotiff<T, W>(raster: &Raster<T>, writer: W, options: GeoTiffOptions) -> Result<()>
where
    T: RasterElement,
    W: Write + Seek,
{
    let mut encoder = TiffEncoder::new(writer)?;
    let (rows, cols) = raster.shape();
    let nodata = raster.nodata().and_then(|nd| nd.to_f64());

    match options.sample_format {
        SampleFormat::Float32 => {
            let data: Vec<f32> = raster
                .data()
                .iter()
                .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
                .collect();
            let mut image = encoder.new_image::<Gray32Float>(cols as u32, rows as u32)?;
            write_geo_tags(image.encoder(), raster.transform(), nodata)?;
            image.write_data(&data)?;
        }
        SampleFormat::UInt8 => {
            let data: Vec<u8> = raster
                .data()
                .iter()
                .map(|&v| num_traits::cast(v).unwrap_or(u8::MAX))
                .collect();
            let mut image = encoder.new_image::<Gray8>(cols as u32, rows as u32)?;
            write_geo_tags(image.encoder(), raster.transform(), nodata)?;
            image.write_data(&data)?;
        }
    }

    Ok(())
}

fn write_geo_tags<W, K>(
    dir: &mut DirectoryEncoder<'_, W, K>,
    gt: &GeoTransform,
    nodata: Option<f64>,
) -> Result<()>
where
    W: Write + Seek,
    K: TiffKind,
{
    let scale = [gt.pixel_width, gt.pixel_height.abs(), 0.0];
    dir.write_tag(Tag::ModelPixelScaleTag, &scale[..])?;

    let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    dir.write_tag(Tag::ModelTiepointTag, &tiepoint[..])?;

    // Minimal key directory so GIS tools accept the file as a GeoTIFF:
    // GTModelTypeGeoKey=2 (geographic), GTRasterTypeGeoKey=1 (PixelIsArea).
    let geokeys: [u16; 12] = [
        1, 1, 0, 2, //
        1024, 0, 1, 2, //
        1025, 0, 1, 1,
    ];
    dir.write_tag(Tag::GeoKeyDirectoryTag, &geokeys[..])?;

    if let Some(nd) = nodata {
        dir.write_tag(Tag::GdalNodata, nd.to_string().as_str())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_raster() -> Raster<f64> {
        let mut r = Raster::from_vec(vec![0.0, 1.0, -9999.0, 0.75, 2.5, 0.0], 2, 3).unwrap();
        r.set_transform(GeoTransform::new(89.435, 24.0, 0.005, -0.005));
        r.set_nodata(Some(-9999.0));
        r
    }

    #[test]
    fn buffer_roundtrip_keeps_georeferencing() {
        let raster = sample_raster();
        let buf = write_geotiff_to_buffer(&raster, None).unwrap();
        let back: Raster<f64> = read_geotiff_from_buffer(&buf, None).unwrap();

        assert_eq!(back.shape(), (2, 3));
        assert_eq!(back.nodata(), Some(-9999.0));
        assert!((back.transform().origin_x - 89.435).abs() < 1e-9);
        assert!((back.transform().pixel_height + 0.005).abs() < 1e-12);
        assert_eq!(back.get(1, 1).unwrap(), 2.5);
        assert_eq!(back.get(0, 2).unwrap(), -9999.0);
    }

    #[test]
    fn uint8_category_map() {
        let mut map: Raster<u8> = Raster::from_vec(vec![0, 1, 2, 3], 2, 2).unwrap();
        map.set_transform(GeoTransform::new(0.0, 2.0, 1.0, -1.0));

        let buf = write_geotiff_to_buffer(&map, Some(GeoTiffOptions::uint8())).unwrap();
        let back: Raster<u8> = read_geotiff_from_buffer(&buf, None).unwrap();

        assert_eq!(back.data(), map.data());
        assert_eq!(back.nodata(), None);
    }

    #[test]
    fn band_out_of_range() {
        let buf = write_geotiff_to_buffer(&sample_raster(), None).unwrap();
        let result = read_geotiff_from_buffer::<f64>(&buf, Some(2));
        assert!(matches!(result, Err(Error::InvalidParameter { name: "band", .. })));
    }

    #[test]
    fn garbage_is_an_error() {
        let result = read_geotiff_from_buffer::<f64>(b"not a tiff", None);
        assert!(result.is_err());
    }
}
