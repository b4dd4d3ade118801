//! Well-known binary codec.
//!
//! Decoding accepts ISO WKB (type codes offset by 1000/2000/3000 for Z, M and
//! ZM) and PostGIS EWKB (high flag bits, optionally followed by an SRID).
//! Z and M ordinates are read and discarded. Encoding always produces 2D
//! little-endian ISO WKB.

use super::{Dimension, Srid};
use crate::{Error, Result};

use geo_types::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};

const EWKB_Z: u32 = 0x8000_0000;
const EWKB_M: u32 = 0x4000_0000;
const EWKB_SRID: u32 = 0x2000_0000;

const POINT: u32 = 1;
const LINE_STRING: u32 = 2;
const POLYGON: u32 = 3;
const MULTI_POINT: u32 = 4;
const MULTI_LINE_STRING: u32 = 5;
const MULTI_POLYGON: u32 = 6;
const GEOMETRY_COLLECTION: u32 = 7;

/// Result of decoding a WKB blob.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub value: Geometry<f64>,

    /// SRID embedded in an EWKB header
    pub srid: Option<Srid>,

    pub dim: Dimension,
}

pub fn decode(bytes: &[u8]) -> Result<Decoded> {
    let mut reader = Reader { bytes, pos: 0 };
    let mut header = Header::default();
    let value = reader.read_geometry(&mut header, true)?;

    if reader.pos != bytes.len() {
        return Err(malformed("trailing bytes"));
    }

    Ok(Decoded {
        value,
        srid: header.srid,
        dim: if header.has_z {
            Dimension::Xyz
        } else {
            Dimension::Xy
        },
    })
}

pub fn encode(geometry: &Geometry<f64>) -> Vec<u8> {
    let mut out = vec![];
    write_geometry(&mut out, geometry);
    out
}

#[derive(Default)]
struct Header {
    srid: Option<Srid>,
    has_z: bool,
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

#[derive(Clone, Copy)]
struct Layout {
    little_endian: bool,
    ordinates: usize,
}

impl Reader<'_> {
    fn read_geometry(&mut self, header: &mut Header, top: bool) -> Result<Geometry<f64>> {
        let little_endian = match self.take(1)?[0] {
            0 => false,
            1 => true,
            other => return Err(malformed(format!("invalid byte order {other}"))),
        };

        let raw = self.read_u32(little_endian)?;

        let mut has_z = raw & EWKB_Z != 0;
        let mut has_m = raw & EWKB_M != 0;
        if raw & EWKB_SRID != 0 {
            let srid = self.read_u32(little_endian)?;
            if top {
                header.srid = Some(Srid(srid));
            }
        }

        let mut code = raw & 0x0FFF_FFFF;
        match code / 1000 {
            0 => {}
            1 => has_z = true,
            2 => has_m = true,
            3 => {
                has_z = true;
                has_m = true;
            }
            _ => return Err(malformed(format!("unknown geometry type {raw}"))),
        }
        code %= 1000;

        if top {
            header.has_z = has_z;
        }

        let layout = Layout {
            little_endian,
            ordinates: 2 + usize::from(has_z) + usize::from(has_m),
        };

        Ok(match code {
            POINT => {
                let coord = self.read_coord(layout)?;
                // An empty point is encoded with NaN ordinates
                if coord.x.is_nan() && coord.y.is_nan() {
                    Geometry::MultiPoint(MultiPoint(vec![]))
                } else {
                    Geometry::Point(Point(coord))
                }
            }
            LINE_STRING => Geometry::LineString(self.read_line_string(layout)?),
            POLYGON => Geometry::Polygon(self.read_polygon(layout)?),
            MULTI_POINT => {
                let points = self.read_parts(header, layout, |g| match g {
                    Geometry::Point(p) => Some(p),
                    _ => None,
                })?;
                Geometry::MultiPoint(MultiPoint(points))
            }
            MULTI_LINE_STRING => {
                let lines = self.read_parts(header, layout, |g| match g {
                    Geometry::LineString(l) => Some(l),
                    _ => None,
                })?;
                Geometry::MultiLineString(MultiLineString(lines))
            }
            MULTI_POLYGON => {
                let polygons = self.read_parts(header, layout, |g| match g {
                    Geometry::Polygon(p) => Some(p),
                    _ => None,
                })?;
                Geometry::MultiPolygon(MultiPolygon(polygons))
            }
            GEOMETRY_COLLECTION => {
                let members = self.read_parts(header, layout, Some)?;
                Geometry::GeometryCollection(GeometryCollection(members))
            }
            other => return Err(malformed(format!("unknown geometry type {other}"))),
        })
    }

    fn read_parts<T>(
        &mut self,
        header: &mut Header,
        layout: Layout,
        cast: impl Fn(Geometry<f64>) -> Option<T>,
    ) -> Result<Vec<T>> {
        // Each member repeats its own byte order and type header
        let num_parts = self.read_count(layout.little_endian)?;
        let mut parts = Vec::with_capacity(num_parts.min(1024));
        for _ in 0..num_parts {
            let member = self.read_geometry(header, false)?;
            parts.push(cast(member).ok_or_else(|| malformed("unexpected member type"))?);
        }
        Ok(parts)
    }

    fn read_polygon(&mut self, layout: Layout) -> Result<Polygon<f64>> {
        let num_rings = self.read_count(layout.little_endian)?;
        if num_rings == 0 {
            return Ok(Polygon::new(LineString(vec![]), vec![]));
        }

        let exterior = self.read_line_string(layout)?;
        let mut interiors = Vec::with_capacity((num_rings - 1).min(1024));
        for _ in 1..num_rings {
            interiors.push(self.read_line_string(layout)?);
        }
        Ok(Polygon::new(exterior, interiors))
    }

    fn read_line_string(&mut self, layout: Layout) -> Result<LineString<f64>> {
        let num_points = self.read_count(layout.little_endian)?;
        let mut coords = Vec::with_capacity(num_points.min(4096));
        for _ in 0..num_points {
            coords.push(self.read_coord(layout)?);
        }
        Ok(LineString(coords))
    }

    fn read_coord(&mut self, layout: Layout) -> Result<Coord<f64>> {
        let x = self.read_f64(layout.little_endian)?;
        let y = self.read_f64(layout.little_endian)?;
        for _ in 2..layout.ordinates {
            self.read_f64(layout.little_endian)?;
        }
        Ok(Coord { x, y })
    }

    fn read_count(&mut self, little_endian: bool) -> Result<usize> {
        let count = self.read_u32(little_endian)? as usize;
        Ok(count)
    }

    fn read_u32(&mut self, little_endian: bool) -> Result<u32> {
        let value = read_u32_at(self.bytes, self.pos, little_endian)?;
        self.pos += 4;
        Ok(value)
    }

    fn read_f64(&mut self, little_endian: bool) -> Result<f64> {
        let bytes: [u8; 8] = self
            .take(8)?
            .try_into()
            .map_err(|_| malformed("truncated"))?;
        Ok(if little_endian {
            f64::from_le_bytes(bytes)
        } else {
            f64::from_be_bytes(bytes)
        })
    }

    fn take(&mut self, len: usize) -> Result<&[u8]> {
        let end = self.pos + len;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or_else(|| malformed("truncated"))?;
        self.pos = end;
        Ok(slice)
    }
}

fn read_u32_at(bytes: &[u8], pos: usize, little_endian: bool) -> Result<u32> {
    let raw: [u8; 4] = bytes
        .get(pos..pos + 4)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| malformed("truncated"))?;
    Ok(if little_endian {
        u32::from_le_bytes(raw)
    } else {
        u32::from_be_bytes(raw)
    })
}

fn write_geometry(out: &mut Vec<u8>, geometry: &Geometry<f64>) {
    out.push(1);
    match geometry {
        Geometry::Point(p) => {
            write_u32(out, POINT);
            write_coord(out, p.0);
        }
        Geometry::Line(line) => {
            write_u32(out, LINE_STRING);
            write_u32(out, 2);
            write_coord(out, line.start);
            write_coord(out, line.end);
        }
        Geometry::LineString(ls) => {
            write_u32(out, LINE_STRING);
            write_line_string(out, ls);
        }
        Geometry::Polygon(p) => {
            write_u32(out, POLYGON);
            write_polygon(out, p);
        }
        Geometry::MultiPoint(mp) => {
            write_u32(out, MULTI_POINT);
            write_u32(out, mp.0.len() as u32);
            for p in &mp.0 {
                write_geometry(out, &Geometry::Point(*p));
            }
        }
        Geometry::MultiLineString(mls) => {
            write_u32(out, MULTI_LINE_STRING);
            write_u32(out, mls.0.len() as u32);
            for ls in &mls.0 {
                out.push(1);
                write_u32(out, LINE_STRING);
                write_line_string(out, ls);
            }
        }
        Geometry::MultiPolygon(mp) => {
            write_u32(out, MULTI_POLYGON);
            write_u32(out, mp.0.len() as u32);
            for p in &mp.0 {
                out.push(1);
                write_u32(out, POLYGON);
                write_polygon(out, p);
            }
        }
        Geometry::GeometryCollection(gc) => {
            write_u32(out, GEOMETRY_COLLECTION);
            write_u32(out, gc.0.len() as u32);
            for g in &gc.0 {
                write_geometry(out, g);
            }
        }
        Geometry::Rect(rect) => {
            write_u32(out, POLYGON);
            write_polygon(out, &rect.to_polygon());
        }
        Geometry::Triangle(triangle) => {
            write_u32(out, POLYGON);
            write_polygon(out, &triangle.to_polygon());
        }
    }
}

fn write_polygon(out: &mut Vec<u8>, polygon: &Polygon<f64>) {
    if polygon.exterior().0.is_empty() {
        write_u32(out, 0);
        return;
    }

    write_u32(out, 1 + polygon.interiors().len() as u32);
    write_line_string(out, polygon.exterior());
    for ring in polygon.interiors() {
        write_line_string(out, ring);
    }
}

fn write_line_string(out: &mut Vec<u8>, ls: &LineString<f64>) {
    write_u32(out, ls.0.len() as u32);
    for coord in &ls.0 {
        write_coord(out, *coord);
    }
}

fn write_coord(out: &mut Vec<u8>, coord: Coord<f64>) {
    out.extend_from_slice(&coord.x.to_le_bytes());
    out.extend_from_slice(&coord.y.to_le_bytes());
}

fn write_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn malformed(reason: impl Into<String>) -> Error {
    Error::invalid_wkb(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{line_string, point, polygon};

    fn le_f64s(out: &mut Vec<u8>, values: &[f64]) {
        for v in values {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }

    #[test]
    fn ewkb_point_with_srid() {
        let mut bytes = vec![1];
        bytes.extend_from_slice(&(POINT | EWKB_SRID).to_le_bytes());
        bytes.extend_from_slice(&4326u32.to_le_bytes());
        le_f64s(&mut bytes, &[1.0, 2.0]);

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.value, Geometry::Point(point!(x: 1.0, y: 2.0)));
        assert_eq!(decoded.srid, Some(Srid(4326)));
        assert_eq!(decoded.dim, Dimension::Xy);
    }

    #[test]
    fn big_endian_iso_z_line_drops_z() {
        let mut bytes = vec![0];
        bytes.extend_from_slice(&(1000 + LINE_STRING).to_be_bytes());
        bytes.extend_from_slice(&2u32.to_be_bytes());
        for v in [0.0f64, 1.0, 9.0, 2.0, 3.0, 9.0] {
            bytes.extend_from_slice(&v.to_be_bytes());
        }

        let decoded = decode(&bytes).unwrap();
        assert_eq!(
            decoded.value,
            Geometry::LineString(line_string![(x: 0.0, y: 1.0), (x: 2.0, y: 3.0)])
        );
        assert_eq!(decoded.dim, Dimension::Xyz);
        assert_eq!(decoded.srid, None);
    }

    #[test]
    fn multipolygon_survives_encoding() {
        let value = Geometry::MultiPolygon(MultiPolygon(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 4.0, y: 0.0),
            (x: 4.0, y: 4.0),
            (x: 0.0, y: 0.0),
        ]]));

        let decoded = decode(&encode(&value)).unwrap();
        assert_eq!(decoded.value, value);
    }

    #[test]
    fn truncated_input_is_an_error() {
        let bytes = encode(&Geometry::Point(point!(x: 1.0, y: 2.0)));
        let err = decode(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(err.is_type_conversion());
        assert!(decode(&[]).is_err());
    }
}
