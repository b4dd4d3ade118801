//! Geometries as stored and queried.
//!
//! A [`Geometry`] wraps a `geo_types` geometry with the spatial reference it
//! is expressed in. The backend exchanges geometries as well-known binary;
//! see [`wkb`].

pub mod wkb;

use crate::{Error, Result};

use std::{fmt, str::FromStr};

/// A spatial reference identifier, e.g. `4326`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Srid(pub u32);

impl fmt::Display for Srid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

impl FromStr for Srid {
    type Err = Error;

    /// Accepts `4326`, `EPSG:4326` and `urn:ogc:def:crs:EPSG::4326`.
    fn from_str(s: &str) -> Result<Srid> {
        let code = s.rsplit(':').next().unwrap_or(s);
        code.trim()
            .parse()
            .map(Srid)
            .map_err(|_| Error::invalid_config(format!("invalid spatial reference `{s}`")))
    }
}

/// Coordinate dimension of a stored geometry column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dimension {
    #[default]
    Xy,
    Xyz,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub value: geo_types::Geometry<f64>,

    /// Spatial reference the coordinates are expressed in
    pub srid: Option<Srid>,

    pub dim: Dimension,
}

impl Geometry {
    pub fn new(value: impl Into<geo_types::Geometry<f64>>, srid: Option<Srid>) -> Self {
        Self {
            value: value.into(),
            srid,
            dim: Dimension::Xy,
        }
    }

    /// Parses a literal geometry from well-known text.
    pub fn from_wkt(text: &str, srid: Option<Srid>) -> Result<Geometry> {
        let wkt = wkt::Wkt::<f64>::from_str(text)
            .map_err(|e| Error::invalid_filter(format!("invalid geometry literal: {e:?}")))?;
        let value: geo_types::Geometry<f64> = wkt
            .try_into()
            .map_err(|e: wkt::conversion::Error| {
                Error::invalid_filter(format!("invalid geometry literal: {e:?}"))
            })?;

        Ok(Geometry::new(value, srid))
    }

    pub fn with_srid(mut self, srid: Option<Srid>) -> Self {
        self.srid = srid;
        self
    }

    /// Encodes the geometry as 2D little-endian WKB.
    pub fn to_wkb(&self) -> Vec<u8> {
        wkb::encode(&self.value)
    }

    /// Decodes WKB, tagging the result with `srid` unless the data carries an
    /// EWKB spatial reference of its own.
    pub fn from_wkb(bytes: &[u8], srid: Option<Srid>) -> Result<Geometry> {
        let decoded = wkb::decode(bytes)?;
        Ok(Geometry {
            value: decoded.value,
            srid: decoded.srid.or(srid),
            dim: decoded.dim,
        })
    }
}
