//! Collaborators the engine calls out to.

use crate::Result;

use geostore_core::{filter::Distance, geometry::Srid, Error, Geometry};
use std::fmt::Debug;

/// Reprojects geometries. Invoked when a filter's literal geometry is in a
/// different spatial reference than the stored column.
pub trait CrsTransformer: Debug + Send + Sync + 'static {
    fn transform(&self, geometry: &Geometry, target: Srid) -> Result<Geometry>;
}

/// Normalizes distances before they are bound as parameters.
pub trait UnitConverter: Debug + Send + Sync + 'static {
    /// Converts `distance` to the units of the column's spatial reference.
    fn to_storage_units(&self, distance: &Distance, srid: Option<Srid>) -> Result<f64>;
}

/// Converts to metres, the unit of projected references.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetreConverter;

impl MetreConverter {
    /// Metres per unit, for the accepted spellings of common units.
    fn factor(uom: &str) -> Option<f64> {
        let uom = uom.trim();
        let uom = uom.rsplit(':').next().unwrap_or(uom);

        let factor = match uom.to_ascii_lowercase().as_str() {
            "" | "m" | "metre" | "meter" | "metres" | "meters" | "9001" => 1.0,
            "km" | "kilometre" | "kilometer" | "9036" => 1000.0,
            "cm" => 0.01,
            "mm" => 0.001,
            "ft" | "foot" | "feet" | "9002" => 0.3048,
            "us-ft" | "9003" => 1200.0 / 3937.0,
            "mi" | "mile" | "miles" | "9093" => 1609.344,
            "nmi" | "9030" => 1852.0,
            _ => return None,
        };
        Some(factor)
    }
}

impl UnitConverter for MetreConverter {
    fn to_storage_units(&self, distance: &Distance, _srid: Option<Srid>) -> Result<f64> {
        let factor = Self::factor(&distance.uom).ok_or_else(|| {
            Error::invalid_filter(format!("unknown unit of measure `{}`", distance.uom))
        })?;
        Ok(distance.value * factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_metres() {
        let units = MetreConverter;
        let km = Distance::new(2.5, "km");
        assert_eq!(units.to_storage_units(&km, None).unwrap(), 2500.0);

        let urn = Distance::new(10.0, "urn:ogc:def:uom:EPSG::9002");
        assert!((units.to_storage_units(&urn, None).unwrap() - 3.048).abs() < 1e-9);

        let err = units
            .to_storage_units(&Distance::new(1.0, "furlong"), None)
            .unwrap_err();
        assert!(err.is_invalid_filter());
    }
}
