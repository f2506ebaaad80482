use crate::error::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;

/// Decimal degree position, latitude first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatLon(f64, f64);

impl LatLon {
    pub fn lat(self) -> f64 {
        self.0
    }

    pub fn lon(self) -> f64 {
        self.1
    }

    //Ex: 5107830N 00610350E
    pub fn from_igc(lat: &str, lat_hemisphere: char, lon: &str, lon_hemisphere: char) -> Result<Self> {
        Ok(LatLon(
            to_decimal(lat, lat_hemisphere)?,
            to_decimal(lon, lon_hemisphere)?,
        ))
    }
}

/// Converts a `DDMMmmm` / `DDDMMmmm` value into signed decimal degrees.
///
/// The last five digits are minutes in thousandths, everything before them
/// is whole degrees. `S`, `W` and `-` negate the result.
pub fn to_decimal(raw: &str, hemisphere: char) -> Result<f64> {
    lazy_static! {
        static ref DEGREES_MINUTES_REGEX: Regex = Regex::new(r"^\d+$").unwrap();
    }

    let raw = raw.trim();
    if !DEGREES_MINUTES_REGEX.is_match(raw) {
        return Err(Error::format(format!("coordinate {:?} is not numeric", raw)));
    }
    let value: u64 = raw
        .parse()
        .map_err(|_| Error::format(format!("coordinate {:?} is out of range", raw)))?;

    let sign = match hemisphere {
        'N' | 'E' | '+' => 1.0,
        'S' | 'W' | '-' => -1.0,
        other => return Err(Error::format(format!("unknown hemisphere {:?}", other))),
    };

    let degrees = (value / 100_000) as f64;
    let minutes = (value % 100_000) as f64 / 100_000.0 / 60.0 * 100.0;
    Ok(sign * (degrees + minutes))
}
