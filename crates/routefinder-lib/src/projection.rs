//! Coordinate reference systems understood by the segment sources.
//!
//! The routing graph always works in spherical Web Mercator (EPSG:3857),
//! so edge weights are planar lengths in metres. Sources may hand us either
//! geographic WGS84 coordinates, which are projected on the way in, or
//! coordinates that are already in Web Mercator.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};

/// Equatorial radius used by EPSG:3857.
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude bound beyond which Web Mercator diverges.
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

/// Coordinate reference systems a segment source can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Crs {
    /// Geographic longitude/latitude (EPSG:4326, OGC CRS84).
    #[serde(rename = "EPSG:4326")]
    Wgs84,
    /// Spherical Web Mercator (EPSG:3857), the graph's working projection.
    #[serde(rename = "EPSG:3857")]
    WebMercator,
}

impl Crs {
    /// Project a coordinate expressed in this CRS into the working projection.
    pub fn to_planar(self, coord: [f64; 2]) -> [f64; 2] {
        match self {
            Crs::Wgs84 => wgs84_to_web_mercator(coord[0], coord[1]),
            Crs::WebMercator => coord,
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Crs::Wgs84 => "EPSG:4326",
            Crs::WebMercator => "EPSG:3857",
        };
        f.write_str(value)
    }
}

impl FromStr for Crs {
    type Err = Error;

    /// Accepts `EPSG:<code>` names as well as the OGC URN spellings GeoJSON
    /// files carry in their legacy `crs` member.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase();
        let code = normalized.rsplit(':').next().unwrap_or(normalized.as_str());

        match code {
            "4326" | "CRS84" | "WGS84" => Ok(Crs::Wgs84),
            "3857" | "900913" | "3785" | "102100" => Ok(Crs::WebMercator),
            _ => Err(Error::UnsupportedCrs {
                name: s.to_string(),
            }),
        }
    }
}

/// Project a WGS84 longitude/latitude pair into Web Mercator metres.
pub fn wgs84_to_web_mercator(lon: f64, lat: f64) -> [f64; 2] {
    let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    let x = EARTH_RADIUS_M * lon.to_radians();
    let y = EARTH_RADIUS_M * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
    [x, y]
}

/// Invert [`wgs84_to_web_mercator`], returning `[lon, lat]` in degrees.
pub fn web_mercator_to_wgs84(x: f64, y: f64) -> [f64; 2] {
    let lon = (x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS_M).exp().atan() - PI / 2.0).to_degrees();
    [lon, lat]
}

/// Parse a `lon,lat` pair as accepted by the CLI and HTTP query strings.
pub fn parse_lonlat(value: &str) -> Result<[f64; 2]> {
    let invalid = |reason: String| Error::InvalidParameter {
        name: "coordinate",
        reason,
    };

    let (lon, lat) = value
        .split_once(',')
        .ok_or_else(|| invalid(format!("expected 'lon,lat', got '{value}'")))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|_| invalid(format!("longitude '{}' is not a number", lon.trim())))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| invalid(format!("latitude '{}' is not a number", lat.trim())))?;

    if !(-180.0..=180.0).contains(&lon) {
        return Err(invalid(format!("longitude {lon} is outside [-180, 180]")));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(invalid(format!("latitude {lat} is outside [-90, 90]")));
    }
    Ok([lon, lat])
}
