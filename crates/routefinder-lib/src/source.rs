//! Line-segment sources feeding the graph builder.
//!
//! A source hands the builder a list of polylines together with the
//! coordinate reference system they are expressed in. Readers for GeoJSON
//! and CSV files live here, plus an in-memory source for embedding and tests.
//! Everything heavier (shapefiles, PBF extracts, arbitrary reprojection) is
//! expected to be converted to one of these formats upstream.

use std::env;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use geojson::{Feature, GeoJson, Value as GeoJsonValue};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::graph::EdgeMeta;
use crate::projection::Crs;

/// Environment variable consulted when no source path is passed explicitly.
pub const SOURCE_ENV_VAR: &str = "ROUTEFINDER_SOURCE";

/// Environment variable naming the CRS of sources that cannot declare one.
pub const CRS_ENV_VAR: &str = "ROUTEFINDER_CRS";

/// Travel direction permitted along a segment, relative to its coordinate order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Both,
    Forward,
    Backward,
}

impl Direction {
    /// Interpret the `oneway` attribute conventions found in OSM-derived data.
    ///
    /// `F`/`yes`/`true`/`1` mean travel follows the digitised direction,
    /// `T`/`-1`/`reverse` mean it runs against it, anything else is two-way.
    pub fn from_oneway(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "f" | "yes" | "true" | "1" => Direction::Forward,
            "t" | "-1" | "reverse" => Direction::Backward,
            _ => Direction::Both,
        }
    }

    fn from_json(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => Direction::from_oneway(s),
            Some(Value::Bool(true)) => Direction::Forward,
            Some(Value::Number(n)) => match n.as_i64() {
                Some(1) => Direction::Forward,
                Some(-1) => Direction::Backward,
                _ => Direction::Both,
            },
            _ => Direction::Both,
        }
    }
}

/// A polyline in source coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub coords: Vec<[f64; 2]>,
    pub direction: Direction,
    pub meta: Option<Arc<EdgeMeta>>,
}

impl Segment {
    pub fn new(coords: Vec<[f64; 2]>) -> Self {
        Self {
            coords,
            direction: Direction::Both,
            meta: None,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_meta(mut self, meta: EdgeMeta) -> Self {
        self.meta = Some(Arc::new(meta));
        self
    }
}

/// Producer of raw line segments for [`crate::build_graph`].
pub trait SegmentSource {
    /// Coordinate reference system the segments are expressed in.
    fn crs(&self) -> Crs;

    /// Drain the segments held by this source.
    fn read_segments(&mut self) -> Result<Vec<Segment>>;
}

// =============================================================================
// In-memory source
// =============================================================================

/// Segments supplied directly by the caller.
#[derive(Debug, Clone)]
pub struct MemorySource {
    crs: Crs,
    segments: Vec<Segment>,
}

impl MemorySource {
    pub fn new(crs: Crs, segments: Vec<Segment>) -> Self {
        Self { crs, segments }
    }

    /// Planar segments already in the working projection.
    pub fn planar(segments: Vec<Segment>) -> Self {
        Self::new(Crs::WebMercator, segments)
    }
}

impl SegmentSource for MemorySource {
    fn crs(&self) -> Crs {
        self.crs
    }

    fn read_segments(&mut self) -> Result<Vec<Segment>> {
        Ok(std::mem::take(&mut self.segments))
    }
}

// =============================================================================
// GeoJSON source
// =============================================================================

/// Road segments read from a GeoJSON `FeatureCollection`, a single `Feature`
/// or a bare line geometry.
///
/// `LineString` and `MultiLineString` geometries become segments; features
/// with any other geometry, or none, are skipped. The legacy `crs` member is
/// honoured when present, otherwise coordinates are WGS84 as RFC 7946 requires.
#[derive(Debug, Clone)]
pub struct GeoJsonSource {
    crs: Crs,
    segments: Vec<Segment>,
    skipped_features: usize,
}

impl GeoJsonSource {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let source = Self::from_reader(BufReader::new(file))?;
        info!(
            path = %path.display(),
            segments = source.segments.len(),
            skipped_features = source.skipped_features,
            crs = %source.crs,
            "read GeoJSON source"
        );
        Ok(source)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let document = GeoJson::from_reader(reader).map_err(malformed_geojson)?;
        Self::from_document(document)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let document = text.parse::<GeoJson>().map_err(malformed_geojson)?;
        Self::from_document(document)
    }

    /// Number of features ignored because they carried no line geometry.
    pub fn skipped_features(&self) -> usize {
        self.skipped_features
    }

    fn from_document(document: GeoJson) -> Result<Self> {
        let (features, foreign_members) = match document {
            GeoJson::FeatureCollection(collection) => {
                (collection.features, collection.foreign_members)
            }
            GeoJson::Feature(mut feature) => {
                let foreign_members = feature.foreign_members.take();
                (vec![feature], foreign_members)
            }
            GeoJson::Geometry(geometry) => match geometry.value {
                GeoJsonValue::LineString(_) | GeoJsonValue::MultiLineString(_) => {
                    (vec![Feature::from(geometry)], None)
                }
                _ => {
                    return Err(Error::malformed(
                        "expected a GeoJSON FeatureCollection, Feature or line geometry",
                    ))
                }
            },
        };

        let crs = named_crs(foreign_members.as_ref())?.unwrap_or(Crs::Wgs84);

        let mut segments = Vec::new();
        let mut skipped_features = 0usize;

        for (index, feature) in features.into_iter().enumerate() {
            let properties = feature.properties.unwrap_or_default();
            let direction = Direction::from_json(properties.get("oneway"));
            let meta = edge_meta(&properties);

            let lines = match feature.geometry.map(|geometry| geometry.value) {
                Some(GeoJsonValue::LineString(line)) => vec![line],
                Some(GeoJsonValue::MultiLineString(lines)) => lines,
                Some(_) | None => {
                    skipped_features += 1;
                    continue;
                }
            };

            for line in lines {
                let coords = line
                    .iter()
                    .map(|position| to_pair(position.iter().copied(), index))
                    .collect::<Result<Vec<_>>>()?;
                segments.push(Segment {
                    coords,
                    direction,
                    meta: meta.clone(),
                });
            }
        }

        Ok(Self {
            crs,
            segments,
            skipped_features,
        })
    }
}

impl SegmentSource for GeoJsonSource {
    fn crs(&self) -> Crs {
        self.crs
    }

    fn read_segments(&mut self) -> Result<Vec<Segment>> {
        Ok(std::mem::take(&mut self.segments))
    }
}

fn malformed_geojson(err: impl std::fmt::Display) -> Error {
    Error::malformed(format!("invalid GeoJSON: {err}"))
}

/// Read the pre-RFC 7946 `crs` member, `{"type": "name", "properties": {"name": ...}}`.
fn named_crs(foreign_members: Option<&Map<String, Value>>) -> Result<Option<Crs>> {
    let Some(member) = foreign_members.and_then(|members| members.get("crs")) else {
        return Ok(None);
    };
    let name = member
        .get("properties")
        .and_then(|properties| properties.get("name"))
        .and_then(Value::as_str)
        .ok_or_else(|| Error::malformed("crs member has no properties.name"))?;
    name.parse().map(Some)
}

fn to_pair(mut ordinates: impl Iterator<Item = f64>, feature: usize) -> Result<[f64; 2]> {
    match (ordinates.next(), ordinates.next()) {
        (Some(x), Some(y)) => Ok([x, y]),
        _ => Err(Error::malformed(format!(
            "feature {feature} has a position with fewer than two ordinates"
        ))),
    }
}

fn edge_meta(properties: &Map<String, Value>) -> Option<Arc<EdgeMeta>> {
    let text = |key: &str| {
        properties
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let name = text("name");
    let class = text("fclass").or_else(|| text("highway"));
    if name.is_none() && class.is_none() {
        return None;
    }
    Some(Arc::new(EdgeMeta { name, class }))
}

// =============================================================================
// CSV source
// =============================================================================

#[derive(Debug, Deserialize)]
struct CsvRow {
    segment: String,
    x: f64,
    y: f64,
    #[serde(default)]
    oneway: Option<String>,
}

/// Vertices listed one per row as `segment,x,y[,oneway]`.
///
/// Consecutive rows sharing a `segment` value form one polyline. CSV carries
/// no CRS of its own, so one must be supplied by the caller.
#[derive(Debug, Clone)]
pub struct CsvSegmentSource {
    crs: Crs,
    segments: Vec<Segment>,
}

impl CsvSegmentSource {
    pub fn from_path(path: &Path, crs: Option<Crs>) -> Result<Self> {
        let crs = crs.ok_or(Error::MissingCrs)?;
        let file = File::open(path)?;
        let source = Self::from_reader(BufReader::new(file), crs)?;
        info!(
            path = %path.display(),
            segments = source.segments.len(),
            crs = %crs,
            "read CSV source"
        );
        Ok(source)
    }

    pub fn from_reader<R: Read>(reader: R, crs: Crs) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let mut segments: Vec<Segment> = Vec::new();
        let mut current_id: Option<String> = None;

        for row in csv_reader.deserialize() {
            let row: CsvRow = row?;
            if current_id.as_deref() != Some(row.segment.as_str()) {
                let direction = row
                    .oneway
                    .as_deref()
                    .map(Direction::from_oneway)
                    .unwrap_or_default();
                segments.push(Segment::new(Vec::new()).with_direction(direction));
                current_id = Some(row.segment.clone());
            }
            if let Some(segment) = segments.last_mut() {
                segment.coords.push([row.x, row.y]);
            }
        }

        Ok(Self { crs, segments })
    }
}

impl SegmentSource for CsvSegmentSource {
    fn crs(&self) -> Crs {
        self.crs
    }

    fn read_segments(&mut self) -> Result<Vec<Segment>> {
        Ok(std::mem::take(&mut self.segments))
    }
}

// =============================================================================
// Source resolution
// =============================================================================

/// Resolve the source path from an explicit argument or [`SOURCE_ENV_VAR`].
pub fn resolve_source_path(explicit: Option<&Path>) -> Result<PathBuf> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => env::var_os(SOURCE_ENV_VAR)
            .map(PathBuf::from)
            .ok_or(Error::SourceNotConfigured {
                env_var: SOURCE_ENV_VAR,
            })?,
    };

    if !path.exists() {
        return Err(Error::SourceNotFound { path });
    }
    debug!(path = %path.display(), "resolved geometry source");
    Ok(path)
}

/// Resolve the CRS override from an explicit value or [`CRS_ENV_VAR`].
pub fn resolve_crs(explicit: Option<&str>) -> Result<Option<Crs>> {
    let value = match explicit {
        Some(value) => Some(value.to_string()),
        None => env::var(CRS_ENV_VAR).ok(),
    };
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.parse())
        .transpose()
}

/// Open a segment source, choosing the reader from the file extension.
///
/// `crs` is required for CSV files and ignored for GeoJSON, which declares
/// its own.
pub fn load_source(path: &Path, crs: Option<Crs>) -> Result<Box<dyn SegmentSource>> {
    if !path.exists() {
        return Err(Error::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("geojson") | Some("json") => Ok(Box::new(GeoJsonSource::from_path(path)?)),
        Some("csv") => Ok(Box::new(CsvSegmentSource::from_path(path, crs)?)),
        _ => Err(Error::malformed(format!(
            "unrecognised source format for {}; expected .geojson, .json or .csv",
            path.display()
        ))),
    }
}
