//! Tag/attribute log loader.
//!
//! # Trip log (`tripinfo` output)
//!
//! One `<tripinfo>` per vehicle directly under the `<tripinfos>` root.
//!
//! | Attribute             | Required | Meaning                                   |
//! |-----------------------|----------|-------------------------------------------|
//! | `id`                  | yes      | vehicle id, unique within the file        |
//! | `depart`              | yes      | departure time (s)                        |
//! | `routeLength`         | yes      | traveled distance (m)                     |
//! | `timeLoss`            | yes      | delay vs. free flow (s), `>= 0`           |
//! | `arrival`             | no       | arrival time (s); negative = never arrived|
//! | `duration`            | no       | travel time (s)                           |
//! | `waitingTime`         | no       | time spent halted (s), default 0          |
//! | `rerouteNo`           | no       | number of reroutes, default 0             |
//! | `vaporized`           | no       | removal reason; empty = not vaporized     |
//! | `intendedRouteLength` | no       | planned route length (m)                  |
//!
//! # Summary log (`summary` output)
//!
//! One `<step>` per sampling interval under the `<summary>` root; required
//! attributes are `time`, `running`, `halting` and `meanSpeed` (negative =
//! no running vehicles).  Timestamps must increase strictly and be evenly
//! spaced at the interval set by the first two steps.
//!
//! # Memory
//!
//! Files are read fully into memory before parsing.  Simulator batch outputs
//! for a city-scale scenario are tens of megabytes, and the dataset needs
//! every vehicle id up front for the overlap check anyway.

use std::path::Path;

use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use rustc_hash::FxHashSet;

use v2x_core::{SimTime, Variant, VehicleId};

use crate::record::{ScenarioVariantLog, SummarySnapshot, TripRecord};
use crate::{LogError, LogResult};

/// Relative tolerance when comparing summary step spacing.
const STEP_TOLERANCE: f64 = 1e-6;

// ── Public API ────────────────────────────────────────────────────────────────

/// Which kind of records a file holds.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum RecordKind {
    Trip,
    Summary,
}

/// Records loaded by [`load_log`].
#[derive(Clone, Debug)]
pub enum ParsedLog {
    Trips(Vec<TripRecord>),
    Snapshots(Vec<SummarySnapshot>),
}

impl ParsedLog {
    pub fn len(&self) -> usize {
        match self {
            ParsedLog::Trips(v) => v.len(),
            ParsedLog::Snapshots(v) => v.len(),
        }
    }

    /// Always `false` for a successfully loaded log.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Load the records of the declared `kind` from `path`.
pub fn load_log(path: &Path, kind: RecordKind) -> LogResult<ParsedLog> {
    match kind {
        RecordKind::Trip => load_trips(path).map(ParsedLog::Trips),
        RecordKind::Summary => load_summary(path).map(ParsedLog::Snapshots),
    }
}

/// Load every `<tripinfo>` record from a trip log, in file order.
pub fn load_trips(path: &Path) -> LogResult<Vec<TripRecord>> {
    let src = read_source(path)?;
    load_trips_str(&src, path)
}

/// Like [`load_trips`] but parses an in-memory document.  `path` is only
/// used for error context.
pub fn load_trips_str(src: &str, path: &Path) -> LogResult<Vec<TripRecord>> {
    let rows = parse_records::<TripRecord>(src, path)?;

    let mut seen = FxHashSet::default();
    for (line, trip) in &rows {
        if !seen.insert(trip.id.as_str()) {
            return Err(malformed(path, *line, format!("duplicate vehicle id {:?}", trip.id.as_str())));
        }
    }

    Ok(rows.into_iter().map(|(_, trip)| trip).collect())
}

/// Load every `<step>` record from a summary log, in file order.
pub fn load_summary(path: &Path) -> LogResult<Vec<SummarySnapshot>> {
    let src = read_source(path)?;
    load_summary_str(&src, path)
}

/// Like [`load_summary`] but parses an in-memory document.
pub fn load_summary_str(src: &str, path: &Path) -> LogResult<Vec<SummarySnapshot>> {
    let rows = parse_records::<SummarySnapshot>(src, path)?;
    check_time_sequence(&rows, path)?;
    Ok(rows.into_iter().map(|(_, snap)| snap).collect())
}

/// Load both logs of one variant into a [`ScenarioVariantLog`].
pub fn load_variant(
    variant:      Variant,
    trip_path:    &Path,
    summary_path: &Path,
) -> LogResult<ScenarioVariantLog> {
    let trips = load_trips(trip_path)?;
    debug!("{variant}: loaded {} trips from {}", trips.len(), trip_path.display());

    let snapshots = load_summary(summary_path)?;
    debug!("{variant}: loaded {} summary steps from {}", snapshots.len(), summary_path.display());

    Ok(ScenarioVariantLog::new(variant, trips, snapshots))
}

// ── Record decoding ───────────────────────────────────────────────────────────

/// A record type decodable from one element's attributes.
trait LogRecord: Sized {
    const ROOT:    &'static str;
    const ELEMENT: &'static str;

    fn from_attrs(attrs: &Attrs) -> Result<Self, FieldError>;
}

impl LogRecord for TripRecord {
    const ROOT:    &'static str = "tripinfos";
    const ELEMENT: &'static str = "tripinfo";

    fn from_attrs(attrs: &Attrs) -> Result<Self, FieldError> {
        let id = attrs.required_str("id")?;
        if id.is_empty() {
            return Err(FieldError::Invalid { field: "id", value: String::new() });
        }

        let depart = SimTime(attrs.required_f64("depart")?);
        let arrival = attrs
            .optional_f64("arrival")?
            .filter(|&t| t >= 0.0)
            .map(SimTime);

        if let Some(arrival) = arrival {
            if arrival < depart {
                return Err(FieldError::Invariant(format!(
                    "vehicle {id:?} arrives at {arrival} before departing at {depart}"
                )));
            }
        }

        let time_loss = attrs.required_f64("timeLoss")?;
        if time_loss < 0.0 {
            return Err(FieldError::Invariant(format!(
                "vehicle {id:?} has negative timeLoss {time_loss}"
            )));
        }

        let route_length = attrs.required_f64("routeLength")?;
        if route_length < 0.0 {
            return Err(FieldError::Invariant(format!(
                "vehicle {id:?} has negative routeLength {route_length}"
            )));
        }

        Ok(TripRecord {
            id:                    VehicleId::from(id),
            depart,
            arrival,
            route_length,
            intended_route_length: attrs.optional_f64("intendedRouteLength")?,
            time_loss,
            duration:              attrs.optional_f64("duration")?,
            waiting_time:          attrs.optional_f64("waitingTime")?.unwrap_or(0.0),
            reroute_count:         attrs.optional_u32("rerouteNo")?.unwrap_or(0),
            vaporized:             attrs
                .raw("vaporized")
                .filter(|v| !v.is_empty())
                .map(str::to_owned),
        })
    }
}

impl LogRecord for SummarySnapshot {
    const ROOT:    &'static str = "summary";
    const ELEMENT: &'static str = "step";

    fn from_attrs(attrs: &Attrs) -> Result<Self, FieldError> {
        Ok(SummarySnapshot {
            time:       SimTime(attrs.required_f64("time")?),
            running:    attrs.required_u32("running")?,
            mean_speed: Some(attrs.required_f64("meanSpeed")?).filter(|&s| s >= 0.0),
            halting:    attrs.required_u32("halting")?,
        })
    }
}

/// Why one element could not be decoded.  Converted to a [`LogError`] with
/// path and line context by the parser.
enum FieldError {
    Missing(&'static str),
    Invalid { field: &'static str, value: String },
    Invariant(String),
}

/// Decoded attributes of one element.
struct Attrs {
    pairs: Vec<(String, String)>,
}

impl Attrs {
    fn from_element(e: &BytesStart<'_>) -> Result<Self, String> {
        let mut pairs = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| err.to_string())?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|err| err.to_string())?
                .to_owned();
            let value = attr.unescape_value().map_err(|err| err.to_string())?.into_owned();
            pairs.push((key, value));
        }
        Ok(Self { pairs })
    }

    fn raw(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn required_str(&self, name: &'static str) -> Result<&str, FieldError> {
        self.raw(name).ok_or(FieldError::Missing(name))
    }

    fn required_f64(&self, name: &'static str) -> Result<f64, FieldError> {
        parse_f64(name, self.required_str(name)?)
    }

    fn optional_f64(&self, name: &'static str) -> Result<Option<f64>, FieldError> {
        self.raw(name).map(|v| parse_f64(name, v)).transpose()
    }

    fn required_u32(&self, name: &'static str) -> Result<u32, FieldError> {
        parse_u32(name, self.required_str(name)?)
    }

    fn optional_u32(&self, name: &'static str) -> Result<Option<u32>, FieldError> {
        self.raw(name).map(|v| parse_u32(name, v)).transpose()
    }
}

fn parse_f64(field: &'static str, value: &str) -> Result<f64, FieldError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FieldError::Invalid { field, value: value.to_owned() })
}

fn parse_u32(field: &'static str, value: &str) -> Result<u32, FieldError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| FieldError::Invalid { field, value: value.to_owned() })
}

// ── Document walk ─────────────────────────────────────────────────────────────

/// Parse every `R::ELEMENT` child of the `R::ROOT` element, tagged with its
/// 1-based source line.
fn parse_records<R: LogRecord>(src: &str, path: &Path) -> LogResult<Vec<(usize, R)>> {
    let mut reader = Reader::from_str(src);
    let mut lines = LineCounter::new(src);
    let mut depth: usize = 0;
    let mut saw_root = false;
    let mut rows: Vec<(usize, R)> = Vec::new();

    loop {
        let start = reader.buffer_position();
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(err) => {
                let line = lines.line_at(reader.buffer_position());
                return Err(malformed(path, line, err.to_string()));
            }
        };
        let line = lines.line_at(start);

        match &event {
            Event::Start(e) | Event::Empty(e) => {
                let name = e.name();
                if depth == 0 {
                    if saw_root {
                        return Err(malformed(path, line, "multiple root elements".to_owned()));
                    }
                    if name.as_ref() != R::ROOT.as_bytes() {
                        return Err(malformed(
                            path,
                            line,
                            format!(
                                "expected root element <{}>, found <{}>",
                                R::ROOT,
                                String::from_utf8_lossy(name.as_ref())
                            ),
                        ));
                    }
                    saw_root = true;
                } else if depth == 1 && name.as_ref() == R::ELEMENT.as_bytes() {
                    let attrs = Attrs::from_element(e).map_err(|reason| malformed(path, line, reason))?;
                    let record = R::from_attrs(&attrs)
                        .map_err(|err| field_error(err, path, line, R::ELEMENT))?;
                    rows.push((line, record));
                }

                if matches!(event, Event::Start(_)) {
                    depth += 1;
                }
            }
            Event::End(_) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| malformed(path, line, "unbalanced closing tag".to_owned()))?;
            }
            Event::Eof => {
                if !saw_root {
                    return Err(malformed(path, line, format!("no <{}> root element", R::ROOT)));
                }
                if depth != 0 {
                    return Err(malformed(path, line, "unexpected end of file".to_owned()));
                }
                break;
            }
            _ => {}
        }
    }

    if rows.is_empty() {
        return Err(LogError::EmptyLog { path: path.to_path_buf(), element: R::ELEMENT });
    }
    Ok(rows)
}

/// Enforce strictly increasing, evenly spaced summary timestamps.
fn check_time_sequence(rows: &[(usize, SummarySnapshot)], path: &Path) -> LogResult<()> {
    let interval = match rows {
        [(_, a), (_, b), ..] => b.time - a.time,
        _ => return Ok(()),
    };

    for pair in rows.windows(2) {
        let (_, prev) = &pair[0];
        let (line, cur) = &pair[1];
        let step = cur.time - prev.time;

        if step <= 0.0 {
            return Err(malformed(
                path,
                *line,
                format!("step time {} does not increase after {}", cur.time, prev.time),
            ));
        }
        if (step - interval).abs() > STEP_TOLERANCE * interval.max(1.0) {
            return Err(malformed(
                path,
                *line,
                format!(
                    "gap in summary: step at {} follows {} but the sampling interval is {interval}s",
                    cur.time, prev.time
                ),
            ));
        }
    }
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn read_source(path: &Path) -> LogResult<String> {
    let bytes = std::fs::read(path).map_err(|source| LogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|err| {
        malformed(path, 1, format!("file is not valid UTF-8: {err}"))
    })
}

fn malformed(path: &Path, line: usize, reason: String) -> LogError {
    LogError::MalformedLog { path: path.to_path_buf(), line, reason }
}

fn field_error(err: FieldError, path: &Path, line: usize, element: &'static str) -> LogError {
    match err {
        FieldError::Missing(field) => LogError::MissingField {
            path: path.to_path_buf(),
            line,
            element,
            field,
        },
        FieldError::Invalid { field, value } => {
            malformed(path, line, format!("attribute `{field}` has invalid value {value:?}"))
        }
        FieldError::Invariant(reason) => malformed(path, line, reason),
    }
}

/// Maps byte offsets to 1-based line numbers, scanning forward incrementally.
struct LineCounter<'a> {
    src:  &'a [u8],
    pos:  usize,
    line: usize,
}

impl<'a> LineCounter<'a> {
    fn new(src: &'a str) -> Self {
        Self { src: src.as_bytes(), pos: 0, line: 1 }
    }

    fn line_at(&mut self, pos: usize) -> usize {
        let pos = pos.min(self.src.len());
        if pos < self.pos {
            self.pos = 0;
            self.line = 1;
        }
        self.line += self.src[self.pos..pos].iter().filter(|&&b| b == b'\n').count();
        self.pos = pos;
        self.line
    }
}
