//! Trace metadata record.
//!
//! [`Stats`] describes one waveform trace. It is both a string-keyed map and
//! a record with named fields: the documented fields (see [`Field`]) are
//! ordinary entries of the same map, pre-populated with defaults, so a
//! write through a named setter is visible through [`Stats::get`] and a
//! [`Stats::set`] on a documented key is visible through the named getter.
//!
//! Values are not validated. A named getter returns `None` when the entry
//! was removed or holds a value of another type.

use std::collections::BTreeMap;
use std::fmt;

use crate::time::UtcDateTime;

/// A dynamically typed metadata value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Float(f64),
    Int(i64),
    Bool(bool),
    Time(UtcDateTime),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Floats, and integers widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<UtcDateTime> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Time(t) => write!(f, "{t}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<UtcDateTime> for Value {
    fn from(t: UtcDateTime) -> Self {
        Value::Time(t)
    }
}

/// The documented trace fields every [`Stats`] starts out with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Station,
    Network,
    Location,
    Channel,
    SamplingRate,
    Npts,
    DataQuality,
    StartTime,
    EndTime,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Station,
        Field::Network,
        Field::Location,
        Field::Channel,
        Field::SamplingRate,
        Field::Npts,
        Field::DataQuality,
        Field::StartTime,
        Field::EndTime,
    ];

    /// Map key under which this field is stored.
    pub fn key(self) -> &'static str {
        match self {
            Field::Station => "station",
            Field::Network => "network",
            Field::Location => "location",
            Field::Channel => "channel",
            Field::SamplingRate => "sampling_rate",
            Field::Npts => "npts",
            Field::DataQuality => "dataquality",
            Field::StartTime => "starttime",
            Field::EndTime => "endtime",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    /// Value injected when the field is not supplied at construction.
    pub fn default_value(self) -> Value {
        match self {
            Field::Station => "dummy".into(),
            Field::Network => "--".into(),
            Field::Location => "".into(),
            Field::Channel => "BHZ".into(),
            Field::SamplingRate => Value::Float(1.0),
            Field::Npts => Value::Int(-1),
            Field::DataQuality => "".into(),
            Field::StartTime => UtcDateTime::epoch().into(),
            // one day past the epoch is always in range
            Field::EndTime => UtcDateTime::from_timestamp(86400.0)
                .unwrap_or_default()
                .into(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Metadata of one waveform trace.
///
/// # Examples
///
/// ```
/// use seismo_core::{Stats, Value};
///
/// let mut stats = Stats::with_initial([("station", "ROTZ")]);
/// stats.set_network("BW");
/// assert_eq!(stats.get("network"), Some(&Value::from("BW")));
/// assert_eq!(stats.station(), Some("ROTZ"));
/// assert_eq!(stats.channel(), Some("BHZ"));
///
/// let keys: Vec<_> = stats.keys().take(3).collect();
/// assert_eq!(keys, ["channel", "dataquality", "endtime"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    entries: BTreeMap<String, Value>,
}

impl Stats {
    /// Create a record holding only the documented defaults.
    pub fn new() -> Self {
        Self::with_initial(std::iter::empty::<(String, Value)>())
    }

    /// Create a record from explicit entries, then fill in defaults for
    /// every documented field that was not supplied.
    pub fn with_initial<I, K, V>(initial: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut entries: BTreeMap<String, Value> = initial
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        for field in Field::ALL {
            entries
                .entry(field.key().to_string())
                .or_insert_with(|| field.default_value());
        }
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Like [`get`](Self::get), falling back to `default` for absent keys.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.entries.get(key).unwrap_or(default)
    }

    /// Insert or replace an entry, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// All present keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn field(&self, field: Field) -> Option<&Value> {
        self.get(field.key())
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<Value>) -> Option<Value> {
        self.set(field.key(), value)
    }

    fn str_field(&self, field: Field) -> Option<&str> {
        self.field(field).and_then(Value::as_str)
    }

    pub fn station(&self) -> Option<&str> {
        self.str_field(Field::Station)
    }

    pub fn set_station(&mut self, station: impl Into<String>) {
        self.set_field(Field::Station, station.into());
    }

    pub fn network(&self) -> Option<&str> {
        self.str_field(Field::Network)
    }

    pub fn set_network(&mut self, network: impl Into<String>) {
        self.set_field(Field::Network, network.into());
    }

    pub fn location(&self) -> Option<&str> {
        self.str_field(Field::Location)
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.set_field(Field::Location, location.into());
    }

    pub fn channel(&self) -> Option<&str> {
        self.str_field(Field::Channel)
    }

    pub fn set_channel(&mut self, channel: impl Into<String>) {
        self.set_field(Field::Channel, channel.into());
    }

    /// Sampling rate in Hz.
    pub fn sampling_rate(&self) -> Option<f64> {
        self.field(Field::SamplingRate).and_then(Value::as_f64)
    }

    pub fn set_sampling_rate(&mut self, rate: f64) {
        self.set_field(Field::SamplingRate, rate);
    }

    /// Number of samples; `-1` means unknown.
    pub fn npts(&self) -> Option<i64> {
        self.field(Field::Npts).and_then(Value::as_i64)
    }

    pub fn set_npts(&mut self, npts: i64) {
        self.set_field(Field::Npts, npts);
    }

    pub fn dataquality(&self) -> Option<&str> {
        self.str_field(Field::DataQuality)
    }

    pub fn set_dataquality(&mut self, quality: impl Into<String>) {
        self.set_field(Field::DataQuality, quality.into());
    }

    pub fn starttime(&self) -> Option<UtcDateTime> {
        self.field(Field::StartTime).and_then(Value::as_time)
    }

    pub fn set_starttime(&mut self, time: UtcDateTime) {
        self.set_field(Field::StartTime, time);
    }

    pub fn endtime(&self) -> Option<UtcDateTime> {
        self.field(Field::EndTime).and_then(Value::as_time)
    }

    pub fn set_endtime(&mut self, time: UtcDateTime) {
        self.set_field(Field::EndTime, time);
    }

    /// Set network, station, location, and channel codes.
    pub fn with_nslc(
        mut self,
        network: &str,
        station: &str,
        location: &str,
        channel: &str,
    ) -> Self {
        self.set_network(network);
        self.set_station(station);
        self.set_location(location);
        self.set_channel(channel);
        self
    }

    pub fn with_sampling_rate(mut self, rate: f64) -> Self {
        self.set_sampling_rate(rate);
        self
    }

    pub fn with_npts(mut self, npts: i64) -> Self {
        self.set_npts(npts);
        self
    }

    pub fn with_starttime(mut self, time: UtcDateTime) -> Self {
        self.set_starttime(time);
        self
    }

    pub fn with_endtime(mut self, time: UtcDateTime) -> Self {
        self.set_endtime(time);
        self
    }

    /// Return the trace identifier: `"NET.STA.LOC.CHA"`.
    pub fn id(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.network().unwrap_or(""),
            self.station().unwrap_or(""),
            self.location().unwrap_or(""),
            self.channel().unwrap_or("")
        )
    }

    fn display_field(&self, field: Field) -> String {
        self.field(field)
            .map_or_else(|| "?".to_string(), ToString::to_string)
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Stats {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::with_initial(iter)
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Stats {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl From<BTreeMap<String, Value>> for Stats {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self::with_initial(map)
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} - {} | {} Hz, {} samples",
            self.id(),
            self.display_field(Field::StartTime),
            self.display_field(Field::EndTime),
            self.display_field(Field::SamplingRate),
            self.display_field(Field::Npts),
        )
    }
}
