//! Core data model and format registry for seismological waveform tooling.
//!
//! Three pieces live here: [`UtcDateTime`], a microsecond-precision UTC
//! timestamp with timezone-independent epoch conversion; [`Stats`], the
//! metadata record of one waveform trace, usable both as a string-keyed map
//! and through named fields; and the [`registry`], which discovers the
//! installed waveform codec backends and exposes each as a
//! [`FormatDescriptor`] with detect, read and write capabilities.
//!
//! # Timestamps
//!
//! ```
//! use seismo_core::UtcDateTime;
//!
//! let t = UtcDateTime::from_timestamp(86400.0).unwrap();
//! assert_eq!(t, UtcDateTime::from_ymd(1970, 1, 2).unwrap());
//! assert_eq!(t.to_epoch(), 86400.0);
//! assert!(UtcDateTime::from_ymd(2009, 2, 30).is_err());
//! ```
//!
//! # Trace metadata
//!
//! ```
//! use seismo_core::{Stats, UtcDateTime, Value};
//!
//! let mut stats = Stats::new().with_nslc("BW", "ROTZ", "", "EHZ");
//! stats.set("sampling_rate", 200.0);
//! stats.set("gain", 3);
//!
//! assert_eq!(stats.sampling_rate(), Some(200.0));
//! assert_eq!(stats.get("station"), Some(&Value::from("ROTZ")));
//! assert_eq!(stats.npts(), Some(-1));
//! assert_eq!(stats.starttime(), Some(UtcDateTime::epoch()));
//! assert_eq!(stats.id(), "BW.ROTZ..EHZ");
//! ```
//!
//! # Format discovery
//!
//! ```
//! use seismo_core::registry::{self, Installation};
//!
//! // Nothing installed: every candidate fails, discovery still succeeds.
//! let discovery = registry::discover(&Installation::new(), false);
//! assert!(discovery.is_empty());
//! assert_eq!(discovery.failures.len(), registry::CANDIDATES.len());
//! ```

pub mod error;
pub mod percentile;
pub mod registry;
pub mod samples;
pub mod stats;
pub mod time;

pub use error::{BindError, Error, Result};
pub use percentile::score_at_percentile;
pub use registry::{
    BackendSource, BindFailure, Capability, CodecBackend, Discovery, FormatDescriptor,
    Installation, Registry, discover,
};
pub use samples::Samples;
pub use stats::{Field, Stats, Value};
pub use time::UtcDateTime;
