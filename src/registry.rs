//! Runtime discovery of waveform codec backends.
//!
//! The toolkit knows a fixed, ordered list of waveform formats
//! ([`CANDIDATES`]). Each one is implemented by an optional backend module
//! exporting three named capabilities: a detector, a reader and a writer.
//! [`discover`] asks a [`BackendSource`] for every candidate's module and
//! binds the three capabilities into a [`FormatDescriptor`]. A candidate
//! whose module is missing, fails to load, speaks another API version,
//! lacks a capability or panics is recorded as a [`BindFailure`] and
//! skipped; discovery itself never fails.
//!
//! ```
//! use seismo_core::registry::{self, Capability, Installation, StaticBackend};
//! use seismo_core::{Samples, Stats};
//!
//! let mut installation = Installation::new();
//! installation.install(
//!     "seismo.wav",
//!     StaticBackend::new()
//!         .with("is_wav", Capability::detect(|data| data.starts_with(b"RIFF")))
//!         .with("read_wav", Capability::read(|_| Ok((Samples::default(), Stats::new()))))
//!         .with("write_wav", Capability::write(|_, _, _| Ok(()))),
//! );
//!
//! let discovery = registry::discover(&installation, false);
//! assert_eq!(discovery.names(), ["WAV"]);
//! assert_eq!(discovery.failures.len(), 2);
//! assert_eq!(discovery.detect(b"RIFF....WAVE").map(|f| f.name()), Some("WAV"));
//! ```

use std::any::Any;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io::{Read, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

use crate::error::BindError;
use crate::samples::Samples;
use crate::stats::Stats;
use crate::Result;

/// Capability API version backends must report to be bound.
pub const BACKEND_API_VERSION: u32 = 1;

pub type DetectFn = Arc<dyn Fn(&[u8]) -> bool + Send + Sync>;
pub type ReadFn = Arc<dyn Fn(&mut dyn Read) -> Result<(Samples, Stats)> + Send + Sync>;
pub type WriteFn = Arc<dyn Fn(&Stats, &Samples, &mut dyn Write) -> Result<()> + Send + Sync>;

/// One named export of a backend module.
#[derive(Clone)]
pub enum Capability {
    Detect(DetectFn),
    Read(ReadFn),
    Write(WriteFn),
}

impl Capability {
    pub fn detect(f: impl Fn(&[u8]) -> bool + Send + Sync + 'static) -> Self {
        Self::Detect(Arc::new(f))
    }

    pub fn read(
        f: impl Fn(&mut dyn Read) -> Result<(Samples, Stats)> + Send + Sync + 'static,
    ) -> Self {
        Self::Read(Arc::new(f))
    }

    pub fn write(
        f: impl Fn(&Stats, &Samples, &mut dyn Write) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self::Write(Arc::new(f))
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Detect(_) => "detect",
            Self::Read(_) => "read",
            Self::Write(_) => "write",
        }
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capability::{}", self.kind())
    }
}

/// A loaded codec backend module.
pub trait CodecBackend: Send + Sync {
    /// Capability API version this backend was built against.
    fn api_version(&self) -> u32 {
        BACKEND_API_VERSION
    }

    /// Look up an exported capability by name.
    fn capability(&self, name: &str) -> Option<Capability>;
}

/// Locates backend modules by name.
pub trait BackendSource: Send + Sync {
    /// Load the backend implementing `module`.
    ///
    /// Implementations report a module they do not know with
    /// [`BindError::NotInstalled`].
    fn load(&self, module: &str) -> std::result::Result<Arc<dyn CodecBackend>, BindError>;
}

/// A backend assembled from capabilities registered at runtime.
#[derive(Debug, Clone, Default)]
pub struct StaticBackend {
    version: Option<u32>,
    capabilities: BTreeMap<String, Capability>,
}

impl StaticBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Export `capability` under `name`.
    pub fn with(mut self, name: &str, capability: Capability) -> Self {
        self.capabilities.insert(name.to_string(), capability);
        self
    }

    /// Report an API version other than [`BACKEND_API_VERSION`].
    pub fn with_api_version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }
}

impl CodecBackend for StaticBackend {
    fn api_version(&self) -> u32 {
        self.version.unwrap_or(BACKEND_API_VERSION)
    }

    fn capability(&self, name: &str) -> Option<Capability> {
        self.capabilities.get(name).cloned()
    }
}

/// The set of backend modules installed in this process.
#[derive(Clone, Default)]
pub struct Installation {
    backends: BTreeMap<String, Arc<dyn CodecBackend>>,
}

impl Installation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `backend` as `module`, replacing any previous one.
    pub fn install(
        &mut self,
        module: &str,
        backend: impl CodecBackend + 'static,
    ) -> &mut Self {
        self.backends.insert(module.to_string(), Arc::new(backend));
        self
    }

    pub fn uninstall(&mut self, module: &str) -> bool {
        self.backends.remove(module).is_some()
    }

    /// Installed module names, sorted.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.backends.keys().map(String::as_str)
    }
}

impl fmt::Debug for Installation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Installation")
            .field("modules", &self.backends.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl BackendSource for Installation {
    fn load(&self, module: &str) -> std::result::Result<Arc<dyn CodecBackend>, BindError> {
        self.backends
            .get(module)
            .cloned()
            .ok_or_else(|| BindError::NotInstalled {
                module: module.to_string(),
            })
    }
}

/// A format the toolkit knows how to support, and where to find it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Format identifier, e.g. `"MSEED"`.
    pub format: &'static str,
    /// Backend module implementing the format.
    pub module: &'static str,
    pub detect: &'static str,
    pub read: &'static str,
    pub write: &'static str,
}

/// Supported formats, in auto-detection precedence order.
///
/// Supporting a new format means appending an entry here.
pub const CANDIDATES: &[Candidate] = &[
    Candidate {
        format: "MSEED",
        module: "seismo.mseed",
        detect: "is_mseed",
        read: "read_mseed",
        write: "write_mseed",
    },
    Candidate {
        format: "GSE2",
        module: "seismo.gse2",
        detect: "is_gse2",
        read: "read_gse2",
        write: "write_gse2",
    },
    Candidate {
        format: "WAV",
        module: "seismo.wav",
        detect: "is_wav",
        read: "read_wav",
        write: "write_wav",
    },
];

impl Candidate {
    /// Load this candidate's module and bind all three capabilities.
    pub fn bind(
        &self,
        source: &dyn BackendSource,
    ) -> std::result::Result<FormatDescriptor, BindError> {
        let backend = source.load(self.module)?;
        let found = backend.api_version();
        if found != BACKEND_API_VERSION {
            return Err(BindError::IncompatibleVersion {
                module: self.module.to_string(),
                found,
                expected: BACKEND_API_VERSION,
            });
        }

        let detect = match self.lookup(backend.as_ref(), self.detect)? {
            Capability::Detect(f) => f,
            other => return Err(self.wrong_kind(self.detect, "detect", &other)),
        };
        let read = match self.lookup(backend.as_ref(), self.read)? {
            Capability::Read(f) => f,
            other => return Err(self.wrong_kind(self.read, "read", &other)),
        };
        let write = match self.lookup(backend.as_ref(), self.write)? {
            Capability::Write(f) => f,
            other => return Err(self.wrong_kind(self.write, "write", &other)),
        };

        Ok(FormatDescriptor {
            name: self.format,
            detect,
            read,
            write,
        })
    }

    fn lookup(
        &self,
        backend: &dyn CodecBackend,
        name: &str,
    ) -> std::result::Result<Capability, BindError> {
        backend
            .capability(name)
            .ok_or_else(|| BindError::MissingCapability {
                module: self.module.to_string(),
                capability: name.to_string(),
            })
    }

    fn wrong_kind(&self, name: &str, expected: &'static str, found: &Capability) -> BindError {
        tracing::debug!(
            module = self.module,
            capability = name,
            found = found.kind(),
            "capability kind mismatch"
        );
        BindError::WrongCapabilityKind {
            module: self.module.to_string(),
            capability: name.to_string(),
            expected,
        }
    }
}

/// A format whose detect, read and write capabilities are all bound.
#[derive(Clone)]
pub struct FormatDescriptor {
    name: &'static str,
    detect: DetectFn,
    read: ReadFn,
    write: WriteFn,
}

impl FormatDescriptor {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether `data` looks like this format.
    pub fn detect(&self, data: &[u8]) -> bool {
        (self.detect)(data)
    }

    pub fn read(&self, source: &mut dyn Read) -> Result<(Samples, Stats)> {
        (self.read)(source)
    }

    pub fn write(&self, stats: &Stats, samples: &Samples, dest: &mut dyn Write) -> Result<()> {
        (self.write)(stats, samples, dest)
    }

    pub fn detect_fn(&self) -> &DetectFn {
        &self.detect
    }

    pub fn read_fn(&self) -> &ReadFn {
        &self.read
    }

    pub fn write_fn(&self) -> &WriteFn {
        &self.write
    }
}

impl fmt::Debug for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A candidate that could not be bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindFailure {
    pub format: &'static str,
    pub module: &'static str,
    pub error: BindError,
}

impl fmt::Display for BindFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.format, self.error)
    }
}

/// Result of one discovery pass.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Bound formats, in candidate order.
    pub formats: Vec<FormatDescriptor>,
    /// Candidates that failed to bind, in candidate order.
    pub failures: Vec<BindFailure>,
}

impl Discovery {
    pub fn get(&self, name: &str) -> Option<&FormatDescriptor> {
        self.formats.iter().find(|f| f.name == name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.formats.iter().map(|f| f.name).collect()
    }

    /// First format, in precedence order, whose detector accepts `data`.
    pub fn detect(&self, data: &[u8]) -> Option<&FormatDescriptor> {
        self.formats.iter().find(|f| f.detect(data))
    }

    /// No formats bound: auto-detection is impossible.
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

/// Bind every entry of [`CANDIDATES`] against `source`.
///
/// With `verbose` set, each failure is emitted as a `tracing` warning once
/// discovery has finished, in the order it was captured.
///
/// A backend that panics is recorded like any other failure, but the panic
/// still passes through the process panic hook, which prints it to stderr
/// regardless of `verbose`.
pub fn discover(source: &dyn BackendSource, verbose: bool) -> Discovery {
    discover_candidates(CANDIDATES, source, verbose)
}

/// Like [`discover`], over an explicit candidate list.
///
/// A format name that was already bound earlier in the list is skipped.
pub fn discover_candidates(
    candidates: &[Candidate],
    source: &dyn BackendSource,
    verbose: bool,
) -> Discovery {
    let mut discovery = Discovery::default();
    let mut bound = HashSet::new();

    for candidate in candidates {
        if bound.contains(candidate.format) {
            tracing::debug!(format = candidate.format, "format already bound, skipping");
            continue;
        }
        tracing::debug!(
            format = candidate.format,
            module = candidate.module,
            "binding codec backend"
        );
        match bind_guarded(candidate, source) {
            Ok(descriptor) => {
                bound.insert(candidate.format);
                discovery.formats.push(descriptor);
            }
            Err(error) => discovery.failures.push(BindFailure {
                format: candidate.format,
                module: candidate.module,
                error,
            }),
        }
    }

    if verbose {
        for failure in &discovery.failures {
            tracing::warn!(
                format = failure.format,
                module = failure.module,
                "{}",
                failure.error
            );
        }
    }
    tracing::debug!(
        bound = discovery.formats.len(),
        failed = discovery.failures.len(),
        "codec discovery finished"
    );
    discovery
}

/// Bind one candidate, turning a panic anywhere in load or bind into a
/// [`BindError::Panicked`].
fn bind_guarded(
    candidate: &Candidate,
    source: &dyn BackendSource,
) -> std::result::Result<FormatDescriptor, BindError> {
    match panic::catch_unwind(AssertUnwindSafe(|| candidate.bind(source))) {
        Ok(result) => result,
        Err(payload) => Err(BindError::Panicked {
            module: candidate.module.to_string(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// A backend source paired with its discovery result, computed once.
///
/// [`Registry::formats`] discovers on first use and returns the same
/// result afterwards, from any thread. [`Registry::discover`] always runs a
/// fresh pass.
#[derive(Debug)]
pub struct Registry<S> {
    source: S,
    cached: OnceLock<Discovery>,
}

impl<S: BackendSource> Registry<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cached: OnceLock::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn discover(&self, verbose: bool) -> Discovery {
        discover(&self.source, verbose)
    }

    pub fn formats(&self) -> &Discovery {
        self.cached.get_or_init(|| discover(&self.source, false))
    }
}
