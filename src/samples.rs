//! Sample buffers exchanged with codec backends.

/// Waveform sample data as produced by a codec's read capability.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    Int(Vec<i32>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Samples::Int(v) => v.len(),
            Samples::Float(v) => v.len(),
            Samples::Double(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Widen every sample to `f64`.
    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            Samples::Int(v) => v.iter().map(|&x| f64::from(x)).collect(),
            Samples::Float(v) => v.iter().map(|&x| f64::from(x)).collect(),
            Samples::Double(v) => v.clone(),
        }
    }
}

impl Default for Samples {
    fn default() -> Self {
        Samples::Int(Vec::new())
    }
}
