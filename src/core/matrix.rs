//! Trace records, the dense amplitude grid and its time axis.

/// Header fields the plotter consumes from each trace.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TraceHeader {
    pub sample_count: usize,
    pub sample_interval_us: f64,
    pub elevation: i32,
    pub source_point_id: i32,
    pub ensemble_number: i32,
    pub sequence_number: i32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TraceRecord {
    pub header: TraceHeader,
    pub samples: Vec<f32>,
}

impl TraceRecord {
    pub fn new(header: TraceHeader, samples: Vec<f32>) -> Self {
        Self { header, samples }
    }
}

/// Dense `(sample_count, trace_count)` grid.
///
/// Storage is trace-major: column `j` is the contiguous slice of trace `j`,
/// which is the access pattern of every consumer (wiggles, spectra).
#[derive(Clone, Debug, PartialEq)]
pub struct AmplitudeMatrix {
    n_samples: usize,
    n_traces: usize,
    data: Vec<f32>,
}

impl AmplitudeMatrix {
    pub(crate) fn from_columns(n_samples: usize, n_traces: usize, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), n_samples * n_traces);
        Self {
            n_samples,
            n_traces,
            data,
        }
    }

    /// `(rows, cols)` = `(sample_count, trace_count)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_samples, self.n_traces)
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn n_traces(&self) -> usize {
        self.n_traces
    }

    pub fn column(&self, trace: usize) -> Option<&[f32]> {
        if trace >= self.n_traces {
            return None;
        }
        let start = trace * self.n_samples;
        Some(&self.data[start..start + self.n_samples])
    }

    pub fn columns(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact(0) panics; an empty grid has no columns to yield anyway.
        self.data.chunks_exact(self.n_samples.max(1))
    }

    pub fn get(&self, sample: usize, trace: usize) -> Option<f32> {
        if sample >= self.n_samples {
            return None;
        }
        self.column(trace).map(|col| col[sample])
    }

    /// All samples, trace after trace.
    pub fn values(&self) -> &[f32] {
        &self.data
    }
}

/// Two-way time of every sample in milliseconds: `t[i] = i * dt_us / 1000`.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeBase {
    times_ms: Vec<f64>,
}

impl TimeBase {
    pub fn new(sample_count: usize, sample_interval_us: f64) -> Self {
        let times_ms = (0..sample_count)
            .map(|i| i as f64 * sample_interval_us / 1000.0)
            .collect();
        Self { times_ms }
    }

    pub fn times_ms(&self) -> &[f64] {
        &self.times_ms
    }

    pub fn len(&self) -> usize {
        self.times_ms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times_ms.is_empty()
    }

    pub fn start_ms(&self) -> f64 {
        self.times_ms.first().copied().unwrap_or(0.0)
    }

    pub fn end_ms(&self) -> f64 {
        self.times_ms.last().copied().unwrap_or(0.0)
    }

    /// Span from first to last sample; this is what sets the panel height.
    pub fn duration_ms(&self) -> f64 {
        self.end_ms() - self.start_ms()
    }
}
