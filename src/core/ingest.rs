//! Assembles trace records into an [`AmplitudeMatrix`] plus per-trace metadata.

use crate::core::matrix::{AmplitudeMatrix, TimeBase, TraceRecord};
use crate::error::{Error, Result};

/// Header columns kept alongside the grid, one entry per trace.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TraceMetadata {
    pub elevation: Vec<i32>,
    pub source_point_id: Vec<i32>,
    pub ensemble_number: Vec<i32>,
    pub sequence_number: Vec<i32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IngestedSection {
    pub matrix: AmplitudeMatrix,
    pub timebase: TimeBase,
    pub metadata: TraceMetadata,
    pub trace_count: usize,
    pub sample_count: usize,
    pub sample_interval_us: f64,
}

/// Validates and packs an ordered trace sequence.
///
/// Every trace must share the first trace's sample count and interval; the
/// header count must also match the number of samples actually carried.
pub fn ingest<I>(records: I) -> Result<IngestedSection>
where
    I: IntoIterator<Item = TraceRecord>,
{
    let mut records = records.into_iter();
    let first = records.next().ok_or(Error::EmptyDataset {
        traces: 0,
        samples: 0,
    })?;

    let sample_count = first.header.sample_count;
    let sample_interval_us = first.header.sample_interval_us;
    // Every later trace is compared against this value, so it must be usable.
    if !(sample_interval_us > 0.0 && sample_interval_us.is_finite()) {
        return Err(Error::DegenerateLayout {
            parameter: "sample_interval_us",
            value: sample_interval_us,
        });
    }

    let (lower, _) = records.size_hint();
    let mut data = Vec::with_capacity(sample_count * (lower + 1));
    let mut metadata = TraceMetadata::default();

    for (trace_index, record) in std::iter::once(first).chain(records).enumerate() {
        // A header that disagrees with its own payload counts as inconsistent too.
        let found_samples = if record.header.sample_count != sample_count {
            record.header.sample_count
        } else {
            record.samples.len()
        };
        if found_samples != sample_count || record.header.sample_interval_us != sample_interval_us {
            return Err(Error::InconsistentGeometry {
                trace_index,
                expected_samples: sample_count,
                found_samples,
                expected_interval_us: sample_interval_us,
                found_interval_us: record.header.sample_interval_us,
            });
        }

        metadata.elevation.push(record.header.elevation);
        metadata.source_point_id.push(record.header.source_point_id);
        metadata.ensemble_number.push(record.header.ensemble_number);
        metadata.sequence_number.push(record.header.sequence_number);
        data.extend_from_slice(&record.samples);
    }

    let trace_count = metadata.ensemble_number.len();
    if sample_count == 0 {
        return Err(Error::EmptyDataset {
            traces: trace_count,
            samples: 0,
        });
    }

    Ok(IngestedSection {
        matrix: AmplitudeMatrix::from_columns(sample_count, trace_count, data),
        timebase: TimeBase::new(sample_count, sample_interval_us),
        metadata,
        trace_count,
        sample_count,
        sample_interval_us,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matrix::TraceHeader;

    fn record(samples: Vec<f32>, dt_us: f64, ensemble: i32) -> TraceRecord {
        TraceRecord::new(
            TraceHeader {
                sample_count: samples.len(),
                sample_interval_us: dt_us,
                ensemble_number: ensemble,
                ..TraceHeader::default()
            },
            samples,
        )
    }

    #[test]
    fn columns_round_trip_trace_samples() {
        let traces = vec![
            record(vec![1.0, 5.0, 9.0], 1000.0, 10),
            record(vec![2.0, 6.0, 10.0], 1000.0, 11),
        ];
        let section = ingest(traces.clone()).unwrap();
        assert_eq!(section.matrix.shape(), (3, 2));
        for (j, trace) in traces.iter().enumerate() {
            assert_eq!(section.matrix.column(j).unwrap(), trace.samples.as_slice());
        }
        assert_eq!(section.metadata.ensemble_number, vec![10, 11]);
        assert_eq!(section.timebase.times_ms(), &[0.0, 1.0, 2.0]);
    }

    #[test]
    fn empty_sequence_is_rejected() {
        let err = ingest(Vec::new()).unwrap_err();
        assert!(matches!(err, Error::EmptyDataset { traces: 0, .. }));
    }

    #[test]
    fn zero_sample_traces_are_rejected() {
        let err = ingest(vec![record(vec![], 1000.0, 1)]).unwrap_err();
        assert!(matches!(
            err,
            Error::EmptyDataset {
                traces: 1,
                samples: 0
            }
        ));
    }

    #[test]
    fn mismatched_sample_count_reports_trace_index() {
        let traces = vec![
            record(vec![0.0; 4], 2000.0, 1),
            record(vec![0.0; 4], 2000.0, 2),
            record(vec![0.0; 5], 2000.0, 3),
        ];
        match ingest(traces).unwrap_err() {
            Error::InconsistentGeometry {
                trace_index,
                expected_samples,
                found_samples,
                ..
            } => {
                assert_eq!(trace_index, 2);
                assert_eq!(expected_samples, 4);
                assert_eq!(found_samples, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn mismatched_interval_is_rejected() {
        let traces = vec![record(vec![0.0; 4], 2000.0, 1), record(vec![0.0; 4], 4000.0, 2)];
        let err = ingest(traces).unwrap_err();
        assert!(matches!(
            err,
            Error::InconsistentGeometry { trace_index: 1, found_interval_us, .. }
                if found_interval_us == 4000.0
        ));
    }

    #[test]
    fn header_count_disagreeing_with_payload_is_rejected() {
        let mut bad = record(vec![0.0; 3], 1000.0, 1);
        bad.header.sample_count = 4;
        let err = ingest(vec![record(vec![0.0; 4], 1000.0, 0), bad]).unwrap_err();
        assert!(matches!(
            err,
            Error::InconsistentGeometry {
                trace_index: 1,
                found_samples: 3,
                ..
            }
        ));
    }

    #[test]
    fn unusable_first_interval_is_reported_as_such() {
        for dt in [f64::NAN, 0.0, -4000.0] {
            let err = ingest(vec![record(vec![1.0; 4], dt, 1), record(vec![1.0; 4], dt, 2)])
                .unwrap_err();
            assert!(
                matches!(
                    err,
                    Error::DegenerateLayout {
                        parameter: "sample_interval_us",
                        ..
                    }
                ),
                "{err}"
            );
        }
    }
}
