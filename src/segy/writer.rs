use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{BINARY_HEADER_LEN, SampleFormat, SegyError, TEXT_HEADER_LEN, TRACE_HEADER_LEN};
use crate::core::matrix::TraceRecord;

const REVISION_1: u16 = 0x0100;

/// 40 ASCII cards of 80 columns, `C nn ` prefixed, from free text lines.
pub fn text_cards<S: AsRef<str>>(lines: &[S]) -> Vec<u8> {
    let mut out = Vec::with_capacity(TEXT_HEADER_LEN);
    for card in 0..40 {
        let body = lines.get(card).map(|s| s.as_ref()).unwrap_or("");
        let line = format!("C{:>2} {body}", card + 1);
        let mut bytes: Vec<u8> = line
            .bytes()
            .map(|b| if (0x20..0x7f).contains(&b) { b } else { b' ' })
            .take(80)
            .collect();
        bytes.resize(80, b' ');
        out.extend_from_slice(&bytes);
    }
    out
}

/// Writes a rev 1 file with IEEE float samples and an ASCII textual header.
/// Geometry (count, interval) comes from the first trace.
pub fn write_to<W: Write, S: AsRef<str>>(
    mut w: W,
    header_lines: &[S],
    traces: &[TraceRecord],
) -> Result<(), SegyError> {
    w.write_all(&text_cards(header_lines))?;

    let (ns, dt) = traces
        .first()
        .map(|t| (t.header.sample_count, t.header.sample_interval_us))
        .unwrap_or((0, 0.0));
    let mut bin = [0u8; BINARY_HEADER_LEN];
    BigEndian::write_u16(&mut bin[16..18], dt.round() as u16);
    BigEndian::write_u16(&mut bin[20..22], ns.min(u16::MAX as usize) as u16);
    BigEndian::write_i16(&mut bin[24..26], SampleFormat::IeeeFloat.code());
    BigEndian::write_u16(&mut bin[300..302], REVISION_1);
    w.write_all(&bin)?;

    for (trace_index, trace) in traces.iter().enumerate() {
        let samples = trace.samples.len();
        if samples > u16::MAX as usize {
            return Err(SegyError::TooManySamples {
                trace_index,
                samples,
            });
        }
        let h = &trace.header;
        let mut th = [0u8; TRACE_HEADER_LEN];
        BigEndian::write_i32(&mut th[0..4], h.sequence_number);
        BigEndian::write_i32(&mut th[16..20], h.source_point_id);
        BigEndian::write_i32(&mut th[20..24], h.ensemble_number);
        BigEndian::write_i32(&mut th[40..44], h.elevation);
        BigEndian::write_u16(&mut th[114..116], samples as u16);
        BigEndian::write_u16(&mut th[116..118], h.sample_interval_us.round() as u16);
        w.write_all(&th)?;
        for &s in &trace.samples {
            w.write_f32::<BigEndian>(s)?;
        }
    }
    w.flush()?;
    Ok(())
}

pub fn write_path<S: AsRef<str>>(
    path: &Path,
    header_lines: &[S],
    traces: &[TraceRecord],
) -> Result<(), SegyError> {
    let file = File::create(path)?;
    write_to(BufWriter::new(file), header_lines, traces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matrix::TraceHeader;
    use crate::segy::read_from;

    #[test]
    fn cards_are_fixed_width() {
        let cards = text_cards(&["SURVEY"]);
        assert_eq!(cards.len(), TEXT_HEADER_LEN);
        assert_eq!(&cards[..10], b"C 1 SURVEY");
        assert_eq!(&cards[80..84], b"C 2 ");
        assert_eq!(&cards[3120..3124], b"C40 ");
    }

    #[test]
    fn written_file_reads_back() {
        let traces: Vec<TraceRecord> = (0..3)
            .map(|j| {
                TraceRecord::new(
                    TraceHeader {
                        sample_count: 4,
                        sample_interval_us: 4000.0,
                        elevation: -12,
                        source_point_id: 7,
                        ensemble_number: 200 + j,
                        sequence_number: j + 1,
                    },
                    vec![j as f32, -1.5, 0.25, 8.0],
                )
            })
            .collect();
        let mut buf = Vec::new();
        write_to(&mut buf, &["LINE 42"], &traces).unwrap();
        assert_eq!(
            buf.len(),
            TEXT_HEADER_LEN + BINARY_HEADER_LEN + 3 * (TRACE_HEADER_LEN + 16)
        );

        let ds = read_from(buf.as_slice()).unwrap();
        assert_eq!(ds.traces, traces);
        assert_eq!(ds.binary_header.format, SampleFormat::IeeeFloat);
        assert_eq!(ds.header_lines()[0], "LINE 42");
    }
}
