use byteorder::{BigEndian, ByteOrder};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use tracing::debug;

use super::ebcdic;
use super::{
    BINARY_HEADER_LEN, SampleFormat, SegyError, TEXT_HEADER_LEN, TRACE_HEADER_LEN,
};
use crate::core::matrix::{TraceHeader, TraceRecord};

/// Fields of the 400-byte binary file header the plotter relies on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BinaryHeader {
    pub sample_interval_us: u16,
    pub samples_per_trace: u16,
    pub format: SampleFormat,
    pub revision: u16,
    pub extended_text_headers: i16,
}

impl BinaryHeader {
    fn parse(raw: &[u8]) -> Result<Self, SegyError> {
        let revision = BigEndian::read_u16(&raw[300..302]);
        // rev0 files leave the tail of the binary header unassigned.
        let extended_text_headers = if revision == 0 {
            0
        } else {
            BigEndian::read_i16(&raw[304..306])
        };
        if extended_text_headers < 0 {
            return Err(SegyError::VariableExtendedHeaders);
        }
        Ok(Self {
            sample_interval_us: BigEndian::read_u16(&raw[16..18]),
            samples_per_trace: BigEndian::read_u16(&raw[20..22]),
            format: SampleFormat::from_code(BigEndian::read_i16(&raw[24..26]))?,
            revision,
            extended_text_headers,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SegyDataset {
    /// Decoded 3200-byte textual header.
    pub textual_header: String,
    pub binary_header: BinaryHeader,
    pub traces: Vec<TraceRecord>,
}

impl SegyDataset {
    /// The textual header as 40 cards of 80 columns, each without its
    /// `C nn ` prefix.
    pub fn header_lines(&self) -> Vec<String> {
        header_lines(&self.textual_header)
    }
}

pub fn header_lines(textual_header: &str) -> Vec<String> {
    let chars: Vec<char> = textual_header.chars().collect();
    chars
        .chunks(80)
        .map(|card| card.iter().skip(4).collect::<String>().trim_end().to_string())
        .collect()
}

/// IBM System/360 single precision to IEEE.
pub fn ibm_to_f32(bits: u32) -> f32 {
    let mantissa = (bits & 0x00ff_ffff) as f64 / 16_777_216.0;
    if mantissa == 0.0 {
        return 0.0;
    }
    let exponent = ((bits >> 24) & 0x7f) as i32 - 64;
    let value = mantissa * 16f64.powi(exponent);
    if bits >> 31 == 1 {
        -value as f32
    } else {
        value as f32
    }
}

fn decode_samples(raw: &[u8], format: SampleFormat) -> Vec<f32> {
    let width = format.bytes_per_sample();
    raw.chunks_exact(width)
        .map(|b| match format {
            SampleFormat::IbmFloat => ibm_to_f32(BigEndian::read_u32(b)),
            SampleFormat::Int32 => BigEndian::read_i32(b) as f32,
            SampleFormat::Int16 => BigEndian::read_i16(b) as f32,
            SampleFormat::IeeeFloat => BigEndian::read_f32(b),
            SampleFormat::Int8 => b[0] as i8 as f32,
        })
        .collect()
}

fn parse_trace_header(raw: &[u8], binary: &BinaryHeader) -> TraceHeader {
    let count = BigEndian::read_u16(&raw[114..116]);
    let interval = BigEndian::read_u16(&raw[116..118]);
    TraceHeader {
        sample_count: if count == 0 {
            binary.samples_per_trace
        } else {
            count
        } as usize,
        sample_interval_us: if interval == 0 {
            binary.sample_interval_us
        } else {
            interval
        } as f64,
        sequence_number: BigEndian::read_i32(&raw[0..4]),
        source_point_id: BigEndian::read_i32(&raw[16..20]),
        ensemble_number: BigEndian::read_i32(&raw[20..24]),
        elevation: BigEndian::read_i32(&raw[40..44]),
    }
}

/// Reads until `buf` is full or the stream ends; returns bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

pub fn read_from<R: Read>(mut reader: R) -> Result<SegyDataset, SegyError> {
    let mut text = vec![0u8; TEXT_HEADER_LEN];
    if read_full(&mut reader, &mut text)? < TEXT_HEADER_LEN {
        return Err(SegyError::MissingHeader("textual"));
    }
    let textual_header = if ebcdic::looks_like_ebcdic(&text) {
        ebcdic::to_ascii(&text)
    } else {
        text.iter()
            .map(|&b| if (0x20..0x7f).contains(&b) { b as char } else { ' ' })
            .collect()
    };

    let mut bin = vec![0u8; BINARY_HEADER_LEN];
    if read_full(&mut reader, &mut bin)? < BINARY_HEADER_LEN {
        return Err(SegyError::MissingHeader("binary"));
    }
    let binary_header = BinaryHeader::parse(&bin)?;
    debug!(
        format = ?binary_header.format,
        dt_us = binary_header.sample_interval_us,
        ns = binary_header.samples_per_trace,
        revision = binary_header.revision,
        "SEG-Y binary header"
    );

    for _ in 0..binary_header.extended_text_headers {
        if read_full(&mut reader, &mut text)? < TEXT_HEADER_LEN {
            return Err(SegyError::MissingHeader("extended textual"));
        }
    }

    let width = binary_header.format.bytes_per_sample();
    let mut traces = Vec::new();
    let mut th = vec![0u8; TRACE_HEADER_LEN];
    let mut payload = Vec::new();
    loop {
        let trace_index = traces.len();
        let got = read_full(&mut reader, &mut th)?;
        if got == 0 {
            break;
        }
        if got < TRACE_HEADER_LEN {
            return Err(SegyError::Truncated {
                trace_index,
                expected: TRACE_HEADER_LEN,
                found: got,
            });
        }
        let header = parse_trace_header(&th, &binary_header);
        let expected = header.sample_count * width;
        payload.resize(expected, 0);
        let got = read_full(&mut reader, &mut payload)?;
        if got < expected {
            return Err(SegyError::Truncated {
                trace_index,
                expected,
                found: got,
            });
        }
        traces.push(TraceRecord::new(
            header,
            decode_samples(&payload, binary_header.format),
        ));
    }
    debug!(traces = traces.len(), "SEG-Y traces read");

    Ok(SegyDataset {
        textual_header,
        binary_header,
        traces,
    })
}

pub fn read_path(path: &Path) -> Result<SegyDataset, SegyError> {
    let file = File::open(path)?;
    read_from(BufReader::new(file))
}
