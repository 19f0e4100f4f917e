//! Top-level decode loop.
//!
//! The driver decodes one root field at a time and prints it before moving
//! on, so output for a damaged input grows up to the first bad field and
//! then stops. Stopping is not an error: the reason ends up in the
//! [`DecodeReport`] and the call still returns `Ok`.

use crate::error::{DecodeError, Result};
use crate::field::{DecoderConfig, Field, FieldDecoder};
use crate::printer::{FieldVisitor, LineWriter, TreePrinter};
use crate::wire::Cursor;
use std::io::Write;
use tracing::{debug, info};

/// Outcome of a decode run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// Top-level fields decoded and printed
    pub fields: usize,
    /// Input bytes covered by those fields
    pub bytes_consumed: usize,
    /// Why decoding stopped before the end of the input
    pub stopped: Option<DecodeError>,
}

impl DecodeReport {
    /// True if the whole input decoded
    pub fn is_complete(&self) -> bool {
        self.stopped.is_none()
    }

    /// Turns an early stop into an error
    pub fn into_result(self) -> Result<Self> {
        match self.stopped {
            Some(e) => Err(e.into()),
            None => Ok(self),
        }
    }
}

/// Schema-less protobuf decoder
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    fields: FieldDecoder,
}

impl Decoder {
    /// Creates a new decoder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new decoder with custom configuration
    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            fields: FieldDecoder::with_config(config),
        }
    }

    /// Returns the active configuration
    pub fn config(&self) -> &DecoderConfig {
        self.fields.config()
    }

    /// Decode `data` and report every leaf to `visitor`.
    ///
    /// Each top-level field goes to the visitor as soon as it is decoded.
    /// Only a failing visitor makes this return an error.
    pub fn decode<V: FieldVisitor>(&self, data: &[u8], visitor: &mut V) -> Result<DecodeReport> {
        let mut printer = TreePrinter::new(self.config().root_label.clone());
        let mut cursor = Cursor::new(data);
        let mut report = DecodeReport::default();

        debug!("Starting decode of {} bytes", data.len());

        while !cursor.is_exhausted() {
            match self.fields.decode_field(&mut cursor, 0) {
                Ok(field) => {
                    printer.print(&field, visitor)?;
                    report.fields += 1;
                    report.bytes_consumed = cursor.position();
                }
                Err(e) => {
                    info!(
                        "Stopped after {} of {} bytes: {}",
                        report.bytes_consumed,
                        data.len(),
                        e
                    );
                    report.stopped = Some(e);
                    break;
                }
            }
        }

        debug!("Decode complete: {} top-level fields", report.fields);
        Ok(report)
    }

    /// Decode `data` and write one line per leaf to `out`
    pub fn decode_to<W: Write>(&self, data: &[u8], out: W) -> Result<DecodeReport> {
        let mut writer = LineWriter::new(out);
        let report = self.decode(data, &mut writer)?;
        writer.into_inner().flush()?;
        Ok(report)
    }

    /// Decode `data` into a field tree without printing.
    ///
    /// Returns the top-level fields decoded before the first error, and that
    /// error if there was one.
    pub fn decode_fields<'a>(&self, data: &'a [u8]) -> (Vec<Field<'a>>, Option<DecodeError>) {
        let mut cursor = Cursor::new(data);
        let mut fields = Vec::new();

        while !cursor.is_exhausted() {
            match self.fields.decode_field(&mut cursor, 0) {
                Ok(field) => fields.push(field),
                Err(e) => return (fields, Some(e)),
            }
        }

        (fields, None)
    }
}

/// Decode `data` with the default configuration, writing lines to `out`
pub fn decode<W: Write>(data: &[u8], out: W) -> Result<DecodeReport> {
    Decoder::new().decode_to(data, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::StatsVisitor;

    fn run(data: &[u8]) -> (String, DecodeReport) {
        let mut out = Vec::new();
        let report = decode(data, &mut out).unwrap();
        (String::from_utf8(out).unwrap(), report)
    }

    #[test]
    fn test_single_varint() {
        let (out, report) = run(&[0x08, 0x96, 0x01]);
        assert_eq!(out, "pb_1 : 150\n");
        assert_eq!(report.fields, 1);
        assert_eq!(report.bytes_consumed, 3);
        assert!(report.is_complete());
    }

    #[test]
    fn test_nested_message() {
        let (out, _) = run(&[0x12, 0x02, 0x08, 0x01]);
        assert_eq!(out, "pb_2_1 : 1\n");
    }

    #[test]
    fn test_string() {
        let (out, _) = run(&[0x0A, 0x03, 0x61, 0x62, 0x63]);
        assert_eq!(out, "pb_1 : abc\n");
    }

    #[test]
    fn test_empty_input() {
        let (out, report) = run(&[]);
        assert!(out.is_empty());
        assert_eq!(report, DecodeReport::default());
    }

    #[test]
    fn test_stops_at_zero_field_number() {
        let (out, report) = run(&[0x08, 0x01, 0x00, 0x10, 0x02]);
        assert_eq!(out, "pb_1 : 1\n");
        assert_eq!(report.fields, 1);
        assert_eq!(report.bytes_consumed, 2);
        assert!(matches!(
            report.stopped,
            Some(DecodeError::InvalidFieldNumber { number: 0, offset: 2, .. })
        ));
    }

    #[test]
    fn test_stops_above_ceiling() {
        // field 513 at the top level
        let (out, report) = run(&[0x08, 0x05, 0x88, 0x20, 0x01]);
        assert_eq!(out, "pb_1 : 5\n");
        assert!(matches!(
            report.stopped,
            Some(DecodeError::InvalidFieldNumber { number: 513, .. })
        ));
    }

    #[test]
    fn test_truncated_field_not_emitted() {
        let (out, report) = run(&[0x08, 0x01, 0x0A, 0x05, b'a', b'b']);
        assert_eq!(out, "pb_1 : 1\n");
        assert!(matches!(
            report.stopped,
            Some(DecodeError::LengthExceedsBuffer { length: 5, .. })
        ));

        let (out, report) = run(&[0x09, 0x01, 0x02]);
        assert!(out.is_empty());
        assert!(matches!(
            report.stopped,
            Some(DecodeError::TruncatedFixedWidth { width: 8, .. })
        ));
    }

    #[test]
    fn test_into_result() {
        let report = DecodeReport {
            stopped: Some(DecodeError::truncated_varint(4)),
            ..Default::default()
        };
        assert!(report.into_result().unwrap_err().is_recoverable());
        assert!(DecodeReport::default().into_result().is_ok());
    }

    #[test]
    fn test_decode_fields() {
        let data = [0x08, 0x01, 0x12, 0x02, 0x08, 0x02, 0x0B];
        let (fields, stopped) = Decoder::new().decode_fields(&data);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].children()[0].as_number(), Some(2));
        assert!(matches!(
            stopped,
            Some(DecodeError::UnsupportedWireType { offset: 6, wire_type: 3 })
        ));
    }

    #[test]
    fn test_custom_visitor_and_config() {
        let data = [0x0A, 0x04, 0x0A, 0x02, 0x08, 0x01];
        let decoder = Decoder::with_config(DecoderConfig::new().max_depth(1).root_label("m"));

        let mut out = Vec::new();
        decoder.decode_to(&data, &mut out).unwrap();
        assert_eq!(out, b"m_1_1 : \x08\x01\n");

        let mut stats = StatsVisitor::default();
        decoder.decode(&data, &mut stats).unwrap();
        assert_eq!(stats.message_count, 1);
        assert_eq!(stats.rejected_count, 1);
    }

    #[test]
    fn test_sink_failure_is_returned() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let err = decode(&[0x08, 0x01], Broken).unwrap_err();
        assert!(!err.is_recoverable());
    }
}
