//! Rendering decoded payloads for the terminal.

use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;
use vidlink_core::string_from_bytes;

/// How decoded bytes are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Lowercase hex, 32 bytes per line.
    #[default]
    Hex,
    /// One char per byte (Latin-1).
    Text,
    /// A JSON report with length, hex and text.
    Json,
    /// The bytes themselves.
    Raw,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    source: &'a str,
    length: usize,
    hex: String,
    text: String,
}

/// Strip the zero padding an encoder leaves after the payload.
pub fn trim_padding(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &bytes[..end]
}

pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Write `bytes` decoded from `source` in `format`.
pub fn write_payload<W: Write>(
    out: &mut W,
    source: &str,
    bytes: &[u8],
    format: OutputFormat,
) -> std::io::Result<()> {
    match format {
        OutputFormat::Hex => {
            for line in bytes.chunks(32) {
                writeln!(out, "{}", to_hex(line))?;
            }
        }
        OutputFormat::Text => writeln!(out, "{}", string_from_bytes(bytes))?,
        OutputFormat::Json => {
            let report = Report {
                source,
                length: bytes.len(),
                hex: to_hex(bytes),
                text: string_from_bytes(bytes),
            };
            serde_json::to_writer_pretty(&mut *out, &report).map_err(std::io::Error::other)?;
            writeln!(out)?;
        }
        OutputFormat::Raw => out.write_all(bytes)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_strips_trailing_zeros_only() {
        assert_eq!(trim_padding(&[0, 1, 0, 2, 0, 0]), &[0, 1, 0, 2]);
        assert_eq!(trim_padding(&[0, 0]), &[] as &[u8]);
    }

    #[test]
    fn hex_lines_are_32_bytes() {
        let mut out = Vec::new();
        write_payload(&mut out, "-", &[0xAB; 40], OutputFormat::Hex).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 64);
        assert_eq!(lines[1], "ab".repeat(8));
    }

    #[test]
    fn json_report_fields() {
        let mut out = Vec::new();
        write_payload(&mut out, "file:///f.png", b"hi", OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["length"], 2);
        assert_eq!(value["hex"], "6869");
        assert_eq!(value["text"], "hi");
        assert_eq!(value["source"], "file:///f.png");
    }
}
