use std::io::Cursor;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use rust_xlsxwriter::{Format, Workbook};
use strum::{AsRefStr, EnumString};
use uuid::Uuid;

use crate::error::ExportError;
use crate::models::{geography, FileAttachment};
use crate::services::generator::CityDisclaimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
    Txt,
    Xlsx,
}

impl ExportFormat {
    pub fn parse(raw: &str) -> Result<Self, ExportError> {
        ExportFormat::from_str(raw.trim()).map_err(|_| ExportError::UnsupportedFormat(raw.to_string()))
    }
}

/// Plain-text file body: one block per city, display name on the first line,
/// blocks separated by an empty line.
pub fn format_batch_to_file(results: &[CityDisclaimer]) -> String {
    results
        .iter()
        .map(|(city, text)| format!("{}\n{}\n", geography::normalize_city_display(city), text))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn text_attachment(results: &[CityDisclaimer]) -> FileAttachment {
    attachment("txt", "text/plain; charset=utf-8", format_batch_to_file(results).into_bytes())
}

pub fn render(results: &[CityDisclaimer], format: ExportFormat) -> Result<FileAttachment, ExportError> {
    match format {
        ExportFormat::Txt => Ok(text_attachment(results)),
        ExportFormat::Xlsx => {
            let bytes = spreadsheet(results)?;
            Ok(attachment(
                "xlsx",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                bytes,
            ))
        }
    }
}

fn spreadsheet(results: &[CityDisclaimer]) -> Result<Vec<u8>, ExportError> {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    let bold = Format::new().set_bold();
    let wrap = Format::new().set_text_wrap();

    ws.write_string_with_format(0, 0, "Город", &bold)?;
    ws.write_string_with_format(0, 1, "Дисклеймер", &bold)?;
    ws.set_column_width(0, 24.0)?;
    ws.set_column_width(1, 120.0)?;

    for (r, (city, text)) in results.iter().enumerate() {
        let row = (r as u32) + 1;
        ws.write_string(row, 0, &geography::normalize_city_display(city))?;
        ws.write_string_with_format(row, 1, text, &wrap)?;
    }

    let mut buf: Vec<u8> = Vec::new();
    wb.save_to_writer(&mut Cursor::new(&mut buf))?;
    Ok(buf)
}

fn attachment(extension: &str, mime: &str, bytes: Vec<u8>) -> FileAttachment {
    FileAttachment {
        id: Uuid::new_v4().to_string(),
        filename: format!(
            "disclaimers-{}.{}",
            chrono::Utc::now().format("%Y%m%d-%H%M%S"),
            extension
        ),
        mime: mime.to_string(),
        size: bytes.len(),
        content_base64: B64.encode(&bytes),
    }
}
