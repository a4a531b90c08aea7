//! Spreadsheet export of the request list.
//!
//! Produces one `.xlsx` workbook with a single sheet: a header row followed
//! by one row per record, in the order the records are given.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use rust_xlsxwriter::{Format, Workbook};
use tracing::info;

use crate::error::{Error, Result};
use crate::record::FeedbackRecord;
use crate::view::format_timestamp;

/// Name of the only worksheet.
pub const SHEET_NAME: &str = "需求汇总";

/// Column headers, in output order.
pub const HEADERS: [&str; 11] = [
    "序号",
    "部门名称",
    "联系人",
    "联系电话",
    "联系邮箱",
    "优先级",
    "期望完成时间",
    "需要解决的问题",
    "程序要求",
    "补充说明",
    "提交时间",
];

/// Column widths in characters, matching [`HEADERS`].
pub const COLUMN_WIDTHS: [f64; 11] = [6.0, 15.0, 12.0, 15.0, 25.0, 8.0, 15.0, 50.0, 50.0, 30.0, 22.0];

/// Cell text for one record, matching [`HEADERS`]. `index` is zero-based.
#[must_use]
pub fn row_cells(index: usize, record: &FeedbackRecord) -> [String; 11] {
    [
        (index + 1).to_string(),
        record.department.clone(),
        record.contact_name.clone(),
        record.contact_phone.clone().unwrap_or_default(),
        record.contact_email.clone().unwrap_or_default(),
        record.priority.label().to_string(),
        record
            .expected_completion
            .map(|d| d.to_string())
            .unwrap_or_default(),
        record.problem_description.clone(),
        record.requirements.clone(),
        record.additional_notes.clone().unwrap_or_default(),
        format_timestamp(&record.created_at),
    ]
}

/// File name for an export made at `now`, e.g. `需求汇总_20250105_1403.xlsx`.
#[must_use]
pub fn file_name(now: &DateTime<Local>) -> String {
    format!("{SHEET_NAME}_{}.xlsx", now.format("%Y%m%d_%H%M"))
}

/// Write `records` to a workbook at `path`.
///
/// # Errors
///
/// Returns [`Error::NothingToExport`] for an empty list, or an error if the
/// workbook cannot be written.
pub fn write_workbook(records: &[FeedbackRecord], path: &Path) -> Result<()> {
    if records.is_empty() {
        return Err(Error::NothingToExport);
    }

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        for (col, (header, width)) in HEADERS.iter().zip(COLUMN_WIDTHS).enumerate() {
            let col = col_num(col)?;
            sheet.set_column_width(col, width)?;
            sheet.write_string_with_format(0, col, *header, &header_format)?;
        }

        for (index, record) in records.iter().enumerate() {
            let row = u32::try_from(index + 1)
                .map_err(|_| Error::internal("too many records for one sheet"))?;
            for (col, cell) in row_cells(index, record).iter().enumerate() {
                let col = col_num(col)?;
                if col == 0 {
                    sheet.write_number(row, col, f64::from(row))?;
                } else {
                    sheet.write_string(row, col, cell)?;
                }
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// Export `records` into `dir` under a timestamped file name.
///
/// Returns the path of the written file.
///
/// # Errors
///
/// Returns [`Error::NothingToExport`] for an empty list, or an error if the
/// directory or workbook cannot be written.
pub fn export_to_dir(
    records: &[FeedbackRecord],
    dir: &Path,
    now: &DateTime<Local>,
) -> Result<PathBuf> {
    if records.is_empty() {
        return Err(Error::NothingToExport);
    }
    if !dir.as_os_str().is_empty() && !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let path = dir.join(file_name(now));
    write_workbook(records, &path)?;
    info!("Exported {} requests to {}", records.len(), path.display());
    Ok(path)
}

fn col_num(col: usize) -> Result<u16> {
    u16::try_from(col).map_err(|_| Error::internal("column index out of range"))
}
