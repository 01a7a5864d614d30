use std::io::Cursor;

use calamine::{DataType, Reader, Xlsx};

use crate::tally::io_csv::parsed_ballot;
use crate::tally::*;

/// Reads the rows `VOTER, VOTING, ENTRY...` of an Excel worksheet, from the
/// already loaded content of the workbook.
///
/// Without a worksheet name, the first worksheet is used.
pub fn read_xlsx_ballots(
    path: &str,
    content: &[u8],
    cfs: &FileSource,
) -> TallyResult<Vec<ParsedBallot>> {
    let wrange = get_range(path, content, cfs)?;
    let first_row = cfs.first_vote_row_index()?;

    let mut res: Vec<ParsedBallot> = Vec::new();
    // Rows are counted from the start of the sheet, not from the first used cell.
    let row_offset = wrange.start().map_or(0, |(r, _)| r as usize);
    for (idx, row) in wrange.rows().enumerate() {
        let lineno = idx + row_offset + 1;
        if lineno < first_row {
            continue;
        }
        debug!("read_xlsx_ballots: lineno: {:?} row: {:?}", lineno, row);
        let mut cells: Vec<String> = Vec::new();
        for cell in row {
            cells.push(read_cell(path, lineno, cell)?);
        }
        if let Some(pb) = parsed_ballot(path, lineno, cells)? {
            res.push(pb);
        }
    }
    Ok(res)
}

fn read_cell(path: &str, lineno: usize, cell: &DataType) -> TallyResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Int(i) => Ok(i.to_string()),
        // Amounts typed in a spreadsheet come as floats. The shortest exact
        // text is kept, so that amounts with too many decimals are rejected.
        DataType::Float(f) if f.fract() == 0.0 => Ok(format!("{}", *f as i64)),
        DataType::Float(f) => Ok(f.to_string()),
        DataType::Empty => Ok("".to_string()),
        _ => ExcelWrongCellTypeSnafu {
            path,
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

fn get_range(
    path: &str,
    content: &[u8],
    cfs: &FileSource,
) -> TallyResult<calamine::Range<DataType>> {
    let worksheet_name_o = cfs.excel_worksheet_name.clone();
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(content)).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        workbook
            .worksheet_range(&worksheet_name)
            .context(MissingWorksheetSnafu {
                name: worksheet_name.clone(),
                path,
            })?
            .context(OpeningExcelSnafu { path })
    } else {
        workbook
            .worksheet_range_at(0)
            .context(MissingWorksheetSnafu {
                name: "(first worksheet)",
                path,
            })?
            .context(OpeningExcelSnafu { path })
    }
}
