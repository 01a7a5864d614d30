// Primitives for reading CSV ballot files.

use crate::tally::*;

/// Reads the rows `VOTER, VOTING, ENTRY...` of a CSV file whose content has
/// already been loaded.
///
/// Line numbers are physical lines of the file: a quoted cell spanning several
/// lines does not shift the numbers of the rows after it.
pub fn read_csv_ballots(
    path: &str,
    content: &[u8],
    cfs: &FileSource,
) -> TallyResult<Vec<ParsedBallot>> {
    let mut res: Vec<ParsedBallot> = Vec::new();
    let (records, first_row) = get_records(path, content, cfs)?;

    for (idx, line_r) in records.enumerate() {
        let record_no = idx + first_row;
        let line = line_r.context(CsvLineParseSnafu {
            path,
            lineno: record_no,
        })?;
        let lineno = line
            .position()
            .map_or(record_no, |p| p.line() as usize);
        debug!("read_csv_ballots: lineno: {:?} row: {:?}", lineno, line);
        let cells: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        if let Some(pb) = parsed_ballot(path, lineno, cells)? {
            res.push(pb);
        }
    }
    Ok(res)
}

/// Turns the cells of one row into a ballot. Rows without any content are
/// skipped.
pub fn parsed_ballot(
    path: &str,
    lineno: usize,
    cells: Vec<String>,
) -> TallyResult<Option<ParsedBallot>> {
    if cells.iter().all(|c| c.trim().is_empty()) {
        return Ok(None);
    }
    let mut iter = cells.into_iter();
    let voter = iter.next().unwrap_or_default().trim().to_string();
    let voting = iter.next().unwrap_or_default().trim().to_string();
    if voter.is_empty() || voting.is_empty() {
        return SyntaxSnafu {
            path,
            lineno,
            message: "expected 'VOTER, VOTING, ENTRY...'".to_string(),
        }
        .fail();
    }
    Ok(Some(ParsedBallot {
        path: path.to_string(),
        lineno,
        voter,
        voting,
        entries: iter.collect(),
    }))
}

// Records are counted from 1, and the records before firstVoteRowIndex are
// skipped.
fn get_records<'a>(
    path: &str,
    content: &'a [u8],
    cfs: &FileSource,
) -> TallyResult<(csv::StringRecordsIntoIter<&'a [u8]>, usize)> {
    let first_row = cfs.first_vote_row_index()?;
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content);
    let mut records = rdr.into_records();
    for lineno in 1..first_row {
        if let Some(Err(e)) = records.next() {
            return Err(e).context(CsvLineParseSnafu { path, lineno });
        }
    }
    Ok((records, first_row))
}
