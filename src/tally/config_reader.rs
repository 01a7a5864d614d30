use crate::tally::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

pub const DEFAULT_PERCENT_REQUIRED: f64 = 0.5;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "firstVoteRowIndex")]
    _first_vote_row_index: Option<JSValue>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl FileSource {
    pub fn new(provider: String, file_path: String) -> FileSource {
        FileSource {
            provider,
            file_path,
            _first_vote_row_index: None,
            excel_worksheet_name: None,
        }
    }

    /// The 1-based index of the first row holding a ballot. The default skips
    /// a single header row.
    pub fn first_vote_row_index(&self) -> TallyResult<usize> {
        match self._first_vote_row_index {
            None | Some(JSValue::Null) => Ok(2),
            _ => {
                let x = read_js_int(&self._first_vote_row_index)?;
                if x == 0 {
                    whatever!("firstVoteRowIndex starts at 1, got 0");
                }
                Ok(x)
            }
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TallyRules {
    #[serde(rename = "defaultPercentRequired")]
    _default_percent_required: Option<JSValue>,
    #[serde(rename = "workers")]
    _workers: Option<JSValue>,
}

impl TallyRules {
    pub fn percent_required(&self) -> TallyResult<f64> {
        let x = match &self._default_percent_required {
            None | Some(JSValue::Null) => DEFAULT_PERCENT_REQUIRED,
            Some(JSValue::Number(n)) => n.as_f64().context(ParsingJsonNumberSnafu {
                content: n.to_string(),
            })?,
            Some(JSValue::String(s)) => s.trim().parse::<f64>().ok().context(
                ParsingJsonNumberSnafu {
                    content: s.clone(),
                },
            )?,
            Some(x) => {
                return ParsingJsonNumberSnafu {
                    content: x.to_string(),
                }
                .fail()
            }
        };
        check_percent_required(x)
    }

    pub fn parallelism(&self) -> TallyResult<Parallelism> {
        match &self._workers {
            None | Some(JSValue::Null) => Ok(Parallelism::Available),
            Some(x) => parse_parallelism(x),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TallyConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
    #[serde(rename = "votersFile")]
    pub voters_file: Option<String>,
    #[serde(rename = "collectionFile")]
    pub collection_file: Option<String>,
    #[serde(rename = "ballotFileSources", default)]
    pub ballot_file_sources: Vec<FileSource>,
    pub rules: Option<TallyRules>,
}

pub fn check_percent_required(x: f64) -> TallyResult<f64> {
    if x > 0.0 && x < 1.0 {
        Ok(x)
    } else {
        whatever!("The percent required must be strictly between 0 and 1, got {}", x)
    }
}

/// Accepts "auto", "sequential" or a positive number of workers.
pub fn parse_parallelism(x: &JSValue) -> TallyResult<Parallelism> {
    match x {
        JSValue::String(s) if s == "auto" => Ok(Parallelism::Available),
        JSValue::String(s) if s == "sequential" => Ok(Parallelism::Sequential),
        _ => match read_js_int(&Some(x.clone()))? {
            0 => whatever!("The number of workers must be positive"),
            1 => Ok(Parallelism::Sequential),
            n => match u32::try_from(n) {
                Ok(k) => Ok(Parallelism::MaxWorkers(k)),
                Err(_) => whatever!("Too many workers: {}", n),
            },
        },
    }
}

pub fn read_config(path: &str) -> TallyResult<TallyConfig> {
    let config_str = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    serde_json::from_str(&config_str).context(ParsingJsonSnafu {})
}

pub fn read_summary(path: &str) -> TallyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_summary: {} results", js["results"].as_array().map_or(0, |a| a.len()));
    Ok(js)
}

pub fn read_js_int(x: &Option<JSValue>) -> TallyResult<usize> {
    match x {
        Some(JSValue::Number(n)) => n.as_u64().map(|x| x as usize).context(ParsingJsonNumberSnafu {
            content: n.to_string(),
        }),
        Some(JSValue::String(s)) => s.trim().parse::<usize>().ok().context(ParsingJsonNumberSnafu {
            content: s.clone(),
        }),
        _ => ParsingJsonNumberSnafu {
            content: format!("{:?}", x),
        }
        .fail(),
    }
}
