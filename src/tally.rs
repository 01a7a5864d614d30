use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use weighted_voting::*;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::tally::config_reader::*;
use crate::tally::io_collection::{Voting, VotingCollection};
use crate::tally::io_common::{format_amount, parse_amount, simplify_file_name};
use crate::tally::io_voters::Voter;

pub mod config_reader;
pub mod io_collection;
pub mod io_common;
pub mod io_csv;
pub mod io_voters;
pub mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum TallyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Missing worksheet {name} in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("{path}: line {lineno}: cannot read cell {content}"))]
    ExcelWrongCellType {
        path: String,
        lineno: usize,
        content: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Could not read a number from {content}"))]
    ParsingJsonNumber { content: String },
    #[snafu(display("{path}: line {lineno}: could not read the line"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("{path}: line {lineno}: {message}"))]
    Syntax {
        path: String,
        lineno: usize,
        message: String,
    },
    #[snafu(display("{path}: line {lineno}: invalid ballot: {message}"))]
    InvalidBallot {
        path: String,
        lineno: usize,
        message: String,
    },
    #[snafu(display("Voting {voting:?} could not be evaluated"))]
    Evaluation {
        source: VotingErrors,
        voting: String,
    },
    #[snafu(display("Missing parent directory for {path}"))]
    MissingParentDir { path: String },
    #[snafu(display("Missing input: no {what} given"))]
    MissingInput { what: String },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type TallyResult<T> = Result<T, TallyError>;

/// A ballot, as read from a ballot file.
/// This is before checking the voter, the voting and the entries.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedBallot {
    pub path: String,
    pub lineno: usize,
    pub voter: String,
    pub voting: String,
    pub entries: Vec<String>,
}

/// Everything needed for one run, after merging the configuration file and
/// the command line.
#[derive(PartialEq, Debug, Clone)]
pub struct TallySettings {
    pub voters_path: String,
    pub collection_path: String,
    pub sources: Vec<FileSource>,
    pub percent_required: f64,
    pub parallelism: Parallelism,
    pub out: Option<String>,
    pub reference: Option<String>,
}

// The ballots that passed validation, by voting name.
#[derive(PartialEq, Debug, Clone, Default)]
struct BallotBox {
    median: HashMap<String, Vec<MedianVote>>,
    schulze: HashMap<String, Vec<SchulzeVote>>,
}

fn resolve_path(root: &Path, file_path: &str) -> String {
    let p: PathBuf = [root, Path::new(file_path)].iter().collect();
    p.as_path().display().to_string()
}

pub fn settings_from_args(args: &Args) -> TallyResult<TallySettings> {
    let mut voters_path: Option<String> = None;
    let mut collection_path: Option<String> = None;
    let mut sources: Vec<FileSource> = Vec::new();
    let mut percent_required: f64 = DEFAULT_PERCENT_REQUIRED;
    let mut parallelism = Parallelism::Available;
    let mut out: Option<String> = None;

    if let Some(config_path) = args.config.clone() {
        let config = read_config(&config_path)?;
        info!("config: {:?}", config);
        let root = Path::new(config_path.as_str())
            .parent()
            .context(MissingParentDirSnafu {
                path: config_path.clone(),
            })?;
        voters_path = config.voters_file.map(|p| resolve_path(root, &p));
        collection_path = config.collection_file.map(|p| resolve_path(root, &p));
        for cfs in config.ballot_file_sources {
            let mut cfs2 = cfs.clone();
            cfs2.file_path = resolve_path(root, &cfs.file_path);
            sources.push(cfs2);
        }
        if let Some(rules) = config.rules {
            percent_required = rules.percent_required()?;
            parallelism = rules.parallelism()?;
        }
        out = config.output_settings.and_then(|os| os.output_path);
        if let Some(o) = out.clone() {
            if o != "stdout" {
                out = Some(resolve_path(root, &o));
            }
        }
    }

    // The command line overrides the configuration file.
    if let Some(p) = args.voters.clone() {
        voters_path = Some(p);
    }
    if let Some(p) = args.collection.clone() {
        collection_path = Some(p);
    }
    if let Some(p) = args.input.clone() {
        let mut cfs = FileSource::new(
            args.input_type.clone().unwrap_or_else(|| "csv".to_string()),
            p,
        );
        cfs.excel_worksheet_name = args.excel_worksheet_name.clone();
        sources = vec![cfs];
    }
    if let Some(pr) = args.percent_required {
        percent_required = check_percent_required(pr)?;
    }
    if let Some(w) = args.workers.clone() {
        parallelism = parse_parallelism(&JSValue::String(w))?;
    }
    if args.out.is_some() {
        out = args.out.clone();
    }

    Ok(TallySettings {
        voters_path: voters_path.context(MissingInputSnafu { what: "voters file" })?,
        collection_path: collection_path.context(MissingInputSnafu {
            what: "voting collection",
        })?,
        sources,
        percent_required,
        parallelism,
        out,
        reference: args.reference.clone(),
    })
}

// The content is read once by the caller, so the digest covers exactly the
// bytes that were parsed.
fn read_ballot_data(cfs: &FileSource, content: &[u8]) -> TallyResult<Vec<ParsedBallot>> {
    info!("Attempting to read ballot file {:?}", cfs.file_path);
    match cfs.provider.as_str() {
        "csv" => io_csv::read_csv_ballots(&cfs.file_path, content, cfs),
        "xlsx" => io_xlsx::read_xlsx_ballots(&cfs.file_path, content, cfs),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

fn invalid_ballot<T>(pb: &ParsedBallot, message: String) -> TallyResult<T> {
    InvalidBallotSnafu {
        path: pb.path.clone(),
        lineno: pb.lineno,
        message,
    }
    .fail()
}

// Entries after the last non-empty one are ignored.
fn trimmed_entries(entries: &[String]) -> Vec<&str> {
    let mut res: Vec<&str> = entries.iter().map(|e| e.trim()).collect();
    while res.last() == Some(&"") {
        res.pop();
    }
    res
}

fn validate_ballots(
    parsed_ballots: &[ParsedBallot],
    voters: &[Voter],
    collection: &VotingCollection,
) -> TallyResult<BallotBox> {
    let weights: HashMap<&str, u64> = voters
        .iter()
        .map(|v| (v.name.as_str(), v.weight))
        .collect();
    let votings: HashMap<&str, &Voting> = collection
        .votings()
        .map(|(_, v)| (v.name(), v))
        .collect();

    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut res = BallotBox::default();
    for pb in parsed_ballots.iter() {
        let weight = match weights.get(pb.voter.as_str()) {
            Some(w) => *w,
            None => return invalid_ballot(pb, format!("unknown voter {:?}", pb.voter)),
        };
        let voting = match votings.get(pb.voting.as_str()) {
            Some(v) => *v,
            None => return invalid_ballot(pb, format!("unknown voting {:?}", pb.voting)),
        };
        if !seen.insert((pb.voter.as_str(), pb.voting.as_str())) {
            return invalid_ballot(
                pb,
                format!("{:?} already voted in {:?}", pb.voter, pb.voting),
            );
        }

        let entries = trimmed_entries(&pb.entries);
        debug!("Entries for ballot {}:{}: {:?}", pb.path, pb.lineno, entries);
        match voting {
            Voting::Median(mv) => {
                let value = match entries.as_slice() {
                    [s] => match parse_amount(s) {
                        Some(x) => x,
                        None => return invalid_ballot(pb, format!("not a valid amount: {:?}", s)),
                    },
                    _ => {
                        return invalid_ballot(
                            pb,
                            format!("expected exactly one amount, got {:?}", entries),
                        )
                    }
                };
                if value > mv.max_value {
                    return invalid_ballot(
                        pb,
                        format!(
                            "{} exceeds the maximum value {}",
                            format_amount(value),
                            format_amount(mv.max_value)
                        ),
                    );
                }
                res.median
                    .entry(mv.name.clone())
                    .or_default()
                    .push(MedianVote::new(weight, value));
            }
            Voting::Schulze(sv) => {
                let mut ranking: Vec<i64> = Vec::new();
                for s in entries.iter() {
                    match s.parse::<i64>() {
                        Ok(r) => ranking.push(r),
                        Err(_) => return invalid_ballot(pb, format!("not a valid rank: {:?}", s)),
                    }
                }
                if ranking.len() != sv.options.len() {
                    return invalid_ballot(
                        pb,
                        format!(
                            "expected {} ranks, got {}",
                            sv.options.len(),
                            ranking.len()
                        ),
                    );
                }
                res.schulze
                    .entry(sv.name.clone())
                    .or_default()
                    .push(SchulzeVote::new(weight, ranking));
            }
        }
    }
    Ok(res)
}

fn median_result_js(group: &str, name: &str, max_value: i64, res: &MedianResult) -> JSValue {
    json!({
        "group": group,
        "voting": name,
        "procedure": "median",
        "votesRequired": res.votes_required.to_string(),
        "value": format_amount(res.value),
        "maxValue": format_amount(max_value),
    })
}

fn schulze_result_js(group: &str, name: &str, options: &[String], res: &SchulzeResult) -> JSValue {
    let ranking: Vec<Vec<String>> = res
        .ranked
        .iter()
        .map(|g| g.iter().map(|idx| options[*idx].clone()).collect())
        .collect();
    let mut percentages: JSMap<String, JSValue> = JSMap::new();
    for (option, pct) in options.iter().zip(res.percentages.iter()) {
        percentages.insert(option.clone(), json!(pct));
    }
    json!({
        "group": group,
        "voting": name,
        "procedure": "schulze",
        "votesRequired": res.votes_required.to_string(),
        "options": options,
        "d": res.d.to_rows(),
        "p": res.p.to_rows(),
        "ranking": ranking,
        "percentages": percentages,
    })
}

fn evaluate_collection(
    collection: &VotingCollection,
    ballots: &BallotBox,
    settings: &TallySettings,
) -> TallyResult<Vec<JSValue>> {
    let rules = EvaluationRules {
        parallelism: settings.parallelism,
        ..EvaluationRules::DEFAULT_RULES
    };
    let mut results: Vec<JSValue> = Vec::new();
    for (group, voting) in collection.votings() {
        let percent_required = settings.percent_required;
        match voting {
            Voting::Median(mv) => {
                let votes = ballots.median.get(&mv.name).cloned().unwrap_or_default();
                let res = evaluate_median(&votes, percent_required);
                info!(
                    "{} / {}: {} (more than {} votes required)",
                    group.name,
                    mv.name,
                    format_amount(res.value),
                    res.votes_required
                );
                results.push(median_result_js(&group.name, &mv.name, mv.max_value, &res));
            }
            Voting::Schulze(sv) => {
                let votes = ballots.schulze.get(&sv.name).cloned().unwrap_or_default();
                let res = evaluate_schulze_with_rules(
                    &votes,
                    sv.options.len(),
                    percent_required,
                    &rules,
                )
                .context(EvaluationSnafu {
                    voting: sv.name.clone(),
                })?;
                info!("{} / {}:", group.name, sv.name);
                for (rank, tier) in res.ranked.iter().enumerate() {
                    let names: Vec<&str> = tier.iter().map(|i| sv.options[*i].as_str()).collect();
                    info!("      {}. {}", rank + 1, names.join(", "));
                }
                results.push(schulze_result_js(&group.name, &sv.name, &sv.options, &res));
            }
        }
    }
    Ok(results)
}

/// Reads all the inputs, evaluates every voting and returns the summary.
pub fn run_tally(settings: &TallySettings) -> TallyResult<JSValue> {
    let voters = io_voters::read_voters(&settings.voters_path)?;
    let collection = io_collection::read_collection(&settings.collection_path)?;
    info!(
        "Collection {:?}: {} groups, {} voters",
        collection.name,
        collection.groups.len(),
        voters.len()
    );

    if settings.sources.is_empty() {
        warn!("No ballot file given, every voting is evaluated without ballots");
    }
    let mut data: Vec<ParsedBallot> = Vec::new();
    let mut inputs: Vec<JSValue> = Vec::new();
    for cfs in settings.sources.iter() {
        let path = cfs.file_path.as_str();
        let content = fs::read(path).context(OpeningFileSnafu { path })?;
        let mut file_data = read_ballot_data(cfs, &content)?;
        data.append(&mut file_data);
        inputs.push(json!({
            "file": simplify_file_name(path),
            "sha256": sha256::digest(content),
        }));
    }
    info!("Read {} ballots", data.len());

    let ballots = validate_ballots(&data, &voters, &collection)?;
    let results = evaluate_collection(&collection, &ballots, settings)?;

    let total_weight: u64 = voters.iter().map(|v| v.weight).sum();
    Ok(json!({
        "config": {
            "collection": collection.name,
            "date": collection.date.format("%Y-%m-%d").to_string(),
            "voters": voters.len(),
            "totalWeight": total_weight.to_string(),
            "inputs": inputs,
        },
        "results": results,
    }))
}

/// Runs the tally and writes the summary. If a reference summary is given,
/// the run fails when the summaries differ.
pub fn run_tally_from_args(args: &Args) -> TallyResult<()> {
    let settings = settings_from_args(args)?;
    debug!("settings: {:?}", settings);
    let summary = run_tally(&settings)?;
    let pretty_js_stats = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;

    match settings.out.as_deref() {
        None | Some("stdout") => println!("{}", pretty_js_stats),
        Some(path) => {
            fs::write(path, &pretty_js_stats).context(WritingFileSnafu { path })?;
            info!("Summary written to {:?}", path);
        }
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = settings.reference {
        let summary_ref = read_summary(&summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            return ReferenceMismatchSnafu {}.fail();
        }
        info!("Summary matches the reference {:?}", summary_p);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const VOTERS: &str = "* Anna: 4\n* Bob: 3\n\n* Clara: 2\n* Dora: 2\n";

    const COLLECTION: &str = "# General assembly: 04.05.2017
## Finances
### Budget
- 2000
## Elections
### Chair
* Anna
* Bob
* No
";

    const BALLOTS: &str = "voter,voting,entry 1,entry 2,entry 3
Anna,Budget,2,,
Bob,Budget,10.00,,
Clara,Budget,\"7,00\",,
Dora,Budget,5,,
Anna,Chair,0,1,2
Bob,Chair,1,0,2
Clara,Chair,1,1,0
";

    // The directory is removed when the returned TempDir is dropped.
    fn write_inputs(ballots: &str) -> (TempDir, TallySettings) {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, content: &str| {
            let p = dir.path().join(name);
            fs::write(&p, content).unwrap();
            p.display().to_string()
        };
        let settings = TallySettings {
            voters_path: write("voters.txt", VOTERS),
            collection_path: write("collection.md", COLLECTION),
            sources: vec![FileSource::new("csv".to_string(), write("ballots.csv", ballots))],
            percent_required: 0.5,
            parallelism: Parallelism::MaxWorkers(2),
            out: None,
            reference: None,
        };
        (dir, settings)
    }

    #[test]
    fn end_to_end_summary() {
        let (_dir, settings) = write_inputs(BALLOTS);
        let summary = run_tally(&settings).unwrap();

        assert_eq!(summary["config"]["collection"], json!("General assembly"));
        assert_eq!(summary["config"]["date"], json!("2017-05-04"));
        assert_eq!(summary["config"]["totalWeight"], json!("11"));
        assert_eq!(summary["config"]["inputs"][0]["file"], json!("ballots.csv"));
        assert_eq!(
            summary["config"]["inputs"][0]["sha256"],
            json!(sha256::digest(BALLOTS))
        );

        let budget = &summary["results"][0];
        assert_eq!(budget["procedure"], json!("median"));
        assert_eq!(budget["votesRequired"], json!("5"));
        assert_eq!(budget["value"], json!("5.00"));
        assert_eq!(budget["maxValue"], json!("2000.00"));

        let chair = &summary["results"][1];
        assert_eq!(chair["procedure"], json!("schulze"));
        assert_eq!(chair["votesRequired"], json!("4"));
        assert_eq!(chair["d"], json!([[0, 4, 7], [3, 0, 7], [2, 2, 0]]));
        assert_eq!(chair["ranking"], json!([["Anna"], ["Bob"], ["No"]]));
        assert_eq!(chair["percentages"]["Anna"], json!(7.0 / 9.0));
    }

    #[test]
    fn unknown_voter_is_rejected() {
        let (_dir, settings) = write_inputs("voter,voting,entry\nEve,Budget,3\n");
        match run_tally(&settings) {
            Err(TallyError::InvalidBallot { lineno, message, .. }) => {
                assert_eq!(lineno, 2);
                assert!(message.contains("Eve"));
            }
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn double_vote_is_rejected() {
        let (_dir, settings) = write_inputs("voter,voting,entry\nAnna,Budget,3\nAnna,Budget,4\n");
        assert!(matches!(
            run_tally(&settings),
            Err(TallyError::InvalidBallot { lineno: 3, .. })
        ));
    }

    #[test]
    fn value_above_maximum_is_rejected() {
        let (_dir, settings) = write_inputs("voter,voting,entry\nAnna,Budget,2000.01\n");
        assert!(matches!(
            run_tally(&settings),
            Err(TallyError::InvalidBallot { lineno: 2, .. })
        ));
    }

    #[test]
    fn short_ranking_is_rejected() {
        let (_dir, settings) = write_inputs("voter,voting,a,b,c\nBob,Chair,0,1,\n");
        assert!(matches!(
            run_tally(&settings),
            Err(TallyError::InvalidBallot { lineno: 2, .. })
        ));
    }

    #[test]
    fn percentages_follow_option_order() {
        let options: Vec<String> = vec!["Zoe".into(), "Adam".into(), "Maya".into(), "No".into()];
        let votes = vec![
            SchulzeVote::new(2, vec![0, 1, 2, 3]),
            SchulzeVote::new(1, vec![2, 1, 0, 3]),
        ];
        let res = evaluate_schulze(&votes, options.len(), 0.5).unwrap();
        let js = schulze_result_js("Elections", "Chair", &options, &res);
        let keys: Vec<&str> = js["percentages"]
            .as_object()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();
        assert_eq!(keys, vec!["Zoe", "Adam", "Maya"]);
        let pretty = serde_json::to_string_pretty(&js["percentages"]).unwrap();
        assert!(pretty.find("Zoe").unwrap() < pretty.find("Adam").unwrap());
    }

    #[test]
    fn trailing_entries_are_ignored() {
        let entries: Vec<String> = vec!["1".into(), " 2 ".into(), "".into(), " ".into()];
        assert_eq!(trimmed_entries(&entries), vec!["1", "2"]);
    }
}
