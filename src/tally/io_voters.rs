// Reading of the voters file: one `* NAME: WEIGHT` per line.

use std::collections::HashSet;

use crate::tally::io_common::validate_name;
use crate::tally::*;

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Voter {
    pub name: String,
    pub weight: u64,
}

fn syntax_error<T>(path: &str, lineno: usize, message: String) -> TallyResult<T> {
    SyntaxSnafu {
        path,
        lineno,
        message,
    }
    .fail()
}

pub fn parse_voters(path: &str, content: &str) -> TallyResult<Vec<Voter>> {
    let mut res: Vec<Voter> = Vec::new();
    let mut names: HashSet<String> = HashSet::new();
    for (idx, raw_line) in content.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let entry = match line.strip_prefix('*') {
            Some(x) => x,
            None => return syntax_error(path, lineno, "expected '* NAME: WEIGHT'".to_string()),
        };
        let (name_s, weight_s) = match entry.rsplit_once(':') {
            Some(x) => x,
            None => return syntax_error(path, lineno, "missing ':' before the weight".to_string()),
        };
        let name = match validate_name(name_s) {
            Ok(n) => n,
            Err(msg) => return syntax_error(path, lineno, msg),
        };
        let weight = match weight_s.trim().parse::<u64>() {
            Ok(w) => w,
            Err(_) => {
                return syntax_error(path, lineno, format!("invalid weight {:?}", weight_s.trim()))
            }
        };
        if !names.insert(name.clone()) {
            return syntax_error(path, lineno, format!("duplicate voter {:?}", name));
        }
        debug!("parse_voters: {}:{}: {} with weight {}", path, lineno, name, weight);
        res.push(Voter { name, weight });
    }
    Ok(res)
}

pub fn read_voters(path: &str) -> TallyResult<Vec<Voter>> {
    let content = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let voters = parse_voters(path, &content)?;
    info!("Read {} voters from {:?}", voters.len(), path);
    Ok(voters)
}
