/*!
Reading of the voting collection document.

```text
# COLLECTION NAME: DD.MM.YYYY
## GROUP NAME
### VOTING NAME
- 1200.50
### OTHER VOTING
* Option A
* No
```

A voting with a `- VALUE` line is a median voting, the value being the
highest amount that may be voted for. A voting with `* OPTION` lines is a
Schulze voting. Empty lines are ignored everywhere.
*/

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::tally::io_common::{parse_amount, validate_name};
use crate::tally::*;

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct MedianVoting {
    pub name: String,
    /// In cents.
    pub max_value: i64,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SchulzeVoting {
    pub name: String,
    /// The last option is the reference option.
    pub options: Vec<String>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Voting {
    Median(MedianVoting),
    Schulze(SchulzeVoting),
}

impl Voting {
    pub fn name(&self) -> &str {
        match self {
            Voting::Median(v) => &v.name,
            Voting::Schulze(v) => &v.name,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VotingGroup {
    pub name: String,
    pub votings: Vec<Voting>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VotingCollection {
    pub name: String,
    pub date: NaiveDate,
    pub groups: Vec<VotingGroup>,
}

impl VotingCollection {
    /// All the votings with their group, in document order.
    pub fn votings(&self) -> impl Iterator<Item = (&VotingGroup, &Voting)> {
        self.groups
            .iter()
            .flat_map(|g| g.votings.iter().map(move |v| (g, v)))
    }
}

// What the parser expects on the next non-empty line.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum ParseState {
    // `# NAME: DATE`
    Start,
    // `## GROUP`
    TopLevel,
    // `### VOTING`
    Group,
    // `* OPTION` or `- VALUE`
    Voting,
    // `## GROUP` or `### VOTING`
    GroupOrVoting,
    // `* OPTION`, `## GROUP` or `### VOTING`
    SchulzeOptions,
}

enum Line<'a> {
    Title(&'a str),
    Group(&'a str),
    Voting(&'a str),
    Option(&'a str),
    Value(&'a str),
}

fn classify(line: &str) -> Option<Line> {
    // Longest prefixes first.
    if let Some(x) = line.strip_prefix("### ") {
        Some(Line::Voting(x))
    } else if let Some(x) = line.strip_prefix("## ") {
        Some(Line::Group(x))
    } else if let Some(x) = line.strip_prefix("# ") {
        Some(Line::Title(x))
    } else if let Some(x) = line.strip_prefix("* ") {
        Some(Line::Option(x))
    } else {
        line.strip_prefix("- ").map(Line::Value)
    }
}

struct CollectionParser<'a> {
    path: &'a str,
    state: ParseState,
    name: String,
    date: Option<NaiveDate>,
    groups: Vec<VotingGroup>,
    pending_voting: Option<String>,
    voting_names: HashSet<String>,
}

fn syntax_error<T>(path: &str, lineno: usize, message: impl Into<String>) -> TallyResult<T> {
    SyntaxSnafu {
        path,
        lineno,
        message: message.into(),
    }
    .fail()
}

impl<'a> CollectionParser<'a> {
    fn fail<T>(&self, lineno: usize, message: impl Into<String>) -> TallyResult<T> {
        syntax_error(self.path, lineno, message)
    }

    fn name(&self, lineno: usize, s: &str) -> TallyResult<String> {
        match validate_name(s) {
            Ok(n) => Ok(n),
            Err(msg) => self.fail(lineno, msg),
        }
    }

    fn start_group(&mut self, lineno: usize, s: &str) -> TallyResult<()> {
        let name = self.name(lineno, s)?;
        self.groups.push(VotingGroup {
            name,
            votings: Vec::new(),
        });
        self.state = ParseState::Group;
        Ok(())
    }

    fn start_voting(&mut self, lineno: usize, s: &str) -> TallyResult<()> {
        let name = self.name(lineno, s)?;
        if !self.voting_names.insert(name.clone()) {
            return self.fail(lineno, format!("duplicate voting {:?}", name));
        }
        self.pending_voting = Some(name);
        self.state = ParseState::Voting;
        Ok(())
    }

    fn push_voting(&mut self, lineno: usize, voting: Voting) -> TallyResult<()> {
        match self.groups.last_mut() {
            Some(g) => {
                g.votings.push(voting);
                Ok(())
            }
            None => self.fail(lineno, "voting outside of a group"),
        }
    }

    fn pending_name(&mut self, lineno: usize) -> TallyResult<String> {
        match self.pending_voting.take() {
            Some(n) => Ok(n),
            None => self.fail(lineno, "voting content without a voting name"),
        }
    }

    fn title(&mut self, lineno: usize, s: &str) -> TallyResult<()> {
        let (name_s, date_s) = match s.rsplit_once(':') {
            Some(x) => x,
            None => return self.fail(lineno, "the title must end with ': DD.MM.YYYY'"),
        };
        self.name = self.name(lineno, name_s)?;
        match NaiveDate::parse_from_str(date_s.trim(), "%d.%m.%Y") {
            Ok(d) => self.date = Some(d),
            Err(e) => return self.fail(lineno, format!("invalid date {:?}: {}", date_s.trim(), e)),
        }
        self.state = ParseState::TopLevel;
        Ok(())
    }

    fn line(&mut self, lineno: usize, line: &str) -> TallyResult<()> {
        let parsed = classify(line);
        match (self.state, parsed) {
            (ParseState::Start, Some(Line::Title(s))) => self.title(lineno, s),
            (ParseState::Start, _) => self.fail(lineno, "expected a title '# NAME: DD.MM.YYYY'"),
            (ParseState::TopLevel, Some(Line::Group(s))) => self.start_group(lineno, s),
            (ParseState::TopLevel, _) => self.fail(lineno, "expected a group '## NAME'"),
            (ParseState::Group, Some(Line::Voting(s))) => self.start_voting(lineno, s),
            (ParseState::Group, _) => self.fail(lineno, "expected a voting '### NAME'"),
            (ParseState::Voting, Some(Line::Option(s))) => {
                let option = self.name(lineno, s)?;
                let name = self.pending_name(lineno)?;
                self.push_voting(
                    lineno,
                    Voting::Schulze(SchulzeVoting {
                        name,
                        options: vec![option],
                    }),
                )?;
                self.state = ParseState::SchulzeOptions;
                Ok(())
            }
            (ParseState::Voting, Some(Line::Value(s))) => {
                let max_value = match parse_amount(s.trim()) {
                    Some(x) => x,
                    None => {
                        return self.fail(
                            lineno,
                            format!("not a valid amount {:?}, expected XXXX.XX", s.trim()),
                        )
                    }
                };
                let name = self.pending_name(lineno)?;
                self.push_voting(lineno, Voting::Median(MedianVoting { name, max_value }))?;
                self.state = ParseState::GroupOrVoting;
                Ok(())
            }
            (ParseState::Voting, _) => self.fail(
                lineno,
                "expected '* OPTION' for a Schulze voting or '- VALUE' for a median voting",
            ),
            (ParseState::SchulzeOptions, Some(Line::Option(s))) => {
                let option = self.name(lineno, s)?;
                let path = self.path;
                let options = match self.groups.last_mut().and_then(|g| g.votings.last_mut()) {
                    Some(Voting::Schulze(sv)) => &mut sv.options,
                    _ => return syntax_error(path, lineno, "option outside of a Schulze voting"),
                };
                if options.contains(&option) {
                    return syntax_error(path, lineno, format!("duplicate option {:?}", option));
                }
                options.push(option);
                Ok(())
            }
            (ParseState::SchulzeOptions, Some(Line::Value(_))) => {
                self.fail(lineno, "expected a Schulze option, found a median value")
            }
            (ParseState::SchulzeOptions | ParseState::GroupOrVoting, Some(Line::Voting(s))) => {
                self.start_voting(lineno, s)
            }
            (ParseState::SchulzeOptions | ParseState::GroupOrVoting, Some(Line::Group(s))) => {
                self.start_group(lineno, s)
            }
            (ParseState::SchulzeOptions, _) => {
                self.fail(lineno, "expected a Schulze option, a voting or a group")
            }
            (ParseState::GroupOrVoting, _) => self.fail(lineno, "expected a voting or a group"),
        }
    }

    fn finish(self, lineno: usize) -> TallyResult<VotingCollection> {
        match (self.state, self.date) {
            (ParseState::Voting, _) => self.fail(lineno, "voting without options or value"),
            (_, Some(date)) => Ok(VotingCollection {
                name: self.name,
                date,
                groups: self.groups,
            }),
            (_, None) => self.fail(lineno, "missing title"),
        }
    }
}

pub fn parse_collection(path: &str, content: &str) -> TallyResult<VotingCollection> {
    let mut parser = CollectionParser {
        path,
        state: ParseState::Start,
        name: String::new(),
        date: None,
        groups: Vec::new(),
        pending_voting: None,
        voting_names: HashSet::new(),
    };
    let mut last_lineno = 0;
    for (idx, raw_line) in content.lines().enumerate() {
        last_lineno = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        parser.line(last_lineno, line)?;
        debug!("parse_collection: line {}: state {:?}", last_lineno, parser.state);
    }
    parser.finish(last_lineno)
}

pub fn read_collection(path: &str) -> TallyResult<VotingCollection> {
    let content = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    parse_collection(path, &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection() {
        let content = "# Assembly: June: 01.06.2021

## Money
### Travel
- 120,5
### Books
- 300

## People
### Board
* Anna
*   Bob
* No
## Empty
";
        let c = parse_collection("c.md", content).unwrap();
        assert_eq!(c.name, "Assembly: June");
        assert_eq!(c.date, NaiveDate::from_ymd_opt(2021, 6, 1).unwrap());
        assert_eq!(c.groups.len(), 3);
        assert_eq!(
            c.groups[0].votings,
            vec![
                Voting::Median(MedianVoting {
                    name: "Travel".to_string(),
                    max_value: 12050
                }),
                Voting::Median(MedianVoting {
                    name: "Books".to_string(),
                    max_value: 30000
                }),
            ]
        );
        assert_eq!(
            c.groups[1].votings,
            vec![Voting::Schulze(SchulzeVoting {
                name: "Board".to_string(),
                options: vec!["Anna".to_string(), "Bob".to_string(), "No".to_string()]
            })]
        );
        assert!(c.groups[2].votings.is_empty());
        let names: Vec<&str> = c.votings().map(|(_, v)| v.name()).collect();
        assert_eq!(names, vec!["Travel", "Books", "Board"]);
    }

    fn error_line(content: &str) -> usize {
        match parse_collection("c.md", content) {
            Err(TallyError::Syntax { lineno, .. }) => lineno,
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn syntax_errors() {
        assert_eq!(error_line("## Group\n"), 1);
        assert_eq!(error_line("# Assembly: 31.02.2021\n"), 1);
        assert_eq!(error_line("# Assembly 01.06.2021\n"), 1);
        assert_eq!(error_line("# A: 01.06.2021\n### Voting\n"), 2);
        assert_eq!(error_line("# A: 01.06.2021\n## G\n### V\n- 12.345\n"), 4);
        assert_eq!(error_line("# A: 01.06.2021\n## G\n### V\n* a\n- 12\n"), 5);
        assert_eq!(error_line("# A: 01.06.2021\n## G\n### V\n- 12\n* a\n"), 5);
        assert_eq!(error_line("# A: 01.06.2021\n## G\n### V\n* a\n* a\n"), 5);
    }

    #[test]
    fn duplicate_voting_names() {
        let content = "# A: 01.06.2021\n## G\n### V\n- 1\n## H\n### V\n* a\n";
        assert_eq!(error_line(content), 6);
    }

    #[test]
    fn voting_without_content() {
        assert_eq!(error_line("# A: 01.06.2021\n## G\n### V\n\n"), 4);
    }
}
