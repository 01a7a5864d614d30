/*!

This is the long-form manual for `weighted_voting` and `wvtally`.

## Procedures

### Median

Used for votings about an amount of money. Every voter names the highest
amount they support. With a total weight `W` and a majority `p`, the number
of votes required is `floor(W * p)`. The ballots are sorted by decreasing
value and their weights accumulated: the result is the first value at which
the accumulated weight exceeds the votes required, or `0` when no value
reaches it.

### Schulze

Used for votings between options. Every voter gives a rank to every option,
lower ranks being preferred and equal ranks meaning indifference.

- `d[i][j]` is the total weight of the voters preferring `i` to `j`;
- `p[i][j]` is the strength of the strongest path from `i` to `j`, where
  only pairs with `d[i][j] > d[j][i]` are edges;
- the options are grouped by the number of options they beat in `p`, the
  options with the most wins first. Options of one group are tied and listed
  by their order in the voting.

The last option of a Schulze voting is the reference option (usually "No").
For every other option, the percentage is the fraction of the total weight
that ranked it strictly before the reference option.

## Input formats

`wvtally` reads three kinds of files.

### Voters

One voter per line, with their weight:

```text
* Anna: 4
* Bob: 3
```

The name is everything before the last colon. Names are at most 150
characters. A weight of `0` is accepted.

### Voting collection

```text
# General assembly: 04.05.2017
## Finances
### Budget
- 2000
## Elections
### Chair
* Anna
* Bob
* No
```

The title carries the date of the meeting (`DD.MM.YYYY`). Groups (`##`)
contain votings (`###`). A voting with a `- VALUE` line is a median voting
and the value is the maximum amount, written `1200`, `1200.5` or `1200,50`.
A voting with `* OPTION` lines is a Schulze voting. Voting names are unique
across the collection.

### Ballots

CSV or Excel (`.xlsx`) files, one ballot per row:

```text
voter,voting,entry 1,entry 2,entry 3
Anna,Budget,12.50
Anna,Chair,0,1,2
```

The first row is a header unless `firstVoteRowIndex` says otherwise. For a
median voting the single entry is an amount, which may not exceed the
maximum of the voting. For a Schulze voting there is one rank per option, in
the order of the options. Empty cells at the end of a row are ignored.

A voter votes at most once per voting. Voters that do not vote in a voting
are not counted in its total weight.

## Configuration

All the inputs may be given on the command line. A JSON configuration file
gathers them instead:

```text
{ "outputSettings": { "outputPath": "summary.json" },
  "votersFile": "voters.txt",
  "collectionFile": "collection.md",
  "ballotFileSources": [ { "provider": "csv", "filePath": "ballots.csv" } ],
  "rules": { "defaultPercentRequired": "0.5", "workers": "auto" } }
```

- `provider` is `csv` or `xlsx`. For Excel files, `excelWorksheetName`
  selects the worksheet (default: the first one).
- `firstVoteRowIndex` (string or number, optional, default `2`): the row of
  the first ballot, starting at 1.
- `workers` is `auto`, `sequential` or a number of threads. The results do
  not depend on it.

The command line overrides the configuration file.

## Output

The summary is a JSON document with the collection, the digests (SHA-256)
of the ballot files and one result per voting. With `--reference`, the
summary is compared with a previous summary and the differences are
printed.

 */
