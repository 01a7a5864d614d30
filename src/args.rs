use clap::Parser;

/// Tallies the votings of a committee meeting, weighting every ballot by the
/// weight of its voter.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file naming the voters file, the voting collection and the ballot files.
    /// Relative paths in this file are resolved against its directory.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The voters and their weights, one '* NAME: WEIGHT' per line.
    /// Overrides the voters file of the configuration.
    #[clap(long, value_parser)]
    pub voters: Option<String>,

    /// (file path) The voting collection document, listing the groups, the votings and their options.
    /// Overrides the collection file of the configuration.
    #[clap(long, value_parser)]
    pub collection: Option<String>,

    /// (file path) A ballot file. Setting this option replaces the ballot files of the configuration.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the ballot file: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: first worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (default 0.5) The fraction of the total weight that an outcome must exceed.
    #[clap(short, long, value_parser)]
    pub percent_required: Option<f64>,

    /// (number, 'auto' or 'sequential') The number of threads used to evaluate a Schulze voting.
    #[clap(short, long, value_parser)]
    pub workers: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, wvtally will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
