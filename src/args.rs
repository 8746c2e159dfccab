use clap::{Parser, Subcommand};

/// Scores answers to an electoral questionnaire against the positions of the parties, and
/// studies how stable these scores are.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file. The options given on the command line
    /// take precedence over the ones in this file. Relative paths in the file are relative to
    /// the directory of the file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, default data/database.json) The questionnaire with the party opinions, in
    /// JSON format.
    #[clap(short, long, value_parser)]
    pub database: Option<String>,

    /// (repeatable, default base) The questionnaire levels to retain.
    #[clap(long = "level", value_parser)]
    pub levels: Vec<String>,

    /// (french or flemish, default french) The language of the questionnaire. It selects the
    /// roster of parties.
    #[clap(long, value_parser)]
    pub language: Option<String>,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Computes the ranked match percentage of every party for a set of answers.
    Score {
        /// One character per question: a (agree), d (disagree), u (undecided), or the upper
        /// case letter to boost the answer. Example: "adaDddAaddadDaDddaaDaddaaaaddAaddaa"
        #[clap(value_parser)]
        answers: String,

        /// Report the exact percentages instead of rounding them.
        #[clap(long, takes_value = false)]
        unrounded: bool,

        /// (file path, 'stdout' or empty) If specified, the summary of the results will be
        /// written in JSON format to the given location.
        #[clap(short, long, value_parser)]
        out: Option<String>,

        /// (file path) A reference file containing the expected summary in JSON format. If
        /// provided, the computed summary must match the reference.
        #[clap(short, long, value_parser)]
        reference: Option<String>,
    },

    /// Exports the party opinions to CSV.
    Export {
        /// (opinion, weight or description, repeatable) The variables to export. The wide
        /// format accepts a single variable.
        #[clap(long = "variable", value_parser, required = true)]
        variables: Vec<String>,

        /// Use the long (tidy) format: one row per question, variable and party.
        #[clap(long, takes_value = false)]
        long: bool,

        /// Add the statement of every question.
        #[clap(long, takes_value = false)]
        statement: bool,

        /// (file path, 'stdout' or empty) The destination of the table.
        #[clap(short, long, value_parser)]
        out: Option<String>,
    },

    /// Answers like each party, changes a few answers at random and records the winner.
    Stability {
        #[clap(flatten)]
        simulation: SimulationArgs,

        /// (file path, 'stdout' or empty) The destination of the table.
        #[clap(short, long, value_parser)]
        out: Option<String>,
    },

    /// Counts the winners of random agree/disagree answers.
    RandomWinners {
        #[clap(flatten)]
        simulation: SimulationArgs,

        /// (file path, 'stdout' or empty) The destination of the table.
        #[clap(short, long, value_parser)]
        out: Option<String>,
    },

    /// Writes the opinion and weight matrices and both simulation tables to a directory.
    Tables {
        #[clap(flatten)]
        simulation: SimulationArgs,

        /// (directory, default data) Where the tables are written.
        #[clap(long, value_parser)]
        out_dir: Option<String>,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct SimulationArgs {
    /// (default 543210) Seed of the random generator.
    #[clap(long, value_parser)]
    pub seed: Option<u64>,

    /// (default 10000) Number of trials per party (stability) or per fold (random winners).
    #[clap(long, value_parser)]
    pub trials: Option<usize>,

    /// (default 2) Number of answers changed at random in every stability trial.
    #[clap(long, value_parser)]
    pub changes: Option<usize>,

    /// (default 10) Number of folds of random winners.
    #[clap(long, value_parser)]
    pub folds: Option<usize>,
}
