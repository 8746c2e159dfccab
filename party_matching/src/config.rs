// ********* Input data structures ***********

use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;

use snafu::Snafu;

/// The position of a party (or of a respondent) on a question, regardless of any
/// emphasis put on it.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Opinion {
    Agree,
    Disagree,
    Undecided,
}

impl Opinion {
    pub const ALL: [Opinion; 3] = [Opinion::Agree, Opinion::Disagree, Opinion::Undecided];

    /// Parses the opinion label found in the datasets (`agree`, `disagree`, `undecided`).
    /// The comparison is case-insensitive.
    pub fn parse_label(label: &str) -> Option<Opinion> {
        match label.trim().to_lowercase().as_str() {
            "agree" => Some(Opinion::Agree),
            "disagree" => Some(Opinion::Disagree),
            "undecided" => Some(Opinion::Undecided),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Opinion::Agree => "agree",
            Opinion::Disagree => "disagree",
            Opinion::Undecided => "undecided",
        }
    }
}

impl Display for Opinion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Emphasis put by a respondent on one of their answers.
/// Parties never boost their opinions.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Boost {
    Plain,
    Boosted,
}

/// One answer of a respondent.
///
/// The textual form uses one character per answer:
/// `a` agree, `d` disagree, `u` undecided, and the upper case letter for the
/// boosted version of the same answer.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct Answer {
    pub opinion: Opinion,
    pub boost: Boost,
}

impl Answer {
    pub const AGREE: Answer = Answer::plain(Opinion::Agree);
    pub const DISAGREE: Answer = Answer::plain(Opinion::Disagree);
    pub const UNDECIDED: Answer = Answer::plain(Opinion::Undecided);

    pub const fn plain(opinion: Opinion) -> Answer {
        Answer {
            opinion,
            boost: Boost::Plain,
        }
    }

    pub const fn boosted(opinion: Opinion) -> Answer {
        Answer {
            opinion,
            boost: Boost::Boosted,
        }
    }

    pub fn is_boosted(&self) -> bool {
        self.boost == Boost::Boosted
    }

    pub fn from_symbol(symbol: char) -> Option<Answer> {
        match symbol {
            'a' => Some(Answer::plain(Opinion::Agree)),
            'A' => Some(Answer::boosted(Opinion::Agree)),
            'd' => Some(Answer::plain(Opinion::Disagree)),
            'D' => Some(Answer::boosted(Opinion::Disagree)),
            'u' => Some(Answer::plain(Opinion::Undecided)),
            'U' => Some(Answer::boosted(Opinion::Undecided)),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        let c = match self.opinion {
            Opinion::Agree => 'a',
            Opinion::Disagree => 'd',
            Opinion::Undecided => 'u',
        };
        match self.boost {
            Boost::Plain => c,
            Boost::Boosted => c.to_ascii_uppercase(),
        }
    }

    /// Parses a full answer string such as `"adaDddAaddu"`.
    pub fn parse_symbols(symbols: &str) -> MatchingResult<Vec<Answer>> {
        symbols
            .chars()
            .map(|c| Answer::from_symbol(c).ok_or(MatchingError::InvalidSymbol { symbol: c }))
            .collect()
    }
}

impl Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The position of one party on one question.
#[derive(PartialEq, Debug, Clone)]
pub struct PartyOpinion {
    pub party: String,
    pub opinion: Opinion,
    /// Importance of this question for the party. Matching answers add it to the score.
    pub weight: f64,
    pub description: Option<String>,
}

/// A question of the questionnaire, with the recorded opinion of every party.
#[derive(PartialEq, Debug, Clone)]
pub struct Question {
    pub id: String,
    pub short: String,
    pub statement: String,
    pub levels: Vec<String>,
    pub party_opinions: Vec<PartyOpinion>,
}

impl Question {
    pub fn opinion_of(&self, party: &str) -> Option<&PartyOpinion> {
        self.party_opinions.iter().find(|po| po.party == party)
    }
}

// ******** Output data structures *********

/// Intermediate counts for one party, before the final percentage is computed.
#[derive(PartialEq, Debug, Clone)]
pub struct PartyTally {
    pub party: String,
    /// Questions for which the respondent and the party share the same opinion.
    pub matches: usize,
    /// Among the matches, the ones that the respondent boosted.
    pub boosted_matches: usize,
    /// Sum of the party weights over the matches.
    pub weighted_sum: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct PartyScore {
    pub party: String,
    pub value: f64,
    pub tally: PartyTally,
}

/// The scores of all the parties of the roster, either in roster order or ranked.
#[derive(PartialEq, Debug, Clone)]
pub struct MatchResults {
    pub scores: Vec<PartyScore>,
    /// Number of boosted answers in the scored vector.
    pub total_boosted: usize,
    pub rounded: bool,
    pub ranked: bool,
}

impl MatchResults {
    /// The first entry. For ranked results, this is the best matching party.
    pub fn top(&self) -> Option<&PartyScore> {
        self.scores.first()
    }

    pub fn get(&self, party: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|ps| ps.party == party)
            .map(|ps| ps.value)
    }

    pub fn pairs(&self) -> Vec<(String, f64)> {
        self.scores
            .iter()
            .map(|ps| (ps.party.clone(), ps.value))
            .collect()
    }
}

// ********* Errors **********

#[derive(Debug, Snafu, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum MatchingError {
    #[snafu(display("Expected {expected} answers (one per question), got {actual}"))]
    WrongLength { expected: usize, actual: usize },

    #[snafu(display("Unrecognized answer symbol {symbol:?}, expected one of a A d D u U"))]
    InvalidSymbol { symbol: char },

    /// An out-of-range position, for `set_one` as well as for `random_perturb`.
    #[snafu(display("Question index {index} out of bounds ({num_questions} questions)"))]
    IndexOutOfBounds { index: usize, num_questions: usize },

    #[snafu(display("The answers must be set first"))]
    AnswersNotSet {},

    #[snafu(display("Unrecognized party name {party:?}"))]
    UnknownParty { party: String },

    #[snafu(display("At least one party is required"))]
    EmptyPartyList {},

    #[snafu(display("Question {question_id}: {message}"))]
    DataIntegrity {
        question_id: String,
        message: String,
    },

    #[snafu(display(
        "The answers cover {answers} questions but the dataset has {dataset} questions"
    ))]
    InconsistentDataset { answers: usize, dataset: usize },
}

pub type MatchingResult<T> = Result<T, MatchingError>;

// ********* Configuration **********

/// The language of a questionnaire. Each language comes with its own roster of parties.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Language {
    French,
    Flemish,
}

impl Language {
    const FRENCH_PARTIES: [&'static str; 6] = ["Défi", "Ecolo", "Les Engagés", "MR", "PS", "PTB"];

    const FLEMISH_PARTIES: [&'static str; 7] = [
        "CD&V",
        "NVA",
        "Open VLD",
        "PVDA",
        "Vlaams Belang",
        "Vooruit",
        "Groen",
    ];

    pub fn roster(&self) -> Roster {
        match self {
            Language::French => Roster::new(Language::FRENCH_PARTIES),
            Language::Flemish => Roster::new(Language::FLEMISH_PARTIES),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::French => "french",
            Language::Flemish => "flemish",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Language, String> {
        match s.to_lowercase().as_str() {
            "french" | "fr" => Ok(Language::French),
            "flemish" | "nl" => Ok(Language::Flemish),
            x => Err(format!("unknown language {:?} (expected french or flemish)", x)),
        }
    }
}

/// The set of parties whose opinions a dataset must cover.
///
/// Parties are kept sorted by name. This order is the order of unranked results.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Roster {
    parties: Vec<String>,
}

impl Roster {
    pub fn new<I, S>(parties: I) -> Roster
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sorted: BTreeSet<String> = parties.into_iter().map(|s| s.into()).collect();
        Roster {
            parties: sorted.into_iter().collect(),
        }
    }

    pub fn contains(&self, party: &str) -> bool {
        self.parties.binary_search_by(|p| p.as_str().cmp(party)).is_ok()
    }

    pub fn parties(&self) -> &[String] {
        &self.parties
    }

    pub fn len(&self) -> usize {
        self.parties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parties.is_empty()
    }
}

/// How the percentages are reported.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ScoreOptions {
    /// Round the values to the nearest integer (ties to even).
    pub rounded: bool,
    /// Sort the parties by decreasing value, then by decreasing name.
    pub ranked: bool,
}

impl ScoreOptions {
    pub const DEFAULT_OPTIONS: ScoreOptions = ScoreOptions {
        rounded: true,
        ranked: false,
    };

    pub const RANKED: ScoreOptions = ScoreOptions {
        rounded: true,
        ranked: true,
    };
}

impl Default for ScoreOptions {
    fn default() -> Self {
        ScoreOptions::DEFAULT_OPTIONS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_round_trip_through_answers() {
        let answers = Answer::parse_symbols("aAdDuU").unwrap();
        assert_eq!(answers[1], Answer::boosted(Opinion::Agree));
        assert_eq!(answers[4], Answer::UNDECIDED);
        let s: String = answers.iter().map(|a| a.symbol()).collect();
        assert_eq!(s, "aAdDuU");
    }

    #[test]
    fn invalid_symbol_is_reported() {
        assert_eq!(
            Answer::parse_symbols("aao"),
            Err(MatchingError::InvalidSymbol { symbol: 'o' })
        );
    }

    #[test]
    fn opinion_labels_are_case_insensitive() {
        assert_eq!(Opinion::parse_label("Agree"), Some(Opinion::Agree));
        assert_eq!(Opinion::parse_label(" undecided"), Some(Opinion::Undecided));
        assert_eq!(Opinion::parse_label("neutral"), None);
    }

    #[test]
    fn rosters_are_sorted_and_disjoint() {
        let fr = Language::French.roster();
        let nl = Language::Flemish.roster();
        assert_eq!(fr.len(), 6);
        assert_eq!(nl.len(), 7);
        assert_eq!(fr.parties()[0], "Défi");
        assert_eq!(nl.parties()[1], "Groen");
        assert!(fr.parties().iter().all(|p| !nl.contains(p)));
        assert!(fr.contains("Les Engagés"));
        assert!(!fr.contains("Groen"));
    }

    #[test]
    fn language_from_str() {
        assert_eq!("French".parse::<Language>(), Ok(Language::French));
        assert_eq!("nl".parse::<Language>(), Ok(Language::Flemish));
        assert!("german".parse::<Language>().is_err());
    }
}
