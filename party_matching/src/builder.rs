pub use crate::config::*;
use crate::store::QuestionStore;

/// A builder for assembling a questionnaire in memory.
///
/// It is convenient for tests and for callers that do not read the datasets from files.
///
/// ```
/// use party_matching::builder::Builder;
/// use party_matching::{Calculator, Opinion, Roster, ScoreOptions};
/// # use party_matching::MatchingError;
///
/// let store = Builder::new(Roster::new(["A", "B"]))
///     .question("q1", &[("A", Opinion::Agree, 10.0), ("B", Opinion::Disagree, 5.0)])
///     .build()?;
/// let calc = Calculator::new(store);
///
/// let mut answers = calc.new_answers();
/// answers.set_all_symbols("a")?;
/// let results = calc.score(&answers, &ScoreOptions::RANKED)?;
/// assert_eq!(results.pairs(), vec![("A".to_string(), 10.0), ("B".to_string(), 0.0)]);
///
/// # Ok::<(), MatchingError>(())
/// ```
pub struct Builder {
    pub(crate) _roster: Roster,
    pub(crate) _levels: Vec<String>,
    pub(crate) _questions: Vec<Question>,
}

impl Builder {
    pub const DEFAULT_LEVEL: &'static str = "base";

    pub fn new(roster: Roster) -> Builder {
        Builder {
            _roster: roster,
            _levels: vec![Builder::DEFAULT_LEVEL.to_string()],
            _questions: Vec::new(),
        }
    }

    /// The levels to retain when building. Defaults to `base`.
    pub fn levels(self, levels: &[&str]) -> Builder {
        Builder {
            _levels: levels.iter().map(|s| s.to_string()).collect(),
            ..self
        }
    }

    /// Adds a question of the default level.
    ///
    /// opinions: `(party, opinion, weight)` for every party.
    pub fn question(self, id: &str, opinions: &[(&str, Opinion, f64)]) -> Builder {
        self.question_at_levels(id, &[Builder::DEFAULT_LEVEL], opinions)
    }

    pub fn question_at_levels(
        self,
        id: &str,
        levels: &[&str],
        opinions: &[(&str, Opinion, f64)],
    ) -> Builder {
        let q = Question {
            id: id.to_string(),
            short: id.to_string(),
            statement: String::new(),
            levels: levels.iter().map(|s| s.to_string()).collect(),
            party_opinions: opinions
                .iter()
                .map(|(party, opinion, weight)| PartyOpinion {
                    party: party.to_string(),
                    opinion: *opinion,
                    weight: *weight,
                    description: None,
                })
                .collect(),
        };
        self.add_question(q)
    }

    /// Adds a fully described question.
    pub fn add_question(mut self, question: Question) -> Builder {
        self._questions.push(question);
        self
    }

    /// Filters and checks the questions, see [`QuestionStore::load`].
    pub fn build(self) -> MatchingResult<QuestionStore> {
        QuestionStore::load(self._questions, &self._levels, &self._roster)
    }
}
