use std::fmt::Display;

use log::debug;
use rand::Rng;
use snafu::{ensure, OptionExt};

use crate::config::*;
use crate::store::PartyIndex;

/// The answers of one respondent, one per question.
///
/// A vector starts unset: scoring or mutating it before a first full assignment is an error.
/// Every rejected operation leaves the vector untouched.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AnswerVector {
    num_questions: usize,
    // Invariant: when set, the length is num_questions.
    answers: Option<Vec<Answer>>,
}

impl AnswerVector {
    pub fn new(num_questions: usize) -> AnswerVector {
        AnswerVector {
            num_questions,
            answers: None,
        }
    }

    pub fn num_questions(&self) -> usize {
        self.num_questions
    }

    pub fn is_set(&self) -> bool {
        self.answers.is_some()
    }

    pub fn answers(&self) -> Option<&[Answer]> {
        self.answers.as_deref()
    }

    pub(crate) fn checked_answers(&self) -> MatchingResult<&[Answer]> {
        self.answers.as_deref().context(AnswersNotSetSnafu {})
    }

    /// The answers as text, for instance `"adaDddAaddu"`.
    pub fn symbols(&self) -> Option<String> {
        self.answers
            .as_ref()
            .map(|v| v.iter().map(|a| a.symbol()).collect())
    }

    pub fn set_all(&mut self, answers: Vec<Answer>) -> MatchingResult<()> {
        ensure!(
            answers.len() == self.num_questions,
            WrongLengthSnafu {
                expected: self.num_questions,
                actual: answers.len(),
            }
        );
        self.answers = Some(answers);
        Ok(())
    }

    /// Sets all the answers from their textual form, one character per question.
    pub fn set_all_symbols(&mut self, symbols: &str) -> MatchingResult<()> {
        let answers = Answer::parse_symbols(symbols)?;
        self.set_all(answers)
    }

    pub fn set_one(&mut self, index: usize, answer: Answer) -> MatchingResult<()> {
        let num_questions = self.num_questions;
        let answers = self.answers.as_mut().context(AnswersNotSetSnafu {})?;
        let slot = answers.get_mut(index).context(IndexOutOfBoundsSnafu {
            index,
            num_questions,
        })?;
        *slot = answer;
        Ok(())
    }

    /// The state of the vector is checked before the symbol.
    pub fn set_one_symbol(&mut self, index: usize, symbol: char) -> MatchingResult<()> {
        ensure!(self.answers.is_some(), AnswersNotSetSnafu {});
        let answer = Answer::from_symbol(symbol).context(InvalidSymbolSnafu { symbol })?;
        self.set_one(index, answer)
    }

    /// Replaces the answer at `index` by a different one, chosen uniformly at random.
    ///
    /// * `allow_undecided`: undecided answers are part of the candidates. Otherwise only agree
    /// and disagree are.
    /// * `allow_boost_change`: both the plain and the boosted versions are candidates.
    /// Otherwise the candidates keep the boost of the current answer.
    ///
    /// Returns the new answer.
    pub fn random_perturb<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        allow_undecided: bool,
        allow_boost_change: bool,
        rng: &mut R,
    ) -> MatchingResult<Answer> {
        let num_questions = self.num_questions;
        let answers = self.answers.as_mut().context(AnswersNotSetSnafu {})?;
        let slot = answers.get_mut(index).context(IndexOutOfBoundsSnafu {
            index,
            num_questions,
        })?;
        let current = *slot;
        let candidates = perturbation_candidates(current, allow_undecided, allow_boost_change);
        // Never empty: at least one other opinion shares the boost of the current answer.
        let new_answer = candidates[rng.gen_range(0..candidates.len())];
        debug!(
            "random_perturb: index {}: {} -> {} (candidates: {:?})",
            index, current, new_answer, candidates
        );
        *slot = new_answer;
        Ok(new_answer)
    }

    /// Answers exactly like a party (no boost).
    pub fn copy_from_party(&mut self, index: &PartyIndex, party: &str) -> MatchingResult<()> {
        self.check_index(index)?;
        let profile = index.profile(party)?;
        self.answers = Some(profile.opinions.iter().map(|o| Answer::plain(*o)).collect());
        Ok(())
    }

    /// Answers like a random mixture of parties: for every question, one of the parties is
    /// drawn uniformly and its opinion is copied.
    pub fn copy_from_mixture<R, S>(
        &mut self,
        index: &PartyIndex,
        parties: &[S],
        rng: &mut R,
    ) -> MatchingResult<()>
    where
        R: Rng + ?Sized,
        S: AsRef<str>,
    {
        self.check_index(index)?;
        ensure!(!parties.is_empty(), EmptyPartyListSnafu {});
        let profiles = parties
            .iter()
            .map(|p| index.profile(p.as_ref()))
            .collect::<MatchingResult<Vec<_>>>()?;
        let mut res: Vec<Answer> = Vec::with_capacity(self.num_questions);
        for i in 0..self.num_questions {
            let profile = profiles[rng.gen_range(0..profiles.len())];
            res.push(Answer::plain(profile.opinions[i]));
        }
        self.answers = Some(res);
        Ok(())
    }

    fn check_index(&self, index: &PartyIndex) -> MatchingResult<()> {
        ensure!(
            index.num_questions() == self.num_questions,
            InconsistentDatasetSnafu {
                answers: self.num_questions,
                dataset: index.num_questions(),
            }
        );
        Ok(())
    }
}

impl Display for AnswerVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.symbols() {
            Some(s) => write!(f, "{}", s),
            None => write!(f, "<unset>"),
        }
    }
}

// Fixed order: agree, disagree, undecided, plain before boosted.
fn perturbation_candidates(
    current: Answer,
    allow_undecided: bool,
    allow_boost_change: bool,
) -> Vec<Answer> {
    let all = Opinion::ALL;
    let opinions: &[Opinion] = if allow_undecided { &all } else { &all[..2] };
    let boosts: Vec<Boost> = if allow_boost_change {
        vec![Boost::Plain, Boost::Boosted]
    } else {
        vec![current.boost]
    };
    let mut res: Vec<Answer> = Vec::new();
    for boost in boosts {
        for opinion in opinions.iter() {
            let candidate = Answer {
                opinion: *opinion,
                boost,
            };
            if candidate != current {
                res.push(candidate);
            }
        }
    }
    res
}
