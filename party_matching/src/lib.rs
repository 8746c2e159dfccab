/*!
Weighted matching between the answers of a respondent to an electoral questionnaire
and the recorded positions of the political parties.

```
use party_matching::builder::Builder;
use party_matching::*;

let store = Builder::new(Roster::new(["A", "B"]))
    .question("q1", &[("A", Opinion::Agree, 10.0), ("B", Opinion::Disagree, 5.0)])
    .build()?;
let calc = Calculator::new(store);

// A boosted "agree" to the only question.
let mut answers = calc.new_answers();
answers.set_all_symbols("A")?;
let results = calc.score(&answers, &ScoreOptions::RANKED)?;
assert_eq!(results.get("A"), Some(25.0));
assert_eq!(results.top().map(|ps| ps.party.as_str()), Some("A"));
# Ok::<(), MatchingError>(())
```

See the [manual] for the scoring rules and the dataset format.
*/
mod answers;
pub mod builder;
mod config;
pub mod manual;
mod store;

use log::debug;

pub use crate::answers::*;
pub use crate::config::*;
pub use crate::store::*;

/// Bonus spread over the boosted answers that match a party.
const BOOST_BONUS: f64 = 20.0;
/// Brings the boosted scores back to a 0-100 scale (100 weight points + 20 bonus points).
const BOOST_NORMALIZATION: f64 = 1.2;

/// The scoring engine for one questionnaire.
///
/// It is read-only once built and can be shared between threads; every caller owns its
/// own [`AnswerVector`].
#[derive(PartialEq, Debug, Clone)]
pub struct Calculator {
    store: QuestionStore,
    index: PartyIndex,
}

impl Calculator {
    pub fn new(store: QuestionStore) -> Calculator {
        let index = PartyIndex::new(&store);
        Calculator { store, index }
    }

    pub fn store(&self) -> &QuestionStore {
        &self.store
    }

    pub fn index(&self) -> &PartyIndex {
        &self.index
    }

    pub fn num_questions(&self) -> usize {
        self.store.num_questions()
    }

    pub fn parties(&self) -> &[String] {
        self.store.roster().parties()
    }

    /// An unset answer vector sized for this questionnaire.
    pub fn new_answers(&self) -> AnswerVector {
        AnswerVector::new(self.num_questions())
    }

    /// The match counts of every party, in roster order.
    pub fn tally(&self, answers: &AnswerVector) -> MatchingResult<Vec<PartyTally>> {
        let checked = self.checked(answers)?;
        Ok(compute_tallies(checked, &self.index))
    }

    /// Computes the percentage of every party of the roster.
    pub fn score(
        &self,
        answers: &AnswerVector,
        options: &ScoreOptions,
    ) -> MatchingResult<MatchResults> {
        let checked = self.checked(answers)?;
        Ok(compute_scores(checked, &self.index, options))
    }

    fn checked<'a>(&self, answers: &'a AnswerVector) -> MatchingResult<&'a [Answer]> {
        let checked = answers.checked_answers()?;
        if checked.len() != self.num_questions() {
            return Err(MatchingError::InconsistentDataset {
                answers: checked.len(),
                dataset: self.num_questions(),
            });
        }
        Ok(checked)
    }
}

/// Runs the matching for a full set of answers.
///
/// Arguments:
/// * `answers` one answer per question of the index, in question order
/// * `index` the party profiles
/// * `options` rounding and ranking of the output
///
/// The per-party accumulators live only for the duration of the call.
pub fn compute_scores(
    answers: &[Answer],
    index: &PartyIndex,
    options: &ScoreOptions,
) -> MatchResults {
    let total_boosted = answers.iter().filter(|a| a.is_boosted()).count();
    let tallies = compute_tallies(answers, index);

    let mut scores: Vec<PartyScore> = tallies
        .into_iter()
        .map(|tally| {
            let raw = percentage(&tally, total_boosted);
            let value = if options.rounded {
                raw.round_ties_even()
            } else {
                raw
            };
            debug!(
                "compute_scores: {}: matches {} boosted {} weights {} -> {}",
                tally.party, tally.matches, tally.boosted_matches, tally.weighted_sum, raw
            );
            PartyScore {
                party: tally.party.clone(),
                value,
                tally,
            }
        })
        .collect();

    if options.ranked {
        rank(&mut scores);
    }

    MatchResults {
        scores,
        total_boosted,
        rounded: options.rounded,
        ranked: options.ranked,
    }
}

fn compute_tallies(answers: &[Answer], index: &PartyIndex) -> Vec<PartyTally> {
    index
        .profiles()
        .map(|(party, profile)| {
            let mut tally = PartyTally {
                party: party.clone(),
                matches: 0,
                boosted_matches: 0,
                weighted_sum: 0.0,
            };
            for ((answer, opinion), weight) in answers
                .iter()
                .zip(profile.opinions.iter())
                .zip(profile.weights.iter())
            {
                if answer.opinion == *opinion {
                    tally.matches += 1;
                    tally.weighted_sum += weight;
                    if answer.is_boosted() {
                        tally.boosted_matches += 1;
                    }
                }
            }
            tally
        })
        .collect()
}

fn percentage(tally: &PartyTally, total_boosted: usize) -> f64 {
    if total_boosted > 0 {
        let boost_share = tally.boosted_matches as f64 / total_boosted as f64;
        (tally.weighted_sum + boost_share * BOOST_BONUS) / BOOST_NORMALIZATION
    } else {
        tally.weighted_sum
    }
}

/// Sorts by decreasing value. Ex-aequos are sorted by decreasing party name so that the
/// order is total.
fn rank(scores: &mut [PartyScore]) {
    scores.sort_by(|x, y| {
        y.value
            .total_cmp(&x.value)
            .then_with(|| y.party.cmp(&x.party))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;

    fn calc_ab() -> Calculator {
        let store = Builder::new(Roster::new(["A", "B"]))
            .question("1", &[("A", Opinion::Agree, 10.0), ("B", Opinion::Disagree, 5.0)])
            .build()
            .unwrap();
        Calculator::new(store)
    }

    fn score_of(calc: &Calculator, symbols: &str, options: &ScoreOptions) -> Vec<(String, f64)> {
        let mut answers = calc.new_answers();
        answers.set_all_symbols(symbols).unwrap();
        calc.score(&answers, options).unwrap().pairs()
    }

    #[test]
    fn plain_agreement() {
        let calc = calc_ab();
        assert_eq!(
            score_of(&calc, "a", &ScoreOptions::RANKED),
            vec![("A".to_string(), 10.0), ("B".to_string(), 0.0)]
        );
    }

    #[test]
    fn boosted_agreement() {
        let calc = calc_ab();
        let options = ScoreOptions {
            rounded: false,
            ranked: true,
        };
        let res = score_of(&calc, "A", &options);
        assert_eq!(res[0].0, "A");
        assert!((res[0].1 - 25.0).abs() < 1e-9);
        assert_eq!(res[1], ("B".to_string(), 0.0));
    }

    #[test]
    fn unset_answers_cannot_be_scored() {
        let calc = calc_ab();
        let answers = calc.new_answers();
        assert_eq!(
            calc.score(&answers, &ScoreOptions::DEFAULT_OPTIONS),
            Err(MatchingError::AnswersNotSet {})
        );
        let mut other = AnswerVector::new(2);
        other.set_all_symbols("aa").unwrap();
        assert_eq!(
            calc.tally(&other),
            Err(MatchingError::InconsistentDataset {
                answers: 2,
                dataset: 1
            })
        );
    }

    #[test]
    fn ties_are_broken_by_decreasing_name() {
        let store = Builder::new(Roster::new(["Alpha", "Beta", "Gamma"]))
            .question(
                "1",
                &[
                    ("Alpha", Opinion::Agree, 5.0),
                    ("Beta", Opinion::Agree, 5.0),
                    ("Gamma", Opinion::Disagree, 5.0),
                ],
            )
            .build()
            .unwrap();
        let calc = Calculator::new(store);
        let parties: Vec<String> = score_of(&calc, "a", &ScoreOptions::RANKED)
            .into_iter()
            .map(|(p, _)| p)
            .collect();
        assert_eq!(parties, vec!["Beta", "Alpha", "Gamma"]);
    }

    #[test]
    fn rounding_is_half_to_even() {
        // 75 / 1.2 = 62.5 and 87 / 1.2 = 72.5
        let store = Builder::new(Roster::new(["A", "B"]))
            .question("1", &[("A", Opinion::Agree, 55.0), ("B", Opinion::Agree, 67.0)])
            .build()
            .unwrap();
        let calc = Calculator::new(store);
        let res = score_of(&calc, "A", &ScoreOptions::DEFAULT_OPTIONS);
        assert_eq!(res, vec![("A".to_string(), 62.0), ("B".to_string(), 72.0)]);
    }

    #[test]
    fn undecided_boosted_answers_count_in_the_boost_total() {
        let store = Builder::new(Roster::new(["A", "B"]))
            .question("1", &[("A", Opinion::Agree, 50.0), ("B", Opinion::Disagree, 50.0)])
            .question("2", &[("A", Opinion::Agree, 50.0), ("B", Opinion::Undecided, 50.0)])
            .build()
            .unwrap();
        let calc = Calculator::new(store);
        let mut answers = calc.new_answers();
        answers.set_all_symbols("AU").unwrap();
        let res = calc
            .score(
                &answers,
                &ScoreOptions {
                    rounded: false,
                    ranked: false,
                },
            )
            .unwrap();
        assert_eq!(res.total_boosted, 2);
        // A: (50 + 1/2 * 20) / 1.2, B: (50 + 1/2 * 20) / 1.2
        assert!((res.get("A").unwrap() - 50.0).abs() < 1e-9);
        assert!((res.get("B").unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn tallies_expose_the_counts() {
        let calc = calc_ab();
        let mut answers = calc.new_answers();
        answers.set_all_symbols("A").unwrap();
        let tallies = calc.tally(&answers).unwrap();
        assert_eq!(
            tallies[0],
            PartyTally {
                party: "A".to_string(),
                matches: 1,
                boosted_matches: 1,
                weighted_sum: 10.0,
            }
        );
        assert_eq!(tallies[1].matches, 0);
        assert_eq!(tallies[1].weighted_sum, 0.0);
    }
}
