use std::collections::{BTreeMap, HashMap};

use log::{debug, info};
use snafu::{ensure, OptionExt};

use crate::config::*;

/// The questions retained for one questionnaire (levels + roster), in dataset order.
///
/// Position `i` designates the same question in the store, in every party profile and in
/// every answer vector built against it.
#[derive(PartialEq, Debug, Clone)]
pub struct QuestionStore {
    questions: Vec<Question>,
    roster: Roster,
}

impl QuestionStore {
    /// Filters the raw records.
    ///
    /// A question is kept if one of its levels is requested and if the party of its first
    /// opinion belongs to the roster. Every kept question must then hold exactly one
    /// opinion for each party of the roster, and nothing else.
    pub fn load(
        records: Vec<Question>,
        levels: &[String],
        roster: &Roster,
    ) -> MatchingResult<QuestionStore> {
        let num_records = records.len();
        let mut questions: Vec<Question> = Vec::new();
        for q in records {
            let level_ok = q.levels.iter().any(|l| levels.contains(l));
            let roster_ok = q
                .party_opinions
                .first()
                .map(|po| roster.contains(&po.party))
                .unwrap_or(false);
            if !(level_ok && roster_ok) {
                debug!(
                    "load: dropping question {} (levels {:?}, level match: {}, roster match: {})",
                    q.id, q.levels, level_ok, roster_ok
                );
                continue;
            }
            check_coverage(&q, roster)?;
            questions.push(q);
        }
        info!(
            "Retained {} questions out of {} for levels {:?}",
            questions.len(),
            num_records,
            levels
        );
        Ok(QuestionStore {
            questions,
            roster: roster.clone(),
        })
    }

    pub fn num_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

fn check_coverage(q: &Question, roster: &Roster) -> MatchingResult<()> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for po in q.party_opinions.iter() {
        ensure!(
            roster.contains(&po.party),
            DataIntegritySnafu {
                question_id: q.id.clone(),
                message: format!("party {:?} is not part of the roster", po.party),
            }
        );
        *seen.entry(po.party.as_str()).or_insert(0) += 1;
    }
    for party in roster.parties() {
        match seen.get(party.as_str()) {
            Some(1) => {}
            Some(n) => {
                return DataIntegritySnafu {
                    question_id: q.id.clone(),
                    message: format!("party {:?} has {} opinions", party, n),
                }
                .fail();
            }
            None => {
                return DataIntegritySnafu {
                    question_id: q.id.clone(),
                    message: format!("no opinion for party {:?}", party),
                }
                .fail();
            }
        }
    }
    Ok(())
}

/// The answers of one party to the whole questionnaire.
#[derive(PartialEq, Debug, Clone)]
pub struct PartyProfile {
    pub opinions: Vec<Opinion>,
    pub weights: Vec<f64>,
}

impl PartyProfile {
    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// The profile as plain answers, for instance `"adda"`.
    pub fn symbols(&self) -> String {
        self.opinions
            .iter()
            .map(|o| Answer::plain(*o).symbol())
            .collect()
    }
}

/// The profiles of all the parties, derived once from a store.
#[derive(PartialEq, Debug, Clone)]
pub struct PartyIndex {
    num_questions: usize,
    profiles: BTreeMap<String, PartyProfile>,
}

impl PartyIndex {
    pub fn new(store: &QuestionStore) -> PartyIndex {
        let num_questions = store.num_questions();
        let mut profiles: BTreeMap<String, PartyProfile> = store
            .roster()
            .parties()
            .iter()
            .map(|p| {
                (
                    p.clone(),
                    PartyProfile {
                        opinions: Vec::with_capacity(num_questions),
                        weights: Vec::with_capacity(num_questions),
                    },
                )
            })
            .collect();
        for q in store.questions() {
            for po in q.party_opinions.iter() {
                // The store guarantees one opinion per roster party.
                if let Some(profile) = profiles.get_mut(&po.party) {
                    profile.opinions.push(po.opinion);
                    profile.weights.push(po.weight);
                }
            }
        }
        debug!(
            "PartyIndex::new: {} profiles over {} questions",
            profiles.len(),
            num_questions
        );
        PartyIndex {
            num_questions,
            profiles,
        }
    }

    pub fn num_questions(&self) -> usize {
        self.num_questions
    }

    pub fn profile(&self, party: &str) -> MatchingResult<&PartyProfile> {
        self.profiles
            .get(party)
            .context(UnknownPartySnafu { party })
    }

    /// Profiles in roster order.
    pub fn profiles(&self) -> impl Iterator<Item = (&String, &PartyProfile)> {
        self.profiles.iter()
    }

    pub fn parties(&self) -> impl Iterator<Item = &String> {
        self.profiles.keys()
    }

    /// The label of the question at position `index`, `Q1` for the first one.
    pub fn question_label(index: usize) -> String {
        format!("Q{}", index + 1)
    }

    /// The opinions of a party keyed by question label.
    pub fn labelled_opinions(&self, party: &str) -> MatchingResult<BTreeMap<String, Opinion>> {
        let profile = self.profile(party)?;
        Ok(profile
            .opinions
            .iter()
            .enumerate()
            .map(|(idx, o)| (PartyIndex::question_label(idx), *o))
            .collect())
    }

    /// The weights of a party keyed by question label.
    pub fn labelled_weights(&self, party: &str) -> MatchingResult<BTreeMap<String, f64>> {
        let profile = self.profile(party)?;
        Ok(profile
            .weights
            .iter()
            .enumerate()
            .map(|(idx, w)| (PartyIndex::question_label(idx), *w))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;

    fn roster_ab() -> Roster {
        Roster::new(["A", "B"])
    }

    fn opinion(party: &str, opinion: Opinion, weight: f64) -> PartyOpinion {
        PartyOpinion {
            party: party.to_string(),
            opinion,
            weight,
            description: None,
        }
    }

    fn question(id: &str, levels: &[&str], ops: Vec<PartyOpinion>) -> Question {
        Question {
            id: id.to_string(),
            short: format!("short {}", id),
            statement: format!("statement {}", id),
            levels: levels.iter().map(|s| s.to_string()).collect(),
            party_opinions: ops,
        }
    }

    #[test]
    fn filters_by_level_and_roster() {
        let records = vec![
            question(
                "1",
                &["base"],
                vec![
                    opinion("A", Opinion::Agree, 1.0),
                    opinion("B", Opinion::Disagree, 2.0),
                ],
            ),
            question(
                "2",
                &["extended"],
                vec![
                    opinion("A", Opinion::Agree, 1.0),
                    opinion("B", Opinion::Disagree, 2.0),
                ],
            ),
            // Opinions of another roster.
            question("3", &["base"], vec![opinion("Z", Opinion::Agree, 1.0)]),
            question("4", &["base"], vec![]),
        ];
        let store = QuestionStore::load(records, &["base".to_string()], &roster_ab()).unwrap();
        assert_eq!(store.num_questions(), 1);
        assert_eq!(store.questions()[0].id, "1");
    }

    #[test]
    fn several_levels_can_be_requested() {
        let store = Builder::new(roster_ab())
            .question("1", &[("A", Opinion::Agree, 1.0), ("B", Opinion::Agree, 1.0)])
            .question_at_levels(
                "2",
                &["extended"],
                &[("A", Opinion::Agree, 1.0), ("B", Opinion::Agree, 1.0)],
            )
            .levels(&["base", "extended"])
            .build()
            .unwrap();
        assert_eq!(store.num_questions(), 2);
    }

    #[test]
    fn missing_party_is_an_integrity_error() {
        let records = vec![question(
            "7",
            &["base"],
            vec![opinion("A", Opinion::Agree, 1.0)],
        )];
        let err = QuestionStore::load(records, &["base".to_string()], &roster_ab()).unwrap_err();
        assert!(matches!(err, MatchingError::DataIntegrity { ref question_id, .. } if question_id == "7"));
    }

    #[test]
    fn duplicated_party_is_an_integrity_error() {
        let records = vec![question(
            "8",
            &["base"],
            vec![
                opinion("A", Opinion::Agree, 1.0),
                opinion("A", Opinion::Disagree, 1.0),
                opinion("B", Opinion::Agree, 1.0),
            ],
        )];
        let res = QuestionStore::load(records, &["base".to_string()], &roster_ab());
        assert!(matches!(res, Err(MatchingError::DataIntegrity { .. })));
    }

    #[test]
    fn foreign_party_is_an_integrity_error() {
        let records = vec![question(
            "9",
            &["base"],
            vec![
                opinion("A", Opinion::Agree, 1.0),
                opinion("B", Opinion::Agree, 1.0),
                opinion("C", Opinion::Agree, 1.0),
            ],
        )];
        let res = QuestionStore::load(records, &["base".to_string()], &roster_ab());
        assert!(matches!(res, Err(MatchingError::DataIntegrity { .. })));
    }

    #[test]
    fn profiles_follow_question_order() {
        // Opinions are not listed in roster order in the second question.
        let store = Builder::new(roster_ab())
            .question("1", &[("A", Opinion::Agree, 10.0), ("B", Opinion::Disagree, 5.0)])
            .question("2", &[("B", Opinion::Undecided, 3.0), ("A", Opinion::Disagree, 7.0)])
            .build()
            .unwrap();
        let index = PartyIndex::new(&store);
        assert_eq!(index.num_questions(), 2);
        let a = index.profile("A").unwrap();
        assert_eq!(a.opinions, vec![Opinion::Agree, Opinion::Disagree]);
        assert_eq!(a.weights, vec![10.0, 7.0]);
        assert_eq!(a.symbols(), "ad");
        assert_eq!(index.profile("B").unwrap().symbols(), "du");
        assert_eq!(index.profile("B").unwrap().total_weight(), 8.0);
        assert_eq!(
            index.parties().cloned().collect::<Vec<String>>(),
            vec!["A".to_string(), "B".to_string()]
        );
    }

    #[test]
    fn labelled_views() {
        let store = Builder::new(roster_ab())
            .question("1", &[("A", Opinion::Agree, 10.0), ("B", Opinion::Disagree, 5.0)])
            .build()
            .unwrap();
        let index = PartyIndex::new(&store);
        let ops = index.labelled_opinions("B").unwrap();
        assert_eq!(ops.get("Q1"), Some(&Opinion::Disagree));
        let ws = index.labelled_weights("A").unwrap();
        assert_eq!(ws.get("Q1"), Some(&10.0));
        assert_eq!(
            index.profile("C"),
            Err(MatchingError::UnknownParty {
                party: "C".to_string()
            })
        );
    }
}
