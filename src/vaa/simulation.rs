// Monte-Carlo studies of the scores.

use std::collections::BTreeMap;
use std::io::Write;

use log::{debug, info};
use party_matching::{Answer, Calculator, MatchResults, Opinion, ScoreOptions};
use rand::Rng;
use snafu::prelude::*;

use crate::vaa::config_reader::SimulationParams;
use crate::vaa::io_csv::write_records;
use crate::vaa::{MatchingSnafu, VaaResult};

/// The winner of one perturbed copy of a party.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct StabilityRow {
    pub from_party: String,
    pub to_party: String,
}

/// How often a party wins within one fold of random answers.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct WinnerCount {
    pub party: String,
    pub fold: usize,
    pub num_wins: usize,
}

fn winner(results: &MatchResults) -> VaaResult<String> {
    match results.top() {
        Some(ps) => Ok(ps.party.clone()),
        None => whatever!("No party to rank"),
    }
}

/// For every party: answer like the party, change `changes` answers at random positions
/// and record the best matching party. This is repeated `trials` times per party.
///
/// The changed answers may flip between agree and disagree and gain or lose their boost.
pub fn party_stability<R: Rng + ?Sized>(
    calc: &Calculator,
    params: &SimulationParams,
    rng: &mut R,
) -> VaaResult<Vec<StabilityRow>> {
    let num_questions = calc.num_questions();
    ensure_whatever!(
        num_questions > 0,
        "The questionnaire has no question for these levels"
    );
    let mut rows: Vec<StabilityRow> = Vec::with_capacity(calc.parties().len() * params.trials);
    let mut answers = calc.new_answers();
    for party in calc.parties() {
        let mut kept = 0;
        for _ in 0..params.trials {
            answers
                .copy_from_party(calc.index(), party)
                .context(MatchingSnafu {})?;
            for _ in 0..params.changes {
                let j = rng.gen_range(0..num_questions);
                answers
                    .random_perturb(j, false, true, rng)
                    .context(MatchingSnafu {})?;
            }
            let results = calc
                .score(&answers, &ScoreOptions::RANKED)
                .context(MatchingSnafu {})?;
            let to_party = winner(&results)?;
            if to_party == *party {
                kept += 1;
            }
            rows.push(StabilityRow {
                from_party: party.clone(),
                to_party,
            });
        }
        info!(
            "party_stability: {} stays first in {} of {} trials",
            party, kept, params.trials
        );
    }
    Ok(rows)
}

/// Counts, over `folds` folds of `trials` random agree/disagree answers, how often each
/// party comes first. Only parties with at least one win are reported.
pub fn random_winners<R: Rng + ?Sized>(
    calc: &Calculator,
    params: &SimulationParams,
    rng: &mut R,
) -> VaaResult<Vec<WinnerCount>> {
    let num_questions = calc.num_questions();
    let mut rows: Vec<WinnerCount> = Vec::new();
    let mut answers = calc.new_answers();
    let coarse = [Opinion::Agree, Opinion::Disagree];
    for fold in 0..params.folds {
        let mut counter: BTreeMap<String, usize> = BTreeMap::new();
        for _ in 0..params.trials {
            let draw: Vec<Answer> = (0..num_questions)
                .map(|_| Answer::plain(coarse[rng.gen_range(0..coarse.len())]))
                .collect();
            answers.set_all(draw).context(MatchingSnafu {})?;
            let results = calc
                .score(&answers, &ScoreOptions::RANKED)
                .context(MatchingSnafu {})?;
            *counter.entry(winner(&results)?).or_insert(0) += 1;
        }
        debug!("random_winners: fold {}: {:?}", fold, counter);
        rows.extend(counter.into_iter().map(|(party, num_wins)| WinnerCount {
            party,
            fold,
            num_wins,
        }));
    }
    info!(
        "random_winners: {} folds of {} trials",
        params.folds, params.trials
    );
    Ok(rows)
}

pub fn write_stability<W: Write>(rows: &[StabilityRow], out: W) -> VaaResult<()> {
    let header: Vec<String> = vec!["from_party".to_string(), "to_party".to_string()];
    write_records(
        &header,
        rows.iter()
            .map(|r| vec![r.from_party.clone(), r.to_party.clone()]),
        out,
    )
}

pub fn write_random_winners<W: Write>(rows: &[WinnerCount], out: W) -> VaaResult<()> {
    let header: Vec<String> = ["party", "fold", "num_wins"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    write_records(
        &header,
        rows.iter().map(|r| {
            vec![
                r.party.clone(),
                r.fold.to_string(),
                r.num_wins.to_string(),
            ]
        }),
        out,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use party_matching::builder::Builder;
    use party_matching::Roster;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn calc_abc() -> Calculator {
        use Opinion::*;
        let store = Builder::new(Roster::new(["A", "B", "C"]))
            .question("1", &[("A", Agree, 40.0), ("B", Disagree, 30.0), ("C", Agree, 10.0)])
            .question("2", &[("A", Agree, 30.0), ("B", Agree, 30.0), ("C", Disagree, 50.0)])
            .question("3", &[("A", Disagree, 30.0), ("B", Agree, 40.0), ("C", Undecided, 40.0)])
            .build()
            .unwrap();
        Calculator::new(store)
    }

    fn params(trials: usize, changes: usize, folds: usize) -> SimulationParams {
        SimulationParams {
            seed: 0,
            trials,
            changes,
            folds,
        }
    }

    #[test]
    fn stability_has_one_row_per_trial() {
        let calc = calc_abc();
        let mut rng = StdRng::seed_from_u64(543210);
        let rows = party_stability(&calc, &params(7, 2, 1), &mut rng).unwrap();
        assert_eq!(rows.len(), 3 * 7);
        assert!(rows[..7].iter().all(|r| r.from_party == "A"));
        assert!(rows[14..].iter().all(|r| r.from_party == "C"));
        assert!(rows.iter().all(|r| calc.parties().contains(&r.to_party)));
    }

    #[test]
    fn without_changes_every_party_wins_against_itself() {
        let calc = calc_abc();
        let mut rng = StdRng::seed_from_u64(1);
        let rows = party_stability(&calc, &params(3, 0, 1), &mut rng).unwrap();
        assert!(rows.iter().all(|r| r.from_party == r.to_party));
    }

    #[test]
    fn simulations_are_reproducible() {
        let calc = calc_abc();
        let run = |seed: u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            let s = party_stability(&calc, &params(20, 2, 3), &mut rng).unwrap();
            let w = random_winners(&calc, &params(20, 2, 3), &mut rng).unwrap();
            (s, w)
        };
        assert_eq!(run(543210), run(543210));
    }

    #[test]
    fn random_winners_count_every_trial() {
        let calc = calc_abc();
        let mut rng = StdRng::seed_from_u64(12);
        let rows = random_winners(&calc, &params(50, 0, 4), &mut rng).unwrap();
        for fold in 0..4 {
            let fold_rows: Vec<&WinnerCount> = rows.iter().filter(|r| r.fold == fold).collect();
            assert_eq!(fold_rows.iter().map(|r| r.num_wins).sum::<usize>(), 50);
            assert!(fold_rows.iter().all(|r| r.num_wins > 0));
            assert!(fold_rows.windows(2).all(|w| w[0].party < w[1].party));
        }
    }

    #[test]
    fn empty_questionnaire_cannot_be_perturbed() {
        let store = Builder::new(Roster::new(["A"])).build().unwrap();
        let calc = Calculator::new(store);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(party_stability(&calc, &params(1, 1, 1), &mut rng).is_err());
    }

    #[test]
    fn stability_csv() {
        let rows = vec![StabilityRow {
            from_party: "Les Engagés".to_string(),
            to_party: "CD&V".to_string(),
        }];
        let mut buf: Vec<u8> = Vec::new();
        write_stability(&rows, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "from_party,to_party\nLes Engagés,CD&V\n"
        );
    }

    #[test]
    fn random_winners_csv() {
        let rows = vec![
            WinnerCount {
                party: "Ecolo".to_string(),
                fold: 0,
                num_wins: 3,
            },
            WinnerCount {
                party: "PS".to_string(),
                fold: 1,
                num_wins: 2,
            },
        ];
        let mut buf: Vec<u8> = Vec::new();
        write_random_winners(&rows, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "party,fold,num_wins\nEcolo,0,3\nPS,1,2\n"
        );
    }
}
