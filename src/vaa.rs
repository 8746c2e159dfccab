use log::{debug, info, warn};

use party_matching::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::io::Write;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::{Args, Command, SimulationArgs};
use crate::vaa::config_reader::*;
use crate::vaa::io_common::{ensure_directory, open_output, table_path};
use crate::vaa::io_csv::Variable;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_json;
mod simulation;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum VaaError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error serializing the summary"))]
    WritingJson { source: serde_json::Error },
    #[snafu(display("Error writing to {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing CSV data"))]
    CsvWrite { source: csv::Error },
    #[snafu(display("Question at position {position}: unsupported id {content}"))]
    ParsingJsonId { position: usize, content: String },
    #[snafu(display("{source}"))]
    Matching { source: MatchingError },
    #[snafu(display("Difference detected between the computed summary and the reference {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type VaaResult<T> = Result<T, VaaError>;

/// The summary of a scoring run: the answers and the ranked percentages.
fn build_summary_js(answers: &AnswerVector, results: &MatchResults) -> JSValue {
    json!({
        "answers": answers.to_string(),
        "results": results_to_json(results),
    })
}

// With preserve_order, the keys keep the order of the results.
fn results_to_json(results: &MatchResults) -> JSValue {
    let mut m: JSMap<String, JSValue> = JSMap::new();
    for ps in results.scores.iter() {
        let v = if results.rounded {
            json!(ps.value as i64)
        } else {
            json!(ps.value)
        };
        m.insert(ps.party.clone(), v);
    }
    JSValue::Object(m)
}

pub fn read_summary(path: &str) -> VaaResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read content: {:?}", contents);
    let js: JSValue =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(js)
}

fn check_reference(pretty_js_stats: &str, reference_path: &str) -> VaaResult<()> {
    let summary_ref = read_summary(reference_path)?;
    info!("summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(WritingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        return ReferenceMismatchSnafu {
            path: reference_path,
        }
        .fail();
    }
    Ok(())
}

pub fn run(args: &Args) -> VaaResult<()> {
    let (settings, config) = resolve_settings(args)?;
    info!("settings: {:?}", settings);
    match &args.command {
        Command::Score {
            answers,
            unrounded,
            out,
            reference,
        } => run_score(
            &settings,
            answers,
            !*unrounded,
            out.as_deref(),
            reference.as_deref(),
        )
        .map(|_| ()),
        Command::Export {
            variables,
            long,
            statement,
            out,
        } => run_export(&settings, variables, *long, *statement, out.as_deref()),
        Command::Stability { simulation, out } => {
            run_stability(&settings, config.as_ref(), simulation, out.as_deref())
        }
        Command::RandomWinners { simulation, out } => {
            run_random_winners(&settings, config.as_ref(), simulation, out.as_deref())
        }
        Command::Tables {
            simulation,
            out_dir,
        } => run_tables(&settings, config.as_ref(), simulation, out_dir.as_deref()),
    }
}

/// Scores one answer string and prints the ranked percentages.
///
/// Returns the JSON summary.
pub fn run_score(
    settings: &RunSettings,
    symbols: &str,
    rounded: bool,
    out: Option<&str>,
    reference: Option<&str>,
) -> VaaResult<JSValue> {
    let calc = io_json::load_calculator(settings)?;
    let mut answers = calc.new_answers();
    answers.set_all_symbols(symbols).context(MatchingSnafu {})?;
    let options = ScoreOptions {
        rounded,
        ranked: true,
    };
    let results = calc.score(&answers, &options).context(MatchingSnafu {})?;
    debug!("run_score: {:?}", results);

    println!("{}", results_to_json(&results));

    let result_js = build_summary_js(&answers, &results);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(WritingJsonSnafu {})?;

    if let Some(out_path) = out {
        let mut w = open_output(Some(out_path))?;
        writeln!(w, "{}", pretty_js_stats).context(WritingFileSnafu { path: out_path })?;
        w.flush().context(WritingFileSnafu { path: out_path })?;
    }

    if let Some(reference_path) = reference {
        check_reference(&pretty_js_stats, reference_path)?;
    }
    Ok(result_js)
}

pub fn run_export(
    settings: &RunSettings,
    variables: &[String],
    long: bool,
    statement: bool,
    out: Option<&str>,
) -> VaaResult<()> {
    let vars = variables
        .iter()
        .map(|s| -> VaaResult<Variable> {
            match s.parse::<Variable>() {
                Ok(v) => Ok(v),
                Err(msg) => whatever!("{}", msg),
            }
        })
        .collect::<VaaResult<Vec<Variable>>>()?;
    let calc = io_json::load_calculator(settings)?;
    let w = open_output(out)?;
    if long {
        io_csv::write_long(calc.store(), &vars, statement, w)
    } else {
        match vars.as_slice() {
            [v] => io_csv::write_wide(calc.store(), *v, statement, w),
            _ => whatever!(
                "The wide format takes exactly one variable, got {}",
                vars.len()
            ),
        }
    }
}

pub fn run_stability(
    settings: &RunSettings,
    config: Option<&VaaConfig>,
    sim: &SimulationArgs,
    out: Option<&str>,
) -> VaaResult<()> {
    let params = merge_simulation(config, sim);
    let calc = io_json::load_calculator(settings)?;
    let mut rng = StdRng::seed_from_u64(params.seed);
    let rows = simulation::party_stability(&calc, &params, &mut rng)?;
    simulation::write_stability(&rows, open_output(out)?)
}

pub fn run_random_winners(
    settings: &RunSettings,
    config: Option<&VaaConfig>,
    sim: &SimulationArgs,
    out: Option<&str>,
) -> VaaResult<()> {
    let params = merge_simulation(config, sim);
    let calc = io_json::load_calculator(settings)?;
    let mut rng = StdRng::seed_from_u64(params.seed);
    let rows = simulation::random_winners(&calc, &params, &mut rng)?;
    simulation::write_random_winners(&rows, open_output(out)?)
}

/// Writes the opinion and weight matrices, then runs both simulations with a single
/// generator, in this order.
pub fn run_tables(
    settings: &RunSettings,
    config: Option<&VaaConfig>,
    sim: &SimulationArgs,
    out_dir: Option<&str>,
) -> VaaResult<()> {
    let params = merge_simulation(config, sim);
    let dir = out_dir.unwrap_or(settings.output_directory.as_str());
    ensure_directory(dir)?;
    let prefix = settings.table_prefix();
    let calc = io_json::load_calculator(settings)?;

    let open = |suffix: &str| -> VaaResult<Box<dyn Write>> {
        let p = table_path(dir, &prefix, suffix).display().to_string();
        open_output(Some(p.as_str()))
    };

    io_csv::write_wide(calc.store(), Variable::Opinion, false, open("answers")?)?;
    io_csv::write_wide(calc.store(), Variable::Weight, false, open("weights")?)?;

    let mut rng = StdRng::seed_from_u64(params.seed);
    let stability = simulation::party_stability(&calc, &params, &mut rng)?;
    simulation::write_stability(&stability, open("party_stability")?)?;
    let winners = simulation::random_winners(&calc, &params, &mut rng)?;
    simulation::write_random_winners(&winners, open("random_winner")?)?;
    info!("Tables {}_* written to {:?}", prefix, dir);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_DATABASE: &str =
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/sample_database.json");
    const SAMPLE_REFERENCE: &str = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/data/sample_reference_aaaa.json"
    );

    fn french_settings() -> RunSettings {
        RunSettings {
            database: SAMPLE_DATABASE.to_string(),
            levels: vec!["base".to_string()],
            language: Language::French,
            output_directory: std::env::temp_dir().display().to_string(),
        }
    }

    #[test]
    fn score_matches_the_reference() {
        let js = run_score(&french_settings(), "aaaa", true, None, Some(SAMPLE_REFERENCE)).unwrap();
        let results = js["results"].as_object().unwrap();
        let parties: Vec<&String> = results.keys().collect();
        assert_eq!(
            parties,
            vec!["PTB", "MR", "Ecolo", "Défi", "PS", "Les Engagés"]
        );
        assert_eq!(results["PTB"], json!(80));
    }

    #[test]
    fn score_detects_reference_differences() {
        let res = run_score(&french_settings(), "dddd", true, None, Some(SAMPLE_REFERENCE));
        assert!(matches!(res, Err(VaaError::ReferenceMismatch { .. })));
    }

    #[test]
    fn summary_is_written_to_the_output_file() {
        let path = std::env::temp_dir().join("electest_score_summary.json");
        let path_s = path.display().to_string();
        let js = run_score(&french_settings(), "aaaa", true, Some(path_s.as_str()), None).unwrap();
        let written = read_summary(&path_s).unwrap();
        assert_eq!(written, js);
        assert_eq!(written["answers"], json!("aaaa"));
        assert_eq!(written["results"]["Les Engagés"], json!(50));
        // The file passes as a reference for the same answers.
        run_score(&french_settings(), "aaaa", true, None, Some(path_s.as_str())).unwrap();
    }

    #[test]
    fn unrounded_scores_are_floats() {
        let js = run_score(&french_settings(), "Aaaa", false, None, None).unwrap();
        let defi = js["results"]["Défi"].as_f64().unwrap();
        assert!((defi - 62.5).abs() < 1e-9);
    }

    #[test]
    fn wrong_answers_are_reported() {
        let res = run_score(&french_settings(), "aaa", true, None, None);
        assert!(matches!(
            res,
            Err(VaaError::Matching {
                source: MatchingError::WrongLength { .. }
            })
        ));
    }

    #[test]
    fn wide_export_takes_one_variable() {
        let vars = vec!["opinion".to_string(), "weight".to_string()];
        let res = run_export(&french_settings(), &vars, false, false, None);
        assert!(matches!(res, Err(VaaError::Whatever { .. })));
        let bad = vec!["colour".to_string()];
        assert!(run_export(&french_settings(), &bad, true, false, None).is_err());
    }

    #[test]
    fn tables_are_written() {
        let dir = std::env::temp_dir().join("electest_tables_test");
        let dir_s = dir.display().to_string();
        let sim = SimulationArgs {
            seed: Some(1),
            trials: Some(5),
            changes: Some(1),
            folds: Some(2),
        };
        run_tables(&french_settings(), None, &sim, Some(dir_s.as_str())).unwrap();
        for suffix in ["answers", "weights", "party_stability", "random_winner"] {
            let p = table_path(&dir_s, "base_french", suffix);
            let contents = fs::read_to_string(&p).unwrap();
            assert!(contents.lines().count() > 1, "{:?} is empty", p);
        }
        let stability =
            fs::read_to_string(table_path(&dir_s, "base_french", "party_stability")).unwrap();
        // Header + 6 parties x 5 trials.
        assert_eq!(stability.lines().count(), 31);
        assert_eq!(stability.lines().next(), Some("from_party,to_party"));
    }
}
