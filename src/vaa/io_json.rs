// Reading the questionnaire datasets.

use std::fs;

use log::{debug, info};
use party_matching::{
    Calculator, MatchingError, Opinion, PartyOpinion, Question, QuestionStore,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;

use crate::vaa::config_reader::RunSettings;
use crate::vaa::{
    MatchingSnafu, OpeningJsonSnafu, ParsingJsonIdSnafu, ParsingJsonSnafu, VaaResult,
};

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct JsonParty {
    pub name: String,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct JsonPartyOpinion {
    pub party: JsonParty,
    pub opinion: String,
    pub weight: f64,
    pub description: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct JsonQuestion {
    pub id: JSValue,
    #[serde(default)]
    pub short: String,
    #[serde(default)]
    pub statement: String,
    #[serde(rename = "level")]
    pub levels: Vec<String>,
    #[serde(rename = "partyOpinions")]
    pub party_opinions: Vec<JsonPartyOpinion>,
}

pub fn read_questions(path: &str) -> VaaResult<Vec<Question>> {
    info!("Attempting to read questionnaire {:?}", path);
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    parse_questions(contents.as_str(), path)
}

pub fn parse_questions(contents: &str, path: &str) -> VaaResult<Vec<Question>> {
    let records: Vec<JsonQuestion> =
        serde_json::from_str(contents).context(ParsingJsonSnafu { path })?;
    debug!("parse_questions: {} records in {:?}", records.len(), path);
    records
        .into_iter()
        .enumerate()
        .map(|(position, jq)| to_question(position, jq))
        .collect()
}

fn to_question(position: usize, jq: JsonQuestion) -> VaaResult<Question> {
    let id = read_js_id(position, &jq.id)?;
    let mut party_opinions: Vec<PartyOpinion> = Vec::new();
    for jpo in jq.party_opinions {
        let opinion = match Opinion::parse_label(&jpo.opinion) {
            Some(o) => o,
            None => {
                return Err(MatchingError::DataIntegrity {
                    question_id: id,
                    message: format!(
                        "unknown opinion {:?} for party {:?}",
                        jpo.opinion, jpo.party.name
                    ),
                })
                .context(MatchingSnafu {});
            }
        };
        party_opinions.push(PartyOpinion {
            party: jpo.party.name,
            opinion,
            weight: jpo.weight,
            description: jpo.description,
        });
    }
    Ok(Question {
        id,
        short: jq.short,
        statement: jq.statement,
        levels: jq.levels,
        party_opinions,
    })
}

// Identifiers are numbers in the published datasets, but strings are accepted too.
fn read_js_id(position: usize, x: &JSValue) -> VaaResult<String> {
    match x {
        JSValue::Number(n) => Ok(n.to_string()),
        JSValue::String(s) => Ok(s.clone()),
        _ => ParsingJsonIdSnafu {
            position,
            content: x.to_string(),
        }
        .fail(),
    }
}

/// Reads and filters the questionnaire of a run, then derives the party profiles.
pub fn load_calculator(settings: &RunSettings) -> VaaResult<Calculator> {
    let records = read_questions(&settings.database)?;
    let roster = settings.language.roster();
    let store =
        QuestionStore::load(records, &settings.levels, &roster).context(MatchingSnafu {})?;
    info!(
        "Loaded {} questions for {} ({} parties)",
        store.num_questions(),
        settings.language.name(),
        roster.len()
    );
    Ok(Calculator::new(store))
}
