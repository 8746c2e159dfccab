// Writing the questionnaire tables in CSV format.

use std::io::Write;
use std::str::FromStr;

use csv::Writer;
use log::debug;
use party_matching::{PartyIndex, PartyOpinion, Question, QuestionStore};
use snafu::prelude::*;

use crate::vaa::{CsvWriteSnafu, VaaResult};

/// A column of the party opinions that can be exported.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Variable {
    Opinion,
    Weight,
    Description,
}

impl Variable {
    pub fn name(&self) -> &'static str {
        match self {
            Variable::Opinion => "opinion",
            Variable::Weight => "weight",
            Variable::Description => "description",
        }
    }

    fn cell(&self, po: Option<&PartyOpinion>) -> String {
        match (self, po) {
            (_, None) => String::new(),
            (Variable::Opinion, Some(po)) => po.opinion.label().to_string(),
            (Variable::Weight, Some(po)) => po.weight.to_string(),
            (Variable::Description, Some(po)) => po.description.clone().unwrap_or_default(),
        }
    }
}

impl FromStr for Variable {
    type Err = String;

    fn from_str(s: &str) -> Result<Variable, String> {
        match s {
            "opinion" => Ok(Variable::Opinion),
            "weight" => Ok(Variable::Weight),
            "description" => Ok(Variable::Description),
            x => Err(format!(
                "unknown variable {:?} (expected opinion, weight or description)",
                x
            )),
        }
    }
}

fn header_prefix(with_statement: bool) -> Vec<String> {
    let mut h: Vec<String> = vec!["question".to_string(), "id".to_string(), "short".to_string()];
    if with_statement {
        h.push("statement".to_string());
    }
    h
}

fn row_prefix(idx: usize, q: &Question, with_statement: bool) -> Vec<String> {
    let mut r = vec![PartyIndex::question_label(idx), q.id.clone(), q.short.clone()];
    if with_statement {
        r.push(q.statement.clone());
    }
    r
}

pub fn write_records<W: Write>(
    header: &[String],
    rows: impl Iterator<Item = Vec<String>>,
    out: W,
) -> VaaResult<()> {
    let mut wtr = Writer::from_writer(out);
    wtr.write_record(header).context(CsvWriteSnafu {})?;
    let mut count = 0;
    for row in rows {
        wtr.write_record(&row).context(CsvWriteSnafu {})?;
        count += 1;
    }
    wtr.flush()
        .map_err(csv::Error::from)
        .context(CsvWriteSnafu {})?;
    debug!("write_records: {} rows", count);
    Ok(())
}

/// One row per question, one column per party of the roster.
pub fn write_wide<W: Write>(
    store: &QuestionStore,
    variable: Variable,
    with_statement: bool,
    out: W,
) -> VaaResult<()> {
    let parties = store.roster().parties();
    let mut header = header_prefix(with_statement);
    header.extend(parties.iter().cloned());
    let rows = store.questions().iter().enumerate().map(|(idx, q)| {
        let mut r = row_prefix(idx, q, with_statement);
        r.extend(parties.iter().map(|p| variable.cell(q.opinion_of(p))));
        r
    });
    write_records(&header, rows, out)
}

/// One row per question, variable and party.
pub fn write_long<W: Write>(
    store: &QuestionStore,
    variables: &[Variable],
    with_statement: bool,
    out: W,
) -> VaaResult<()> {
    let parties = store.roster().parties();
    let mut header = header_prefix(with_statement);
    header.extend(["variable", "party", "value"].iter().map(|s| s.to_string()));
    let rows = store
        .questions()
        .iter()
        .enumerate()
        .flat_map(move |(idx, q)| {
            variables.iter().flat_map(move |v| {
                parties.iter().map(move |p| {
                    let mut r = row_prefix(idx, q, with_statement);
                    r.push(v.name().to_string());
                    r.push(p.clone());
                    r.push(v.cell(q.opinion_of(p)));
                    r
                })
            })
        });
    write_records(&header, rows, out)
}
