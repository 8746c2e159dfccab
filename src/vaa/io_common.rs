use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use snafu::prelude::*;

use crate::vaa::{VaaResult, WritingFileSnafu};

/// Opens the destination of an output: the standard output when nothing (or `stdout`) is
/// given, a file otherwise.
pub fn open_output(out: Option<&str>) -> VaaResult<Box<dyn Write>> {
    match out {
        None | Some("stdout") => Ok(Box::new(io::stdout())),
        Some(path) => {
            info!("Writing to {:?}", path);
            let f = File::create(path).context(WritingFileSnafu { path })?;
            Ok(Box::new(BufWriter::new(f)))
        }
    }
}

/// Location of a generated table, for instance `data/base_french_answers.csv`.
pub fn table_path(dir: &str, prefix: &str, suffix: &str) -> PathBuf {
    Path::new(dir).join(format!("{}_{}.csv", prefix, suffix))
}

pub fn ensure_directory(dir: &str) -> VaaResult<()> {
    fs::create_dir_all(dir).context(WritingFileSnafu { path: dir })
}
