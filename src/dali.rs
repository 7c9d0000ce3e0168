//! Reading Dali structural similarity reports into record sets.
//!
//! A report lists one hit per line:
//!
//! ```text
//!     No:  Chain   Z    rmsd lali nres  %id Description
//!      1:  5xjh-A 57.5  0.0  285   285  100   MOLECULE: CARBOXYLESTERASE;
//! ```
//!
//! Every hit becomes a record of the `pdb` database identified by its chain
//! token. Reading stops at the structural equivalences section.

use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::construct::{Record, RecordSet};
use crate::error::{IdsetError, Result};

pub const DATABASE: &str = "pdb";
const EQUIVALENCES: &str = "# Structural equivalences";

lazy_static! {
    static ref HIT: Regex = Regex::new(
        r"^(\d+):\s*(\S+)\s+(\S+)\s+(\S+)\s+(\S+)\s+(\S+)\s+(\S+)(?:\s+(.*))?$"
    )
    .expect("hit pattern");
    static ref SUBSET: Regex = Regex::new(r"^[^-]*-([^.-]*)").expect("subset pattern");
}

fn field<T: std::str::FromStr>(token: &str, name: &str, line: usize) -> Result<T> {
    token.parse::<T>().map_err(|_| IdsetError::Parse {
        message: format!("'{}' is not a valid {}", token, name),
        line: Some(line),
    })
}

fn parse_hit(text: &str, line: usize) -> Result<Record> {
    let captures = HIT.captures(text).ok_or_else(|| IdsetError::Parse {
        message: format!("unrecognized hit: {}", text),
        line: Some(line),
    })?;
    let chain = &captures[2];
    let (pdb_id, chain_suffix) = match chain.split_once('-') {
        Some((pdb_id, suffix)) => (pdb_id, Some(suffix)),
        None => (chain, None),
    };
    let description = captures
        .get(8)
        .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();

    let mut record = Record::new(DATABASE, chain).with("_pdbId", pdb_id);
    if let Some(suffix) = chain_suffix {
        record.set_attribute("_chain", suffix);
    }
    record.set_attribute(
        "_PDBLink",
        format!("https://www.rcsb.org/structure/{}", pdb_id),
    );
    record.set_attribute("_DaliZscore", field::<f64>(&captures[3], "Z-score", line)?);
    record.set_attribute("_DaliRMSD", field::<f64>(&captures[4], "RMSD", line)?);
    record.set_attribute(
        "_DaliSuperpositionLength",
        field::<i64>(&captures[5], "superposition length", line)?,
    );
    record.set_attribute(
        "_DaliSeqLength",
        field::<i64>(&captures[6], "sequence length", line)?,
    );
    record.set_attribute(
        "_DaliSeqIdentity",
        field::<f64>(&captures[7], "sequence identity", line)?,
    );
    record.set_attribute("_DaliDescription", description);
    Ok(record)
}

pub fn parse_report(text: &str) -> Result<RecordSet> {
    let mut set = RecordSet::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with(EQUIVALENCES) {
            break;
        }
        if line.starts_with('#') {
            continue;
        }
        set.push(parse_hit(line, number + 1)?);
    }
    debug!(hits = set.len(), "parsed Dali report");
    Ok(set)
}

/// The subset a report file belongs to, e.g. `90` for `s001A-90.txt`.
pub fn subset_of(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| SUBSET.captures(name))
        .map(|captures| captures[1].to_string())
        .unwrap_or_default()
}

/// Reads a report file into a set named after its subset.
pub fn read_report<P: AsRef<Path>>(path: P) -> Result<RecordSet> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let mut set = parse_report(&text)?;
    set.set_name(format!("dali{}", subset_of(path)));
    Ok(set)
}
