//! Text form of partial counts exchanged between map and reduce tasks.
//!
//! Each line is `<key> <count>`. Keys come from whitespace splitting and never
//! contain a space, so a line splits at its last space; the empty key encodes
//! as ` <count>`.

use eyre::{eyre, WrapErr};
use crate::{Counts, Result};

pub fn encode(counts: &Counts) -> String {
    counts
        .iter()
        .map(|(key, count)| format!("{} {}\n", key, count))
        .collect()
}

pub fn decode_line(line: &str) -> Result<(String, u64)> {
    let (key, count) = line
        .rsplit_once(' ')
        .ok_or_else(|| eyre!("malformed count line: {:?}", line))?;
    let count = count
        .parse::<u64>()
        .wrap_err_with(|| format!("bad count in line: {:?}", line))?;
    Ok((key.to_owned(), count))
}

// Repeated keys are summed.
pub fn decode(content: &str) -> Result<Counts> {
    let mut counts = Counts::new();
    for line in content.lines() {
        let (key, count) = decode_line(line)?;
        counts.add(key, count);
    }
    Ok(counts)
}
