pub use eyre::Result;
use log::warn;
use std::convert::TryFrom;

pub mod codec;
mod counter;
mod format;
mod merge;
mod token;
mod topk;

#[cfg(test)]
mod testing;

pub use counter::{bucket, count_lines, par_count, CountEntry, Counts};
pub use format::format;
pub use merge::{merge_all, merge_tree, Merge};
pub use token::{normalize, tokenize, words};
pub use topk::TopK;

pub fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init()
}

pub fn word_limit(requested: i64) -> usize {
    if requested <= 0 {
        warn!("non-positive number of words {}, output will be empty", requested);
        return 0;
    }
    usize::try_from(requested).unwrap_or(usize::MAX)
}

pub fn top_words<I>(lines: I, limit: usize) -> TopK
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    TopK::select(count_lines(lines).finalize(), limit)
}
