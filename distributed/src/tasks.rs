use eyre::Result;
use futures::future::try_join_all;
use itertools::Itertools;
use log::info;
use std::{collections::HashMap, convert::TryFrom, path::Path};
use tokio::{
    fs::{self, read_to_string, File},
    io::AsyncWriteExt,
};
use uuid::Uuid;
use vocab::{codec, count_lines, merge_all, Counts, TopK};
use crate::service::{MapTask, RankedEntry, ReduceTask};

/// Counts one shard and writes its partial counts into one intermediate file
/// per reduce bucket under `out_dir`. Returns bucket index -> file.
pub async fn run_map(task: MapTask, out_dir: &Path) -> Result<HashMap<u64, String>> {
    let MapTask {
        index,
        files,
        n_reduce,
    } = task;
    let n_reduce = n_reduce.max(1);

    let contents = try_join_all(files.iter().map(|file| read_to_string(file))).await?;
    let counts = merge_all(
        Counts::new(),
        contents.iter().map(|content| count_lines(content.lines())),
    );
    info!(
        "map {}: {} tokens, {} distinct",
        index,
        counts.total(),
        counts.len()
    );

    fs::create_dir_all(out_dir).await?;
    let intermediate_files = (0..n_reduce)
        .map(|j| out_dir.join(format!("mr-{}-{}-{}", index, j, Uuid::new_v4())))
        .collect_vec();

    let buckets = counts.partition(n_reduce as usize);
    try_join_all(
        intermediate_files
            .iter()
            .zip(buckets)
            .map(|(path, bucket)| async move {
                let mut file = File::create(path).await?;
                file.write_all(codec::encode(&bucket).as_bytes()).await?;
                file.sync_all().await
            }),
    )
    .await?;

    Ok(intermediate_files
        .into_iter()
        .enumerate()
        .map(|(i, f)| (i as u64, f.to_string_lossy().into_owned()))
        .collect())
}

pub async fn run_reduce(task: ReduceTask) -> Result<Vec<RankedEntry>> {
    let ReduceTask {
        index,
        files,
        num_words,
    } = task;

    let contents = try_join_all(files.iter().map(|file| read_to_string(file))).await?;
    let partials = contents
        .iter()
        .map(|content| codec::decode(content))
        .collect::<Result<Vec<_>>>()?;
    let counts = merge_all(Counts::new(), partials);

    let distinct = counts.len();
    let limit = usize::try_from(num_words).unwrap_or(usize::MAX);
    let top = TopK::select(counts.finalize(), limit);
    info!("reduce {}: kept {} of {} keys", index, top.len(), distinct);

    Ok(top
        .into_entries()
        .into_iter()
        .map(RankedEntry::from)
        .collect())
}
