use itertools::Itertools;
use log::info;
use std::{
    fs::{self, read_to_string},
    path::PathBuf,
};
use structopt::StructOpt;
use vocab::{count_lines, format, init_logger, par_count, word_limit, Result, TopK};

#[derive(StructOpt, Debug)]
struct Opt {
    #[structopt(short, long)]
    input_files: Vec<PathBuf>,
    #[structopt(short, long, default_value = "mr-out-0")]
    output_location: PathBuf,
    #[structopt(short = "n", long, default_value = "1000", allow_hyphen_values = true)]
    num_of_words: i64,
    /// Count on a thread pool of this many threads instead of the main thread
    #[structopt(short, long)]
    jobs: Option<usize>,
}

fn main() -> Result<()> {
    init_logger();

    let opt = Opt::from_args();
    let limit = word_limit(opt.num_of_words);

    let contents = opt
        .input_files
        .iter()
        .map(read_to_string)
        .collect::<std::io::Result<Vec<_>>>()?;
    let lines = contents.iter().flat_map(|c| c.lines()).collect_vec();

    let counts = match opt.jobs {
        Some(jobs) => rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()?
            .install(|| par_count(&lines)),
        None => count_lines(&lines),
    };
    info!(
        "{} lines, {} tokens, {} distinct",
        lines.len(),
        counts.total(),
        counts.len()
    );

    let top = TopK::select(counts.finalize(), limit);
    fs::write(&opt.output_location, format(&top))?;
    info!("wrote {} words to {:?}", top.len(), opt.output_location);

    Ok(())
}
