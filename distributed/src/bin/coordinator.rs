use distributed::{
    service::map_reduce_server::MapReduceServer, Config, Coordinator, ADDR, TASK_TIMEOUT,
};
use eyre::Result;
use std::{path::PathBuf, time::Duration};
use structopt::StructOpt;
use tokio::{sync::oneshot, time};
use tonic::transport::Server;
use vocab::{init_logger, word_limit};

#[derive(StructOpt, Debug)]
pub struct Opt {
    #[structopt(short = "r", long, default_value = "10")]
    n_reduce: u64,
    #[structopt(short = "n", long, default_value = "1000", allow_hyphen_values = true)]
    num_of_words: i64,
    #[structopt(short, long, default_value = "out/words.csv")]
    output_location: PathBuf,
    #[structopt(short, long)]
    input_files: Vec<PathBuf>,
}

impl Opt {
    fn into_config(self) -> Config {
        Config {
            input_files: self.input_files,
            n_reduce: self.n_reduce,
            num_words: word_limit(self.num_of_words),
            output: self.output_location,
            task_timeout: TASK_TIMEOUT,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();

    let opt = Opt::from_args();
    let (tx, rx) = oneshot::channel::<()>();
    let coordinator = Coordinator::new(opt.into_config(), tx);
    coordinator.start().await?;

    let server = MapReduceServer::new(coordinator);
    let addr = ADDR.parse()?;
    Server::builder()
        .add_service(server)
        .serve_with_shutdown(addr, async move {
            rx.await.ok();
            time::sleep(Duration::from_millis(1000)).await;
        })
        .await?;
    Ok(())
}
