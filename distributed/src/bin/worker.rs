use distributed::{
    run_map, run_reduce,
    service::{map_reduce_client::*, task::Inner, *},
    ADDR, OUT_DIR,
};
use eyre::Result;
use log::{info, warn};
use rand::{thread_rng, Rng};
use std::{env, path::PathBuf, process, time::Duration};
use structopt::StructOpt;
use tokio::time;
use vocab::init_logger;

#[derive(StructOpt, Debug)]
struct Opt {
    #[structopt(short, long, default_value = ADDR)]
    connect: String,
    #[structopt(short, long, default_value = OUT_DIR)]
    out_dir: PathBuf,
}

struct Worker {
    opt: Opt,
    id: String,
    client: MapReduceClient<tonic::transport::Channel>,
}

async fn maybe_crash() {
    if env::var("CRASH").unwrap_or_default() != "1" {
        return;
    }
    let rr = thread_rng().gen_range(0..1000);
    if rr < 330 {
        warn!("crash");
        process::exit(1);
    } else if rr < 660 {
        let ms = thread_rng().gen_range(0..10000);
        warn!("stall for {}ms", ms);
        time::sleep(Duration::from_millis(ms)).await;
    }
}

impl Worker {
    pub fn new(opt: Opt, client: MapReduceClient<tonic::transport::Channel>) -> Self {
        let id = process::id().to_string();
        Self { opt, id, client }
    }

    pub async fn run(mut self) -> Result<()> {
        loop {
            let PollTaskReply { task, shutdown } = self
                .client
                .poll_task(PollTaskRequest {})
                .await?
                .into_inner();

            if shutdown {
                info!("worker {}: shutdown", self.id);
                return Ok(());
            }

            match task {
                Some(task) => {
                    info!("worker {}: task {:?}", self.id, task);
                    maybe_crash().await;
                    let complete = match task.inner.clone() {
                        Some(Inner::MapTask(map)) => CompleteTaskRequest {
                            reduce_files: run_map(map, &self.opt.out_dir).await?,
                            task: Some(task),
                            top: Vec::new(),
                        },
                        Some(Inner::ReduceTask(reduce)) => CompleteTaskRequest {
                            top: run_reduce(reduce).await?,
                            task: Some(task),
                            reduce_files: Default::default(),
                        },
                        None => unreachable!(),
                    };

                    self.client.complete_task(complete).await?;
                    info!("worker {}: task completed", self.id);
                }
                None => {
                    time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();

    let opt = Opt::from_args();
    let addr = format!("http://{}", opt.connect);
    let client = MapReduceClient::connect(addr).await?;

    Worker::new(opt, client).run().await
}
