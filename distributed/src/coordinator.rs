use dashmap::DashMap;
use eyre::Result;
use log::{info, warn};
use std::{mem, path::PathBuf, sync::Arc, time::Duration};
use tokio::{
    fs,
    sync::{oneshot, Mutex},
    task::JoinHandle,
    time,
};
use tonic::{Request, Response, Status};
use vocab::{format, CountEntry, Merge, TopK};
use crate::{
    service::{map_reduce_server::MapReduce, task::Inner, *},
    task_id, Queue,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub input_files: Vec<PathBuf>,
    pub n_reduce: u64,
    pub num_words: usize,
    pub output: PathBuf,
    pub task_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Map,
    Reduce,
    Done,
}

type TaskId = String;
type TaskMap = DashMap<TaskId, Task>;

// Every task state change happens under the `stage` lock.
#[derive(Debug)]
pub struct Coordinator {
    config: Config,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,

    stage: Arc<Mutex<Stage>>,
    pending_tasks: Arc<Queue<Task>>,
    running_tasks: Arc<TaskMap>,
    reduce_files: DashMap<u64, Vec<String>>,
    ranked: Mutex<TopK>,

    retry_handlers: Arc<DashMap<TaskId, JoinHandle<()>>>,
}

impl Coordinator {
    fn init_map(&self) {
        let n_reduce = self.config.n_reduce.max(1);
        let map_tasks = self
            .config
            .input_files
            .iter()
            .enumerate()
            .map(|(i, path)| MapTask {
                index: i as u64,
                files: vec![path.to_string_lossy().into_owned()],
                n_reduce,
            });

        for task in map_tasks {
            self.enqueue(Inner::MapTask(task));
        }
    }

    fn init_reduce(&self) {
        let reduce_tasks = self.reduce_files.iter().map(|pair| ReduceTask {
            index: *pair.key(),
            files: pair.value().clone(),
            num_words: self.config.num_words as u64,
        });

        for task in reduce_tasks {
            self.enqueue(Inner::ReduceTask(task));
        }
    }

    fn enqueue(&self, inner: Inner) {
        let task = Task {
            id: task_id(),
            inner: Some(inner),
        };
        if !self.pending_tasks.push(task) {
            warn!("task queue full");
        }
    }

    pub fn new(config: Config, shutdown: oneshot::Sender<()>) -> Self {
        let task_capacity = config.input_files.len() + config.n_reduce.max(1) as usize + 5;
        let num_words = config.num_words;

        let this = Self {
            config,
            shutdown: Mutex::new(Some(shutdown)),
            stage: Arc::new(Mutex::new(Stage::Map)),
            pending_tasks: Arc::new(Queue::new(task_capacity)),
            running_tasks: Arc::new(TaskMap::new()),
            reduce_files: DashMap::new(),
            ranked: Mutex::new(TopK::new(num_words)),
            retry_handlers: Arc::new(DashMap::new()),
        };
        this.init_map();
        this
    }

    pub async fn start(&self) -> Result<()> {
        let mut stage = self.stage.lock().await;
        self.advance(&mut stage).await
    }

    pub async fn stage(&self) -> Stage {
        *self.stage.lock().await
    }
}

impl Coordinator {
    fn spawn_retry(&self, task: &Task) {
        let id = task.id.clone();
        let timeout = self.config.task_timeout;

        let stage = Arc::clone(&self.stage);
        let pending = Arc::clone(&self.pending_tasks);
        let running = Arc::clone(&self.running_tasks);
        let handlers = Arc::clone(&self.retry_handlers);

        let handler = tokio::spawn(async move {
            time::sleep(timeout).await;
            let _stage = stage.lock().await;
            handlers.remove(&id);
            if let Some((_, mut task)) = running.remove(&id) {
                info!("task timeout: {:?}", task);
                task.id = task_id();
                pending.push(task);
            }
        });

        self.retry_handlers.insert(task.id.clone(), handler);
    }

    async fn advance(&self, stage: &mut Stage) -> Result<()> {
        while self.pending_tasks.is_empty() && self.running_tasks.is_empty() {
            match *stage {
                Stage::Map => {
                    info!("map done, init reduce");
                    info!("reduce_files: {:?}", self.reduce_files);
                    self.init_reduce();
                    *stage = Stage::Reduce;
                }
                Stage::Reduce => {
                    info!("all done");
                    self.write_output().await?;
                    *stage = Stage::Done;
                    self.shutdown().await;
                }
                Stage::Done => break,
            }
        }
        Ok(())
    }

    async fn write_output(&self) -> Result<()> {
        let output = &self.config.output;
        if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }
        let ranked = self.ranked.lock().await;
        fs::write(output, format(&ranked)).await?;
        info!("wrote {} words to {:?}", ranked.len(), output);
        Ok(())
    }

    async fn merge_ranked(&self, top: Vec<RankedEntry>) {
        let list = TopK::select(top.into_iter().map(CountEntry::from), self.config.num_words);
        let mut ranked = self.ranked.lock().await;
        let current = mem::replace(&mut *ranked, TopK::new(self.config.num_words));
        *ranked = current.merge(list);
    }

    async fn shutdown(&self) {
        let mut inner = self.shutdown.lock().await;
        if let Some(sender) = inner.take() {
            let _ = sender.send(());
        }
    }
}

#[tonic::async_trait]
impl MapReduce for Coordinator {
    async fn poll_task(
        &self,
        _request: Request<PollTaskRequest>,
    ) -> Result<Response<PollTaskReply>, Status> {
        let stage = self.stage.lock().await;
        let reply = match self.pending_tasks.pop() {
            Some(task) => {
                assert!(
                    (*stage == Stage::Reduce)
                        ^ matches!(task.inner, Some(Inner::MapTask(_)))
                );

                self.running_tasks.insert(task.id.clone(), task.clone());
                self.spawn_retry(&task);
                PollTaskReply {
                    task: Some(task),
                    shutdown: false,
                }
            }
            None => PollTaskReply {
                task: None,
                shutdown: *stage == Stage::Done,
            },
        };

        info!("poll task reply: {:?}", reply);
        Ok(Response::new(reply))
    }

    async fn complete_task(
        &self,
        request: Request<CompleteTaskRequest>,
    ) -> Result<Response<CompleteTaskReply>, Status> {
        let CompleteTaskRequest {
            task,
            reduce_files,
            top,
        } = request.into_inner();
        let task = task.ok_or_else(|| Status::invalid_argument("missing task"))?;

        let mut stage = self.stage.lock().await;

        // Only the live attempt of a task counts; a retried shard is merged once.
        if self.running_tasks.remove(&task.id).is_none() {
            info!("stale completion ignored: {}", task.id);
            return Ok(Response::new(CompleteTaskReply {}));
        }
        if let Some((_, handler)) = self.retry_handlers.remove(&task.id) {
            handler.abort()
        }
        info!("task done: {:?}", task);

        match task.inner {
            Some(Inner::MapTask(_)) => {
                for (reducer_index, file) in reduce_files {
                    self.reduce_files
                        .entry(reducer_index)
                        .or_default()
                        .push(file);
                }
            }
            Some(Inner::ReduceTask(_)) => self.merge_ranked(top).await,
            None => return Err(Status::invalid_argument("empty task")),
        }

        self.advance(&mut stage)
            .await
            .map_err(|e| Status::internal(e.to_string()))?;

        Ok(Response::new(CompleteTaskReply {}))
    }
}
