//! The demand-driven scheduler: an append-only node graph executed by
//! a fixed worker pool.
//!
//! Workers pull ready nodes from a crossbeam job channel; graph state
//! lives behind one mutex, and `await` blocks the *calling* thread on
//! a condvar until the requested node settles. No node runs until
//! something downstream demands its result; a demanded node runs at
//! most once, and its result is shared by every dependent.

use crossbeam_channel::{Receiver, Sender};
use indexmap::IndexMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::JoinHandle;

use strata_core::{MaskError, NoopObserver, PipelineError, PipelineObserver};

use crate::node::{Node, NodeId, NodeInputs, NodeState, NodeValue};

/// Configuration for [`Pipeline::new`].
pub struct PipelineConfig {
    /// Worker thread count. Zero is clamped to one.
    pub workers: usize,
    /// Receives node lifecycle events; defaults to a no-op.
    pub observer: Arc<dyn PipelineObserver>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(usize::from)
                .unwrap_or(1),
            observer: Arc::new(NoopObserver),
        }
    }
}

/// A job handed to the worker pool.
enum Job {
    Run(NodeId),
    Stop,
}

/// Append-only node list plus the name registry.
struct Graph<M> {
    nodes: Vec<Node<M>>,
    latest: IndexMap<String, NodeId>,
    shutdown: bool,
}

/// Shared scheduler state: the graph, the completion condvar, and the
/// job channel feeding the workers.
pub(crate) struct Core<M: NodeValue> {
    graph: Mutex<Graph<M>>,
    settled: Condvar,
    jobs: Sender<Job>,
    observer: Arc<dyn PipelineObserver>,
}

impl<M: NodeValue> Core<M> {
    /// Lock the graph, escalating a poisoned lock (a panicked node
    /// closure) into a pipeline-fatal panic, per the no-partial-failure
    /// contract.
    fn lock(&self) -> MutexGuard<'_, Graph<M>> {
        match self.graph.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("a pipeline node panicked; the pipeline cannot continue"),
        }
    }

    /// Append a node and return its id. The node stays `Pending` until
    /// demanded.
    pub(crate) fn add_node<F>(&self, name: &str, deps: Vec<NodeId>, op: F) -> NodeId
    where
        F: FnOnce(&NodeInputs<M>) -> Result<M, MaskError> + Send + 'static,
    {
        let mut graph = self.lock();
        let id = NodeId(graph.nodes.len() as u32);
        for dep in &deps {
            graph.nodes[dep.0 as usize].dependents.push(id);
        }
        graph
            .nodes
            .push(Node::new(name.to_string(), deps, Box::new(op)));
        graph.latest.insert(name.to_string(), id);
        self.observer.node_added(name);
        id
    }

    /// The most recently appended node carrying `name`.
    pub(crate) fn latest_node(&self, name: &str) -> Option<NodeId> {
        self.lock().latest.get(name).copied()
    }

    /// Block until `id` settles; return its shared result.
    pub(crate) fn await_node(&self, id: NodeId) -> Result<Arc<M>, PipelineError> {
        let mut graph = self.lock();
        self.demand(&mut graph, id);
        let idx = id.0 as usize;
        loop {
            match graph.nodes[idx].state {
                NodeState::Done => {
                    return match graph.nodes[idx].result.clone() {
                        Some(result) => Ok(result),
                        None => Err(PipelineError::DependencyNotReady {
                            name: graph.nodes[idx].name.clone(),
                        }),
                    };
                }
                NodeState::Failed => {
                    return Err(graph.nodes[idx]
                        .error
                        .clone()
                        .unwrap_or(PipelineError::ShutDown));
                }
                _ => {
                    if graph.shutdown {
                        return Err(PipelineError::ShutDown);
                    }
                    graph = match self.settled.wait(graph) {
                        Ok(guard) => guard,
                        Err(_) => {
                            panic!("a pipeline node panicked; the pipeline cannot continue")
                        }
                    };
                }
            }
        }
    }

    /// Mark `id` and its transitive dependencies demanded, queueing
    /// every node that is already ready.
    fn demand(&self, graph: &mut Graph<M>, id: NodeId) {
        let mut stack = vec![id];
        let mut newly_demanded = Vec::new();
        while let Some(i) = stack.pop() {
            let node = &mut graph.nodes[i.0 as usize];
            if node.demanded {
                continue;
            }
            node.demanded = true;
            stack.extend(node.deps.iter().copied());
            newly_demanded.push(i);
        }
        for i in newly_demanded {
            self.try_queue(graph, i);
        }
    }

    /// Queue a pending, demanded node whose dependencies are all done.
    /// A failed dependency fails the node instead.
    fn try_queue(&self, graph: &mut Graph<M>, id: NodeId) {
        let idx = id.0 as usize;
        if graph.nodes[idx].state != NodeState::Pending || !graph.nodes[idx].demanded {
            return;
        }
        let deps = graph.nodes[idx].deps.clone();
        for dep in &deps {
            match graph.nodes[dep.0 as usize].state {
                NodeState::Done => {}
                NodeState::Failed => {
                    let error = PipelineError::DependencyFailed {
                        name: graph.nodes[idx].name.clone(),
                        upstream: graph.nodes[dep.0 as usize].name.clone(),
                    };
                    self.fail_node(graph, id, error);
                    return;
                }
                _ => return,
            }
        }
        graph.nodes[idx].state = NodeState::Queued;
        let _ = self.jobs.send(Job::Run(id));
    }

    /// Mark a node failed and propagate the failure through every
    /// transitive dependent that has not already settled.
    fn fail_node(&self, graph: &mut Graph<M>, id: NodeId, error: PipelineError) {
        let mut stack = vec![(id, error)];
        while let Some((i, error)) = stack.pop() {
            let idx = i.0 as usize;
            if matches!(
                graph.nodes[idx].state,
                NodeState::Done | NodeState::Failed
            ) {
                continue;
            }
            graph.nodes[idx].state = NodeState::Failed;
            graph.nodes[idx].error = Some(error);
            graph.nodes[idx].op = None;
            self.observer.node_failed(&graph.nodes[idx].name);
            let upstream = graph.nodes[idx].name.clone();
            for dep in graph.nodes[idx].dependents.clone() {
                let name = graph.nodes[dep.0 as usize].name.clone();
                stack.push((
                    dep,
                    PipelineError::DependencyFailed {
                        name,
                        upstream: upstream.clone(),
                    },
                ));
            }
        }
    }

    /// Execute one queued node on the calling worker thread.
    fn execute(&self, id: NodeId) {
        let idx = id.0 as usize;
        let (op, inputs, name) = {
            let mut graph = self.lock();
            if graph.nodes[idx].state != NodeState::Queued {
                return;
            }
            graph.nodes[idx].state = NodeState::Running;
            let name = graph.nodes[idx].name.clone();
            let deps = graph.nodes[idx].deps.clone();
            let op = graph.nodes[idx].op.take();
            let mut inputs = Vec::with_capacity(deps.len());
            for dep in &deps {
                match &graph.nodes[dep.0 as usize].result {
                    Some(result) => inputs.push(result.clone()),
                    None => {
                        self.fail_node(
                            &mut graph,
                            id,
                            PipelineError::DependencyNotReady { name: name.clone() },
                        );
                        self.settled.notify_all();
                        return;
                    }
                }
            }
            let op = match op {
                Some(op) => op,
                None => {
                    self.fail_node(
                        &mut graph,
                        id,
                        PipelineError::DependencyNotReady { name: name.clone() },
                    );
                    self.settled.notify_all();
                    return;
                }
            };
            (op, NodeInputs::new(inputs), name)
        };

        self.observer.node_started(&name);
        let outcome = op(&inputs);

        let mut graph = self.lock();
        match outcome {
            Ok(value) => {
                self.observer.node_completed(&name, value.size());
                graph.nodes[idx].result = Some(Arc::new(value));
                graph.nodes[idx].state = NodeState::Done;
                for dep in graph.nodes[idx].dependents.clone() {
                    self.try_queue(&mut graph, dep);
                }
            }
            Err(reason) => {
                self.fail_node(
                    &mut graph,
                    id,
                    PipelineError::NodeFailed { name, reason },
                );
            }
        }
        self.settled.notify_all();
    }
}

fn worker_loop<M: NodeValue>(core: Arc<Core<M>>, jobs: Receiver<Job>) {
    while let Ok(job) = jobs.recv() {
        match job {
            Job::Run(id) => core.execute(id),
            Job::Stop => break,
        }
    }
}

/// A deferred-execution pipeline over values of type `M`.
///
/// Owns the worker pool; dropping the pipeline shuts the workers down
/// and fails any still-unsettled `await` with
/// [`PipelineError::ShutDown`]. Handles keep the shared graph alive, so
/// results already computed stay readable.
pub struct Pipeline<M: NodeValue> {
    core: Arc<Core<M>>,
    workers: Vec<JoinHandle<()>>,
}

impl<M: NodeValue> Pipeline<M> {
    /// Spawn a pipeline with the given worker pool.
    pub fn new(config: PipelineConfig) -> Self {
        let (jobs, job_rx) = crossbeam_channel::unbounded();
        let core = Arc::new(Core {
            graph: Mutex::new(Graph {
                nodes: Vec::new(),
                latest: IndexMap::new(),
                shutdown: false,
            }),
            settled: Condvar::new(),
            jobs,
            observer: config.observer,
        });
        let workers = (0..config.workers.max(1))
            .map(|_| {
                let core = core.clone();
                let job_rx = job_rx.clone();
                std::thread::spawn(move || worker_loop(core, job_rx))
            })
            .collect();
        Self { core, workers }
    }

    pub(crate) fn core(&self) -> Arc<Core<M>> {
        self.core.clone()
    }

    /// Append a node producing one value from its dependencies'
    /// results. The closure runs at most once, only after every
    /// dependency is `Done`, and only if the node is demanded by an
    /// `await` downstream.
    pub fn add_node<F>(&self, name: &str, deps: Vec<NodeId>, op: F) -> NodeId
    where
        F: FnOnce(&NodeInputs<M>) -> Result<M, MaskError> + Send + 'static,
    {
        self.core.add_node(name, deps, op)
    }

    /// The most recently appended node carrying `name`.
    pub fn latest_node(&self, name: &str) -> Option<NodeId> {
        self.core.latest_node(name)
    }

    /// Run the node's transitive dependency subgraph (where not already
    /// run) and block until its result is available.
    pub fn await_node(&self, id: NodeId) -> Result<Arc<M>, PipelineError> {
        self.core.await_node(id)
    }
}

impl<M: NodeValue> Drop for Pipeline<M> {
    fn drop(&mut self) {
        {
            let mut graph = self.core.lock();
            graph.shutdown = true;
        }
        for _ in &self.workers {
            let _ = self.core.jobs.send(Job::Stop);
        }
        self.core.settled.notify_all();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}
