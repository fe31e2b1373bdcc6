#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use arbor::config::EngineConfig;
use arbor::processor::registry::ProcessorRegistry;
use arbor::{
    Configuration, EngineResult, ExecutionContext, MatchContext, NodeId, Processor,
    ProcessorResult, Tree,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[ctor::ctor]
fn init_tests() {
    // tracing_subscriberの初期化
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

type Action =
    dyn Fn(&ExecutionContext, &mut Tree, NodeId) -> EngineResult<ProcessorResult> + Send + Sync;

/// Processor counting its executions and remembering the nodes it ran on.
pub struct Recording {
    name: String,
    calls: AtomicUsize,
    seen: Mutex<Vec<NodeId>>,
    action: Box<Action>,
}

impl Recording {
    pub fn new(name: &str) -> Arc<Self> {
        Self::with_action(name, |_, _, _| Ok(ProcessorResult::ok()))
    }

    pub fn with_action<F>(name: &str, action: F) -> Arc<Self>
    where
        F: Fn(&ExecutionContext, &mut Tree, NodeId) -> EngineResult<ProcessorResult>
            + Send
            + Sync
            + 'static,
    {
        Arc::new(Self {
            name: name.to_string(),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            action: Box::new(action),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<NodeId> {
        self.seen.lock().unwrap().clone()
    }
}

impl Processor for Recording {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(
        &self,
        context: &ExecutionContext,
        _match_context: &MatchContext,
        tree: &mut Tree,
        node: NodeId,
    ) -> EngineResult<ProcessorResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(node);
        (self.action)(context, tree, node)
    }
}

pub fn configuration(registry: ProcessorRegistry) -> Arc<Configuration> {
    Arc::new(Configuration::new(EngineConfig::default(), Arc::new(registry)))
}

pub fn context(configuration: Arc<Configuration>) -> ExecutionContext {
    ExecutionContext::new(configuration, HashMap::new())
}
