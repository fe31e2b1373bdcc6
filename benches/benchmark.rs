use std::collections::HashMap;
use std::sync::Arc;

use arbor::config::EngineConfig;
use arbor::processor::registry::{NodeMatcher, ProcessorRegistry};
use arbor::{
    Configuration, EngineResult, ExecutionContext, MatchContext, NodeId, NodeKind, Processor,
    ProcessorResult, Tree,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

struct Noop;

impl Processor for Noop {
    fn name(&self) -> &str {
        "noop"
    }

    fn process(
        &self,
        _context: &ExecutionContext,
        _match_context: &MatchContext,
        _tree: &mut Tree,
        _node: NodeId,
    ) -> EngineResult<ProcessorResult> {
        Ok(ProcessorResult::ok())
    }
}

// table with `rows` rows, one processed cell per row
fn table(rows: usize) -> Tree {
    let mut tree = Tree::document(Some("table.html"));
    let table = tree.create_node(NodeKind::element("table"));
    tree.add_child(tree.root(), table).unwrap();
    for _ in 0..rows {
        let tr = tree.create_node(NodeKind::element("tr"));
        let cell = tree.create_node(NodeKind::element_with_attributes("td", &[("th:text", "x")]));
        let plain = tree.create_node(NodeKind::element("td"));
        let text = tree.create_node(NodeKind::text("static"));
        tree.add_child(table, tr).unwrap();
        tree.add_child(tr, cell).unwrap();
        tree.add_child(tr, plain).unwrap();
        tree.add_child(plain, text).unwrap();
    }
    tree
}

fn configuration() -> Arc<Configuration> {
    let mut registry = ProcessorRegistry::new(Some("th"));
    registry.register(NodeMatcher::Attribute("text".to_string()), Arc::new(Noop), 0);
    Arc::new(Configuration::new(EngineConfig::default(), Arc::new(registry)))
}

fn bench_render(c: &mut Criterion) {
    let configuration = configuration();
    let context = ExecutionContext::new(configuration.clone(), HashMap::new());
    let mut cached = table(200);
    let root = cached.root();
    cached.precompute_node(root, &configuration).unwrap();

    c.bench_function("clone and process (cached processors)", |b| {
        b.iter(|| {
            let mut tree = cached.clone_tree(true).unwrap();
            black_box(tree.process(&context).unwrap())
        })
    });
    c.bench_function("clone and process (fresh resolution)", |b| {
        b.iter(|| {
            let mut tree = cached.clone_tree(false).unwrap();
            black_box(tree.process(&context).unwrap())
        })
    });
}

// ベンチマークグループの定義
criterion_group!(benches, bench_render);
criterion_main!(benches);
