mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use arbor::config::{EngineConfig, TemplateCacheConfig};
use arbor::processor::registry::{NodeMatcher, ProcessorRegistry};
use arbor::{Configuration, Error, NodeKind, ProcessorResult, TemplateEngine, Tree, Value};
use common::Recording;
use pretty_assertions::assert_eq;

fn greeting() -> Tree {
    let mut tree = Tree::document(Some("greeting.html"));
    let p = tree.create_node(NodeKind::element_with_attributes("p", &[("th:text", "name")]));
    let placeholder = tree.create_node(NodeKind::text("placeholder"));
    tree.add_child(tree.root(), p).unwrap();
    tree.add_child(p, placeholder).unwrap();
    tree
}

// replaces the element's content with the variable named by the attribute
fn text_processor() -> Arc<Recording> {
    Recording::with_action("text", |context, tree, node| {
        let name = tree
            .attribute(node, "th:text")?
            .unwrap_or_default()
            .to_string();
        let rendered = context
            .variable(&name)
            .map(Value::to_string)
            .unwrap_or_default();
        tree.clear_children(node)?;
        let text = tree.create_node(NodeKind::text(&rendered));
        tree.add_child(node, text)?;
        tree.remove_attribute(node, "th:text")?;
        Ok(ProcessorResult::ok())
    })
}

fn engine(settings: EngineConfig, processor: Arc<Recording>) -> TemplateEngine {
    let mut registry = ProcessorRegistry::new(settings.prefix());
    registry.register(NodeMatcher::Attribute("text".to_string()), processor, 0);
    TemplateEngine::new(Arc::new(Configuration::new(settings, Arc::new(registry))))
}

fn rendered_text(tree: &Tree) -> String {
    let p = tree.children(tree.root()).unwrap()[0];
    let text = tree.children(p).unwrap()[0];
    tree.node(text)
        .unwrap()
        .kind()
        .content()
        .unwrap_or_default()
        .to_string()
}

#[test]
fn test_renders_each_request_from_a_fresh_copy() {
    let processor = text_processor();
    let engine = engine(EngineConfig::default(), processor.clone());
    engine.register_template("greeting", greeting()).unwrap();

    let first = engine
        .process(
            "greeting",
            HashMap::from([("name".to_string(), Value::from("Ada"))]),
        )
        .unwrap();
    let second = engine
        .process(
            "greeting",
            HashMap::from([("name".to_string(), Value::from("Grace"))]),
        )
        .unwrap();

    assert_eq!(rendered_text(&first), "Ada");
    assert_eq!(rendered_text(&second), "Grace");
    assert_eq!(processor.calls(), 2);

    let cached = engine.template("greeting").unwrap();
    assert_eq!(rendered_text(&cached), "placeholder");
    let p = cached.children(cached.root()).unwrap()[0];
    assert!(cached.has_attribute(p, "th:text").unwrap());
}

#[test]
fn test_precompute_on_insert() {
    let engine = engine(EngineConfig::default(), text_processor());
    engine.register_template("greeting", greeting()).unwrap();
    let cached = engine.template("greeting").unwrap();
    for (_, node) in cached.iter() {
        assert!(node.is_precomputed());
    }

    let settings = EngineConfig {
        template_cache: TemplateCacheConfig {
            precompute_on_insert: false,
            clone_processors: false,
        },
        ..EngineConfig::default()
    };
    let engine = self::engine(settings, text_processor());
    engine.register_template("greeting", greeting()).unwrap();
    let cached = engine.template("greeting").unwrap();
    assert!(cached.iter().all(|(_, node)| !node.is_precomputed()));

    let rendered = engine
        .process(
            "greeting",
            HashMap::from([("name".to_string(), Value::from("Ada"))]),
        )
        .unwrap();
    assert_eq!(rendered_text(&rendered), "Ada");
}

#[test]
fn test_unknown_template() {
    let engine = engine(EngineConfig::default(), text_processor());
    let result = engine.process("missing", HashMap::new());
    assert!(matches!(result, Err(Error::TemplateNotFound(ref name)) if name == "missing"));
}

#[test]
fn test_cache_management() {
    let engine = engine(EngineConfig::default(), text_processor());
    assert!(engine.is_empty());
    engine.register_template("a", greeting()).unwrap();
    engine.register_template("b", greeting()).unwrap();
    engine.register_template("a", greeting()).unwrap();
    assert_eq!(engine.len(), 2);
    assert!(engine.contains("a"));

    assert!(engine.evict("a").is_some());
    assert!(!engine.contains("a"));
    assert!(engine.evict("a").is_none());

    engine.clear();
    assert!(engine.is_empty());
}

#[test]
fn test_concurrent_renders() {
    let processor = text_processor();
    let engine = Arc::new(engine(EngineConfig::default(), processor.clone()));
    engine.register_template("greeting", greeting()).unwrap();

    let results = Arc::new(Mutex::new(Vec::new()));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = engine.clone();
            let results = results.clone();
            std::thread::spawn(move || {
                let name = format!("user{}", i);
                let tree = engine
                    .process(
                        "greeting",
                        HashMap::from([("name".to_string(), Value::from(name.as_str()))]),
                    )
                    .unwrap();
                results.lock().unwrap().push((name, rendered_text(&tree)));
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let results = results.lock().unwrap();
    assert_eq!(results.len(), 8);
    for (expected, rendered) in results.iter() {
        assert_eq!(expected, rendered);
    }
    assert_eq!(processor.calls(), 8);
}
