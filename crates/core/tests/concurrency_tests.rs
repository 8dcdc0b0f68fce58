//! Concurrent build scenarios: independent tree builds may run at the same
//! time against one shared registry.

use arbor_core::{ContextLoader, ContextRegistry};
use serde_json::json;
use std::sync::Arc;
use std::thread;

fn loader_for(registry: Arc<ContextRegistry>) -> ContextLoader {
    ContextLoader::builder().registry(registry).build()
}

#[test]
fn concurrent_builds_with_disjoint_names_both_succeed() {
    let registry = Arc::new(ContextRegistry::new());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = registry.clone();
            thread::spawn(move || {
                let loader = loader_for(registry);
                let config = json!({
                    "arborContext": {
                        "name": format!("tree-{}", i),
                        "context": [
                            { "name": format!("tree-{}.child-a", i) },
                            { "name": format!("tree-{}.child-b", i) }
                        ]
                    }
                });
                loader.load(&config, "arborContext").unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.context_count(), 12);
    for i in 0..4 {
        for name in [
            format!("tree-{}", i),
            format!("tree-{}.child-a", i),
            format!("tree-{}.child-b", i),
        ] {
            assert!(registry.is_registered(&name), "missing '{}'", name);
        }
    }
}

#[test]
fn concurrent_builds_of_the_same_name_leave_exactly_one_entry() {
    let registry = Arc::new(ContextRegistry::new());
    let config = json!({ "arborContext": { "name": "shared-root" } });

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = registry.clone();
            let config = config.clone();
            thread::spawn(move || {
                let loader = loader_for(registry);
                // auto-registration treats a lost race as silent reuse,
                // so every build succeeds
                loader.load(&config, "arborContext").unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.context_count(), 1);
    assert_eq!(registry.lookup("shared-root").unwrap().name(), "shared-root");
}

#[test]
fn explicit_registration_race_has_exactly_one_winner() {
    let registry = Arc::new(ContextRegistry::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = registry.clone();
            thread::spawn(move || {
                let context =
                    arbor_core::GenericContext::root("contested", true, &[]).unwrap();
                registry.register(context).is_ok()
            })
        })
        .collect();

    let wins: usize = handles
        .into_iter()
        .map(|h| h.join().unwrap() as usize)
        .sum();

    assert_eq!(wins, 1);
    assert_eq!(registry.context_count(), 1);
}
