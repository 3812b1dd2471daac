mod common;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;

use common::{module_over, sample_tree};
use recipes::infra::memory::MemoryStore;

#[tokio::test]
async fn fetch_all_returns_exactly_the_well_formed_records() {
    let store = MemoryStore::with_data(sample_tree());
    let (module, _) = module_over(Arc::new(store));

    let mut recipes = module.service().list_recipes().await;
    recipes.sort_by(|a, b| a.id.cmp(&b.id));

    let ids: Vec<_> = recipes.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["r1", "r2", "r3"]);

    let soup = &recipes[0];
    assert_eq!(soup.title, "Lentil soup");
    assert_eq!(soup.calories, 320);
    assert_eq!(soup.ingredients[1].quantity, "2");
    assert_eq!(soup.steps, vec!["Rinse", "Simmer"]);
    assert_eq!(recipes[1].calories, 540);
}

#[tokio::test]
async fn fetch_all_is_empty_when_the_store_is_unreachable() {
    let store = MemoryStore::with_data(sample_tree());
    store.set_offline(true);
    let (module, _) = module_over(Arc::new(store));

    assert!(module.service().list_recipes().await.is_empty());
    assert!(module.service().random_recipe().await.is_none());
}

#[tokio::test]
async fn fetch_one_is_absent_for_missing_or_malformed_records() {
    let store = MemoryStore::with_data(sample_tree());
    let (module, _) = module_over(Arc::new(store));
    let service = module.service();

    assert_eq!(service.find_recipe("r2").await.unwrap().title, "Pancakes");
    assert!(service.find_recipe("nope").await.is_none());
    assert!(service.find_recipe("broken").await.is_none());
}

#[tokio::test]
async fn fetch_random_is_absent_only_for_an_empty_collection() {
    let (empty, _) = module_over(Arc::new(MemoryStore::new()));
    assert!(empty.service().random_recipe().await.is_none());

    let only_broken = MemoryStore::with_data(json!({ "recipes": { "x": { "steps": [] , "calories": "?" } } }));
    let (module, _) = module_over(Arc::new(only_broken));
    assert!(module.service().random_recipe().await.is_none());

    let single = MemoryStore::with_data(json!({ "recipes": { "only": { "title": "Toast" } } }));
    let (module, _) = module_over(Arc::new(single));
    assert_eq!(module.service().random_recipe().await.unwrap().id, "only");
}

#[tokio::test]
async fn fetch_random_is_uniform_over_the_collection() {
    let store = MemoryStore::with_data(sample_tree());
    let (module, _) = module_over(Arc::new(store));
    let service = module.service();

    const DRAWS: usize = 6000;
    let mut counts: HashMap<String, usize> = HashMap::new();
    for _ in 0..DRAWS {
        let recipe = service.random_recipe().await.unwrap();
        *counts.entry(recipe.id).or_default() += 1;
    }

    assert_eq!(counts.len(), 3, "every well-formed recipe is drawn: {counts:?}");
    // Expected 2000 each.
    for (id, count) in &counts {
        assert!((1600..=2400).contains(count), "{id} drawn {count} times");
    }
}
