use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fetch_recipes::{
    FilterConfig, HttpTransport, ImageLoader, ImageSize, RecipeClient, RecipeStore, SortOrder,
    TransportError,
};
use reqwest::Url;
use tokio::sync::Semaphore;

const ENDPOINT: &str = "https://cdn.test/recipes.json";

/// In-memory transport that counts requests per URL and can hold responses
/// until a test releases them.
#[derive(Default)]
struct MockTransport {
    responses: Mutex<HashMap<String, Result<Vec<u8>, TransportError>>>,
    calls: Mutex<HashMap<String, usize>>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl MockTransport {
    fn respond(&self, url: &str, body: Result<Vec<u8>, TransportError>) {
        self.responses.lock().unwrap().insert(url.to_string(), body);
    }

    fn respond_json(&self, url: &str, json: &str) {
        self.respond(url, Ok(json.as_bytes().to_vec()));
    }

    /// Hold responses for `url` until `release` is called.
    fn gate(&self, url: &str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates
            .lock()
            .unwrap()
            .insert(url.to_string(), Arc::clone(&gate));
        gate
    }

    fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
        let key = url.as_str().to_string();
        *self.calls.lock().unwrap().entry(key.clone()).or_insert(0) += 1;

        let gate = self.gates.lock().unwrap().get(&key).cloned();
        if let Some(gate) = gate {
            let permit = gate.acquire().await.unwrap();
            permit.forget();
        }

        self.responses
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or(Err(TransportError::Status(404)))
    }
}

fn png_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    image::DynamicImage::new_rgb8(2, 2)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn recipe_json(id: &str, name: &str, cuisine: &str, extra: &str) -> String {
    format!(
        r#"{{"uuid": "{id}", "name": "{name}", "cuisine": "{cuisine}"{extra}}}"#
    )
}

fn list_json(recipes: &[String]) -> String {
    format!(r#"{{"recipes": [{}]}}"#, recipes.join(","))
}

fn store_with(transport: Arc<MockTransport>, max_concurrent: usize) -> RecipeStore {
    let client = RecipeClient::builder()
        .endpoint(ENDPOINT)
        .transport(transport.clone())
        .build()
        .unwrap();
    let loader = ImageLoader::new(transport, max_concurrent);
    RecipeStore::new(client, loader)
}

fn standard_feed(transport: &MockTransport) {
    let recipes = vec![
        recipe_json(
            "1",
            "Banana Pancakes",
            "American",
            r#", "photo_url_small": "https://img.test/1/small.png", "photo_url_large": "https://img.test/1/large.png", "youtube_url": "https://youtube.test/1""#,
        ),
        recipe_json(
            "2",
            "Apple Frangipan Tart",
            "British",
            r#", "photo_url_small": "https://img.test/2/small.png", "source_url": "https://site.test/2""#,
        ),
        recipe_json("3", "Chinon Apple Tarts", "French", ""),
    ];
    transport.respond_json(ENDPOINT, &list_json(&recipes));
    transport.respond("https://img.test/1/small.png", Ok(png_bytes()));
    transport.respond("https://img.test/1/large.png", Ok(png_bytes()));
    transport.respond("https://img.test/2/small.png", Ok(b"not an image".to_vec()));
}

#[tokio::test]
async fn test_refresh_replaces_list() {
    let transport = Arc::new(MockTransport::default());
    standard_feed(&transport);
    let store = store_with(transport.clone(), 4);

    assert!(store.is_empty());
    assert_eq!(store.refresh().await.unwrap(), 3);
    assert_eq!(store.recipes().len(), 3);
    assert_eq!(store.generation(), 1);
    assert!(store.last_error().is_none());

    transport.respond_json(
        ENDPOINT,
        &list_json(&[recipe_json("9", "Only One", "Greek", "")]),
    );
    assert_eq!(store.refresh().await.unwrap(), 1);
    assert_eq!(store.recipes()[0].id, "9");
    assert_eq!(store.generation(), 2);
}

#[tokio::test]
async fn test_refresh_failure_clears_list() {
    let transport = Arc::new(MockTransport::default());
    standard_feed(&transport);
    let store = store_with(transport.clone(), 4);
    store.refresh().await.unwrap();

    transport.respond_json(ENDPOINT, r#"{"recipes": [{"uuid": "1"}]}"#);
    let err = store.refresh().await.unwrap_err();

    assert!(err.is_decoding());
    assert!(store.is_empty());
    assert_eq!(store.last_error(), Some(err));
}

#[tokio::test]
async fn test_visible_applies_filter_without_mutating() {
    let transport = Arc::new(MockTransport::default());
    standard_feed(&transport);
    let store = store_with(transport, 4);
    store.refresh().await.unwrap();

    store.set_filter(FilterConfig::new().require_video(true));
    let visible = store.visible();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, "1");
    assert_eq!(store.recipes().len(), 3);

    store.update_filter(|filter| filter.clear());
    assert_eq!(store.visible().len(), 3);
}

#[tokio::test]
async fn test_sort_toggles_by_first_name() {
    let transport = Arc::new(MockTransport::default());
    standard_feed(&transport);
    let store = store_with(transport, 4);
    store.refresh().await.unwrap();

    // "Banana Pancakes" is first, so ascending
    assert_eq!(store.sort(), SortOrder::Ascending);
    let names: Vec<_> = store.recipes().into_iter().map(|r| r.name).collect();
    assert_eq!(
        names,
        vec!["Apple Frangipan Tart", "Banana Pancakes", "Chinon Apple Tarts"]
    );

    assert_eq!(store.sort(), SortOrder::Descending);
    assert_eq!(store.recipes()[0].name, "Chinon Apple Tarts");

    store.sort_with(SortOrder::Ascending);
    assert_eq!(store.sort_order(), Some(SortOrder::Ascending));
    assert_eq!(store.recipes()[0].name, "Apple Frangipan Tart");
}

#[tokio::test]
async fn test_loaded_image_is_not_refetched() {
    let transport = Arc::new(MockTransport::default());
    standard_feed(&transport);
    let store = store_with(transport.clone(), 4);
    store.refresh().await.unwrap();

    assert!(store.load_large("1").await.is_loaded());
    assert!(store.load_large("1").await.is_loaded());
    assert!(store.image_state("1", ImageSize::Large).is_loaded());
    assert_eq!(transport.calls("https://img.test/1/large.png"), 1);
}

#[tokio::test]
async fn test_missing_small_url_never_fetches() {
    let transport = Arc::new(MockTransport::default());
    standard_feed(&transport);
    let store = store_with(transport.clone(), 4);
    store.refresh().await.unwrap();
    let before = transport.total_calls();

    assert!(store.load_small("3").await.is_placeholder());
    assert!(store.load_large("3").await.is_placeholder());
    assert!(store.image_state("3", ImageSize::Small).is_placeholder());
    assert_eq!(transport.total_calls(), before);
}

#[tokio::test]
async fn test_decode_failure_is_failed_state() {
    let transport = Arc::new(MockTransport::default());
    standard_feed(&transport);
    let store = store_with(transport.clone(), 4);
    store.refresh().await.unwrap();

    assert!(store.load_small("2").await.is_failed());
    assert!(store.image_state("2", ImageSize::Small).is_failed());

    // A failed image stays failed until the list is refreshed
    assert!(store.load_small("2").await.is_failed());
    assert_eq!(transport.calls("https://img.test/2/small.png"), 1);

    store.refresh().await.unwrap();
    assert!(store.image_state("2", ImageSize::Small).is_placeholder());
}

#[tokio::test]
async fn test_unknown_recipe_is_placeholder() {
    let transport = Arc::new(MockTransport::default());
    standard_feed(&transport);
    let store = store_with(transport, 4);
    store.refresh().await.unwrap();

    assert!(store.load_small("does-not-exist").await.is_placeholder());
}

#[tokio::test]
async fn test_load_visible_respects_filter() {
    let transport = Arc::new(MockTransport::default());
    standard_feed(&transport);
    let store = store_with(transport.clone(), 1);
    store.refresh().await.unwrap();

    store.set_filter(FilterConfig::new().with_cuisine("American").with_cuisine("French"));
    assert_eq!(store.load_visible().await, 1);

    assert!(store.image_state("1", ImageSize::Small).is_loaded());
    assert!(store.image_state("2", ImageSize::Small).is_placeholder());
    assert_eq!(transport.calls("https://img.test/2/small.png"), 0);
}

#[tokio::test]
async fn test_concurrent_loads_issue_one_request() {
    let transport = Arc::new(MockTransport::default());
    standard_feed(&transport);
    let gate = transport.gate("https://img.test/1/large.png");
    let store = store_with(transport.clone(), 4);
    store.refresh().await.unwrap();

    let first = tokio::spawn({
        let store = store.clone();
        async move { store.load_large("1").await }
    });
    wait_for_call(&transport, "https://img.test/1/large.png").await;
    assert!(store.is_loading("1", ImageSize::Large));

    // Second request while the first is in flight is coalesced
    assert!(store.load_large("1").await.is_placeholder());

    gate.add_permits(1);
    assert!(first.await.unwrap().is_loaded());
    assert_eq!(transport.calls("https://img.test/1/large.png"), 1);
}

#[tokio::test]
async fn test_stale_fetch_is_discarded_after_refresh() {
    let transport = Arc::new(MockTransport::default());
    standard_feed(&transport);
    let gate = transport.gate("https://img.test/1/small.png");
    let store = store_with(transport.clone(), 4);
    store.refresh().await.unwrap();

    let pending = tokio::spawn({
        let store = store.clone();
        async move { store.load_small("1").await }
    });
    wait_for_call(&transport, "https://img.test/1/small.png").await;

    // The same recipe id survives the refresh, but under a new generation
    store.refresh().await.unwrap();
    gate.add_permits(1);

    assert!(pending.await.unwrap().is_placeholder());
    assert!(store.image_state("1", ImageSize::Small).is_placeholder());
    assert!(!store.is_loading("1", ImageSize::Small));
}

#[tokio::test]
async fn test_subscribers_see_changes() {
    let transport = Arc::new(MockTransport::default());
    standard_feed(&transport);
    let store = store_with(transport, 4);
    let mut revisions = store.subscribe();
    let start = *revisions.borrow_and_update();

    store.refresh().await.unwrap();
    assert!(revisions.has_changed().unwrap());
    let after_refresh = *revisions.borrow_and_update();
    assert!(after_refresh > start);

    store.sort();
    assert!(*revisions.borrow_and_update() > after_refresh);
}

async fn wait_for_call(transport: &MockTransport, url: &str) {
    for _ in 0..200 {
        if transport.calls(url) > 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("No request to {} was made", url);
}
