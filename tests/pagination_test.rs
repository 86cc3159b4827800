use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use spotifyapi::{
    Error, Res,
    pagination::{self, Paginator, deserialize_item},
};

// Helper function to create a raw page payload
fn page(href: &str, items: Value, next: Option<&str>) -> Value {
    json!({
        "href": href,
        "items": items,
        "limit": 2,
        "next": next,
        "offset": 0,
        "previous": null,
        "total": 3
    })
}

// Paginator that serves `pages` by url and records every fetch
fn paginator_over(
    initial: Value,
    pages: Vec<(&'static str, Res<Value>)>,
    calls: Arc<Mutex<Vec<String>>>,
) -> Paginator<'static, String> {
    let pages = Arc::new(Mutex::new(pages));
    pagination::paginate(initial, deserialize_item::<String>, move |url: String| {
        calls.lock().unwrap().push(url.clone());
        let mut pages = pages.lock().unwrap();
        let index = pages
            .iter()
            .position(|(u, _)| *u == url)
            .expect("unexpected page url");
        let (_, payload) = pages.remove(index);
        async move { payload }
    })
    .unwrap()
}

#[tokio::test]
async fn test_next_page_is_fetched_lazily() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut paginator = paginator_over(
        page("U1", json!(["a", "b"]), Some("U2")),
        vec![("U2", Ok(page("U2", json!(["c"]), None)))],
        Arc::clone(&calls),
    );

    assert_eq!(paginator.next().await.unwrap().unwrap(), "a");
    assert_eq!(paginator.next().await.unwrap().unwrap(), "b");
    assert!(calls.lock().unwrap().is_empty());

    assert_eq!(paginator.next().await.unwrap().unwrap(), "c");
    assert_eq!(*calls.lock().unwrap(), vec!["U2".to_string()]);
    assert_eq!(paginator.href(), "U2");

    assert!(paginator.next().await.is_none());
    assert!(paginator.is_finished());
    assert_eq!(paginator.pages_fetched(), 1);
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_single_page_never_fetches() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let paginator = paginator_over(
        page("U1", json!(["a", "b"]), None),
        Vec::new(),
        Arc::clone(&calls),
    );

    assert_eq!(paginator.total(), Some(3));
    assert_eq!(paginator.collect_all().await.unwrap(), vec!["a", "b"]);
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_page_is_skipped() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let paginator = paginator_over(
        page("U1", json!([]), Some("U2")),
        vec![
            ("U2", Ok(page("U2", json!([]), Some("U3")))),
            ("U3", Ok(page("U3", json!(["z"]), None))),
        ],
        Arc::clone(&calls),
    );

    assert_eq!(paginator.collect_all().await.unwrap(), vec!["z"]);
    assert_eq!(calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_fetch_failure_ends_the_sequence() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut paginator = paginator_over(
        page("U1", json!(["a"]), Some("U2")),
        vec![(
            "U2",
            Err(Error::Api {
                status: 500,
                message: "boom".to_string(),
            }),
        )],
        Arc::clone(&calls),
    );

    assert_eq!(paginator.next().await.unwrap().unwrap(), "a");
    match paginator.next().await {
        Some(Err(Error::Api { status, message })) => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("unexpected item: {other:?}"),
    }
    assert!(paginator.next().await.is_none());
}

#[tokio::test]
async fn test_item_factory_failure_ends_the_sequence() {
    let mut paginator: Paginator<'_, u32> = pagination::paginate(
        page("U1", json!([1, "two", 3]), None),
        deserialize_item::<u32>,
        |_url: String| async { Ok(Value::Null) },
    )
    .unwrap();

    assert_eq!(paginator.next().await.unwrap().unwrap(), 1);
    assert!(matches!(paginator.next().await, Some(Err(Error::Decode(_)))));
    assert!(paginator.next().await.is_none());
}

#[tokio::test]
async fn test_malformed_next_page_is_an_error() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let paginator = paginator_over(
        page("U1", json!(["a"]), Some("U2")),
        vec![("U2", Ok(json!({ "unexpected": true })))],
        Arc::clone(&calls),
    );

    assert!(matches!(paginator.collect_all().await, Err(Error::Decode(_))));
}

#[test]
fn test_malformed_initial_page_is_rejected() {
    let result: Res<Paginator<'_, String>> = pagination::paginate(
        json!({ "items": "nope" }),
        deserialize_item::<String>,
        |_url: String| async { Ok(Value::Null) },
    );

    assert!(result.is_err());
}

#[test]
fn test_cursor_page_decodes() {
    let raw = json!({
        "href": "https://api.spotify.com/v1/me/following?type=artist&limit=2",
        "items": [],
        "limit": 2,
        "next": null,
        "cursors": { "after": "0I2XqVXqHScXjHhk6AYYRe" },
        "total": 12
    });

    let page = pagination::Page::from_value(raw).unwrap();

    assert_eq!(page.offset, None);
    assert_eq!(
        page.cursors.and_then(|c| c.after).as_deref(),
        Some("0I2XqVXqHScXjHhk6AYYRe")
    );
}
