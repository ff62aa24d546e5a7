//! Benchmark for normcache using a synthetic article feed.
//!
//! Builds a feed of articles, each with an author and a comment thread whose
//! authors are drawn from a shared user pool, then measures normalization,
//! reconstruction and update propagation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use normcache::{Listener, Store, StoreId};
use serde::Serialize;
use uuid::Uuid;

const DEFAULT_ARTICLES: usize = 2_000;
const USERS: usize = 500;
const COMMENTS_PER_ARTICLE: usize = 8;
const JOIN_ITERS: u32 = 10;

// =============================================================================
// FEED DATA STRUCTURES
// =============================================================================

#[derive(Debug, Clone, Serialize)]
struct User {
    #[serde(rename = "type")]
    kind: &'static str,
    id: String,
    name: String,
    tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
struct Comment {
    #[serde(rename = "type")]
    kind: &'static str,
    id: String,
    text: String,
    author: User,
}

#[derive(Debug, Clone, Serialize)]
struct Article {
    #[serde(rename = "type")]
    kind: &'static str,
    id: String,
    title: String,
    author: User,
    comments: Vec<Comment>,
}

#[derive(Debug, Serialize)]
struct Feed {
    page: usize,
    articles: Vec<Article>,
}

// =============================================================================
// GENERATION
// =============================================================================

fn make_users(count: usize) -> Vec<User> {
    (0..count)
        .map(|i| User {
            kind: "user",
            id: Uuid::new_v4().to_string(),
            name: format!("user {}", i),
            tags: if i % 7 == 0 { Vec::new() } else { vec![format!("t{}", i % 13)] },
        })
        .collect()
}

fn make_feed(articles: usize, users: &[User]) -> Feed {
    let articles = (0..articles)
        .map(|i| Article {
            kind: "article",
            id: Uuid::new_v4().to_string(),
            title: format!("article {}", i),
            author: users[i % users.len()].clone(),
            comments: (0..COMMENTS_PER_ARTICLE)
                .map(|c| Comment {
                    kind: "comment",
                    id: Uuid::new_v4().to_string(),
                    text: format!("comment {} on {}", c, i),
                    author: users[(i * 31 + c * 17) % users.len()].clone(),
                })
                .collect(),
        })
        .collect();
    Feed { page: 1, articles }
}

fn main() {
    tracing_subscriber::fmt::init();

    let articles = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_ARTICLES);

    let users = make_users(USERS);
    let feed = make_feed(articles, &users);
    let payload = serde_json::to_value(&feed).expect("Failed to serialize feed");
    let json_len = serde_json::to_string(&payload).expect("Failed to render feed").len();
    println!(
        "Feed: {} articles, {} users, {} comments ({:.1} MB JSON)",
        articles,
        USERS,
        articles * COMMENTS_PER_ARTICLE,
        json_len as f64 / 1_000_000.0
    );

    // Normalize
    let mut store = Store::default();
    let parse_start = Instant::now();
    let normalized = store.parse(&payload).expect("Failed to parse feed");
    let parse_time = parse_start.elapsed();
    println!("\nParse: {:?}", parse_time);
    println!("  Entities: {}", store.len());
    println!("  Root refs: {}", normalized.refs.len());

    // Cold join
    let join_start = Instant::now();
    let joined = store
        .join_refs(&normalized.template, &normalized.refs)
        .expect("Failed to join feed");
    let cold_join_time = join_start.elapsed();
    assert_eq!(*joined, payload);
    println!("\nJoin (cold): {:?}", cold_join_time);

    // Warm join: every entity is memoized
    let warm_start = Instant::now();
    for _ in 0..JOIN_ITERS {
        let joined = store
            .join_refs(&normalized.template, &normalized.refs)
            .expect("Failed to join feed");
        assert_eq!(joined["page"], 1);
    }
    let warm_join_time = warm_start.elapsed() / JOIN_ITERS;
    println!("Join (warm): {:?} (avg of {} iterations)", warm_join_time, JOIN_ITERS);

    // Update propagation
    let notified = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&notified);
    let listener = Listener::new(move |ids: &[StoreId]| {
        counter.fetch_add(ids.len(), Ordering::Relaxed);
    });
    let article_ids: Vec<String> = feed
        .articles
        .iter()
        .map(|a| format!("article:{}", a.id))
        .collect();
    store
        .subscribe(&article_ids, &listener)
        .expect("Failed to subscribe");

    let mut renamed = users[0].clone();
    renamed.name = "renamed".to_string();
    let update = serde_json::to_value(&renamed).expect("Failed to serialize user");

    let update_start = Instant::now();
    store.parse(&update).expect("Failed to parse update");
    let update_time = update_start.elapsed();
    println!("\nUpdate one user: {:?}", update_time);
    println!("  Affected ids delivered: {}", notified.load(Ordering::Relaxed));

    let user_key = format!("user:{}", users[0].id);
    let user = store.get(&user_key).expect("Failed to get user");
    assert_eq!(user["name"], "renamed");

    // Summary
    println!("\n=== Summary ===");
    println!("Entities: {}", store.len());
    println!(
        "Parse throughput: {:.2} MB/s",
        (json_len as f64 / 1_000_000.0) / parse_time.as_secs_f64()
    );
    println!(
        "Warm join speedup vs cold: {:.1}x",
        cold_join_time.as_secs_f64() / warm_join_time.as_secs_f64().max(f64::EPSILON)
    );
}
