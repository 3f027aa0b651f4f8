use std::sync::Arc;
use std::time::{Duration, Instant};

use notes_backend_lib::config::RateLimitSettings;
use notes_backend_lib::middleware::TokenBucket;

#[test]
fn test_default_bucket_burst_and_sustained_rate() {
    let bucket = TokenBucket::from_settings(&RateLimitSettings::default());
    let start = Instant::now();

    let admitted = (0..4).filter(|_| bucket.try_acquire_at(start)).count();
    assert_eq!(admitted, 4);
    assert!(!bucket.try_acquire_at(start));

    // One request per second is sustainable indefinitely
    for second in 1..=10 {
        let now = start + Duration::from_secs(second);
        assert!(bucket.try_acquire_at(now), "second {second}");
        assert!(!bucket.try_acquire_at(now), "second {second}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_bucket_under_concurrent_tasks() {
    let bucket = Arc::new(TokenBucket::new(4, 1));
    let now = Instant::now();

    // Released together so acquisitions overlap across worker threads
    let barrier = Arc::new(tokio::sync::Barrier::new(32));
    let mut handles = Vec::new();
    for _ in 0..32 {
        let bucket = Arc::clone(&bucket);
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            bucket.try_acquire_at(now)
        }));
    }

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 4);
}
