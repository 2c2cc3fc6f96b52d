//! Properties every `Pagination` built by the adapter must hold, checked over a
//! counting in-memory collection.

use futures::{StreamExt, TryStreamExt};
use resux_core::offload::Offloader;
use resux_core::pagination::PaginationAdapter;
use resux_core::testing::StubCollection;
use resux_core::{GitError, Key, Pagination};

fn numbers(n: usize) -> Vec<u32> {
    (0..n as u32).collect()
}

fn adapter(n: usize) -> Box<dyn Pagination<String>> {
    let (factory, _) = StubCollection::factory(numbers(n));
    PaginationAdapter::new(Offloader::new(3), factory, |i: u32| format!("#{i}")).boxed()
}

#[tokio::test]
async fn index_slice_and_stream_views_agree() {
    for n in [0, 1, 2, 7] {
        let pagination = adapter(n);
        let len = pagination.length().await.expect("length");
        assert_eq!(len, n);

        let sliced = pagination.slice(0, len).await.expect("slice");
        let streamed: Vec<String> = pagination.stream().try_collect().await.expect("stream");
        assert_eq!(sliced, streamed);

        for (i, expected) in sliced.iter().enumerate() {
            assert_eq!(&pagination.get(Key::Index(i)).await.expect("get"), expected);
        }
    }
}

#[tokio::test]
async fn slices_are_half_open() {
    let pagination = adapter(5);
    assert_eq!(pagination.slice(1, 3).await.expect("slice"), vec!["#1", "#2"]);
    assert_eq!(pagination.slice(3, 100).await.expect("slice"), vec!["#3", "#4"]);
    assert!(pagination.slice(4, 4).await.expect("slice").is_empty());
}

#[tokio::test]
async fn construction_happens_once_across_every_operation() {
    let (factory, calls) = StubCollection::factory(numbers(4));
    let pagination = PaginationAdapter::new(Offloader::new(2), factory, |i: u32| i * 10);

    let (len, first, rest) = futures::join!(
        pagination.length(),
        pagination.get(Key::Index(0)),
        pagination.slice(1, 4)
    );
    assert_eq!(len.expect("length"), 4);
    assert_eq!(first.expect("get"), 0);
    assert_eq!(rest.expect("slice"), vec![10, 20, 30]);

    let streamed: Vec<u32> = pagination.stream().try_collect().await.expect("stream");
    assert_eq!(streamed, vec![0, 10, 20, 30]);
    assert_eq!(calls.constructed(), 1);
}

#[tokio::test]
async fn stream_is_lazy_until_polled() {
    let (factory, calls) = StubCollection::factory(numbers(3));
    let pagination = PaginationAdapter::new(Offloader::new(1), factory, |i: u32| i);

    let mut stream = pagination.stream();
    assert_eq!(calls.constructed(), 0);
    assert_eq!(stream.next().await.expect("first").expect("ok"), 0);
    assert_eq!(calls.constructed(), 1);
    assert_eq!(calls.advanced(), 1);
}

#[tokio::test]
async fn dropped_stream_stops_advancing() {
    let (factory, calls) = StubCollection::factory(numbers(10));
    let pagination = PaginationAdapter::new(Offloader::new(1), factory, |i: u32| i);

    let firsts: Vec<u32> = pagination
        .stream()
        .take(2)
        .try_collect()
        .await
        .expect("prefix");
    assert_eq!(firsts, vec![0, 1]);
    assert_eq!(calls.advanced(), 2);
}

#[tokio::test]
async fn closed_worker_pool_fails_every_operation() {
    let (factory, _) = StubCollection::factory(numbers(3));
    let offloader = Offloader::new(1);
    let pagination = PaginationAdapter::new(offloader.clone(), factory, |i: u32| i);
    offloader.close();

    assert!(matches!(pagination.length().await, Err(GitError::WorkerPoolClosed)));
    assert!(matches!(
        pagination.stream().next().await,
        Some(Err(GitError::WorkerPoolClosed))
    ));
}
