use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use test_log::test;

use crate::{mem::ContentCache, ContentKey, Namespace};

#[derive(Serialize)]
struct Params {
    radius: f64,
    angle: f64,
}

fn key(radius: f64, angle: f64) -> ContentKey {
    ContentKey::new(Namespace::new("tests.bend").unwrap(), &Params { radius, angle }).unwrap()
}

#[test]
fn equal_params_share_a_key() {
    assert_eq!(key(10., 90.), key(10., 90.));
    assert_ne!(key(10., 90.), key(10., 180.));
    let other_ns = ContentKey::new(
        Namespace::new("tests.other").unwrap(),
        &Params {
            radius: 10.,
            angle: 90.,
        },
    )
    .unwrap();
    assert_ne!(key(10., 90.), other_ns);
}

#[test]
fn generates_once_per_key() {
    let cache = ContentCache::new();
    let calls = AtomicUsize::new(0);
    for _ in 0..3 {
        let v = cache
            .get_or_try_generate(key(5., 90.), || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(vec![1, 2, 3])
            })
            .unwrap();
        assert_eq!(*v, vec![1, 2, 3]);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.hits(), 2);
    assert_eq!(cache.misses(), 1);
}

#[test]
fn failures_are_not_cached() {
    let cache: ContentCache<u64> = ContentCache::new();
    let err = cache
        .get_or_try_generate(key(1., 1.), || Err("boom".to_string()))
        .unwrap_err();
    assert_eq!(err, "boom");
    assert!(cache.get(&key(1., 1.)).is_none());
    let v = cache
        .get_or_try_generate(key(1., 1.), || Ok::<_, String>(7))
        .unwrap();
    assert_eq!(*v, 7);
}

#[test]
fn generators_may_use_the_cache() {
    let cache: Arc<ContentCache<u64>> = Arc::new(ContentCache::new());
    let outer = cache
        .get_or_try_generate(key(2., 2.), || {
            let inner = cache.get_or_try_generate(key(3., 3.), || Ok::<_, ()>(3))?;
            Ok::<_, ()>(*inner + 1)
        })
        .unwrap();
    assert_eq!(*outer, 4);
    assert_eq!(*cache.get(&key(3., 3.)).unwrap(), 3);
}

#[test]
fn hits_return_the_same_allocation() {
    let cache = ContentCache::new();
    let a = cache
        .get_or_try_generate(key(8., 8.), || Ok::<_, ()>(String::from("cell")))
        .unwrap();
    let b = cache
        .get_or_try_generate(key(8., 8.), || Ok::<_, ()>(String::from("other")))
        .unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}
