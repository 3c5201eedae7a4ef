//! Integration tests for coin resolution and pool registration
//!
//! Collaborators are mocked; call counters verify the caching guarantees.


use dex_pool_metrics::coin_resolver::CoinResolver;
use dex_pool_metrics::coins::{ETH_WORMHOLE_USDC, SUI};
use dex_pool_metrics::error::IndexerError;
use dex_pool_metrics::pool_registry::PoolRegistry;
use mock_chain::{pool_type, MockChain};
use std::sync::Arc;
use std::time::Duration;

const MEME: &str = "0xabc::meme::MEME";
const POOL: &str = "0x85e87655a47628098b5fc2e62d4926c6384e0430f2eae60cf9c692562b688702";

fn registry(chain: &Arc<MockChain>) -> PoolRegistry {
    PoolRegistry::new(chain.clone(), CoinResolver::new(chain.clone()))
}

#[tokio::test]
async fn seeded_coins_resolve_without_io() {
    let chain = Arc::new(MockChain::new());
    let resolver = CoinResolver::new(chain.clone());

    let sui = resolver.resolve(SUI).await;
    let padded = resolver
        .resolve("0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI")
        .await;

    assert_eq!(sui.decimals, 9);
    assert_eq!(sui, padded);
    assert_eq!(chain.metadata_calls(), 0);
}

#[tokio::test]
async fn fetched_metadata_is_cached_after_first_resolution() {
    let chain = Arc::new(MockChain::new());
    chain.add_metadata(MEME, "MEME", 6);
    let resolver = CoinResolver::unseeded(chain.clone());

    for _ in 0..5 {
        let coin = resolver.resolve(MEME).await;
        assert_eq!(coin.symbol, "MEME");
        assert_eq!(coin.decimals, 6);
    }
    assert_eq!(chain.metadata_calls(), 1);
    assert_eq!(resolver.len(), 1);
}

#[tokio::test]
async fn failed_fetch_falls_back_and_is_never_retried() {
    let chain = Arc::new(MockChain::failing_metadata());
    let resolver = CoinResolver::new(chain.clone());

    let first = resolver.resolve(MEME).await;
    let second = resolver.resolve(MEME).await;

    assert_eq!(first.symbol, "MEME");
    assert_eq!(first.name, "MEME");
    assert_eq!(first.decimals, 0);
    assert_eq!(first, second);
    assert_eq!(chain.metadata_calls(), 1);
}

#[tokio::test]
async fn missing_metadata_uses_derived_symbol() {
    let chain = Arc::new(MockChain::new());
    let resolver = CoinResolver::new(chain.clone());

    let coin = resolver.resolve("0xdef::lp::LP<0x2::sui::SUI>").await;
    assert_eq!(coin.symbol, "LP");
    assert_eq!(coin.decimals, 0);
    assert_eq!(chain.metadata_calls(), 1);
}

#[tokio::test]
async fn concurrent_first_resolutions_converge() {
    let chain = Arc::new(MockChain::new().with_latency(Duration::from_millis(20)));
    chain.add_metadata(MEME, "MEME", 6);
    let resolver = CoinResolver::new(chain.clone());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let resolver = resolver.clone();
            tokio::spawn(async move { resolver.resolve(MEME).await })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(resolver.get_cached(MEME), Some(results[0].clone()));
    // later calls are pure cache hits
    let before = chain.metadata_calls();
    resolver.resolve(MEME).await;
    assert_eq!(chain.metadata_calls(), before);
}

#[tokio::test]
async fn resolved_coin_ignores_later_metadata_changes() {
    let chain = Arc::new(MockChain::new());
    chain.add_metadata(MEME, "MEME", 6);
    let resolver = CoinResolver::new(chain.clone());

    let first = resolver.resolve(MEME).await;
    chain.add_metadata(MEME, "NEW", 9);
    let second = resolver.resolve(MEME).await;

    assert_eq!(second, first);
    assert_eq!(second.symbol, "MEME");
    assert_eq!(second.decimals, 6);
    assert_eq!(chain.metadata_calls(), 1);
}

#[tokio::test]
async fn registration_is_first_writer_wins() {
    let chain = Arc::new(MockChain::new());
    let registry = registry(&chain);

    let first = registry.register(POOL, SUI, ETH_WORMHOLE_USDC, false).await;
    let second = registry.register(POOL, MEME, SUI, true).await;

    assert_eq!(first, second);
    assert_eq!(first.name, "volatile-SUI/USDC");
    assert_eq!(first.decimal_x, 9);
    assert_eq!(first.decimal_y, 6);
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.pool_ids(), vec![POOL.to_string()]);
}

#[tokio::test]
async fn reconstructs_unknown_pool_from_object_type() {
    let chain = Arc::new(MockChain::new());
    chain.add_pool(POOL, &pool_type("Stable", SUI, ETH_WORMHOLE_USDC), 5_000_000_000, 12_000_000);
    let registry = registry(&chain);

    let snapshot = registry.lookup_or_reconstruct(POOL).await.unwrap();

    assert_eq!(snapshot.pool.name, "stable-SUI/USDC");
    assert!(snapshot.pool.is_stable);
    assert_eq!(snapshot.balance_x, 5_000_000_000);
    assert_eq!(snapshot.balance_y, 12_000_000);
    assert_eq!(registry.get(POOL), Some(snapshot.pool));
}

#[tokio::test]
async fn reconstruction_keeps_event_registration() {
    let chain = Arc::new(MockChain::new());
    chain.add_pool(POOL, &pool_type("Stable", SUI, ETH_WORMHOLE_USDC), 1, 2);
    let registry = registry(&chain);

    let registered = registry.register(POOL, SUI, ETH_WORMHOLE_USDC, false).await;
    let snapshot = registry.lookup_or_reconstruct(POOL).await.unwrap();

    assert_eq!(snapshot.pool, registered);
    assert!(!snapshot.pool.is_stable);
}

#[tokio::test]
async fn missing_object_is_an_error() {
    let chain = Arc::new(MockChain::new());
    let registry = registry(&chain);

    let err = registry.lookup_or_reconstruct("0xmissing").await.unwrap_err();
    assert!(matches!(
        err,
        IndexerError::ObjectFetchFailed { ref object_id, .. } if object_id == "0xmissing"
    ));
    assert!(registry.is_empty());
}

#[tokio::test]
async fn malformed_object_type_is_rejected() {
    let chain = Arc::new(MockChain::new());
    chain.add_pool(POOL, "0x1::core::Pool<0x1::curve::Volatile, 0x2::sui::SUI>", 1, 1);
    let registry = registry(&chain);

    let err = registry.lookup_or_reconstruct(POOL).await.unwrap_err();
    assert!(matches!(err, IndexerError::MalformedTypeArgument(_)));
    assert!(registry.is_empty());
}

#[tokio::test]
async fn concurrent_registrations_converge() {
    let chain = Arc::new(MockChain::new().with_latency(Duration::from_millis(20)));
    chain.add_metadata(MEME, "MEME", 6);
    let registry = registry(&chain);

    let (a, b) = futures::join!(
        registry.register(POOL, SUI, ETH_WORMHOLE_USDC, false),
        registry.register(POOL, MEME, SUI, true)
    );

    assert_eq!(a, b);
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get(POOL), Some(a.clone()));
    // later registrations see the same winner
    let again = registry.register(POOL, SUI, MEME, false).await;
    assert_eq!(again, a);
}
