// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, Bytes, U256};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use whales_config::{BalanceConfig, MULTICALL3_ADDRESS};
use whales_evm::{
    AccountKind, AddressClassifier, BalanceAggregator, DescriptorError, TokenDescriptor,
    TokenReadError, UNKNOWN_SYMBOL,
};
use whales_test_helpers::{addr, init_test_tracing, units, MockChain};

const TOKEN: Address = Address::repeat_byte(0x11);

fn aggregator(
    chain: &MockChain,
    batch_size: usize,
    concurrency: usize,
) -> BalanceAggregator<MockChain> {
    let config = BalanceConfig {
        batch_size,
        batch_delay_ms: 50,
        concurrency,
    };
    BalanceAggregator::new(Arc::new(chain.clone()), TOKEN, MULTICALL3_ADDRESS, &config)
}

#[tokio::test]
async fn test_descriptor_reads_metadata() -> Result<()> {
    init_test_tracing();
    let chain = MockChain::token(18, "WHL", units(1_000_000, 18));

    let token = TokenDescriptor::fetch(&chain, TOKEN).await?;

    assert_eq!(token.address(), TOKEN);
    assert_eq!(token.decimals(), 18);
    assert_eq!(token.symbol(), "WHL");
    assert_eq!(token.raw_total_supply(), units(1_000_000, 18));
    assert!(!token.symbol_lookup().is_fallback());
    assert!(!token.total_supply_lookup().is_fallback());
    Ok(())
}

#[tokio::test]
async fn test_missing_decimals_is_fatal() {
    let chain = MockChain::token(18, "WHL", U256::from(1u64)).without_decimals();

    let err = TokenDescriptor::fetch(&chain, TOKEN).await.unwrap_err();

    let DescriptorError::DecimalsUnavailable { token, source } = err;
    assert_eq!(token, TOKEN);
    assert!(matches!(source, TokenReadError::Rpc { .. }));
}

#[tokio::test]
async fn test_symbol_and_supply_fall_back() -> Result<()> {
    let chain = MockChain::token(6, "WHL", U256::from(1u64))
        .without_symbol()
        .without_total_supply();

    let token = TokenDescriptor::fetch(&chain, TOKEN).await?;

    assert_eq!(token.decimals(), 6);
    assert_eq!(token.symbol(), UNKNOWN_SYMBOL);
    assert!(token.symbol_lookup().reason().is_some());
    assert_eq!(token.raw_total_supply(), U256::ZERO);
    assert!(token.total_supply_lookup().is_fallback());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_batches_cover_participants_in_order() {
    let participants: Vec<Address> = (1..=65).map(addr).collect();
    let chain = participants
        .iter()
        .fold(MockChain::token(0, "WHL", U256::from(1u64)), |chain, a| {
            chain.with_balance(*a, U256::from(7u64))
        });

    let collected = aggregator(&chain, 30, 1).collect(&participants).await;

    assert_eq!(collected.batches, 3);
    assert_eq!(collected.failed_batches, 0);
    let batches = chain.aggregate_batches();
    assert_eq!(
        batches.iter().map(Vec::len).collect::<Vec<_>>(),
        vec![30, 30, 5]
    );
    assert_eq!(batches.concat(), participants);
    let holders: Vec<Address> = collected.records.iter().map(|r| r.address).collect();
    assert_eq!(holders, participants);
}

#[tokio::test(start_paused = true)]
async fn test_zero_balances_are_dropped() {
    let chain = MockChain::token(0, "WHL", U256::from(100u64))
        .with_balance(addr(1), U256::from(40u64))
        .with_balance(addr(3), U256::from(60u64));

    let collected = aggregator(&chain, 30, 1)
        .collect(&[addr(1), addr(2), addr(3)])
        .await;

    let holders: Vec<(Address, U256)> = collected
        .records
        .iter()
        .map(|r| (r.address, r.raw_balance))
        .collect();
    assert_eq!(
        holders,
        vec![(addr(1), U256::from(40u64)), (addr(3), U256::from(60u64))]
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_batch_does_not_affect_others() {
    let participants: Vec<Address> = (1..=6).map(addr).collect();
    let chain = participants
        .iter()
        .fold(MockChain::token(0, "WHL", U256::from(1u64)), |chain, a| {
            chain.with_balance(*a, U256::from(1u64))
        })
        .with_reverting_owner(addr(3));

    let collected = aggregator(&chain, 2, 1).collect(&participants).await;

    assert_eq!(collected.batches, 3);
    assert_eq!(collected.failed_batches, 1);
    let holders: Vec<Address> = collected.records.iter().map(|r| r.address).collect();
    assert_eq!(holders, vec![addr(1), addr(2), addr(5), addr(6)]);
    assert_eq!(chain.aggregate_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_batches_keep_order() {
    let participants: Vec<Address> = (1..=10).map(addr).collect();
    // Earlier batches answer slower, so they complete last
    let chain = participants
        .iter()
        .fold(MockChain::token(0, "WHL", U256::from(1u64)), |chain, a| {
            chain.with_balance(*a, U256::from(2u64))
        })
        .with_latency(addr(1), Duration::from_millis(400))
        .with_latency(addr(4), Duration::from_millis(300))
        .with_latency(addr(7), Duration::from_millis(200));

    let collected = aggregator(&chain, 3, 4).collect(&participants).await;

    let completed: Vec<Address> = chain
        .completed_batches()
        .iter()
        .map(|batch| batch[0])
        .collect();
    assert_eq!(completed, vec![addr(10), addr(7), addr(4), addr(1)]);

    assert_eq!(collected.batches, 4);
    let holders: Vec<Address> = collected.records.iter().map(|r| r.address).collect();
    assert_eq!(holders, participants);
}

#[tokio::test(start_paused = true)]
async fn test_undecodable_blobs_are_skipped() {
    let chain = MockChain::token(0, "WHL", U256::from(1u64))
        .with_balance(addr(1), U256::from(5u64))
        .with_raw_result(addr(2), Bytes::from(vec![1u8; 33]))
        .with_raw_result(addr(3), Bytes::new());

    let collected = aggregator(&chain, 30, 1)
        .collect(&[addr(1), addr(2), addr(3)])
        .await;

    assert_eq!(collected.records.len(), 1);
    assert_eq!(collected.records[0].address, addr(1));
}

#[tokio::test(start_paused = true)]
async fn test_batches_are_paced() {
    let participants: Vec<Address> = (1..=4).map(addr).collect();
    let chain = MockChain::token(0, "WHL", U256::from(1u64));
    let start = tokio::time::Instant::now();

    aggregator(&chain, 1, 1).collect(&participants).await;

    assert!(start.elapsed() >= Duration::from_millis(150));
}

#[tokio::test]
async fn test_classifier_uses_bytecode() {
    let chain = MockChain::default()
        .with_contract(addr(1))
        .with_code(addr(2), Bytes::from_static(&[0x00, 0x01]))
        .with_failing_code(addr(3));
    let classifier = AddressClassifier::new(Arc::new(chain.clone()), 2);

    let kinds = classifier
        .classify_all(&[addr(1), addr(2), addr(3), addr(4)])
        .await;

    assert_eq!(
        kinds,
        vec![
            AccountKind::Contract,
            AccountKind::Eoa,
            AccountKind::Eoa,
            AccountKind::Eoa
        ]
    );
    assert_eq!(chain.code_lookups().len(), 4);
}
