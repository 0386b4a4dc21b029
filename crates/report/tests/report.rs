// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, U256};
use anyhow::Result;
use chrono::{Local, TimeZone};
use serde_json::Value;
use whales_config::ChainConfig;
use whales_evm::{AccountKind, BalanceRecord, Lookup, TokenDescriptor};
use whales_report::{render_table, Report, ReportSink, WhaleRanker};

fn token(symbol: &str, supply: u64) -> TokenDescriptor {
    TokenDescriptor::new(
        Address::repeat_byte(0x42),
        0,
        Lookup::Found(symbol.to_string()),
        Lookup::Found(U256::from(supply)),
    )
}

fn sample_report() -> Report {
    let token = token("WHL", 1000);
    let ranker = WhaleRanker::for_token(&token, 10.0);
    let records = vec![
        BalanceRecord {
            address: Address::with_last_byte(0x11),
            raw_balance: U256::from(1000u64),
        },
        BalanceRecord {
            address: Address::with_last_byte(0x33),
            raw_balance: U256::from(500u64),
        },
    ];
    let candidates = ranker.qualify(&records);
    let whales = ranker.rank(
        &candidates,
        &[AccountKind::Eoa, AccountKind::Contract],
        &ChainConfig::default(),
    );
    let created_at = Local.timestamp_opt(1_700_000_000, 0).unwrap();
    Report::at(
        &token,
        ranker.total_supply(),
        ranker.threshold_percent(),
        whales,
        created_at,
    )
}

#[test]
fn test_report_is_written_as_json() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let report = sample_report();

    let path = ReportSink::new(dir.path()).write(&report)?;

    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("whales_WHL_1700000000.json")
    );
    let doc: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(doc["token"], "WHL");
    assert_eq!(doc["contract"], Address::repeat_byte(0x42).to_string());
    assert_eq!(doc["total_supply"], 1000.0);
    assert_eq!(doc["threshold_percent"], 10.0);
    assert_eq!(doc["total_whales_found"], 2);
    assert_eq!(doc["generated_at"], report.generated_at.as_str());

    let whales = doc["whales"].as_array().unwrap();
    assert_eq!(whales.len(), 2);
    assert_eq!(whales[0]["address"], Address::with_last_byte(0x11).to_string());
    assert_eq!(whales[0]["amount"], 1000.0);
    assert_eq!(whales[0]["percentage"], 100.0);
    assert_eq!(whales[0]["type"], "EOA");
    assert_eq!(whales[0]["label"], "Wallet");
    assert_eq!(whales[1]["amount"], 500.0);
    assert_eq!(whales[1]["percentage"], 50.0);
    assert_eq!(whales[1]["type"], "Contract");
    assert_eq!(whales[1]["label"], "Contract");
    assert!(whales[1]["explorer"]
        .as_str()
        .unwrap()
        .starts_with("https://polygonscan.com/address/0x"));
    Ok(())
}

#[test]
fn test_existing_report_is_not_overwritten() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let report = sample_report();
    let sink = ReportSink::new(dir.path().join("nested"));

    let first = sink.write(&report)?;
    let second = sink.write(&report)?;

    assert_ne!(first, second);
    assert!(first.exists());
    assert_eq!(
        second.file_name().and_then(|n| n.to_str()),
        Some("whales_WHL_1700000000_1.json")
    );
    Ok(())
}

#[test]
fn test_table_renders_limited_rows() {
    let report = sample_report();

    let full = render_table(&report, 100);
    assert!(full.contains("WHALES >= 10% OF TOTAL SUPPLY (2 found)"));
    assert!(full.contains("1,000.00"));
    assert!(full.contains("100.0000%"));
    assert!(full.contains("50.0000%"));
    assert!(full.contains("Wallet"));

    let top = render_table(&report, 1);
    assert!(top.contains("1,000.00"));
    assert!(!top.contains("500.00"));
    assert!(top.contains("1 more in the saved report"));
}
