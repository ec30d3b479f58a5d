// ═══════════════════════════════════════════════════════════════════
// Service Tests — PortfolioService (normalizer), ValuationService,
// AssetActionService
// ═══════════════════════════════════════════════════════════════════

use std::sync::Mutex;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use wallet_portfolio_core::models::account::{
    AccountRecord, AddressBalance, EvmAccount, TokenBalance, UtxoAccount,
};
use wallet_portfolio_core::models::asset::AssetRegistry;
use wallet_portfolio_core::models::caip::{AccountId, AssetId, ChainId};
use wallet_portfolio_core::models::market::{MarketData, MarketDataMap};
use wallet_portfolio_core::services::action_service::{
    AssetAction, AssetActionService, IntentDispatcher, UiIntent, WalletConnection,
};
use wallet_portfolio_core::services::portfolio_service::PortfolioService;
use wallet_portfolio_core::services::valuation_service::{
    decimal_or_zero, from_base_unit, ValuationService,
};

const USDC: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
const DAI: &str = "0x6b175474e89094c44da98b954eedeac495271d0f";

fn eth_chain() -> ChainId {
    ChainId::ethereum_mainnet()
}

fn btc_chain() -> ChainId {
    ChainId::bitcoin_mainnet()
}

fn eth_account(n: u8) -> AccountId {
    AccountId::new(&eth_chain(), &format!("0x{:040x}", n))
}

fn btc_account() -> AccountId {
    AccountId::new(&btc_chain(), "xpub6BiVtCpG9fQPxnPmHXG8Phtz")
}

fn usdc_token(balance: &str) -> TokenBalance {
    TokenBalance {
        contract: USDC.to_string(),
        balance: balance.to_string(),
        precision: 6,
        symbol: "USDC".to_string(),
        name: "USD Coin".to_string(),
    }
}

fn dai_token(balance: &str) -> TokenBalance {
    TokenBalance {
        contract: DAI.to_string(),
        balance: balance.to_string(),
        precision: 18,
        symbol: "DAI".to_string(),
        name: "Dai Stablecoin".to_string(),
    }
}

fn evm_record(balance: &str, tokens: Vec<TokenBalance>) -> AccountRecord {
    AccountRecord::Evm(EvmAccount {
        chain_id: eth_chain(),
        balance: balance.to_string(),
        tokens,
    })
}

fn utxo_record(balances: &[&str]) -> AccountRecord {
    AccountRecord::Utxo(UtxoAccount {
        chain_id: btc_chain(),
        addresses: balances
            .iter()
            .enumerate()
            .map(|(i, b)| AddressBalance {
                address: format!("bc1q{i}"),
                balance: b.to_string(),
            })
            .collect(),
    })
}

// ═══════════════════════════════════════════════════════════════════
// PortfolioService — normalizer
// ═══════════════════════════════════════════════════════════════════

mod normalizer {
    use super::*;

    #[test]
    fn utxo_addresses_sum_into_one_balance() {
        let svc = PortfolioService::new();
        let input = vec![(btc_account(), utxo_record(&["100", "250", "0"]))];

        let portfolio = svc.accounts_to_portfolio(&input);

        let btc = btc_chain().native_asset_id();
        assert_eq!(portfolio.balances.get(&btc), Some("350"));
        assert_eq!(portfolio.accounts.assets_of(&btc_account()), &[btc]);
    }

    #[test]
    fn utxo_invalid_address_balance_counts_as_zero() {
        let svc = PortfolioService::new();
        let input = vec![(btc_account(), utxo_record(&["100", "garbage", "50"]))];

        let portfolio = svc.accounts_to_portfolio(&input);

        let btc = btc_chain().native_asset_id();
        assert_eq!(portfolio.balances.get(&btc), Some("150"));
    }

    #[test]
    fn utxo_account_with_no_addresses_yields_zero_balance() {
        let svc = PortfolioService::new();
        let input = vec![(btc_account(), utxo_record(&[]))];

        let portfolio = svc.accounts_to_portfolio(&input);

        let btc = btc_chain().native_asset_id();
        assert_eq!(portfolio.balances.get(&btc), Some("0"));
        assert_eq!(portfolio.accounts.len(), 1);
    }

    #[test]
    fn evm_account_with_two_tokens_yields_three_entries() {
        let svc = PortfolioService::new();
        let input = vec![(
            eth_account(1),
            evm_record(
                "5000000000000000000",
                vec![usdc_token("2000000"), dai_token("1000000000000000000")],
            ),
        )];

        let portfolio = svc.accounts_to_portfolio(&input);

        assert_eq!(portfolio.balances.len(), 3);
        assert_eq!(portfolio.accounts.assets_of(&eth_account(1)).len(), 3);
        assert_eq!(
            portfolio.balances.get(&eth_chain().native_asset_id()),
            Some("5000000000000000000")
        );
        assert_eq!(
            portfolio.balances.get(&AssetId::erc20(&eth_chain(), USDC)),
            Some("2000000")
        );
    }

    #[test]
    fn evm_account_with_no_tokens_yields_native_only() {
        let svc = PortfolioService::new();
        let input = vec![(eth_account(1), evm_record("7", vec![]))];

        let portfolio = svc.accounts_to_portfolio(&input);

        assert_eq!(portfolio.balances.len(), 1);
        assert_eq!(
            portfolio.accounts.assets_of(&eth_account(1)),
            &[eth_chain().native_asset_id()]
        );
    }

    #[test]
    fn native_asset_is_listed_before_tokens() {
        let svc = PortfolioService::new();
        let input = vec![(eth_account(1), evm_record("1", vec![usdc_token("1")]))];

        let portfolio = svc.accounts_to_portfolio(&input);

        let assets = portfolio.accounts.assets_of(&eth_account(1));
        assert_eq!(assets[0], eth_chain().native_asset_id());
        assert_eq!(assets[1], AssetId::erc20(&eth_chain(), USDC));
    }

    #[test]
    fn same_asset_across_accounts_accumulates() {
        let svc = PortfolioService::new();
        let input = vec![
            (eth_account(1), evm_record("100", vec![])),
            (eth_account(2), evm_record("250", vec![])),
        ];

        let portfolio = svc.accounts_to_portfolio(&input);

        assert_eq!(
            portfolio.balances.get(&eth_chain().native_asset_id()),
            Some("350")
        );
        assert_eq!(portfolio.accounts.len(), 2);
    }

    #[test]
    fn token_contract_case_is_normalized() {
        let svc = PortfolioService::new();
        let mut shouting = usdc_token("5");
        shouting.contract = shouting.contract.to_uppercase().replace("0X", "0x");
        let input = vec![
            (eth_account(1), evm_record("0", vec![usdc_token("5")])),
            (eth_account(2), evm_record("0", vec![shouting])),
        ];

        let portfolio = svc.accounts_to_portfolio(&input);

        // Both spellings land on the same asset id
        assert_eq!(
            portfolio.balances.get(&AssetId::erc20(&eth_chain(), USDC)),
            Some("10")
        );
    }

    #[test]
    fn every_listed_asset_has_a_balance_entry() {
        let svc = PortfolioService::new();
        let input = vec![
            (
                eth_account(1),
                evm_record("1", vec![usdc_token("2"), dai_token("3")]),
            ),
            (eth_account(2), evm_record("4", vec![])),
            (btc_account(), utxo_record(&["5", "6"])),
        ];

        let portfolio = svc.accounts_to_portfolio(&input);

        for account_id in &portfolio.accounts.ids {
            for asset_id in portfolio.accounts.assets_of(account_id) {
                assert!(
                    portfolio.balances.get(asset_id).is_some(),
                    "asset {asset_id} listed for {account_id} has no balance entry"
                );
            }
        }
    }

    #[test]
    fn normalizing_twice_yields_structurally_equal_portfolios() {
        let svc = PortfolioService::new();
        let input = vec![
            (
                eth_account(1),
                evm_record("1000", vec![usdc_token("2000000")]),
            ),
            (btc_account(), utxo_record(&["100", "250"])),
        ];

        let first = svc.accounts_to_portfolio(&input);
        let second = svc.accounts_to_portfolio(&input);

        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_yields_empty_portfolio() {
        let svc = PortfolioService::new();
        let portfolio = svc.accounts_to_portfolio(&[]);
        assert!(portfolio.is_empty());
    }

    #[test]
    fn discovered_assets_carry_token_metadata() {
        let svc = PortfolioService::new();
        let input = vec![(
            eth_account(1),
            evm_record("0", vec![usdc_token("1"), dai_token("2")]),
        )];

        let discovered = svc.discovered_assets(&input);

        assert_eq!(discovered.len(), 2);
        assert_eq!(discovered[0].symbol, "USDC");
        assert_eq!(discovered[0].precision, 6);
        assert_eq!(discovered[1].asset_id, AssetId::erc20(&eth_chain(), DAI));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Decimal helpers
// ═══════════════════════════════════════════════════════════════════

mod decimal_helpers {
    use super::*;

    #[test]
    fn decimal_or_zero_parses_plain_numbers() {
        assert_eq!(decimal_or_zero("1.5"), dec!(1.5));
        assert_eq!(decimal_or_zero(" 42 "), dec!(42));
    }

    #[test]
    fn decimal_or_zero_coerces_garbage() {
        assert_eq!(decimal_or_zero("wat"), Decimal::ZERO);
        assert_eq!(decimal_or_zero(""), Decimal::ZERO);
    }

    #[test]
    fn from_base_unit_scales_exactly() {
        assert_eq!(from_base_unit("150000000", 8), dec!(1.5));
        assert_eq!(from_base_unit("1", 18), dec!(0.000000000000000001));
        assert_eq!(from_base_unit("2000000", 6), dec!(2));
    }

    #[test]
    fn from_base_unit_zero_precision_is_identity() {
        assert_eq!(from_base_unit("350", 0), dec!(350));
    }

    #[test]
    fn from_base_unit_absurd_precision_is_zero() {
        assert_eq!(from_base_unit("1000", 29), Decimal::ZERO);
    }
}

// ═══════════════════════════════════════════════════════════════════
// ValuationService
// ═══════════════════════════════════════════════════════════════════

mod valuation {
    use super::*;
    use wallet_portfolio_core::models::portfolio::Portfolio;

    fn registry_with_btc() -> AssetRegistry {
        AssetRegistry::with_defaults()
    }

    /// One BTC-style position: balance in base units with precision 8.
    fn btc_portfolio(base_units: &str) -> Portfolio {
        let svc = PortfolioService::new();
        svc.accounts_to_portfolio(&[(btc_account(), utxo_record(&[base_units]))])
    }

    fn market_with(asset_id: &AssetId, price: Decimal) -> MarketDataMap {
        let mut map = MarketDataMap::new();
        map.insert(asset_id.clone(), MarketData::new(price));
        map
    }

    #[test]
    fn fiat_balance_scales_and_multiplies() {
        let valuation = ValuationService::new();
        let portfolio = btc_portfolio("150000000");
        let btc = btc_chain().native_asset_id();
        let market = market_with(&btc, dec!(2.00));

        let fiat = valuation.fiat_balance(&portfolio, &market, &registry_with_btc(), &btc);

        assert_eq!(fiat, dec!(3.00));
    }

    #[test]
    fn fiat_balance_rounds_to_cents() {
        let valuation = ValuationService::new();
        let portfolio = btc_portfolio("123456789");
        let btc = btc_chain().native_asset_id();
        // 1.23456789 × 1000 = 1234.56789 → 1234.57
        let market = market_with(&btc, dec!(1000));

        let fiat = valuation.fiat_balance(&portfolio, &market, &registry_with_btc(), &btc);

        assert_eq!(fiat, dec!(1234.57));
    }

    #[test]
    fn unknown_price_values_to_zero() {
        let valuation = ValuationService::new();
        let portfolio = btc_portfolio("150000000");
        let btc = btc_chain().native_asset_id();

        let fiat = valuation.fiat_balance(
            &portfolio,
            &MarketDataMap::new(),
            &registry_with_btc(),
            &btc,
        );

        assert_eq!(fiat, Decimal::ZERO);
    }

    #[test]
    fn unknown_precision_values_to_zero() {
        let valuation = ValuationService::new();
        let portfolio = btc_portfolio("150000000");
        let btc = btc_chain().native_asset_id();
        let market = market_with(&btc, dec!(2.00));

        let fiat = valuation.fiat_balance(&portfolio, &market, &AssetRegistry::new(), &btc);

        assert_eq!(fiat, Decimal::ZERO);
    }

    #[test]
    fn unheld_asset_values_to_zero() {
        let valuation = ValuationService::new();
        let portfolio = Portfolio::new();
        let btc = btc_chain().native_asset_id();
        let market = market_with(&btc, dec!(2.00));

        let fiat = valuation.fiat_balance(&portfolio, &market, &registry_with_btc(), &btc);

        assert_eq!(fiat, Decimal::ZERO);
    }

    #[test]
    fn total_sums_per_asset_values_with_gaps_as_zero() {
        let svc = PortfolioService::new();
        let valuation = ValuationService::new();
        // ETH account with USDC token + BTC account; no price for USDC
        let portfolio = svc.accounts_to_portfolio(&[
            (
                eth_account(1),
                evm_record("2000000000000000000", vec![usdc_token("9000000")]),
            ),
            (btc_account(), utxo_record(&["150000000"])),
        ]);

        let mut market = MarketDataMap::new();
        market.insert(eth_chain().native_asset_id(), MarketData::new(dec!(100.10)));
        market.insert(btc_chain().native_asset_id(), MarketData::new(dec!(2.00)));

        let total = valuation.total_fiat_balance(&portfolio, &market, &registry_with_btc());

        // 2 × 100.10 + (USDC: no price → 0) + 1.5 × 2.00 = 203.20
        assert_eq!(total, dec!(203.20));
    }

    #[test]
    fn total_of_empty_portfolio_is_zero() {
        let valuation = ValuationService::new();
        let total = valuation.total_fiat_balance(
            &Portfolio::new(),
            &MarketDataMap::new(),
            &registry_with_btc(),
        );
        assert_eq!(total, Decimal::ZERO);
    }

    #[test]
    fn balance_of_defaults_to_zero_string() {
        let valuation = ValuationService::new();
        let portfolio = btc_portfolio("350");
        assert_eq!(
            valuation.balance_of(&portfolio, &btc_chain().native_asset_id()),
            "350"
        );
        assert_eq!(
            valuation.balance_of(&portfolio, &eth_chain().native_asset_id()),
            "0"
        );
    }

    #[test]
    fn held_asset_ids_memoizes_by_set_equality() {
        let svc = PortfolioService::new();
        let valuation = ValuationService::new();

        // Same two assets recorded in opposite orders
        let forward = svc.accounts_to_portfolio(&[
            (eth_account(1), evm_record("1", vec![])),
            (btc_account(), utxo_record(&["1"])),
        ]);
        let reverse = svc.accounts_to_portfolio(&[
            (btc_account(), utxo_record(&["1"])),
            (eth_account(1), evm_record("1", vec![])),
        ]);
        assert_ne!(forward.balances.ids, reverse.balances.ids);

        let first = valuation.held_asset_ids(&forward);
        let second = valuation.held_asset_ids(&reverse);

        // Second read returns the memoized vector, order included
        assert_eq!(first, second);
    }

    #[test]
    fn held_asset_ids_recomputes_on_a_different_set() {
        let svc = PortfolioService::new();
        let valuation = ValuationService::new();

        let one = svc.accounts_to_portfolio(&[(btc_account(), utxo_record(&["1"]))]);
        let two = svc.accounts_to_portfolio(&[
            (btc_account(), utxo_record(&["1"])),
            (eth_account(1), evm_record("1", vec![])),
        ]);

        assert_eq!(valuation.held_asset_ids(&one).len(), 1);
        assert_eq!(valuation.held_asset_ids(&two).len(), 2);
    }

    #[test]
    fn held_assets_maps_known_metadata_only() {
        let svc = PortfolioService::new();
        let valuation = ValuationService::new();
        let portfolio = svc.accounts_to_portfolio(&[
            (btc_account(), utxo_record(&["1"])),
            (
                eth_account(1),
                evm_record(
                    "1",
                    vec![TokenBalance {
                        contract: "0x000000000000000000000000000000000000dead".into(),
                        balance: "1".into(),
                        precision: 9,
                        symbol: "MYSTERY".into(),
                        name: "Mystery Token".into(),
                    }],
                ),
            ),
        ]);

        let held = valuation.held_assets(&portfolio, &registry_with_btc());

        // BTC and ETH are in the registry, the mystery token is not
        assert_eq!(held.len(), 2);
        assert_eq!(
            held.get(&btc_chain().native_asset_id()).unwrap().symbol,
            "BTC"
        );
    }
}

// ═══════════════════════════════════════════════════════════════════
// AssetActionService
// ═══════════════════════════════════════════════════════════════════

mod actions {
    use super::*;

    struct StubWallet {
        connected: bool,
    }

    impl WalletConnection for StubWallet {
        fn is_connected(&self) -> bool {
            self.connected
        }
    }

    #[derive(Default)]
    struct RecordingDispatcher {
        intents: Mutex<Vec<UiIntent>>,
    }

    impl IntentDispatcher for RecordingDispatcher {
        fn dispatch(&self, intent: UiIntent) {
            self.intents.lock().unwrap().push(intent);
        }
    }

    #[test]
    fn send_with_connected_wallet_opens_send_modal() {
        let svc = AssetActionService::new();
        let dispatcher = RecordingDispatcher::default();
        let asset_id = eth_chain().native_asset_id();
        let account_id = eth_account(1);

        let intent = svc.activate(
            &StubWallet { connected: true },
            &dispatcher,
            AssetAction::Send,
            &asset_id,
            Some(&account_id),
        );

        assert_eq!(
            intent,
            UiIntent::OpenSendModal {
                asset_id: asset_id.clone(),
                account_id: Some(account_id),
            }
        );
        assert_eq!(dispatcher.intents.lock().unwrap().as_slice(), &[intent]);
    }

    #[test]
    fn receive_with_connected_wallet_opens_receive_modal() {
        let svc = AssetActionService::new();
        let dispatcher = RecordingDispatcher::default();
        let asset_id = btc_chain().native_asset_id();

        let intent = svc.activate(
            &StubWallet { connected: true },
            &dispatcher,
            AssetAction::Receive,
            &asset_id,
            None,
        );

        assert_eq!(
            intent,
            UiIntent::OpenReceiveModal {
                asset_id,
                account_id: None,
            }
        );
    }

    #[test]
    fn disconnected_wallet_gets_connection_prompt_instead() {
        let svc = AssetActionService::new();
        let dispatcher = RecordingDispatcher::default();
        let asset_id = eth_chain().native_asset_id();

        for action in [AssetAction::Send, AssetAction::Receive] {
            let intent = svc.activate(
                &StubWallet { connected: false },
                &dispatcher,
                action,
                &asset_id,
                None,
            );
            assert_eq!(intent, UiIntent::RequestWalletConnection);
        }

        assert_eq!(dispatcher.intents.lock().unwrap().len(), 2);
    }
}
