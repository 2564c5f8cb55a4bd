//! Full pipeline tests: deposit → offer → accept → withdraw, with supply
//! conservation verified after every scenario.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use orgledger_ledger::BalanceLedger;
use orgledger_match::gateway::{Gateway, TransferNotice, TransferSink};
use orgledger_match::MatchingEngine;
use orgledger_registry::OrgDirectory;
use orgledger_types::constants::{native_symbol, native_token_account};
use orgledger_types::{
    AccountId, AuthenticatedCaller, Fill, OfferId, OfferSide, OrgId, OrgledgerError, Result,
    TokenAmount, TokenSymbol,
};

fn dtk(amount: &str) -> TokenAmount {
    TokenAmount::new(amount.parse().unwrap(), TokenSymbol::new("DTK", 4))
}

fn tlos(amount: &str) -> TokenAmount {
    TokenAmount::new(amount.parse().unwrap(), native_symbol())
}

#[derive(Default)]
struct RecordingSink(Vec<TransferNotice>);

impl TransferSink for RecordingSink {
    fn send(&mut self, notice: TransferNotice) {
        self.0.push(notice);
    }
}

/// One organization with a registered DTK token and the full component set.
struct Pipeline {
    directory: OrgDirectory,
    ledger: BalanceLedger,
    engine: MatchingEngine,
    gateway: Gateway,
    sink: RecordingSink,
    org_id: OrgId,
    dtk_account: AccountId,
}

impl Pipeline {
    fn new() -> Self {
        let mut directory = OrgDirectory::new();
        let creator = AccountId::from("daoregistry");
        let org_id = directory.create(AccountId::from("dao.org1"), creator.clone(), "HASH_1");
        let dtk_account = AccountId::from("token.dtk");
        directory
            .add_token(
                &AuthenticatedCaller::new(creator),
                org_id,
                dtk_account.clone(),
                TokenSymbol::new("DTK", 4),
            )
            .unwrap();
        Self {
            directory,
            ledger: BalanceLedger::new(),
            engine: MatchingEngine::new(),
            gateway: Gateway::new(AccountId::from("orgledger")),
            sink: RecordingSink::default(),
            org_id,
            dtk_account,
        }
    }

    fn deposit(&mut self, who: &str, quantity: TokenAmount) {
        let token_account = if quantity.symbol == native_symbol() {
            native_token_account()
        } else {
            self.dtk_account.clone()
        };
        self.gateway
            .on_deposit(
                &self.directory,
                &mut self.ledger,
                &token_account,
                &AccountId::from(who),
                &quantity,
                &self.org_id.0.to_string(),
            )
            .unwrap();
    }

    fn withdraw(&mut self, who: &str, quantity: TokenAmount) -> Result<()> {
        self.gateway.withdraw(
            &AuthenticatedCaller::new(AccountId::from(who)),
            &self.directory,
            &mut self.ledger,
            &mut self.sink,
            self.org_id,
            &quantity,
        )
    }

    fn create_offer(&mut self, who: &str, side: OfferSide, quantity: &str, price: &str) -> OfferId {
        self.engine
            .create_offer(
                &AuthenticatedCaller::new(AccountId::from(who)),
                &self.directory,
                &mut self.ledger,
                self.org_id,
                side,
                dtk(quantity),
                tlos(price),
                BTreeMap::new(),
            )
            .unwrap()
    }

    fn accept(&mut self, who: &str, offer_id: OfferId, quantity: &str) -> Result<Fill> {
        self.engine.accept_offer(
            &AuthenticatedCaller::new(AccountId::from(who)),
            &self.directory,
            &mut self.ledger,
            self.org_id,
            offer_id,
            dtk(quantity),
        )
    }

    fn balance(&self, who: &str, symbol: &TokenSymbol) -> (Decimal, Decimal) {
        let token_account = if *symbol == native_symbol() {
            native_token_account()
        } else {
            self.dtk_account.clone()
        };
        let bal = self
            .ledger
            .balance(self.org_id, &AccountId::from(who), &token_account, symbol);
        (bal.available.amount, bal.locked.amount)
    }

    fn assert_conservation(&self) {
        self.gateway
            .verify_supply(&self.ledger, self.org_id, &native_symbol())
            .unwrap();
        self.gateway
            .verify_supply(&self.ledger, self.org_id, &TokenSymbol::new("DTK", 4))
            .unwrap();
    }
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn deposit_sell_accept_settles_and_closes() {
    let mut p = Pipeline::new();
    p.deposit("alice", dtk("100"));
    p.deposit("bob", tlos("200"));

    let offer_id = p.create_offer("alice", OfferSide::Sell, "40", "2");
    assert_eq!(p.balance("alice", &TokenSymbol::new("DTK", 4)), (dec("60"), dec("40")));

    let fill = p.accept("bob", offer_id, "40").unwrap();
    assert_eq!(fill.base_quantity, dtk("40"));
    assert_eq!(fill.quote_cost, tlos("80"));

    // Seller: lock drained, proceeds credited.
    assert_eq!(p.balance("alice", &TokenSymbol::new("DTK", 4)), (dec("60"), dec("0")));
    assert_eq!(p.balance("alice", &native_symbol()), (dec("80"), dec("0")));
    // Buyer: paid the cost, holds the base.
    assert_eq!(p.balance("bob", &native_symbol()), (dec("120"), dec("0")));
    assert_eq!(p.balance("bob", &TokenSymbol::new("DTK", 4)), (dec("40"), dec("0")));

    assert!(matches!(
        p.engine.offer(p.org_id, offer_id),
        Err(OrgledgerError::OfferNotFound(_))
    ));
    p.assert_conservation();
}

#[test]
fn buy_offer_round_trip_conserves_supply() {
    let mut p = Pipeline::new();
    p.deposit("alice", tlos("200"));
    p.deposit("bob", dtk("50"));

    let offer_id = p.create_offer("alice", OfferSide::Buy, "40", "2");
    assert_eq!(p.balance("alice", &native_symbol()), (dec("120"), dec("80")));

    p.accept("bob", offer_id, "40").unwrap();
    assert_eq!(p.balance("alice", &TokenSymbol::new("DTK", 4)), (dec("40"), dec("0")));
    assert_eq!(p.balance("alice", &native_symbol()), (dec("120"), dec("0")));
    assert_eq!(p.balance("bob", &native_symbol()), (dec("80"), dec("0")));
    p.assert_conservation();
}

#[test]
fn oversized_accept_trades_remaining_quantity() {
    let mut p = Pipeline::new();
    p.deposit("alice", dtk("100"));
    p.deposit("bob", tlos("200"));

    let offer_id = p.create_offer("alice", OfferSide::Sell, "40", "2");
    p.accept("bob", offer_id, "25").unwrap();

    // 15 left; asking for 99 trades exactly 15 and closes the offer.
    let fill = p.accept("bob", offer_id, "99").unwrap();
    assert_eq!(fill.base_quantity, dtk("15"));
    assert_eq!(fill.quote_cost, tlos("30"));
    assert!(p.engine.offer(p.org_id, offer_id).is_err());
    p.assert_conservation();
}

#[test]
fn cancelled_offer_restores_funds_in_full() {
    let mut p = Pipeline::new();
    p.deposit("alice", dtk("100"));

    let offer_id = p.create_offer("alice", OfferSide::Sell, "40", "2");
    p.engine
        .remove_offer(
            &AuthenticatedCaller::new(AccountId::from("alice")),
            &p.directory,
            &mut p.ledger,
            p.org_id,
            offer_id,
        )
        .unwrap();

    assert_eq!(p.balance("alice", &TokenSymbol::new("DTK", 4)), (dec("100"), dec("0")));
    p.assert_conservation();
}

#[test]
fn withdraw_full_balance_after_trading() {
    let mut p = Pipeline::new();
    p.deposit("alice", dtk("100"));
    p.deposit("bob", tlos("200"));

    let offer_id = p.create_offer("alice", OfferSide::Sell, "40", "2");
    p.accept("bob", offer_id, "40").unwrap();

    // Alice withdraws every token she holds, down to zero.
    p.withdraw("alice", tlos("80")).unwrap();
    p.withdraw("alice", dtk("60")).unwrap();
    assert_eq!(p.balance("alice", &native_symbol()), (dec("0"), dec("0")));
    assert_eq!(p.balance("alice", &TokenSymbol::new("DTK", 4)), (dec("0"), dec("0")));

    // One more unit is refused.
    let err = p.withdraw("alice", tlos("0.0001")).unwrap_err();
    assert!(matches!(err, OrgledgerError::InsufficientFunds { .. }));

    assert_eq!(p.sink.0.len(), 2);
    p.assert_conservation();
}

#[test]
fn locked_funds_cannot_be_withdrawn() {
    let mut p = Pipeline::new();
    p.deposit("alice", dtk("100"));
    p.create_offer("alice", OfferSide::Sell, "40", "2");

    // 60 available; the 40 under lock is out of reach.
    let err = p.withdraw("alice", dtk("70")).unwrap_err();
    assert!(matches!(err, OrgledgerError::InsufficientFunds { .. }));
    p.withdraw("alice", dtk("60")).unwrap();
    p.assert_conservation();
}

#[test]
fn taker_walks_the_book_best_price_first() {
    let mut p = Pipeline::new();
    p.deposit("alice", dtk("100"));
    p.deposit("carol", dtk("100"));
    p.deposit("bob", tlos("500"));

    p.create_offer("alice", OfferSide::Sell, "10", "3");
    let cheap = p.create_offer("carol", OfferSide::Sell, "10", "2");

    let token_idx = p.engine.offer(p.org_id, cheap).unwrap().token_idx;
    let best = p.engine.best_match(p.org_id, OfferSide::Sell, token_idx).unwrap();
    assert_eq!(best.id, cheap);

    let best_id = best.id;
    p.accept("bob", best_id, "10").unwrap();
    // With the cheap offer gone, the remaining ask tops the book.
    let next = p.engine.best_match(p.org_id, OfferSide::Sell, token_idx).unwrap();
    assert_eq!(next.price_per_unit, tlos("3"));
    p.assert_conservation();
}
