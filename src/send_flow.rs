// src/send_flow.rs
//
// The coordinator behind the send form. Owns one send attempt at a time:
// recipient resolution (debounced, stale-result-proof), best-effort fee
// estimation (keyed by a monotonic token), submission gating, and the
// transfer itself through the injected capability.

use crate::amount::{lamports_to_sol, parse_amount};
use crate::components::common::Asset;
use crate::domain_resolver::{DomainResolver, RecipientResolver};
use crate::gift::{self, GIFT_MIN_USD};
use crate::transaction::{FeeQuoter, TransferCapability, TransferError};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SendFlowError {
    #[error("invalid or unresolved recipient address")]
    InvalidAddress,
    #[error("amount must be a positive number")]
    InvalidAmount,
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("gift value is below the ${GIFT_MIN_USD} minimum")]
    BelowMinimumGiftAmount,
    #[error("fee estimation failed: {0}")]
    FeeEstimationFailed(String),
    #[error("transaction rejected: {0}")]
    SubmissionRejected(String),
    #[error("network error: {0}")]
    NetworkError(String),
    #[error("a submission is already in flight")]
    AlreadySubmitting,
}

impl From<TransferError> for SendFlowError {
    fn from(e: TransferError) -> Self {
        match e {
            TransferError::Rejected(msg) => SendFlowError::SubmissionRejected(msg),
            TransferError::Network(msg) => SendFlowError::NetworkError(msg),
        }
    }
}

/// Where the panel's success/failure messages go. The UI implementation
/// pushes toasts; tests record.
pub trait NotificationSink: Send + Sync {
    fn success(&self, title: &str, message: &str);
    fn failure(&self, title: &str, message: &str);
}

/// Exactly one of these holds at any time.
#[derive(Debug, Clone, PartialEq)]
pub enum Recipient {
    Unresolved,
    /// The input itself parsed as an address
    Direct(Pubkey),
    /// A name the resolver mapped to an address
    Resolved { name: String, address: Pubkey },
}

impl Recipient {
    pub fn address(&self) -> Option<Pubkey> {
        match self {
            Recipient::Unresolved => None,
            Recipient::Direct(pk) => Some(*pk),
            Recipient::Resolved { address, .. } => Some(*address),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SendStatus {
    Idle,
    Estimating,
    Ready,
    Submitting,
    Submitted,
    Failed,
}

/// What a successful submission hands back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct SendReceipt {
    pub signature: String,
    /// Present in gift mode: the code the recipient claims with
    pub claim_code: Option<String>,
}

/// Immutable view of the request for the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SendSnapshot {
    pub asset: Asset,
    pub gift_mode: bool,
    pub recipient_input: String,
    pub recipient: Recipient,
    pub resolving: bool,
    pub address_error: Option<String>,
    pub amount_input: String,
    pub estimated_fee: Option<u64>,
    pub estimated_fee_usd: Option<f64>,
    pub status: SendStatus,
    pub can_submit: bool,
    pub gift_amount_valid: bool,
    pub insufficient_balance: bool,
}

struct SendState {
    asset: Asset,
    gift_mode: bool,
    recipient_input: String,
    recipient: Recipient,
    resolving: bool,
    resolution_failed: bool,
    amount_input: String,
    estimated_fee: Option<u64>,
    estimated_fee_usd: Option<f64>,
    status: SendStatus,
    // Monotonic tokens: only the latest issued resolution/estimation may
    // apply its result.
    resolve_seq: u64,
    estimate_seq: u64,
}

impl SendState {
    fn new(asset: Asset) -> Self {
        Self {
            asset,
            gift_mode: false,
            recipient_input: String::new(),
            recipient: Recipient::Unresolved,
            resolving: false,
            resolution_failed: false,
            amount_input: String::new(),
            estimated_fee: None,
            estimated_fee_usd: None,
            status: SendStatus::Idle,
            resolve_seq: 0,
            estimate_seq: 0,
        }
    }

    fn parsed_amount(&self) -> Option<u64> {
        parse_amount(&self.amount_input, self.asset.decimals)
    }

    fn amount_ui(&self) -> f64 {
        self.amount_input.trim().parse::<f64>().unwrap_or(0.0)
    }

    fn insufficient_balance(&self) -> bool {
        match self.parsed_amount() {
            Some(units) => units > self.asset.quantity,
            None => false,
        }
    }

    /// The gift floor: $1 minimum, except a zero USD value, which means
    /// the user has not entered anything meaningful yet.
    fn gift_value_ok(&self) -> bool {
        let value_usd = self.amount_ui() * self.asset.price_usd.unwrap_or(0.0);
        value_usd == 0.0 || value_usd >= GIFT_MIN_USD
    }

    /// The inline-error variant of the floor check: quiet while the field
    /// is empty or while the insufficient-balance error already shows.
    fn gift_amount_valid(&self) -> bool {
        if !self.gift_mode || self.amount_input.trim().is_empty() || self.insufficient_balance() {
            return true;
        }
        self.gift_value_ok()
    }

    fn can_submit(&self) -> bool {
        if self.status == SendStatus::Submitting {
            return false;
        }
        let units = match self.parsed_amount() {
            Some(u) if u > 0 => u,
            _ => return false,
        };
        if units > self.asset.quantity {
            return false;
        }
        // Gift mode escrows under a derived keypair, so there is no
        // recipient to validate; everything else needs one.
        if self.gift_mode {
            if !self.gift_value_ok() {
                return false;
            }
        } else if self.recipient.address().is_none() {
            return false;
        }
        true
    }

    fn clear_fee(&mut self) {
        self.estimated_fee = None;
        self.estimated_fee_usd = None;
        // invalidate any estimate still in flight; the inputs it was
        // quoted against are gone
        self.estimate_seq += 1;
    }

    fn snapshot(&self) -> SendSnapshot {
        let address_error = if self.resolution_failed && !self.resolving {
            Some("Invalid wallet address".to_string())
        } else {
            None
        };
        SendSnapshot {
            asset: self.asset.clone(),
            gift_mode: self.gift_mode,
            recipient_input: self.recipient_input.clone(),
            recipient: self.recipient.clone(),
            resolving: self.resolving,
            address_error,
            amount_input: self.amount_input.clone(),
            estimated_fee: self.estimated_fee,
            estimated_fee_usd: self.estimated_fee_usd,
            status: self.status,
            can_submit: self.can_submit(),
            gift_amount_valid: self.gift_amount_valid(),
            insufficient_balance: self.insufficient_balance(),
        }
    }
}

pub struct SendFlowCoordinator {
    state: Mutex<SendState>,
    resolver: Arc<dyn RecipientResolver>,
    fee_quoter: Arc<dyn FeeQuoter>,
    capability: Arc<dyn TransferCapability>,
    sink: Arc<dyn NotificationSink>,
    sol_price_usd: Mutex<Option<f64>>,
    debounce: Duration,
    listener: Mutex<Option<Box<dyn Fn(SendSnapshot) + Send + Sync>>>,
}

impl SendFlowCoordinator {
    pub fn new(
        asset: Asset,
        resolver: Arc<dyn RecipientResolver>,
        fee_quoter: Arc<dyn FeeQuoter>,
        capability: Arc<dyn TransferCapability>,
        sink: Arc<dyn NotificationSink>,
    ) -> Arc<Self> {
        Self::with_debounce(asset, resolver, fee_quoter, capability, sink, DEFAULT_DEBOUNCE)
    }

    /// Tests shrink the quiet interval to keep timing assertions fast.
    pub fn with_debounce(
        asset: Asset,
        resolver: Arc<dyn RecipientResolver>,
        fee_quoter: Arc<dyn FeeQuoter>,
        capability: Arc<dyn TransferCapability>,
        sink: Arc<dyn NotificationSink>,
        debounce: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SendState::new(asset)),
            resolver,
            fee_quoter,
            capability,
            sink,
            sol_price_usd: Mutex::new(None),
            debounce,
            listener: Mutex::new(None),
        })
    }

    /// Register the UI's reconcile callback; called after every state
    /// change with a fresh snapshot.
    pub fn set_listener(&self, listener: Box<dyn Fn(SendSnapshot) + Send + Sync>) {
        *self.listener.lock().unwrap() = Some(listener);
    }

    pub fn set_sol_price(&self, price_usd: f64) {
        *self.sol_price_usd.lock().unwrap() = Some(price_usd);
    }

    pub fn snapshot(&self) -> SendSnapshot {
        self.state.lock().unwrap().snapshot()
    }

    pub fn can_submit(&self) -> bool {
        self.state.lock().unwrap().can_submit()
    }

    pub fn gift_amount_valid(&self) -> bool {
        self.state.lock().unwrap().gift_amount_valid()
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        if let Some(listener) = &*self.listener.lock().unwrap() {
            listener(snapshot);
        }
    }

    pub fn set_gift_mode(self: &Arc<Self>, on: bool) {
        {
            let mut st = self.state.lock().unwrap();
            st.gift_mode = on;
            if on {
                // the escrow address is derived at submit time
                st.clear_fee();
            }
        }
        self.notify();
    }

    /// Store raw recipient text. A well-formed address applies
    /// immediately; anything name-shaped resolves after the quiet
    /// interval, and results for superseded input are dropped.
    pub fn set_recipient_input(self: &Arc<Self>, raw: &str) {
        let trimmed = raw.trim().to_string();
        let needs_resolution = {
            let mut st = self.state.lock().unwrap();
            st.recipient_input = raw.to_string();
            st.resolve_seq += 1;
            st.resolution_failed = false;

            if trimmed.is_empty() {
                st.recipient = Recipient::Unresolved;
                st.resolving = false;
                st.clear_fee();
                false
            } else if let Ok(pk) = Pubkey::from_str(&trimmed) {
                st.recipient = Recipient::Direct(pk);
                st.resolving = false;
                false
            } else if DomainResolver::is_domain(&trimmed) {
                st.recipient = Recipient::Unresolved;
                st.resolving = true;
                st.clear_fee();
                true
            } else {
                st.recipient = Recipient::Unresolved;
                st.resolving = false;
                st.resolution_failed = true;
                st.clear_fee();
                false
            }
        };

        if needs_resolution {
            let seq = self.state.lock().unwrap().resolve_seq;
            let me = self.clone();
            tokio::spawn(async move {
                me.resolve_after_quiet_interval(seq, trimmed).await;
            });
        } else {
            self.request_estimate();
        }
        self.notify();
    }

    async fn resolve_after_quiet_interval(self: Arc<Self>, seq: u64, input: String) {
        tokio::time::sleep(self.debounce).await;

        // input changed during the quiet period
        if self.state.lock().unwrap().resolve_seq != seq {
            return;
        }

        let result = self.resolver.resolve(&input).await;

        {
            let mut st = self.state.lock().unwrap();
            // re-check: a lookup can outlive several keystrokes
            if st.resolve_seq != seq || st.recipient_input.trim() != input {
                return;
            }
            st.resolving = false;
            match result {
                // A name mapping to the zero address is no mapping at all.
                Ok(Some(address)) if address != Pubkey::default() => {
                    st.recipient = Recipient::Resolved {
                        name: input.clone(),
                        address,
                    };
                    st.resolution_failed = false;
                }
                Ok(_) => {
                    st.recipient = Recipient::Unresolved;
                    st.resolution_failed = true;
                    st.clear_fee();
                }
                Err(e) => {
                    log::warn!("Name resolution for '{}' failed: {}", input, e);
                    st.recipient = Recipient::Unresolved;
                    st.resolution_failed = true;
                    st.clear_fee();
                }
            }
        }

        self.request_estimate();
        self.notify();
    }

    pub fn set_amount_input(self: &Arc<Self>, raw: &str) {
        {
            let mut st = self.state.lock().unwrap();
            st.amount_input = raw.to_string();
            if st.parsed_amount().is_none() {
                st.clear_fee();
            }
        }
        self.request_estimate();
        self.notify();
    }

    /// Re-estimate the network fee for the current recipient + amount.
    /// Best effort: failures clear the fee display and are logged, they
    /// never block submission. Results carry the token issued here and
    /// are dropped unless still the latest.
    pub fn request_estimate(self: &Arc<Self>) {
        let params = {
            let mut st = self.state.lock().unwrap();
            let dest = match st.recipient.address() {
                Some(pk) => pk,
                None => return,
            };
            let units = match st.parsed_amount() {
                Some(u) if u > 0 => u,
                _ => return,
            };
            st.estimate_seq += 1;
            if st.status == SendStatus::Idle || st.status == SendStatus::Ready {
                st.status = SendStatus::Estimating;
            }
            (st.estimate_seq, dest, units, st.asset.mint, st.asset.decimals)
        };
        let (token, dest, units, mint, decimals) = params;

        let me = self.clone();
        tokio::spawn(async move {
            let result = match mint {
                None => me.fee_quoter.quote_native_fee(&dest, units).await,
                Some(mint) => me.fee_quoter.quote_token_fee(&mint, decimals, &dest, units).await,
            };

            let sol_price = *me.sol_price_usd.lock().unwrap();
            {
                let mut st = me.state.lock().unwrap();
                if st.estimate_seq != token {
                    // superseded; a fresher estimate owns the display
                    return;
                }
                match result {
                    Ok(fee) => {
                        st.estimated_fee = Some(fee);
                        st.estimated_fee_usd = sol_price.map(|p| lamports_to_sol(fee) * p);
                    }
                    Err(e) => {
                        log::warn!("Fee estimation failed: {}", e);
                        st.clear_fee();
                    }
                }
                if st.status == SendStatus::Estimating {
                    st.status = SendStatus::Ready;
                }
            }
            me.notify();
        });
    }

    /// Re-validate and send. On success the inputs reset for the next
    /// attempt; on failure they stay put and the typed error is both
    /// returned and pushed to the sink. No automatic retry.
    pub async fn submit(self: &Arc<Self>) -> Result<SendReceipt, SendFlowError> {
        let (dest, units, gift_code, asset) = {
            let mut st = self.state.lock().unwrap();
            if st.status == SendStatus::Submitting {
                return Err(SendFlowError::AlreadySubmitting);
            }
            let units = match st.parsed_amount() {
                Some(u) if u > 0 => u,
                _ => return Err(SendFlowError::InvalidAmount),
            };
            if units > st.asset.quantity {
                return Err(SendFlowError::InsufficientBalance);
            }

            let (dest, gift_code) = if st.gift_mode {
                if !st.gift_value_ok() {
                    return Err(SendFlowError::BelowMinimumGiftAmount);
                }
                let code = gift::ClaimCode::generate();
                let escrow = code.escrow_address();
                (escrow, Some(code.to_string()))
            } else {
                match st.recipient.address() {
                    Some(pk) => (pk, None),
                    None => return Err(SendFlowError::InvalidAddress),
                }
            };

            st.status = SendStatus::Submitting;
            (dest, units, gift_code, st.asset.clone())
        };
        self.notify();

        let result = match asset.mint {
            None => self.capability.transfer_native(&dest, units).await,
            Some(mint) => {
                // A token gift escrows no lamports of its own, and the
                // escrow pays the claim sweep's fee, so fund it first.
                let gas = if gift_code.is_some() {
                    self.capability
                        .transfer_native(&dest, gift::STARTER_GAS_LAMPORTS)
                        .await
                } else {
                    Ok(String::new())
                };
                match gas {
                    Ok(_) => {
                        self.capability
                            .transfer_token(&mint, asset.decimals, &dest, units)
                            .await
                    }
                    Err(e) => Err(e),
                }
            }
        };

        let outcome = {
            let mut st = self.state.lock().unwrap();
            match result {
                Ok(signature) => {
                    st.status = SendStatus::Submitted;
                    st.amount_input.clear();
                    st.recipient_input.clear();
                    st.recipient = Recipient::Unresolved;
                    st.resolution_failed = false;
                    st.clear_fee();
                    Ok(SendReceipt {
                        signature,
                        claim_code: gift_code,
                    })
                }
                Err(e) => {
                    st.status = SendStatus::Ready;
                    Err(SendFlowError::from(e))
                }
            }
        };
        self.notify();

        match &outcome {
            Ok(receipt) => {
                self.sink.success(
                    "Transaction Submitted",
                    &format!("Your {} has been sent ({})", asset.symbol, receipt.signature),
                );
            }
            Err(e) => {
                self.sink.failure("Transaction Failed", &e.to_string());
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};

    const SIG: &str = "5VERYFAKESIGNATURExxxxxxxxxxxxxxxxxxxxxxxxx";

    struct StubResolver {
        names: HashMap<String, Pubkey>,
    }

    impl StubResolver {
        fn new(entries: &[(&str, Pubkey)]) -> Arc<Self> {
            Arc::new(Self {
                names: entries
                    .iter()
                    .map(|(n, p)| (n.to_string(), *p))
                    .collect(),
            })
        }
    }

    #[async_trait]
    impl RecipientResolver for StubResolver {
        async fn resolve(
            &self,
            name: &str,
        ) -> Result<Option<Pubkey>, crate::domain_resolver::DomainError> {
            Ok(self.names.get(name).copied())
        }
    }

    /// Pops a scripted (delay_ms, result) per call; defaults to instant 5000.
    struct ScriptedQuoter {
        script: Mutex<VecDeque<(u64, Result<u64, String>)>>,
    }

    impl ScriptedQuoter {
        fn new(script: Vec<(u64, Result<u64, String>)>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
            })
        }

        async fn run(&self) -> Result<u64, String> {
            let entry = self.script.lock().unwrap().pop_front();
            let (delay, result) = entry.unwrap_or((0, Ok(5000)));
            tokio::time::sleep(Duration::from_millis(delay)).await;
            result
        }
    }

    #[async_trait]
    impl FeeQuoter for ScriptedQuoter {
        async fn quote_native_fee(&self, _to: &Pubkey, _lamports: u64) -> Result<u64, String> {
            self.run().await
        }

        async fn quote_token_fee(
            &self,
            _mint: &Pubkey,
            _decimals: u8,
            _to: &Pubkey,
            _amount: u64,
        ) -> Result<u64, String> {
            self.run().await
        }
    }

    struct StubCapability {
        result: Mutex<Result<String, TransferError>>,
        delay_ms: u64,
        calls: Mutex<u32>,
    }

    impl StubCapability {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                result: Mutex::new(Ok(SIG.to_string())),
                delay_ms: 0,
                calls: Mutex::new(0),
            })
        }

        fn failing(e: TransferError) -> Arc<Self> {
            Arc::new(Self {
                result: Mutex::new(Err(e)),
                delay_ms: 0,
                calls: Mutex::new(0),
            })
        }

        fn slow_ok(delay_ms: u64) -> Arc<Self> {
            Arc::new(Self {
                result: Mutex::new(Ok(SIG.to_string())),
                delay_ms,
                calls: Mutex::new(0),
            })
        }

        async fn run(&self) -> Result<String, TransferError> {
            *self.calls.lock().unwrap() += 1;
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            self.result.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TransferCapability for StubCapability {
        async fn transfer_native(&self, _to: &Pubkey, _lamports: u64) -> Result<String, TransferError> {
            self.run().await
        }

        async fn transfer_token(
            &self,
            _mint: &Pubkey,
            _decimals: u8,
            _to: &Pubkey,
            _amount: u64,
        ) -> Result<String, TransferError> {
            self.run().await
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        messages: Mutex<Vec<(bool, String)>>,
    }

    impl NotificationSink for RecordingSink {
        fn success(&self, title: &str, _message: &str) {
            self.messages.lock().unwrap().push((true, title.to_string()));
        }

        fn failure(&self, title: &str, _message: &str) {
            self.messages.lock().unwrap().push((false, title.to_string()));
        }
    }

    fn sol_asset(quantity: u64) -> Asset {
        Asset::native_sol(quantity, Some(100.0))
    }

    fn some_pubkey(byte: u8) -> Pubkey {
        Pubkey::new_from_array([byte; 32])
    }

    fn coordinator(asset: Asset) -> (Arc<SendFlowCoordinator>, Arc<RecordingSink>) {
        coordinator_with(
            asset,
            StubResolver::new(&[]),
            ScriptedQuoter::new(vec![]),
            StubCapability::ok(),
        )
    }

    fn coordinator_with(
        asset: Asset,
        resolver: Arc<StubResolver>,
        quoter: Arc<ScriptedQuoter>,
        capability: Arc<StubCapability>,
    ) -> (Arc<SendFlowCoordinator>, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let coord = SendFlowCoordinator::with_debounce(
            asset,
            resolver,
            quoter,
            capability,
            sink.clone(),
            Duration::from_millis(10),
        );
        (coord, sink)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(60)).await;
    }

    #[tokio::test]
    async fn test_zero_amount_never_submits() {
        let (coord, _) = coordinator(sol_asset(1_500_000_000));
        coord.set_recipient_input(&some_pubkey(1).to_string());
        coord.set_amount_input("0");
        assert!(!coord.can_submit());
        coord.set_amount_input("0.0");
        assert!(!coord.can_submit());
    }

    #[tokio::test]
    async fn test_unparseable_amount_never_submits() {
        let (coord, _) = coordinator(sol_asset(1_500_000_000));
        coord.set_recipient_input(&some_pubkey(1).to_string());
        for raw in ["", "abc", "1.2.3", "-1"] {
            coord.set_amount_input(raw);
            assert!(!coord.can_submit(), "amount {:?} should not submit", raw);
        }
    }

    #[tokio::test]
    async fn test_insufficient_balance_blocks_submit() {
        // quantity 1.5 SOL, entered 2.0
        let (coord, _) = coordinator(sol_asset(1_500_000_000));
        coord.set_recipient_input(&some_pubkey(1).to_string());
        coord.set_amount_input("2.0");
        assert!(!coord.can_submit());
        assert!(coord.snapshot().insufficient_balance);

        coord.set_amount_input("1.5");
        assert!(coord.can_submit());
    }

    #[tokio::test]
    async fn test_unresolved_recipient_blocks_submit() {
        let (coord, _) = coordinator(sol_asset(1_500_000_000));
        coord.set_amount_input("1.0");
        assert!(!coord.can_submit());

        coord.set_recipient_input("definitely not an address!");
        assert!(!coord.can_submit());
        settle().await;
        assert!(coord.snapshot().address_error.is_some());
        assert!(!coord.can_submit());
    }

    #[tokio::test]
    async fn test_gift_mode_waives_recipient() {
        let (coord, _) = coordinator(sol_asset(1_500_000_000));
        coord.set_gift_mode(true);
        coord.set_amount_input("1.0"); // $100 at the stub price
        assert!(coord.can_submit());
    }

    #[tokio::test]
    async fn test_name_resolution_applies() {
        let owner = some_pubkey(7);
        let resolver = StubResolver::new(&[("friend.sol", owner)]);
        let (coord, _) = coordinator_with(
            sol_asset(1_500_000_000),
            resolver,
            ScriptedQuoter::new(vec![]),
            StubCapability::ok(),
        );
        coord.set_recipient_input("friend.sol");
        settle().await;

        match coord.snapshot().recipient {
            Recipient::Resolved { address, .. } => assert_eq!(address, owner),
            other => panic!("expected resolved recipient, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_address_resolution_is_unresolved() {
        let resolver = StubResolver::new(&[("zero.sol", Pubkey::default())]);
        let (coord, _) = coordinator_with(
            sol_asset(1_500_000_000),
            resolver,
            ScriptedQuoter::new(vec![]),
            StubCapability::ok(),
        );
        coord.set_recipient_input("zero.sol");
        coord.set_amount_input("1.0");
        settle().await;

        let snapshot = coord.snapshot();
        assert_eq!(snapshot.recipient, Recipient::Unresolved);
        assert!(snapshot.address_error.is_some());
        assert!(!coord.can_submit());
    }

    #[tokio::test]
    async fn test_stale_resolution_is_discarded() {
        let a = some_pubkey(1);
        let b = some_pubkey(2);
        let resolver = StubResolver::new(&[("a.sol", a), ("b.sol", b)]);
        let (coord, _) = coordinator_with(
            sol_asset(1_500_000_000),
            resolver,
            ScriptedQuoter::new(vec![]),
            StubCapability::ok(),
        );

        coord.set_recipient_input("a.sol");
        // second keystroke lands inside a.sol's quiet interval
        tokio::time::sleep(Duration::from_millis(2)).await;
        coord.set_recipient_input("b.sol");
        settle().await;

        match coord.snapshot().recipient {
            Recipient::Resolved { address, .. } => assert_eq!(address, b),
            other => panic!("expected b.sol to win, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fee_estimate_populates() {
        let (coord, _) = coordinator_with(
            sol_asset(1_500_000_000),
            StubResolver::new(&[]),
            ScriptedQuoter::new(vec![(0, Ok(5000))]),
            StubCapability::ok(),
        );
        coord.set_sol_price(100.0);
        coord.set_recipient_input(&some_pubkey(1).to_string());
        coord.set_amount_input("1.0");
        settle().await;

        let snapshot = coord.snapshot();
        assert_eq!(snapshot.estimated_fee, Some(5000));
        // 5000 lamports = 0.000005 SOL, at $100/SOL
        let usd = snapshot.estimated_fee_usd.unwrap();
        assert!((usd - 0.0005).abs() < 1e-12);
        assert_eq!(snapshot.status, SendStatus::Ready);
    }

    #[tokio::test]
    async fn test_fee_failure_is_nonfatal() {
        let (coord, _) = coordinator_with(
            sol_asset(1_500_000_000),
            StubResolver::new(&[]),
            ScriptedQuoter::new(vec![(0, Err("rpc down".to_string()))]),
            StubCapability::ok(),
        );
        coord.set_recipient_input(&some_pubkey(1).to_string());
        coord.set_amount_input("1.0");
        settle().await;

        let snapshot = coord.snapshot();
        assert_eq!(snapshot.estimated_fee, None);
        assert_eq!(snapshot.estimated_fee_usd, None);
        // estimation failure never blocks submission
        assert!(coord.can_submit());
        assert!(coord.submit().await.is_ok());
    }

    #[tokio::test]
    async fn test_late_stale_estimate_is_discarded() {
        // first estimate resolves late, second instantly: the second owns
        // the display even though the first arrives after it
        let (coord, _) = coordinator_with(
            sol_asset(1_500_000_000),
            StubResolver::new(&[]),
            ScriptedQuoter::new(vec![(40, Ok(1111)), (0, Ok(2222))]),
            StubCapability::ok(),
        );
        coord.set_recipient_input(&some_pubkey(1).to_string());
        coord.set_amount_input("1.0"); // issues token 1 (slow)
        tokio::time::sleep(Duration::from_millis(5)).await;
        coord.set_amount_input("1.1"); // issues token 2 (instant)

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(coord.snapshot().estimated_fee, Some(2222));
    }

    #[tokio::test]
    async fn test_submit_success_resets_inputs() {
        let (coord, sink) = coordinator(sol_asset(1_500_000_000));
        coord.set_recipient_input(&some_pubkey(1).to_string());
        coord.set_amount_input("1.0");

        let receipt = coord.submit().await.unwrap();
        assert_eq!(receipt.signature, SIG);
        assert_eq!(receipt.claim_code, None);

        let snapshot = coord.snapshot();
        assert_eq!(snapshot.status, SendStatus::Submitted);
        assert!(snapshot.amount_input.is_empty());
        assert!(snapshot.recipient_input.is_empty());
        assert_eq!(snapshot.recipient, Recipient::Unresolved);
        assert_eq!(snapshot.estimated_fee, None);
        assert_eq!(sink.messages.lock().unwrap().as_slice(), &[(true, "Transaction Submitted".to_string())]);
    }

    #[tokio::test]
    async fn test_submit_failure_keeps_inputs() {
        let capability =
            StubCapability::failing(TransferError::Rejected("user declined".to_string()));
        let (coord, sink) = coordinator_with(
            sol_asset(1_500_000_000),
            StubResolver::new(&[]),
            ScriptedQuoter::new(vec![]),
            capability,
        );
        coord.set_recipient_input(&some_pubkey(1).to_string());
        coord.set_amount_input("1.0");

        let err = coord.submit().await.unwrap_err();
        assert!(matches!(err, SendFlowError::SubmissionRejected(_)));

        let snapshot = coord.snapshot();
        assert_eq!(snapshot.status, SendStatus::Ready);
        assert_eq!(snapshot.amount_input, "1.0");
        assert!(!snapshot.recipient_input.is_empty());
        assert_eq!(sink.messages.lock().unwrap().as_slice(), &[(false, "Transaction Failed".to_string())]);
    }

    #[tokio::test]
    async fn test_only_one_submission_in_flight() {
        let capability = StubCapability::slow_ok(50);
        let (coord, _) = coordinator_with(
            sol_asset(1_500_000_000),
            StubResolver::new(&[]),
            ScriptedQuoter::new(vec![]),
            capability.clone(),
        );
        coord.set_recipient_input(&some_pubkey(1).to_string());
        coord.set_amount_input("1.0");

        let first = {
            let coord = coord.clone();
            tokio::spawn(async move { coord.submit().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(coord.submit().await.unwrap_err(), SendFlowError::AlreadySubmitting);

        assert!(first.await.unwrap().is_ok());
        assert_eq!(*capability.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_listener_receives_snapshots() {
        let (coord, _) = coordinator(sol_asset(1_500_000_000));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_listener = seen.clone();
        coord.set_listener(Box::new(move |snapshot| {
            seen_in_listener
                .lock()
                .unwrap()
                .push(snapshot.amount_input.clone());
        }));

        coord.set_amount_input("1.0");
        assert!(seen.lock().unwrap().iter().any(|a| a == "1.0"));
    }

    #[tokio::test]
    async fn test_gift_minimum() {
        // price $1/SOL so 0.5 SOL is $0.50
        let asset = Asset::native_sol(10_000_000_000, Some(1.0));
        let (coord, _) = coordinator(asset);
        coord.set_gift_mode(true);

        coord.set_amount_input("0.5");
        assert!(!coord.gift_amount_valid());
        assert!(!coord.can_submit());
        assert!(matches!(
            coord.submit().await.unwrap_err(),
            SendFlowError::BelowMinimumGiftAmount
        ));

        // nothing entered yet: no error shown
        coord.set_amount_input("");
        assert!(coord.gift_amount_valid());

        coord.set_amount_input("2");
        assert!(coord.gift_amount_valid());
        assert!(coord.can_submit());
    }

    #[tokio::test]
    async fn test_gift_submit_returns_claim_code() {
        let (coord, _) = coordinator(sol_asset(10_000_000_000));
        coord.set_gift_mode(true);
        coord.set_amount_input("1.0");

        let receipt = coord.submit().await.unwrap();
        let code = receipt.claim_code.expect("gift submit must yield a claim code");
        // the code re-derives the same escrow the transfer went to
        let parsed = gift::ClaimCode::from_str(&code).unwrap();
        assert_ne!(parsed.escrow_address(), Pubkey::default());
    }
}
