//! The governance engine.
//!
//! [`GovernanceDao`] owns every piece of state (parameters, stakes,
//! proposals, breaker, treasury, event log) plus the [`AssetGateway`] it
//! moves assets through. Every operation takes the acting account and the
//! current time explicitly and either commits all of its effects or returns
//! an error having changed nothing.
//!
//! Internal state is always written before the gateway is called, and a
//! failed gateway call is rolled back before the error is returned. The
//! gateway is owned and every operation takes `&mut self`, so a gateway
//! cannot call back into the engine while an operation is in progress.

use crate::access::AccessControl;
use crate::breaker::CircuitBreaker;
use crate::error::DaoError;
use crate::event::{DaoEvent, EventLog, EventRecord};
use crate::treasury::Treasury;
use agora_governance::{
    Proposal, ProposalId, ProposalRegistry, ProposalStatus, TreasuryDefect, TreasuryTransfer,
};
use agora_stake::{StakeLedger, StakePurpose};
use agora_types::{
    amount::decimal, mul_div, validate_percentages, AccountId, AssetGateway, DaoParams, EconomicParams,
    Timestamp, TOKEN_UNIT,
};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Everything needed to bring up a fresh engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DaoInit {
    pub owner: AccountId,
    /// `None` leaves the engine refusing gated operations until the owner
    /// configures one.
    pub panic_account: Option<AccountId>,
    /// The engine's own account on the token ledger. Tokens minted here join
    /// the sale reserve.
    pub custody_account: AccountId,
    pub params: DaoParams,
}

/// Who administers the engine and whether it is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DaoStatus {
    pub owner: AccountId,
    pub panic_account: Option<AccountId>,
    pub paused: bool,
}

/// One account's stake for one purpose, with its lock resolved against `now`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StakeInfo {
    #[serde(with = "decimal")]
    pub amount: u128,
    pub locked_since: Timestamp,
    pub locked_until: Timestamp,
    pub is_locked: bool,
}

/// Token-weighted governance engine over an external asset ledger `G`.
#[derive(Debug)]
pub struct GovernanceDao<G> {
    pub(crate) access: AccessControl,
    pub(crate) breaker: CircuitBreaker,
    pub(crate) params: DaoParams,
    pub(crate) stakes: StakeLedger,
    pub(crate) registry: ProposalRegistry,
    pub(crate) treasury: Treasury,
    pub(crate) custody_account: AccountId,
    pub(crate) events: EventLog,
    pub(crate) gateway: G,
}

fn logged<T>(op: &'static str, caller: &AccountId, result: Result<T, DaoError>) -> Result<T, DaoError> {
    if let Err(err) = &result {
        debug!(op, account = %caller, %err, "operation rejected");
    }
    result
}

fn invalid(reason: impl Into<String>) -> DaoError {
    DaoError::InvalidParameter(reason.into())
}

impl<G: AssetGateway> GovernanceDao<G> {
    pub fn new(init: DaoInit, gateway: G) -> Result<Self, DaoError> {
        init.params.validate()?;
        let access = AccessControl::new(init.owner)?;
        if init.custody_account.is_zero() {
            return Err(invalid("custody account is the null account"));
        }
        info!(
            owner = %init.owner,
            panic_account = ?init.panic_account,
            custody = %init.custody_account,
            "governance engine initialised"
        );
        Ok(Self {
            access,
            breaker: CircuitBreaker::new(init.panic_account),
            params: init.params,
            stakes: StakeLedger::new(),
            registry: ProposalRegistry::new(),
            treasury: Treasury::new(),
            custody_account: init.custody_account,
            events: EventLog::new(),
            gateway,
        })
    }

    fn emit(&mut self, event: DaoEvent, now: Timestamp) {
        self.events.emit(event, now);
    }

    // ── Staking ─────────────────────────────────────────────────────────

    pub fn stake_for_voting(&mut self, caller: &AccountId, amount: u128, now: Timestamp) -> Result<(), DaoError> {
        self.stake(caller, StakePurpose::Voting, amount, now)
    }

    pub fn stake_for_proposing(&mut self, caller: &AccountId, amount: u128, now: Timestamp) -> Result<(), DaoError> {
        self.stake(caller, StakePurpose::Proposing, amount, now)
    }

    pub fn unstake_from_voting(&mut self, caller: &AccountId, amount: u128, now: Timestamp) -> Result<(), DaoError> {
        self.unstake(caller, StakePurpose::Voting, amount, now)
    }

    pub fn unstake_from_proposing(&mut self, caller: &AccountId, amount: u128, now: Timestamp) -> Result<(), DaoError> {
        self.unstake(caller, StakePurpose::Proposing, amount, now)
    }

    /// Pull `amount` tokens from `caller` into custody and lock them for `purpose`.
    /// Restarts the lock window on the whole balance.
    pub fn stake(
        &mut self,
        caller: &AccountId,
        purpose: StakePurpose,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), DaoError> {
        let result = self.try_stake(caller, purpose, amount, now);
        logged("stake", caller, result)
    }

    fn try_stake(
        &mut self,
        caller: &AccountId,
        purpose: StakePurpose,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), DaoError> {
        self.breaker.ensure_operational()?;
        if amount == 0 {
            return Err(invalid("stake amount must be non-zero"));
        }
        if caller.is_zero() {
            return Err(invalid("the null account cannot stake"));
        }
        let previous = self.stakes.record(caller, purpose);
        self.stakes.stake(caller, purpose, amount, now)?;
        if let Err(err) = self.gateway.pull_tokens(caller, amount) {
            self.stakes.reinstate(caller, purpose, previous);
            warn!(account = %caller, %purpose, amount, %err, "stake transfer failed, rolled back");
            return Err(err.into());
        }
        info!(account = %caller, %purpose, amount, "staked");
        self.emit(
            DaoEvent::Staked {
                account: *caller,
                purpose,
                amount,
            },
            now,
        );
        Ok(())
    }

    /// Release `amount` of `caller`'s `purpose` stake back to them once the
    /// lock window has passed.
    pub fn unstake(
        &mut self,
        caller: &AccountId,
        purpose: StakePurpose,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), DaoError> {
        let result = self.try_unstake(caller, purpose, amount, now);
        logged("unstake", caller, result)
    }

    fn try_unstake(
        &mut self,
        caller: &AccountId,
        purpose: StakePurpose,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), DaoError> {
        self.breaker.ensure_operational()?;
        let lock = self.params.stake_lock_duration_secs;
        let previous = self.stakes.unstake(caller, purpose, amount, now, lock)?;
        if let Err(err) = self.gateway.push_tokens(caller, amount) {
            self.stakes.reinstate(caller, purpose, previous);
            warn!(account = %caller, %purpose, amount, %err, "unstake transfer failed, rolled back");
            return Err(err.into());
        }
        info!(account = %caller, %purpose, amount, "unstaked");
        self.emit(
            DaoEvent::Unstaked {
                account: *caller,
                purpose,
                amount,
            },
            now,
        );
        Ok(())
    }

    // ── Proposals and voting ────────────────────────────────────────────

    pub fn create_proposal(
        &mut self,
        caller: &AccountId,
        title: impl Into<String>,
        description: impl Into<String>,
        now: Timestamp,
    ) -> Result<ProposalId, DaoError> {
        let result = self.open_proposal(caller, title.into(), description.into(), None, now);
        logged("create_proposal", caller, result)
    }

    /// A proposal that, once accepted, pays `amount` of treasury value to `recipient`.
    pub fn create_treasury_proposal(
        &mut self,
        caller: &AccountId,
        title: impl Into<String>,
        description: impl Into<String>,
        recipient: AccountId,
        amount: u128,
        now: Timestamp,
    ) -> Result<ProposalId, DaoError> {
        let transfer = TreasuryTransfer { recipient, amount };
        let result = self.open_proposal(caller, title.into(), description.into(), Some(transfer), now);
        logged("create_treasury_proposal", caller, result)
    }

    fn open_proposal(
        &mut self,
        caller: &AccountId,
        title: String,
        description: String,
        treasury: Option<TreasuryTransfer>,
        now: Timestamp,
    ) -> Result<ProposalId, DaoError> {
        self.breaker.ensure_operational()?;
        let event_title = title.clone();
        let id = self.registry.create_proposal(
            &self.stakes,
            &self.params,
            caller,
            title,
            description,
            treasury,
            now,
        )?;
        info!(proposal = id, proposer = %caller, treasury = treasury.is_some(), "proposal created");
        self.emit(
            DaoEvent::ProposalCreated {
                id,
                proposer: *caller,
                title: event_title,
                treasury: treasury.is_some(),
            },
            now,
        );
        Ok(id)
    }

    /// Cast `caller`'s full current voting power for or against proposal `id`.
    /// Returns the power counted.
    pub fn vote(
        &mut self,
        caller: &AccountId,
        id: ProposalId,
        support: bool,
        now: Timestamp,
    ) -> Result<u128, DaoError> {
        let result = self.try_vote(caller, id, support, now);
        logged("vote", caller, result)
    }

    fn try_vote(
        &mut self,
        caller: &AccountId,
        id: ProposalId,
        support: bool,
        now: Timestamp,
    ) -> Result<u128, DaoError> {
        self.breaker.ensure_operational()?;
        let power = self
            .registry
            .cast_vote(&self.stakes, &self.params, id, caller, support, now)?;
        info!(proposal = id, voter = %caller, support, power, "vote cast");
        self.emit(
            DaoEvent::VoteCast {
                proposal: id,
                voter: *caller,
                support,
                power,
            },
            now,
        );
        Ok(power)
    }

    /// Decide a proposal whose voting window has closed. Anyone may call.
    ///
    /// [`DaoError::QuorumNotReached`] leaves the proposal Active; it can be
    /// finalized again later.
    pub fn finalize_proposal(
        &mut self,
        caller: &AccountId,
        id: ProposalId,
        now: Timestamp,
    ) -> Result<ProposalStatus, DaoError> {
        let result = self.try_finalize(id, now);
        logged("finalize_proposal", caller, result)
    }

    fn try_finalize(&mut self, id: ProposalId, now: Timestamp) -> Result<ProposalStatus, DaoError> {
        self.breaker.ensure_operational()?;
        let status = self.registry.finalize(&self.stakes, &self.params, id, now)?;
        info!(proposal = id, %status, "proposal finalized");
        self.emit(DaoEvent::ProposalFinalized { proposal: id, status }, now);
        Ok(status)
    }

    // ── Treasury ────────────────────────────────────────────────────────

    /// Pay out an accepted treasury proposal. Anyone may call; each proposal
    /// pays at most once.
    pub fn execute_treasury_proposal(
        &mut self,
        caller: &AccountId,
        id: ProposalId,
        now: Timestamp,
    ) -> Result<TreasuryTransfer, DaoError> {
        let result = self.try_execute(id, now);
        logged("execute_treasury_proposal", caller, result)
    }

    fn try_execute(&mut self, id: ProposalId, now: Timestamp) -> Result<TreasuryTransfer, DaoError> {
        self.breaker.ensure_operational()?;
        let transfer = self.registry.executable(id)?;
        let available = self.treasury.balance();
        if available < transfer.amount {
            return Err(DaoError::InvalidTreasuryProposal(
                TreasuryDefect::InsufficientFunds {
                    needed: transfer.amount,
                    available,
                },
            ));
        }

        self.registry.mark_executed(id)?;
        if let Err(err) = self.treasury.withdraw(transfer.amount) {
            self.registry.revert_execution(id);
            return Err(err);
        }
        if let Err(err) = self.gateway.push_value(&transfer.recipient, transfer.amount) {
            self.registry.revert_execution(id);
            self.treasury.deposit(transfer.amount)?;
            warn!(proposal = id, recipient = %transfer.recipient, %err, "treasury payout failed, rolled back");
            return Err(err.into());
        }
        info!(
            proposal = id,
            recipient = %transfer.recipient,
            amount = transfer.amount,
            "treasury proposal executed"
        );
        self.emit(
            DaoEvent::TreasuryProposalExecuted {
                proposal: id,
                recipient: transfer.recipient,
                amount: transfer.amount,
            },
            now,
        );
        Ok(transfer)
    }

    /// Deposit base-currency value into the treasury. Accepted while paused.
    pub fn fund_treasury(&mut self, from: &AccountId, amount: u128, now: Timestamp) -> Result<(), DaoError> {
        let result = self.try_fund(from, amount, now);
        logged("fund_treasury", from, result)
    }

    fn try_fund(&mut self, from: &AccountId, amount: u128, now: Timestamp) -> Result<(), DaoError> {
        if amount == 0 {
            return Err(invalid("funding amount must be non-zero"));
        }
        self.treasury.deposit(amount)?;
        if let Err(err) = self.gateway.pull_value(from, amount) {
            self.treasury.withdraw(amount)?;
            return Err(err.into());
        }
        info!(account = %from, amount, balance = self.treasury.balance(), "treasury funded");
        self.emit(DaoEvent::TreasuryFunded { from: *from, amount }, now);
        Ok(())
    }

    /// Sell reserve tokens for `value` at the configured unit price.
    /// Returns the raw token amount bought.
    pub fn buy_tokens(&mut self, buyer: &AccountId, value: u128, now: Timestamp) -> Result<u128, DaoError> {
        let result = self.try_buy(buyer, value, now);
        logged("buy_tokens", buyer, result)
    }

    fn try_buy(&mut self, buyer: &AccountId, value: u128, now: Timestamp) -> Result<u128, DaoError> {
        self.breaker.ensure_operational()?;
        if value == 0 {
            return Err(invalid("purchase value must be non-zero"));
        }
        let tokens = mul_div(value, TOKEN_UNIT, self.params.token_unit_price)
            .ok_or(DaoError::ArithmeticOverflow)?;
        if tokens == 0 {
            return Err(invalid("purchase value buys no tokens at the current price"));
        }
        let reserve = self.treasury.token_reserve();
        if tokens > reserve {
            return Err(invalid(format!(
                "reserve holds {reserve} tokens, purchase needs {tokens}"
            )));
        }

        self.treasury.record_sale(value, tokens)?;
        if let Err(err) = self.gateway.pull_value(buyer, value) {
            self.treasury.reverse_sale(value, tokens);
            return Err(err.into());
        }
        if let Err(err) = self.gateway.push_tokens(buyer, tokens) {
            self.treasury.reverse_sale(value, tokens);
            if let Err(refund) = self.gateway.push_value(buyer, value) {
                warn!(account = %buyer, value, %refund, "refund after failed token delivery also failed");
            }
            warn!(account = %buyer, tokens, %err, "token delivery failed, purchase rolled back");
            return Err(err.into());
        }
        info!(account = %buyer, value, tokens, "tokens purchased");
        self.emit(
            DaoEvent::TokensPurchased {
                buyer: *buyer,
                value,
                tokens,
            },
            now,
        );
        Ok(tokens)
    }

    /// Create new tokens for `to`. Minting to the custody account stocks the
    /// sale reserve.
    pub fn mint_tokens(
        &mut self,
        caller: &AccountId,
        to: AccountId,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), DaoError> {
        let result = self.try_mint(caller, to, amount, now);
        logged("mint_tokens", caller, result)
    }

    fn try_mint(&mut self, caller: &AccountId, to: AccountId, amount: u128, now: Timestamp) -> Result<(), DaoError> {
        self.access.ensure_owner(caller)?;
        self.breaker.ensure_operational()?;
        if to.is_zero() {
            return Err(invalid("cannot mint to the null account"));
        }
        if amount == 0 {
            return Err(invalid("mint amount must be non-zero"));
        }
        if to == self.custody_account {
            self.treasury.add_reserve(amount)?;
            if let Err(err) = self.gateway.mint_to_custody(amount) {
                self.treasury.take_reserve(amount)?;
                return Err(err.into());
            }
        } else {
            self.gateway.mint_tokens(&to, amount)?;
        }
        info!(%to, amount, reserve = self.treasury.token_reserve(), "tokens minted");
        self.emit(DaoEvent::TokensMinted { to, amount }, now);
        Ok(())
    }

    // ── Emergency controls ──────────────────────────────────────────────

    pub fn set_panic_wallet(&mut self, caller: &AccountId, account: AccountId, now: Timestamp) -> Result<(), DaoError> {
        let result = self.try_set_panic_wallet(caller, account, now);
        logged("set_panic_wallet", caller, result)
    }

    fn try_set_panic_wallet(&mut self, caller: &AccountId, account: AccountId, now: Timestamp) -> Result<(), DaoError> {
        self.access.ensure_owner(caller)?;
        self.breaker.set_panic_account(account)?;
        info!(%account, "panic wallet updated");
        self.emit(DaoEvent::PanicWalletUpdated { account }, now);
        Ok(())
    }

    /// Pause every gated operation. Panic account only.
    pub fn activate_panic(&mut self, caller: &AccountId, now: Timestamp) -> Result<(), DaoError> {
        logged("activate_panic", caller, self.breaker.trip(caller))?;
        warn!(by = %caller, "engine paused");
        self.emit(DaoEvent::PanicActivated { by: *caller }, now);
        Ok(())
    }

    /// Resume normal operation. Panic account only.
    pub fn activate_calm(&mut self, caller: &AccountId, now: Timestamp) -> Result<(), DaoError> {
        logged("activate_calm", caller, self.breaker.reset(caller))?;
        info!(by = %caller, "engine resumed");
        self.emit(DaoEvent::CalmActivated { by: *caller }, now);
        Ok(())
    }

    // ── Administration ──────────────────────────────────────────────────

    /// Replace the economic and timing parameters; thresholds are kept.
    pub fn set_parameters(
        &mut self,
        caller: &AccountId,
        economics: &EconomicParams,
        now: Timestamp,
    ) -> Result<(), DaoError> {
        let result = self.try_set_parameters(caller, economics, now);
        logged("set_parameters", caller, result)
    }

    fn try_set_parameters(
        &mut self,
        caller: &AccountId,
        economics: &EconomicParams,
        now: Timestamp,
    ) -> Result<(), DaoError> {
        self.access.ensure_owner(caller)?;
        let updated = self.params.with_economics(economics);
        updated.validate()?;
        self.params = updated;
        info!(params = ?self.params, "parameters updated");
        self.emit(
            DaoEvent::ParametersUpdated {
                params: self.params.clone(),
            },
            now,
        );
        Ok(())
    }

    pub fn set_quorum(
        &mut self,
        caller: &AccountId,
        quorum_percentage: u32,
        approval_percentage: u32,
        now: Timestamp,
    ) -> Result<(), DaoError> {
        let result = self.try_set_quorum(caller, quorum_percentage, approval_percentage, now);
        logged("set_quorum", caller, result)
    }

    fn try_set_quorum(
        &mut self,
        caller: &AccountId,
        quorum_percentage: u32,
        approval_percentage: u32,
        now: Timestamp,
    ) -> Result<(), DaoError> {
        self.access.ensure_owner(caller)?;
        validate_percentages(quorum_percentage, approval_percentage)?;
        self.params.quorum_percentage = quorum_percentage;
        self.params.approval_percentage = approval_percentage;
        info!(quorum_percentage, approval_percentage, "quorum updated");
        self.emit(
            DaoEvent::QuorumUpdated {
                quorum_percentage,
                approval_percentage,
            },
            now,
        );
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: &AccountId, new_owner: AccountId, now: Timestamp) -> Result<(), DaoError> {
        let previous = logged("transfer_ownership", caller, self.access.transfer(caller, new_owner))?;
        info!(%previous, new = %new_owner, "ownership transferred");
        self.emit(
            DaoEvent::OwnershipTransferred {
                previous,
                new: new_owner,
            },
            now,
        );
        Ok(())
    }

    /// Register a listener called with every event recorded from now on.
    pub fn subscribe(&mut self, listener: Box<dyn Fn(&EventRecord) + Send + Sync>) {
        self.events.subscribe(listener);
    }
}

/// Read-only views. None of these require a gateway.
impl<G> GovernanceDao<G> {
    pub fn params(&self) -> &DaoParams {
        &self.params
    }

    pub fn owner(&self) -> AccountId {
        self.access.owner()
    }

    pub fn status(&self) -> DaoStatus {
        DaoStatus {
            owner: self.access.owner(),
            panic_account: self.breaker.panic_account(),
            paused: self.breaker.is_paused(),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.breaker.is_paused()
    }

    pub fn custody_account(&self) -> AccountId {
        self.custody_account
    }

    pub fn proposal(&self, id: ProposalId) -> Result<&Proposal, DaoError> {
        self.registry.get(id).ok_or(DaoError::InvalidProposal(id))
    }

    pub fn proposal_count(&self) -> u64 {
        self.registry.count()
    }

    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.registry.iter()
    }

    pub fn has_voted(&self, id: ProposalId, account: &AccountId) -> bool {
        self.registry.has_voted(id, account)
    }

    pub fn stake_of(&self, account: &AccountId, purpose: StakePurpose, now: Timestamp) -> StakeInfo {
        let record = self.stakes.record(account, purpose);
        let lock = self.params.stake_lock_duration_secs;
        StakeInfo {
            amount: record.amount,
            locked_since: record.locked_since,
            locked_until: record.locked_until(lock),
            is_locked: record.amount > 0 && record.is_locked(now, lock),
        }
    }

    /// `floor(voting stake / tokens_per_vote_power)`.
    pub fn voting_power(&self, account: &AccountId) -> u128 {
        self.stakes
            .voting_power(account, self.params.tokens_per_vote_power)
    }

    pub fn total_voting_stake(&self) -> u128 {
        self.stakes.total_voting_stake()
    }

    /// Registered voting power, the quorum base.
    pub fn total_voting_power(&self) -> u128 {
        self.stakes
            .total_voting_power(self.params.tokens_per_vote_power)
    }

    pub fn stakes(&self) -> &StakeLedger {
        &self.stakes
    }

    pub fn treasury_balance(&self) -> u128 {
        self.treasury.balance()
    }

    pub fn token_reserve(&self) -> u128 {
        self.treasury.token_reserve()
    }

    pub fn events(&self) -> &[EventRecord] {
        self.events.records()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    /// Tear down the engine and hand back its gateway.
    pub fn into_gateway(self) -> G {
        self.gateway
    }
}
