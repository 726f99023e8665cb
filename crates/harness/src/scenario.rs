//! The canonical conformance scenario.

use std::fmt;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tokencheck_domain::{Call, CallContext, Deployment, ONE_TOKEN, PermitCall};
use tokencheck_signer::{Eip712Domain, PermitSigner, SignerError};

/// Mint amount that overflows any non-trivial supply.
pub const OVERFLOW_MINT: U256 = U256::from_limbs([u64::MAX - 0x0f, u64::MAX, u64::MAX, u64::MAX]);

/// A named participant in the scenario.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
    /// Owner, initial holder and permit signer.
    Deployer,
    /// Second token holder.
    Holder,
    /// Account with no role; relays permits.
    Outsider,
}

impl Actor {
    /// Every actor.
    pub const ALL: [Self; 3] = [Self::Deployer, Self::Holder, Self::Outsider];

    /// Lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deployer => "deployer",
            Self::Holder => "holder",
            Self::Outsider => "outsider",
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Addresses of the scenario actors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accounts {
    /// Deployer address.
    pub deployer: Address,
    /// Holder address.
    pub holder: Address,
    /// Outsider address.
    pub outsider: Address,
}

impl Accounts {
    /// Address of `actor`.
    pub const fn address(&self, actor: Actor) -> Address {
        match actor {
            Actor::Deployer => self.deployer,
            Actor::Holder => self.holder,
            Actor::Outsider => self.outsider,
        }
    }

    /// Every account whose balance the supply check reads, including the zero address.
    pub const fn watched(&self) -> [Address; 4] {
        [self.deployer, self.holder, self.outsider, Address::ZERO]
    }
}

/// One call issued by one actor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Stable identifier, used by the allow-list and in reports.
    pub id: String,
    /// Who issues the call.
    pub actor: Actor,
    /// The call.
    pub call: Call,
}

impl Step {
    /// Create a step.
    pub fn new(id: impl Into<String>, actor: Actor, call: Call) -> Self {
        Self { id: id.into(), actor, call }
    }
}

/// An ordered list of steps executed at a fixed timestamp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    accounts: Accounts,
    timestamp: u64,
    steps: Vec<Step>,
}

impl Scenario {
    /// An empty scenario.
    pub const fn new(accounts: Accounts, timestamp: u64) -> Self {
        Self { accounts, timestamp, steps: Vec::new() }
    }

    /// Append a step.
    #[must_use]
    pub fn with_step(mut self, id: impl Into<String>, actor: Actor, call: Call) -> Self {
        self.steps.push(Step::new(id, actor, call));
        self
    }

    /// The canonical transfer, approval, mint, burn and permit scenario.
    ///
    /// `deployer` must own `deployment`; it signs the permits against the deployment's domain.
    pub fn canonical(
        deployment: &Deployment,
        deployer: &PermitSigner,
        holder: Address,
        outsider: Address,
        timestamp: u64,
    ) -> Result<Self, SignerError> {
        use Actor::{Deployer, Holder, Outsider};

        let a = deployer.address();
        let b = holder;
        let c = outsider;
        let accounts = Accounts { deployer: a, holder: b, outsider: c };

        let supply = deployment.initial_supply;
        let a_after_transfer =
            if supply >= ONE_TOKEN { supply - ONE_TOKEN } else { supply };
        let supply_after_mint = supply.saturating_add(ONE_TOKEN);

        let domain = Eip712Domain::new(deployment.name.clone(), deployment.chain_id, deployment.address);
        let far_future = U256::MAX;
        let expired = U256::from(timestamp.saturating_sub(1));
        let permit = PermitCall {
            owner: a,
            spender: b,
            value: ONE_TOKEN,
            deadline: far_future,
            signature: deployer.sign_permit(&domain, b, ONE_TOKEN, U256::ZERO, far_future)?,
        };
        let expired_permit = PermitCall {
            deadline: expired,
            signature: deployer.sign_permit(&domain, b, ONE_TOKEN, U256::ZERO, expired)?,
            ..permit
        };
        let wrong_spender = PermitCall { spender: c, ..permit };

        let scenario = Self::new(accounts, timestamp)
            // metadata and initial state
            .with_step("read-name", Deployer, Call::Name)
            .with_step("read-symbol", Deployer, Call::Symbol)
            .with_step("read-decimals", Deployer, Call::Decimals)
            .with_step("read-domain-separator", Deployer, Call::DomainSeparator)
            .with_step("read-initial-supply", Deployer, Call::TotalSupply)
            .with_step("read-deployer-initial-balance", Deployer, Call::BalanceOf { account: a })
            .with_step("read-holder-initial-balance", Deployer, Call::BalanceOf { account: b })
            // transfer
            .with_step("transfer-one-token", Deployer, Call::Transfer { to: b, amount: ONE_TOKEN })
            .with_step("read-deployer-balance-after-transfer", Deployer, Call::BalanceOf { account: a })
            .with_step("read-holder-balance-after-transfer", Deployer, Call::BalanceOf { account: b })
            .with_step(
                "transfer-exceeding-balance",
                Deployer,
                Call::Transfer { to: b, amount: a_after_transfer + U256::from(1u64) },
            )
            // approve and transferFrom
            .with_step("read-allowance-before-approve", Deployer, Call::Allowance { owner: b, spender: a })
            .with_step(
                "transfer-from-without-allowance",
                Deployer,
                Call::TransferFrom { from: b, to: a, amount: U256::from(1u64) },
            )
            .with_step("approve-deployer", Holder, Call::Approve { spender: a, amount: ONE_TOKEN })
            .with_step("read-allowance-after-approve", Deployer, Call::Allowance { owner: b, spender: a })
            .with_step(
                "transfer-from-with-allowance",
                Deployer,
                Call::TransferFrom { from: b, to: a, amount: ONE_TOKEN },
            )
            .with_step("read-deployer-balance-after-transfer-from", Deployer, Call::BalanceOf { account: a })
            .with_step("read-holder-balance-after-transfer-from", Deployer, Call::BalanceOf { account: b })
            // zero-address guards
            .with_step(
                "transfer-to-zero-address",
                Deployer,
                Call::Transfer { to: Address::ZERO, amount: ONE_TOKEN },
            )
            .with_step("mint-to-zero-address", Deployer, Call::Mint { to: Address::ZERO, amount: ONE_TOKEN })
            // mint
            .with_step("mint-overflow", Deployer, Call::Mint { to: b, amount: OVERFLOW_MINT })
            .with_step("mint-unauthorized", Holder, Call::Mint { to: b, amount: ONE_TOKEN })
            .with_step("mint-one-token", Deployer, Call::Mint { to: b, amount: ONE_TOKEN })
            .with_step("read-holder-balance-after-mint", Deployer, Call::BalanceOf { account: b })
            .with_step("read-supply-after-mint", Deployer, Call::TotalSupply)
            // burn
            .with_step("burn-exceeding-balance", Holder, Call::Burn { amount: supply_after_mint })
            .with_step("burn-holder-balance", Holder, Call::Burn { amount: ONE_TOKEN })
            .with_step("read-holder-balance-after-burn", Deployer, Call::BalanceOf { account: b })
            .with_step("read-supply-after-burn", Deployer, Call::TotalSupply)
            // permit
            .with_step("read-nonce-before-permit", Outsider, Call::Nonces { owner: a })
            .with_step("permit-expired", Outsider, Call::Permit(expired_permit))
            .with_step("permit", Outsider, Call::Permit(permit))
            .with_step("read-allowance-after-permit", Outsider, Call::Allowance { owner: a, spender: b })
            .with_step("read-nonce-after-permit", Outsider, Call::Nonces { owner: a })
            .with_step("permit-replay", Outsider, Call::Permit(permit))
            .with_step("permit-wrong-spender", Outsider, Call::Permit(wrong_spender))
            .with_step("read-nonce-after-rejected-permits", Outsider, Call::Nonces { owner: a })
            // unlimited allowance
            .with_step("approve-unlimited", Deployer, Call::Approve { spender: b, amount: U256::MAX })
            .with_step(
                "transfer-from-unlimited",
                Holder,
                Call::TransferFrom { from: a, to: b, amount: ONE_TOKEN },
            )
            .with_step("read-unlimited-allowance", Holder, Call::Allowance { owner: a, spender: b })
            // read-only interface probe
            .with_step("probe-balance-of", Outsider, Call::BalanceOf { account: b })
            .with_step("probe-allowance", Outsider, Call::Allowance { owner: a, spender: b })
            .with_step("probe-total-supply", Outsider, Call::TotalSupply)
            .with_step("probe-name", Outsider, Call::Name)
            .with_step("probe-symbol", Outsider, Call::Symbol)
            .with_step("probe-decimals", Outsider, Call::Decimals);
        Ok(scenario)
    }

    /// Actor addresses.
    pub const fn accounts(&self) -> &Accounts {
        &self.accounts
    }

    /// Timestamp every step executes at.
    pub const fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Steps in execution order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Look up a step by id.
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|step| step.id == id)
    }

    /// Number of steps.
    pub const fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the scenario has no steps.
    pub const fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Call context for `actor`.
    pub const fn context(&self, actor: Actor) -> CallContext {
        CallContext::new(self.accounts.address(actor), self.timestamp)
    }
}
