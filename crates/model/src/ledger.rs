//! The ledger state machine.

use std::collections::BTreeMap;

use alloy_primitives::{Address, B256, U256};
use tokencheck_domain::{DECIMALS, Deployment, PermitCall, TokenEvent};
use tokencheck_signer::{Eip712Domain, PermitMessage, envelope_hash, recover_signer};

use crate::{InvariantViolation, LedgerError};

/// In-memory ERC-20 + ERC-2612 ledger following the behavioral contract exactly.
///
/// Every mutating operation checks all of its failure conditions before touching state, so
/// an `Err` leaves the ledger untouched and emits nothing. An allowance of `U256::MAX` is
/// treated as unlimited and never decremented.
#[derive(Clone, Debug)]
pub struct LedgerModel {
    address: Address,
    name: String,
    symbol: String,
    owner: Address,
    domain_separator: B256,
    total_supply: U256,
    balances: BTreeMap<Address, U256>,
    allowances: BTreeMap<(Address, Address), U256>,
    nonces: BTreeMap<Address, U256>,
}

impl LedgerModel {
    /// Construct a ledger and credit the initial supply to the owner.
    pub fn new(deployment: &Deployment) -> Self {
        let domain =
            Eip712Domain::new(deployment.name.clone(), deployment.chain_id, deployment.address);
        let mut balances = BTreeMap::new();
        balances.insert(deployment.owner, deployment.initial_supply);
        Self {
            address: deployment.address,
            name: deployment.name.clone(),
            symbol: deployment.symbol.clone(),
            owner: deployment.owner,
            domain_separator: domain.separator(),
            total_supply: deployment.initial_supply,
            balances,
            allowances: BTreeMap::new(),
            nonces: BTreeMap::new(),
        }
    }

    /// Returns the ledger address.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Returns the minting owner.
    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// Token name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Token symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Token decimals.
    pub const fn decimals(&self) -> u8 {
        DECIMALS
    }

    /// EIP-712 domain separator, fixed at construction.
    pub const fn domain_separator(&self) -> B256 {
        self.domain_separator
    }

    /// Total supply.
    pub const fn total_supply(&self) -> U256 {
        self.total_supply
    }

    /// Balance of `account`.
    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    /// Allowance of `spender` over `owner`'s tokens.
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).copied().unwrap_or_default()
    }

    /// Permit nonce of `owner`.
    pub fn nonces(&self, owner: Address) -> U256 {
        self.nonces.get(&owner).copied().unwrap_or_default()
    }

    /// Accounts that have ever held a balance entry.
    pub fn accounts(&self) -> impl Iterator<Item = Address> + '_ {
        self.balances.keys().copied()
    }

    /// Move `amount` from `caller` to `to`.
    pub fn transfer(
        &mut self,
        caller: Address,
        to: Address,
        amount: U256,
    ) -> Result<Vec<TokenEvent>, LedgerError> {
        if to.is_zero() {
            return Err(LedgerError::ZeroAddressRecipient);
        }
        self.ensure_balance(caller, amount)?;
        self.move_balance(caller, to, amount);
        Ok(vec![TokenEvent::transfer(self.address, caller, to, amount)])
    }

    /// Overwrite `caller`'s allowance for `spender`.
    pub fn approve(
        &mut self,
        caller: Address,
        spender: Address,
        amount: U256,
    ) -> Result<Vec<TokenEvent>, LedgerError> {
        self.allowances.insert((caller, spender), amount);
        Ok(vec![TokenEvent::approval(self.address, caller, spender, amount)])
    }

    /// Spend `caller`'s allowance over `from` to move `amount` to `to`.
    pub fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<Vec<TokenEvent>, LedgerError> {
        let allowance = self.allowance(from, caller);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: from,
                spender: caller,
                allowance,
                needed: amount,
            });
        }
        if to.is_zero() {
            return Err(LedgerError::ZeroAddressRecipient);
        }
        self.ensure_balance(from, amount)?;

        if allowance != U256::MAX {
            self.allowances.insert((from, caller), allowance - amount);
        }
        self.move_balance(from, to, amount);
        Ok(vec![TokenEvent::transfer(self.address, from, to, amount)])
    }

    /// Set an allowance from an owner signature, consuming the owner's current nonce.
    pub fn permit(&mut self, permit: &PermitCall, now: u64) -> Result<Vec<TokenEvent>, LedgerError> {
        if U256::from(now) > permit.deadline {
            return Err(LedgerError::Expired { deadline: permit.deadline, now });
        }

        let nonce = self.nonces(permit.owner);
        let message = PermitMessage {
            owner: permit.owner,
            spender: permit.spender,
            value: permit.value,
            nonce,
            deadline: permit.deadline,
        };
        let digest = envelope_hash(self.domain_separator, message.struct_hash());
        let recovered = recover_signer(digest, &permit.signature).ok();
        if recovered != Some(permit.owner) || permit.owner.is_zero() {
            return Err(LedgerError::InvalidSignature { owner: permit.owner, recovered });
        }

        self.nonces.insert(permit.owner, nonce + U256::from(1u64));
        self.allowances.insert((permit.owner, permit.spender), permit.value);
        Ok(vec![TokenEvent::approval(self.address, permit.owner, permit.spender, permit.value)])
    }

    /// Create `amount` tokens for `to`. Only the owner may mint.
    pub fn mint(
        &mut self,
        caller: Address,
        to: Address,
        amount: U256,
    ) -> Result<Vec<TokenEvent>, LedgerError> {
        if caller != self.owner {
            return Err(LedgerError::Unauthorized { caller });
        }
        if to.is_zero() {
            return Err(LedgerError::ZeroAddressRecipient);
        }
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow { supply: self.total_supply, amount })?;

        self.total_supply = supply;
        *self.balances.entry(to).or_default() += amount;
        Ok(vec![TokenEvent::transfer(self.address, Address::ZERO, to, amount)])
    }

    /// Destroy `amount` of `caller`'s tokens.
    pub fn burn(&mut self, caller: Address, amount: U256) -> Result<Vec<TokenEvent>, LedgerError> {
        self.ensure_balance(caller, amount)?;
        *self.balances.entry(caller).or_default() -= amount;
        self.total_supply -= amount;
        Ok(vec![TokenEvent::transfer(self.address, caller, Address::ZERO, amount)])
    }

    /// Verify `sum(balance) == totalSupply`.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let sum = self
            .balances
            .values()
            .try_fold(U256::ZERO, |acc, balance| acc.checked_add(*balance))
            .ok_or(InvariantViolation::BalanceSumOverflow)?;
        if sum != self.total_supply {
            return Err(InvariantViolation::SupplyMismatch { sum, supply: self.total_supply });
        }
        Ok(())
    }

    /// Overwrite balances and supply with values observed elsewhere.
    ///
    /// Used to follow a candidate through a tolerated divergence.
    pub fn reconcile(&mut self, balances: &[(Address, U256)], total_supply: U256) {
        for (account, balance) in balances {
            self.balances.insert(*account, *balance);
        }
        self.total_supply = total_supply;
    }

    fn ensure_balance(&self, account: Address, amount: U256) -> Result<(), LedgerError> {
        let balance = self.balance_of(account);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance { account, balance, needed: amount });
        }
        Ok(())
    }

    // Caller must have checked the debit side.
    fn move_balance(&mut self, from: Address, to: Address, amount: U256) {
        *self.balances.entry(from).or_default() -= amount;
        *self.balances.entry(to).or_default() += amount;
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tokencheck_domain::{EventKind, ONE_TOKEN, Signature, tokens};
    use tokencheck_signer::PermitSigner;

    use super::*;

    const CHAIN_ID: u64 = 31337;
    const NOW: u64 = 1_700_000_000;

    struct Fixture {
        ledger: LedgerModel,
        signer: PermitSigner,
        a: Address,
        b: Address,
        c: Address,
    }

    fn fixture() -> Fixture {
        let signer = PermitSigner::from_bytes(&B256::repeat_byte(0x11)).expect("valid key");
        let a = signer.address();
        let deployment = Deployment::from_owner(a, "abc", "ABC", CHAIN_ID, tokens(1000));
        Fixture {
            ledger: LedgerModel::new(&deployment),
            signer,
            a,
            b: Address::repeat_byte(0xB0),
            c: Address::repeat_byte(0xC0),
        }
    }

    fn sign(f: &Fixture, spender: Address, value: U256, nonce: U256, deadline: U256) -> PermitCall {
        let domain = Eip712Domain::new("abc", CHAIN_ID, f.ledger.address());
        let signature =
            f.signer.sign_permit(&domain, spender, value, nonce, deadline).expect("sign permit");
        PermitCall { owner: f.a, spender, value, deadline, signature }
    }

    #[test]
    fn construction_credits_owner() {
        let f = fixture();
        assert_eq!(f.ledger.balance_of(f.a), f.ledger.total_supply());
        assert_eq!(f.ledger.decimals(), 18);
        assert_eq!(f.ledger.owner(), f.a);
        assert!(f.ledger.check_invariants().is_ok());
    }

    #[test]
    fn transfer_moves_balance_and_emits() {
        let mut f = fixture();
        let supply = f.ledger.total_supply();

        let events = f.ledger.transfer(f.a, f.b, ONE_TOKEN).expect("transfer");

        assert_eq!(f.ledger.balance_of(f.a), supply - ONE_TOKEN);
        assert_eq!(f.ledger.balance_of(f.b), ONE_TOKEN);
        assert_eq!(events, vec![TokenEvent::transfer(f.ledger.address(), f.a, f.b, ONE_TOKEN)]);
        assert!(f.ledger.check_invariants().is_ok());
    }

    #[test]
    fn failed_transfer_leaves_state_untouched() {
        let mut f = fixture();
        let before = f.ledger.balance_of(f.a);

        let err = f.ledger.transfer(f.a, f.b, before + U256::from(1u64)).unwrap_err();

        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        assert_eq!(f.ledger.balance_of(f.a), before);
        assert_eq!(f.ledger.balance_of(f.b), U256::ZERO);
    }

    #[test]
    fn transfer_to_zero_address_rejected() {
        let mut f = fixture();
        let err = f.ledger.transfer(f.a, Address::ZERO, ONE_TOKEN).unwrap_err();
        assert_eq!(err, LedgerError::ZeroAddressRecipient);
    }

    #[rstest]
    #[case(U256::from(5u64), U256::from(3u64))]
    #[case(U256::from(3u64), U256::from(5u64))]
    #[case(U256::MAX, U256::ZERO)]
    fn approve_is_last_write_wins(#[case] first: U256, #[case] second: U256) {
        let mut f = fixture();
        f.ledger.approve(f.a, f.b, first).expect("approve");
        f.ledger.approve(f.a, f.b, second).expect("approve");
        assert_eq!(f.ledger.allowance(f.a, f.b), second);
    }

    #[test]
    fn transfer_from_round_trip() {
        let mut f = fixture();
        let supply = f.ledger.total_supply();
        f.ledger.transfer(f.a, f.b, ONE_TOKEN).expect("transfer");

        let err = f.ledger.transfer_from(f.a, f.b, f.a, ONE_TOKEN).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientAllowance { .. }));

        f.ledger.approve(f.b, f.a, ONE_TOKEN).expect("approve");
        let events = f.ledger.transfer_from(f.a, f.b, f.a, ONE_TOKEN).expect("transferFrom");

        assert_eq!(f.ledger.balance_of(f.a), supply);
        assert_eq!(f.ledger.balance_of(f.b), U256::ZERO);
        assert_eq!(f.ledger.allowance(f.b, f.a), U256::ZERO);
        assert_eq!(events, vec![TokenEvent::transfer(f.ledger.address(), f.b, f.a, ONE_TOKEN)]);
    }

    #[test]
    fn transfer_from_checks_allowance_before_balance() {
        let mut f = fixture();
        // B has no balance and A has no allowance: allowance is reported first.
        let err = f.ledger.transfer_from(f.a, f.b, f.a, ONE_TOKEN).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientAllowance { .. }));

        f.ledger.approve(f.b, f.a, ONE_TOKEN).expect("approve");
        let err = f.ledger.transfer_from(f.a, f.b, f.a, ONE_TOKEN).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        assert_eq!(f.ledger.allowance(f.b, f.a), ONE_TOKEN);
    }

    #[test]
    fn unlimited_allowance_is_not_decremented() {
        let mut f = fixture();
        f.ledger.approve(f.a, f.b, U256::MAX).expect("approve");
        f.ledger.transfer_from(f.b, f.a, f.b, ONE_TOKEN).expect("transferFrom");
        assert_eq!(f.ledger.allowance(f.a, f.b), U256::MAX);
    }

    #[test]
    fn mint_requires_owner() {
        let mut f = fixture();
        let supply = f.ledger.total_supply();

        let err = f.ledger.mint(f.b, f.b, ONE_TOKEN).unwrap_err();
        assert_eq!(err, LedgerError::Unauthorized { caller: f.b });

        let events = f.ledger.mint(f.a, f.b, ONE_TOKEN).expect("mint");
        assert_eq!(f.ledger.total_supply(), supply + ONE_TOKEN);
        assert_eq!(f.ledger.balance_of(f.b), ONE_TOKEN);
        assert!(matches!(
            events[0].kind,
            EventKind::Transfer { from, .. } if from == Address::ZERO
        ));
    }

    #[test]
    fn mint_to_exactly_max_succeeds() {
        let mut f = fixture();
        let headroom = U256::MAX - f.ledger.total_supply();

        let err = f.ledger.mint(f.a, f.b, headroom + U256::from(1u64)).unwrap_err();
        assert!(matches!(err, LedgerError::SupplyOverflow { .. }));

        f.ledger.mint(f.a, f.b, headroom).expect("mint to max");
        assert_eq!(f.ledger.total_supply(), U256::MAX);
        assert!(f.ledger.check_invariants().is_ok());
    }

    #[test]
    fn mint_to_zero_address_rejected() {
        let mut f = fixture();
        let err = f.ledger.mint(f.a, Address::ZERO, ONE_TOKEN).unwrap_err();
        assert_eq!(err, LedgerError::ZeroAddressRecipient);
    }

    #[test]
    fn burn_reduces_supply() {
        let mut f = fixture();
        let supply = f.ledger.total_supply();
        f.ledger.transfer(f.a, f.b, ONE_TOKEN).expect("transfer");

        let err = f.ledger.burn(f.b, supply).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));

        let events = f.ledger.burn(f.b, ONE_TOKEN).expect("burn");
        assert_eq!(f.ledger.balance_of(f.b), U256::ZERO);
        assert_eq!(f.ledger.total_supply(), supply - ONE_TOKEN);
        assert_eq!(
            events,
            vec![TokenEvent::transfer(f.ledger.address(), f.b, Address::ZERO, ONE_TOKEN)]
        );
        assert!(f.ledger.check_invariants().is_ok());
    }

    #[test]
    fn permit_sets_allowance_and_bumps_nonce() {
        let mut f = fixture();
        let call = sign(&f, f.b, ONE_TOKEN, U256::ZERO, U256::MAX);

        let events = f.ledger.permit(&call, NOW).expect("permit");

        assert_eq!(f.ledger.allowance(f.a, f.b), ONE_TOKEN);
        assert_eq!(f.ledger.nonces(f.a), U256::from(1u64));
        assert_eq!(events, vec![TokenEvent::approval(f.ledger.address(), f.a, f.b, ONE_TOKEN)]);
    }

    #[test]
    fn permit_replay_always_fails() {
        let mut f = fixture();
        let call = sign(&f, f.b, ONE_TOKEN, U256::ZERO, U256::MAX);
        f.ledger.permit(&call, NOW).expect("permit");

        for _ in 0..3 {
            let err = f.ledger.permit(&call, NOW).unwrap_err();
            assert!(matches!(err, LedgerError::InvalidSignature { .. }));
            assert_eq!(f.ledger.nonces(f.a), U256::from(1u64));
        }
    }

    #[test]
    fn permit_with_other_spender_fails() {
        let mut f = fixture();
        let mut call = sign(&f, f.b, ONE_TOKEN, U256::ZERO, U256::MAX);
        call.spender = f.c;

        let err = f.ledger.permit(&call, NOW).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidSignature { recovered: Some(r), .. } if r != f.a));
        assert_eq!(f.ledger.allowance(f.a, f.c), U256::ZERO);
        assert_eq!(f.ledger.nonces(f.a), U256::ZERO);
    }

    #[rstest]
    #[case(NOW - 1, true)]
    #[case(NOW, false)]
    #[case(NOW + 1, false)]
    fn permit_deadline_boundary(#[case] deadline: u64, #[case] expired: bool) {
        let mut f = fixture();
        let call = sign(&f, f.b, ONE_TOKEN, U256::ZERO, U256::from(deadline));
        let result = f.ledger.permit(&call, NOW);
        assert_eq!(matches!(result, Err(LedgerError::Expired { .. })), expired);
    }

    #[test]
    fn permit_with_garbage_signature_fails() {
        let mut f = fixture();
        let mut call = sign(&f, f.b, ONE_TOKEN, U256::ZERO, U256::MAX);
        call.signature = Signature::new(27, B256::ZERO, B256::ZERO);

        let err = f.ledger.permit(&call, NOW).unwrap_err();
        assert_eq!(err, LedgerError::InvalidSignature { owner: f.a, recovered: None });
    }

    #[test]
    fn permit_bound_to_ledger_address() {
        let mut f = fixture();
        let foreign = Eip712Domain::new("abc", CHAIN_ID, Address::repeat_byte(0x99));
        let signature =
            f.signer.sign_permit(&foreign, f.b, ONE_TOKEN, U256::ZERO, U256::MAX).expect("sign");
        let call = PermitCall { owner: f.a, spender: f.b, value: ONE_TOKEN, deadline: U256::MAX, signature };

        assert!(matches!(f.ledger.permit(&call, NOW), Err(LedgerError::InvalidSignature { .. })));
    }

    #[test]
    fn nonce_unchanged_by_other_operations() {
        let mut f = fixture();
        f.ledger.transfer(f.a, f.b, ONE_TOKEN).expect("transfer");
        f.ledger.approve(f.a, f.b, ONE_TOKEN).expect("approve");
        f.ledger.mint(f.a, f.b, ONE_TOKEN).expect("mint");
        f.ledger.burn(f.a, ONE_TOKEN).expect("burn");
        assert_eq!(f.ledger.nonces(f.a), U256::ZERO);
    }

    #[test]
    fn reconcile_overwrites_observed_state() {
        let mut f = fixture();
        let supply = f.ledger.total_supply();
        f.ledger.reconcile(&[(f.a, supply - ONE_TOKEN), (Address::ZERO, ONE_TOKEN)], supply);
        assert_eq!(f.ledger.balance_of(Address::ZERO), ONE_TOKEN);
        assert!(f.ledger.check_invariants().is_ok());
    }

    #[test]
    fn invariant_detects_mismatch() {
        let mut f = fixture();
        f.ledger.reconcile(&[(f.b, ONE_TOKEN)], f.ledger.total_supply());
        assert!(matches!(
            f.ledger.check_invariants(),
            Err(InvariantViolation::SupplyMismatch { .. })
        ));
    }
}
