//! # Contract Account Flows
//!
//! Contract creation, handler and recipient lists, withdrawals and the
//! fee-payer extensions (settlement, proxy payer).

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use ledger_operations::prelude::*;
    use shared_crypto::KeyPair;
    use shared_types::{Address, Feeer, U256};

    const FEE: u64 = 3;

    struct World {
        ledger: Ledger,
        owner_kp: KeyPair,
        owner: Address,
        contract: Address,
        fees: Address,
    }

    /// Fixed fee ledger with an owner that created a contract holding 300.
    fn world() -> World {
        let fees = addr("fees");
        let ledger = Ledger::with_feeer(Feeer::Fixed {
            receiver: fees.clone(),
            amount: U256::from(FEE),
        });
        ledger.open(&fees, &keypair(99));
        let owner_kp = keypair(1);
        let owner = ledger.fund(&owner_kp, 1000);

        let contract_keys = keys_of(&keypair(40));
        let contract = Address::from_keys(&contract_keys);
        let fact = CreateContractAccountFact::new(
            "contract",
            owner.clone(),
            vec![CreateContractAccountItem::new(contract_keys, vec![amount(300)])],
        );
        ledger.apply(&ledger.sign(fact, &owner_kp)).unwrap();

        World {
            ledger,
            owner_kp,
            owner,
            contract,
            fees,
        }
    }

    impl World {
        fn activate(&self) {
            let fact = RegisterModelFact::new(
                "activate",
                self.owner.clone(),
                self.contract.clone(),
                "ledger",
                mcc(),
            );
            self.ledger.apply(&self.ledger.sign(fact, &self.owner_kp)).unwrap();
        }

        fn set_recipients(&self, recipients: Vec<Address>) {
            let fact = UpdateRecipientFact::new(
                "recipients",
                self.owner.clone(),
                self.contract.clone(),
                recipients,
                mcc(),
            );
            self.ledger.apply(&self.ledger.sign(fact, &self.owner_kp)).unwrap();
        }

        fn balance(&self, address: &Address) -> U256 {
            self.ledger.balance(address).unwrap_or_default()
        }
    }

    fn with_extension(
        fact: impl Into<OperationFact>,
        ext: Extension,
        signers: &[&KeyPair],
    ) -> Operation {
        let mut op = Operation::new(fact).with_extension(ext).unwrap();
        for kp in signers {
            op.sign(kp, NETWORK.as_bytes(), 1);
        }
        op
    }

    // =========================================================================
    // CONTRACT LIFECYCLE
    // =========================================================================

    #[test]
    fn test_contract_created_inactive_and_funded() {
        let w = world();
        assert_eq!(w.balance(&w.owner), U256::from(1000 - 300 - FEE));
        assert_eq!(w.balance(&w.contract), U256::from(300));
        assert!(w.ledger.account(&w.contract).unwrap().is_contract());
    }

    #[test]
    fn test_contract_account_cannot_send() {
        let w = world();
        let bob = w.ledger.fund(&keypair(2), 0);
        let fact = TransferFact::new(
            "from-contract",
            w.contract.clone(),
            vec![TransferItem::new(bob, vec![amount(1)])],
        );
        let op = w.ledger.sign(fact, &keypair(40));
        assert_eq!(w.ledger.rejection(&op), ReasonKind::ValueInvalid);
    }

    #[test]
    fn test_withdraw_by_owner_only() {
        let w = world();
        let before = w.balance(&w.owner);
        let fact = WithdrawFact::new(
            "withdraw",
            w.owner.clone(),
            vec![WithdrawItem::new(w.contract.clone(), vec![amount(100)])],
        );
        w.ledger.apply(&w.ledger.sign(fact, &w.owner_kp)).unwrap();
        assert_eq!(w.balance(&w.contract), U256::from(200));
        assert_eq!(w.balance(&w.owner), before + 100 - FEE);

        let mallory_kp = keypair(5);
        let mallory = w.ledger.fund(&mallory_kp, 100);
        let steal = WithdrawFact::new(
            "steal",
            mallory,
            vec![WithdrawItem::new(w.contract.clone(), vec![amount(1)])],
        );
        assert_eq!(
            w.ledger.rejection(&w.ledger.sign(steal, &mallory_kp)),
            ReasonKind::AccountNotAuthorized
        );
    }

    #[test]
    fn test_withdraw_over_contract_balance() {
        let w = world();
        let fact = WithdrawFact::new(
            "withdraw",
            w.owner.clone(),
            vec![WithdrawItem::new(w.contract.clone(), vec![amount(301)])],
        );
        assert_eq!(
            w.ledger.rejection(&w.ledger.sign(fact, &w.owner_kp)),
            ReasonKind::InsufficientBalance
        );
    }

    #[test]
    fn test_owner_cannot_be_handler() {
        let w = world();
        let fact = UpdateHandlerFact::new(
            "handlers",
            w.owner.clone(),
            w.contract.clone(),
            vec![w.owner.clone()],
            mcc(),
        );
        assert_eq!(
            w.ledger.rejection(&w.ledger.sign(fact, &w.owner_kp)),
            ReasonKind::ValueInvalid
        );
    }

    // =========================================================================
    // PROXY PAYER
    // =========================================================================

    #[test]
    fn test_proxy_payer_covers_recipient_fee() {
        let w = world();
        w.activate();
        let user_kp = keypair(2);
        let user = w.ledger.fund(&user_kp, 50);
        let bob = w.ledger.fund(&keypair(3), 0);
        w.set_recipients(vec![user.clone()]);

        let contract_before = w.balance(&w.contract);
        let fees_before = w.balance(&w.fees);
        let fact = TransferFact::new(
            "proxied",
            user.clone(),
            vec![TransferItem::new(bob.clone(), vec![amount(10)])],
        );
        let proxy = Extension::ProxyPayer(ProxyPayer::new(w.contract.clone()));
        let op = with_extension(fact, proxy, &[&user_kp]);
        w.ledger.apply(&op).unwrap();

        assert_eq!(w.balance(&user), U256::from(40));
        assert_eq!(w.balance(&bob), U256::from(10));
        assert_eq!(w.balance(&w.contract), contract_before - FEE);
        assert_eq!(w.balance(&w.fees), fees_before + FEE);
    }

    #[test]
    fn test_proxy_payer_needs_recipient() {
        let w = world();
        w.activate();
        let user_kp = keypair(2);
        let user = w.ledger.fund(&user_kp, 50);
        let bob = w.ledger.fund(&keypair(3), 0);

        let fact = TransferFact::new(
            "proxied",
            user,
            vec![TransferItem::new(bob, vec![amount(10)])],
        );
        let proxy = Extension::ProxyPayer(ProxyPayer::new(w.contract.clone()));
        let op = with_extension(fact, proxy, &[&user_kp]);
        assert_eq!(w.ledger.rejection(&op), ReasonKind::AccountNotAuthorized);
    }

    #[test]
    fn test_proxy_payer_needs_active_contract() {
        let w = world();
        let user_kp = keypair(2);
        let user = w.ledger.fund(&user_kp, 50);
        let bob = w.ledger.fund(&keypair(3), 0);
        w.set_recipients(vec![user.clone()]);

        let fact = TransferFact::new(
            "proxied",
            user,
            vec![TransferItem::new(bob, vec![amount(10)])],
        );
        let proxy = Extension::ProxyPayer(ProxyPayer::new(w.contract.clone()));
        let op = with_extension(fact, proxy, &[&user_kp]);
        assert_eq!(w.ledger.rejection(&op), ReasonKind::ContractNotActive);
    }

    #[test]
    fn test_proxy_payer_must_be_contract() {
        let w = world();
        let user_kp = keypair(2);
        let user = w.ledger.fund(&user_kp, 50);
        let bob = w.ledger.fund(&keypair(3), 0);

        let fact = TransferFact::new(
            "proxied",
            user,
            vec![TransferItem::new(bob, vec![amount(10)])],
        );
        let proxy = Extension::ProxyPayer(ProxyPayer::new(w.owner.clone()));
        let op = with_extension(fact, proxy, &[&user_kp]);
        assert_eq!(w.ledger.rejection(&op), ReasonKind::ValueInvalid);
    }

    // =========================================================================
    // SETTLEMENT
    // =========================================================================

    #[test]
    fn test_settlement_sender_pays_fee() {
        let w = world();
        let user_kp = keypair(2);
        let user = w.ledger.fund(&user_kp, 50);
        let bob = w.ledger.fund(&keypair(3), 0);

        let owner_before = w.balance(&w.owner);
        let fact = TransferFact::new(
            "settled",
            user.clone(),
            vec![TransferItem::new(bob.clone(), vec![amount(10)])],
        );
        let op = with_extension(
            fact,
            Extension::Settlement(Settlement::new(w.owner.clone())),
            &[&user_kp, &w.owner_kp],
        );
        w.ledger.apply(&op).unwrap();

        assert_eq!(w.balance(&user), U256::from(40));
        assert_eq!(w.balance(&bob), U256::from(10));
        assert_eq!(w.balance(&w.owner), owner_before - FEE);
    }

    #[test]
    fn test_settlement_needs_operation_sender_signature() {
        let w = world();
        let user_kp = keypair(2);
        let user = w.ledger.fund(&user_kp, 50);
        let bob = w.ledger.fund(&keypair(3), 0);

        let fact = TransferFact::new(
            "settled",
            user,
            vec![TransferItem::new(bob, vec![amount(10)])],
        );
        let op = with_extension(
            fact,
            Extension::Settlement(Settlement::new(w.owner.clone())),
            &[&user_kp],
        );
        assert_eq!(w.ledger.rejection(&op), ReasonKind::SignatureInvalid);
    }

    #[test]
    fn test_proxy_payer_takes_precedence_over_settlement() {
        let w = world();
        w.activate();
        let user_kp = keypair(2);
        let user = w.ledger.fund(&user_kp, 50);
        let bob = w.ledger.fund(&keypair(3), 0);
        w.set_recipients(vec![user.clone()]);

        let owner_before = w.balance(&w.owner);
        let contract_before = w.balance(&w.contract);
        let fact = TransferFact::new("both", user, vec![TransferItem::new(bob, vec![amount(10)])]);
        let mut op = Operation::new(fact)
            .with_extension(Extension::Settlement(Settlement::new(w.owner.clone())))
            .unwrap()
            .with_extension(Extension::ProxyPayer(ProxyPayer::new(w.contract.clone())))
            .unwrap();
        op.sign(&user_kp, NETWORK.as_bytes(), 1);
        op.sign(&w.owner_kp, NETWORK.as_bytes(), 1);
        w.ledger.apply(&op).unwrap();

        assert_eq!(w.balance(&w.owner), owner_before);
        assert_eq!(w.balance(&w.contract), contract_before - FEE);
    }
}
