//! # Account Flows
//!
//! Transfers, account creation and key rotation, with and without fees.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use ledger_operations::prelude::*;
    use proptest::prelude::*;
    use shared_types::{AccountKeys, Feeer, U256};

    fn transfer(
        sender: &shared_types::Address,
        to: &shared_types::Address,
        n: u64,
    ) -> TransferFact {
        TransferFact::new(
            format!("transfer-{n}"),
            sender.clone(),
            vec![TransferItem::new(to.clone(), vec![amount(n)])],
        )
    }

    // =========================================================================
    // TRANSFER
    // =========================================================================

    #[test]
    fn test_transfer_moves_balance() {
        let ledger = Ledger::new();
        let alice_kp = keypair(1);
        let alice = ledger.fund(&alice_kp, 1000);
        let bob = ledger.fund(&keypair(2), 5);

        let op = ledger.sign(transfer(&alice, &bob, 300), &alice_kp);
        ledger.apply(&op).unwrap();

        assert_eq!(ledger.balance(&alice), Some(U256::from(700)));
        assert_eq!(ledger.balance(&bob), Some(U256::from(305)));
    }

    #[test]
    fn test_fixed_fee_is_added_to_sender_debit() {
        let fees = addr("fees");
        let ledger = Ledger::with_feeer(Feeer::Fixed {
            receiver: fees.clone(),
            amount: U256::from(3),
        });
        ledger.open(&fees, &keypair(99));
        let alice_kp = keypair(1);
        let alice = ledger.fund(&alice_kp, 100);
        let bob = ledger.fund(&keypair(2), 0);

        ledger.apply(&ledger.sign(transfer(&alice, &bob, 20), &alice_kp)).unwrap();

        assert_eq!(ledger.balance(&alice), Some(U256::from(77)));
        assert_eq!(ledger.balance(&bob), Some(U256::from(20)));
        assert_eq!(ledger.balance(&fees), Some(U256::from(3)));
    }

    #[test]
    fn test_fee_counts_toward_insufficient_balance() {
        let fees = addr("fees");
        let ledger = Ledger::with_feeer(Feeer::Fixed {
            receiver: fees.clone(),
            amount: U256::from(3),
        });
        let alice_kp = keypair(1);
        let alice = ledger.fund(&alice_kp, 22);
        let bob = ledger.fund(&keypair(2), 0);

        let op = ledger.sign(transfer(&alice, &bob, 20), &alice_kp);
        assert_eq!(ledger.rejection(&op), ReasonKind::InsufficientBalance);
        assert_eq!(ledger.balance(&alice), Some(U256::from(22)));
    }

    #[test]
    fn test_fixed_item_fee_per_item() {
        let fees = addr("fees");
        let ledger = Ledger::with_feeer(Feeer::FixedItem {
            receiver: fees.clone(),
            amount: U256::from(2),
        });
        let alice_kp = keypair(1);
        let alice = ledger.fund(&alice_kp, 100);
        let bob = ledger.fund(&keypair(2), 0);
        let carol = ledger.fund(&keypair(3), 0);

        let fact = TransferFact::new(
            "two",
            alice.clone(),
            vec![
                TransferItem::new(bob.clone(), vec![amount(10)]),
                TransferItem::new(carol.clone(), vec![amount(10)]),
            ],
        );
        ledger.apply(&ledger.sign(fact, &alice_kp)).unwrap();

        assert_eq!(ledger.balance(&alice), Some(U256::from(76)));
        assert_eq!(ledger.balance(&fees), Some(U256::from(4)));
    }

    #[test]
    fn test_transfer_to_unknown_receiver() {
        let ledger = Ledger::new();
        let alice_kp = keypair(1);
        let alice = ledger.fund(&alice_kp, 100);
        let op = ledger.sign(transfer(&alice, &addr("nobody"), 1), &alice_kp);
        assert_eq!(ledger.rejection(&op), ReasonKind::StateNotFound);
    }

    #[test]
    fn test_transfer_signed_by_stranger() {
        let ledger = Ledger::new();
        let alice = ledger.fund(&keypair(1), 100);
        let bob = ledger.fund(&keypair(2), 0);
        let op = ledger.sign(transfer(&alice, &bob, 1), &keypair(2));
        assert_eq!(ledger.rejection(&op), ReasonKind::SignatureInvalid);
    }

    #[test]
    fn test_self_transfer_rejected() {
        let ledger = Ledger::new();
        let alice_kp = keypair(1);
        let alice = ledger.fund(&alice_kp, 100);
        let op = ledger.sign(transfer(&alice, &alice, 1), &alice_kp);
        assert_eq!(ledger.rejection(&op), ReasonKind::ValueInvalid);
    }

    #[test]
    fn test_duplicate_receivers_rejected() {
        let ledger = Ledger::new();
        let alice_kp = keypair(1);
        let alice = ledger.fund(&alice_kp, 100);
        let bob = ledger.fund(&keypair(2), 0);
        let fact = TransferFact::new(
            "dup",
            alice,
            vec![
                TransferItem::new(bob.clone(), vec![amount(1)]),
                TransferItem::new(bob, vec![amount(2)]),
            ],
        );
        assert_eq!(ledger.rejection(&ledger.sign(fact, &alice_kp)), ReasonKind::ValueInvalid);
    }

    // =========================================================================
    // CREATE ACCOUNT
    // =========================================================================

    fn create_items(from: u32, count: u32) -> Vec<CreateAccountItem> {
        (from..from + count)
            .map(|i| CreateAccountItem::new(keys_of(&keypair(i)), vec![amount(1)]))
            .collect()
    }

    #[test]
    fn test_create_account_item_bounds() {
        let ledger = Ledger::new();
        let alice_kp = keypair(1);
        let alice = ledger.fund(&alice_kp, 10_000);

        let too_many = CreateAccountFact::new("many", alice.clone(), create_items(10, 101));
        assert_eq!(
            ledger.rejection(&ledger.sign(too_many, &alice_kp)),
            ReasonKind::ValueInvalid
        );

        let max = CreateAccountFact::new("max", alice.clone(), create_items(10, 100));
        ledger.apply(&ledger.sign(max, &alice_kp)).unwrap();
        assert_eq!(ledger.balance(&alice), Some(U256::from(9_900)));
        assert!(ledger.account(&address_of(&keypair(109))).is_some());
        assert_eq!(ledger.balance(&address_of(&keypair(10))), Some(U256::from(1)));
    }

    #[test]
    fn test_create_existing_account_rejected() {
        let ledger = Ledger::new();
        let alice_kp = keypair(1);
        let alice = ledger.fund(&alice_kp, 100);
        ledger.fund(&keypair(2), 0);
        let fact = CreateAccountFact::new(
            "again",
            alice,
            vec![CreateAccountItem::new(keys_of(&keypair(2)), vec![amount(1)])],
        );
        assert_eq!(
            ledger.rejection(&ledger.sign(fact, &alice_kp)),
            ReasonKind::StateAlreadyExists
        );
    }

    // =========================================================================
    // UPDATE KEY
    // =========================================================================

    #[test]
    fn test_rotated_key_takes_over() {
        let ledger = Ledger::new();
        let old_kp = keypair(1);
        let new_kp = keypair(2);
        let alice = ledger.fund(&old_kp, 100);
        let bob = ledger.fund(&keypair(3), 0);

        let rotate = UpdateKeyFact::new("rotate", alice.clone(), keys_of(&new_kp), mcc());
        ledger.apply(&ledger.sign(rotate, &old_kp)).unwrap();
        assert_eq!(ledger.account(&alice).unwrap().keys(), &keys_of(&new_kp));

        let stale = ledger.sign(transfer(&alice, &bob, 1), &old_kp);
        assert_eq!(ledger.rejection(&stale), ReasonKind::SignatureInvalid);
        ledger.apply(&ledger.sign(transfer(&alice, &bob, 2), &new_kp)).unwrap();
    }

    #[test]
    fn test_contract_keys_cannot_be_assigned() {
        let ledger = Ledger::new();
        let alice_kp = keypair(1);
        let alice = ledger.fund(&alice_kp, 100);
        let fact = UpdateKeyFact::new("rotate", alice, AccountKeys::contract(), mcc());
        assert_eq!(
            ledger.rejection(&ledger.sign(fact, &alice_kp)),
            ReasonKind::ValueInvalid
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Sender pays amount plus fee; receiver and fee receiver get exactly
        /// their share.
        #[test]
        fn prop_fixed_fee_conserves_balance(send in 1u64..500, fee in 0u64..50) {
            let fees = addr("fees");
            let ledger = Ledger::with_feeer(Feeer::Fixed {
                receiver: fees.clone(),
                amount: U256::from(fee),
            });
            let alice_kp = keypair(1);
            let alice = ledger.fund(&alice_kp, 1_000);
            let bob = ledger.fund(&keypair(2), 0);

            ledger.apply(&ledger.sign(transfer(&alice, &bob, send), &alice_kp)).unwrap();

            let fee_paid = ledger.balance(&fees).unwrap_or_default();
            prop_assert_eq!(fee_paid, U256::from(fee));
            prop_assert_eq!(ledger.balance(&alice), Some(U256::from(1_000 - send - fee)));
            prop_assert_eq!(ledger.balance(&bob), Some(U256::from(send)));
        }
    }
}
