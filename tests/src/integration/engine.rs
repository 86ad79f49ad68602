//! # Engine Flows
//!
//! Host-facing behaviour of `OperationEngine`: wire decoding, batches,
//! processor reuse, cancellation and parallel item processing.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use ledger_operations::prelude::*;
    use shared_types::{Address, U256};

    fn transfer(
        ledger: &Ledger,
        token: &str,
        sender: &Address,
        to: &Address,
        n: u64,
        kp: &shared_crypto::KeyPair,
    ) -> Operation {
        let fact = TransferFact::new(
            token,
            sender.clone(),
            vec![TransferItem::new(to.clone(), vec![amount(n)])],
        );
        ledger.sign(fact, kp)
    }

    #[test]
    fn test_decoded_operation_processes_like_original() {
        let ledger = Ledger::new();
        let alice_kp = keypair(1);
        let alice = ledger.fund(&alice_kp, 100);
        let bob = ledger.fund(&keypair(2), 0);
        let op = transfer(&ledger, "wire", &alice, &bob, 40, &alice_kp);

        let wire = serde_json::to_string(&op.to_json().unwrap()).unwrap();
        let decoded = registry().decode_str(&wire).unwrap();
        assert_eq!(decoded.hash(), op.hash());

        ledger.apply(&decoded).unwrap();
        assert_eq!(ledger.balance(&bob), Some(U256::from(40)));
    }

    #[test]
    fn test_tampered_wire_amount_rejected() {
        let ledger = Ledger::new();
        let alice_kp = keypair(1);
        let alice = ledger.fund(&alice_kp, 100);
        let bob = ledger.fund(&keypair(2), 0);
        let op = transfer(&ledger, "wire", &alice, &bob, 40, &alice_kp);

        let mut json = op.to_json().unwrap();
        json["fact"]["items"][0]["amounts"][0] = serde_json::to_value(amount(90)).unwrap();
        let decoded = registry().decode(&json).unwrap();
        assert_eq!(ledger.rejection(&decoded), ReasonKind::ValueInvalid);
        assert_eq!(ledger.balance(&alice), Some(U256::from(100)));
    }

    #[test]
    fn test_batch_sees_earlier_effects() {
        let ledger = Ledger::new();
        let alice_kp = keypair(1);
        let bob_kp = keypair(2);
        let alice = ledger.fund(&alice_kp, 100);
        let bob = ledger.fund(&bob_kp, 0);
        let carol = ledger.fund(&keypair(3), 0);

        let ops = vec![
            transfer(&ledger, "a", &alice, &bob, 60, &alice_kp),
            // Only possible after the first transfer landed.
            transfer(&ledger, "b", &bob, &carol, 50, &bob_kp),
            transfer(&ledger, "c", &alice, &carol, 60, &alice_kp),
        ];
        let outcomes = ledger
            .engine
            .run_batch(&ledger.next_context(), &ops, &*ledger.store)
            .unwrap();

        assert!(outcomes[0].is_accepted());
        assert!(outcomes[1].is_accepted());
        match &outcomes[2] {
            Outcome::Rejected(reason) => assert_eq!(reason.kind, ReasonKind::InsufficientBalance),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(ledger.balance(&carol), Some(U256::from(50)));
        assert_eq!(ledger.engine.stats().rejected, 1);
    }

    #[test]
    fn test_processors_are_reused() {
        let ledger = Ledger::new();
        let alice_kp = keypair(1);
        let alice = ledger.fund(&alice_kp, 1000);
        let bob = ledger.fund(&keypair(2), 0);

        for i in 0..5 {
            let op = transfer(&ledger, &format!("t{i}"), &alice, &bob, 1, &alice_kp);
            ledger.apply(&op).unwrap();
        }
        assert_eq!(ledger.engine.idle_processors(), 1);

        let bad = transfer(&ledger, "bad", &alice, &addr("nobody"), 1, &alice_kp);
        ledger.rejection(&bad);
        assert_eq!(ledger.engine.idle_processors(), 1);
        assert_eq!(ledger.engine.env().items.transfer.idle(), 1);
    }

    #[test]
    fn test_wide_transfer_runs_items_in_parallel() {
        let config = EngineConfig {
            parallel_threshold: 2,
            ..EngineConfig::with_network_id(NETWORK)
        };
        let ledger = Ledger::with_config(config, shared_types::Feeer::Nil);
        let alice_kp = keypair(1);
        let alice = ledger.fund(&alice_kp, 10_000);
        let receivers: Vec<Address> = (0..64).map(|i| ledger.fund(&keypair(100 + i), 0)).collect();

        let items = receivers
            .iter()
            .enumerate()
            .map(|(i, r)| TransferItem::new(r.clone(), vec![amount(i as u64 + 1)]))
            .collect();
        let fact = TransferFact::new("wide", alice.clone(), items);
        ledger.apply(&ledger.sign(fact, &alice_kp)).unwrap();

        for (i, r) in receivers.iter().enumerate() {
            assert_eq!(ledger.balance(r), Some(U256::from(i as u64 + 1)));
        }
        // 1 + 2 + ... + 64
        assert_eq!(ledger.balance(&alice), Some(U256::from(10_000 - 2_080)));
    }

    #[test]
    fn test_cancelled_context_is_fatal() {
        let ledger = Ledger::new();
        let alice_kp = keypair(1);
        let alice = ledger.fund(&alice_kp, 100);
        let bob = ledger.fund(&keypair(2), 0);
        let op = transfer(&ledger, "t", &alice, &bob, 1, &alice_kp);

        let cancel = CancelFlag::new();
        let ctx = ProcessContext::with_cancel(1, cancel.clone());
        ledger.engine.pre_process(&ctx, &op, &*ledger.store).unwrap();
        cancel.cancel();
        let err = ledger.engine.process(&ctx, &op, &*ledger.store).unwrap_err();
        assert_eq!(err, ProcessError::Fatal(FatalError::Cancelled));
        assert_eq!(ledger.engine.stats().fatal, 1);
        assert_eq!(ledger.engine.idle_processors(), 1);
    }

    #[test]
    fn test_wrong_network_rejected() {
        let ledger = Ledger::new();
        let alice_kp = keypair(1);
        let alice = ledger.fund(&alice_kp, 100);
        let bob = ledger.fund(&keypair(2), 0);
        let fact = TransferFact::new("t", alice, vec![TransferItem::new(bob, vec![amount(1)])]);
        let mut op = Operation::new(fact);
        op.sign(&alice_kp, b"othernet", 1);
        assert_eq!(ledger.rejection(&op), ReasonKind::SignatureInvalid);
    }
}
