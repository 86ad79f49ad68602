//! # Currency Flows
//!
//! Node-signed operations: registering and updating currencies and minting.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use ledger_operations::prelude::*;
    use shared_types::{Amount, CurrencyDesign, CurrencyId, CurrencyPolicy, Feeer, U256};

    fn mint(items: Vec<MintItem>) -> MintFact {
        MintFact::new(format!("mint-{}", items.len()), items)
    }

    #[test]
    fn test_mint_needs_node_threshold() {
        let ledger = Ledger::new();
        let nodes = ledger.nodes(4);
        let alice = ledger.fund(&keypair(1), 0);
        let fact = mint(vec![MintItem::new(alice.clone(), amount(5))]);

        // ceil(4 * 67 / 100) = 3
        let short = ledger.node_sign(fact.clone(), &nodes[..2]);
        assert_eq!(ledger.rejection(&short), ReasonKind::SignatureInvalid);

        let enough = ledger.node_sign(fact, &nodes[..3]);
        ledger.apply(&enough).unwrap();
        assert_eq!(ledger.balance(&alice), Some(U256::from(5)));
    }

    #[test]
    fn test_lower_threshold_from_config() {
        let config = EngineConfig {
            suffrage_threshold_percent: 50,
            ..EngineConfig::with_network_id(NETWORK)
        };
        let ledger = Ledger::with_config(config, Feeer::Nil);
        let nodes = ledger.nodes(4);
        let alice = ledger.fund(&keypair(1), 0);
        let op = ledger.node_sign(mint(vec![MintItem::new(alice, amount(5))]), &nodes[..2]);
        ledger.apply(&op).unwrap();
    }

    #[test]
    fn test_account_signature_is_not_a_node_signature() {
        let ledger = Ledger::new();
        ledger.nodes(1);
        let alice_kp = keypair(1);
        let alice = ledger.fund(&alice_kp, 0);
        let op = ledger.sign(mint(vec![MintItem::new(alice, amount(5))]), &alice_kp);
        assert_eq!(ledger.rejection(&op), ReasonKind::ValueInvalid);
    }

    #[test]
    fn test_mint_supply_is_sum_of_items() {
        let ledger = Ledger::new();
        let nodes = ledger.nodes(3);
        let alice = ledger.fund(&keypair(1), 0);
        let bob = ledger.fund(&keypair(2), 0);
        let supply = ledger.total_supply();

        let op = ledger.node_sign(
            mint(vec![
                MintItem::new(alice.clone(), amount(5)),
                MintItem::new(bob.clone(), amount(7)),
            ]),
            &nodes,
        );
        ledger.apply(&op).unwrap();

        assert_eq!(ledger.total_supply(), supply + 12);
        assert_eq!(ledger.balance(&alice), Some(U256::from(5)));
        assert_eq!(ledger.balance(&bob), Some(U256::from(7)));
    }

    #[test]
    fn test_mint_item_cap() {
        let ledger = Ledger::new();
        let nodes = ledger.nodes(1);
        let items = (0..11)
            .map(|i| MintItem::new(ledger.fund(&keypair(10 + i), 0), amount(1)))
            .collect();
        let op = ledger.node_sign(mint(items), &nodes);
        assert_eq!(ledger.rejection(&op), ReasonKind::ValueInvalid);
    }

    #[test]
    fn test_register_and_update_currency() {
        let ledger = Ledger::new();
        let nodes = ledger.nodes(3);
        let genesis_kp = keypair(1);
        let genesis = ledger.fund(&genesis_kp, 0);
        let fees = addr("fees");
        ledger.open(&fees, &keypair(99));

        let pen = CurrencyId::new("PEN").unwrap();
        let design = CurrencyDesign::new(
            Amount::new(5_000u64, pen.clone()),
            genesis.clone(),
            CurrencyPolicy::new(10u64, Feeer::Nil),
            2,
        );
        let register = ledger.node_sign(RegisterCurrencyFact::new("pen", design), &nodes);
        ledger.apply(&register).unwrap();
        let again = ledger.node_sign(
            RegisterCurrencyFact::new(
                "pen-again",
                CurrencyDesign::new(
                    Amount::new(1u64, pen.clone()),
                    genesis.clone(),
                    CurrencyPolicy::new(0u64, Feeer::Nil),
                    0,
                ),
            ),
            &nodes,
        );
        assert_eq!(ledger.rejection(&again), ReasonKind::StateAlreadyExists);

        let policy = CurrencyPolicy::new(
            10u64,
            Feeer::Fixed {
                receiver: fees.clone(),
                amount: U256::from(1),
            },
        );
        let update = ledger.node_sign(
            UpdateCurrencyFact::new("pen-fee", pen.clone(), policy),
            &nodes,
        );
        ledger.apply(&update).unwrap();

        // The new policy charges the genesis account for a PEN transfer.
        let bob = ledger.fund(&keypair(2), 0);
        let transfer = TransferFact::new(
            "spend",
            genesis.clone(),
            vec![TransferItem::new(bob, vec![Amount::new(100u64, pen.clone())])],
        );
        ledger.apply(&ledger.sign(transfer, &genesis_kp)).unwrap();
        match ledger
            .store
            .value(&shared_types::state::keys::balance(&genesis, &pen))
        {
            Some(shared_types::StateValue::Balance(balance)) => {
                assert_eq!(balance.big(), U256::from(4_899))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_update_currency_needs_fee_receiver() {
        let ledger = Ledger::new();
        let nodes = ledger.nodes(1);
        let policy = CurrencyPolicy::new(
            0u64,
            Feeer::Fixed {
                receiver: addr("ghost"),
                amount: U256::from(1),
            },
        );
        let op = ledger.node_sign(UpdateCurrencyFact::new("ghost-fee", mcc(), policy), &nodes);
        assert_eq!(ledger.rejection(&op), ReasonKind::StateNotFound);
    }

    // =========================================================================
    // EXTENSIONS
    // =========================================================================

    fn node_sign_with(
        fact: impl Into<OperationFact>,
        extensions: Vec<Extension>,
        nodes: &[(shared_crypto::KeyPair, shared_types::Address)],
    ) -> Operation {
        let mut op = Operation::new(fact);
        for extension in extensions {
            op = op.with_extension(extension).unwrap();
        }
        for (kp, address) in nodes {
            op.node_sign(kp, address.clone(), NETWORK.as_bytes(), 1);
        }
        op
    }

    #[test]
    fn test_mint_with_unknown_payers_rejected() {
        let ledger = Ledger::new();
        let nodes = ledger.nodes(4);
        let alice = ledger.fund(&keypair(1), 0);
        let supply = ledger.total_supply();
        let op = node_sign_with(
            mint(vec![MintItem::new(alice.clone(), amount(2))]),
            vec![
                Extension::ProxyPayer(ProxyPayer::new(addr("ghostpayer"))),
                Extension::Settlement(Settlement::new(addr("ghostsender"))),
            ],
            &nodes[..3],
        );
        assert_eq!(ledger.rejection(&op), ReasonKind::StateNotFound);
        assert_eq!(ledger.balance(&alice), Some(U256::from(0)));
        assert_eq!(ledger.total_supply(), supply);
    }

    #[test]
    fn test_proxy_payer_on_currency_operations_rejected() {
        let ledger = Ledger::new();
        let nodes = ledger.nodes(1);
        let genesis = ledger.fund(&keypair(1), 0);
        let proxy = || vec![Extension::ProxyPayer(ProxyPayer::new(genesis.clone()))];

        let pen = CurrencyId::new("PEN").unwrap();
        let design = CurrencyDesign::new(
            Amount::new(5_000u64, pen.clone()),
            genesis.clone(),
            CurrencyPolicy::new(0u64, Feeer::Nil),
            2,
        );
        let register = node_sign_with(RegisterCurrencyFact::new("pen", design), proxy(), &nodes);
        assert_eq!(ledger.rejection(&register), ReasonKind::Extension);

        let policy = CurrencyPolicy::new(0u64, Feeer::Nil);
        let update = node_sign_with(
            UpdateCurrencyFact::new("mcc", mcc(), policy),
            proxy(),
            &nodes,
        );
        assert_eq!(ledger.rejection(&update), ReasonKind::Extension);
    }
}
