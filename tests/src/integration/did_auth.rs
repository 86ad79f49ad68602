//! # DID Registry and Authentication Flows
//!
//! A contract runs the DID service; users register documents and then move
//! funds by proving authority with a verification method instead of their
//! account keys.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use ledger_operations::prelude::*;
    use shared_crypto::KeyPair;
    use shared_types::did::did_for;
    use shared_types::state::keys;
    use shared_types::{
        Address, AllowedOperation, AuthenticationEntry, DidDocument, StateValue,
        VerificationMethod, VerificationMethodKind, U256,
    };

    const METHOD: &str = "ledger";

    struct Registry {
        ledger: Ledger,
        owner_kp: KeyPair,
        owner: Address,
        contract: Address,
        user_kp: KeyPair,
        user: Address,
        delegate_kp: KeyPair,
        delegate: Address,
        bob: Address,
    }

    /// Active DID contract; user and delegate each hold a fresh document.
    fn registry() -> Registry {
        let ledger = Ledger::new();
        let owner_kp = keypair(1);
        let owner = ledger.fund(&owner_kp, 1000);

        let contract_keys = keys_of(&keypair(40));
        let contract = Address::from_keys(&contract_keys);
        let create = CreateContractAccountFact::new(
            "contract",
            owner.clone(),
            vec![CreateContractAccountItem::new(contract_keys, vec![amount(10)])],
        );
        ledger.apply(&ledger.sign(create, &owner_kp)).unwrap();
        let register =
            RegisterModelFact::new("model", owner.clone(), contract.clone(), METHOD, mcc());
        ledger.apply(&ledger.sign(register, &owner_kp)).unwrap();

        let user_kp = keypair(2);
        let user = ledger.fund(&user_kp, 100);
        let delegate_kp = keypair(3);
        let delegate = ledger.fund(&delegate_kp, 100);
        let bob = ledger.fund(&keypair(4), 0);

        let r = Registry {
            ledger,
            owner_kp,
            owner,
            contract,
            user_kp,
            user,
            delegate_kp,
            delegate,
            bob,
        };
        r.create_did(&r.user, &r.user_kp);
        r.create_did(&r.delegate, &r.delegate_kp);
        r
    }

    fn transfer_type() -> &'static str {
        <TransferFact as Fact>::OPERATION_HINT.type_name
    }

    impl Registry {
        fn create_did(&self, sender: &Address, kp: &KeyPair) {
            let fact = CreateDidFact::new(
                "did",
                sender.clone(),
                self.contract.clone(),
                public_key(kp),
                mcc(),
            );
            self.ledger.apply(&self.ledger.sign(fact, kp)).unwrap();
        }

        fn document(&self, controller: &Address) -> DidDocument {
            let did = did_for(METHOD, controller);
            match self.ledger.store.value(&keys::did_document(&self.contract, &did)) {
                Some(StateValue::DidDocument(document)) => document,
                other => panic!("unexpected {other:?}"),
            }
        }

        fn allow_transfer(&self) -> Vec<AllowedOperation> {
            vec![AllowedOperation::new(self.contract.clone(), transfer_type())]
        }

        /// Replace the user's document with `#key-1` allowed to transfer plus
        /// `extra` authentication methods.
        fn update_user_document(
            &self,
            extra: Vec<VerificationMethod>,
            listed: Vec<VerificationMethod>,
        ) {
            let did = did_for(METHOD, &self.user);
            let key = VerificationMethod::new(
                format!("{did}#key-1"),
                self.user.clone(),
                VerificationMethodKind::from_key(public_key(&self.user_kp)),
                self.allow_transfer(),
            );
            let mut authentication = vec![AuthenticationEntry::Embedded(key)];
            authentication.extend(extra.into_iter().map(AuthenticationEntry::Embedded));
            let document = DidDocument::new(did.clone(), self.user.clone(), authentication, listed);
            let fact = UpdateDidDocumentFact::new(
                "update",
                self.user.clone(),
                self.contract.clone(),
                did,
                document,
                mcc(),
            );
            self.ledger.apply(&self.ledger.sign(fact, &self.user_kp)).unwrap();
        }

        fn linked(&self, fragment: &str, target: String) -> VerificationMethod {
            VerificationMethod::new(
                format!("{}#{fragment}", did_for(METHOD, &self.user)),
                self.user.clone(),
                VerificationMethodKind::Linked { target },
                self.allow_transfer(),
            )
        }

        /// Transfer of 10 from `sender` to bob, proved with `prover` through
        /// `method_id` and signed by `signer`.
        fn authenticated_transfer(
            &self,
            sender: &Address,
            method_id: String,
            prover: &KeyPair,
            signer: &KeyPair,
        ) -> Operation {
            let fact = TransferFact::new(
                format!("auth-{method_id}"),
                sender.clone(),
                vec![TransferItem::new(self.bob.clone(), vec![amount(10)])],
            );
            let proof =
                Authentication::prove(self.contract.clone(), method_id, prover, fact.hash());
            let mut op = Operation::new(fact)
                .with_extension(Extension::Authentication(proof))
                .unwrap();
            op.sign(signer, NETWORK.as_bytes(), 1);
            op
        }
    }

    // =========================================================================
    // REGISTRY
    // =========================================================================

    #[test]
    fn test_created_document_has_default_key() {
        let r = registry();
        let document = r.document(&r.user);
        assert_eq!(document.controller(), &r.user);
        let id = format!("{}#key-1", did_for(METHOD, &r.user));
        assert!(document.resolve_authentication(&id).is_some());
        assert!(!document.is_deactivated());
    }

    #[test]
    fn test_handler_can_deactivate() {
        let r = registry();
        let handler_kp = keypair(6);
        let handler = r.ledger.fund(&handler_kp, 100);
        let handlers = UpdateHandlerFact::new(
            "handlers",
            r.owner.clone(),
            r.contract.clone(),
            vec![handler.clone()],
            mcc(),
        );
        r.ledger.apply(&r.ledger.sign(handlers, &r.owner_kp)).unwrap();

        let did = did_for(METHOD, &r.user);
        let by_user =
            DeactivateDidFact::new("d", r.user.clone(), r.contract.clone(), did.clone(), mcc());
        assert_eq!(
            r.ledger.rejection(&r.ledger.sign(by_user, &r.user_kp)),
            ReasonKind::AccountNotAuthorized
        );

        let by_handler = DeactivateDidFact::new("d", handler, r.contract.clone(), did, mcc());
        r.ledger.apply(&r.ledger.sign(by_handler, &handler_kp)).unwrap();
        assert!(r.document(&r.user).is_deactivated());
    }

    // =========================================================================
    // AUTHENTICATION
    // =========================================================================

    #[test]
    fn test_default_key_needs_allow_list() {
        let r = registry();
        let id = format!("{}#key-1", did_for(METHOD, &r.user));
        let op = r.authenticated_transfer(&r.user, id, &r.user_kp, &r.user_kp);
        assert_eq!(r.ledger.rejection(&op), ReasonKind::AccountNotAuthorized);
    }

    #[test]
    fn test_method_proof_replaces_account_signature() {
        let r = registry();
        r.update_user_document(Vec::new(), Vec::new());
        let id = format!("{}#key-1", did_for(METHOD, &r.user));

        // Signed by the delegate, whose keys do not control the user account.
        let op = r.authenticated_transfer(&r.user, id, &r.user_kp, &r.delegate_kp);
        r.ledger.apply(&op).unwrap();
        assert_eq!(r.ledger.balance(&r.user), Some(U256::from(90)));
        assert_eq!(r.ledger.balance(&r.bob), Some(U256::from(10)));
    }

    #[test]
    fn test_linked_method_uses_target_key() {
        let r = registry();
        let target = format!("{}#key-1", did_for(METHOD, &r.delegate));
        r.update_user_document(vec![r.linked("delegate", target)], Vec::new());
        let id = format!("{}#delegate", did_for(METHOD, &r.user));

        let forged = r.authenticated_transfer(&r.user, id.clone(), &r.user_kp, &r.delegate_kp);
        assert_eq!(r.ledger.rejection(&forged), ReasonKind::SignatureInvalid);

        let op = r.authenticated_transfer(&r.user, id, &r.delegate_kp, &r.delegate_kp);
        r.ledger.apply(&op).unwrap();
        assert_eq!(r.ledger.balance(&r.user), Some(U256::from(90)));
    }

    #[test]
    fn test_linked_chain_rejected() {
        let r = registry();

        // delegate#link points back at the user's key: a second hop.
        let delegate_did = did_for(METHOD, &r.delegate);
        let document = r.document(&r.delegate);
        let hop = VerificationMethod::new(
            format!("{delegate_did}#link"),
            r.delegate.clone(),
            VerificationMethodKind::Linked {
                target: format!("{}#key-1", did_for(METHOD, &r.user)),
            },
            Vec::new(),
        );
        let chained = DidDocument::new(
            delegate_did.clone(),
            r.delegate.clone(),
            document.authentication().to_vec(),
            vec![hop],
        );
        let update = UpdateDidDocumentFact::new(
            "link",
            r.delegate.clone(),
            r.contract.clone(),
            delegate_did.clone(),
            chained,
            mcc(),
        );
        r.ledger.apply(&r.ledger.sign(update, &r.delegate_kp)).unwrap();

        r.update_user_document(vec![r.linked("chain", format!("{delegate_did}#link"))], Vec::new());
        let id = format!("{}#chain", did_for(METHOD, &r.user));
        let op = r.authenticated_transfer(&r.user, id, &r.user_kp, &r.user_kp);
        assert_eq!(r.ledger.rejection(&op), ReasonKind::ValueInvalid);
    }

    #[test]
    fn test_referenced_method_resolves() {
        let r = registry();
        let did = did_for(METHOD, &r.user);
        let listed = VerificationMethod::new(
            format!("{did}#listed"),
            r.user.clone(),
            VerificationMethodKind::from_key(public_key(&r.delegate_kp)),
            r.allow_transfer(),
        );
        let key = VerificationMethod::new(
            format!("{did}#key-1"),
            r.user.clone(),
            VerificationMethodKind::from_key(public_key(&r.user_kp)),
            Vec::new(),
        );
        let document = DidDocument::new(
            did.clone(),
            r.user.clone(),
            vec![
                AuthenticationEntry::Embedded(key),
                AuthenticationEntry::Reference(format!("{did}#listed")),
            ],
            vec![listed],
        );
        let update = UpdateDidDocumentFact::new(
            "update",
            r.user.clone(),
            r.contract.clone(),
            did.clone(),
            document,
            mcc(),
        );
        r.ledger.apply(&r.ledger.sign(update, &r.user_kp)).unwrap();

        let op = r.authenticated_transfer(
            &r.user,
            format!("{did}#listed"),
            &r.delegate_kp,
            &r.user_kp,
        );
        r.ledger.apply(&op).unwrap();
    }

    #[test]
    fn test_deactivated_document_cannot_authenticate() {
        let r = registry();
        r.update_user_document(Vec::new(), Vec::new());
        let did = did_for(METHOD, &r.user);
        let deactivate =
            DeactivateDidFact::new("d", r.owner.clone(), r.contract.clone(), did.clone(), mcc());
        r.ledger.apply(&r.ledger.sign(deactivate, &r.owner_kp)).unwrap();

        let op = r.authenticated_transfer(&r.user, format!("{did}#key-1"), &r.user_kp, &r.user_kp);
        assert_eq!(r.ledger.rejection(&op), ReasonKind::ValueInvalid);
    }

    #[test]
    fn test_document_of_another_controller() {
        let r = registry();
        r.update_user_document(Vec::new(), Vec::new());
        let id = format!("{}#key-1", did_for(METHOD, &r.user));

        // The delegate tries to spend with the user's document.
        let op = r.authenticated_transfer(&r.delegate, id, &r.user_kp, &r.delegate_kp);
        assert_eq!(r.ledger.rejection(&op), ReasonKind::AccountNotAuthorized);
    }

    #[test]
    fn test_unknown_method_id() {
        let r = registry();
        let id = format!("{}#missing", did_for(METHOD, &r.user));
        let op = r.authenticated_transfer(&r.user, id, &r.user_kp, &r.user_kp);
        assert_eq!(r.ledger.rejection(&op), ReasonKind::StateNotFound);
    }

    /// Delegate's did rewritten to name the user as controller, with the
    /// delegate key allowed to transfer.
    fn handed_over(r: &Registry) -> DidDocument {
        let did = did_for(METHOD, &r.delegate);
        let key = VerificationMethod::new(
            format!("{did}#key-1"),
            r.user.clone(),
            VerificationMethodKind::from_key(public_key(&r.delegate_kp)),
            r.allow_transfer(),
        );
        DidDocument::new(
            did,
            r.user.clone(),
            vec![AuthenticationEntry::Embedded(key)],
            Vec::new(),
        )
    }

    #[test]
    fn test_update_cannot_change_controller() {
        let r = registry();
        let did = did_for(METHOD, &r.delegate);
        let update = UpdateDidDocumentFact::new(
            "handover",
            r.delegate.clone(),
            r.contract.clone(),
            did,
            handed_over(&r),
            mcc(),
        );
        let op = r.ledger.sign(update, &r.delegate_kp);
        assert_eq!(r.ledger.rejection(&op), ReasonKind::ValueInvalid);
        assert_eq!(r.document(&r.delegate).controller(), &r.delegate);
    }

    #[test]
    fn test_document_must_be_the_senders_own() {
        let r = registry();
        let did = did_for(METHOD, &r.delegate);
        r.ledger.store.insert(
            keys::did_document(&r.contract, &did),
            StateValue::DidDocument(handed_over(&r)),
        );

        // Controller matches the user, but the did belongs to the delegate.
        let op = r.authenticated_transfer(
            &r.user,
            format!("{did}#key-1"),
            &r.delegate_kp,
            &r.delegate_kp,
        );
        assert_eq!(r.ledger.rejection(&op), ReasonKind::AccountNotAuthorized);
        assert_eq!(r.ledger.balance(&r.user), Some(U256::from(100)));
        assert_eq!(r.ledger.balance(&r.bob), Some(U256::from(0)));
    }
}
