//! Account entity stored under `<address>:account`.

use crate::encoding::ByteWriter;
use crate::{AccountKeys, Address};
use serde::{Deserialize, Serialize};

/// An account: its address and the key set that controls it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    address: Address,
    keys: AccountKeys,
}

impl Account {
    /// Account whose address is derived from `keys`.
    pub fn new(keys: AccountKeys) -> Self {
        Self {
            address: Address::from_keys(&keys),
            keys,
        }
    }

    /// Account at an explicit address.
    pub fn with_address(address: Address, keys: AccountKeys) -> Self {
        Self { address, keys }
    }

    /// Contract account: derived address, contract key set.
    pub fn new_contract(address: Address) -> Self {
        Self::with_address(address, AccountKeys::contract())
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn keys(&self) -> &AccountKeys {
        &self.keys
    }

    pub fn is_contract(&self) -> bool {
        self.keys.is_contract()
    }

    /// Same address, replaced key set.
    pub fn with_keys(&self, keys: AccountKeys) -> Self {
        Self::with_address(self.address.clone(), keys)
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_bytes(self.address.bytes()).put_bytes(&self.keys.bytes());
        w.finish()
    }
}
