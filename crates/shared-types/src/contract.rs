//! # Contract Account Status
//!
//! Metadata of a contract account, stored under `<address>:contractaccount`.
//! Handler and recipient lists are kept sorted by address bytes so the
//! encoding is independent of the order they were supplied in.

use crate::encoding::ByteWriter;
use crate::{Address, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Maximum handlers and maximum recipients of one contract account.
pub const MAX_CONTRACT_ADDRESSES: usize = 20;

/// Whether the owner may withdraw from the contract account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceStatus {
    #[default]
    Allowed,
    WithdrawalBlocked,
}

impl BalanceStatus {
    fn tag(self) -> u8 {
        match self {
            BalanceStatus::Allowed => 0,
            BalanceStatus::WithdrawalBlocked => 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAccountStatus {
    owner: Address,
    is_active: bool,
    balance_status: BalanceStatus,
    handlers: Vec<Address>,
    recipients: Vec<Address>,
}

impl ContractAccountStatus {
    /// Inactive contract with no handlers or recipients.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            is_active: false,
            balance_status: BalanceStatus::Allowed,
            handlers: Vec::new(),
            recipients: Vec::new(),
        }
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn balance_status(&self) -> BalanceStatus {
        self.balance_status
    }

    pub fn handlers(&self) -> &[Address] {
        &self.handlers
    }

    pub fn recipients(&self) -> &[Address] {
        &self.recipients
    }

    pub fn is_owner(&self, address: &Address) -> bool {
        &self.owner == address
    }

    pub fn is_handler(&self, address: &Address) -> bool {
        self.handlers.binary_search(address).is_ok()
    }

    pub fn is_owner_or_handler(&self, address: &Address) -> bool {
        self.is_owner(address) || self.is_handler(address)
    }

    pub fn is_recipient(&self, address: &Address) -> bool {
        self.recipients.binary_search(address).is_ok()
    }

    pub fn with_handlers(&self, handlers: Vec<Address>) -> Result<Self, ValidationError> {
        let handlers = normalize_addresses("handlers", handlers, &self.owner)?;
        Ok(Self {
            handlers,
            ..self.clone()
        })
    }

    pub fn with_recipients(&self, recipients: Vec<Address>) -> Result<Self, ValidationError> {
        let recipients = normalize_addresses("recipients", recipients, &self.owner)?;
        Ok(Self {
            recipients,
            ..self.clone()
        })
    }

    pub fn set_active(&self, is_active: bool) -> Self {
        Self {
            is_active,
            ..self.clone()
        }
    }

    pub fn with_balance_status(&self, balance_status: BalanceStatus) -> Self {
        Self {
            balance_status,
            ..self.clone()
        }
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        for (field, list) in [("handlers", &self.handlers), ("recipients", &self.recipients)] {
            let normalized = normalize_addresses(field, list.clone(), &self.owner)?;
            if &normalized != list {
                return Err(ValidationError::InvalidFormat(format!("{field} not sorted")));
            }
        }
        Ok(())
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_bytes(self.owner.bytes())
            .put_bool(self.is_active)
            .put_u8(self.balance_status.tag())
            .put_list(&self.handlers, |a| a.bytes().to_vec())
            .put_list(&self.recipients, |a| a.bytes().to_vec());
        w.finish()
    }
}

/// Sort, then reject an oversized list, duplicates and the owner itself.
pub fn normalize_addresses(
    field: &'static str,
    mut addresses: Vec<Address>,
    owner: &Address,
) -> Result<Vec<Address>, ValidationError> {
    if addresses.len() > MAX_CONTRACT_ADDRESSES {
        return Err(ValidationError::ArrayLength {
            field,
            actual: addresses.len(),
            min: 0,
            max: MAX_CONTRACT_ADDRESSES,
        });
    }
    let mut seen = BTreeSet::new();
    for address in &addresses {
        if !seen.insert(address) {
            return Err(ValidationError::DuplicateValue {
                field,
                value: address.to_string(),
            });
        }
        if address == owner {
            return Err(ValidationError::SelfTarget(format!(
                "owner {owner} listed in {field}"
            )));
        }
    }
    addresses.sort();
    Ok(addresses)
}
