//! An active contract account pays the fee on behalf of one of its
//! recipients.

use crate::domain::lookup;
use crate::errors::{ProcessError, ReasonKind};
use crate::operation::Operation;
use serde::{Deserialize, Serialize};
use shared_types::encoding::ByteWriter;
use shared_types::{Address, StateReader};

pub const EXTENSION_TYPE: &str = "proxy_payer";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyPayer {
    proxy_payer: Address,
}

impl ProxyPayer {
    pub fn new(proxy_payer: Address) -> Self {
        Self { proxy_payer }
    }

    pub fn proxy_payer(&self) -> &Address {
        &self.proxy_payer
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_bytes(self.proxy_payer.bytes());
        w.finish()
    }

    pub fn verify(&self, op: &Operation, reader: &dyn StateReader) -> Result<(), ProcessError> {
        let fee_able = op.fact().fee_able().ok_or_else(|| {
            ProcessError::reason(
                ReasonKind::Extension,
                format!("{} carries no fee", op.fact().operation_type()),
            )
        })?;

        let account = lookup::existing_account(reader, &self.proxy_payer)?;
        if !account.is_contract() {
            return Err(ProcessError::reason(
                ReasonKind::ValueInvalid,
                format!("proxy payer {} is not a contract account", self.proxy_payer),
            ));
        }
        let status = lookup::existing_contract_status(reader, &self.proxy_payer)?;
        if !status.is_active() {
            return Err(ProcessError::reason(
                ReasonKind::ContractNotActive,
                format!("proxy payer {} is not active", self.proxy_payer),
            ));
        }

        let payer = fee_able.fee_payer();
        if !status.is_recipient(payer) {
            return Err(ProcessError::reason(
                ReasonKind::AccountNotAuthorized,
                format!("{payer} is not a recipient of {}", self.proxy_payer),
            ));
        }
        Ok(())
    }
}
