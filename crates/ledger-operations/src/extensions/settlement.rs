//! A third account co-signs the operation and pays its fee.

use crate::domain::lookup;
use crate::errors::{ProcessError, ReasonKind};
use crate::operation::Operation;
use serde::{Deserialize, Serialize};
use shared_types::encoding::ByteWriter;
use shared_types::sign::check_signs_by_keys;
use shared_types::{Address, StateReader};

pub const EXTENSION_TYPE: &str = "settlement";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    op_sender: Address,
}

impl Settlement {
    pub fn new(op_sender: Address) -> Self {
        Self { op_sender }
    }

    pub fn op_sender(&self) -> &Address {
        &self.op_sender
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_bytes(self.op_sender.bytes());
        w.finish()
    }

    /// The signs of the operation must satisfy `op_sender`'s keys.
    pub fn verify(&self, op: &Operation, reader: &dyn StateReader) -> Result<(), ProcessError> {
        let account = lookup::existing_signer_account(reader, &self.op_sender)?;
        check_signs_by_keys(op.signs(), account.keys()).map_err(|e| {
            ProcessError::reason(
                ReasonKind::SignatureInvalid,
                format!("operation sender {}: {e}", self.op_sender),
            )
        })
    }
}
