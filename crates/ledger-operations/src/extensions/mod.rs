//! # Operation Extensions
//!
//! Optional riders on an operation, at most one of each type:
//!
//! | Extension | Proves |
//! |-----------|--------|
//! | `Authentication` | the sender's DID method signed the fact |
//! | `Settlement` | a third account signs for and pays the operation |
//! | `ProxyPayer` | an active contract account pays the fee |
//!
//! Verification runs Authentication, Settlement, then ProxyPayer and stops at
//! the first failure. Failures are reason errors naming the extension.

pub mod authentication;
pub mod proxy_payer;
pub mod settlement;

pub use authentication::Authentication;
pub use proxy_payer::ProxyPayer;
pub use settlement::Settlement;

use crate::errors::ProcessError;
use crate::operation::Operation;
use serde::{Deserialize, Serialize};
use shared_types::encoding::ByteWriter;
use shared_types::{Address, StateReader, ValidationError};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Extension {
    Authentication(Authentication),
    Settlement(Settlement),
    ProxyPayer(ProxyPayer),
}

impl Extension {
    pub fn type_name(&self) -> &'static str {
        match self {
            Extension::Authentication(_) => authentication::EXTENSION_TYPE,
            Extension::Settlement(_) => settlement::EXTENSION_TYPE,
            Extension::ProxyPayer(_) => proxy_payer::EXTENSION_TYPE,
        }
    }
}

/// The extensions attached to one operation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Extension>", into = "Vec<Extension>")]
pub struct Extensions {
    authentication: Option<Authentication>,
    settlement: Option<Settlement>,
    proxy_payer: Option<ProxyPayer>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `extension`; a second extension of the same type is rejected.
    pub fn add(&mut self, extension: Extension) -> Result<(), ValidationError> {
        let type_name = extension.type_name();
        let taken = match extension {
            Extension::Authentication(ext) => self.authentication.replace(ext).is_some(),
            Extension::Settlement(ext) => self.settlement.replace(ext).is_some(),
            Extension::ProxyPayer(ext) => self.proxy_payer.replace(ext).is_some(),
        };
        if taken {
            return Err(ValidationError::DuplicateValue {
                field: "extensions",
                value: type_name.to_string(),
            });
        }
        Ok(())
    }

    pub fn authentication(&self) -> Option<&Authentication> {
        self.authentication.as_ref()
    }

    pub fn settlement(&self) -> Option<&Settlement> {
        self.settlement.as_ref()
    }

    pub fn proxy_payer(&self) -> Option<&ProxyPayer> {
        self.proxy_payer.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.authentication.is_none() && self.settlement.is_none() && self.proxy_payer.is_none()
    }

    /// Extensions in verification order.
    pub fn to_vec(&self) -> Vec<Extension> {
        let mut all = Vec::new();
        if let Some(ext) = &self.authentication {
            all.push(Extension::Authentication(ext.clone()));
        }
        if let Some(ext) = &self.settlement {
            all.push(Extension::Settlement(ext.clone()));
        }
        if let Some(ext) = &self.proxy_payer {
            all.push(Extension::ProxyPayer(ext.clone()));
        }
        all
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        if let Some(ext) = &self.authentication {
            ext.is_valid()?;
        }
        Ok(())
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_option(self.authentication.as_ref().map(Authentication::bytes).as_deref())
            .put_option(self.settlement.as_ref().map(Settlement::bytes).as_deref())
            .put_option(self.proxy_payer.as_ref().map(ProxyPayer::bytes).as_deref());
        w.finish()
    }

    /// Verify every attached extension in order.
    pub fn verify(&self, op: &Operation, reader: &dyn StateReader) -> Result<(), ProcessError> {
        if let Some(ext) = &self.authentication {
            ext.verify(op, reader)
                .map_err(|e| e.wrap(authentication::EXTENSION_TYPE))?;
            debug!(id = %ext.authentication_id(), "Authentication verified");
        }
        if let Some(ext) = &self.settlement {
            ext.verify(op, reader)
                .map_err(|e| e.wrap(settlement::EXTENSION_TYPE))?;
            debug!(op_sender = %ext.op_sender(), "Settlement verified");
        }
        if let Some(ext) = &self.proxy_payer {
            ext.verify(op, reader)
                .map_err(|e| e.wrap(proxy_payer::EXTENSION_TYPE))?;
            debug!(proxy_payer = %ext.proxy_payer(), "Proxy payer verified");
        }
        Ok(())
    }

    /// Account charged with the fee: proxy payer, else settlement sender,
    /// else the fact's own fee payer.
    pub fn resolve_fee_payer(&self, fact_payer: &Address) -> Address {
        if let Some(proxy) = &self.proxy_payer {
            return proxy.proxy_payer().clone();
        }
        if let Some(settlement) = &self.settlement {
            return settlement.op_sender().clone();
        }
        fact_payer.clone()
    }
}

impl TryFrom<Vec<Extension>> for Extensions {
    type Error = ValidationError;

    fn try_from(list: Vec<Extension>) -> Result<Self, Self::Error> {
        let mut extensions = Self::new();
        for extension in list {
            extensions.add(extension)?;
        }
        Ok(extensions)
    }
}

impl From<Extensions> for Vec<Extension> {
    fn from(extensions: Extensions) -> Self {
        extensions.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::new(format!("{s}mca")).unwrap()
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let mut extensions = Extensions::new();
        extensions
            .add(Extension::Settlement(Settlement::new(addr("alice"))))
            .unwrap();
        let err = extensions
            .add(Extension::Settlement(Settlement::new(addr("bob"))))
            .unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateValue { .. }));
    }

    #[test]
    fn test_fee_payer_precedence() {
        let fact_payer = addr("sender");
        let mut extensions = Extensions::new();
        assert_eq!(extensions.resolve_fee_payer(&fact_payer), fact_payer);

        extensions
            .add(Extension::Settlement(Settlement::new(addr("settler"))))
            .unwrap();
        assert_eq!(extensions.resolve_fee_payer(&fact_payer), addr("settler"));

        extensions
            .add(Extension::ProxyPayer(ProxyPayer::new(addr("proxy"))))
            .unwrap();
        assert_eq!(extensions.resolve_fee_payer(&fact_payer), addr("proxy"));
    }

    #[test]
    fn test_serde_list_form() {
        let mut extensions = Extensions::new();
        extensions
            .add(Extension::ProxyPayer(ProxyPayer::new(addr("proxy"))))
            .unwrap();
        let json = serde_json::to_value(&extensions).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["type"], "proxy_payer");
        let back: Extensions = serde_json::from_value(json).unwrap();
        assert_eq!(back, extensions);

        let dup = serde_json::json!([
            {"type": "settlement", "op_sender": "alicemca"},
            {"type": "settlement", "op_sender": "bobmca"}
        ]);
        assert!(serde_json::from_value::<Extensions>(dup).is_err());
    }
}
