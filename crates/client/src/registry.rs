//! Registry of known message types.
//!
//! Decoded transactions carry opaque `Any` payloads; the registry decides
//! which type URLs are acceptable and lets callers hook a structural
//! validator per type.

use core::fmt;
use std::collections::HashMap;

use cosmos_client_proto::Any;

use crate::error::Error;

type Validator = Box<dyn Fn(&Any) -> Result<(), Error> + Send + Sync>;

pub struct MsgRegistry {
    validators: HashMap<String, Validator>,
}

/// Type URLs accepted out of the box.
const WELL_KNOWN_TYPE_URLS: &[&str] = &[
    "/cosmos.bank.v1beta1.MsgSend",
    "/cosmos.bank.v1beta1.MsgMultiSend",
    "/cosmos.staking.v1beta1.MsgDelegate",
    "/cosmos.staking.v1beta1.MsgUndelegate",
    "/cosmos.staking.v1beta1.MsgBeginRedelegate",
    "/cosmos.distribution.v1beta1.MsgWithdrawDelegatorReward",
    "/cosmos.distribution.v1beta1.MsgSetWithdrawAddress",
    "/cosmos.gov.v1beta1.MsgVote",
    "/cosmos.gov.v1beta1.MsgDeposit",
    "/cosmos.gov.v1beta1.MsgSubmitProposal",
    "/cosmos.authz.v1beta1.MsgGrant",
    "/cosmos.authz.v1beta1.MsgRevoke",
    "/cosmos.authz.v1beta1.MsgExec",
    "/cosmos.feegrant.v1beta1.MsgGrantAllowance",
    "/cosmos.feegrant.v1beta1.MsgRevokeAllowance",
    "/cosmwasm.wasm.v1.MsgStoreCode",
    "/cosmwasm.wasm.v1.MsgInstantiateContract",
    "/cosmwasm.wasm.v1.MsgExecuteContract",
    "/cosmwasm.wasm.v1.MsgMigrateContract",
    "/ibc.applications.transfer.v1.MsgTransfer",
    "/ibc.core.client.v1.MsgCreateClient",
    "/ibc.core.client.v1.MsgUpdateClient",
];

impl MsgRegistry {
    /// An empty registry accepting nothing.
    pub fn empty() -> Self {
        Self {
            validators: HashMap::new(),
        }
    }

    /// Registers a type URL with a validator run against every decoded
    /// payload of that type.
    pub fn register(
        &mut self,
        type_url: impl Into<String>,
        validator: impl Fn(&Any) -> Result<(), Error> + Send + Sync + 'static,
    ) {
        self.validators.insert(type_url.into(), Box::new(validator));
    }

    /// Registers a type URL whose payload is accepted without inspection.
    pub fn register_passthrough(&mut self, type_url: impl Into<String>) {
        self.register(type_url, |_| Ok(()));
    }

    pub fn contains(&self, type_url: &str) -> bool {
        self.validators.contains_key(type_url)
    }

    /// Checks a payload against the registry: unknown type URLs are an
    /// error, known ones run their validator.
    pub fn validate(&self, msg: &Any) -> Result<(), Error> {
        match self.validators.get(&msg.type_url) {
            Some(validator) => validator(msg),
            None => Err(Error::unknown_msg_type(msg.type_url.clone())),
        }
    }
}

impl Default for MsgRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for type_url in WELL_KNOWN_TYPE_URLS {
            registry.register_passthrough(*type_url);
        }
        registry
    }
}

impl fmt::Debug for MsgRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut type_urls: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        type_urls.sort_unstable();

        f.debug_struct("MsgRegistry")
            .field("type_urls", &type_urls)
            .finish()
    }
}
