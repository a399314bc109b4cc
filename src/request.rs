//! JSON request surface: one tagged request enum in, one tagged response
//! out. Hosts that embed the engine directly can skip this module and call
//! the lifecycle functions with typed parameters.

use log::info;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::instructions::{
    contribute, create, distribute, update_config, ContributeParams, CreateParams,
    DistributeOutcome, DistributeParams, UpdateConfigParams,
};
use crate::ledger::ops::TransactionBlueprint;
use crate::ledger::query::LedgerQuery;
use crate::ledger::types::AccountId;
use crate::state::platform::PlatformAccounts;

/// Wire form of a distribute call; the trigger hash travels hex-encoded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributeRequest {
    pub crowdlottery_id: AccountId,
    pub trigger_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    Create(CreateParams),
    Contribute(ContributeParams),
    Distribute(DistributeRequest),
    UpdateConfig(UpdateConfigParams),
}

impl Request {
    fn action(&self) -> &'static str {
        match self {
            Request::Create(_) => "create",
            Request::Contribute(_) => "contribute",
            Request::Distribute(_) => "distribute",
            Request::UpdateConfig(_) => "updateConfig",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "bundle", rename_all = "camelCase")]
pub enum Response {
    Ready(TransactionBlueprint),
    AlreadySettled,
}

/// Dispatches one request against the ledger.
pub fn handle<Q: LedgerQuery>(
    query: &Q,
    platform: &PlatformAccounts,
    request: &Request,
    now_ms: u64,
) -> Result<Response> {
    info!("handling {} request", request.action());

    match request {
        Request::Create(params) => {
            create(query, platform, params, now_ms).map(Response::Ready)
        }
        Request::Contribute(params) => {
            contribute(query, platform, params, now_ms).map(Response::Ready)
        }
        Request::Distribute(request) => {
            let trigger_hash =
                hex::decode(&request.trigger_hash).map_err(|_| Error::InvalidTriggerHash)?;
            let params = DistributeParams {
                crowdlottery_id: request.crowdlottery_id.clone(),
                trigger_hash,
            };
            match distribute(query, platform, &params)? {
                DistributeOutcome::Payout(bundle) => Ok(Response::Ready(bundle)),
                DistributeOutcome::AlreadySettled => Ok(Response::AlreadySettled),
            }
        }
        Request::UpdateConfig(params) => {
            update_config(query, platform, params).map(Response::Ready)
        }
    }
}
