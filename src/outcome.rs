use std::fmt;

use ic_canister_log::log;
use serde::{Deserialize, Serialize};

use crate::{
    ethereum::ProvisionReport,
    logs::INFO,
    solana::{CreatedLookupTable, CreatedMarket, PoolOutcome, PositionOutcome},
};

/// Result of a top-level run as printed for callers:
/// `{"success":true,"txId":"..."}` or `{"success":false,"error":"..."}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reports the transaction that best identifies what a procedure did.
pub trait TxReport {
    fn tx_id(&self) -> Option<String>;
}

impl TxReport for ProvisionReport {
    fn tx_id(&self) -> Option<String> {
        Some(self.position.tx_hash.to_string())
    }
}

impl TxReport for PoolOutcome {
    fn tx_id(&self) -> Option<String> {
        self.signature.as_ref().map(ToString::to_string)
    }
}

impl TxReport for PositionOutcome {
    fn tx_id(&self) -> Option<String> {
        Some(self.position.signature.to_string())
    }
}

impl TxReport for CreatedMarket {
    fn tx_id(&self) -> Option<String> {
        self.signatures.last().map(ToString::to_string)
    }
}

impl TxReport for CreatedLookupTable {
    fn tx_id(&self) -> Option<String> {
        Some(self.signature.to_string())
    }
}

pub fn run_outcome<T: TxReport, E: fmt::Display>(result: Result<T, E>) -> RunOutcome {
    match result {
        Ok(report) => {
            let tx_id = report.tx_id();
            log!(INFO, "[run_outcome]: success, tx {tx_id:?}");
            RunOutcome {
                success: true,
                tx_id,
                error: None,
            }
        }
        Err(err) => {
            log!(INFO, "[run_outcome]: failed: {err}");
            RunOutcome {
                success: false,
                tx_id: None,
                error: Some(err.to_string()),
            }
        }
    }
}

/// JSON documents a run produces, kept until the command finishes and then
/// written one per line. Log lines go to stdout as they happen, so holding
/// the results back keeps each document on a line of its own.
#[derive(Debug, Default)]
pub struct RunOutput {
    documents: Vec<serde_json::Value>,
}

impl RunOutput {
    pub fn push(&mut self, document: &impl Serialize) -> Result<(), serde_json::Error> {
        self.documents.push(serde_json::to_value(document)?);
        Ok(())
    }

    /// Pushes the report when there is one, then the [`RunOutcome`], which is
    /// always the last document.
    pub fn record<T, E>(&mut self, result: Result<T, E>) -> Result<RunOutcome, serde_json::Error>
    where
        T: TxReport + Serialize,
        E: fmt::Display,
    {
        if let Ok(report) = &result {
            self.push(report)?;
        }
        let outcome = run_outcome(result);
        self.push(&outcome)?;
        Ok(outcome)
    }

    pub fn to_lines(&self) -> Result<String, serde_json::Error> {
        let mut text = String::new();
        for document in &self.documents {
            text.push_str(&serde_json::to_string(document)?);
            text.push('\n');
        }
        Ok(text)
    }
}
