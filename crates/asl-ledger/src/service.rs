use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use asl_gate::{InMemoryWallet, Wallet};
use asl_registry::{AssetFilter, CertKind};
use asl_types::{AccountName, Address, DecimalNumber, ErrorKind, Quantity, Symbol};

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::ledger::AssetLedger;

/// A named call against the ledger, as accepted by [`AssetService`].
///
/// Quantities are either raw units (`units * 10^decimal_number`) or a
/// decimal string in whole units. Where a source or target address is
/// optional it defaults to the account's main address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Call {
    /// Register an account in the wallet and return its main address.
    NewAccount { account: AccountName },
    /// Allow `delegate` to spend from `account`'s main address.
    GrantSpend {
        account: AccountName,
        delegate: AccountName,
    },
    CreateAsset {
        account: AccountName,
        symbol: Symbol,
        #[serde(default)]
        decimal_number: DecimalNumber,
        #[serde(default)]
        description: String,
    },
    #[serde(rename = "delete_localasset")]
    DeleteLocalAsset { account: AccountName, symbol: Symbol },
    IssueAsset {
        account: AccountName,
        symbol: Symbol,
        quantity: Amount,
        #[serde(default)]
        to: Option<Address>,
    },
    SendAsset {
        account: AccountName,
        to: Address,
        symbol: Symbol,
        quantity: Amount,
        #[serde(default)]
        from: Option<Address>,
    },
    SendAssetFrom {
        account: AccountName,
        from: Address,
        to: Address,
        symbol: Symbol,
        quantity: Amount,
    },
    BurnAsset {
        account: AccountName,
        symbol: Symbol,
        quantity: Amount,
        #[serde(default)]
        from: Option<Address>,
    },
    #[serde(rename = "get_accountasset")]
    GetAccountAsset {
        account: AccountName,
        #[serde(default)]
        symbol: Option<Symbol>,
    },
    #[serde(rename = "get_addressasset")]
    GetAddressAsset {
        address: Address,
        #[serde(default)]
        symbol: Option<Symbol>,
    },
    GetAsset {
        #[serde(default)]
        symbol: Option<Symbol>,
    },
    /// Hand a cert for `symbol` to the account owning `to`.
    IssueCert {
        account: AccountName,
        symbol: Symbol,
        #[serde(default)]
        to: Option<Address>,
        #[serde(default)]
        cert: CertKind,
    },
    /// Certs held by `account`, or every cert.
    GetCert {
        #[serde(default)]
        account: Option<AccountName>,
    },
    /// Confirm pending intents, `count` blocks in a row.
    Mining {
        #[serde(default = "one")]
        count: u32,
    },
}

fn one() -> u32 {
    1
}

/// A call quantity: raw units or a decimal string such as `"12.5"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Raw(Quantity),
    Decimal(String),
}

impl From<Quantity> for Amount {
    fn from(quantity: Quantity) -> Self {
        Self::Raw(quantity)
    }
}

impl Call {
    pub fn method(&self) -> &'static str {
        match self {
            Self::NewAccount { .. } => "new_account",
            Self::GrantSpend { .. } => "grant_spend",
            Self::CreateAsset { .. } => "create_asset",
            Self::DeleteLocalAsset { .. } => "delete_localasset",
            Self::IssueAsset { .. } => "issue_asset",
            Self::SendAsset { .. } => "send_asset",
            Self::SendAssetFrom { .. } => "send_asset_from",
            Self::BurnAsset { .. } => "burn_asset",
            Self::GetAccountAsset { .. } => "get_accountasset",
            Self::GetAddressAsset { .. } => "get_addressasset",
            Self::GetAsset { .. } => "get_asset",
            Self::IssueCert { .. } => "issue_cert",
            Self::GetCert { .. } => "get_cert",
            Self::Mining { .. } => "mining",
        }
    }
}

/// Outcome of a call: `code` 0 on success, otherwise [`ErrorKind::code`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub code: u32,
    pub message: String,
    pub result: Value,
}

impl Response {
    pub fn ok(result: Value) -> Self {
        Self {
            code: 0,
            message: "success".into(),
            result,
        }
    }

    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            code: kind.code(),
            message: message.into(),
            result: Value::Null,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

impl From<LedgerError> for Response {
    fn from(err: LedgerError) -> Self {
        Self::error(err.kind(), err.to_string())
    }
}

/// Named-call surface over an [`AssetLedger`] and its wallet.
pub struct AssetService {
    ledger: AssetLedger,
    wallet: Arc<InMemoryWallet>,
}

impl AssetService {
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerError> {
        let wallet = Arc::new(InMemoryWallet::new());
        let ledger = AssetLedger::new(config, wallet.clone())?;
        Ok(Self { ledger, wallet })
    }

    pub fn ledger(&self) -> &AssetLedger {
        &self.ledger
    }

    pub fn wallet(&self) -> &InMemoryWallet {
        &self.wallet
    }

    /// Execute a raw JSON call. Malformed input is `InvalidArgument`.
    pub fn call_json(&self, value: Value) -> Response {
        match serde_json::from_value::<Call>(value) {
            Ok(call) => self.call(call),
            Err(e) => Response::error(ErrorKind::InvalidArgument, format!("invalid call: {e}")),
        }
    }

    pub fn call(&self, call: Call) -> Response {
        let method = call.method();
        let response = match self.dispatch(call) {
            Ok(result) => Response::ok(result),
            Err(err) => Response::from(err),
        };
        debug!(method, code = response.code, "call handled");
        response
    }

    fn dispatch(&self, call: Call) -> Result<Value, LedgerError> {
        match call {
            Call::NewAccount { account } => {
                let address = self.wallet.create_account(&account);
                Ok(json!({ "account": account, "address": address }))
            }
            Call::GrantSpend { account, delegate } => {
                let address = self.main_address(&account)?;
                self.wallet.grant_spend(&delegate, &address);
                Ok(json!({ "delegate": delegate, "address": address }))
            }
            Call::CreateAsset {
                account,
                symbol,
                decimal_number,
                description,
            } => {
                self.ledger
                    .create_asset(&account, symbol.clone(), decimal_number, description)?;
                let rows = self
                    .ledger
                    .asset_records(&AssetFilter::Symbol(symbol))?;
                to_value(&rows)
            }
            Call::DeleteLocalAsset { account, symbol } => {
                let asset = self.ledger.delete_local_asset(&account, &symbol)?;
                Ok(json!({ "symbol": asset.symbol, "status": "deleted" }))
            }
            Call::IssueAsset {
                account,
                symbol,
                quantity,
                to,
            } => {
                let to = self.or_main_address(to, &account)?;
                let quantity = self.resolve(&symbol, quantity)?;
                let id = self.ledger.issue_asset(&account, symbol, to, quantity)?;
                Ok(json!({ "intent_id": id.to_string() }))
            }
            Call::SendAsset {
                account,
                to,
                symbol,
                quantity,
                from,
            } => {
                let from = self.or_main_address(from, &account)?;
                let quantity = self.resolve(&symbol, quantity)?;
                let id = self
                    .ledger
                    .send_asset(&account, from, to, symbol, quantity)?;
                Ok(json!({ "intent_id": id.to_string() }))
            }
            Call::SendAssetFrom {
                account,
                from,
                to,
                symbol,
                quantity,
            } => {
                let quantity = self.resolve(&symbol, quantity)?;
                let id = self
                    .ledger
                    .send_asset_from(&account, from, to, symbol, quantity)?;
                Ok(json!({ "intent_id": id.to_string() }))
            }
            Call::BurnAsset {
                account,
                symbol,
                quantity,
                from,
            } => {
                let owner = self.or_main_address(from, &account)?;
                let quantity = self.resolve(&symbol, quantity)?;
                let id = self.ledger.burn_asset(&account, owner, symbol, quantity)?;
                Ok(json!({ "intent_id": id.to_string() }))
            }
            Call::GetAccountAsset { account, symbol } => {
                to_value(&self.ledger.account_assets(&account, &filter(symbol))?)
            }
            Call::GetAddressAsset { address, symbol } => {
                to_value(&self.ledger.address_assets(&address, &filter(symbol))?)
            }
            Call::GetAsset { symbol } => to_value(&self.ledger.asset_records(&filter(symbol))?),
            Call::IssueCert {
                account,
                symbol,
                to,
                cert,
            } => {
                let to = self.or_main_address(to, &account)?;
                to_value(&self.ledger.issue_cert(&account, symbol, to, cert)?)
            }
            Call::GetCert { account } => to_value(&self.ledger.certs(account.as_ref())?),
            Call::Mining { count } => {
                if count == 0 {
                    return Err(LedgerError::Rejected {
                        kind: ErrorKind::InvalidArgument,
                        reason: "mining count must be at least 1".into(),
                    });
                }
                let mut blocks = Vec::new();
                for _ in 0..count {
                    let block = self.ledger.confirm()?;
                    blocks.push(json!({
                        "height": block.height,
                        "hash": block.hash_hex(),
                        "committed": block.committed.len(),
                        "rejected": block
                            .rejected
                            .iter()
                            .map(|r| json!({
                                "intent_id": r.intent.id.to_string(),
                                "code": r.kind.code(),
                                "message": r.reason,
                            }))
                            .collect::<Vec<_>>(),
                    }));
                }
                Ok(json!({ "height": self.ledger.height()?, "blocks": blocks }))
            }
        }
    }

    fn main_address(&self, account: &AccountName) -> Result<Address, LedgerError> {
        self.wallet
            .main_address(account)
            .ok_or_else(|| LedgerError::NoAddress(account.clone()))
    }

    /// Turn a call amount into raw units at the asset's precision.
    fn resolve(&self, symbol: &Symbol, amount: Amount) -> Result<Quantity, LedgerError> {
        match amount {
            Amount::Raw(quantity) => Ok(quantity),
            Amount::Decimal(text) => {
                let asset = self.ledger.asset(symbol)?;
                Ok(Quantity::parse_decimal(&text, asset.decimal_number)?)
            }
        }
    }

    fn or_main_address(
        &self,
        address: Option<Address>,
        account: &AccountName,
    ) -> Result<Address, LedgerError> {
        match address {
            Some(address) => Ok(address),
            None => self.main_address(account),
        }
    }
}

fn filter(symbol: Option<Symbol>) -> AssetFilter {
    symbol.map(AssetFilter::Symbol).unwrap_or_default()
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, LedgerError> {
    serde_json::to_value(value).map_err(|e| LedgerError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AssetService {
        let service = AssetService::new(LedgerConfig::default()).unwrap();
        for account in ["alice", "bob"] {
            assert!(service
                .call_json(json!({ "method": "new_account", "account": account }))
                .is_ok());
        }
        service
    }

    fn call(service: &AssetService, value: Value) -> Response {
        service.call_json(value)
    }

    #[test]
    fn burn_scenario_through_calls() {
        let s = service();
        let created = call(&s, json!({ "method": "create_asset", "account": "alice", "symbol": "X" }));
        assert!(created.is_ok());
        assert_eq!(created.result[0]["status"], "unissued");
        assert_eq!(created.result[0]["address"], "");

        assert!(call(&s, json!({ "method": "issue_asset", "account": "alice", "symbol": "X", "quantity": 10000 })).is_ok());
        assert!(call(&s, json!({ "method": "mining" })).is_ok());

        let rows = call(&s, json!({ "method": "get_accountasset", "account": "alice" }));
        assert_eq!(rows.result.as_array().unwrap().len(), 1);
        assert_eq!(rows.result[0]["quantity"], 10000);
        assert_eq!(rows.result[0]["status"], "unspent");

        let over = call(&s, json!({ "method": "burn_asset", "account": "alice", "symbol": "X", "quantity": 10001 }));
        assert_eq!(over.code, 5001);

        assert!(call(&s, json!({ "method": "burn_asset", "account": "alice", "symbol": "X", "quantity": 9999 })).is_ok());
        assert!(call(&s, json!({ "method": "mining" })).is_ok());
        assert!(call(&s, json!({ "method": "burn_asset", "account": "alice", "symbol": "X", "quantity": 1 })).is_ok());
        let mined = call(&s, json!({ "method": "mining" }));
        assert_eq!(mined.result["height"], 3);

        let address = s.wallet().main_address(&AccountName::new("alice").unwrap()).unwrap();
        let rows = call(&s, json!({ "method": "get_addressasset", "address": address, "symbol": "X" }));
        assert!(rows.is_ok());
        assert!(rows.result.as_array().unwrap().is_empty());

        let record = call(&s, json!({ "method": "get_asset", "symbol": "X" }));
        assert_eq!(record.result[0]["status"], "spent");
    }

    #[test]
    fn send_from_with_grant() {
        let s = service();
        call(&s, json!({ "method": "create_asset", "account": "alice", "symbol": "X", "decimal_number": 2 }));
        call(&s, json!({ "method": "issue_asset", "account": "alice", "symbol": "X", "quantity": 500 }));
        call(&s, json!({ "method": "mining" }));

        let alice = s.wallet().main_address(&AccountName::new("alice").unwrap()).unwrap();
        let bob = s.wallet().main_address(&AccountName::new("bob").unwrap()).unwrap();
        let request = json!({
            "method": "send_asset_from", "account": "bob",
            "from": alice, "to": bob, "symbol": "X", "quantity": 200
        });
        assert_eq!(call(&s, request.clone()).code, 3001);

        assert!(call(&s, json!({ "method": "grant_spend", "account": "alice", "delegate": "bob" })).is_ok());
        assert!(call(&s, request).is_ok());
        call(&s, json!({ "method": "mining" }));

        let rows = call(&s, json!({ "method": "get_accountasset", "account": "bob" }));
        assert_eq!(rows.result[0]["quantity"], 200);
        assert_eq!(rows.result[0]["decimal_number"], 2);
    }

    #[test]
    fn delete_localasset_call() {
        let s = service();
        call(&s, json!({ "method": "create_asset", "account": "alice", "symbol": "X" }));
        let deleted = call(&s, json!({ "method": "delete_localasset", "account": "alice", "symbol": "X" }));
        assert!(deleted.is_ok());
        let rows = call(&s, json!({ "method": "get_accountasset", "account": "alice" }));
        assert!(rows.result.as_array().unwrap().is_empty());
    }

    #[test]
    fn malformed_calls_are_invalid_argument() {
        let s = service();
        assert_eq!(call(&s, json!({ "method": "no_such_call" })).code, 1021);
        assert_eq!(call(&s, json!({ "method": "create_asset", "account": "alice", "symbol": "bad symbol" })).code, 1021);
        assert_eq!(call(&s, json!({ "method": "create_asset", "account": "alice", "symbol": "X", "decimal_number": 20 })).code, 1021);
    }

    #[test]
    fn unknown_account_has_no_address() {
        let s = service();
        let response = call(&s, json!({ "method": "burn_asset", "account": "carol", "symbol": "X", "quantity": 1 }));
        assert_eq!(response.code, ErrorKind::InvalidArgument.code());
    }

    #[test]
    fn decimal_quantities_use_asset_precision() {
        let s = service();
        call(&s, json!({ "method": "create_asset", "account": "alice", "symbol": "X", "decimal_number": 2 }));
        assert!(call(&s, json!({ "method": "issue_asset", "account": "alice", "symbol": "X", "quantity": "100.5" })).is_ok());
        call(&s, json!({ "method": "mining" }));
        assert!(call(&s, json!({ "method": "burn_asset", "account": "alice", "symbol": "X", "quantity": "0.05" })).is_ok());
        call(&s, json!({ "method": "mining" }));

        let rows = call(&s, json!({ "method": "get_accountasset", "account": "alice" }));
        assert_eq!(rows.result[0]["quantity"], 10_045);

        let too_precise = call(&s, json!({ "method": "burn_asset", "account": "alice", "symbol": "X", "quantity": "1.234" }));
        assert_eq!(too_precise.code, 1021);
        let unknown = call(&s, json!({ "method": "burn_asset", "account": "alice", "symbol": "Y", "quantity": "1" }));
        assert_eq!(unknown.code, 5101);
    }

    #[test]
    fn zero_mining_count_is_rejected() {
        let s = service();
        let response = call(&s, json!({ "method": "mining", "count": 0 }));
        assert_eq!(response.code, 1021);
        assert_eq!(s.ledger().height().unwrap(), 0);

        let mined = call(&s, json!({ "method": "mining", "count": 2 }));
        assert_eq!(mined.result["height"], 2);
        assert_eq!(mined.result["blocks"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn issue_cert_through_calls() {
        let s = service();
        call(&s, json!({ "method": "create_asset", "account": "alice", "symbol": "MVS" }));
        call(&s, json!({ "method": "issue_asset", "account": "alice", "symbol": "MVS", "quantity": 1 }));
        call(&s, json!({ "method": "mining" }));

        let bob = s.wallet().main_address(&AccountName::new("bob").unwrap()).unwrap();
        let foreign = call(&s, json!({ "method": "create_asset", "account": "bob", "symbol": "MVS.GOLD" }));
        assert_eq!(foreign.code, 5103);

        let cert = call(&s, json!({ "method": "issue_cert", "account": "alice", "symbol": "MVS.GOLD", "to": bob }));
        assert!(cert.is_ok());
        assert_eq!(cert.result["kind"], "domain_naming");
        assert_eq!(cert.result["owner"], "bob");

        let again = call(&s, json!({ "method": "issue_cert", "account": "alice", "symbol": "MVS.GOLD", "to": bob }));
        assert_eq!(again.code, 5104);
        let domain = call(&s, json!({ "method": "issue_cert", "account": "alice", "symbol": "MVS", "cert": "domain" }));
        assert_eq!(domain.code, 1021);

        assert!(call(&s, json!({ "method": "create_asset", "account": "bob", "symbol": "MVS.GOLD" })).is_ok());
        let held = call(&s, json!({ "method": "get_cert", "account": "bob" }));
        assert_eq!(held.result.as_array().unwrap().len(), 1);
        let all = call(&s, json!({ "method": "get_cert" }));
        assert_eq!(all.result.as_array().unwrap().len(), 2);
    }

    #[test]
    fn calls_serialize_with_method_tag() {
        let call = Call::Mining { count: 2 };
        let json = serde_json::to_value(&call).unwrap();
        assert_eq!(json["method"], "mining");
        let parsed: Call = serde_json::from_value(json!({ "method": "get_accountasset", "account": "a" })).unwrap();
        assert_eq!(parsed.method(), "get_accountasset");
    }
}
