use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::{json, Value};
use tracing::info;

use asl_ledger::{AssetService, LedgerConfig, Response};
use asl_types::{AccountName, Address};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Run(args) => cmd_run(config, args, &cli.format),
        Command::Demo(args) => cmd_demo(config, args, &cli.format),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<LedgerConfig> {
    match path {
        Some(path) => LedgerConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(LedgerConfig::default()),
    }
}

// ---------------------------------------------------------------------------
// Scenario execution
// ---------------------------------------------------------------------------

/// One call of a scenario with the code it is expected to return.
#[derive(Debug, Clone)]
pub struct Step {
    pub call: Value,
    pub expect: Option<u32>,
}

impl Step {
    /// Split the optional `expect` field off a raw call object.
    pub fn from_value(mut value: Value) -> anyhow::Result<Self> {
        let Some(object) = value.as_object_mut() else {
            bail!("scenario step must be a JSON object, got {value}");
        };
        let expect = match object.remove("expect") {
            None => None,
            Some(code) => {
                let code = code
                    .as_u64()
                    .and_then(|c| u32::try_from(c).ok())
                    .with_context(|| format!("`expect` must be a result code, got {code}"))?;
                Some(code)
            }
        };
        Ok(Self { call: value, expect })
    }

    fn method(&self) -> &str {
        self.call
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or("?")
    }
}

#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub method: String,
    pub expect: Option<u32>,
    pub response: Response,
}

impl StepOutcome {
    pub fn matches_expectation(&self) -> bool {
        match self.expect {
            Some(code) => self.response.code == code,
            None => true,
        }
    }

    fn to_json(&self) -> Value {
        json!({
            "method": self.method,
            "code": self.response.code,
            "message": self.response.message,
            "expect": self.expect,
            "result": self.response.result,
        })
    }
}

pub fn parse_scenario(text: &str) -> anyhow::Result<Vec<Step>> {
    let value: Value = serde_json::from_str(text).context("scenario is not valid JSON")?;
    let Value::Array(items) = value else {
        bail!("scenario must be a JSON array of calls");
    };
    items.into_iter().map(Step::from_value).collect()
}

/// Execute steps in order. With `fail_fast`, stop after the first step
/// whose code differs from its expectation.
pub fn execute(service: &AssetService, steps: Vec<Step>, fail_fast: bool) -> Vec<StepOutcome> {
    let mut outcomes = Vec::with_capacity(steps.len());
    for step in steps {
        let method = step.method().to_string();
        let response = service.call_json(step.call);
        let outcome = StepOutcome {
            method,
            expect: step.expect,
            response,
        };
        let mismatch = !outcome.matches_expectation();
        outcomes.push(outcome);
        if fail_fast && mismatch {
            break;
        }
    }
    outcomes
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_run(config: LedgerConfig, args: RunArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.scenario)
        .with_context(|| format!("reading scenario {}", args.scenario.display()))?;
    let steps = parse_scenario(&text)?;
    info!(steps = steps.len(), path = %args.scenario.display(), "running scenario");

    let service = AssetService::new(config)?;
    let outcomes = execute(&service, steps, args.fail_fast);
    report(&service, &outcomes, args.verify, format)
}

fn cmd_demo(config: LedgerConfig, args: DemoArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let steps = demo_scenario(&args.symbol, args.supply)?;
    let service = AssetService::new(config)?;
    let outcomes = execute(&service, steps, true);
    report(&service, &outcomes, true, format)
}

/// Create, issue and then burn an asset down to nothing, including one
/// overdraw that must fail with `InsufficientFunds`.
pub fn demo_scenario(symbol: &str, supply: u64) -> anyhow::Result<Vec<Step>> {
    if supply < 2 {
        bail!("demo supply must be at least 2, got {supply}");
    }
    let Some(overdraw) = supply.checked_add(1) else {
        bail!("demo supply {supply} leaves no room for an overdraw");
    };
    let account = "alice";
    let address = Address::derive(&AccountName::new(account)?, 0);

    let calls = vec![
        (json!({ "method": "new_account", "account": account }), 0),
        (
            json!({ "method": "create_asset", "account": account, "symbol": symbol,
                    "decimal_number": 2, "description": "demo asset" }),
            0,
        ),
        (json!({ "method": "issue_asset", "account": account, "symbol": symbol, "quantity": supply }), 0),
        (json!({ "method": "mining" }), 0),
        (json!({ "method": "get_accountasset", "account": account, "symbol": symbol }), 0),
        (json!({ "method": "burn_asset", "account": account, "symbol": symbol, "quantity": overdraw }), 5001),
        (json!({ "method": "burn_asset", "account": account, "symbol": symbol, "quantity": supply - 1 }), 0),
        (json!({ "method": "mining" }), 0),
        (json!({ "method": "burn_asset", "account": account, "symbol": symbol, "quantity": 1 }), 0),
        (json!({ "method": "mining" }), 0),
        (json!({ "method": "get_addressasset", "address": address.to_string() }), 0),
        (json!({ "method": "get_asset", "symbol": symbol }), 0),
    ];
    Ok(calls
        .into_iter()
        .map(|(call, code)| Step {
            call,
            expect: Some(code),
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn report(
    service: &AssetService,
    outcomes: &[StepOutcome],
    verify: bool,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let ledger = service.ledger();
    let height = ledger.height()?;
    let failed = outcomes.iter().filter(|o| !o.matches_expectation()).count();

    let verification = if verify {
        let chain = ledger.verify_chain()?;
        let replay = ledger.verify_replay()?;
        Some((chain, replay))
    } else {
        None
    };

    match format {
        OutputFormat::Json => {
            let mut doc = json!({
                "height": height,
                "failed": failed,
                "calls": outcomes.iter().map(StepOutcome::to_json).collect::<Vec<_>>(),
            });
            if let Some((chain, replay)) = &verification {
                doc["verify"] = json!({
                    "blocks": chain.block_count,
                    "chain_valid": chain.is_valid(),
                    "violations": chain
                        .violations
                        .iter()
                        .map(|v| json!({ "height": v.height, "kind": format!("{:?}", v.kind), "description": v.description }))
                        .collect::<Vec<_>>(),
                    "replay_converges": replay,
                });
            }
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        OutputFormat::Text => {
            for (n, outcome) in outcomes.iter().enumerate() {
                print_outcome(n + 1, outcome);
            }
            println!();
            println!("{} {}", "Height:".bold(), height);
            if let Some((chain, replay)) = &verification {
                if chain.is_valid() {
                    println!("{} Chain: {} blocks, hash links intact", "✓".green().bold(), chain.block_count);
                } else {
                    println!("{} Chain: {} violation(s)", "✗".red().bold(), chain.violations.len());
                    for v in &chain.violations {
                        println!("    height {}: {:?}: {}", v.height, v.kind, v.description);
                    }
                }
                if *replay {
                    println!("{} Replay converges with confirmed state", "✓".green().bold());
                } else {
                    println!("{} Replay diverges from confirmed state", "✗".red().bold());
                }
            }
        }
    }

    if failed > 0 {
        bail!("{failed} call(s) returned an unexpected code");
    }
    if let Some((chain, replay)) = verification {
        if !chain.is_valid() || !replay {
            bail!("ledger verification failed");
        }
    }
    Ok(())
}

fn print_outcome(n: usize, outcome: &StepOutcome) {
    let code = outcome.response.code;
    let mark = if !outcome.matches_expectation() {
        "✗".red().bold()
    } else if code == 0 {
        "✓".green().bold()
    } else {
        "✓".yellow().bold()
    };
    let status = if code == 0 {
        "ok".green().to_string()
    } else {
        format!("{code} {}", outcome.response.message).yellow().to_string()
    };
    let method = format!("{:<18}", outcome.method);
    print!("{mark} {n:>3}. {} {status}", method.cyan());
    if let Some(expected) = outcome.expect {
        if !outcome.matches_expectation() {
            print!("  {}", format!("(expected {expected})").red());
        }
    }
    println!();

    let result = &outcome.response.result;
    if !result.is_null() {
        if let Ok(text) = serde_json::to_string(result) {
            println!("       {}", text.dimmed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AssetService {
        AssetService::new(LedgerConfig::default()).unwrap()
    }

    #[test]
    fn demo_scenario_meets_every_expectation() {
        let service = service();
        let steps = demo_scenario("DEMO.COIN", 10_000).unwrap();
        let count = steps.len();
        let outcomes = execute(&service, steps, true);
        assert_eq!(outcomes.len(), count);
        for outcome in &outcomes {
            assert!(outcome.matches_expectation(), "{} -> {:?}", outcome.method, outcome.response);
        }
        assert_eq!(service.ledger().height().unwrap(), 3);
        assert!(service.ledger().verify_chain().unwrap().is_valid());
        assert!(service.ledger().verify_replay().unwrap());
    }

    #[test]
    fn demo_ends_with_empty_address_and_spent_asset() {
        let service = service();
        let outcomes = execute(&service, demo_scenario("GOLD", 50).unwrap(), true);
        let address_view = &outcomes[outcomes.len() - 2];
        assert_eq!(address_view.method, "get_addressasset");
        assert_eq!(address_view.response.result, json!([]));
        let record = &outcomes[outcomes.len() - 1].response.result[0];
        assert_eq!(record["status"], "spent");
    }

    #[test]
    fn demo_rejects_tiny_supply() {
        assert!(demo_scenario("GOLD", 1).is_err());
        assert!(demo_scenario("GOLD", u64::MAX).is_err());
    }

    #[test]
    fn step_strips_expect() {
        let step = Step::from_value(json!({ "method": "mining", "expect": 0 })).unwrap();
        assert_eq!(step.expect, Some(0));
        assert!(step.call.get("expect").is_none());
        assert_eq!(step.method(), "mining");
    }

    #[test]
    fn step_rejects_non_object() {
        assert!(Step::from_value(json!(42)).is_err());
        assert!(Step::from_value(json!({ "method": "mining", "expect": "zero" })).is_err());
    }

    #[test]
    fn parse_scenario_requires_array() {
        assert!(parse_scenario(r#"{"method":"mining"}"#).is_err());
        assert!(parse_scenario("not json").is_err());
        let steps = parse_scenario(r#"[{"method":"mining"},{"method":"get_asset","expect":0}]"#).unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].expect, None);
    }

    #[test]
    fn fail_fast_stops_at_first_mismatch() {
        let service = service();
        let steps = parse_scenario(
            r#"[
                {"method":"new_account","account":"alice"},
                {"method":"issue_asset","account":"alice","symbol":"NOPE","quantity":1,"expect":0},
                {"method":"mining"}
            ]"#,
        )
        .unwrap();
        let outcomes = execute(&service, steps, true);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[1].response.code, 5101);
        assert!(!outcomes[1].matches_expectation());
    }

    #[test]
    fn malformed_call_is_invalid_argument() {
        let service = service();
        let outcomes = execute(&service, parse_scenario(r#"[{"method":"teleport"}]"#).unwrap(), false);
        assert_eq!(outcomes[0].response.code, 1021);
        assert_eq!(outcomes[0].method, "teleport");
    }

    #[test]
    fn config_loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.toml");
        std::fs::write(&path, "node_id = 7\nmax_pending = 3\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.node_id, 7);
        assert_eq!(config.max_pending, 3);
        assert!(load_config(Some(&dir.path().join("missing.toml"))).is_err());
        assert_eq!(load_config(None).unwrap().max_pending, LedgerConfig::default().max_pending);
    }
}
