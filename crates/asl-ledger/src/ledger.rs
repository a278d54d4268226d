use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use asl_gate::{Action, GateContext, Intent, IntentGate, PendingSummary, Wallet};
use asl_registry::{Asset, AssetCert, AssetFilter, AssetReader, CertKind};
use asl_store::{BalanceReader, Origin};
use asl_types::{AccountName, Address, DecimalNumber, ErrorKind, Height, IntentId, Quantity, Symbol};

use crate::block::{Block, CommittedIntent, LocalOp, RejectedIntent};
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::query::{AssetQuery, AssetView};
use crate::replay::{ReplayEngine, ReplayResult};
use crate::state::LedgerSnapshot;
use crate::validation::{ChainReport, ChainValidator};

/// An accepted intent waiting for the next confirmation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingIntent {
    /// Submission order, unique for the ledger's lifetime.
    pub seq: u64,
    pub intent: Intent,
    /// Confirmed height at the time of submission.
    pub submitted_at: Height,
}

#[derive(Default)]
struct PendingQueue {
    intents: Vec<PendingIntent>,
    journal: Vec<LocalOp>,
    next_seq: u64,
}

impl PendingQueue {
    fn summary(&self) -> PendingSummary {
        PendingSummary::from_actions(self.intents.iter().map(|p| &p.intent.action))
    }
}

struct LedgerState {
    confirmed: LedgerSnapshot,
    blocks: Vec<Block>,
}

/// The asset ledger: validated submission, pending queue, and confirmations.
///
/// Submission may happen concurrently from many callers. A confirmation
/// holds the confirmation mutex and the state write lock for the whole
/// batch, so no two confirmations overlap and readers never observe a
/// half-applied block. Locks are always taken in the order state, queue.
pub struct AssetLedger {
    config: LedgerConfig,
    gate: IntentGate,
    wallet: Arc<dyn Wallet>,
    state: RwLock<LedgerState>,
    queue: Mutex<PendingQueue>,
    confirm_lock: Mutex<()>,
    height_tx: watch::Sender<Height>,
}

impl AssetLedger {
    pub fn new(config: LedgerConfig, wallet: Arc<dyn Wallet>) -> Result<Self, LedgerError> {
        config.validate()?;
        let gate = IntentGate::with_default_stages(config.gate.clone());
        let (height_tx, _) = watch::channel(0);
        info!(node_id = config.node_id, stages = ?gate.stage_names(), "asset ledger started");
        Ok(Self {
            config,
            gate,
            wallet,
            state: RwLock::new(LedgerState {
                confirmed: LedgerSnapshot::default(),
                blocks: Vec::new(),
            }),
            queue: Mutex::new(PendingQueue::default()),
            confirm_lock: Mutex::new(()),
            height_tx,
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn wallet(&self) -> &dyn Wallet {
        self.wallet.as_ref()
    }

    // -----------------------------------------------------------------------
    // Submission
    // -----------------------------------------------------------------------

    /// Validate an intent and accept it.
    ///
    /// Creation takes effect immediately; every other intent is queued for
    /// the next confirmation. A rejected intent changes nothing.
    pub fn submit(&self, intent: Intent) -> Result<IntentId, LedgerError> {
        if !intent.action.is_chain_action() {
            return self.submit_local(intent);
        }

        let state = self.read_state()?;
        let mut queue = self.lock_queue()?;
        if queue.intents.len() >= self.config.max_pending {
            return Err(LedgerError::QueueFull {
                max: self.config.max_pending,
            });
        }

        let pending = queue.summary();
        let context = GateContext::new(
            &state.confirmed.registry,
            &state.confirmed.store,
            self.wallet.as_ref(),
            &pending,
            state.confirmed.height + 1,
        );
        if let Err(err) = self.gate.check(&intent, &context) {
            debug!(intent = %intent.id, kind = %intent.kind(), error = %err, "submission rejected");
            return Err(err.into());
        }

        let id = intent.id;
        let seq = queue.next_seq;
        queue.next_seq += 1;
        info!(intent = %id, seq, kind = %intent.kind(), actor = %intent.actor, symbol = %intent.action.symbol(), "intent accepted");
        queue.intents.push(PendingIntent {
            seq,
            intent,
            submitted_at: state.confirmed.height,
        });
        Ok(id)
    }

    fn submit_local(&self, intent: Intent) -> Result<IntentId, LedgerError> {
        let mut state = self.write_state()?;
        let mut queue = self.lock_queue()?;

        let pending = queue.summary();
        let context = GateContext::new(
            &state.confirmed.registry,
            &state.confirmed.store,
            self.wallet.as_ref(),
            &pending,
            state.confirmed.height + 1,
        );
        if let Err(err) = self.gate.check(&intent, &context) {
            debug!(intent = %intent.id, kind = %intent.kind(), error = %err, "submission rejected");
            return Err(err.into());
        }

        let id = intent.id;
        let op = LocalOp::Created { intent };
        state.confirmed.apply_local(&op)?;
        queue.journal.push(op);
        info!(intent = %id, "asset created");
        Ok(id)
    }

    pub fn create_asset(
        &self,
        actor: &AccountName,
        symbol: Symbol,
        decimal_number: DecimalNumber,
        description: impl Into<String>,
    ) -> Result<IntentId, LedgerError> {
        self.submit(Intent::new(
            actor.clone(),
            Action::Create {
                symbol,
                decimal_number,
                description: description.into(),
            },
        ))
    }

    pub fn issue_asset(
        &self,
        actor: &AccountName,
        symbol: Symbol,
        to: Address,
        quantity: Quantity,
    ) -> Result<IntentId, LedgerError> {
        self.submit(Intent::new(
            actor.clone(),
            Action::Issue {
                symbol,
                to,
                quantity,
            },
        ))
    }

    pub fn send_asset(
        &self,
        actor: &AccountName,
        from: Address,
        to: Address,
        symbol: Symbol,
        quantity: Quantity,
    ) -> Result<IntentId, LedgerError> {
        self.submit(Intent::new(
            actor.clone(),
            Action::Send {
                from,
                to,
                symbol,
                quantity,
            },
        ))
    }

    /// Transfer out of an address the actor holds a spend grant for.
    pub fn send_asset_from(
        &self,
        actor: &AccountName,
        from: Address,
        to: Address,
        symbol: Symbol,
        quantity: Quantity,
    ) -> Result<IntentId, LedgerError> {
        self.submit(Intent::new(
            actor.clone(),
            Action::SendFrom {
                from,
                to,
                symbol,
                quantity,
            },
        ))
    }

    pub fn burn_asset(
        &self,
        actor: &AccountName,
        owner: Address,
        symbol: Symbol,
        quantity: Quantity,
    ) -> Result<IntentId, LedgerError> {
        self.submit(Intent::new(
            actor.clone(),
            Action::Burn {
                owner,
                symbol,
                quantity,
            },
        ))
    }

    /// Remove an unissued asset created by `actor`.
    pub fn delete_local_asset(
        &self,
        actor: &AccountName,
        symbol: &Symbol,
    ) -> Result<Asset, LedgerError> {
        let mut state = self.write_state()?;
        let mut queue = self.lock_queue()?;

        if queue.summary().is_issue_pending(symbol) {
            return Err(LedgerError::Rejected {
                kind: ErrorKind::AlreadyIssued,
                reason: format!("asset '{symbol}' has an issue awaiting confirmation"),
            });
        }

        let asset = state.confirmed.registry.lookup(symbol)?;
        let op = LocalOp::Deleted {
            actor: actor.clone(),
            symbol: symbol.clone(),
        };
        state.confirmed.apply_local(&op)?;
        queue.journal.push(op);
        info!(%symbol, %actor, "unissued asset deleted");
        Ok(asset)
    }

    /// Hand the `kind` cert for `symbol` to the account owning `to`.
    ///
    /// Like creation, this is a registry operation: it takes effect at once
    /// and is sealed into the next block.
    pub fn issue_cert(
        &self,
        actor: &AccountName,
        symbol: Symbol,
        to: Address,
        kind: CertKind,
    ) -> Result<AssetCert, LedgerError> {
        let owner = self.wallet.owner_of(&to).ok_or_else(|| LedgerError::Rejected {
            kind: ErrorKind::InvalidArgument,
            reason: format!("address {to} does not belong to any account"),
        })?;

        let mut state = self.write_state()?;
        let mut queue = self.lock_queue()?;
        let op = LocalOp::CertIssued {
            actor: actor.clone(),
            symbol: symbol.clone(),
            kind,
            owner,
            address: to,
        };
        state.confirmed.apply_local(&op)?;
        queue.journal.push(op);
        let cert = state
            .confirmed
            .registry
            .cert(kind, &symbol)
            .cloned()
            .ok_or_else(|| LedgerError::IntegrityViolation {
                height: state.confirmed.height,
                reason: format!("{kind} cert '{symbol}' missing after issue"),
            })?;
        info!(%symbol, %kind, %actor, owner = %cert.owner, "cert issued");
        Ok(cert)
    }

    /// Drop a pending intent before it is confirmed.
    pub fn withdraw(&self, id: &IntentId, actor: &AccountName) -> Result<Intent, LedgerError> {
        let mut queue = self.lock_queue()?;
        let position = queue
            .intents
            .iter()
            .position(|p| &p.intent.id == id)
            .ok_or(LedgerError::IntentNotFound(*id))?;
        if &queue.intents[position].intent.actor != actor {
            return Err(LedgerError::NotIntentOwner {
                id: *id,
                caller: actor.clone(),
            });
        }
        let removed = queue.intents.remove(position);
        info!(intent = %id, %actor, "pending intent withdrawn");
        Ok(removed.intent)
    }

    pub fn pending(&self) -> Result<Vec<PendingIntent>, LedgerError> {
        Ok(self.lock_queue()?.intents.clone())
    }

    // -----------------------------------------------------------------------
    // Confirmation
    // -----------------------------------------------------------------------

    /// Commit every pending intent as one block and advance the height.
    ///
    /// Each intent is re-validated against the state as mutated by the
    /// intents before it. Failures are recorded in the block and do not
    /// affect the others. Value received in this block is not spendable
    /// inside it; change is.
    pub fn confirm(&self) -> Result<Block, LedgerError> {
        let _confirming = self
            .confirm_lock
            .lock()
            .map_err(|_| LedgerError::LockPoisoned("confirmation"))?;
        let mut state = self.write_state()?;
        let (intents, local) = {
            let mut queue = self.lock_queue()?;
            (
                std::mem::take(&mut queue.intents),
                std::mem::take(&mut queue.journal),
            )
        };

        let height = state.confirmed.height + 1;
        let mut working = state.confirmed.clone();
        let no_pending = PendingSummary::new();
        let mut committed = Vec::new();
        let mut rejected = Vec::new();

        for PendingIntent { seq, intent, .. } in intents {
            let verdict = {
                let context = GateContext::new(
                    &working.registry,
                    &working.store,
                    self.wallet.as_ref(),
                    &no_pending,
                    height,
                );
                self.gate.check(&intent, &context)
            };
            let index = committed.len() as u32;
            let outcome = verdict
                .map_err(LedgerError::from)
                .and_then(|()| working.apply_intent(Origin::new(height, index), &intent));

            match outcome {
                Ok(()) => committed.push(CommittedIntent { index, intent }),
                Err(err) => {
                    warn!(intent = %intent.id, seq, height, code = err.code(), error = %err, "intent rejected at confirmation");
                    rejected.push(RejectedIntent {
                        kind: err.kind(),
                        reason: err.to_string(),
                        intent,
                    });
                }
            }
        }

        let block = Block::seal(
            state.blocks.last(),
            self.config.node_id,
            local,
            committed,
            rejected,
        )?;
        working.height = height;
        state.confirmed = working;
        state.blocks.push(block.clone());
        drop(state);

        info!(
            height,
            committed = block.committed.len(),
            rejected = block.rejected.len(),
            local = block.local.len(),
            hash = %block.hash_hex(),
            "block confirmed"
        );
        self.height_tx.send_replace(height);
        Ok(block)
    }

    /// Confirmed height; zero before the first confirmation.
    pub fn height(&self) -> Result<Height, LedgerError> {
        Ok(self.read_state()?.confirmed.height)
    }

    /// Receiver notified with the new height after every confirmation.
    pub fn subscribe_height(&self) -> watch::Receiver<Height> {
        self.height_tx.subscribe()
    }

    // -----------------------------------------------------------------------
    // Chain and state inspection
    // -----------------------------------------------------------------------

    pub fn blocks(&self) -> Result<Vec<Block>, LedgerError> {
        Ok(self.read_state()?.blocks.clone())
    }

    pub fn block(&self, height: Height) -> Result<Option<Block>, LedgerError> {
        let state = self.read_state()?;
        Ok(height
            .checked_sub(1)
            .and_then(|i| state.blocks.get(i as usize))
            .cloned())
    }

    pub fn verify_chain(&self) -> Result<ChainReport, LedgerError> {
        Ok(ChainValidator::validate(&self.read_state()?.blocks))
    }

    /// Rebuild confirmed state from the blocks plus unsealed registry operations.
    pub fn replay(&self) -> Result<ReplayResult, LedgerError> {
        let state = self.read_state()?;
        let queue = self.lock_queue()?;
        let mut result = ReplayEngine::replay_from_genesis(&state.blocks)?;
        ReplayEngine::apply_journal(&mut result.state, &queue.journal)?;
        Ok(result)
    }

    /// Whether replay reproduces the live state byte for byte.
    pub fn verify_replay(&self) -> Result<bool, LedgerError> {
        let replayed = self.replay()?.state.to_bytes()?;
        Ok(replayed == self.snapshot()?.to_bytes()?)
    }

    pub fn snapshot(&self) -> Result<LedgerSnapshot, LedgerError> {
        Ok(self.read_state()?.confirmed.clone())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Unissued assets created by `account` plus its aggregated holdings.
    pub fn account_assets(
        &self,
        account: &AccountName,
        filter: &AssetFilter,
    ) -> Result<Vec<AssetView>, LedgerError> {
        let addresses = self.wallet.addresses(account);
        let state = self.read_state()?;
        let query = AssetQuery::new(&state.confirmed.registry, &state.confirmed.store);
        Ok(query.account_assets(account, &addresses, filter))
    }

    /// Raw live entries at `address`.
    pub fn address_assets(
        &self,
        address: &Address,
        filter: &AssetFilter,
    ) -> Result<Vec<AssetView>, LedgerError> {
        let state = self.read_state()?;
        let query = AssetQuery::new(&state.confirmed.registry, &state.confirmed.store);
        Ok(query.address_assets(address, filter))
    }

    pub fn asset_records(&self, filter: &AssetFilter) -> Result<Vec<AssetView>, LedgerError> {
        let state = self.read_state()?;
        let query = AssetQuery::new(&state.confirmed.registry, &state.confirmed.store);
        Ok(query.asset_records(filter))
    }

    /// Certs held by `owner`, or every cert.
    pub fn certs(&self, owner: Option<&AccountName>) -> Result<Vec<AssetCert>, LedgerError> {
        let state = self.read_state()?;
        Ok(state
            .confirmed
            .registry
            .certs()
            .into_iter()
            .filter(|cert| owner.map_or(true, |o| &cert.owner == o))
            .collect())
    }

    pub fn asset(&self, symbol: &Symbol) -> Result<Asset, LedgerError> {
        Ok(self.read_state()?.confirmed.registry.lookup(symbol)?)
    }

    pub fn balance(&self, address: &Address, symbol: &Symbol) -> Result<Quantity, LedgerError> {
        Ok(self.read_state()?.confirmed.store.balance(address, symbol))
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, LedgerState>, LedgerError> {
        self.state
            .read()
            .map_err(|_| LedgerError::LockPoisoned("ledger state"))
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, LedgerState>, LedgerError> {
        self.state
            .write()
            .map_err(|_| LedgerError::LockPoisoned("ledger state"))
    }

    fn lock_queue(&self) -> Result<MutexGuard<'_, PendingQueue>, LedgerError> {
        self.queue
            .lock()
            .map_err(|_| LedgerError::LockPoisoned("pending queue"))
    }
}
