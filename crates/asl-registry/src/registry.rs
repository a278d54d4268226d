use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use asl_types::{AccountName, Address, DecimalNumber, Height, Quantity, Symbol};

use crate::asset::{Asset, AssetFilter, AssetId, Issuance};
use crate::cert::{AssetCert, CertKind};
use crate::error::RegistryError;

/// Read boundary for asset definitions.
pub trait AssetReader {
    fn get(&self, symbol: &Symbol) -> Option<&Asset>;

    /// All assets matching `filter`, in symbol order.
    fn assets(&self, filter: &AssetFilter) -> Vec<Asset>;

    fn cert(&self, kind: CertKind, symbol: &Symbol) -> Option<&AssetCert>;

    /// Every cert, domain certs first, each kind in symbol order.
    fn certs(&self) -> Vec<AssetCert>;

    fn lookup(&self, symbol: &Symbol) -> Result<Asset, RegistryError> {
        self.get(symbol)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(symbol.clone()))
    }

    fn contains(&self, symbol: &Symbol) -> bool {
        self.get(symbol).is_some()
    }

    /// Check that `caller` may register `symbol`.
    ///
    /// A dotted symbol needs the naming cert for it when one exists, and
    /// otherwise must not fall under a domain held by another account.
    fn check_create(&self, symbol: &Symbol, caller: &AccountName) -> Result<(), RegistryError> {
        if self.contains(symbol) {
            return Err(RegistryError::DuplicateSymbol(symbol.clone()));
        }
        if !symbol.is_dotted() {
            return Ok(());
        }
        let (cert, kind) = match self.cert(CertKind::DomainNaming, symbol) {
            Some(naming) => (naming, CertKind::DomainNaming),
            None => match self.cert(CertKind::Domain, &symbol.domain()) {
                Some(domain) => (domain, CertKind::Domain),
                None => return Ok(()),
            },
        };
        if &cert.owner != caller {
            return Err(RegistryError::CertRequired {
                symbol: symbol.clone(),
                cert: cert.symbol.clone(),
                kind,
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    /// Check that `caller` may issue a `kind` cert for `symbol`; returns
    /// the domain cert that authorizes it.
    fn check_issue_cert(
        &self,
        symbol: &Symbol,
        caller: &AccountName,
        kind: CertKind,
    ) -> Result<&AssetCert, RegistryError> {
        if kind != CertKind::DomainNaming {
            return Err(RegistryError::UnissuableCert(kind));
        }
        if !symbol.is_dotted() {
            return Err(RegistryError::UndottedCertSymbol(symbol.clone()));
        }
        if self.cert(CertKind::DomainNaming, symbol).is_some() {
            return Err(RegistryError::CertExists {
                symbol: symbol.clone(),
                kind,
            });
        }
        let domain = symbol.domain();
        match self.cert(CertKind::Domain, &domain) {
            Some(cert) if &cert.owner == caller => Ok(cert),
            _ => Err(RegistryError::CertRequired {
                symbol: symbol.clone(),
                cert: domain,
                kind: CertKind::Domain,
                caller: caller.clone(),
            }),
        }
    }

    /// Check that `caller` may issue `symbol` right now.
    fn check_issue(&self, symbol: &Symbol, caller: &AccountName) -> Result<&Asset, RegistryError> {
        let asset = self
            .get(symbol)
            .ok_or_else(|| RegistryError::NotFound(symbol.clone()))?;
        if &asset.issuer != caller {
            return Err(RegistryError::NotOwner {
                symbol: symbol.clone(),
                caller: caller.clone(),
            });
        }
        if asset.is_issued() {
            return Err(RegistryError::AlreadyIssued(symbol.clone()));
        }
        Ok(asset)
    }

    /// Check that `symbol` refers to an issued asset that can be moved.
    fn check_issued(&self, symbol: &Symbol) -> Result<&Asset, RegistryError> {
        match self.get(symbol) {
            Some(asset) if asset.is_issued() => Ok(asset),
            _ => Err(RegistryError::NotFound(symbol.clone())),
        }
    }
}

/// Map-backed registry.
///
/// Holds plain data so the ledger can snapshot, compare, and replay it.
/// Mutation requires `&mut self`; the owning ledger serializes access.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryRegistry {
    assets: BTreeMap<Symbol, Asset>,
    next_id: u64,
    #[serde(default)]
    domain_certs: BTreeMap<Symbol, AssetCert>,
    #[serde(default)]
    naming_certs: BTreeMap<Symbol, AssetCert>,
}

impl InMemoryRegistry {
    /// Maximum description length in bytes.
    pub const MAX_DESCRIPTION_LEN: usize = 64;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Register a new, unissued asset.
    pub fn create(
        &mut self,
        symbol: Symbol,
        issuer: AccountName,
        decimal_number: DecimalNumber,
        description: impl Into<String>,
    ) -> Result<AssetId, RegistryError> {
        let description = description.into();
        if description.len() > Self::MAX_DESCRIPTION_LEN {
            return Err(RegistryError::DescriptionTooLong {
                max: Self::MAX_DESCRIPTION_LEN,
            });
        }
        self.check_create(&symbol, &issuer)?;

        let id = AssetId(self.next_id);
        self.next_id += 1;
        debug!(%symbol, %issuer, %id, "asset created");
        self.assets.insert(
            symbol.clone(),
            Asset {
                id,
                symbol,
                issuer,
                decimal_number,
                description,
                issuance: None,
                burned: Quantity::ZERO,
            },
        );
        Ok(id)
    }

    /// Issue the full supply of an asset. Succeeds at most once per asset.
    ///
    /// The first issuance under a domain grants the issuer its domain cert,
    /// held at `target`.
    pub fn issue(
        &mut self,
        symbol: &Symbol,
        issuer: &AccountName,
        target: Address,
        quantity: Quantity,
        height: Height,
    ) -> Result<(), RegistryError> {
        self.check_issue(symbol, issuer)?;
        if quantity.is_zero() {
            return Err(RegistryError::ZeroQuantity(symbol.clone()));
        }
        let asset = self
            .assets
            .get_mut(symbol)
            .ok_or_else(|| RegistryError::NotFound(symbol.clone()))?;
        debug!(%symbol, address = %target, %quantity, height, "asset issued");
        asset.issuance = Some(Issuance {
            address: target.clone(),
            supply: quantity,
            height,
        });

        let domain = symbol.domain();
        if !self.domain_certs.contains_key(&domain) {
            debug!(%domain, owner = %issuer, "domain cert granted");
            self.domain_certs.insert(
                domain.clone(),
                AssetCert {
                    symbol: domain,
                    owner: issuer.clone(),
                    address: target,
                    kind: CertKind::Domain,
                },
            );
        }
        Ok(())
    }

    /// Destroy `quantity` of circulating supply.
    pub fn burn(&mut self, symbol: &Symbol, quantity: Quantity) -> Result<(), RegistryError> {
        let asset = match self.assets.get_mut(symbol) {
            Some(asset) if asset.is_issued() => asset,
            _ => return Err(RegistryError::NotFound(symbol.clone())),
        };
        let available = asset.total_supply();
        if quantity > available {
            return Err(RegistryError::SupplyExceeded {
                symbol: symbol.clone(),
                requested: quantity,
                available,
            });
        }
        // `quantity <= total_supply <= issued - burned`, so this cannot overflow.
        asset.burned = Quantity::new(asset.burned.raw() + quantity.raw());
        debug!(%symbol, %quantity, remaining = %asset.total_supply(), "supply burned");
        Ok(())
    }

    /// Hand `owner` the `kind` cert for `symbol`, authorized by `caller`'s
    /// domain cert.
    pub fn issue_cert(
        &mut self,
        symbol: Symbol,
        caller: &AccountName,
        kind: CertKind,
        owner: AccountName,
        address: Address,
    ) -> Result<AssetCert, RegistryError> {
        self.check_issue_cert(&symbol, caller, kind)?;
        let cert = AssetCert {
            symbol: symbol.clone(),
            owner,
            address,
            kind,
        };
        debug!(%symbol, %kind, owner = %cert.owner, "cert issued");
        self.naming_certs.insert(symbol, cert.clone());
        Ok(cert)
    }

    /// Remove an unissued asset definition owned by `issuer`.
    pub fn delete_local(
        &mut self,
        symbol: &Symbol,
        issuer: &AccountName,
    ) -> Result<Asset, RegistryError> {
        self.check_issue(symbol, issuer)?;
        let removed = self
            .assets
            .remove(symbol)
            .ok_or_else(|| RegistryError::NotFound(symbol.clone()))?;
        debug!(%symbol, %issuer, "unissued asset deleted");
        Ok(removed)
    }
}

impl AssetReader for InMemoryRegistry {
    fn get(&self, symbol: &Symbol) -> Option<&Asset> {
        self.assets.get(symbol)
    }

    fn assets(&self, filter: &AssetFilter) -> Vec<Asset> {
        self.assets
            .values()
            .filter(|asset| filter.matches_asset(asset))
            .cloned()
            .collect()
    }

    fn cert(&self, kind: CertKind, symbol: &Symbol) -> Option<&AssetCert> {
        match kind {
            CertKind::Domain => self.domain_certs.get(symbol),
            CertKind::DomainNaming => self.naming_certs.get(symbol),
        }
    }

    fn certs(&self) -> Vec<AssetCert> {
        self.domain_certs
            .values()
            .chain(self.naming_certs.values())
            .cloned()
            .collect()
    }
}
