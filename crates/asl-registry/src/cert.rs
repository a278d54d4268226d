use std::fmt;

use serde::{Deserialize, Serialize};

use asl_types::{AccountName, Address, Symbol};

/// What an asset cert entitles its owner to.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CertKind {
    /// Control of a symbol domain (`GOLD` for `GOLD.*`). Granted to the
    /// issuer of the first asset issued under the domain.
    Domain,
    /// The right to create one dotted symbol under a domain. Issued by the
    /// holder of the domain cert.
    #[default]
    DomainNaming,
}

impl CertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::DomainNaming => "domain_naming",
        }
    }
}

impl fmt::Display for CertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cert held by an account at one of its addresses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCert {
    /// The domain for [`CertKind::Domain`], the full symbol otherwise.
    pub symbol: Symbol,
    pub owner: AccountName,
    pub address: Address,
    pub kind: CertKind,
}
