//! Built-in gate stages.

pub mod authority;
pub mod funds;
pub mod registry;
pub mod structure;

pub use authority::AuthorityStage;
pub use funds::FundsStage;
pub use registry::RegistryStage;
pub use structure::StructureStage;
