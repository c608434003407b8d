//! redb table definitions for the charm state store.
//!
//! Each table uses `&str` keys and `&[u8]` values (JSON-serialized).

use redb::TableDefinition;

/// The reconciler flag set, stored under [`FLAGS_KEY`].
pub const FLAGS: TableDefinition<&str, &[u8]> = TableDefinition::new("flags");

/// Charm config applied by the last committed pass, stored under [`APPLIED_CONFIG_KEY`].
pub const CONFIG: TableDefinition<&str, &[u8]> = TableDefinition::new("config");

pub const FLAGS_KEY: &str = "current";
pub const APPLIED_CONFIG_KEY: &str = "applied";
