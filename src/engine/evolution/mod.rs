// Scout Engine: Evolution API client and filters
//
// Module layout:
//   config       : EvolutionConfig, from_env/from_lookup, validate
//   evolution_api: EvolutionClient (info, state, chats, messages, send, groups)
//   messages     : group-message filter on the sender-key distribution payload
//   groups       : CarpoolKeywords, carpool group classifier

pub mod config;
pub mod evolution_api;
pub mod groups;
pub mod messages;

// ── Re-exports ─────────────────────────────────────────────────────────

pub use crate::atoms::traits::GroupSource;
pub use config::EvolutionConfig;
pub use evolution_api::EvolutionClient;
pub use groups::{carpool_groups, classify_groups, fold, get_carpool_groups, CarpoolKeywords};
pub use messages::{filter_group_messages, group_messages, is_group_message};
