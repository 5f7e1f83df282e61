// carpool-scout: Evolution API client and carpool group discovery
//
// Layout:
//   atoms  : constants, EvolutionError, gateway record types (pure)
//   engine : Evolution API client, message group filter, group classifier

pub mod atoms;
pub mod engine;

pub use atoms::error::{EvolutionError, EvolutionResult};
pub use atoms::types::{
    Chat, ConnectionState, Group, Message, MessageContent, MessageKind, MessageTimestamp,
    SendReceipt, SenderKeyDistributionMessage, ServiceInfo,
};
pub use engine::evolution::{
    classify_groups, filter_group_messages, get_carpool_groups, CarpoolKeywords, EvolutionClient,
    EvolutionConfig, GroupSource,
};
