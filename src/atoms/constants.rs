// ── Scout Atoms: Constants ─────────────────────────────────────────────────
// Named constants for the crate. Defaults mirror a local Evolution API
// deployment with a single "carpool" instance.

// ── Gateway defaults ───────────────────────────────────────────────────────
pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_INSTANCE: &str = "carpool";
/// Placeholder sent when no API key is configured. The gateway will reject
/// it unless it was deployed with the same key.
pub const PLACEHOLDER_API_KEY: &str = "xyz";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

// ── Environment variables ──────────────────────────────────────────────────
pub const ENV_API_URL: &str = "EVO_URL";
pub const ENV_INSTANCE: &str = "EVO_INSTANCE";
pub const ENV_API_KEY: &str = "AUTHENTICATION_API_KEY";
pub const ENV_TIMEOUT: &str = "EVO_TIMEOUT_SECS";
pub const ENV_CARPOOL_INCLUDE: &str = "CARPOOL_INCLUDE";
pub const ENV_CARPOOL_EXCLUDE: &str = "CARPOOL_EXCLUDE";

// ── Request shaping ────────────────────────────────────────────────────────
pub const API_KEY_HEADER: &str = "apikey";
/// Server-side cap on findMessages results.
pub const FIND_MESSAGES_LIMIT: u32 = 10_000;
/// Gateway error bodies are cut to this many chars before they land in an error.
pub const MAX_ERROR_BODY_CHARS: usize = 500;

// ── Carpool keywords ───────────────────────────────────────────────────────
pub const CARPOOL_INCLUDE_KEYWORDS: &[&str] = &["carona", "rota", "solidaria", "solidária", "vagas"];
pub const CARPOOL_EXCLUDE_KEYWORDS: &[&str] = &["LDO"];
