// ── Scout Engine ───────────────────────────────────────────────────────────
// Everything that talks to the gateway, plus the filters applied to what it
// returns.

pub mod evolution;
