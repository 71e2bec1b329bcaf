// Orderdesk library
// In-memory order service plus the AI changelog pipeline shared by the
// workspace binaries.

pub mod changelog;
#[cfg(feature = "server")]
pub mod gateway;
pub mod llm;
pub mod orders;
