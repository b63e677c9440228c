// TabSort shared type definitions
// Each submodule defines types used across the service.

pub mod errors;
pub mod events;
pub mod messages;
pub mod ordering;
pub mod record;
pub mod settings;
pub mod tab;
