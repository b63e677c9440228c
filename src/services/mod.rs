// TabSort services
// Engines that derive ordering, poll metrics, move tabs and talk to the UI.

pub mod metrics_poller;
pub mod ordering_engine;
pub mod reconciler;
pub mod settings_engine;
pub mod snapshot_broadcaster;
pub mod tab_mover;
pub mod url_patterns;
pub mod user_action;
