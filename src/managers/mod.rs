// TabSort state managers
// Managers own mutable state: the tab record table, the tracked window, and the shared container.

pub mod background_state;
pub mod record_store;
pub mod window_tracker;
