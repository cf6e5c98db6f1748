
/// Search engine, signal profiles, and the per-PRN task group
pub mod acquisition;

/// Capture conditioning ahead of the search
pub mod front_end;
