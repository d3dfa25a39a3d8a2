// Centralized ingestion limits to harden against untrusted input (JSON)

// Network size caps
pub const MAX_NODES: usize = 200_000;
pub const MAX_REACTIONS: usize = 300_000;
pub const MAX_COMPARTMENTS: usize = 10_000;
pub const MAX_PARTICIPANTS: usize = 1_000; // reactants or products of one reaction
pub const MAX_ID_LEN: usize = 1_024;

// Numeric bounds
pub const COORD_MIN: f64 = -1e12;         // also the lower limit for negative placement
pub const COORD_MAX: f64 =  1e12;
pub const SIZE_MAX: f64 = 1e7;

#[inline]
pub fn in_coord_bounds(x: f64) -> bool { x.is_finite() && x >= COORD_MIN && x <= COORD_MAX }

#[inline]
pub fn in_size_bounds(w: f64) -> bool { w.is_finite() && w >= 0.0 && w <= SIZE_MAX }
