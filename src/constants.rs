/// Number of evaluation points on a continuous 1D grid.
pub const DEFAULT_GRID_SIZE: usize = 51;
/// Number of evaluation points per continuous axis of a 2D grid.
pub const DEFAULT_PAIR_GRID_SIZE: usize = 21;
/// Quantiles recorded in a continuous feature domain.
pub const DOMAIN_QUANTILES: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];
