//! Simulation constants - all tunable values in one place

// Attack sequence
/// Seconds spent in the aiming state before a shot is released
pub const AIM_TIME_SECS: f32 = 0.5;
/// Detectability multiplier while a unit is mid attack or reload
pub const ATTACK_DETECTION_PENALTY: f32 = 2.0;

// Strategic points
/// Default seconds of sole occupation required to flip a point
pub const DEFAULT_CAPTURE_TIME_SECS: f32 = 15.0;

// AI production
/// Elapsed-time threshold under which the scripted build order applies
pub const BUILD_ORDER_PHASE_SECS: f32 = 300.0;

// Hex pixel layout (pointy-top)
pub const SQRT_3: f32 = 1.732_050_8;
