// handlers/mod.rs - Two handler tiers
//
// Public (no token) and protected (x-auth-token resolved by the access guard).
// Protected handlers receive the caller as `Extension<User>`.
pub mod protected;
pub mod public;
