/*!
 * Memory Module
 * User-memory access for syscall handlers
 */

pub mod bridge;

// Re-exports
pub use bridge::{user_cstr, user_mut, user_slice, user_slice_mut};
