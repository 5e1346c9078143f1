//! Wire-level types shared between the DreamInk client core and its front ends.

pub mod domain;
pub mod error;
pub mod protocol;
