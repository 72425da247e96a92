#![doc = include_str!("../README.md")]

// Public modules
mod common;
mod error;
mod leafset;

pub use crate::common::{Distance, Id, Node, Side, ID_SIZE};
pub use crate::error::{Error, Result};
pub use crate::leafset::{Info, LeafSet, NodePosition};
