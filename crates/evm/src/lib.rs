// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod balances;
mod chain_reader;
mod classifier;
pub mod contracts;
pub mod helpers;
mod token;

pub use balances::*;
pub use chain_reader::*;
pub use classifier::*;
pub use token::*;
