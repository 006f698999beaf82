/*!
 Record kinds and the machinery that reads and writes them.

 - [`record`]: the [`Record`](record::Record) contract and the generic read routine
 - [`object`], [`named`], [`list`]: the built-in record kinds
 - [`registry`]: class name to record kind table
 - [`any`]: polymorphic dispatch by the tag in the stream
*/

pub mod any;
pub mod list;
pub mod named;
pub mod object;
pub mod record;
pub mod registry;
mod tests;
