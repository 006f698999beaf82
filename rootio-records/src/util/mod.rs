/*!
 Byte-level plumbing shared by all record kinds: cursors, headers, wire constants, and
 decode configuration.
*/

pub mod constants;
pub mod context;
pub mod cursor;
pub mod header;
