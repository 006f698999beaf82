/*!
 Errors that can happen while decoding and encoding object records.
*/

pub mod cursor;
pub mod record;
