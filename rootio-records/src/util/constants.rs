/*!
 Bit masks and tags of the object record wire format.
*/

/// Set on a 4-byte count to mark it as a byte count rather than a tag or version
pub const K_BYTE_COUNT_MASK: u32 = 0x4000_0000;
/// Set on a 2-byte version when it is actually the high half of a byte count
pub const K_BYTE_COUNT_V_MASK: u16 = 0x4000;
/// Set on a record version when its members are streamed memberwise
pub const K_STREAMED_MEMBERWISE: u16 = 0x4000;
/// Introduces a class name that has not been seen before in this buffer
pub const K_NEW_CLASS_TAG: u32 = 0xFFFF_FFFF;
/// Set on a tag that refers back to an already-seen class
pub const K_CLASS_MASK: u32 = 0x8000_0000;
/// Offset added to buffer positions when they are used as reference keys
pub const K_MAP_OFFSET: i64 = 2;

/// Object-identity bit: the object was allocated on the heap
pub const K_IS_ON_HEAP: u32 = 0x0100_0000;
/// Object-identity bit: the object has not been deleted
pub const K_NOT_DELETED: u32 = 0x0200_0000;
/// Object-identity bit: the object is referenced, so a process id follows its bits
pub const K_IS_REFERENCED: u32 = 1 << 4;
