mod error;
mod merge;
mod packed;
mod seq;
mod shard;
mod simd;
mod splitter;
mod term;
mod term_iter;
mod unpacked;
mod varint;

pub use error::{FtgsError, Result};
pub use merge::{MergeInput, MergeIterator, MergeRecord, SplitReader};
pub use packed::{PackedTable, GROUP_SIZE, MAX_BIT_FIELDS, MAX_COLUMNS};
pub use seq::{TermRun, TermSequenceIterator};
pub use shard::ShardHandle;
pub use splitter::Splitter;
pub use term::{hash_combine, write_uvarint, IntTerm, StringTerm, TermKind, TermRecord};
pub use term_iter::TermIterator;
pub use unpacked::UnpackedTable;
pub use varint::VarIntView;
