use crate::error::Result;
use crate::varint::VarIntView;

// boost::hash_combine's magic constant, kept verbatim so bucket
// routing agrees bit-for-bit with anything else computing the same hash.
const HASH_COMBINE_MAGIC: u64 = 0x9e3779b9;

pub fn hash_combine(seed: u64, x: u64) -> u64 {
    seed ^ (x
        .wrapping_add(HASH_COMBINE_MAGIC)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermRecord<Id> {
    pub id: Id,
    pub doc_offset: u64,
    pub doc_freq: u64,
}

pub trait TermKind {
    type Id: Clone + Ord + std::fmt::Debug;
    // previous id, from which deltas / shared prefixes are computed
    type State: Default;

    fn decode_index_id(view: &mut VarIntView, state: &mut Self::State) -> Result<Self::Id>;
    fn hash_id(id: &Self::Id) -> u64;
    fn encode_split_id(id: &Self::Id, out: &mut Vec<u8>);
    fn decode_split_id(view: &mut VarIntView) -> Result<Self::Id>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IntTerm;

impl TermKind for IntTerm {
    type Id = i64;
    type State = i64;

    fn decode_index_id(view: &mut VarIntView, prev_id: &mut i64) -> Result<i64> {
        let (delta, _) = view.read_uvarint()?;
        let id = prev_id.wrapping_add(delta as i64);
        *prev_id = id;
        Ok(id)
    }

    fn hash_id(id: &i64) -> u64 {
        hash_combine(0, *id as u64)
    }

    fn encode_split_id(id: &i64, out: &mut Vec<u8>) {
        write_uvarint(*id as u64, out);
    }

    fn decode_split_id(view: &mut VarIntView) -> Result<i64> {
        let (v, _) = view.read_uvarint()?;
        Ok(v as i64)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringTerm;

impl TermKind for StringTerm {
    type Id = Vec<u8>;
    type State = Vec<u8>;

    fn decode_index_id(view: &mut VarIntView, prev: &mut Vec<u8>) -> Result<Vec<u8>> {
        let (prefix_len, _) = view.read_uvarint()?;
        let (suffix_len, _) = view.read_uvarint()?;
        let suffix = view.read_bytes(suffix_len as usize)?;
        prev.truncate(prefix_len as usize);
        prev.extend_from_slice(suffix);
        Ok(prev.clone())
    }

    fn hash_id(id: &Vec<u8>) -> u64 {
        let mut seed = 0u64;
        for &b in id {
            seed = hash_combine(seed, b as u64);
        }
        seed
    }

    fn encode_split_id(id: &Vec<u8>, out: &mut Vec<u8>) {
        write_uvarint(id.len() as u64, out);
        out.extend_from_slice(id);
    }

    fn decode_split_id(view: &mut VarIntView) -> Result<Vec<u8>> {
        let (len, _) = view.read_uvarint()?;
        Ok(view.read_bytes(len as usize)?.to_vec())
    }
}

pub fn write_uvarint(mut v: u64, out: &mut Vec<u8>) {
    loop {
        let mut byte = (v & 0x7f) as u8;
        v >>= 7;
        if v != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if v == 0 {
            break;
        }
    }
}
