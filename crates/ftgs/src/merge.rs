use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::marker::PhantomData;

use crate::error::{FtgsError, Result};
use crate::packed::PackedTable;
use crate::term::{TermKind, TermRecord};
use crate::varint::VarIntView;

pub struct SplitReader<'a, T: TermKind> {
    view: VarIntView<'a>,
    done: bool,
    _marker: PhantomData<T>,
}

impl<'a, T: TermKind> SplitReader<'a, T> {
    pub fn new(buf: &'a [u8]) -> Self {
        SplitReader {
            view: VarIntView::new(buf),
            done: false,
            _marker: PhantomData,
        }
    }
}

impl<'a, T: TermKind> Iterator for SplitReader<'a, T> {
    type Item = Result<TermRecord<T::Id>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.view.is_at_end() {
            return None;
        }
        let record = (|| {
            let id = T::decode_split_id(&mut self.view)?;
            let (doc_offset, _) = self.view.read_uvarint()?;
            let (doc_freq, _) = self.view.read_uvarint()?;
            Ok(TermRecord {
                id,
                doc_offset,
                doc_freq,
            })
        })();
        if record.is_err() {
            self.done = true;
        }
        Some(record)
    }
}

pub struct MergeInput<'a, 'q, T: TermKind> {
    pub reader: SplitReader<'a, T>,
    pub table: Option<&'q PackedTable>,
    pub shard_index: usize,
}

#[derive(Debug, Clone)]
pub struct MergeRecord<Id> {
    pub shard_index: usize,
    pub record: TermRecord<Id>,
}

struct HeapEntry<Id> {
    id: Id,
    shard_index: usize,
    input_index: usize,
}

impl<Id: PartialEq> PartialEq for HeapEntry<Id> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.shard_index == other.shard_index
    }
}
impl<Id: Eq> Eq for HeapEntry<Id> {}

impl<Id: Ord> PartialOrd for HeapEntry<Id> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<Id: Ord> Ord for HeapEntry<Id> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id
            .cmp(&other.id)
            .then(self.shard_index.cmp(&other.shard_index))
    }
}

// Priority-queue merge across shards; ties broken by ascending shard index.
pub struct MergeIterator<'a, 'q, T: TermKind> {
    inputs: Vec<MergeInput<'a, 'q, T>>,
    pending: Vec<Option<TermRecord<T::Id>>>,
    heap: BinaryHeap<Reverse<HeapEntry<T::Id>>>,
    // A refill error surfaces one call late, after the record it displaced.
    pending_error: Option<FtgsError>,
}

impl<'a, 'q, T: TermKind> MergeIterator<'a, 'q, T> {
    pub fn new(mut inputs: Vec<MergeInput<'a, 'q, T>>) -> Result<Self> {
        let mut pending = Vec::with_capacity(inputs.len());
        let mut heap = BinaryHeap::new();

        for (input_index, input) in inputs.iter_mut().enumerate() {
            match input.reader.next() {
                Some(Ok(record)) => {
                    heap.push(Reverse(HeapEntry {
                        id: record.id.clone(),
                        shard_index: input.shard_index,
                        input_index,
                    }));
                    pending.push(Some(record));
                }
                Some(Err(e)) => return Err(e),
                None => pending.push(None),
            }
        }

        Ok(MergeIterator {
            inputs,
            pending,
            heap,
            pending_error: None,
        })
    }

    pub fn table_for(&self, shard_index: usize) -> Option<&'q PackedTable> {
        self.inputs
            .iter()
            .find(|input| input.shard_index == shard_index)
            .and_then(|input| input.table)
    }
}

impl<'a, 'q, T: TermKind> Iterator for MergeIterator<'a, 'q, T> {
    type Item = Result<MergeRecord<T::Id>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(e) = self.pending_error.take() {
            return Some(Err(e));
        }

        let Reverse(entry) = self.heap.pop()?;
        let input_index = entry.input_index;
        let record = self.pending[input_index]
            .take()
            .expect("heap entry without a matching pending record");
        let shard_index = self.inputs[input_index].shard_index;

        match self.inputs[input_index].reader.next() {
            Some(Ok(next_record)) => {
                self.heap.push(Reverse(HeapEntry {
                    id: next_record.id.clone(),
                    shard_index,
                    input_index,
                }));
                self.pending[input_index] = Some(next_record);
            }
            Some(Err(e)) => self.pending_error = Some(e),
            None => {}
        }

        Some(Ok(MergeRecord {
            shard_index,
            record,
        }))
    }
}
