use std::iter::Peekable;

use crate::error::Result;
use crate::merge::MergeIterator;
use crate::term::TermKind;

#[derive(Debug, Clone)]
pub struct TermRun<Id> {
    pub id: Id,
    // (shard_index, doc_offset, doc_freq), in ascending shard index
    pub contributions: Vec<(usize, u64, u64)>,
}

pub struct TermSequenceIterator<'a, 'q, T: TermKind> {
    inner: Peekable<MergeIterator<'a, 'q, T>>,
}

impl<'a, 'q, T: TermKind> TermSequenceIterator<'a, 'q, T> {
    pub fn new(merge: MergeIterator<'a, 'q, T>) -> Self {
        TermSequenceIterator {
            inner: merge.peekable(),
        }
    }
}

impl<'a, 'q, T: TermKind> Iterator for TermSequenceIterator<'a, 'q, T> {
    type Item = Result<TermRun<T::Id>>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = match self.inner.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e)),
        };

        let id = first.record.id;
        let mut contributions = vec![(first.shard_index, first.record.doc_offset, first.record.doc_freq)];

        loop {
            match self.inner.peek() {
                Some(Ok(record)) if record.record.id == id => {
                    let record = self.inner.next().unwrap().unwrap();
                    contributions.push((record.shard_index, record.record.doc_offset, record.record.doc_freq));
                }
                Some(Ok(_)) => break,
                Some(Err(_)) => {
                    let err = self.inner.next().unwrap();
                    if let Err(e) = err {
                        return Some(Err(e));
                    }
                }
                None => break,
            }
        }

        Some(Ok(TermRun { id, contributions }))
    }
}
