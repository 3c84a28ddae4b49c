use crate::error::Result;
use crate::term::{TermKind, TermRecord};
use crate::varint::VarIntView;

pub struct TermIterator<'a, T: TermKind> {
    view: VarIntView<'a>,
    id_state: T::State,
    prev_doc_offset: u64,
    done: bool,
}

impl<'a, T: TermKind> TermIterator<'a, T> {
    pub fn new(buf: &'a [u8]) -> Self {
        TermIterator {
            view: VarIntView::new(buf),
            id_state: T::State::default(),
            prev_doc_offset: 0,
            done: false,
        }
    }
}

impl<'a, T: TermKind> Iterator for TermIterator<'a, T> {
    type Item = Result<TermRecord<T::Id>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.view.is_at_end() {
            return None;
        }

        let record = (|| {
            let id = T::decode_index_id(&mut self.view, &mut self.id_state)?;
            let (delta_off, _) = self.view.read_uvarint()?;
            let (doc_freq, _) = self.view.read_uvarint()?;
            self.prev_doc_offset = self.prev_doc_offset.wrapping_add(delta_off);
            Ok(TermRecord {
                id,
                doc_offset: self.prev_doc_offset,
                doc_freq,
            })
        })();

        if record.is_err() {
            self.done = true;
        }
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::{write_uvarint, IntTerm, StringTerm};

    #[test]
    fn s3_int_field_two_records_then_end() {
        // (Δid=5, Δoff=10, freq=3), (Δid=2, Δoff=7, freq=1)
        let mut buf = Vec::new();
        write_uvarint(5, &mut buf);
        write_uvarint(10, &mut buf);
        write_uvarint(3, &mut buf);
        write_uvarint(2, &mut buf);
        write_uvarint(7, &mut buf);
        write_uvarint(1, &mut buf);

        let mut it = TermIterator::<IntTerm>::new(&buf);
        let r1 = it.next().unwrap().unwrap();
        assert_eq!((r1.id, r1.doc_offset, r1.doc_freq), (5, 10, 3));
        let r2 = it.next().unwrap().unwrap();
        assert_eq!((r2.id, r2.doc_offset, r2.doc_freq), (7, 17, 1));
        assert!(it.next().is_none());
    }

    #[test]
    fn string_field_iterates_with_prefix_sharing() {
        let mut buf = Vec::new();
        write_uvarint(0, &mut buf);
        write_uvarint(3, &mut buf);
        buf.extend_from_slice(b"cat");
        write_uvarint(2, &mut buf); // Δoff
        write_uvarint(4, &mut buf); // freq

        write_uvarint(2, &mut buf); // prefix_len
        write_uvarint(3, &mut buf); // suffix_len
        buf.extend_from_slice(b"tle"); // "ca" + "tle" = "cattle"
        write_uvarint(1, &mut buf);
        write_uvarint(2, &mut buf);

        let mut it = TermIterator::<StringTerm>::new(&buf);
        let r1 = it.next().unwrap().unwrap();
        assert_eq!(r1.id, b"cat");
        assert_eq!((r1.doc_offset, r1.doc_freq), (2, 4));
        let r2 = it.next().unwrap().unwrap();
        assert_eq!(r2.id, b"cattle");
        assert_eq!((r2.doc_offset, r2.doc_freq), (3, 2));
        assert!(it.next().is_none());
    }

    #[test]
    fn truncated_record_yields_error_then_stops() {
        let mut buf = Vec::new();
        write_uvarint(5, &mut buf);
        write_uvarint(10, &mut buf);
        // missing doc_freq
        let mut it = TermIterator::<IntTerm>::new(&buf);
        assert!(it.next().unwrap().is_err());
        assert!(it.next().is_none());
    }
}
