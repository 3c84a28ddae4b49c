use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use crate::error::{FtgsError, Result};
use crate::shard::ShardHandle;
use crate::term::{write_uvarint, TermKind, TermRecord};

pub struct Splitter<'a, 'q, T: TermKind> {
    shard: &'a ShardHandle<'q>,
    field: String,
    splits_root: PathBuf,
    n: usize,
    _marker: PhantomData<T>,
}

impl<'a, 'q, T: TermKind> Splitter<'a, 'q, T> {
    pub fn new(
        shard: &'a ShardHandle<'q>,
        field: impl Into<String>,
        splits_root: impl Into<PathBuf>,
        n: usize,
    ) -> Self {
        Splitter {
            shard,
            field: field.into(),
            splits_root: splits_root.into(),
            n,
            _marker: PhantomData,
        }
    }

    // splits land under splits_root/field/, one file per bucket
    pub fn run(
        &self,
        terms: impl Iterator<Item = Result<TermRecord<T::Id>>>,
    ) -> Result<Vec<PathBuf>> {
        let field_dir = self.splits_root.join(&self.field);
        let paths: Vec<PathBuf> = (0..self.n)
            .map(|k| self.shard.split_filename(&field_dir, k))
            .collect();

        for path in &paths {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| FtgsError::io(parent, e))?;
            }
        }

        let mut writers: Vec<BufWriter<File>> = paths
            .iter()
            .map(|p| File::create(p).map(BufWriter::new).map_err(|e| FtgsError::io(p, e)))
            .collect::<Result<_>>()?;

        let write_result = self.write_records(terms, &mut writers, &paths);

        for writer in &mut writers {
            let _ = writer.flush();
        }
        write_result?;

        Ok(paths)
    }

    fn write_records(
        &self,
        terms: impl Iterator<Item = Result<TermRecord<T::Id>>>,
        writers: &mut [BufWriter<File>],
        paths: &[PathBuf],
    ) -> Result<()> {
        let mut buf = Vec::new();
        for term in terms {
            let term = term?;
            let h = T::hash_id(&term.id);
            let bucket = (h % self.n as u64) as usize;

            buf.clear();
            T::encode_split_id(&term.id, &mut buf);
            write_uvarint(term.doc_offset, &mut buf);
            write_uvarint(term.doc_freq, &mut buf);

            writers[bucket]
                .write_all(&buf)
                .map_err(|e| FtgsError::io(&paths[bucket], e))?;
        }
        Ok(())
    }
}
