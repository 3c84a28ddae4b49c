use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use memmap2::Mmap;

use crate::error::{FtgsError, Result};
use crate::packed::PackedTable;

pub struct ShardHandle<'q> {
    dir: PathBuf,
    table: Option<&'q PackedTable>,
    term_views: RwLock<HashMap<String, Arc<Mmap>>>,
    doc_views: RwLock<HashMap<String, Arc<Mmap>>>,
}

impl<'q> ShardHandle<'q> {
    pub fn new(dir: impl Into<PathBuf>, table: Option<&'q PackedTable>) -> Self {
        ShardHandle {
            dir: dir.into(),
            table,
            term_views: RwLock::new(HashMap::new()),
            doc_views: RwLock::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn table(&self) -> Option<&'q PackedTable> {
        self.table
    }

    pub fn name_of(&self) -> String {
        self.dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn term_view(&self, field: &str) -> Result<Arc<Mmap>> {
        self.view(&self.term_views, field, "terms")
    }

    pub fn doc_view(&self, field: &str) -> Result<Arc<Mmap>> {
        self.view(&self.doc_views, field, "docs")
    }

    // {splits_root}/{shard_name}.{bucket}
    pub fn split_filename(&self, splits_root: &Path, bucket: usize) -> PathBuf {
        splits_root.join(format!("{}.{}", self.name_of(), bucket))
    }

    fn view(
        &self,
        cache: &RwLock<HashMap<String, Arc<Mmap>>>,
        field: &str,
        extension: &str,
    ) -> Result<Arc<Mmap>> {
        if let Some(mmap) = cache.read().unwrap().get(field) {
            return Ok(Arc::clone(mmap));
        }

        let mut guard = cache.write().unwrap();
        if let Some(mmap) = guard.get(field) {
            return Ok(Arc::clone(mmap));
        }

        let path = self.dir.join(format!("{field}.{extension}"));
        let file = File::open(&path).map_err(|e| FtgsError::io(&path, e))?;
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| FtgsError::io(&path, e))?;
        let mmap = Arc::new(mmap);
        guard.insert(field.to_string(), Arc::clone(&mmap));
        Ok(mmap)
    }
}
