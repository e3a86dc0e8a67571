//! Error reporting.
//!
//! Spans in this crate are `(source_id, range)` pairs. A source id is an
//! index into a [`Cache`], which holds the text of the intrinsic definition
//! file and of every call script read, so that `ariadne` can quote them.

use crate::table;

use indexmap::IndexMap;

use std::path::PathBuf;
use std::result::Result as StdResult;
use std::{fmt, io};

/// The sources that spans refer to, numbered in the order they were added.
#[derive(Default)]
pub struct Cache {
    sources: IndexMap<PathBuf, ariadne::Source>,
}

impl Cache {
    /// Add `source`, read from `path`, and return its source id.
    ///
    /// Adding a path twice replaces its text but keeps its id.
    pub fn insert(&mut self, path: PathBuf, source: &str) -> usize {
        self.sources
            .insert_full(path, ariadne::Source::from(source))
            .0
    }

    /// Add the builtin intrinsic definitions, and return their source id.
    ///
    /// Pass the id to [`Table::load`](crate::table::Table::load), so that
    /// errors in the definitions are reported against `intrinsics.def`.
    pub fn insert_definitions(&mut self) -> usize {
        self.insert(PathBuf::from("intrinsics.def"), table::DEFINITIONS)
    }
}

impl ariadne::Cache<usize> for Cache {
    fn fetch(&mut self, &id: &usize) -> StdResult<&ariadne::Source, Box<dyn fmt::Debug + '_>> {
        match self.sources.get_index(id) {
            Some((_path, source)) => Ok(source),
            None => Err(Box::new(format!("no source with id {}", id))),
        }
    }

    fn display<'a>(&self, &id: &'a usize) -> Option<Box<dyn fmt::Display + 'a>> {
        let (path, _source) = self.sources.get_index(id)?;
        Some(Box::new(path.display().to_string()))
    }
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.sources.keys()).finish()
    }
}

/// Errors that can render themselves as `ariadne` reports, quoting the
/// sources in a [`Cache`].
///
/// Definition file errors, call script parse errors, lookup errors, and
/// no-match diagnostics all implement this.
pub trait AriadneReport {
    fn write_with_config<W>(
        &self,
        stream: W,
        cache: &mut Cache,
        config: ariadne::Config,
    ) -> io::Result<()>
    where
        W: io::Write;

    fn write<W>(&self, stream: W, cache: &mut Cache) -> io::Result<()>
    where
        W: io::Write,
    {
        self.write_with_config(stream, cache, ariadne::Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ariadne::Cache as _;

    #[test]
    fn source_ids() {
        let mut cache = Cache::default();
        let definitions = cache.insert_definitions();
        let script = cache.insert("calls.txt".into(), "cos(f32)\n");
        assert_eq!((definitions, script), (0, 1));
        assert_eq!(cache.insert_definitions(), definitions);

        let name = cache.display(&script).map(|name| name.to_string());
        assert_eq!(name.as_deref(), Some("calls.txt"));
        assert!(cache.fetch(&2).is_err());
        assert!(cache.display(&2).is_none());
    }
}
