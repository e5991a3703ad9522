//! Object index over a parsed ODL file.
//!
//! Every reconstruction stage reads the raw graph through [`ObjectIndex`]: it
//! groups objects by kind (in file order) and pre-resolves each object's
//! single Version record. The index borrows the file and is never mutated
//! after construction, so it can be shared freely across threads.

mod error;
mod version;

use rustc_hash::FxHashMap;

use crate::base::ObjectId;
use crate::base::schema::ObjectKind;
use crate::syntax::{OdlFile, RawObject};

pub use error::LookupError;
pub use version::VersionView;

type Result<T> = std::result::Result<T, LookupError>;

/// Outcome of looking for an object's Version record.
#[derive(Clone, Copy, Debug)]
enum VersionSlot<'f> {
    Found(VersionView<'f>),
    Missing,
    Multiple(usize),
}

/// Read-only index of an [`OdlFile`].
#[derive(Debug)]
pub struct ObjectIndex<'f> {
    file: &'f OdlFile,
    by_kind: FxHashMap<ObjectKind, Vec<&'f RawObject>>,
    versions: FxHashMap<&'f str, VersionSlot<'f>>,
}

impl<'f> ObjectIndex<'f> {
    /// Build the index in a single pass over the file.
    pub fn new(file: &'f OdlFile) -> Self {
        let mut by_kind: FxHashMap<ObjectKind, Vec<&'f RawObject>> = FxHashMap::default();
        let mut versions = FxHashMap::default();

        for object in file.iter() {
            by_kind.entry(object.kind).or_default().push(object);

            let mut found = object.versions();
            let first = found.next();
            let rest = found.count();
            let slot = match (first, rest) {
                (None, _) => VersionSlot::Missing,
                (Some((label, details)), 0) => {
                    VersionSlot::Found(VersionView::new(&object.id, label, details))
                }
                (Some(_), rest) => VersionSlot::Multiple(rest + 1),
            };
            versions.insert(object.id.as_str(), slot);
        }

        tracing::debug!(
            objects = file.len(),
            kinds = by_kind.len(),
            "built object index"
        );

        Self {
            file,
            by_kind,
            versions,
        }
    }

    /// The indexed file.
    pub fn file(&self) -> &'f OdlFile {
        self.file
    }

    /// Look up an object by identifier.
    pub fn get(&self, id: &str) -> Option<&'f RawObject> {
        self.file.get(id)
    }

    /// Look up an object that must exist.
    pub fn object(&self, id: &str) -> Result<&'f RawObject> {
        self.get(id).ok_or_else(|| LookupError::MissingObject { id: id.into() })
    }

    /// Kind of an object, if it exists.
    pub fn kind_of(&self, id: &str) -> Option<ObjectKind> {
        self.get(id).map(|object| object.kind)
    }

    /// All objects of a kind, in file order.
    pub fn objects_of_kind(&self, kind: ObjectKind) -> &[&'f RawObject] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// Identifiers of all objects of a kind, in file order.
    pub fn ids_of_kind(&self, kind: ObjectKind) -> impl Iterator<Item = &'f ObjectId> + '_ {
        self.objects_of_kind(kind).iter().map(|object| &object.id)
    }

    /// The single Version record of an object.
    ///
    /// Fails if the object does not exist or has zero or several Version
    /// records.
    pub fn version(&self, id: &str) -> Result<VersionView<'f>> {
        match self.versions.get(id) {
            Some(VersionSlot::Found(view)) => Ok(*view),
            Some(VersionSlot::Missing) => Err(LookupError::MissingVersion { id: id.into() }),
            Some(VersionSlot::Multiple(count)) => Err(LookupError::MultipleVersions {
                id: id.into(),
                count: *count,
            }),
            None => Err(LookupError::MissingObject { id: id.into() }),
        }
    }

    /// Normalized display name of an object.
    pub fn name(&self, id: &str) -> Result<smol_str::SmolStr> {
        Ok(self.version(id)?.name())
    }

    /// Display name of an object as written in the corpus.
    pub fn plain_name(&self, id: &str) -> Result<&'f str> {
        Ok(self.version(id)?.plain_name())
    }
}
