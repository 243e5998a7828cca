//! A crawled page state and the stylesheets it loaded.

use css_orchestrator::StateId;

/// A stylesheet loaded by a state, optionally at a load order of its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedFile {
    pub name: String,
    /// Overrides the file's default load order for this state.
    pub load_order: Option<u32>,
}

/// One DOM state reached while crawling, with the files it loaded.
#[derive(Clone, Debug)]
pub struct CrawledState<D> {
    pub id: StateId,
    pub document: D,
    pub loaded: Vec<LoadedFile>,
}

impl<D> CrawledState<D> {
    pub fn new(id: StateId, document: D) -> Self {
        Self {
            id,
            document,
            loaded: Vec::new(),
        }
    }

    /// Add a loaded file using its default load order.
    #[must_use]
    pub fn with_file(mut self, name: &str) -> Self {
        self.loaded.push(LoadedFile {
            name: name.to_owned(),
            load_order: None,
        });
        self
    }

    /// Add a loaded file at `load_order` for this state only.
    #[must_use]
    pub fn with_file_at(mut self, name: &str, load_order: u32) -> Self {
        self.loaded.push(LoadedFile {
            name: name.to_owned(),
            load_order: Some(load_order),
        });
        self
    }
}
