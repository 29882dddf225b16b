//! Loaded program: the main instruction sequence plus the label table.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::VmResult;
use super::loader::SourceLoader;

/// An executable program
///
/// Label bodies are kept apart from the main sequence and are immutable once
/// loaded; they are shared by reference with running label frames.
#[derive(Debug, Clone, Default)]
pub struct Program {
    main: Vec<String>,
    labels: HashMap<String, Arc<[String]>>,
}

impl Program {
    pub fn new<I>(main: Vec<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        Program {
            main,
            labels: labels
                .into_iter()
                .map(|(name, body)| (name, Arc::from(body)))
                .collect(),
        }
    }

    /// Load a program from source text.
    pub fn from_source(source: &str) -> VmResult<Self> {
        SourceLoader::load(source)
    }

    pub fn main(&self) -> &[String] {
        &self.main
    }

    pub fn len(&self) -> usize {
        self.main.len()
    }

    pub fn is_empty(&self) -> bool {
        self.main.is_empty()
    }

    pub fn fetch(&self, pc: usize) -> Option<&str> {
        self.main.get(pc).map(String::as_str)
    }

    pub fn label(&self, name: &str) -> Option<Arc<[String]>> {
        self.labels.get(name).cloned()
    }

    pub fn label_names(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }
}
