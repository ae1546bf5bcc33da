//! prefix tree over registered patterns
//!
//! Answers "does this path match any of the patterns I registered" in a single walk down the
//! tree, instead of testing every pattern on its own.
use crate::error::{Error, Result};
use crate::path::{Path, PathComponent};
use crate::pattern::{Pattern, PatternComponent};

#[derive(Debug, Default)]
pub struct TrieNode {
    /// child for `*`
    any_key: Option<Box<TrieNode>>,
    /// child for `[*]`
    any_index: Option<Box<TrieNode>>,
    /// children for exact keys
    keys: indexmap::IndexMap<String, TrieNode>,
    /// a registered pattern ends here
    is_end: bool,
}

impl TrieNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pattern
    ///
    /// Only keys and wildcards can be registered, a fixed index like `foo[0]` is rejected.
    pub fn insert(&mut self, pattern: &Pattern) -> Result<()> {
        if pattern
            .components()
            .iter()
            .any(|c| matches!(c, PatternComponent::Index(_)))
        {
            return Err(Error::FixedIndexPattern {
                pattern: pattern.to_string(),
            });
        }

        let node = self.get_or_insert(pattern.components());
        node.is_end = true;
        tracing::trace!(%pattern, "pattern registered");
        Ok(())
    }

    fn get_or_insert(&mut self, components: &[PatternComponent]) -> &mut TrieNode {
        let Some((first, rest)) = components.split_first() else {
            return self;
        };

        let next: &mut TrieNode = match first {
            PatternComponent::AnyKey => &mut **self.any_key.get_or_insert_with(Default::default),
            PatternComponent::AnyIndex => {
                &mut **self.any_index.get_or_insert_with(Default::default)
            }
            PatternComponent::Key(key) => self.keys.entry(key.clone()).or_default(),
            // rejected by insert
            PatternComponent::Index(_) => return self,
        };

        next.get_or_insert(rest)
    }

    /// Find the registered pattern that matches `path`
    ///
    /// Wildcards in the returned pattern stay wildcards. At every level the wildcard child is
    /// tried before an exact key. Searching the empty path finds the empty pattern only when it
    /// was registered.
    pub fn search_path(&self, path: &Path) -> Option<Pattern> {
        let mut prefix = Vec::with_capacity(path.len());
        if self.search(path.components(), &mut prefix) {
            Some(Pattern::new(prefix))
        } else {
            None
        }
    }

    fn search(&self, path: &[PathComponent], prefix: &mut Vec<PatternComponent>) -> bool {
        let Some((first, rest)) = path.split_first() else {
            return self.is_end;
        };

        match first {
            PathComponent::Index(_) => {
                let Some(node) = &self.any_index else {
                    return false;
                };
                prefix.push(PatternComponent::AnyIndex);
                if node.search(rest, prefix) {
                    return true;
                }
                prefix.pop();
                false
            }
            PathComponent::Key(key) => {
                if let Some(node) = &self.any_key {
                    prefix.push(PatternComponent::AnyKey);
                    if node.search(rest, prefix) {
                        return true;
                    }
                    prefix.pop();
                }

                let Some(node) = self.keys.get(key) else {
                    return false;
                };
                prefix.push(PatternComponent::Key(key.clone()));
                if node.search(rest, prefix) {
                    return true;
                }
                prefix.pop();
                false
            }
        }
    }
}
