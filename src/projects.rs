use crate::block::Block;
use crate::tree::Tree;
use std::collections::BTreeMap;

pub type OwnerId = u64;

/// Project trees grouped by owner, owners in ascending order, projects in
/// the order they were added.
#[derive(Debug, Default)]
pub struct ProjectCollection {
    owners: BTreeMap<OwnerId, Vec<Tree<Block>>>,
}

impl ProjectCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_project(&mut self, owner: OwnerId, project: Tree<Block>) {
        self.owners.entry(owner).or_default().push(project);
    }

    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    pub fn project_count(&self) -> usize {
        self.owners.values().map(Vec::len).sum()
    }

    pub fn projects(&self, owner: OwnerId) -> &[Tree<Block>] {
        self.owners.get(&owner).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (OwnerId, &[Tree<Block>])> {
        self.owners
            .iter()
            .map(|(owner, projects)| (*owner, projects.as_slice()))
    }
}
