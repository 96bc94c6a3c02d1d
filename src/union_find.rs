use std::collections::{HashMap, HashSet};

use crate::errors::{LeafSegError, Result};

/// Disjoint-set (union-find) over integer labels.
///
/// Unlike the textbook path-compressed structure, this registry keeps an
/// explicit class -> member-set map so that all labels merged into a class can
/// be enumerated later (the labeler folds sizes and adjacency sets across
/// every member of a class). Merging moves the smaller member set into the
/// larger and repoints the moved members, so the amortized cost stays bounded.
#[derive(Debug, Clone, Default)]
pub struct UnionFind {
    element_to_class: HashMap<i32, i32>,
    class_to_elements: HashMap<i32, HashSet<i32>>,
}

impl UnionFind {
    pub fn new() -> Self {
        UnionFind {
            element_to_class: HashMap::new(),
            class_to_elements: HashMap::new(),
        }
    }

    /// Register a previously unseen label as a new singleton class
    pub fn create_subset_with(&mut self, label: i32) -> Result<()> {
        if self.element_to_class.contains_key(&label) {
            return Err(LeafSegError::DuplicateLabel(label));
        }

        self.element_to_class.insert(label, label);
        self.class_to_elements.insert(label, HashSet::from([label]));

        Ok(())
    }

    /// Merge the classes containing the two labels; no-op if already identical
    pub fn combine_classes_containing(&mut self, a: i32, b: i32) -> Result<()> {
        let class_a = self.get_class_of(a)?;
        let class_b = self.get_class_of(b)?;

        if class_a == class_b {
            return Ok(());
        }

        // Union by size: absorb the smaller class into the larger one.
        let size_a = self.class_to_elements[&class_a].len();
        let size_b = self.class_to_elements[&class_b].len();
        let (surviving, absorbed) = if size_a >= size_b {
            (class_a, class_b)
        } else {
            (class_b, class_a)
        };

        let moved = self
            .class_to_elements
            .remove(&absorbed)
            .ok_or(LeafSegError::UnknownLabel(absorbed))?;

        for &element in &moved {
            self.element_to_class.insert(element, surviving);
        }

        self.class_to_elements
            .get_mut(&surviving)
            .ok_or(LeafSegError::UnknownLabel(surviving))?
            .extend(moved);

        Ok(())
    }

    /// The id of the class currently containing the label
    pub fn get_class_of(&self, label: i32) -> Result<i32> {
        self.element_to_class
            .get(&label)
            .copied()
            .ok_or(LeafSegError::UnknownLabel(label))
    }

    /// All labels in the class containing the given label
    pub fn get_elements_in_class_with(&self, label: i32) -> Result<&HashSet<i32>> {
        let class = self.get_class_of(label)?;
        self.class_to_elements
            .get(&class)
            .ok_or(LeafSegError::UnknownLabel(label))
    }

    /// Iterate over every class's member set
    pub fn classes(&self) -> impl Iterator<Item = &HashSet<i32>> {
        self.class_to_elements.values()
    }

    /// Drop a whole class and its members from the registry
    pub fn remove_class(&mut self, class: i32) {
        if let Some(elements) = self.class_to_elements.remove(&class) {
            for element in elements {
                self.element_to_class.remove(&element);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_classes_start_separate() {
        let mut uf = UnionFind::new();
        uf.create_subset_with(1).unwrap();
        uf.create_subset_with(2).unwrap();

        assert_ne!(uf.get_class_of(1).unwrap(), uf.get_class_of(2).unwrap());
        assert_eq!(
            uf.get_elements_in_class_with(1).unwrap(),
            &HashSet::from([1])
        );
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut uf = UnionFind::new();
        uf.create_subset_with(5).unwrap();

        assert!(matches!(
            uf.create_subset_with(5),
            Err(LeafSegError::DuplicateLabel(5))
        ));
    }

    #[test]
    fn unknown_label_fails() {
        let uf = UnionFind::new();
        assert!(matches!(
            uf.get_class_of(7),
            Err(LeafSegError::UnknownLabel(7))
        ));
        assert!(matches!(
            uf.get_elements_in_class_with(7),
            Err(LeafSegError::UnknownLabel(7))
        ));
    }

    #[test]
    fn merge_combines_member_sets() {
        let mut uf = UnionFind::new();
        for label in [1, 2, 3] {
            uf.create_subset_with(label).unwrap();
        }

        uf.combine_classes_containing(1, 2).unwrap();
        uf.combine_classes_containing(2, 3).unwrap();

        assert_eq!(uf.get_class_of(1).unwrap(), uf.get_class_of(3).unwrap());
        assert_eq!(
            uf.get_elements_in_class_with(2).unwrap(),
            &HashSet::from([1, 2, 3])
        );
    }

    #[test]
    fn merge_is_idempotent() {
        let mut uf = UnionFind::new();
        uf.create_subset_with(-1).unwrap();
        uf.create_subset_with(-2).unwrap();

        uf.combine_classes_containing(-1, -2).unwrap();
        uf.combine_classes_containing(-2, -1).unwrap();

        assert_eq!(uf.get_elements_in_class_with(-1).unwrap().len(), 2);
        assert_eq!(uf.classes().count(), 1);
    }

    #[test]
    fn larger_class_absorbs_smaller() {
        let mut uf = UnionFind::new();
        for label in [1, 2, 3, 4] {
            uf.create_subset_with(label).unwrap();
        }

        uf.combine_classes_containing(1, 2).unwrap();
        uf.combine_classes_containing(3, 1).unwrap();

        // {1, 2} had two members, so its root id survives.
        assert_eq!(uf.get_class_of(3).unwrap(), uf.get_class_of(1).unwrap());
        assert_eq!(uf.get_elements_in_class_with(4).unwrap().len(), 1);
    }

    #[test]
    fn remove_class_forgets_all_members() {
        let mut uf = UnionFind::new();
        uf.create_subset_with(-1).unwrap();
        uf.create_subset_with(-2).unwrap();
        uf.combine_classes_containing(-1, -2).unwrap();

        let class = uf.get_class_of(-1).unwrap();
        uf.remove_class(class);

        assert!(uf.get_class_of(-1).is_err());
        assert!(uf.get_class_of(-2).is_err());
        assert_eq!(uf.classes().count(), 0);
    }
}
