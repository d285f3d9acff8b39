//! Manuscript authors and the principal-contact invariant.
//!
//! [`AuthorList`] is the only way to hold authors inside a draft. Every
//! mutator keeps exactly one author flagged as principal contact whenever the
//! list is non-empty.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::CoreError;

/// Session-local author identifier. Stable for the lifetime of the list and
/// never reused after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct AuthorId(u32);

impl AuthorId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Editable author fields, as entered on the metadata step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorInput {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    pub affiliation: String,
    pub country: String,
    pub bio_statement: String,
}

/// A manuscript author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub id: AuthorId,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    pub affiliation: String,
    pub country: String,
    pub bio_statement: String,
    pub is_principal: bool,
}

impl Author {
    fn from_input(id: AuthorId, input: AuthorInput, is_principal: bool) -> Self {
        let mut author = Self {
            id,
            first_name: String::new(),
            middle_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            affiliation: String::new(),
            country: String::new(),
            bio_statement: String::new(),
            is_principal,
        };
        author.apply(input);
        author
    }

    fn apply(&mut self, input: AuthorInput) {
        self.first_name = input.first_name;
        self.middle_name = input.middle_name;
        self.last_name = input.last_name;
        self.email = input.email;
        self.affiliation = input.affiliation;
        self.country = input.country;
        self.bio_statement = input.bio_statement;
    }

    /// "First Middle Last", skipping blank parts.
    pub fn display_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.last_name]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Ordered author collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorList {
    authors: Vec<Author>,
    next_id: u32,
}

impl Serialize for AuthorList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.authors.serialize(serializer)
    }
}

impl AuthorList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an author. The first author added becomes principal contact.
    pub fn add(&mut self, input: AuthorInput) -> AuthorId {
        self.next_id += 1;
        let id = AuthorId(self.next_id);
        let is_principal = self.authors.is_empty();
        self.authors.push(Author::from_input(id, input, is_principal));
        id
    }

    /// Replace the editable fields of an author. The principal flag is untouched.
    pub fn update(&mut self, id: AuthorId, input: AuthorInput) -> Result<(), CoreError> {
        let author = self
            .authors
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| not_found(id))?;
        author.apply(input);
        Ok(())
    }

    /// Remove an author.
    ///
    /// Returns `false` without touching the list when `id` is unknown or names
    /// the last remaining author. Removing the principal contact promotes the
    /// first remaining author.
    pub fn remove(&mut self, id: AuthorId) -> bool {
        if self.authors.len() <= 1 {
            return false;
        }
        let Some(pos) = self.authors.iter().position(|a| a.id == id) else {
            return false;
        };
        let removed = self.authors.remove(pos);
        if removed.is_principal {
            if let Some(first) = self.authors.first_mut() {
                first.is_principal = true;
            }
        }
        true
    }

    /// Make `id` the sole principal contact.
    pub fn set_principal(&mut self, id: AuthorId) -> Result<(), CoreError> {
        if !self.authors.iter().any(|a| a.id == id) {
            return Err(not_found(id));
        }
        for author in &mut self.authors {
            author.is_principal = author.id == id;
        }
        Ok(())
    }

    pub fn get(&self, id: AuthorId) -> Option<&Author> {
        self.authors.iter().find(|a| a.id == id)
    }

    pub fn principal(&self) -> Option<&Author> {
        self.authors.iter().find(|a| a.is_principal)
    }

    pub fn as_slice(&self) -> &[Author] {
        &self.authors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Author> {
        self.authors.iter()
    }

    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }
}

impl<'a> IntoIterator for &'a AuthorList {
    type Item = &'a Author;
    type IntoIter = std::slice::Iter<'a, Author>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn not_found(id: AuthorId) -> CoreError {
    CoreError::NotFound {
        entity: "author",
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(first: &str) -> AuthorInput {
        AuthorInput {
            first_name: first.to_string(),
            last_name: "Doe".to_string(),
            email: format!("{}@example.org", first.to_lowercase()),
            ..Default::default()
        }
    }

    fn principal_count(list: &AuthorList) -> usize {
        list.iter().filter(|a| a.is_principal).count()
    }

    // -- add --

    #[test]
    fn first_author_starts_as_principal() {
        let mut list = AuthorList::new();
        let id = list.add(input("Ana"));
        assert!(list.get(id).unwrap().is_principal);
    }

    #[test]
    fn later_authors_are_not_principal() {
        let mut list = AuthorList::new();
        let first = list.add(input("Ana"));
        let second = list.add(input("Ben"));
        assert!(list.get(first).unwrap().is_principal);
        assert!(!list.get(second).unwrap().is_principal);
        assert_eq!(principal_count(&list), 1);
    }

    #[test]
    fn ids_are_unique_and_not_reused() {
        let mut list = AuthorList::new();
        let a = list.add(input("Ana"));
        let b = list.add(input("Ben"));
        assert!(list.remove(b));
        let c = list.add(input("Cy"));
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    // -- set_principal --

    #[test]
    fn set_principal_is_exclusive() {
        let mut list = AuthorList::new();
        let a = list.add(input("Ana"));
        let b = list.add(input("Ben"));
        let c = list.add(input("Cy"));

        list.set_principal(c).unwrap();
        assert_eq!(list.principal().unwrap().id, c);
        assert_eq!(principal_count(&list), 1);

        list.set_principal(b).unwrap();
        list.set_principal(a).unwrap();
        assert_eq!(list.principal().unwrap().id, a);
        assert_eq!(principal_count(&list), 1);
    }

    #[test]
    fn set_principal_unknown_id_leaves_list_unchanged() {
        let mut list = AuthorList::new();
        let a = list.add(input("Ana"));
        let before = list.clone();
        assert!(list.set_principal(AuthorId(99)).is_err());
        assert_eq!(list, before);
        assert_eq!(list.principal().unwrap().id, a);
    }

    // -- remove --

    #[test]
    fn removing_last_author_is_a_noop() {
        let mut list = AuthorList::new();
        let a = list.add(input("Ana"));
        assert!(!list.remove(a));
        assert_eq!(list.len(), 1);
        assert!(list.get(a).unwrap().is_principal);
    }

    #[test]
    fn removing_principal_promotes_first_remaining() {
        let mut list = AuthorList::new();
        let a = list.add(input("Ana"));
        let b = list.add(input("Ben"));
        let c = list.add(input("Cy"));
        list.set_principal(b).unwrap();

        assert!(list.remove(b));
        assert_eq!(list.principal().unwrap().id, a);
        assert_eq!(principal_count(&list), 1);
        assert_eq!(
            list.iter().map(|x| x.id).collect::<Vec<_>>(),
            vec![a, c]
        );
    }

    #[test]
    fn removing_unknown_id_is_a_noop() {
        let mut list = AuthorList::new();
        list.add(input("Ana"));
        list.add(input("Ben"));
        assert!(!list.remove(AuthorId(42)));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn principal_invariant_holds_across_mixed_operations() {
        let mut list = AuthorList::new();
        let mut ids = Vec::new();
        for name in ["Ana", "Ben", "Cy", "Di", "Ed"] {
            ids.push(list.add(input(name)));
            assert_eq!(principal_count(&list), 1);
        }
        for id in ids.iter().rev() {
            list.set_principal(*id).unwrap();
            assert_eq!(principal_count(&list), 1);
        }
        for id in &ids {
            list.remove(*id);
            assert_eq!(principal_count(&list), 1);
        }
        assert_eq!(list.len(), 1);
    }

    // -- update --

    #[test]
    fn update_keeps_principal_flag() {
        let mut list = AuthorList::new();
        let a = list.add(input("Ana"));
        list.update(a, input("Anna")).unwrap();
        let author = list.get(a).unwrap();
        assert_eq!(author.first_name, "Anna");
        assert!(author.is_principal);
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let mut list = AuthorList::new();
        let err = list.update(AuthorId(7), input("Ana")).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { entity: "author", .. }));
    }

    #[test]
    fn display_name_skips_blank_parts() {
        let mut list = AuthorList::new();
        let id = list.add(AuthorInput {
            first_name: "Ana".into(),
            middle_name: "  ".into(),
            last_name: "Lima".into(),
            ..Default::default()
        });
        assert_eq!(list.get(id).unwrap().display_name(), "Ana Lima");
    }
}
