use std::sync::Arc;

use tracing::debug;

use crate::models::ClassifierGroup;
use crate::reference::classifiers::ClassifierTable;

/// Maps a package's classifier list onto a classifier group.
pub struct ClassifierResolver {
    table: Arc<ClassifierTable>,
}

impl ClassifierResolver {
    pub fn new(table: Arc<ClassifierTable>) -> Self {
        Self { table }
    }

    /// First group (in table order) sharing any spelling with `classifiers`,
    /// compared case-insensitively. `None` input means no classifier metadata.
    pub fn resolve<S: AsRef<str>>(&self, classifiers: Option<&[S]>) -> Option<ClassifierGroup> {
        let classifiers = classifiers?;
        let idx = classifiers
            .iter()
            .filter_map(|c| self.table.find_spelling(c.as_ref()))
            .min()?;
        let group = self.table.get(idx)?;
        debug!(classifier = group.name(), "classifier matched group");
        Some(group.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceTables;

    fn resolver() -> ClassifierResolver {
        ClassifierResolver::new(Arc::new(ReferenceTables::embedded().unwrap().classifiers))
    }

    #[test]
    fn test_none() {
        assert_eq!(resolver().resolve::<&str>(None), None);
    }

    #[test]
    fn test_found_by_any_spelling() {
        let r = resolver();
        let afpl = [
            "License :: Aladdin Free Public License (AFPL)",
            "Aladdin Free Public License (AFPL)",
            "Aladdin Free Public License",
            "AFPL",
        ];

        for input in [
            "License :: Aladdin Free Public License (AFPL)",
            "AFPL",
            "aFpl",
        ] {
            let group = r.resolve(Some(&[input][..])).unwrap();
            assert_eq!(group.spellings(), &afpl);
        }
    }

    #[test]
    fn test_ignores_non_license_classifiers() {
        let r = resolver();
        let classifiers = vec![
            "Development Status :: 4 - Beta".to_string(),
            "Intended Audience :: Developers".to_string(),
            "License :: OSI Approved :: MIT License".to_string(),
            "Programming Language :: Python :: 3".to_string(),
        ];
        let group = r.resolve(Some(classifiers.as_slice())).unwrap();
        assert_eq!(group.name(), "MIT License");
    }

    #[test]
    fn test_first_group_in_table_order_wins() {
        let r = resolver();
        // Apache precedes MIT in the classifier list regardless of input order
        let classifiers = [
            "License :: OSI Approved :: MIT License",
            "License :: OSI Approved :: Apache Software License",
        ];
        let group = r.resolve(Some(&classifiers[..])).unwrap();
        assert_eq!(group.name(), "Apache Software License");
    }

    #[test]
    fn test_no_match() {
        let r = resolver();
        assert_eq!(r.resolve(Some(&["Topic :: Utilities"][..])), None);
        assert_eq!(r.resolve::<String>(Some(&[][..])), None);
    }
}
