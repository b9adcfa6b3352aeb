use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::types::FormDefinition;

/// All versions of one logical form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormFamily {
    pub name: String,
    pub family_id: i64,
    /// Ascending by numeric version, ties by id.
    pub versions: Vec<FormDefinition>,
    /// Index into `versions` of the version shown by default.
    pub latest: usize,
}

impl FormFamily {
    pub fn latest(&self) -> &FormDefinition {
        &self.versions[self.latest]
    }

    /// The version with `id`, falling back to the latest.
    pub fn select(&self, id: Option<i64>) -> &FormDefinition {
        id.and_then(|id| self.versions.iter().find(|v| v.id == id))
            .unwrap_or_else(|| self.latest())
    }
}

/// Numeric value of a version string with a leading `v`/`V` stripped;
/// anything unparseable sorts as 0.
pub fn version_number(version: &str) -> f64 {
    let trimmed = version.trim();
    let digits = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    match digits.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

fn compare_versions(a: &FormDefinition, b: &FormDefinition) -> Ordering {
    version_number(&a.version)
        .total_cmp(&version_number(&b.version))
        .then(a.id.cmp(&b.id))
}

/// Group flat version rows into families keyed by `(name, family id)`.
///
/// The latest version is the highest-sorted row flagged `is_latest`, or the
/// highest-sorted row when none is flagged. Families come out ordered by
/// name then family id, so the result does not depend on input order.
pub fn group_versions(rows: &[FormDefinition]) -> Vec<FormFamily> {
    let mut families: BTreeMap<(String, i64), Vec<FormDefinition>> = BTreeMap::new();
    for row in rows {
        families
            .entry((row.name.clone(), row.family_id()))
            .or_default()
            .push(row.clone());
    }

    families
        .into_iter()
        .map(|((name, family_id), mut versions)| {
            versions.sort_by(compare_versions);
            let latest = versions
                .iter()
                .rposition(|v| v.is_latest)
                .unwrap_or(versions.len() - 1);
            FormFamily {
                name,
                family_id,
                versions,
                latest,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, name: &str, version: &str, latest: bool, origin: Option<i64>) -> FormDefinition {
        FormDefinition {
            id,
            name: name.into(),
            version: version.into(),
            is_latest: latest,
            original_form_id: origin,
            ..Default::default()
        }
    }

    #[test]
    fn version_numbers() {
        assert_eq!(version_number("v2"), 2.0);
        assert_eq!(version_number("V10"), 10.0);
        assert_eq!(version_number("1.5"), 1.5);
        assert_eq!(version_number("beta"), 0.0);
        assert_eq!(version_number(""), 0.0);
    }

    #[test]
    fn sorts_numerically_not_lexically() {
        let rows = vec![
            row(1, "Férias", "v10", false, None),
            row(2, "Férias", "v2", false, Some(1)),
            row(3, "Férias", "v9", false, Some(1)),
        ];
        let families = group_versions(&rows);
        assert_eq!(families.len(), 1);
        let versions: Vec<&str> = families[0].versions.iter().map(|v| v.version.as_str()).collect();
        assert_eq!(versions, vec!["v2", "v9", "v10"]);
        assert_eq!(families[0].latest().id, 1);
    }

    #[test]
    fn flagged_latest_wins_over_highest() {
        let rows = vec![
            row(1, "Compra", "1", false, None),
            row(2, "Compra", "2", true, Some(1)),
            row(3, "Compra", "3", false, Some(1)),
        ];
        let families = group_versions(&rows);
        assert_eq!(families[0].latest().id, 2);
        assert_eq!(families[0].select(Some(3)).id, 3);
        assert_eq!(families[0].select(Some(99)).id, 2);
    }

    #[test]
    fn same_name_different_origin_are_separate_families() {
        let rows = vec![row(1, "Cadastro", "1", true, None), row(5, "Cadastro", "1", true, None)];
        assert_eq!(group_versions(&rows).len(), 2);
    }
}
