use crate::schema::EntityKind;
use anyhow::{anyhow, bail, Result};

/// Resolves which entity kinds to extract based on include/exclude filters.
///
/// The result is always in pipeline order.
pub fn resolve_kinds(
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
) -> Result<Vec<EntityKind>> {
    match (include, exclude) {
        (Some(_), Some(_)) => {
            bail!("Cannot use both --include and --exclude at the same time");
        }
        (Some(include_list), None) => {
            let mut kinds = parse_kinds(&include_list)?;
            kinds.sort();
            kinds.dedup();
            Ok(kinds)
        }
        (None, Some(exclude_list)) => {
            let excluded = parse_kinds(&exclude_list)?;
            Ok(EntityKind::ALL
                .into_iter()
                .filter(|k| !excluded.contains(k))
                .collect())
        }
        (None, None) => Ok(EntityKind::ALL.to_vec()),
    }
}

fn parse_kinds(names: &[String]) -> Result<Vec<EntityKind>> {
    names
        .iter()
        .map(|name| name.trim().parse::<EntityKind>().map_err(|e| anyhow!(e)))
        .collect()
}
