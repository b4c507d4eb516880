use anyhow::{anyhow, bail, Result};
use itertools::izip;

use crate::error::ClientError;
use crate::gateway::ProjectRows;

/// A project as the UI consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// 1-based position in the contract's arrays. Stable only as long as the
    /// contract's ordering is stable.
    pub id: u64,
    pub name: String,
    pub description: String,
    pub icon_url: Option<String>,
    pub project_url: Option<String>,
    pub reck_score: u64,
}

impl Project {
    /// Case-insensitive name/description filter.
    pub fn matches(&self, filter: &str) -> bool {
        let filter = filter.to_lowercase();
        self.name.to_lowercase().contains(&filter)
            || self.description.to_lowercase().contains(&filter)
    }
}

/// Snapshot of the synchronizer, fully replaced on every change. The
/// submitting flag is orthogonal to loading; it only guards duplicate
/// submissions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
    pub projects: Vec<Project>,
    pub loading: bool,
    pub submitting: bool,
    pub error: Option<ClientError>,
}

/// Zips the contract's five parallel columns into projects with 1-based
/// ids, sorted descending by score. The sort is stable, so ties keep their
/// contract order.
pub fn collect_projects(rows: ProjectRows) -> Result<Vec<Project>> {
    let ProjectRows {
        names,
        descriptions,
        icon_urls,
        project_urls,
        reck_scores,
    } = rows;

    let len = names.len();
    if [
        descriptions.len(),
        icon_urls.len(),
        project_urls.len(),
        reck_scores.len(),
    ]
    .iter()
    .any(|&l| l != len)
    {
        bail!("contract returned misaligned project columns");
    }

    let mut projects = izip!(names, descriptions, icon_urls, project_urls, reck_scores)
        .enumerate()
        .map(|(i, (name, description, icon_url, project_url, score))| {
            Ok(Project {
                id: (i + 1) as u64,
                name,
                description,
                icon_url: none_if_empty(icon_url),
                project_url: none_if_empty(project_url),
                reck_score: u64::try_from(score)
                    .map_err(|_| anyhow!("reck score overflows u64"))?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    projects.sort_by(|a, b| b.reck_score.cmp(&a.reck_score));
    Ok(projects)
}

fn none_if_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::U256;

    use super::*;

    fn _rows(entries: &[(&str, u64)]) -> ProjectRows {
        ProjectRows {
            names: entries.iter().map(|(n, _)| n.to_string()).collect(),
            descriptions: entries.iter().map(|(n, _)| format!("{} does things", n)).collect(),
            icon_urls: vec!["".to_string(); entries.len()],
            project_urls: vec!["".to_string(); entries.len()],
            reck_scores: entries.iter().map(|(_, s)| U256::from(*s)).collect(),
        }
    }

    #[test]
    fn test_ids_are_positional_and_one_based() {
        let projects = collect_projects(_rows(&[("a", 0), ("b", 0), ("c", 0)])).unwrap();
        assert_eq!(
            projects.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_sorted_descending_ties_keep_input_order() {
        let projects = collect_projects(_rows(&[("a", 5), ("b", 9), ("c", 5), ("d", 1)])).unwrap();
        let names: Vec<_> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c", "d"]);
        let ids: Vec<_> = projects.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1, 3, 4]);
    }

    #[test]
    fn test_empty_urls_become_none() {
        let mut rows = _rows(&[("a", 1)]);
        rows.project_urls = vec!["https://a.example".to_string()];
        let projects = collect_projects(rows).unwrap();
        assert_eq!(projects[0].icon_url, None);
        assert_eq!(
            projects[0].project_url.as_deref(),
            Some("https://a.example")
        );
    }

    #[test]
    fn test_misaligned_columns_rejected() {
        let mut rows = _rows(&[("a", 1), ("b", 2)]);
        rows.reck_scores.pop();
        assert!(collect_projects(rows).is_err());
    }

    #[test]
    fn test_empty_rows() {
        assert!(collect_projects(ProjectRows::default()).unwrap().is_empty());
    }

    #[test]
    fn test_filter_matches_name_and_description() {
        let projects = collect_projects(_rows(&[("Uniswap", 3)])).unwrap();
        assert!(projects[0].matches("uni"));
        assert!(projects[0].matches("DOES THINGS"));
        assert!(!projects[0].matches("aave"));
    }
}
