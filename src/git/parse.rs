//! Parsers for `git branch` output

use crate::types::LocalBranch;

/// Parse `git branch --list --no-color` output.
///
/// Each line is `<marker><space><name>` where the marker is `*` for the
/// current checkout, `+` for a branch checked out in another worktree, and
/// a space otherwise. Worktree checkouts are reported as current because
/// git refuses to delete them either way. Detached HEAD entries such as
/// `* (HEAD detached at 1a2b3c4)` are not branches and are dropped.
pub fn parse_local_branches(output: &str) -> Vec<LocalBranch> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim_end();
            if line.trim().is_empty() {
                return None;
            }

            let (marker, rest) = match line.char_indices().next() {
                Some((_, c @ ('*' | '+'))) => (Some(c), &line[1..]),
                _ => (None, line),
            };
            let name = rest.trim();

            if name.is_empty() || name.starts_with('(') {
                return None;
            }

            Some(LocalBranch {
                name: name.to_string(),
                is_current: marker.is_some(),
            })
        })
        .collect()
}

/// Parse `git branch --remotes --no-color` output for one remote.
///
/// Keeps entries under `<remote>/`, strips that prefix, and drops symbolic
/// refs such as `origin/HEAD -> origin/main`. Entries of other remotes are
/// ignored, including ones whose name merely starts with the remote name
/// (`origin-mirror/x` is not under `origin`).
pub fn parse_remote_tracking(output: &str, remote: &str) -> Vec<String> {
    let prefix = format!("{remote}/");
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.contains(" -> "))
        .filter_map(|line| line.strip_prefix(&prefix))
        .filter(|name| !name.is_empty() && *name != "HEAD")
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_empty_output() {
        assert!(parse_local_branches("").is_empty());
        assert!(parse_local_branches("\n\n").is_empty());
    }

    #[test]
    fn test_local_single_current_branch() {
        assert_eq!(
            parse_local_branches("* main\n"),
            vec![LocalBranch::new("main", true)]
        );
    }

    #[test]
    fn test_local_marks_only_current() {
        let branches = parse_local_branches("  feature-1\n* main\n  old-experiment\n");
        assert_eq!(
            branches,
            vec![
                LocalBranch::new("feature-1", false),
                LocalBranch::new("main", true),
                LocalBranch::new("old-experiment", false),
            ]
        );
    }

    #[test]
    fn test_local_detached_head_dropped() {
        let branches = parse_local_branches("* (HEAD detached at 1a2b3c4)\n  main\n");
        assert_eq!(branches, vec![LocalBranch::new("main", false)]);
    }

    #[test]
    fn test_local_worktree_marker_counts_as_checked_out() {
        let branches = parse_local_branches("+ hotfix\n* main\n  topic\n");
        assert_eq!(branches[0], LocalBranch::new("hotfix", true));
        assert!(!branches[2].is_current);
    }

    #[test]
    fn test_local_slashed_names() {
        let branches = parse_local_branches("  feat/login\n  user/jo/spike\n");
        assert_eq!(branches[0].name, "feat/login");
        assert_eq!(branches[1].name, "user/jo/spike");
    }

    #[test]
    fn test_remote_strips_prefix_and_symbolic_head() {
        let output = "  origin/HEAD -> origin/main\n  origin/main\n  origin/feature-1\n";
        assert_eq!(
            parse_remote_tracking(output, "origin"),
            vec!["main".to_string(), "feature-1".to_string()]
        );
    }

    #[test]
    fn test_remote_filters_other_remotes() {
        let output = "  origin/main\n  upstream/main\n  upstream/release\n  origin-mirror/x\n";
        assert_eq!(parse_remote_tracking(output, "origin"), vec!["main"]);
        assert_eq!(
            parse_remote_tracking(output, "upstream"),
            vec!["main", "release"]
        );
    }

    #[test]
    fn test_remote_keeps_nested_names() {
        let output = "  origin/feat/login\n";
        assert_eq!(parse_remote_tracking(output, "origin"), vec!["feat/login"]);
    }

    #[test]
    fn test_remote_empty() {
        assert!(parse_remote_tracking("", "origin").is_empty());
    }
}
