//! Origin metadata and hosted-provider edit URL patterns.

use tome_catalog::RefKind;

/// Compute the edit URL pattern for a recognized hosting provider.
///
/// The pattern embeds the ref name and start path and leaves a `%s`
/// placeholder for the file's path within the component root. Branches link
/// to the provider's edit view, tags to the read-only blob view; Bitbucket
/// uses its `src` view for both.
#[must_use]
pub fn edit_url_pattern(url: &str, refname: &str, ref_kind: RefKind, start_path: &str) -> Option<String> {
    let (host, project) = split_web_url(url)?;

    let action = match (host, ref_kind) {
        ("github.com" | "gitlab.com", RefKind::Branch) => "edit",
        ("github.com" | "gitlab.com", RefKind::Tag) => "blob",
        ("bitbucket.org", _) => "src",
        _ => return None,
    };

    let prefix = if start_path.is_empty() {
        String::new()
    } else {
        format!("{start_path}/")
    };

    Some(format!("https://{host}/{project}/{action}/{refname}/{prefix}%s"))
}

/// Split a repository URL into host and project path.
///
/// Handles `https://`, `http://`, `git://`, `ssh://git@`, and scp-style
/// `git@host:path` forms; strips a trailing `.git`.
fn split_web_url(url: &str) -> Option<(&str, &str)> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .or_else(|| url.strip_prefix("git://"))
        .or_else(|| url.strip_prefix("ssh://git@"))
        .map(|rest| rest.split_once('/'))
        .or_else(|| url.strip_prefix("git@").map(|rest| rest.split_once(':')))?;

    let (host, project) = rest?;
    let project = project.trim_end_matches('/');
    let project = project.strip_suffix(".git").unwrap_or(project);
    if project.is_empty() {
        return None;
    }
    Some((host, project))
}
