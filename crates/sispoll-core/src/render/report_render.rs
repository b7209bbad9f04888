use crate::model::ChangeSet;

/// Render a change set as the plain-text update report
///
/// Generates:
/// - `Adding: <resource_id>` per addition
/// - then `Updated: <resource_id>` per update
///
/// Each section is sorted by resource id, independent of the order the change
/// set was built in. An empty change set renders as an empty string, which
/// callers treat as "nothing to send".
pub fn render_report(change_set: &ChangeSet) -> String {
    let mut additions: Vec<&str> = change_set
        .additions
        .iter()
        .map(|r| r.resource_id.as_str())
        .collect();
    additions.sort_unstable();

    let mut updates: Vec<&str> = change_set
        .updates
        .iter()
        .map(|u| u.resource_id.as_str())
        .collect();
    updates.sort_unstable();

    let mut output = String::new();

    for id in additions {
        output.push_str(&format!("Adding: {}\n", id));
    }

    for id in updates {
        output.push_str(&format!("Updated: {}\n", id));
    }

    output
}
