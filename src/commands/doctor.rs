//! Data health checks.

use super::Output;
use crate::Result;
use crate::store::Roster;
use crate::views::DanglingMembership;
use serde::Serialize;

#[derive(Serialize)]
pub struct DoctorReport {
    pub healthy: bool,
    pub dangling: Vec<DanglingMembership>,
    /// True when the dangling memberships were removed
    pub fixed: bool,
}

impl Output for DoctorReport {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        if self.dangling.is_empty() {
            return "No problems found.".to_string();
        }
        let verb = if self.fixed { "Removed" } else { "Found" };
        let mut lines = vec![format!("{} {} dangling membership(s):", verb, self.dangling.len())];
        for entry in &self.dangling {
            lines.push(format!(
                "  group {} lists missing student {}",
                entry.group_id, entry.student_id
            ));
        }
        if !self.fixed {
            lines.push("Run `roster doctor --fix` to remove them.".to_string());
        }
        lines.join("\n")
    }
}

/// Report memberships that point at removed students, pruning them when `fix` is set.
pub fn doctor(roster: &mut Roster, fix: bool) -> Result<DoctorReport> {
    let dangling = if fix {
        roster.prune_dangling()?
    } else {
        roster.dangling_memberships()
    };
    Ok(DoctorReport {
        healthy: dangling.is_empty(),
        fixed: fix && !dangling.is_empty(),
        dangling,
    })
}
