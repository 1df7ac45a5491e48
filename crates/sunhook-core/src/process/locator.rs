use tracing::{debug, trace};

use super::ProcessProvider;

/// Process names of the Dolphin emulator on the supported platforms
pub const DEFAULT_TARGETS: &[&str] = &["dolphin-emu", "dolphin", "Dolphin.exe"];

/// Compare a process name against a target name.
pub fn name_matches(candidate: &str, target: &str, case_insensitive: bool) -> bool {
    let candidate = candidate.trim();
    if case_insensitive {
        candidate.eq_ignore_ascii_case(target)
    } else {
        candidate == target
    }
}

/// Find the first process whose name matches one of `targets`.
///
/// Never fails: enumeration errors and unreadable candidates both end up as
/// "not found".
pub fn find_process<P, S>(provider: &P, targets: &[S]) -> Option<u32>
where
    P: ProcessProvider,
    S: AsRef<str>,
{
    let processes = match provider.enumerate_processes() {
        Ok(processes) => processes,
        Err(e) => {
            debug!("Process enumeration failed: {}", e);
            return None;
        }
    };

    let case_insensitive = provider.case_insensitive_names();
    let found = processes.iter().find(|process| {
        targets
            .iter()
            .any(|target| name_matches(&process.name, target.as_ref(), case_insensitive))
    });

    match found {
        Some(process) => {
            trace!("Matched process {} ({})", process.pid, process.name);
            Some(process.pid)
        }
        None => {
            trace!("No process matched among {} candidates", processes.len());
            None
        }
    }
}
