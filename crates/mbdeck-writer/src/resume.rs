//! Resume time from a previous solver run.
//!
//! The solver's `.out` log has one line per step:
//! `Step <n> <time> <dt> <iterations> <error> <flag>`. The time of the last
//! such line is where a resumed run starts.

use std::fs;
use std::path::Path;

use log::{debug, warn};

use crate::settings::Simulation;

/// Time of the last `Step` line in `path`. A missing, unreadable or garbled
/// file yields `None`.
pub fn last_time(path: &Path) -> Option<f64> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            warn!("cannot read {}: {}", path.display(), err);
            return None;
        }
    };
    let time = parse_last_time(&text);
    if time.is_none() {
        warn!("no step line found in {}", path.display());
    }
    time
}

fn parse_last_time(text: &str) -> Option<f64> {
    text.lines()
        .rev()
        .filter(|line| line.starts_with("Step"))
        .find_map(|line| {
            let mut fields = line.split_whitespace().skip(1);
            fields.next()?.parse::<u64>().ok()?;
            fields.next()?.parse::<f64>().ok().filter(|t| t.is_finite())
        })
}

/// Start time for `settings`: the resume time when a resume file is set and
/// readable, `initial_time` otherwise.
pub fn initial_time(settings: &Simulation) -> f64 {
    match settings.resume_from.as_deref().and_then(last_time) {
        Some(time) => {
            debug!("resuming at t = {}", time);
            time
        }
        None => settings.initial_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const LOG: &str = "\
MBDyn - MultiBody Dynamics
Step 0 0 0.001 0 0 0
Step 1 0.001 0.001 2 1e-09 0
Step 2 0.002 0.001 2 3e-10 0
End of simulation
";

    #[test]
    fn test_parse_last_time() {
        assert_eq!(parse_last_time(LOG), Some(0.002));
        assert_eq!(parse_last_time("garbage\nStep x y\n"), None);
        assert_eq!(parse_last_time(""), None);
    }

    #[test]
    fn test_skips_truncated_last_line() {
        let text = format!("{}Step 3", LOG);
        assert_eq!(parse_last_time(&text), Some(0.002));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = Simulation {
            initial_time: 1.5,
            resume_from: Some(PathBuf::from("/nonexistent/run.out")),
            ..Simulation::default()
        };
        assert_eq!(initial_time(&settings), 1.5);
    }

    #[test]
    fn test_reads_log_file() {
        let path = std::env::temp_dir().join(format!("mbdeck-resume-{}.out", std::process::id()));
        fs::write(&path, LOG).unwrap();
        let settings = Simulation {
            resume_from: Some(path.clone()),
            ..Simulation::default()
        };
        assert_eq!(initial_time(&settings), 0.002);
        fs::remove_file(&path).unwrap();
    }
}
