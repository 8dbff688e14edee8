use crate::error::ExportError;
use crate::trajectory::Trajectory;
use std::fmt::Write;

/// Formats a trajectory as CSV: a `time` column followed by one column per label.
pub fn trajectory_csv<S: AsRef<str>>(
    trajectory: &Trajectory,
    labels: &[S],
) -> Result<String, ExportError> {
    if labels.len() != trajectory.dimension {
        return Err(ExportError::LabelMismatch {
            expected: trajectory.dimension,
            found: labels.len(),
        });
    }

    let mut out = String::from("time");
    for label in labels {
        out.push(',');
        out.push_str(label.as_ref());
    }
    out.push('\n');

    for (t, state) in trajectory.samples() {
        // Writing into a String cannot fail.
        let _ = write!(out, "{t}");
        for value in state {
            let _ = write!(out, ",{value:.10}");
        }
        out.push('\n');
    }
    Ok(out)
}
