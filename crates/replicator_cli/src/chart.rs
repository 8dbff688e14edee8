//! SVG line charts of scenario trajectories.

use plotters::prelude::*;
use replicator_core::ScenarioRun;
use std::error::Error;
use std::path::Path;

const CHART_SIZE: (u32, u32) = (1000, 600);

/// Draws every share series of `run` against time, with a vertical marker at
/// the policy shock if the scenario has one.
pub fn draw_share_chart(run: &ScenarioRun, out_path: &Path) -> Result<(), Box<dyn Error>> {
    let times = &run.trajectory.times;
    let t_min = times.first().copied().unwrap_or(0.0);
    let mut t_max = times.last().copied().unwrap_or(t_min);
    if t_max <= t_min {
        t_max = t_min + 1.0;
    }

    let root = SVGBackend::new(out_path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(&run.title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(t_min..t_max, 0.0f64..1.0f64)?;

    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc("Share of electricity generation")
        .draw()?;

    for (idx, label) in run.labels.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        let points = run.trajectory.samples().map(move |(t, x)| (t, x[idx]));
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))?
            .label(label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    if let Some(shock) = run.shock_time.filter(|t| (t_min..=t_max).contains(t)) {
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(shock, 0.0), (shock, 1.0)],
            BLACK.mix(0.5),
        )))?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
