use std::{fmt::Display, path::Path};

use plotters::prelude::*;
use tracing::debug;

use crate::{
    error::{Error, Result},
    fit::TrainingHistory,
};

fn plot_error(err: impl Display) -> Error {
    Error::Plot(err.to_string())
}

/// Draws the accuracy and loss curves of a training run into a PNG file.
pub fn plot_history(history: &TrainingHistory, path: &Path) -> Result<()> {
    if history.is_empty() {
        return Err(Error::EmptyHistory);
    }
    let max_loss = history
        .epochs
        .iter()
        .map(|x| x.loss)
        .fold(f32::NEG_INFINITY, f32::max);
    // Accuracy lives in [0, 1], keep it readable even when the loss is small
    let max_y = max_loss.max(1.0) * 1.1;

    let root_area = BitMapBackend::new(path, (1920, 1080)).into_drawing_area();
    root_area.fill(&WHITE).map_err(plot_error)?;

    let mut ctx = ChartBuilder::on(&root_area)
        .set_label_area_size(LabelAreaPosition::Left, 40)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .caption("Accuracy and loss", ("sans-serif", 40))
        .build_cartesian_2d(0..history.len(), 0.0f32..max_y)
        .map_err(plot_error)?;

    ctx.configure_mesh()
        .x_desc("epoch")
        .draw()
        .map_err(plot_error)?;

    ctx.draw_series(LineSeries::new(history.accuracy_series(), &BLUE))
        .map_err(plot_error)?
        .label("acc")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    ctx.draw_series(LineSeries::new(history.loss_series(), &RED))
        .map_err(plot_error)?
        .label("loss")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

    ctx.configure_series_labels()
        .background_style(&WHITE)
        .border_style(&BLACK)
        .draw()
        .map_err(plot_error)?;

    root_area.present().map_err(plot_error)?;
    debug!("wrote training plot to '{}'", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::EpochLog;

    #[test]
    fn test_empty_history_is_rejected() {
        let path = std::env::temp_dir().join("argmax-grad-empty-plot.png");
        let result = plot_history(&TrainingHistory::default(), &path);
        assert!(matches!(result, Err(Error::EmptyHistory)));
        assert!(!path.exists());
    }

    #[test]
    fn test_two_epoch_history_is_drawn() {
        let history = TrainingHistory {
            epochs: vec![
                EpochLog {
                    epoch: 0,
                    accuracy: 0.6,
                    loss: 0.9,
                },
                EpochLog {
                    epoch: 1,
                    accuracy: 0.85,
                    loss: 0.4,
                },
            ],
        };
        let file_name = format!("argmax-grad-plot-{}.png", std::process::id());
        let path = std::env::temp_dir().join(file_name);

        match plot_history(&history, &path) {
            Ok(()) => {
                assert!(path.exists());
                std::fs::remove_file(&path).unwrap();
            }
            // Hosts without a system font cannot render the caption
            Err(Error::Plot(_)) => {}
            Err(err) => panic!("unexpected error: {}", err),
        }
    }
}
