//! Terminal progress for long extract scans

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

/// Row counter spinner for one loader
///
/// Returns a hidden bar when no `MultiProgress` is attached, so loaders can
/// tick unconditionally.
pub fn row_spinner(multi: Option<&MultiProgress>, label: &str) -> ProgressBar {
    let Some(multi) = multi else {
        return ProgressBar::hidden();
    };

    let pb = multi.add(ProgressBar::new_spinner());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg} {pos} rows ({per_sec})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(label.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_without_multi() {
        let pb = row_spinner(None, "servings");
        assert!(pb.is_hidden());
        pb.inc(5);
        assert_eq!(pb.position(), 5);
    }

    #[test]
    fn test_spinner_carries_label() {
        let multi = MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden());
        let pb = row_spinner(Some(&multi), "nutrients");
        assert_eq!(pb.message(), "nutrients");
        pb.finish_and_clear();
    }
}
