use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Hands out one progress bar per extractor.
///
/// Bars are hidden unless the reporter was built for a terminal, so library
/// callers and tests stay quiet.
#[derive(Clone)]
pub struct Progress {
    multi: MultiProgress,
    style: ProgressStyle,
}

impl Progress {
    pub fn console() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let style = ProgressStyle::default_bar()
            .template("{msg:20} [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");

        Self {
            multi: MultiProgress::with_draw_target(target),
            style,
        }
    }

    pub fn bar(&self, label: &str) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new(0));
        pb.set_style(self.style.clone());
        pb.set_message(label.to_string());
        pb
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::hidden()
    }
}
