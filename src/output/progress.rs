use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{bright, bright_green, bright_yellow};

/// Spinner-per-phase progress for an overview collection, drawn on stderr.
pub struct PhaseProgress {
    pb: ProgressBar,
}

impl PhaseProgress {
    pub fn start_phase_1() -> Self {
        eprintln!("{}  {}", bright("⚙️"), bright("Phases").underlined());
        let pb = create_spinner(bright_yellow("Phase 1/3: Resolving projects").to_string());
        Self { pb }
    }

    pub fn finish_phase_1_start_phase_2(self, project_count: usize) -> Self {
        self.pb.finish_with_message(
            bright_green(format!("Phase 1/3: Resolved {project_count} projects ✓")).to_string(),
        );
        let pb = create_spinner(
            bright_yellow(format!(
                "Phase 2/3: Fetching pipelines and runs for {project_count} projects"
            ))
            .to_string(),
        );
        Self { pb }
    }

    pub fn finish_phase_2_start_phase_3(self) -> Self {
        self.pb.finish_with_message(
            bright_green("Phase 2/3: Fetched pipelines and runs ✓").to_string(),
        );
        let pb =
            create_spinner(bright_yellow("Phase 3/3: Aggregating pipeline statistics").to_string());
        Self { pb }
    }

    pub fn finish_phase_3(self) {
        self.pb.finish_with_message(
            bright_green("Phase 3/3: Pipeline statistics aggregated ✓").to_string(),
        );
        eprintln!();
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::with_template("  {msg} {spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
