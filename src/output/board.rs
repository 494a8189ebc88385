use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use console::Style;

use super::styling::{column_style, dim, gray, pipeline_style};
use crate::board::{AggregationPolicy, PipelineSummary, TITLE_WIDTH};

const SEPARATOR_WIDTH: usize = 150;

/// Column widths shared by every line of one board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardLayout {
    pub name_width: usize,
    pub ref_width: usize,
    pub label_width: usize,
}

impl BoardLayout {
    /// Measures the whole batch up front so every line lines up.
    pub fn for_batch(summaries: &[PipelineSummary], policy: AggregationPolicy) -> Self {
        let name_width = summaries
            .iter()
            .map(|s| s.project_name.chars().count())
            .max()
            .unwrap_or(0);
        let ref_width = summaries
            .iter()
            .map(|s| s.pipeline.ref_.chars().count())
            .max()
            .unwrap_or(0);

        Self {
            name_width,
            ref_width,
            label_width: policy.label_width(),
        }
    }

    pub fn render(&self, summary: &PipelineSummary) -> String {
        let name = pipeline_style(summary.pipeline.status).apply_to(format!(
            "🚀 {:<width$}",
            summary.project_name,
            width = self.name_width
        ));
        let ref_ = Style::new().blue().apply_to(format!(
            "|🪵  {:<width$}",
            summary.pipeline.ref_,
            width = self.ref_width
        ));
        let title = gray().apply_to(format!(
            "|📝 {:<width$}",
            summary.commit_title,
            width = TITLE_WIDTH
        ));

        let mut line = format!("{name}{ref_}{title}");
        for column in &summary.columns {
            let (glyph, style) = column_style(column.status);
            let cell = style.apply_to(format!(
                "|{glyph} {:<width$}",
                column.label,
                width = self.label_width
            ));
            line.push_str(&cell.to_string());
        }

        line
    }
}

/// Renders one line per summary, in the order given.
pub fn render_board(summaries: &[PipelineSummary], policy: AggregationPolicy) -> Vec<String> {
    let layout = BoardLayout::for_batch(summaries, policy);
    summaries.iter().map(|s| layout.render(s)).collect()
}

pub fn print_board(summaries: &[PipelineSummary], policy: AggregationPolicy) {
    let separator = "-".repeat(SEPARATOR_WIDTH);
    for line in render_board(summaries, policy) {
        println!("{line}");
        println!("{separator}");
    }
}

pub fn print_empty_board(cutoff: DateTime<Utc>, zone: Tz) {
    println!(
        "{}",
        dim(format!(
            "No pipelines updated since {}",
            cutoff.with_timezone(&zone).format("%Y-%m-%d %H:%M %Z")
        ))
    );
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use console::strip_ansi_codes;

    use super::*;
    use crate::board::{StageColumn, StageStatus};
    use crate::providers::gitlab::{CiStatus, Pipeline};

    fn summary(name: &str, ref_: &str, columns: Vec<StageColumn>) -> PipelineSummary {
        PipelineSummary {
            pipeline: Pipeline {
                id: 1,
                project_id: 1,
                ref_: ref_.to_string(),
                status: CiStatus::Success,
                updated_at: Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap(),
                sha: "abc".to_string(),
            },
            project_name: name.to_string(),
            columns,
            commit_title: "Fix deploy".to_string(),
        }
    }

    fn column(label: &str, status: StageStatus) -> StageColumn {
        StageColumn {
            label: label.to_string(),
            status,
        }
    }

    fn plain(lines: &[String]) -> Vec<String> {
        lines
            .iter()
            .map(|l| strip_ansi_codes(l).into_owned())
            .collect()
    }

    #[test]
    fn name_column_uses_longest_name_in_batch() {
        let summaries = vec![
            summary("abc", "main", vec![]),
            summary("abcdefghij", "main", vec![]),
            summary("abcdefg", "main", vec![]),
        ];

        let layout = BoardLayout::for_batch(&summaries, AggregationPolicy::StageCentric);
        assert_eq!(layout.name_width, 10);

        for line in plain(&render_board(&summaries, AggregationPolicy::StageCentric)) {
            let name_cell = line.split('|').next().unwrap();
            assert_eq!(name_cell.chars().count(), "🚀 ".chars().count() + 10);
        }
    }

    #[test]
    fn ref_column_uses_longest_ref_in_batch() {
        let summaries = vec![
            summary("svc", "main", vec![]),
            summary("svc", "feature/login", vec![]),
        ];

        let lines = plain(&render_board(&summaries, AggregationPolicy::StageCentric));
        assert!(lines[0].contains("|🪵  main         |📝 "));
        assert!(lines[1].contains("|🪵  feature/login|📝 "));
    }

    #[test]
    fn line_shows_title_and_columns() {
        let summaries = vec![summary(
            "svc-a",
            "main",
            vec![
                column("build", StageStatus::Passed),
                column("dev", StageStatus::Running),
            ],
        )];

        let lines = plain(&render_board(&summaries, AggregationPolicy::StageCentric));
        assert_eq!(
            lines[0],
            format!(
                "🚀 svc-a|🪵  main|📝 {:<25}|✅ build |🟣 dev   ",
                "Fix deploy"
            )
        );
    }

    #[test]
    fn job_centric_labels_are_wider() {
        let summaries = vec![summary("svc", "main", vec![column("dev", StageStatus::Skipped)])];
        let lines = plain(&render_board(&summaries, AggregationPolicy::JobCentric));
        assert!(lines[0].ends_with("|⏭️  dev    "));
    }

    #[test]
    fn every_status_has_a_glyph() {
        let statuses = [
            (StageStatus::Failed, "💥"),
            (StageStatus::Other, "👋"),
            (StageStatus::Pending, "⏳"),
            (StageStatus::AllowedToFail, "🟨"),
            (StageStatus::Canceled, "⏹️"),
            (StageStatus::Manual, "❓"),
            (StageStatus::Unknown, "❓"),
        ];

        for (status, glyph) in statuses {
            let summaries = vec![summary("svc", "main", vec![column("build", status)])];
            let lines = plain(&render_board(&summaries, AggregationPolicy::StageCentric));
            assert!(
                lines[0].contains(&format!("|{glyph}")),
                "{status:?} should render {glyph}, got {}",
                lines[0]
            );
        }
    }

    #[test]
    fn empty_batch_renders_nothing() {
        assert!(render_board(&[], AggregationPolicy::StageCentric).is_empty());
        assert_eq!(
            BoardLayout::for_batch(&[], AggregationPolicy::StageCentric).name_width,
            0
        );
    }
}
