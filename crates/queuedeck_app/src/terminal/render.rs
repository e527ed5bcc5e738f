//! Draws the dashboard descriptor with ratatui.

use chrono::Utc;
use queuedeck_core::{Action, ControlSet, DashboardView, JobCard, Session, TaskCard};
use queuedeck_engine::DashboardSink;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use tokio::sync::watch;

use super::theme::{deck_theme, DeckTheme};

/// Hands every rendered session to the terminal task as a fresh descriptor.
pub struct TerminalSink {
    views: watch::Sender<DashboardView>,
}

impl TerminalSink {
    pub fn new(views: watch::Sender<DashboardView>) -> Self {
        Self { views }
    }
}

impl DashboardSink for TerminalSink {
    fn render(&mut self, session: &Session) {
        self.views.send_replace(session.view(Utc::now()));
    }
}

pub fn draw(frame: &mut Frame, view: &DashboardView, prompt: &str, scroll: u16) {
    let theme = deck_theme();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(frame.size());

    let header = Paragraph::new(Text::from(header_lines(view, &theme)))
        .style(Style::default().fg(theme.text).bg(theme.bg))
        .block(panel("queuedeck", &theme));
    frame.render_widget(header, layout[0]);

    let lines = job_lines(view, &theme);
    let last = u16::try_from(lines.len().saturating_sub(1)).unwrap_or(u16::MAX);
    let jobs = Paragraph::new(Text::from(lines))
        .style(Style::default().fg(theme.text).bg(theme.bg))
        .block(panel("Jobs", &theme))
        .wrap(Wrap { trim: false })
        .scroll((scroll.min(last), 0));
    frame.render_widget(jobs, layout[1]);

    let input = Paragraph::new(Line::from(vec![
        Span::styled("> ", Style::default().fg(theme.accent)),
        Span::raw(prompt.to_string()),
    ]))
    .style(Style::default().fg(theme.text).bg(theme.bg))
    .block(panel("Command (help, quit)", &theme));
    frame.render_widget(input, layout[2]);

    let prompt_width = u16::try_from(prompt.chars().count()).unwrap_or(u16::MAX);
    let area = layout[2];
    frame.set_cursor(
        area.x
            .saturating_add(3)
            .saturating_add(prompt_width)
            .min(area.right().saturating_sub(2)),
        area.y.saturating_add(1),
    );
}

fn panel(title: &'static str, theme: &DeckTheme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(Span::styled(title, theme.block_title()))
}

/// The full dashboard without styling, for non-interactive output.
pub fn dashboard_text(view: &DashboardView) -> String {
    let theme = deck_theme();
    let mut out = plain_text(&header_lines(view, &theme));
    out.push('\n');
    out.push_str(&plain_text(&job_lines(view, &theme)));
    out
}

fn plain_text(lines: &[Line<'_>]) -> String {
    let mut out = String::new();
    for line in lines {
        for span in &line.spans {
            out.push_str(&span.content);
        }
        out.push('\n');
    }
    out
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

pub fn header_lines(view: &DashboardView, theme: &DeckTheme) -> Vec<Line<'static>> {
    let muted = Style::default().fg(theme.muted);
    let shutdown_style = if view.shutdown.enabled {
        Style::default().fg(theme.text)
    } else {
        muted
    };
    let mut lines = vec![Line::from(vec![
        Span::styled("server: ", muted),
        Span::styled(view.server.text, theme.server(view.server.connectivity)),
        Span::styled(
            format!(
                "  updates: {}  debug: {}  ",
                on_off(view.updates_enabled),
                on_off(view.debug_enabled)
            ),
            muted,
        ),
        Span::styled(format!("[{}]", view.shutdown.text), shutdown_style),
    ])];

    lines.push(match view.counts {
        Some(counts) => Line::from(format!(
            "total {} | active {} | waiting {} | done {} | cancelled {} | failed {}",
            counts.num_total,
            counts.num_active,
            counts.num_waiting,
            counts.num_done,
            counts.num_cancelled,
            counts.num_failed,
        )),
        None => Line::styled("no summary yet", muted),
    });

    let mut status = vec![
        Span::styled("download: ", muted),
        Span::styled(view.indicator.label(), theme.indicator(view.indicator)),
    ];
    if let Some(notice) = &view.notice {
        status.push(Span::styled(
            format!("  notice: {notice}"),
            Style::default().fg(theme.accent),
        ));
    }
    if let Some(refusal) = &view.refusal {
        status.push(Span::styled(
            format!("  refused: {refusal}"),
            Style::default().fg(theme.critical),
        ));
    }
    lines.push(Line::from(status));
    lines
}

pub fn job_lines(view: &DashboardView, theme: &DeckTheme) -> Vec<Line<'static>> {
    if view.jobs.is_empty() {
        return vec![Line::styled("no jobs", Style::default().fg(theme.muted))];
    }
    let mut lines = Vec::new();
    for job in &view.jobs {
        push_job(&mut lines, job, theme);
    }
    lines
}

fn push_job(lines: &mut Vec<Line<'static>>, job: &JobCard, theme: &DeckTheme) {
    let muted = Style::default().fg(theme.muted);
    let marker = if job.expanded { "v " } else { "> " };
    let mut head = vec![Span::styled(marker, Style::default().fg(theme.accent))];
    if job.show_id {
        head.push(Span::styled(format!("({}) ", job.job_id), muted));
    }
    let title = if job.title.is_empty() { &job.url } else { &job.title };
    head.push(Span::raw(format!("{title}  [")));
    head.push(Span::styled(job.badge.text.clone(), theme.badge(job.badge.class)));
    head.push(Span::raw(format!(
        "]  {}  {}  {}",
        job.format, job.progress_text, job.elapsed_text
    )));
    lines.push(Line::from(head));
    lines.push(Line::styled(format!("    {}", job.url), muted));
    lines.push(Line::styled(
        format!("    actions: {}", controls(&job.controls)),
        muted,
    ));

    if !job.expanded {
        return;
    }
    for task in job.tasks.iter().filter(|task| task.visible) {
        push_task(lines, task, theme);
    }
}

fn push_task(lines: &mut Vec<Line<'static>>, task: &TaskCard, theme: &DeckTheme) {
    let muted = Style::default().fg(theme.muted);
    let mut head = vec![Span::raw(format!("    #{} ", task.index))];
    if task.show_id {
        head.push(Span::styled(format!("({}) ", task.task_id), muted));
    }
    let title = if task.title.is_empty() { &task.url } else { &task.title };
    head.push(Span::raw(format!("{title}  [")));
    head.push(Span::styled(task.badge.text.clone(), theme.badge(task.badge.class)));
    head.push(Span::raw(format!("]  {}  {}", task.format, task.elapsed_text)));
    if let Some(transfer) = &task.transfer_text {
        head.push(Span::styled(format!("  {transfer}"), muted));
    }
    lines.push(Line::from(head));

    let logs = if task.logs_enabled { "  logs" } else { "" };
    lines.push(Line::styled(
        format!("        actions: {}{logs}", controls(&task.controls)),
        muted,
    ));
}

fn controls(set: &ControlSet) -> String {
    let enabled: Vec<&str> = Action::ALL
        .into_iter()
        .filter(|action| set.is_enabled(*action))
        .map(Action::as_path)
        .collect();
    enabled.join(" ")
}
