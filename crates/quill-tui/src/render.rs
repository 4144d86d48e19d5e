//! Pure view/render functions for the TUI.
//!
//! This module contains all rendering logic. Functions here:
//! - Take `&AppState` by immutable reference
//! - Draw to a ratatui Frame
//! - Never mutate state or return effects

use chrono::{DateTime, Utc};
use quill_core::Post;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

use crate::common::text::truncate_with_ellipsis;
use crate::modal::{ComposeForm, LoginForm, Modal, ProfileForm, RegisterForm};
use crate::notices::NoticeKind;
use crate::router::View;
use crate::state::{AppState, TuiState};

/// Height of the header bar.
const HEADER_HEIGHT: u16 = 1;

/// Height of the footer (notice or key hints).
const FOOTER_HEIGHT: u16 = 1;

/// Spinner frames for the header animation while loads are running.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

/// Renders the entire TUI to the frame.
///
/// This is a pure render function - it only reads state and draws to frame.
pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let state = &app.tui;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(1),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(area);

    render_header(state, frame, chunks[0]);
    render_body(state, frame, chunks[1]);
    render_footer(state, frame, chunks[2]);

    // Modal overlay (last, so it appears on top)
    if let Some(modal) = &app.modal {
        render_modal(state, modal, frame, area);
    }
}

// ============================================================================
// Chrome
// ============================================================================

fn view_title(state: &TuiState) -> String {
    match &state.router.view {
        View::Feed if !state.session.logged_in() => "Welcome".to_string(),
        View::Feed => "Feed".to_string(),
        View::MyPosts => "My posts".to_string(),
        View::Profile(username) => format!("@{username}"),
        View::PostDetail { .. } => "Post".to_string(),
    }
}

fn render_header(state: &TuiState, frame: &mut Frame, area: Rect) {
    let mut left = vec![
        Span::styled(
            " quill ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(view_title(state), Style::default().fg(Color::White)),
    ];
    if state.tasks.is_any_running() {
        let spinner = SPINNER_FRAMES[state.spinner_frame % SPINNER_FRAMES.len()];
        left.push(Span::raw(" "));
        left.push(Span::styled(spinner, Style::default().fg(Color::Cyan)));
    }
    frame.render_widget(Paragraph::new(Line::from(left)), area);

    let right = match state.session.username() {
        Some(username) => format!("@{username} "),
        None => "not signed in ".to_string(),
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            right,
            Style::default().fg(Color::DarkGray),
        )))
        .alignment(Alignment::Right),
        area,
    );
}

fn render_footer(state: &TuiState, frame: &mut Frame, area: Rect) {
    if let Some(notice) = state.notices.current() {
        let color = match notice.kind {
            NoticeKind::Info => Color::Green,
            NoticeKind::Error => Color::Red,
        };
        let line = Line::from(Span::styled(
            format!(" {}", notice.message),
            Style::default().fg(color),
        ));
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let hints: &[(&str, &str)] = if !state.session.logged_in() {
        &[("i", "sign in"), ("q", "quit")]
    } else {
        match &state.router.view {
            View::Feed => &[
                ("j/k", "move"),
                ("Enter", "open"),
                ("Space", "like"),
                ("f", "refresh"),
                ("m", "my posts"),
                ("p", "profile"),
                ("n", "new post"),
                ("o", "sign out"),
                ("q", "quit"),
            ],
            View::MyPosts => &[
                ("j/k", "move"),
                ("Enter", "open"),
                ("e", "edit"),
                ("d", "delete"),
                ("n", "new post"),
                ("f", "feed"),
                ("q", "quit"),
            ],
            View::Profile(_) => &[
                ("j/k", "move"),
                ("Enter", "open"),
                ("w", "follow"),
                ("Esc", "back"),
                ("q", "quit"),
            ],
            View::PostDetail { .. } => &[
                ("c", "comment"),
                ("Space", "like"),
                ("a", "author"),
                ("Esc", "back"),
                ("q", "quit"),
            ],
        }
    };

    let mut spans = Vec::with_capacity(hints.len() * 2 + 1);
    spans.push(Span::raw(" "));
    for (key, label) in hints {
        spans.push(Span::styled(*key, Style::default().fg(Color::DarkGray)));
        spans.push(Span::raw(format!(" {label}  ")));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ============================================================================
// Views
// ============================================================================

fn render_body(state: &TuiState, frame: &mut Frame, area: Rect) {
    match &state.router.view {
        View::Feed if !state.session.logged_in() => render_landing(frame, area),
        View::Feed => render_post_list(frame, area, "Feed", &state.feed.posts, state.feed.selected),
        View::MyPosts => render_post_list(
            frame,
            area,
            "My posts",
            &state.my_posts.posts,
            state.my_posts.selected,
        ),
        View::Profile(_) => render_profile(state, frame, area),
        View::PostDetail { .. } => render_detail(state, frame, area),
    }
}

/// The logged-out landing page. Feed data needs a session, so there is
/// nothing else to show here.
fn render_landing(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::default(),
        Line::from(Span::styled(
            "quill",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from("A reading and writing space for your circle."),
        Line::default(),
        Line::from(vec![
            Span::raw("Press "),
            Span::styled("i", Style::default().fg(Color::Cyan)),
            Span::raw(" to sign in or create an account."),
        ]),
    ];
    let panel = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::NONE));
    frame.render_widget(panel, area);
}

fn post_row(post: &Post, width: usize) -> ListItem<'static> {
    let like_marker = if post.is_liked { "♥" } else { "♡" };
    let meta = format!(
        "  {} {}  {} comments  {}",
        like_marker,
        post.likes_count,
        post.comments.len(),
        format_date(post.created_at),
    );
    let title_width = width.saturating_sub(2);
    let mut spans = vec![Span::styled(
        truncate_with_ellipsis(&post.title, title_width),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if !post.is_show {
        spans.push(Span::styled(
            " [hidden]",
            Style::default().fg(Color::DarkGray),
        ));
    }
    let byline = Line::from(vec![
        Span::styled(
            format!("@{}", post.author),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(meta, Style::default().fg(Color::DarkGray)),
    ]);
    ListItem::new(vec![Line::from(spans), byline, Line::default()])
}

fn render_post_list(frame: &mut Frame, area: Rect, title: &str, posts: &[Post], selected: usize) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} "));
    if posts.is_empty() {
        let empty = Paragraph::new("Nothing here yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let width = area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = posts.iter().map(|p| post_row(p, width)).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));
    let mut list_state = ListState::default();
    list_state.select(Some(selected.min(posts.len() - 1)));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_profile(state: &TuiState, frame: &mut Frame, area: Rect) {
    let Some(bundle) = &state.profile.bundle else {
        let text = if state.profile.loading {
            "Loading profile..."
        } else {
            "No profile loaded."
        };
        frame.render_widget(
            Paragraph::new(text)
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL)),
            area,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(1)])
        .split(area);

    let profile = &bundle.profile;
    let own_profile = state.session.username() == Some(profile.username.as_str());
    let mut header = vec![
        Line::from(vec![
            Span::styled(
                profile.display_name(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  @{}", profile.username),
                Style::default().fg(Color::Cyan),
            ),
        ]),
        Line::from(Span::styled(
            format!(
                "{} followers  {} following",
                profile.followers_count, profile.following_count
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    if let Some(bio) = &profile.bio
        && !bio.is_empty()
    {
        header.push(Line::from(bio.clone()));
    }
    if !own_profile {
        let (label, color) = if profile.is_following {
            ("following  (w to unfollow)", Color::Green)
        } else {
            ("not following  (w to follow)", Color::DarkGray)
        };
        header.push(Line::from(Span::styled(label, Style::default().fg(color))));
    }
    frame.render_widget(
        Paragraph::new(header)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL)),
        chunks[0],
    );

    render_post_list(
        frame,
        chunks[1],
        "Posts",
        &bundle.posts,
        state.profile.selected,
    );
}

fn render_detail(state: &TuiState, frame: &mut Frame, area: Rect) {
    let Some(post) = &state.detail.post else {
        frame.render_widget(
            Paragraph::new("No post selected.")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL)),
            area,
        );
        return;
    };

    let comment_height = (post.comments.len() as u16 + 2).clamp(3, area.height / 3);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(comment_height),
            Constraint::Length(3),
        ])
        .split(area);

    let like_marker = if post.is_liked { "♥" } else { "♡" };
    let mut body = vec![
        Line::from(Span::styled(
            post.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(
                format!("@{}", post.author),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                format!(
                    "  {}  {} {}",
                    format_date(post.created_at),
                    like_marker,
                    post.likes_count
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::default(),
    ];
    body.extend(post.content.lines().map(|l| Line::from(l.to_string())));
    frame.render_widget(
        Paragraph::new(body)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL)),
        chunks[0],
    );

    let comments: Vec<Line> = if post.comments.is_empty() {
        vec![Line::from(Span::styled(
            "No comments yet.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        post.comments
            .iter()
            .map(|c| {
                Line::from(vec![
                    Span::styled(
                        format!("@{}: ", c.author),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::raw(c.content.clone()),
                ])
            })
            .collect()
    };
    frame.render_widget(
        Paragraph::new(comments)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Comments ({}) ", post.comments.len())),
            ),
        chunks[1],
    );

    let (border_color, title) = if state.detail.comment_focus {
        (Color::Cyan, " Comment (Enter to send, Esc to cancel) ")
    } else {
        (Color::DarkGray, " Comment (c to write) ")
    };
    let input = Paragraph::new(state.detail.comment_input.clone()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(title),
    );
    frame.render_widget(input, chunks[2]);
}

// ============================================================================
// Modal overlay
// ============================================================================

fn render_modal(state: &TuiState, modal: &Modal, frame: &mut Frame, area: Rect) {
    let height = match modal {
        Modal::Login(_) => 9,
        Modal::Register(_) => 11,
        Modal::EditProfile(_) => 11,
        Modal::Compose(_) => 14,
    };
    let popup = centered_rect(area, 50, height);
    frame.render_widget(Clear, popup);

    let mut lines = match modal {
        Modal::Login(form) => login_lines(form),
        Modal::Register(form) => register_lines(form),
        Modal::EditProfile(form) => profile_lines(form),
        Modal::Compose(form) => compose_lines(form, state),
    };

    let (error, submitting) = match modal {
        Modal::Login(f) => (&f.error, f.submitting),
        Modal::Register(f) => (&f.error, f.submitting),
        Modal::EditProfile(f) => (&f.error, f.submitting),
        Modal::Compose(f) => (&f.error, f.submitting),
    };
    if let Some(error) = error {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    } else if submitting {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Working...",
            Style::default().fg(Color::Yellow),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", modal.title()));
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        popup,
    );
}

fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let marker = if focused { "> " } else { "  " };
    let value_style = if focused {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::Gray)
    };
    Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Cyan)),
        Span::styled(format!("{label}: "), Style::default().fg(Color::DarkGray)),
        Span::styled(value.to_string(), value_style),
    ])
}

fn login_lines(form: &LoginForm) -> Vec<Line<'static>> {
    vec![
        field_line("Username", &form.username, form.focus == 0),
        field_line("Password", &"*".repeat(form.password.len()), form.focus == 1),
        Line::default(),
        Line::from(Span::styled(
            "Enter submit  Ctrl+R create account  Esc close",
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

fn register_lines(form: &RegisterForm) -> Vec<Line<'static>> {
    vec![
        field_line("Username", &form.username, form.focus == 0),
        field_line("Email (optional)", &form.email, form.focus == 1),
        field_line("Password", &"*".repeat(form.password.len()), form.focus == 2),
        Line::default(),
        Line::from(Span::styled(
            "Enter submit  Ctrl+R back to sign in  Esc close",
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

fn profile_lines(form: &ProfileForm) -> Vec<Line<'static>> {
    vec![
        field_line("First name", &form.first_name, form.focus == 0),
        field_line("Last name", &form.last_name, form.focus == 1),
        field_line("Bio", &form.bio, form.focus == 2),
        Line::default(),
        Line::from(Span::styled(
            "Enter save  Esc close",
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

fn compose_lines(form: &ComposeForm, state: &TuiState) -> Vec<Line<'static>> {
    let visibility = if form.is_show { "public" } else { "hidden" };
    let mut lines = vec![
        field_line("Title", &form.title, form.focus == 0),
        field_line("Body", &form.content, form.focus == 1),
        field_line("Category", &form.category, form.focus == 2),
        Line::from(Span::styled(
            format!("  Visibility: {visibility} (Ctrl+V toggles)"),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    if !state.categories.is_empty() {
        let names: Vec<&str> = state.categories.iter().map(|c| c.name.as_str()).collect();
        lines.push(Line::from(Span::styled(
            format!("  Categories: {}", names.join(", ")),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Ctrl+S publish  Esc close",
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

// ============================================================================
// Helpers
// ============================================================================

fn centered_rect(area: Rect, width_percent: u16, height: u16) -> Rect {
    let width = (area.width * width_percent / 100).max(30).min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

fn format_date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}
