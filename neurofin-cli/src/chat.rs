use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use neurofin_core::{briefing, ChatMessage, Conversation, Depth, DockTopic, Sender};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Terminal,
};
use std::collections::BTreeSet;
use std::io::{self, Stdout};
use std::sync::mpsc::Receiver;
use tokio::sync::mpsc::UnboundedSender;

use crate::responder::{ChatEvent, ChatRequest};

const HELP: &str = "Enter=send  Tab=next suggestion  Esc=quit  ?=toggle help\n\
Commands: /help  /brief <topic> [insights|explain|actions]  /clear";

/// Chat session state, independent of the terminal.
pub struct ChatApp {
    conversation: Conversation,
    input: String,
    pending: BTreeSet<u64>,
    next_request: u64,
    last_brief: Option<DockTopic>,
    chip_cursor: usize,
    notice: Option<String>,
    show_help: bool,
}

impl Default for ChatApp {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatApp {
    pub fn new() -> Self {
        Self {
            conversation: Conversation::new(),
            input: String::new(),
            pending: BTreeSet::new(),
            next_request: 1,
            last_brief: None,
            chip_cursor: 0,
            notice: None,
            show_help: true,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn is_thinking(&self) -> bool {
        !self.pending.is_empty()
    }

    #[cfg(test)]
    fn set_input(&mut self, s: &str) {
        self.input = s.to_string();
    }

    /// Send the input line. Returns a request when the coach should answer.
    pub fn submit(&mut self) -> Option<ChatRequest> {
        let text = self.input.trim().to_string();
        self.input.clear();
        self.notice = None;
        self.chip_cursor = 0;
        if text.is_empty() {
            return None;
        }

        if text.starts_with('/') {
            self.handle_slash(&text);
            return None;
        }

        // Depth chips under a briefing navigate that briefing
        if let (Some(topic), Some(depth)) = (self.last_brief, Depth::from_chip(&text)) {
            self.conversation.push_user(text);
            self.conversation.push_briefing(briefing(topic, depth));
            return None;
        }

        self.last_brief = None;
        self.conversation.push_user(text.clone());
        let request_id = self.next_request;
        self.next_request += 1;
        self.pending.insert(request_id);
        Some(ChatRequest { request_id, text })
    }

    pub fn on_event(&mut self, ev: ChatEvent) {
        match ev {
            ChatEvent::Thinking { request_id } => {
                self.pending.insert(request_id);
            }
            ChatEvent::Replied { request_id, reply } => {
                self.pending.remove(&request_id);
                self.conversation.push_reply(reply);
            }
        }
    }

    /// Put the next suggestion chip of the latest coach message in the input.
    pub fn cycle_chip(&mut self) {
        let chips = self
            .conversation
            .messages()
            .iter()
            .rev()
            .find(|m| m.sender == Sender::Ai)
            .map(|m| m.chips.as_slice())
            .unwrap_or_default();
        if chips.is_empty() {
            return;
        }
        self.input = chips[self.chip_cursor % chips.len()].clone();
        self.chip_cursor += 1;
    }

    fn handle_slash(&mut self, cmd: &str) {
        let mut parts = cmd.split_whitespace();
        match parts.next().unwrap_or_default() {
            "/help" => self.notice = Some(HELP.to_string()),
            "/clear" => {
                self.conversation = Conversation::new();
                self.last_brief = None;
            }
            "/brief" => {
                let topic = parts.next().map(str::parse::<DockTopic>);
                let depth = parts.next().map(str::parse::<Depth>).unwrap_or(Ok(Depth::default()));
                match (topic, depth) {
                    (Some(Ok(topic)), Ok(depth)) => {
                        self.conversation.push_user(cmd);
                        self.conversation.push_briefing(briefing(topic, depth));
                        self.last_brief = Some(topic);
                    }
                    (Some(Err(e)), _) | (_, Err(e)) => self.notice = Some(e.to_string()),
                    (None, _) => {
                        let topics: Vec<&str> = DockTopic::ALL.iter().map(|t| t.as_str()).collect();
                        self.notice = Some(format!("Usage: /brief <{}>", topics.join("|")));
                    }
                }
            }
            other => self.notice = Some(format!("Unknown command {other}. Try /help")),
        }
    }
}

pub fn run_chat(
    requests: UnboundedSender<ChatRequest>,
    events: Receiver<ChatEvent>,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = chat_loop(&mut terminal, &requests, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

fn chat_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    requests: &UnboundedSender<ChatRequest>,
    events: &Receiver<ChatEvent>,
) -> Result<()> {
    let mut app = ChatApp::new();

    loop {
        for ev in events.try_iter() {
            app.on_event(ev);
        }

        terminal.draw(|f| {
            let size = f.area();
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(4),
                    Constraint::Min(5),
                    Constraint::Length(3),
                ])
                .split(size);

            let splash = Paragraph::new(Text::from(vec![
                Line::from(Span::styled(
                    "NeuroFin AI Coach",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    "type /help or ? for shortcuts",
                    Style::default().fg(Color::Gray),
                )),
            ]))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
            f.render_widget(splash, chunks[0]);

            let mut lines: Vec<Line> = Vec::new();
            if app.show_help {
                for l in HELP.lines() {
                    lines.push(Line::from(Span::styled(l, Style::default().fg(Color::Gray))));
                }
                lines.push(Line::raw(""));
            }
            for m in app.conversation.messages() {
                render_message(m, &mut lines);
            }
            if app.is_thinking() {
                lines.push(Line::from(Span::styled(
                    "coach is thinking...",
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
            }
            if let Some(n) = &app.notice {
                for l in n.lines() {
                    lines.push(Line::from(Span::styled(l.to_string(), Style::default().fg(Color::Yellow))));
                }
            }

            // keep the tail in view
            let visible = chunks[1].height.saturating_sub(2) as usize;
            let skip = lines.len().saturating_sub(visible);
            let history = Paragraph::new(Text::from(lines.split_off(skip)))
                .block(Block::default().borders(Borders::ALL).title("conversation"))
                .wrap(Wrap { trim: false });
            f.render_widget(history, chunks[1]);

            let input_widget = Paragraph::new(app.input.as_str())
                .block(Block::default().borders(Borders::ALL).title("message"))
                .style(Style::default().fg(Color::White));
            f.render_widget(input_widget, chunks[2]);
        })?;

        if event::poll(std::time::Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Esc => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Char('?') if app.input.is_empty() => {
                        app.show_help = !app.show_help;
                    }
                    KeyCode::Tab => app.cycle_chip(),
                    KeyCode::Enter => {
                        if let Some(req) = app.submit() {
                            if requests.send(req).is_err() {
                                app.notice = Some("Coach worker stopped.".to_string());
                            }
                        }
                    }
                    KeyCode::Backspace => {
                        app.input.pop();
                    }
                    KeyCode::Char(c) => {
                        app.input.push(c);
                    }
                    _ => {}
                }
            }
        }
    }

    Ok(())
}

fn render_message(m: &ChatMessage, lines: &mut Vec<Line<'static>>) {
    let (tag, color) = match m.sender {
        Sender::User => ("you", Color::Cyan),
        Sender::Ai => ("coach", Color::Magenta),
    };
    if let Some(title) = &m.title {
        lines.push(Line::from(vec![
            Span::styled(format!("{tag}: "), Style::default().fg(color)),
            Span::styled(title.clone(), Style::default().add_modifier(Modifier::BOLD)),
        ]));
    } else {
        lines.push(Line::from(Span::styled(format!("{tag}:"), Style::default().fg(color))));
    }
    for l in m.text.as_deref().unwrap_or_default().lines() {
        lines.push(Line::raw(format!("  {l}")));
    }
    if !m.chips.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("  [{}]", m.chips.join("] [")),
            Style::default().fg(Color::Green),
        )));
    }
    lines.push(Line::raw(""));
}

#[cfg(test)]
mod tests {
    use super::*;
    use neurofin_core::{ChartKind, Reply, Topic};

    fn reply() -> Reply {
        Reply {
            topic: Topic::Tips,
            title: "Smart Money Tips".to_string(),
            text: "Meal prep on Sundays".to_string(),
            chart: ChartKind::Tips,
            chips: vec!["Show my spending breakdown".to_string()],
        }
    }

    #[test]
    fn test_submit_creates_request() {
        let mut app = ChatApp::new();
        app.set_input("  give me tips  ");
        let req = app.submit().unwrap();
        assert_eq!(req.request_id, 1);
        assert_eq!(req.text, "give me tips");
        assert!(app.is_thinking());
        assert_eq!(app.conversation().len(), 2);

        app.on_event(ChatEvent::Replied { request_id: 1, reply: reply() });
        assert!(!app.is_thinking());
        assert_eq!(app.conversation().last().unwrap().sender, Sender::Ai);
    }

    #[test]
    fn test_blank_input_sends_nothing() {
        let mut app = ChatApp::new();
        app.set_input("   ");
        assert!(app.submit().is_none());
        assert_eq!(app.conversation().len(), 1);
    }

    #[test]
    fn test_brief_and_chip_navigation_stay_local() {
        let mut app = ChatApp::new();
        app.set_input("/brief savings");
        assert!(app.submit().is_none());
        let title = app.conversation().last().unwrap().title.clone();
        assert_eq!(title.as_deref(), Some("savings: Key Insights"));

        app.cycle_chip();
        assert_eq!(app.input, "Explain more");
        assert!(app.submit().is_none());
        let title = app.conversation().last().unwrap().title.clone();
        assert_eq!(title.as_deref(), Some("savings: Detailed Breakdown"));
    }

    #[test]
    fn test_bad_slash_commands_leave_a_notice() {
        let mut app = ChatApp::new();
        app.set_input("/brief crypto");
        app.submit();
        assert_eq!(app.notice.as_deref(), Some("unknown topic: crypto"));

        app.set_input("/dance");
        app.submit();
        assert!(app.notice.as_deref().unwrap().contains("Unknown command"));
        assert_eq!(app.conversation().len(), 1);
    }

    #[test]
    fn test_cycle_chip_wraps() {
        let mut app = ChatApp::new();
        for _ in 0..5 {
            app.cycle_chip();
        }
        // welcome offers four quick questions; the fifth press wraps around
        assert_eq!(app.input, neurofin_core::QUICK_QUESTIONS[0]);
    }
}
