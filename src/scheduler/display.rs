use super::{runner::RunnerEvent, Process, Snapshot};
use crossterm::event::{self, Event, KeyCode, KeyEvent};
use std::{
    io::{self, Stdout},
    sync::mpsc::{self, Receiver},
    thread,
    time::{Duration, Instant},
};
use tui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Sparkline, Table},
    Terminal,
};
use tracing::warn;

pub enum DisplayEvent {
    Input(KeyEvent),
    Tick,
}

/// Redraw cadence, independent of the simulation tick.
const TICK_RATE: Duration = Duration::from_millis(16);

/// Status line flags that are not part of a snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayState {
    pub paused: bool,
    pub finished: bool,
}

pub struct DisplayTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    input_rx: Receiver<DisplayEvent>,
}

fn format_time(time: Option<f64>) -> String {
    time.map(|t| format!("{t:.2}")).unwrap_or_else(|| "-".to_owned())
}

fn ready_row(process: &Process) -> Row<'static> {
    Row::new(vec![
        Cell::from(process.pid().to_string()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(format!("{:.2}", process.arrival_time())),
        Cell::from(format!("{:.2}", process.burst_time())),
        Cell::from(format!("{:.2}", process.remaining_time())),
        Cell::from(process.priority().to_string()),
        Cell::from(format_time(process.period())),
        Cell::from(format_time(process.deadline())),
    ])
}

fn completed_row(process: &Process) -> Row<'static> {
    Row::new(vec![
        Cell::from(process.pid().to_string()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(format!("{:.2}", process.arrival_time())),
        Cell::from(format!("{:.2}", process.burst_time())),
        Cell::from(format_time(process.start_time())),
        Cell::from(format_time(process.completion_time())),
        Cell::from(format!("{:.2}", process.turnaround_time())),
        Cell::from(format!("{:.2}", process.waiting_time())),
    ])
}

impl DisplayTerminal {
    pub fn new() -> Result<Self, io::Error> {
        // Set up the input handling thread
        let (input_tx, input_rx) = mpsc::channel();
        thread::Builder::new()
            .name("tui-input".to_owned())
            .spawn(move || {
                let mut last_tick = Instant::now();
                loop {
                    let timeout = TICK_RATE
                        .checked_sub(last_tick.elapsed())
                        .unwrap_or(Duration::ZERO);

                    match event::poll(timeout) {
                        Ok(true) => match event::read() {
                            Ok(Event::Key(key)) => {
                                if input_tx.send(DisplayEvent::Input(key)).is_err() {
                                    return;
                                }
                            }
                            Ok(_) => {}
                            Err(e) => {
                                warn!(error = %e, "Failed to read terminal events");
                                return;
                            }
                        },
                        Ok(false) => {}
                        Err(e) => {
                            warn!(error = %e, "Failed to poll terminal events");
                            return;
                        }
                    }

                    if last_tick.elapsed() >= TICK_RATE {
                        if input_tx.send(DisplayEvent::Tick).is_err() {
                            return;
                        }
                        last_tick = Instant::now();
                    }
                }
            })?;

        // Set up the terminal-user-interface
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;

        // Last fallible step, so `Drop` is always there to undo it.
        crossterm::terminal::enable_raw_mode()?;
        Ok(Self { terminal, input_rx })
    }

    pub fn draw(
        &mut self,
        snapshot: Option<&Snapshot>,
        history: &[u64],
        state: DisplayState,
    ) -> Result<(), io::Error> {
        self.terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(1)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Length(3),
                    Constraint::Min(6),
                    Constraint::Length(6),
                ])
                .split(f.size());

            let status = if state.finished {
                "FINISHED"
            } else if state.paused {
                "PAUSED"
            } else {
                "RUNNING"
            };

            let header = match snapshot {
                Some(s) => format!(
                    "[{status}] t={:.2} | switches: {} | completed: {} | misses: {} | avg turnaround {:.2} | avg waiting {:.2} | avg response {:.2} | throughput {:.3}",
                    s.time,
                    s.process_switch_count,
                    s.metrics.completed,
                    s.deadline_misses,
                    s.metrics.average_turnaround,
                    s.metrics.average_waiting,
                    s.metrics.average_response,
                    s.metrics.throughput,
                ),
                None => format!("[{status}] waiting for the first snapshot"),
            };
            let title = snapshot.map(|s| s.algorithm).unwrap_or("Simulation");
            let header = Paragraph::new(header).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_type(BorderType::Rounded),
            );
            f.render_widget(header, chunks[0]);

            let running = Paragraph::new(match snapshot.and_then(|s| s.running.as_ref()) {
                Some(process) => format!(
                    "{} | remaining {:.2} / {:.2} | quantum used {:.2} | priority {}",
                    process.pid(),
                    process.remaining_time(),
                    process.burst_time(),
                    process.time_in_current_quantum(),
                    process.priority(),
                ),
                None => "No process is currently running.".to_owned(),
            })
            .style(
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .fg(Color::LightBlue),
            )
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Running Process")
                    .border_type(BorderType::Rounded),
            );
            f.render_widget(running, chunks[1]);

            let tables = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(chunks[2]);

            let widths = [
                Constraint::Length(5),
                Constraint::Length(8),
                Constraint::Length(8),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(8),
            ];

            let ready_rows: Vec<Row> = snapshot
                .map(|s| s.ready.iter().map(ready_row).collect())
                .unwrap_or_default();
            let ready = Table::new(ready_rows)
                .header(
                    Row::new(vec!["PID", "Arrival", "Burst", "Remaining", "Priority", "Period", "Deadline"])
                        .style(Style::default().add_modifier(Modifier::BOLD)),
                )
                .widths(&widths)
                .block(Block::default().title("Ready").borders(Borders::ALL))
                .style(Style::default().fg(Color::LightGreen))
                .column_spacing(1);
            f.render_widget(ready, tables[0]);

            // Newest first so the latest completions stay visible.
            let completed_rows: Vec<Row> = snapshot
                .map(|s| s.completed.iter().rev().map(completed_row).collect())
                .unwrap_or_default();
            let completed = Table::new(completed_rows)
                .header(
                    Row::new(vec!["PID", "Arrival", "Burst", "Start", "Completion", "Turnaround", "Waiting"])
                        .style(Style::default().add_modifier(Modifier::BOLD)),
                )
                .widths(&widths)
                .block(Block::default().title("Completed").borders(Borders::ALL))
                .style(Style::default().fg(Color::LightYellow))
                .column_spacing(1);
            f.render_widget(completed, tables[1]);

            let sparkline = Sparkline::default()
                .block(
                    Block::default()
                        .title("Completed over time")
                        .borders(Borders::ALL),
                )
                .data(history)
                .style(Style::default().fg(Color::LightMagenta));
            f.render_widget(sparkline, chunks[3]);
        })?;
        Ok(())
    }

    pub fn get_input(&self) -> RunnerEvent {
        // Get the user's input and return a matching event
        match self.input_rx.recv() {
            Ok(DisplayEvent::Input(key)) => {
                if key.modifiers.is_empty() {
                    match key.code {
                        KeyCode::Char('q') => return RunnerEvent::Quit,
                        KeyCode::Char('p') => return RunnerEvent::Pause,
                        KeyCode::Char('r') => return RunnerEvent::Resume,
                        KeyCode::Char('s') => return RunnerEvent::Step,
                        _ => {}
                    };
                }
            }
            Ok(DisplayEvent::Tick) => {}
            // The input thread is gone; nothing can drive the display anymore.
            Err(_) => return RunnerEvent::Quit,
        }
        RunnerEvent::None
    }
}

impl Drop for DisplayTerminal {
    fn drop(&mut self) {
        let _ = crossterm::terminal::disable_raw_mode();
    }
}
