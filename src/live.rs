//! The `watch` event loop: poller ticks and keyboard commands drive one
//! [`ReportScreen`] on the calling thread.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::Result;
use crate::format::Formatter;
use crate::render::to_text;
use crate::report::ReportSource;
use crate::screen::ReportScreen;
use crate::view::Tab;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SelectTab(Tab),
    Refresh,
    Back,
}

impl Command {
    /// Parse one input line; unknown input yields `None`
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "p" | "paid" | "pagadas" => Some(Command::SelectTab(Tab::Paid)),
            "u" | "unpaid" | "pendientes" => Some(Command::SelectTab(Tab::Unpaid)),
            "r" | "refresh" | "actualizar" => Some(Command::Refresh),
            "q" | "b" | "back" | "quit" | "salir" => Some(Command::Back),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum Event {
    Tick,
    Key(Command),
    InputClosed,
}

/// Repeating fetch timer. Stops and joins its thread when dropped.
pub struct Poller {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn start(interval: Duration, events: Sender<Event>) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    if events.send(Event::Tick).is_err() {
                        break;
                    }
                }
                _ => break,
            }
        });

        Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        // disconnecting the stop channel wakes the thread
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("poller thread panicked");
            }
        }
    }
}

/// Forward parsed input lines to the loop.
///
/// The reader thread is detached: it may stay blocked on a read after the
/// loop has returned, and exits on EOF or on the next line once the channel is gone.
fn spawn_input<R: BufRead + Send + 'static>(input: R, events: Sender<Event>) {
    thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else { break };
            match Command::parse(&line) {
                Some(command) => {
                    if events.send(Event::Key(command)).is_err() {
                        return;
                    }
                }
                None => log::debug!("ignoring input {line:?}"),
            }
        }
        let _ = events.send(Event::InputClosed);
    });
}

/// Move everything already queued behind a poll into `pending`, dropping ticks.
///
/// Ticks that piled up while a slow fetch blocked the loop collapse into the
/// poll that just ran; other events keep their order.
fn coalesce_ticks(rx: &Receiver<Event>, pending: &mut VecDeque<Event>) {
    let mut dropped = 0usize;
    for event in rx.try_iter() {
        match event {
            Event::Tick => dropped += 1,
            other => pending.push_back(other),
        }
    }
    if dropped > 0 {
        log::debug!("dropped {dropped} queued poll tick(s)");
    }
}

pub struct WatchOptions {
    pub interval: Duration,
    /// Clear the terminal before each frame
    pub clear: bool,
}

fn draw<S: ReportSource, W: Write>(
    out: &mut W,
    screen: &ReportScreen<S>,
    fmt: &dyn Formatter,
    clear: bool,
) -> io::Result<()> {
    if clear {
        write!(out, "\x1b[2J\x1b[H")?;
    } else {
        writeln!(out, "{}", "-".repeat(50))?;
    }
    write!(out, "{}", to_text(&screen.frame(fmt), fmt))?;
    writeln!(out, "{}", fmt.labels().keys_hint)?;
    out.flush()
}

/// Run the live screen until the user goes back or input ends.
///
/// The report is fetched on mount and then on every poller tick; the poller
/// is torn down before returning.
pub fn run<S, R, W>(
    screen: &mut ReportScreen<S>,
    input: R,
    out: &mut W,
    fmt: &dyn Formatter,
    options: &WatchOptions,
) -> Result<()>
where
    S: ReportSource,
    R: BufRead + Send + 'static,
    W: Write,
{
    let (tx, rx) = mpsc::channel();
    spawn_input(input, tx.clone());

    draw(out, screen, fmt, options.clear)?;
    screen.mount();
    let _poller = Poller::start(options.interval, tx);
    draw(out, screen, fmt, options.clear)?;

    let mut pending = VecDeque::new();
    loop {
        let event = match pending.pop_front() {
            Some(event) => event,
            None => match rx.recv() {
                Ok(event) => event,
                Err(_) => break,
            },
        };

        match event {
            Event::Tick => {
                log::debug!("poll tick");
                screen.poll();
                coalesce_ticks(&rx, &mut pending);
            }
            Event::Key(Command::SelectTab(tab)) => screen.select_tab(tab),
            Event::Key(Command::Refresh) => {
                let mut drawn: io::Result<()> = Ok(());
                screen.refresh_with(|s| drawn = draw(out, s, fmt, options.clear));
                drawn?;
            }
            Event::Key(Command::Back) | Event::InputClosed => {
                screen.back();
                break;
            }
        }
        draw(out, screen, fmt, options.clear)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::format::{Locale, LocaleFormatter};
    use crate::report::{MaintenanceReport, Totals};
    use std::io::Cursor;
    use std::time::Instant;

    struct Counting(usize);

    impl ReportSource for Counting {
        fn fetch(&mut self) -> std::result::Result<MaintenanceReport, FetchError> {
            self.0 += 1;
            Ok(MaintenanceReport {
                period: None,
                paid_records: Vec::new(),
                unpaid_records: Vec::new(),
                totals: Totals::default(),
            })
        }
    }

    fn options() -> WatchOptions {
        WatchOptions {
            interval: Duration::from_secs(3600),
            clear: false,
        }
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse(" P "), Some(Command::SelectTab(Tab::Paid)));
        assert_eq!(Command::parse("pendientes"), Some(Command::SelectTab(Tab::Unpaid)));
        assert_eq!(Command::parse("r"), Some(Command::Refresh));
        assert_eq!(Command::parse("salir"), Some(Command::Back));
        assert_eq!(Command::parse("x"), None);
    }

    #[test]
    fn tab_keys_do_not_fetch_and_refresh_does() {
        let mut screen = ReportScreen::new(Counting(0), Tab::Unpaid);
        let fmt = LocaleFormatter::new(Locale::EnUs, "$");
        let mut out = Vec::new();
        let input = Cursor::new("p\nu\np\nr\nq\n");

        run(&mut screen, input, &mut out, &fmt, &options()).unwrap();

        // mount + one manual refresh
        assert_eq!(screen.fetch_count(), 2);
        assert_eq!(screen.view().active_tab, Tab::Paid);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Refreshing..."));
        assert!(text.contains("No payments recorded this period"));
    }

    #[test]
    fn input_eof_leaves_the_screen() {
        let mut screen = ReportScreen::new(Counting(0), Tab::Unpaid);
        let fmt = LocaleFormatter::default();
        let mut out = Vec::new();
        run(&mut screen, Cursor::new(""), &mut out, &fmt, &options()).unwrap();
        assert_eq!(screen.fetch_count(), 1);
    }

    #[test]
    fn queued_ticks_collapse_into_one_poll() {
        let (tx, rx) = mpsc::channel();
        tx.send(Event::Tick).unwrap();
        tx.send(Event::Key(Command::SelectTab(Tab::Paid))).unwrap();
        tx.send(Event::Tick).unwrap();
        tx.send(Event::Tick).unwrap();
        tx.send(Event::Key(Command::Back)).unwrap();

        let mut pending = VecDeque::new();
        coalesce_ticks(&rx, &mut pending);

        assert_eq!(pending.len(), 2);
        assert!(matches!(
            pending[0],
            Event::Key(Command::SelectTab(Tab::Paid))
        ));
        assert!(matches!(pending[1], Event::Key(Command::Back)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn poller_ticks_and_stops_on_drop() {
        let (tx, rx) = mpsc::channel();
        let poller = Poller::start(Duration::from_millis(10), tx);
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)),
            Ok(Event::Tick)
        ));

        let started = Instant::now();
        drop(poller);
        assert!(started.elapsed() < Duration::from_secs(5));
        // the thread has exited, so the channel drains and disconnects
        while rx.try_recv().is_ok() {}
        assert!(matches!(
            rx.recv_timeout(Duration::from_millis(50)),
            Err(RecvTimeoutError::Disconnected)
        ));
    }
}
