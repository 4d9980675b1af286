extern crate datepicker as lib;

use chrono::{Local, NaiveDate};
use flexi_logger::{FileSpec, Logger};
use lib::command::{parse_command, parse_date, Command};
use lib::config::Theme;
use lib::events::{Dispatcher, Event};
use lib::ui::MonthPane;
use lib::{DatePicker, Direction, MemoryDocument, Selection};
use std::cell::Cell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "dp",
    author = "Julian Bigge <j.reedts@gmail.com>",
    about = "A month view date picker for the terminal."
)]
pub struct Args {
    #[structopt(
        name = "CONFIG",
        short = "c",
        long = "config",
        help = "path to config file",
        parse(from_os_str)
    )]
    pub configfile: Option<PathBuf>,

    #[structopt(
        short = "d",
        long = "date",
        help = "month to show first, as YYYY-MM or YYYY-MM-DD",
        parse(try_from_str = parse_date)
    )]
    pub date: Option<NaiveDate>,

    #[structopt(
        short = "s",
        long = "show",
        help = "only show the month non-interactively"
    )]
    pub show: bool,

    #[structopt(long = "html", help = "print the rendered markup instead of text")]
    pub html: bool,

    #[structopt(long = "exit-on-select", help = "quit after the first selection")]
    pub exit_on_select: bool,

    #[structopt(long = "log-file", help = "path to log file", parse(from_os_str))]
    pub log_file: Option<PathBuf>,
}

fn draw<F>(picker: &DatePicker<MemoryDocument, F>, theme: &Theme, html: bool)
where
    F: FnMut(&str, Selection),
{
    if html {
        println!("{}", picker.document().to_markup(picker.container()));
    } else {
        print!(
            "{}",
            MonthPane::new(picker.document(), picker.container(), theme)
                .today(Local::now().date_naive())
                .draw()
        );
    }
}

/// Returns `false` once the user asked to quit.
fn execute<F>(picker: &mut DatePicker<MemoryDocument, F>, cmd: Command) -> bool
where
    F: FnMut(&str, Selection),
{
    match cmd {
        Command::Prev | Command::Next => {
            let direction = if cmd == Command::Prev {
                Direction::Prev
            } else {
                Direction::Next
            };
            if let Some(control) = picker.control(direction) {
                picker.activate(control);
            }
        }
        Command::Select(day) => match picker.day_cell(day) {
            Some(cell) => {
                picker.activate(cell);
            }
            None => eprintln!("{} has no day {}", picker.state(), day),
        },
        Command::Goto(date) => picker.render(date),
        Command::Show => {}
        Command::Quit => return false,
    }

    true
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::from_args();

    const DEFAULT_LOG_LEVEL: &'static str = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let mut logger = Logger::try_with_env_or_str(DEFAULT_LOG_LEVEL)?;

    if let Some(log_file) = &args.log_file {
        logger = logger
            .log_to_file(FileSpec::try_from(log_file)?)
            .print_message();
    }

    logger.start()?;

    std::panic::set_hook(Box::new(move |info| {
        println!("{}", termion::style::Reset);

        println!("dp ran into a fatal error!");
        println!(
            "Consider filing an issue with a log file and the backtrace below at {}",
            env!("CARGO_PKG_REPOSITORY")
        );

        println!("{}", info);
        println!("{:?}", backtrace::Backtrace::new());
    }));

    let config = lib::config::load_suitable_config(args.configfile.as_deref())?;

    let mut theme = config.theme.clone();
    theme.colors = theme.colors && !args.html && termion::is_tty(&io::stdout());

    let mut document = MemoryDocument::new();
    document.append_element("div", &config.container_id);

    let selected: Rc<Cell<Option<Selection>>> = Rc::new(Cell::new(None));
    let on_select = {
        let selected = Rc::clone(&selected);
        move |id: &str, selection: Selection| {
            println!("Selected {}: {}", id, selection);
            selected.set(Some(selection));
        }
    };

    let mut picker = DatePicker::new(document, &config.container_id, on_select)?
        .labels(config.theme.labels());

    picker.render(args.date.unwrap_or_else(|| Local::now().date_naive()));
    draw(&picker, &theme, args.html);

    if args.show {
        return Ok(());
    }

    let dispatcher = Dispatcher::default();

    loop {
        match dispatcher.next()? {
            Event::Eof => break,
            Event::Input(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                let cmd = match parse_command(&line) {
                    Ok(cmd) => cmd,
                    Err(e) => {
                        log::warn!("{}", e);
                        eprintln!("{}", e);
                        continue;
                    }
                };

                if !execute(&mut picker, cmd) {
                    break;
                }

                if args.exit_on_select && selected.get().is_some() {
                    break;
                }

                draw(&picker, &theme, args.html);
            }
        }
    }

    Ok(())
}
