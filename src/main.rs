//! # tdialog CLI Entry Point
//!
//! Shows one dialog per invocation and reports the result the way shell
//! scripts expect: the exit status says which button ended the dialog and
//! the data (selected tags, typed text, date, ...) goes to stderr, or to
//! stdout with `--stdout`.
//!
//! ## Usage
//!
//! ```bash
//! # Question with a default of "No"
//! tdialog --defaultno yesno "Really delete?" 0 0
//!
//! # Checklist: TAG ITEM STATUS triples
//! tdialog --title Packages checklist "Pick some" 0 0 0 \
//!     vim "Editor" on  git "VCS" off  curl "HTTP client" on
//!
//! # Two-field form: LABEL Y X ITEM Y X FLEN ILEN, positions 1-based
//! tdialog form "Account" 0 0 0 \
//!     Name 1 1 "" 1 10 20 0 \
//!     Age  2 1 "" 2 10  3 3
//!
//! # Progress from a pipeline
//! for i in 10 50 100; do echo $i; sleep 1; done | tdialog gauge "Working" 0 0
//! ```
//!
//! ## Exit status
//!
//! | Status | Meaning |
//! |---|---|
//! | 0 | OK / Yes |
//! | 1 | Cancel / No |
//! | 2 | Help |
//! | 3 | Extra |
//! | 5 | Timeout |
//! | 6+n | generic button n |
//! | 254 | error |
//! | 255 | Escape |
//!
//! Sizes follow one convention everywhere: `0` autosizes, `-1` fills the
//! screen, anything else is a literal size.

mod logging;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local, NaiveDate, NaiveTime, Timelike};
use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fmt::Write as _;
use std::io::{self, Write};
use std::panic;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tdialog::dialog::{BorderStyle, ButtonCode, DialogResult, EscapeMode, Mask, Options, Outcome, Position};
use tdialog::text::str_width;
use tdialog::ui::{Config, CrosstermEventReader, Session, Theme};
use tdialog::widgets::field::FieldFlags;
use tdialog::widgets::{FormItem, GroupKind, MenuGroup, MenuItem, MixedGaugeItem, Value, WidgetKind};
use tdialog::DialogError;

/// Exit status for errors; 255 belongs to Escape.
const ERROR_EXIT: u8 = 254;

/// tdialog - dialog boxes for shell scripts
#[derive(Parser, Debug)]
#[command(name = "tdialog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Display dialog boxes from shell scripts", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
struct CommonArgs {
    // -- frame --
    /// Title on the top border
    #[arg(long)]
    title: Option<String>,

    /// Title on the bottom border
    #[arg(long)]
    bottom_title: Option<String>,

    /// Text on the top screen line
    #[arg(long)]
    backtitle: Option<String>,

    /// Join titles to the border with tee glyphs
    #[arg(long)]
    title_ties: bool,

    #[arg(long, overrides_with = "no_shadow")]
    shadow: bool,

    #[arg(long)]
    no_shadow: bool,

    #[arg(long, value_enum)]
    border: Option<BorderArg>,

    /// Draw borders with ASCII characters
    #[arg(long)]
    ascii_lines: bool,

    /// Top-left corner of the dialog
    #[arg(long, num_args = 2, value_names = ["Y", "X"])]
    begin: Option<Vec<u16>>,

    /// Theme name (Classic, Catppuccin Mocha, Monochrome)
    #[arg(long)]
    theme: Option<String>,

    // -- buttons --
    #[arg(long)]
    ok_label: Option<String>,
    #[arg(long)]
    cancel_label: Option<String>,
    #[arg(long)]
    extra_label: Option<String>,
    #[arg(long)]
    help_label: Option<String>,
    #[arg(long)]
    yes_label: Option<String>,
    #[arg(long)]
    no_label: Option<String>,
    #[arg(long)]
    exit_label: Option<String>,

    #[arg(long)]
    no_ok: bool,

    #[arg(long)]
    no_cancel: bool,

    #[arg(long)]
    extra_button: bool,

    #[arg(long)]
    help_button: bool,

    /// Additional button; repeat for more (exit status 6, 7, ...)
    #[arg(long = "button", value_name = "LABEL")]
    buttons: Vec<String>,

    #[arg(long, value_enum)]
    default_button: Option<DefaultButtonArg>,

    /// Focus "No" first in a yes/no box
    #[arg(long)]
    defaultno: bool,

    /// Button hotkeys only move the focus instead of pressing
    #[arg(long)]
    no_shortcuts: bool,

    // -- keys --
    #[arg(long, value_enum)]
    escape: Option<EscapeArg>,

    /// File shown on F1
    #[arg(long)]
    help_file: Option<PathBuf>,

    /// Text shown on F1 when there is no help file
    #[arg(long)]
    help_message: Option<String>,

    /// End with status 5 after this many idle seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Tab walks between the list or fields and the buttons
    #[arg(long)]
    visit_items: bool,

    // -- text --
    /// Line breaks in the prompt are kept
    #[arg(long)]
    cr_wrap: bool,

    /// Do not expand the two-character "\n" escape
    #[arg(long)]
    no_nl_expand: bool,

    /// Expand tabs to tab stops
    #[arg(long)]
    tab_correct: bool,

    #[arg(long)]
    tab_len: Option<usize>,

    /// Drop leading blanks and collapse blank runs in the prompt
    #[arg(long)]
    trim: bool,

    /// Interpret "\Z" color and attribute markers
    #[arg(long)]
    colors: bool,

    // -- lists and forms --
    #[arg(long)]
    no_tags: bool,

    #[arg(long)]
    no_items: bool,

    /// Each item takes one more argument, shown on the last screen row
    #[arg(long)]
    item_help: bool,

    #[arg(long, value_name = "TAG")]
    default_item: Option<String>,

    /// Report list state and form values on every exit, not only OK
    #[arg(long)]
    report_on_any_exit: bool,

    /// Glyph drawn for each character of a secure field
    #[arg(long, value_name = "CHAR", conflicts_with = "hide_input")]
    mask: Option<char>,

    /// Draw nothing at all for secure fields
    #[arg(long)]
    hide_input: bool,

    #[arg(long)]
    max_input: Option<usize>,

    // -- teardown --
    /// Wait this many seconds before tearing the dialog down
    #[arg(long, value_name = "SECS")]
    sleep: Option<u64>,

    /// Clear the screen after the dialog
    #[arg(long)]
    clear: bool,

    /// Also report the final dialog size
    #[arg(long)]
    print_size: bool,

    // -- output --
    /// One selected tag per line, unquoted
    #[arg(long)]
    separate_output: bool,

    /// strftime format for calendar output
    #[arg(long, default_value = "%d/%m/%Y")]
    date_format: String,

    /// strftime format for timebox output
    #[arg(long, default_value = "%H:%M:%S")]
    time_format: String,

    /// Print the whole outcome as JSON
    #[arg(long)]
    json: bool,

    /// Write results to stdout and draw on stderr
    #[arg(long)]
    stdout: bool,

    /// Append diagnostics to this file (filter with TDIALOG_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BorderArg {
    Raised,
    Lowered,
    None,
}

impl From<BorderArg> for BorderStyle {
    fn from(arg: BorderArg) -> Self {
        match arg {
            BorderArg::Raised => BorderStyle::Raised,
            BorderArg::Lowered => BorderStyle::Lowered,
            BorderArg::None => BorderStyle::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EscapeArg {
    Distinct,
    Cancel,
    Disabled,
}

impl From<EscapeArg> for EscapeMode {
    fn from(arg: EscapeArg) -> Self {
        match arg {
            EscapeArg::Distinct => EscapeMode::Distinct,
            EscapeArg::Cancel => EscapeMode::Cancel,
            EscapeArg::Disabled => EscapeMode::Disabled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DefaultButtonArg {
    Ok,
    Extra,
    Cancel,
    Help,
}

impl From<DefaultButtonArg> for ButtonCode {
    fn from(arg: DefaultButtonArg) -> Self {
        match arg {
            DefaultButtonArg::Ok => ButtonCode::Ok,
            DefaultButtonArg::Extra => ButtonCode::Extra,
            DefaultButtonArg::Cancel => ButtonCode::Cancel,
            DefaultButtonArg::Help => ButtonCode::Help,
        }
    }
}

/// Prompt and requested size, shared by every widget.
#[derive(Args, Debug, Clone)]
struct BoxArgs {
    #[arg(allow_hyphen_values = true)]
    text: String,
    #[arg(allow_negative_numbers = true)]
    rows: i32,
    #[arg(allow_negative_numbers = true)]
    cols: i32,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Message with an OK button
    Msgbox(BoxArgs),
    /// Question with Yes and No buttons
    Yesno(BoxArgs),
    /// Message without buttons; returns at once
    Infobox(BoxArgs),
    /// Scrollable view of a file
    Textbox {
        file: PathBuf,
        #[arg(allow_negative_numbers = true)]
        rows: i32,
        #[arg(allow_negative_numbers = true)]
        cols: i32,
    },
    /// Pick one item: TAG ITEM pairs
    Menu {
        #[command(flatten)]
        args: BoxArgs,
        #[arg(allow_negative_numbers = true)]
        list_rows: i32,
        #[arg(allow_hyphen_values = true)]
        items: Vec<String>,
    },
    /// Toggle items: TAG ITEM STATUS triples
    Checklist {
        #[command(flatten)]
        args: BoxArgs,
        #[arg(allow_negative_numbers = true)]
        list_rows: i32,
        #[arg(allow_hyphen_values = true)]
        items: Vec<String>,
    },
    /// Pick one of several: TAG ITEM STATUS triples
    Radiolist {
        #[command(flatten)]
        args: BoxArgs,
        #[arg(allow_negative_numbers = true)]
        list_rows: i32,
        #[arg(allow_hyphen_values = true)]
        items: Vec<String>,
    },
    /// Radiolist drawn as a tree: TAG ITEM STATUS DEPTH quadruples
    Treeview {
        #[command(flatten)]
        args: BoxArgs,
        #[arg(allow_negative_numbers = true)]
        list_rows: i32,
        #[arg(allow_hyphen_values = true)]
        items: Vec<String>,
    },
    /// One line of text input
    Inputbox {
        #[command(flatten)]
        args: BoxArgs,
        #[arg(allow_hyphen_values = true)]
        init: Option<String>,
    },
    /// One line of masked input
    Passwordbox {
        #[command(flatten)]
        args: BoxArgs,
        #[arg(allow_hyphen_values = true)]
        init: Option<String>,
    },
    /// Labeled fields: LABEL Y X ITEM Y X FLEN ILEN
    Form {
        #[command(flatten)]
        args: BoxArgs,
        #[arg(allow_negative_numbers = true)]
        form_rows: i32,
        #[arg(allow_hyphen_values = true)]
        items: Vec<String>,
    },
    /// Labeled masked fields: LABEL Y X ITEM Y X FLEN ILEN
    Passwordform {
        #[command(flatten)]
        args: BoxArgs,
        #[arg(allow_negative_numbers = true)]
        form_rows: i32,
        #[arg(allow_hyphen_values = true)]
        items: Vec<String>,
    },
    /// Fields with flags: LABEL Y X ITEM Y X FLEN ILEN ITYPE (1 secure, 2 read-only)
    Mixedform {
        #[command(flatten)]
        args: BoxArgs,
        #[arg(allow_negative_numbers = true)]
        form_rows: i32,
        #[arg(allow_hyphen_values = true)]
        items: Vec<String>,
    },
    /// Progress bar fed from stdin
    Gauge {
        #[command(flatten)]
        args: BoxArgs,
        percent: Option<i32>,
    },
    /// Status rows plus an overall bar: LABEL VALUE pairs
    Mixedgauge {
        #[command(flatten)]
        args: BoxArgs,
        percent: i32,
        #[arg(allow_hyphen_values = true)]
        items: Vec<String>,
    },
    /// Pick a number in a range
    Rangebox {
        #[command(flatten)]
        args: BoxArgs,
        #[arg(allow_negative_numbers = true)]
        min: i32,
        #[arg(allow_negative_numbers = true)]
        max: i32,
        #[arg(allow_negative_numbers = true)]
        default: i32,
    },
    /// Countdown that ends with status 5
    Pause {
        #[command(flatten)]
        args: BoxArgs,
        seconds: u32,
    },
    /// Pick a date; 0 or a missing value means today
    Calendar {
        #[command(flatten)]
        args: BoxArgs,
        day: Option<u32>,
        month: Option<u32>,
        year: Option<i32>,
    },
    /// Pick a time of day; missing values mean now
    Timebox {
        #[command(flatten)]
        args: BoxArgs,
        hour: Option<u32>,
        minute: Option<u32>,
        second: Option<u32>,
    },
    /// Save theme, shadow, line, tab and Escape settings as defaults
    SaveConfig,
}

/// How a list selection is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Report {
    /// Tag under the cursor (menu).
    Focus,
    /// Every tag that is on, quoted (checklist).
    Tags,
    /// Every tag that is on, one per line (radiolist, treeview).
    Plain,
}

/// A parsed widget invocation, ready to run.
struct Request {
    kind: WidgetKind,
    text: String,
    rows: i32,
    cols: i32,
    report: Report,
    /// The dialog stays on screen after exit, so the normal screen is used.
    keep_screen: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(path) = &cli.common.log_file {
        if let Err(e) = logging::init(path) {
            eprintln!("tdialog: {e:#}");
        }
    }

    // Set up panic hook to ensure terminal is restored on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("tdialog: {e:#}");
            ExitCode::from(ERROR_EXIT)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let config = Config::load();
    if let Command::SaveConfig = cli.command {
        let path = save_config(&cli.common, config)?;
        println!("{}", path.display());
        return Ok(0);
    }

    let opts = options(&cli.common, &config);
    let theme = theme(&cli.common, &config);
    let request = request(cli.command, &cli.common)?;
    let report = request.report;

    let outcome = with_session(cli.common.stdout, request.keep_screen, theme, |session| {
        request
            .kind
            .run(session, &opts, &request.text, request.rows, request.cols)
    })?;

    let text = format_outcome(&outcome, &cli.common, report, opts.report_on_any_exit)?;
    let written = if cli.common.stdout {
        io::stdout().write_all(text.as_bytes())
    } else {
        io::stderr().write_all(text.as_bytes())
    };
    written.context("Failed to write result")?;

    Ok(outcome.result.exit_code())
}

fn save_config(args: &CommonArgs, mut config: Config) -> Result<PathBuf> {
    if let Some(name) = &args.theme {
        let theme = Theme::by_name(name).with_context(|| format!("Unknown theme: {name}"))?;
        config.theme = theme.name.to_string();
    }
    if args.no_shadow {
        config.shadow = false;
    } else if args.shadow {
        config.shadow = true;
    }
    config.ascii_lines |= args.ascii_lines;
    if let Some(tab_len) = args.tab_len {
        config.tab_len = tab_len;
    }
    if let Some(escape) = args.escape {
        config.escape = escape.into();
    }
    config.save()
}

/// Build per-call options: built-in defaults, then saved config, then flags.
fn options(args: &CommonArgs, config: &Config) -> Options {
    let mut opts = Options::default();
    config.apply(&mut opts);

    opts.title.clone_from(&args.title);
    opts.bottom_title.clone_from(&args.bottom_title);
    opts.backtitle.clone_from(&args.backtitle);
    opts.title_ties = args.title_ties;
    if args.no_shadow {
        opts.shadow = false;
    } else if args.shadow {
        opts.shadow = true;
    }
    if let Some(border) = args.border {
        opts.border = border.into();
    }
    opts.ascii_lines |= args.ascii_lines;
    if let Some([y, x]) = args.begin.as_deref() {
        opts.position = Position::At { y: *y, x: *x };
    }

    opts.ok_label.clone_from(&args.ok_label);
    opts.cancel_label.clone_from(&args.cancel_label);
    opts.extra_label.clone_from(&args.extra_label);
    opts.help_label.clone_from(&args.help_label);
    opts.yes_label.clone_from(&args.yes_label);
    opts.no_label.clone_from(&args.no_label);
    opts.exit_label.clone_from(&args.exit_label);
    opts.no_ok = args.no_ok;
    opts.no_cancel = args.no_cancel;
    opts.extra_button = args.extra_button;
    opts.help_button = args.help_button;
    opts.generic_buttons.clone_from(&args.buttons);
    opts.default_button = args.default_button.map(Into::into);
    opts.default_no = args.defaultno;
    opts.button_shortcuts = !args.no_shortcuts;

    if let Some(escape) = args.escape {
        opts.escape = escape.into();
    }
    opts.help_file.clone_from(&args.help_file);
    opts.help_message.clone_from(&args.help_message);
    opts.timeout = args.timeout.filter(|&s| s > 0).map(Duration::from_secs);
    opts.visit_items = args.visit_items;

    opts.text.cr_wrap = args.cr_wrap;
    opts.text.nl_expand = !args.no_nl_expand;
    opts.text.tab_expand = args.tab_correct;
    if let Some(tab_len) = args.tab_len {
        opts.text.tab_len = tab_len.max(1);
    }
    opts.text.trim = args.trim;
    opts.text.colors = args.colors;

    opts.no_tags = args.no_tags;
    opts.no_items = args.no_items;
    opts.item_help = args.item_help;
    opts.default_item.clone_from(&args.default_item);
    opts.report_on_any_exit = args.report_on_any_exit;
    if args.hide_input {
        opts.secure_mask = Mask::Hidden;
    } else if let Some(c) = args.mask {
        opts.secure_mask = Mask::Glyph(c);
    }
    if let Some(max) = args.max_input {
        opts.max_input = max;
    }

    opts.sleep = Duration::from_secs(args.sleep.unwrap_or(0));
    opts.clear_after = args.clear;
    opts.report_size = args.print_size;
    opts
}

fn theme(args: &CommonArgs, config: &Config) -> Theme {
    let name = args.theme.as_deref().unwrap_or(&config.theme);
    match Theme::by_name(name) {
        Some(theme) => theme.clone(),
        None => {
            tracing::warn!(name, "unknown theme, using default");
            Theme::default_theme().clone()
        }
    }
}

/// Split `items` into groups of `width`, failing on a partial group.
fn groups_of<'a>(items: &'a [String], width: usize, what: &str) -> Result<std::slice::Chunks<'a, String>> {
    if items.len() % width != 0 {
        bail!(
            "{what} items come in groups of {width} arguments, got {}",
            items.len()
        );
    }
    Ok(items.chunks(width))
}

fn number<T: std::str::FromStr>(s: &str, what: &str) -> Result<T> {
    s.trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("{what} is not a number: {s:?}"))
}

fn parse_status(s: &str) -> Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "on" | "1" | "yes" | "true" => Ok(true),
        "off" | "0" | "no" | "false" => Ok(false),
        _ => bail!("item status must be on or off, got {s:?}"),
    }
}

/// List items from TAG ITEM [STATUS] [DEPTH] [HELP] groups.
fn list_items(items: &[String], with_status: bool, with_depth: bool, item_help: bool) -> Result<Vec<MenuItem>> {
    let width = 2 + usize::from(with_status) + usize::from(with_depth) + usize::from(item_help);
    groups_of(items, width, "list")?
        .map(|chunk| {
            let mut item = MenuItem::new(chunk[0].clone(), chunk[1].clone());
            let mut next = 2;
            if with_status {
                item = item.with_on(parse_status(&chunk[next])?);
                next += 1;
            }
            if with_depth {
                item = item.with_depth(number(&chunk[next], "depth")?);
                next += 1;
            }
            if item_help {
                item = item.with_bottom_desc(chunk[next].clone());
            }
            Ok(item)
        })
        .collect()
}

/// Convert a 1-based screen coordinate to the 0-based one forms use.
fn position(s: &str) -> Result<u16> {
    let value: i32 = number(s, "position")?;
    Ok(u16::try_from(value.max(1) - 1).unwrap_or(u16::MAX))
}

/// One form field from LABEL Y X ITEM Y X FLEN ILEN [ITYPE] [HELP].
///
/// A field length of zero or below makes the field read-only, `|FLEN|`
/// wide (or as wide as its text for zero). An input length of zero means
/// the field length.
fn form_item(chunk: &[String], with_type: bool, item_help: bool) -> Result<FormItem> {
    let init = chunk[3].clone();
    let flen: i32 = number(&chunk[6], "field length")?;
    let ilen: i32 = number(&chunk[7], "input length")?;
    let itype: u32 = if with_type {
        number(&chunk[8], "item type")?
    } else {
        0
    };

    let readonly = flen <= 0 || itype & 2 != 0;
    let cols = match flen {
        0 => u16::try_from(str_width(&init)).unwrap_or(u16::MAX),
        n => u16::try_from(n.unsigned_abs()).unwrap_or(u16::MAX),
    }
    .max(1);
    let mut max_len = match usize::try_from(ilen) {
        Ok(n) if n > 0 => n,
        _ => usize::from(cols),
    };
    if readonly {
        max_len = max_len.max(init.chars().count());
    }

    let flags = FieldFlags {
        secure: itype & 1 != 0,
        readonly,
        ..FieldFlags::default()
    };
    let mut item = FormItem::new(
        chunk[0].clone(),
        (position(&chunk[1])?, position(&chunk[2])?),
        init,
        (position(&chunk[4])?, position(&chunk[5])?),
        cols,
        max_len,
    )
    .with_flags(flags);
    if item_help {
        let help = chunk.last().cloned().unwrap_or_default();
        item = item.with_bottom_desc(help);
    }
    Ok(item)
}

fn form_items(items: &[String], with_type: bool, secure: bool, item_help: bool) -> Result<Vec<FormItem>> {
    let width = 8 + usize::from(with_type) + usize::from(item_help);
    groups_of(items, width, "form")?
        .enumerate()
        .map(|(i, chunk)| {
            let mut item =
                form_item(chunk, with_type, item_help).with_context(|| format!("form item {}", i + 1))?;
            item.flags.secure |= secure;
            Ok(item)
        })
        .collect()
}

fn calendar_date(day: Option<u32>, month: Option<u32>, year: Option<i32>) -> Result<NaiveDate> {
    let today = Local::now().date_naive();
    let pick = |v: Option<u32>, now: u32| v.filter(|&v| v > 0).unwrap_or(now);
    let year = year.filter(|&y| y > 0).unwrap_or(today.year());
    let (month, day) = (pick(month, today.month()), pick(day, today.day()));
    NaiveDate::from_ymd_opt(year, month, day)
        .with_context(|| format!("invalid date {day}/{month}/{year}"))
}

fn clock_time(hour: Option<u32>, minute: Option<u32>, second: Option<u32>) -> Result<NaiveTime> {
    let now = Local::now().time();
    let (h, m, s) = (
        hour.unwrap_or(now.hour()),
        minute.unwrap_or(now.minute()),
        second.unwrap_or(now.second()),
    );
    NaiveTime::from_hms_opt(h, m, s).with_context(|| format!("invalid time {h}:{m}:{s}"))
}

fn list(args: BoxArgs, list_rows: i32, kind: GroupKind, items: Vec<MenuItem>, report: Report) -> Request {
    Request {
        kind: WidgetKind::List {
            list_rows,
            groups: vec![MenuGroup::new(kind, items)],
        },
        text: args.text,
        rows: args.rows,
        cols: args.cols,
        report,
        keep_screen: false,
    }
}

fn request(command: Command, common: &CommonArgs) -> Result<Request> {
    let simple = |kind: WidgetKind, args: BoxArgs| Request {
        kind,
        text: args.text,
        rows: args.rows,
        cols: args.cols,
        report: Report::Plain,
        keep_screen: false,
    };
    let help = common.item_help;

    let request = match command {
        Command::Msgbox(args) => simple(WidgetKind::MsgBox, args),
        Command::Yesno(args) => simple(WidgetKind::YesNo, args),
        Command::Infobox(args) => Request {
            keep_screen: true,
            ..simple(WidgetKind::InfoBox, args)
        },
        Command::Textbox { file, rows, cols } => Request {
            kind: WidgetKind::TextBox { path: file },
            text: String::new(),
            rows,
            cols,
            report: Report::Plain,
            keep_screen: false,
        },
        Command::Menu {
            args,
            list_rows,
            items,
        } => list(
            args,
            list_rows,
            GroupKind::Menu,
            list_items(&items, false, false, help)?,
            Report::Focus,
        ),
        Command::Checklist {
            args,
            list_rows,
            items,
        } => list(
            args,
            list_rows,
            GroupKind::Checklist,
            list_items(&items, true, false, help)?,
            Report::Tags,
        ),
        Command::Radiolist {
            args,
            list_rows,
            items,
        } => list(
            args,
            list_rows,
            GroupKind::Radiolist,
            list_items(&items, true, false, help)?,
            Report::Plain,
        ),
        Command::Treeview {
            args,
            list_rows,
            items,
        } => list(
            args,
            list_rows,
            GroupKind::Radiolist,
            list_items(&items, true, true, help)?,
            Report::Plain,
        ),
        Command::Inputbox { args, init } => simple(
            WidgetKind::InputBox {
                init: init.unwrap_or_default(),
                secure: false,
            },
            args,
        ),
        Command::Passwordbox { args, init } => simple(
            WidgetKind::InputBox {
                init: init.unwrap_or_default(),
                secure: true,
            },
            args,
        ),
        Command::Form {
            args,
            form_rows,
            items,
        } => simple(
            WidgetKind::Form {
                form_rows,
                items: form_items(&items, false, false, help)?,
            },
            args,
        ),
        Command::Passwordform {
            args,
            form_rows,
            items,
        } => simple(
            WidgetKind::Form {
                form_rows,
                items: form_items(&items, false, true, help)?,
            },
            args,
        ),
        Command::Mixedform {
            args,
            form_rows,
            items,
        } => simple(
            WidgetKind::Form {
                form_rows,
                items: form_items(&items, true, false, help)?,
            },
            args,
        ),
        Command::Gauge { args, percent } => simple(
            WidgetKind::Gauge {
                perc: percent.unwrap_or(0),
                input: Box::new(io::stdin().lock()),
            },
            args,
        ),
        Command::Mixedgauge {
            args,
            percent,
            items,
        } => {
            let items = groups_of(&items, 2, "mixedgauge")?
                .map(|chunk| Ok(MixedGaugeItem::new(chunk[0].clone(), number(&chunk[1], "value")?)))
                .collect::<Result<Vec<_>>>()?;
            Request {
                keep_screen: true,
                ..simple(
                    WidgetKind::MixedGauge {
                        perc: percent,
                        items,
                    },
                    args,
                )
            }
        }
        Command::Rangebox {
            args,
            min,
            max,
            default,
        } => simple(
            WidgetKind::RangeBox {
                min,
                max,
                value: default,
            },
            args,
        ),
        Command::Pause { args, seconds } => simple(WidgetKind::Pause { seconds }, args),
        Command::Calendar {
            args,
            day,
            month,
            year,
        } => simple(
            WidgetKind::Calendar {
                date: calendar_date(day, month, year)?,
            },
            args,
        ),
        Command::Timebox {
            args,
            hour,
            minute,
            second,
        } => simple(
            WidgetKind::TimeBox {
                time: clock_time(hour, minute, second)?,
            },
            args,
        ),
        Command::SaveConfig => bail!("save-config does not show a dialog"),
    };
    Ok(request)
}

type CliSession = Session<CrosstermBackend<Box<dyn Write>>>;

/// Set up the terminal, run `f`, and restore the terminal on every path.
fn with_session<T>(
    draw_on_stderr: bool,
    keep_screen: bool,
    theme: Theme,
    f: impl FnOnce(&mut CliSession) -> Result<T, DialogError>,
) -> Result<T> {
    let mut out: Box<dyn Write> = if draw_on_stderr {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };

    enable_raw_mode().context("Failed to enable raw mode")?;
    if !keep_screen {
        execute!(out, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    }
    let terminal = Terminal::new(CrosstermBackend::new(out)).context("Failed to create terminal")?;
    let mut session = Session::new(terminal, Box::new(CrosstermEventReader), theme);

    let result = f(&mut session);

    cleanup_terminal(session.terminal_mut(), keep_screen)?;
    Ok(result?)
}

/// Clean up terminal state
fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Box<dyn Write>>>, keep_screen: bool) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    if !keep_screen {
        execute!(terminal.backend_mut(), LeaveAlternateScreen).context("Failed to restore terminal")?;
    }
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Render the outcome as text for the calling script.
fn format_outcome(outcome: &Outcome<Value>, args: &CommonArgs, report: Report, any_exit: bool) -> Result<String> {
    if args.json {
        let json = serde_json::to_string(outcome).context("Failed to serialize result")?;
        return Ok(format!("{json}\n"));
    }

    let mut text = String::new();
    if let Some(size) = outcome.size {
        writeln!(text, "Size: {}, {}", size.rows, size.cols)?;
    }
    let reported = any_exit
        || matches!(
            outcome.result,
            DialogResult::Ok | DialogResult::Extra | DialogResult::Help
        );
    if !reported {
        return Ok(text);
    }

    match &outcome.value {
        Value::None => {}
        Value::Selection { on, focus } => match report {
            Report::Focus => {
                if let Some(tag) = focus {
                    writeln!(text, "{tag}")?;
                }
            }
            Report::Tags if !args.separate_output => {
                let quoted: Vec<String> = on.iter().map(|t| format!("\"{t}\"")).collect();
                writeln!(text, "{}", quoted.join(" "))?;
            }
            Report::Tags | Report::Plain => {
                for tag in on {
                    writeln!(text, "{tag}")?;
                }
            }
        },
        Value::Text(s) => writeln!(text, "{s}")?,
        Value::Values(values) => {
            for value in values {
                writeln!(text, "{value}")?;
            }
        }
        Value::Number(n) => writeln!(text, "{n}")?,
        Value::Date(date) => writeln!(text, "{}", date.format(&args.date_format))
            .with_context(|| format!("Invalid date format: {}", args.date_format))?,
        Value::Time(time) => writeln!(text, "{}", time.format(&args.time_format))
            .with_context(|| format!("Invalid time format: {}", args.time_format))?,
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tdialog::dialog::DialogSize;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    fn outcome(result: DialogResult, value: Value) -> Outcome<Value> {
        Outcome {
            result,
            value,
            size: None,
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_negative_sizes_parse() {
        let cli = Cli::try_parse_from(["tdialog", "--title", "T", "msgbox", "hi", "-1", "-1"])
            .expect("parse");
        assert_eq!(cli.common.title.as_deref(), Some("T"));
        match cli.command {
            Command::Msgbox(args) => {
                assert_eq!(args.text, "hi");
                assert_eq!((args.rows, args.cols), (-1, -1));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_checklist_items_parse() {
        let cli = Cli::try_parse_from([
            "tdialog", "checklist", "Pick", "0", "0", "0", "a", "Alpha", "on", "b", "Beta", "off",
        ])
        .expect("parse");
        let request = request(cli.command, &cli.common).expect("request");
        assert_eq!(request.report, Report::Tags);
        match request.kind {
            WidgetKind::List { groups, .. } => {
                assert_eq!(groups[0].kind, GroupKind::Checklist);
                let on: Vec<bool> = groups[0].items.iter().map(|i| i.on).collect();
                assert_eq!(on, vec![true, false]);
            }
            _ => panic!("expected a list"),
        }
    }

    #[test]
    fn test_partial_item_group_is_an_error() {
        let err = list_items(&strings(&["a", "Alpha", "on", "b"]), true, false, false).unwrap_err();
        assert!(err.to_string().contains("groups of 3"));
        assert!(parse_status("maybe").is_err());
    }

    #[test]
    fn test_item_help_takes_an_extra_argument() {
        let items = list_items(&strings(&["a", "Alpha", "first letter"]), false, false, true)
            .expect("items");
        assert_eq!(items[0].bottom_desc.as_deref(), Some("first letter"));
    }

    #[test]
    fn test_form_positions_are_one_based() {
        let chunk = strings(&["Name", "1", "1", "bob", "1", "10", "20", "0"]);
        let item = form_item(&chunk, false, false).expect("item");
        assert_eq!((item.label_y, item.label_x), (0, 0));
        assert_eq!((item.field_y, item.field_x), (0, 9));
        assert_eq!(item.cols, 20);
        assert_eq!(item.max_len, 20);
        assert!(!item.flags.readonly);
    }

    #[test]
    fn test_form_zero_length_is_readonly() {
        let chunk = strings(&["Id", "1", "1", "abc", "1", "5", "0", "0"]);
        let item = form_item(&chunk, false, false).expect("item");
        assert!(item.flags.readonly);
        assert_eq!(item.cols, 3);

        let chunk = strings(&["Pin", "2", "1", "", "2", "5", "4", "4", "1"]);
        let item = form_item(&chunk, true, false).expect("item");
        assert!(item.flags.secure);
        assert!(!item.flags.readonly);
    }

    #[test]
    fn test_passwordform_masks_every_field() {
        let items = form_items(
            &strings(&["A", "1", "1", "", "1", "4", "5", "5", "B", "2", "1", "", "2", "4", "5", "5"]),
            false,
            true,
            false,
        )
        .expect("items");
        assert!(items.iter().all(|i| i.flags.secure));
    }

    #[test]
    fn test_options_from_flags() {
        let cli = Cli::try_parse_from([
            "tdialog",
            "--no-shadow",
            "--escape",
            "cancel",
            "--begin",
            "2",
            "4",
            "--button",
            "Retry",
            "--hide-input",
            "--timeout",
            "0",
            "msgbox",
            "hi",
            "0",
            "0",
        ])
        .expect("parse");
        let opts = options(&cli.common, &Config::default());
        assert!(!opts.shadow);
        assert_eq!(opts.escape, EscapeMode::Cancel);
        assert_eq!(opts.position, Position::At { y: 2, x: 4 });
        assert_eq!(opts.generic_buttons, vec!["Retry".to_string()]);
        assert_eq!(opts.secure_mask, Mask::Hidden);
        assert_eq!(opts.timeout, None);
    }

    #[test]
    fn test_config_is_overridden_by_flags() {
        let config = Config {
            shadow: false,
            tab_len: 4,
            ..Config::default()
        };
        let args = CommonArgs {
            shadow: true,
            ..CommonArgs::default()
        };
        let opts = options(&args, &config);
        assert!(opts.shadow);
        assert_eq!(opts.text.tab_len, 4);
    }

    #[test]
    fn test_checklist_output_quoted_or_separate() {
        let value = Value::Selection {
            on: strings(&["a", "c"]),
            focus: Some("b".to_string()),
        };
        let mut args = CommonArgs::default();
        let out = outcome(DialogResult::Ok, value.clone());
        assert_eq!(
            format_outcome(&out, &args, Report::Tags, false).expect("format"),
            "\"a\" \"c\"\n"
        );
        args.separate_output = true;
        assert_eq!(
            format_outcome(&out, &args, Report::Tags, false).expect("format"),
            "a\nc\n"
        );
        assert_eq!(
            format_outcome(&out, &args, Report::Focus, false).expect("format"),
            "b\n"
        );
    }

    #[test]
    fn test_cancel_prints_nothing_unless_asked() {
        let args = CommonArgs::default();
        let out = outcome(DialogResult::Cancel, Value::Text("typed".to_string()));
        assert_eq!(format_outcome(&out, &args, Report::Plain, false).expect("format"), "");
        assert_eq!(
            format_outcome(&out, &args, Report::Plain, true).expect("format"),
            "typed\n"
        );
    }

    #[test]
    fn test_date_and_size_output() {
        let args = CommonArgs {
            date_format: "%Y-%m-%d".to_string(),
            ..CommonArgs::default()
        };
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).expect("date");
        let out = Outcome {
            result: DialogResult::Ok,
            value: Value::Date(date),
            size: Some(DialogSize { rows: 10, cols: 40 }),
        };
        assert_eq!(
            format_outcome(&out, &args, Report::Plain, false).expect("format"),
            "Size: 10, 40\n2026-10-19\n"
        );
    }

    #[test]
    fn test_json_output() {
        let args = CommonArgs {
            json: true,
            ..CommonArgs::default()
        };
        let out = outcome(DialogResult::Escape, Value::Number(7));
        assert_eq!(
            format_outcome(&out, &args, Report::Plain, false).expect("format"),
            "{\"result\":\"escape\",\"value\":{\"number\":7},\"size\":null}\n"
        );
    }

    #[test]
    fn test_calendar_defaults_and_validation() {
        let date = calendar_date(Some(29), Some(2), Some(2024)).expect("leap day");
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 2, 29).expect("date"));
        assert!(calendar_date(Some(30), Some(2), Some(2024)).is_err());
        assert!(calendar_date(None, None, None).is_ok());
        assert!(clock_time(Some(24), Some(0), Some(0)).is_err());
        assert_eq!(
            clock_time(Some(7), Some(30), Some(0)).expect("time"),
            NaiveTime::from_hms_opt(7, 30, 0).expect("time")
        );
    }
}
