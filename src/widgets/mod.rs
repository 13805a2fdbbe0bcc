//! # Widgets
//!
//! Each widget is a state type implementing
//! [`DialogWidget`](crate::dialog::DialogWidget) plus one or
//! more entry points of the shape
//!
//! ```text
//! fn widget<B: Backend>(session, opts, text, rows, cols, extra...) -> Result<Outcome<T>, DialogError>
//! ```
//!
//! [`WidgetKind`] wraps all of them behind one tagged value so a front end
//! can map its flags to a kind and run it without knowing the entry points.

pub mod bar;
pub mod calendar;
pub mod field;
pub mod form;
pub mod gauge;
pub mod menu;
pub mod msgbox;
pub mod nav;
pub mod range;
pub mod textbox;

use crate::dialog::{Dialog, Options, Outcome};
use crate::error::DialogError;
use crate::ui::Session;
use chrono::{NaiveDate, NaiveTime};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::Backend;
use serde::Serialize;
use std::io::BufRead;
use std::path::PathBuf;

pub use form::{FormItem, FormOutcome};
pub use gauge::{GaugeStream, MixedGaugeItem, Status};
pub use menu::{GroupKind, MenuFocus, MenuGroup, MenuItem, MenuOutcome};

/// A key with no Ctrl/Alt modifier.
pub(crate) fn is_plain_char(key: &KeyEvent) -> bool {
    !key.modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

/// Hand focus to the button row: first button going forward, last going back.
pub(crate) fn to_buttons(dialog: &mut Dialog, forward: bool) {
    let index = if forward { 0 } else { dialog.buttons.len() - 1 };
    dialog.buttons.focus(index);
}

/// True when `key` walks off either end of the button row.
pub(crate) fn leave_buttons(dialog: &Dialog, key: &KeyEvent) -> bool {
    let last = dialog.buttons.len() - 1;
    match key.code {
        KeyCode::Tab => dialog.buttons.current_index() == last,
        KeyCode::BackTab => dialog.buttons.current_index() == 0,
        _ => false,
    }
}

/// One constructor per widget type.
pub enum WidgetKind {
    MsgBox,
    YesNo,
    InfoBox,
    TextBox {
        path: PathBuf,
    },
    /// Menus, checklists, radiolists, trees and mixed lists.
    List {
        list_rows: i32,
        groups: Vec<MenuGroup>,
    },
    Form {
        form_rows: i32,
        items: Vec<FormItem>,
    },
    InputBox {
        init: String,
        secure: bool,
    },
    Gauge {
        perc: i32,
        input: Box<dyn BufRead>,
    },
    MixedGauge {
        perc: i32,
        items: Vec<MixedGaugeItem>,
    },
    RangeBox {
        min: i32,
        max: i32,
        value: i32,
    },
    Pause {
        seconds: u32,
    },
    Calendar {
        date: NaiveDate,
    },
    TimeBox {
        time: NaiveTime,
    },
}

/// Data produced by a widget, in a shape any front end can print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    None,
    /// Names of the items left on, and the item under the cursor.
    Selection {
        on: Vec<String>,
        focus: Option<String>,
    },
    Text(String),
    Values(Vec<String>),
    Number(i32),
    Date(NaiveDate),
    Time(NaiveTime),
}

impl WidgetKind {
    pub fn name(&self) -> &'static str {
        match self {
            WidgetKind::MsgBox => "msgbox",
            WidgetKind::YesNo => "yesno",
            WidgetKind::InfoBox => "infobox",
            WidgetKind::TextBox { .. } => "textbox",
            WidgetKind::List { .. } => "list",
            WidgetKind::Form { .. } => "form",
            WidgetKind::InputBox { .. } => "inputbox",
            WidgetKind::Gauge { .. } => "gauge",
            WidgetKind::MixedGauge { .. } => "mixedgauge",
            WidgetKind::RangeBox { .. } => "rangebox",
            WidgetKind::Pause { .. } => "pause",
            WidgetKind::Calendar { .. } => "calendar",
            WidgetKind::TimeBox { .. } => "timebox",
        }
    }

    /// Run the widget and convert its data into a [`Value`].
    pub fn run<B: Backend>(
        self,
        session: &mut Session<B>,
        opts: &Options,
        text: &str,
        rows: i32,
        cols: i32,
    ) -> Result<Outcome<Value>, DialogError> {
        tracing::debug!(widget = self.name(), rows, cols, "running widget");
        match self {
            WidgetKind::MsgBox => {
                Ok(msgbox::msgbox(session, opts, text, rows, cols)?.map(|()| Value::None))
            }
            WidgetKind::YesNo => {
                Ok(msgbox::yesno(session, opts, text, rows, cols)?.map(|()| Value::None))
            }
            WidgetKind::InfoBox => {
                Ok(msgbox::infobox(session, opts, text, rows, cols)?.map(|()| Value::None))
            }
            WidgetKind::TextBox { path } => {
                Ok(textbox::textbox(session, opts, &path, rows, cols)?.map(|()| Value::None))
            }
            WidgetKind::List {
                list_rows,
                mut groups,
            } => {
                let outcome =
                    menu::mixedlist(session, opts, text, rows, cols, list_rows, &mut groups)?;
                Ok(outcome.map(|focus| selection(&groups, focus)))
            }
            WidgetKind::Form { form_rows, items } => {
                let outcome = form::mixedform(session, opts, text, rows, cols, form_rows, &items)?;
                Ok(outcome.map(|values| values.map_or(Value::None, Value::Values)))
            }
            WidgetKind::InputBox { init, secure } => {
                let outcome = if secure {
                    form::passwordbox(session, opts, text, rows, cols, &init)?
                } else {
                    form::inputbox(session, opts, text, rows, cols, &init)?
                };
                Ok(outcome.map(|value| value.map_or(Value::None, Value::Text)))
            }
            WidgetKind::Gauge { perc, input } => {
                let stream = GaugeStream::new(input);
                Ok(gauge::gauge(session, opts, text, rows, cols, perc, stream)?.map(Value::Number))
            }
            WidgetKind::MixedGauge { perc, items } => {
                let outcome = gauge::mixedgauge(session, opts, text, rows, cols, perc, &items)?;
                Ok(outcome.map(|()| Value::None))
            }
            WidgetKind::RangeBox { min, max, value } => {
                let outcome = range::rangebox(session, opts, text, rows, cols, min, max, value)?;
                Ok(outcome.map(Value::Number))
            }
            WidgetKind::Pause { seconds } => {
                let outcome = range::pause(session, opts, text, rows, cols, seconds)?;
                Ok(outcome.map(|left| Value::Number(i32::try_from(left).unwrap_or(i32::MAX))))
            }
            WidgetKind::Calendar { date } => {
                Ok(calendar::calendar(session, opts, text, rows, cols, date)?.map(Value::Date))
            }
            WidgetKind::TimeBox { time } => {
                Ok(calendar::timebox(session, opts, text, rows, cols, time)?.map(Value::Time))
            }
        }
    }
}

fn selection(groups: &[MenuGroup], focus: MenuFocus) -> Value {
    let on = groups
        .iter()
        .filter(|g| g.kind != GroupKind::Separator)
        .flat_map(|g| g.items.iter())
        .filter(|item| item.on)
        .map(|item| item.name.clone())
        .collect();
    let focus = focus
        .group
        .zip(focus.item)
        .and_then(|(g, i)| groups.get(g)?.items.get(i))
        .map(|item| item.name.clone());
    Value::Selection { on, focus }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::Buttons;

    #[test]
    fn test_selection_lists_on_items_in_order() {
        let groups = vec![
            MenuGroup::new(
                GroupKind::Checklist,
                vec![
                    MenuItem::new("a", "").with_on(true),
                    MenuItem::new("b", ""),
                ],
            ),
            MenuGroup::new(GroupKind::Separator, vec![MenuItem::new("sep", "").with_on(true)]),
            MenuGroup::new(GroupKind::Radiolist, vec![MenuItem::new("c", "").with_on(true)]),
        ];
        let focus = MenuFocus {
            group: Some(0),
            item: Some(1),
        };
        assert_eq!(
            selection(&groups, focus),
            Value::Selection {
                on: vec!["a".to_string(), "c".to_string()],
                focus: Some("b".to_string()),
            }
        );
    }

    #[test]
    fn test_button_row_edges() {
        let opts = Options::default();
        let mut dialog = Dialog::new("", &opts, Buttons::standard(&opts), 0, 0);
        let tab = KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE);
        let back = KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT);

        to_buttons(&mut dialog, false);
        assert_eq!(dialog.buttons.current_index(), 1);
        assert!(leave_buttons(&dialog, &tab));
        assert!(!leave_buttons(&dialog, &back));

        to_buttons(&mut dialog, true);
        assert!(leave_buttons(&dialog, &back));
    }

    #[test]
    fn test_value_json_shape() {
        let json = serde_json::to_string(&Value::Number(42)).expect("serialize");
        assert_eq!(json, r#"{"number":42}"#);
    }
}
