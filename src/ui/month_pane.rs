use chrono::{Datelike, NaiveDate};
use std::fmt::{self, Display};
use termion::{color, style};

use crate::config::Theme;
use crate::dom::{MemoryDocument, NodeId};
use crate::picker::{HEADER_CLASS, MUTED_DAY_CLASS};

struct DayCell<'a> {
    text: &'a str,
    muted: bool,
    is_today: bool,
    theme: &'a Theme,
}

impl<'a> DayCell<'a> {
    const CELL_WIDTH: usize = 4;
}

impl Display for DayCell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.theme.today_marker {
            Some(c) if self.is_today => c,
            _ => ' ',
        };

        if !self.theme.colors {
            return write!(f, " {}{:>2}", marker, self.text);
        }

        if self.muted {
            write!(f, " {}{}{:>2}{}", marker, style::Faint, self.text, style::Reset)
        } else if self.is_today {
            write!(f, " {}{}{:>2}{}", marker, style::Invert, self.text, style::Reset)
        } else {
            write!(f, " {}{:>2}", marker, self.text)
        }
    }
}

/// Draws a date picker mounted in a [`MemoryDocument`] as terminal text.
///
/// Everything shown is read back from the document, so this is also a check
/// of what the picker actually rendered.
pub struct MonthPane<'a> {
    document: &'a MemoryDocument,
    container: NodeId,
    theme: &'a Theme,
    today: Option<NaiveDate>,
}

impl<'a> MonthPane<'a> {
    const COLUMNS: usize = 7;

    pub fn new(document: &'a MemoryDocument, container: NodeId, theme: &'a Theme) -> Self {
        MonthPane {
            document,
            container,
            theme,
            today: None,
        }
    }

    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn width() -> usize {
        Self::COLUMNS * DayCell::CELL_WIDTH
    }

    fn is_today(&self, td: NodeId) -> bool {
        let today = match self.today {
            Some(today) => today,
            None => return false,
        };
        let attr = |name| {
            self.document
                .attribute(td, name)
                .and_then(|v| v.parse::<i64>().ok())
        };

        attr("data-day") == Some(today.day() as i64)
            && attr("data-month") == Some(today.month() as i64)
            && attr("data-year") == Some(today.year() as i64)
    }

    fn write_header(&self, out: &mut String) {
        let header = match self.document.elements_by_class(self.container, HEADER_CLASS).first() {
            Some(&header) => header,
            None => return,
        };

        let parts: Vec<String> = self
            .document
            .children(header)
            .iter()
            .map(|&n| self.document.text_content(n))
            .collect();
        let (prev, label, next) = match parts.as_slice() {
            [prev, label, next] => (prev, label, next),
            _ => return,
        };

        let inner = Self::width().saturating_sub(prev.chars().count() + next.chars().count());
        let line = if self.theme.colors {
            format!(
                "{}{}{:^inner$}{}{}\n",
                prev,
                color::Fg(color::Yellow),
                label,
                color::Fg(color::Reset),
                next,
                inner = inner
            )
        } else {
            format!("{}{:^inner$}{}\n", prev, label, next, inner = inner)
        };
        out.push_str(&line);
    }

    fn write_weekdays(&self, out: &mut String) {
        for th in self.document.elements_by_tag(self.container, "th") {
            out.push_str(&format!(
                "{:>width$}",
                self.document.text_content(th),
                width = DayCell::CELL_WIDTH
            ));
        }
        out.push('\n');
    }

    fn write_days(&self, out: &mut String) {
        for tbody in self.document.elements_by_tag(self.container, "tbody") {
            for &row in self.document.children(tbody) {
                for &td in self.document.children(row) {
                    let text = self.document.node(td).map(|n| n.text()).unwrap_or("");
                    let cell = DayCell {
                        text,
                        muted: self.document.has_class(td, MUTED_DAY_CLASS),
                        is_today: self.is_today(td),
                        theme: self.theme,
                    };
                    out.push_str(&cell.to_string());
                }
                out.push('\n');
            }
        }
    }

    pub fn draw(&self) -> String {
        let mut out = String::new();
        self.write_header(&mut out);
        self.write_weekdays(&mut out);
        self.write_days(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDocument;
    use crate::picker::DatePicker;

    fn plain_theme() -> Theme {
        Theme {
            colors: false,
            ..Theme::default()
        }
    }

    #[test]
    fn draws_february_2024() {
        let mut doc = MemoryDocument::new();
        doc.append_element("div", "cal");
        let mut picker = DatePicker::new(doc, "cal", |_: &str, _| {}).unwrap();
        picker.render(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());

        let theme = plain_theme();
        let drawn = MonthPane::new(picker.document(), picker.container(), &theme)
            .today(NaiveDate::from_ymd_opt(2024, 2, 14).unwrap())
            .draw();
        let lines: Vec<&str> = drawn.lines().collect();

        assert_eq!(lines.len(), 2 + 5);
        assert!(lines[0].starts_with('<'));
        assert!(lines[0].ends_with('>'));
        assert!(lines[0].contains("February 2024"));
        assert_eq!(lines[1], "  Su  Mo  Tu  We  Th  Fr  Sa");
        assert_eq!(lines[2], "  28  29  30  31   1   2   3");
        assert_eq!(lines[4], "  11  12  13 *14  15  16  17");
        assert_eq!(lines[6], "  25  26  27  28  29   1   2");
    }

    #[test]
    fn colored_output_marks_muted_days() {
        let mut doc = MemoryDocument::new();
        doc.append_element("div", "cal");
        let mut picker = DatePicker::new(doc, "cal", |_: &str, _| {}).unwrap();
        picker.render(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());

        let theme = Theme::default();
        let drawn = MonthPane::new(picker.document(), picker.container(), &theme).draw();
        assert!(drawn.contains(&format!("{}28", style::Faint)));
        assert!(drawn.contains(&color::Fg(color::Yellow).to_string()));
    }

    #[test]
    fn empty_container_draws_nothing() {
        let mut doc = MemoryDocument::new();
        let cal = doc.append_element("div", "cal");
        let theme = plain_theme();
        assert_eq!(MonthPane::new(&doc, cal, &theme).draw(), "\n");
    }
}
