use chrono::Datelike;
use std::collections::BTreeMap;

use crate::calendar::{build_grid, CalendarGrid, DayCell, Direction, MonthIndex, Selection};
use crate::calendar::WEEKDAY_LABELS;
use crate::dom::{Document, NodeId};
use crate::error::{Error, ErrorKind, Result};

pub const CONTAINER_CLASS: &str = "datepicker-container";
pub const HEADER_CLASS: &str = "datepicker-header";
pub const TABLE_CLASS: &str = "datepicker-table";
pub const CURRENT_DAY_CLASS: &str = "current-month-day";
pub const MUTED_DAY_CLASS: &str = "gray-day";

/// Captions of the two navigation controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub prev: String,
    pub next: String,
}

impl Default for Labels {
    fn default() -> Self {
        Labels {
            prev: "<".to_owned(),
            next: ">".to_owned(),
        }
    }
}

/// What activating a rendered node does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Prev,
    Next,
    Select(Selection),
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::Prev => "prev",
            Action::Next => "next",
            Action::Select(_) => "select",
        }
    }
}

/// A month view date picker mounted into an element of a [`Document`].
///
/// `on_select` receives the container id and the picked day, with a one
/// based month.
pub struct DatePicker<D, F>
where
    D: Document,
    F: FnMut(&str, Selection),
{
    id: String,
    document: D,
    container: NodeId,
    on_select: F,
    labels: Labels,
    state: MonthIndex,
    actions: BTreeMap<NodeId, Action>,
}

impl<D, F> DatePicker<D, F>
where
    D: Document,
    F: FnMut(&str, Selection),
{
    pub fn new(document: D, id: &str, on_select: F) -> Result<Self> {
        let container = document.element_by_id(id).ok_or_else(|| {
            Error::new(
                ErrorKind::Mount,
                &format!("ID \"{}\" element is not found.", id),
            )
        })?;

        log::debug!("Mounted date picker on '{}'", id);

        Ok(DatePicker {
            id: id.to_owned(),
            document,
            container,
            on_select,
            labels: Labels::default(),
            state: MonthIndex::default(),
            actions: BTreeMap::new(),
        })
    }

    pub fn labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn into_document(self) -> D {
        self.document
    }

    /// Currently displayed month.
    pub fn state(&self) -> MonthIndex {
        self.state
    }

    pub fn grid(&self) -> CalendarGrid {
        build_grid(self.state)
    }

    /// Shows the month of `date`. The day of month is irrelevant.
    pub fn render<T: Datelike>(&mut self, date: T) {
        self.state = MonthIndex::from(date);
        self.redraw();
    }

    pub fn navigate(&mut self, direction: Direction) -> MonthIndex {
        self.state = self.state.navigate(direction);
        log::debug!("Navigated to {}", self.state);
        self.redraw();
        self.state
    }

    /// Handles activation of any node of the picker.
    ///
    /// Returns the performed action, or `None` if `node` is not interactive
    /// in the current rendering.
    pub fn activate(&mut self, node: NodeId) -> Option<Action> {
        let action = match self.actions.get(&node) {
            Some(&action) => action,
            None => {
                log::debug!("Ignoring activation of non-interactive node {:?}", node);
                return None;
            }
        };

        match action {
            Action::Prev => {
                self.navigate(Direction::Prev);
            }
            Action::Next => {
                self.navigate(Direction::Next);
            }
            Action::Select(selection) => {
                log::info!("Selected {} in '{}'", selection, self.id);
                (self.on_select)(&self.id, selection);
            }
        }

        Some(action)
    }

    pub fn control(&self, direction: Direction) -> Option<NodeId> {
        let wanted = match direction {
            Direction::Prev => Action::Prev,
            Direction::Next => Action::Next,
        };
        self.actions
            .iter()
            .find(|(_, &action)| action == wanted)
            .map(|(&node, _)| node)
    }

    /// Cell of `day` in the displayed month.
    pub fn day_cell(&self, day: u32) -> Option<NodeId> {
        self.actions
            .iter()
            .find(|(_, action)| matches!(action, Action::Select(s) if s.day == day))
            .map(|(&node, _)| node)
    }

    fn redraw(&mut self) {
        let grid = build_grid(self.state);

        self.document.clear_children(self.container);
        self.actions.clear();

        let root = self.element("div", CONTAINER_CLASS);
        let header = self.header();
        self.document.append_child(root, header);
        let table = self.table(&grid);
        self.document.append_child(root, table);

        self.document.append_child(self.container, root);
    }

    fn header(&mut self) -> NodeId {
        let header = self.element("div", HEADER_CLASS);

        let prev_label = self.labels.prev.clone();
        let prev = self.control_button(&prev_label, Action::Prev);

        let label = self.document.create_element("span");
        self.document.set_text(label, &self.state.label());

        let next_label = self.labels.next.clone();
        let next = self.control_button(&next_label, Action::Next);

        for node in [prev, label, next] {
            self.document.append_child(header, node);
        }
        header
    }

    fn control_button(&mut self, text: &str, action: Action) -> NodeId {
        let button = self.document.create_element("button");
        self.document.set_text(button, text);
        self.document.set_attribute(button, "data-action", action.name());
        self.actions.insert(button, action);
        button
    }

    fn table(&mut self, grid: &CalendarGrid) -> NodeId {
        let table = self.element("table", TABLE_CLASS);

        let thead = self.document.create_element("thead");
        let head_row = self.document.create_element("tr");
        for label in WEEKDAY_LABELS.iter() {
            let th = self.document.create_element("th");
            self.document.set_text(th, label);
            self.document.append_child(head_row, th);
        }
        self.document.append_child(thead, head_row);
        self.document.append_child(table, thead);

        let tbody = self.document.create_element("tbody");
        for week in grid.rows() {
            let row = self.document.create_element("tr");
            for cell in week {
                let td = self.day(cell);
                self.document.append_child(row, td);
            }
            self.document.append_child(tbody, row);
        }
        self.document.append_child(table, tbody);

        table
    }

    fn day(&mut self, cell: &DayCell) -> NodeId {
        let td = self.document.create_element("td");
        self.document.set_text(td, &cell.day_num().to_string());

        match cell.selection() {
            Some(selection) => {
                self.document.add_class(td, CURRENT_DAY_CLASS);
                self.document
                    .set_attribute(td, "data-day", &selection.day.to_string());
                self.document
                    .set_attribute(td, "data-month", &selection.month.to_string());
                self.document
                    .set_attribute(td, "data-year", &selection.year.to_string());
                self.actions.insert(td, Action::Select(selection));
            }
            None => self.document.add_class(td, MUTED_DAY_CLASS),
        }

        td
    }

    fn element(&mut self, tag: &str, class: &str) -> NodeId {
        let node = self.document.create_element(tag);
        self.document.add_class(node, class);
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDocument;
    use chrono::{Month, NaiveDate};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Calls = Rc<RefCell<Vec<(String, Selection)>>>;

    fn mounted() -> (
        DatePicker<MemoryDocument, impl FnMut(&str, Selection)>,
        Calls,
    ) {
        let mut doc = MemoryDocument::new();
        doc.append_element("div", "cal");

        let calls: Calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let picker = DatePicker::new(doc, "cal", move |id: &str, sel| {
            sink.borrow_mut().push((id.to_owned(), sel))
        })
        .unwrap();

        (picker, calls)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn texts(doc: &MemoryDocument, nodes: &[NodeId]) -> Vec<String> {
        nodes.iter().map(|&n| doc.text_content(n)).collect()
    }

    #[test]
    fn mount_fails_without_container() {
        let mut doc = MemoryDocument::new();
        doc.append_element("div", "other");
        let rev = doc.revision();

        let err = DatePicker::new(doc.clone(), "cal", |_: &str, _| {})
            .err()
            .unwrap();
        assert!(err.is_mount());
        assert_eq!(
            err.to_string(),
            "element not found: ID \"cal\" element is not found."
        );
        assert_eq!(doc.revision(), rev);
    }

    #[test]
    fn construction_does_not_render() {
        let (picker, _) = mounted();
        assert!(picker.document().children(picker.container()).is_empty());
        assert_eq!(picker.control(Direction::Next), None);
    }

    #[test]
    fn renders_header_and_weekdays() {
        let (mut picker, _) = mounted();
        picker.render(date(2024, 2, 17));
        let doc = picker.document();
        let container = picker.container();

        let header = doc.elements_by_class(container, HEADER_CLASS);
        assert_eq!(header.len(), 1);
        assert_eq!(
            texts(doc, doc.children(header[0])),
            vec!["<", "February 2024", ">"]
        );

        let ths = doc.elements_by_tag(container, "th");
        assert_eq!(texts(doc, &ths), vec!["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"]);

        assert_eq!(doc.elements_by_class(container, CONTAINER_CLASS).len(), 1);
        assert_eq!(doc.elements_by_class(container, TABLE_CLASS).len(), 1);
    }

    #[test]
    fn february_2024_grid() {
        let (mut picker, _) = mounted();
        picker.render(date(2024, 2, 1));
        let doc = picker.document();
        let container = picker.container();

        let tbody = doc.elements_by_tag(container, "tbody")[0];
        assert_eq!(doc.children(tbody).len(), 5);
        assert!(doc
            .children(tbody)
            .iter()
            .all(|&row| doc.children(row).len() == 7));

        let current = doc.elements_by_class(container, CURRENT_DAY_CLASS);
        assert_eq!(current.len(), 29);
        assert_eq!(doc.text_content(current[0]), "1");
        assert_eq!(doc.attribute(current[28], "data-day"), Some("29"));
        assert_eq!(doc.attribute(current[28], "data-month"), Some("2"));
        assert_eq!(doc.attribute(current[28], "data-year"), Some("2024"));

        let muted = doc.elements_by_class(container, MUTED_DAY_CLASS);
        assert_eq!(
            texts(doc, &muted),
            vec!["28", "29", "30", "31", "1", "2"]
        );
        assert!(muted.iter().all(|&n| doc.attribute(n, "data-day").is_none()));

        let first_row = doc.children(tbody)[0];
        assert_eq!(
            doc.children(first_row)
                .iter()
                .position(|&td| doc.has_class(td, CURRENT_DAY_CLASS)),
            Some(4)
        );
    }

    #[test]
    fn render_replaces_previous_contents() {
        let (mut picker, _) = mounted();
        picker.render(date(2024, 2, 1));
        let first = picker.document().to_markup(picker.container());

        picker.render(date(2024, 2, 28));
        let second = picker.document().to_markup(picker.container());
        assert_eq!(first, second);
        assert_eq!(picker.document().children(picker.container()).len(), 1);

        picker.render(date(2023, 7, 4));
        let doc = picker.document();
        assert_eq!(doc.children(picker.container()).len(), 1);
        assert_eq!(
            doc.elements_by_class(picker.container(), CURRENT_DAY_CLASS).len(),
            31
        );
    }

    #[test]
    fn navigation_wraps_years() {
        let (mut picker, _) = mounted();
        picker.render(date(2024, 1, 31));

        let prev = picker.control(Direction::Prev).unwrap();
        assert_eq!(picker.activate(prev), Some(Action::Prev));
        assert_eq!(picker.state(), MonthIndex::new(Month::December, 2023));
        let header = picker
            .document()
            .elements_by_class(picker.container(), HEADER_CLASS)[0];
        assert!(picker.document().text_content(header).contains("December 2023"));

        let next = picker.control(Direction::Next).unwrap();
        picker.activate(next);
        let next = picker.control(Direction::Next).unwrap();
        picker.activate(next);
        assert_eq!(picker.state(), MonthIndex::new(Month::February, 2024));

        picker.render(date(2024, 12, 1));
        assert_eq!(
            picker.navigate(Direction::Next),
            MonthIndex::new(Month::January, 2025)
        );
    }

    #[test]
    fn selecting_a_day_calls_back_once() {
        let (mut picker, calls) = mounted();
        picker.render(date(2024, 3, 10));

        let cell = picker.day_cell(15).unwrap();
        assert_eq!(
            picker.activate(cell),
            Some(Action::Select(Selection::new(3, 15, 2024)))
        );

        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], ("cal".to_owned(), Selection::new(3, 15, 2024)));
    }

    #[test]
    fn january_reports_month_one() {
        let (mut picker, calls) = mounted();
        picker.render(date(2025, 1, 1));
        let cell = picker.day_cell(31).unwrap();
        picker.activate(cell);

        assert_eq!(calls.borrow()[0].1, Selection::new(1, 31, 2025));
        assert_eq!(picker.state().month0(), 0);
    }

    #[test]
    fn selection_follows_navigation_across_years() {
        let (mut picker, calls) = mounted();
        picker.render(date(2024, 1, 10));

        let prev = picker.control(Direction::Prev).unwrap();
        picker.activate(prev);
        let cell = picker.day_cell(31).unwrap();
        picker.activate(cell);

        picker.render(date(2024, 12, 1));
        let next = picker.control(Direction::Next).unwrap();
        picker.activate(next);
        let cell = picker.day_cell(1).unwrap();
        picker.activate(cell);

        let calls = calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, Selection::new(12, 31, 2023));
        assert_eq!(calls[1].1, Selection::new(1, 1, 2025));
    }

    #[test]
    fn renders_at_range_edges() {
        let (mut picker, calls) = mounted();

        picker.render(NaiveDate::MAX);
        assert_eq!(
            picker
                .document()
                .elements_by_class(picker.container(), CURRENT_DAY_CLASS)
                .len(),
            31
        );

        picker.render(NaiveDate::MIN);
        assert_eq!(picker.navigate(Direction::Prev), MonthIndex::from(NaiveDate::MIN));

        picker.render(date(NaiveDate::MAX.year(), 11, 1));
        picker.navigate(Direction::Next);
        let last = picker.navigate(Direction::Next);
        assert_eq!(last, MonthIndex::from(NaiveDate::MAX));

        let cell = picker.day_cell(31).unwrap();
        picker.activate(cell);
        assert_eq!(
            calls.borrow()[0].1,
            Selection::new(12, 31, NaiveDate::MAX.year())
        );
    }

    #[test]
    fn muted_and_stale_nodes_are_ignored() {
        let (mut picker, calls) = mounted();
        picker.render(date(2024, 2, 1));

        let muted = picker
            .document()
            .elements_by_class(picker.container(), MUTED_DAY_CLASS)[0];
        assert_eq!(picker.activate(muted), None);

        let old_cell = picker.day_cell(1).unwrap();
        picker.navigate(Direction::Next);
        assert_eq!(picker.activate(old_cell), None);
        assert!(calls.borrow().is_empty());

        assert_eq!(picker.activate(picker.container()), None);
    }

    #[test]
    fn custom_labels() {
        let (picker, _) = mounted();
        let mut picker = picker.labels(Labels {
            prev: "prev".to_owned(),
            next: "next".to_owned(),
        });
        picker.render(date(2024, 2, 1));

        let doc = picker.document();
        let prev = picker.control(Direction::Prev).unwrap();
        assert_eq!(doc.text_content(prev), "prev");
        assert_eq!(doc.attribute(prev, "data-action"), Some("prev"));
    }

    #[test]
    fn grid_follows_state() {
        let (mut picker, _) = mounted();
        picker.render(date(2015, 2, 14));
        assert_eq!(picker.grid().num_rows(), 4);
        picker.navigate(Direction::Prev);
        assert_eq!(picker.grid().month(), MonthIndex::new(Month::January, 2015));
    }
}
