//! Fixed A4 payslip layout.
//!
//! Coordinates are millimetres from the top-left corner and text `y` is the
//! baseline. Rows that would run into the footer continue on a new page.

use crate::{entity::{employee, payslip}, utils};

use super::RenderSettings;

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;

/// Lowest baseline a body row may sit on
const BODY_BOTTOM: f32 = 270.0;
/// First baseline on continuation pages
const CONTINUED_TOP: f32 = 28.0;

const LABEL_X: f32 = 20.0;
const AMOUNT_X: f32 = 160.0;
const ROW: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const GREY: Rgb = Rgb(128, 128, 128);
    pub const HEADER: Rgb = Rgb(41, 128, 185);
    pub const SECTION: Rgb = Rgb(240, 240, 240);
    pub const HIGHLIGHT: Rgb = Rgb(230, 240, 255);
    pub const NET: Rgb = Rgb(46, 204, 113);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Fill {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    Text {
        x: f32,
        y: f32,
        size: f32,
        weight: Weight,
        color: Rgb,
        align: Align,
        content: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub elements: Vec<Element>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|element| match element {
            Element::Text { content, .. } => Some(content.as_str()),
            Element::Fill { .. } => None,
        })
    }
}

struct Sheet<'a> {
    settings: &'a RenderSettings,
    period: &'a str,
    pages: Vec<Page>,
    current: Page,
    y: f32,
    size: f32,
    weight: Weight,
    color: Rgb,
}

impl<'a> Sheet<'a> {
    fn new(settings: &'a RenderSettings, period: &'a str) -> Self {
        Self {
            settings,
            period,
            pages: Vec::new(),
            current: Page::default(),
            y: 0.0,
            size: 10.0,
            weight: Weight::Normal,
            color: Rgb::BLACK,
        }
    }

    fn style(&mut self, size: f32, weight: Weight, color: Rgb) {
        self.size = size;
        self.weight = weight;
        self.color = color;
    }

    fn fill(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        self.current.elements.push(Element::Fill { x, y, width, height, color });
    }

    fn text_at(&mut self, x: f32, y: f32, align: Align, content: impl Into<String>) {
        self.current.elements.push(Element::Text {
            x,
            y,
            size: self.size,
            weight: self.weight,
            color: self.color,
            align,
            content: content.into(),
        });
    }

    fn text(&mut self, x: f32, content: impl Into<String>) {
        self.text_at(x, self.y, Align::Left, content);
    }

    /// Moves down by `dy`, breaking the page if `below` more millimetres
    /// wouldn't fit above the footer
    fn advance(&mut self, dy: f32, below: f32) {
        self.y += dy;

        if self.y + below > BODY_BOTTOM {
            let page = std::mem::take(&mut self.current);
            self.pages.push(page);
            self.y = CONTINUED_TOP;

            let (size, weight, color) = (self.size, self.weight, self.color);
            self.style(9.0, Weight::Normal, Rgb::GREY);
            let heading = format!("{} - Salary Slip - {} (continued)", self.settings.institution_name, self.period);
            self.text_at(15.0, 15.0, Align::Left, heading);
            self.style(size, weight, color);
        }
    }

    fn amount_row(&mut self, label: impl Into<String>, amount: i64) {
        let amount = self.settings.currency.format(amount);
        self.text(LABEL_X, label);
        self.text(AMOUNT_X, amount);
    }

    fn section_header(&mut self, title: &str) {
        self.advance(15.0, 3.0 + ROW + 4.0);
        self.fill(15.0, self.y - 5.0, 180.0, 8.0, Rgb::SECTION);
        self.style(10.0, Weight::Bold, Rgb::BLACK);
        self.text(LABEL_X, title);
        let amount_heading = format!("AMOUNT ({})", self.settings.currency.symbol);
        self.text(AMOUNT_X, amount_heading);
        self.style(10.0, Weight::Normal, Rgb::BLACK);
    }

    fn finish(mut self, generated_on: &str) -> Vec<Page> {
        self.pages.push(self.current);

        let count = self.pages.len();
        for (index, page) in self.pages.iter_mut().enumerate() {
            let mut footer = vec![
                "This is a computer-generated document. No signature is required.".to_string(),
                format!("Generated on: {generated_on}"),
            ];
            if count > 1 {
                footer.push(format!("Page {} of {count}", index + 1));
            }

            for (line, content) in footer.into_iter().enumerate() {
                page.elements.push(Element::Text {
                    x: PAGE_WIDTH / 2.0,
                    y: 280.0 + line as f32 * 5.0,
                    size: 8.0,
                    weight: Weight::Normal,
                    color: Rgb::GREY,
                    align: Align::Center,
                    content,
                });
            }
        }

        self.pages
    }
}

/// Lays out `payslip` for `employee`.
///
/// Only draws the values stored on the payslip, nothing is recalculated.
pub fn layout(payslip: &payslip::Model, employee: &employee::Model, settings: &RenderSettings) -> Vec<Page> {
    let mut sheet = Sheet::new(settings, &payslip.period);
    let center = PAGE_WIDTH / 2.0;

    sheet.fill(0.0, 0.0, PAGE_WIDTH, 40.0, Rgb::HEADER);
    sheet.style(22.0, Weight::Bold, Rgb::WHITE);
    sheet.text_at(center, 15.0, Align::Center, settings.institution_name.as_str());
    sheet.style(14.0, Weight::Normal, Rgb::WHITE);
    sheet.text_at(center, 25.0, Align::Center, "Salary Slip");
    sheet.style(10.0, Weight::Normal, Rgb::WHITE);
    sheet.text_at(center, 33.0, Align::Center, format!("Month: {}", payslip.period));

    sheet.y = 50.0;
    sheet.style(12.0, Weight::Bold, Rgb::BLACK);
    sheet.text(15.0, "Employee Information");

    sheet.style(10.0, Weight::Normal, Rgb::BLACK);
    sheet.advance(8.0, 0.0);
    sheet.text(15.0, format!("Name: {}", employee.name));
    sheet.text(120.0, format!("Employee ID: {}", payslip.employee_id));
    sheet.advance(ROW, 0.0);
    sheet.text(15.0, format!("Department: {}", employee.department));
    sheet.text(120.0, format!("Position: {}", employee.position));
    sheet.advance(ROW, 0.0);
    sheet.text(15.0, format!("Attendance: {}/{} days", payslip.attendance_days, payslip.working_days));

    sheet.section_header("EARNINGS");
    sheet.advance(10.0, 0.0);
    sheet.amount_row("Basic Salary", payslip.basic_salary);
    sheet.advance(ROW, 0.0);
    sheet.amount_row("Earned Basic (Based on Attendance)", payslip.earned_basic);

    for allowance in &payslip.components.allowances {
        sheet.advance(ROW, 0.0);
        sheet.amount_row(allowance.name.as_str(), allowance.amount);
    }

    sheet.advance(8.0, ROW + 4.0);
    sheet.style(10.0, Weight::Bold, Rgb::BLACK);
    sheet.amount_row("Total Allowances:", payslip.total_allowances);
    sheet.advance(ROW, 4.0);
    sheet.fill(15.0, sheet.y - 3.0, 180.0, 7.0, Rgb::HIGHLIGHT);
    sheet.amount_row("Gross Salary:", payslip.gross_salary);

    sheet.section_header("DEDUCTIONS");
    // Keeps the first deduction 10mm below the header, like earnings
    sheet.advance(4.0, 0.0);

    for deduction in &payslip.components.deductions {
        sheet.advance(ROW, 0.0);
        sheet.amount_row(deduction.name.as_str(), deduction.amount);
    }

    sheet.advance(8.0, 10.0 + 7.0);
    sheet.style(10.0, Weight::Bold, Rgb::BLACK);
    sheet.amount_row("Total Deductions:", payslip.total_deductions);

    sheet.advance(10.0, 7.0);
    sheet.fill(15.0, sheet.y - 5.0, 180.0, 12.0, Rgb::NET);
    sheet.style(14.0, Weight::Bold, Rgb::WHITE);
    sheet.amount_row("NET SALARY:", payslip.net_salary);

    let generated_on = utils::format_date_en_in(&payslip.generated_at);
    sheet.finish(&generated_on)
}
